use serde::{Deserialize, Serialize};

/// Identifier of a rendered map feature.
///
/// Vector tiles carry either integer or string ids. The engine only ever
/// holds these as weak references into the surface's current feature set.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureId {
    Number(i64),
    Text(String),
}

impl FeatureId {
    /// An id no real feature can carry; used to make a filter match nothing.
    pub const SENTINEL: FeatureId = FeatureId::Number(-1);

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FeatureId::Number(n) => serde_json::Value::from(*n),
            FeatureId::Text(s) => serde_json::Value::from(s.as_str()),
        }
    }

    /// Reads a feature id out of a JSON value as produced by the map library.
    ///
    /// Floats with no fractional part are accepted as integers.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Some(FeatureId::Number(i));
                }
                let f = n.as_f64()?;
                (f.fract() == 0.0 && f.abs() < i64::MAX as f64).then(|| FeatureId::Number(f as i64))
            }
            serde_json::Value::String(s) => Some(FeatureId::Text(s.clone())),
            _ => None,
        }
    }
}

impl From<i64> for FeatureId {
    fn from(n: i64) -> Self {
        FeatureId::Number(n)
    }
}

impl From<&str> for FeatureId {
    fn from(s: &str) -> Self {
        FeatureId::Text(s.to_string())
    }
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureId::Number(n) => write!(f, "{n}"),
            FeatureId::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FeatureId;
    use serde_json::json;

    #[test]
    fn sentinel_is_negative_one() {
        assert_eq!(FeatureId::SENTINEL, FeatureId::Number(-1));
        assert_eq!(FeatureId::SENTINEL.to_json(), json!(-1));
    }

    #[test]
    fn from_json_accepts_integral_floats_and_strings() {
        assert_eq!(FeatureId::from_json(&json!(42)), Some(FeatureId::Number(42)));
        assert_eq!(FeatureId::from_json(&json!(7.0)), Some(FeatureId::Number(7)));
        assert_eq!(FeatureId::from_json(&json!(7.5)), None);
        assert_eq!(FeatureId::from_json(&json!("way/12")), Some(FeatureId::from("way/12")));
        assert_eq!(FeatureId::from_json(&json!(null)), None);
    }
}
