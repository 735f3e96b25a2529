use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::FeatureId;

/// A feature as surfaced by map pointer events: an optional id plus its
/// attribute map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<FeatureId>,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl Feature {
    pub fn new(id: impl Into<FeatureId>) -> Self {
        Self {
            id: Some(id.into()),
            properties: BTreeMap::new(),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    /// Attribute lookup; JSON `null` is treated as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key).filter(|v| !v.is_null())
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<FeatureId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(FeatureId::from_json))
}
