use std::collections::BTreeMap;

use foundation::Feature;
use serde::{Serialize, Serializer};
use serde_json::{Value, json};

/// Map-style expression, encoded on the wire as the JSON array syntax used by
/// vector map renderers (`["==", ["get", "status"], "damaged"]`).
///
/// Only the operators the story layers need are modelled. `evaluate` mirrors
/// the renderer's semantics closely enough to check filters without a map.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Scalar literal, emitted bare.
    Literal(Value),
    /// Array literal, emitted as `["literal", [...]]`.
    List(Vec<Value>),
    Get(String),
    Id,
    FeatureState(String),
    /// `["boolean", input, fallback]`
    Boolean(Box<Expr>, bool),
    /// `["to-number", input, ...fallbacks]`
    ToNumber(Vec<Expr>),
    Coalesce(Vec<Expr>),
    Mul(Vec<Expr>),
    Eq(Box<Expr>, Box<Expr>),
    In(Box<Expr>, Box<Expr>),
    All(Vec<Expr>),
    Match {
        input: Box<Expr>,
        arms: Vec<(Value, Expr)>,
        fallback: Box<Expr>,
    },
    Case {
        branches: Vec<(Expr, Expr)>,
        fallback: Box<Expr>,
    },
}

impl Expr {
    pub fn lit(v: impl Into<Value>) -> Self {
        Expr::Literal(v.into())
    }

    pub fn get(key: &str) -> Self {
        Expr::Get(key.to_string())
    }

    pub fn equals(a: Expr, b: Expr) -> Self {
        Expr::Eq(Box::new(a), Box::new(b))
    }

    /// `input in [values...]`
    pub fn one_of<S: AsRef<str>>(input: Expr, values: &[S]) -> Self {
        let list = values.iter().map(|s| Value::from(s.as_ref())).collect();
        Expr::In(Box::new(input), Box::new(Expr::List(list)))
    }

    pub fn to_json(&self) -> Value {
        match self {
            Expr::Literal(v) => v.clone(),
            Expr::List(items) => json!(["literal", items]),
            Expr::Get(key) => json!(["get", key]),
            Expr::Id => json!(["id"]),
            Expr::FeatureState(key) => json!(["feature-state", key]),
            Expr::Boolean(input, fallback) => json!(["boolean", input.to_json(), fallback]),
            Expr::ToNumber(args) => op("to-number", args),
            Expr::Coalesce(args) => op("coalesce", args),
            Expr::Mul(args) => op("*", args),
            Expr::Eq(a, b) => json!(["==", a.to_json(), b.to_json()]),
            Expr::In(needle, haystack) => json!(["in", needle.to_json(), haystack.to_json()]),
            Expr::All(args) => op("all", args),
            Expr::Match {
                input,
                arms,
                fallback,
            } => {
                let mut out = vec![Value::from("match"), input.to_json()];
                for (label, output) in arms {
                    out.push(label.clone());
                    out.push(output.to_json());
                }
                out.push(fallback.to_json());
                Value::Array(out)
            }
            Expr::Case { branches, fallback } => {
                let mut out = vec![Value::from("case")];
                for (cond, output) in branches {
                    out.push(cond.to_json());
                    out.push(output.to_json());
                }
                out.push(fallback.to_json());
                Value::Array(out)
            }
        }
    }

    /// Evaluates against a feature with no feature-state set.
    pub fn evaluate(&self, feature: &Feature) -> Value {
        self.evaluate_with_state(feature, &BTreeMap::new())
    }

    /// Evaluates against a feature and its current feature-state.
    ///
    /// Evaluation errors (e.g. arithmetic on a string) yield `Value::Null`.
    pub fn evaluate_with_state(&self, feature: &Feature, state: &BTreeMap<String, Value>) -> Value {
        let eval = |e: &Expr| e.evaluate_with_state(feature, state);
        match self {
            Expr::Literal(v) => v.clone(),
            Expr::List(items) => Value::Array(items.clone()),
            Expr::Get(key) => feature.get(key).cloned().unwrap_or(Value::Null),
            Expr::Id => feature.id.as_ref().map_or(Value::Null, |id| id.to_json()),
            Expr::FeatureState(key) => state.get(key).cloned().unwrap_or(Value::Null),
            Expr::Boolean(input, fallback) => match eval(input.as_ref()) {
                Value::Bool(b) => Value::Bool(b),
                _ => Value::Bool(*fallback),
            },
            Expr::ToNumber(args) => args
                .iter()
                .find_map(|a| to_number(&eval(a)))
                .map_or(Value::Null, Value::from),
            Expr::Coalesce(args) => args
                .iter()
                .map(eval)
                .find(|v| !v.is_null())
                .unwrap_or(Value::Null),
            Expr::Mul(args) => {
                let mut product = 1.0;
                for a in args {
                    let Some(n) = eval(a).as_f64() else {
                        return Value::Null;
                    };
                    product *= n;
                }
                Value::from(product)
            }
            Expr::Eq(a, b) => Value::Bool(values_equal(&eval(a.as_ref()), &eval(b.as_ref()))),
            Expr::In(needle, haystack) => {
                let needle = eval(needle.as_ref());
                let found = match eval(haystack.as_ref()) {
                    Value::Array(items) => items.iter().any(|v| values_equal(v, &needle)),
                    Value::String(s) => needle.as_str().is_some_and(|n| s.contains(n)),
                    _ => false,
                };
                Value::Bool(found)
            }
            Expr::All(args) => Value::Bool(args.iter().all(|a| eval(a) == Value::Bool(true))),
            Expr::Match {
                input,
                arms,
                fallback,
            } => {
                let v = eval(input.as_ref());
                arms.iter()
                    .find(|(label, _)| values_equal(label, &v))
                    .map_or_else(|| eval(fallback.as_ref()), |(_, out)| eval(out))
            }
            Expr::Case { branches, fallback } => branches
                .iter()
                .find(|(cond, _)| eval(cond) == Value::Bool(true))
                .map_or_else(|| eval(fallback.as_ref()), |(_, out)| eval(out)),
        }
    }

    /// True when the expression evaluates to boolean `true` for `feature`.
    pub fn test(&self, feature: &Feature) -> bool {
        self.evaluate(feature) == Value::Bool(true)
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn op(name: &str, args: &[Expr]) -> Value {
    let mut out = Vec::with_capacity(args.len() + 1);
    out.push(Value::from(name));
    out.extend(args.iter().map(Expr::to_json));
    Value::Array(out)
}

fn to_number(v: &Value) -> Option<f64> {
    match v {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::Expr;
    use foundation::Feature;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::collections::BTreeMap;

    #[test]
    fn encodes_renderer_syntax() {
        let e = Expr::one_of(Expr::get("status"), &["damaged", "unknown"]);
        assert_eq!(
            e.to_json(),
            json!(["in", ["get", "status"], ["literal", ["damaged", "unknown"]]])
        );
        assert_eq!(Expr::equals(Expr::Id, Expr::lit(-1)).to_json(), json!(["==", ["id"], -1]));
    }

    #[test]
    fn to_number_uses_fallbacks() {
        let e = Expr::ToNumber(vec![Expr::get("height"), Expr::lit(0)]);
        assert_eq!(e.evaluate(&Feature::new(1).with("height", "12.5")), json!(12.5));
        assert_eq!(e.evaluate(&Feature::new(1).with("height", "tall")), json!(0.0));
        assert_eq!(e.evaluate(&Feature::new(1)), json!(0.0));
    }

    #[test]
    fn numeric_equality_ignores_representation() {
        let e = Expr::equals(Expr::Id, Expr::lit(42.0));
        assert!(e.test(&Feature::new(42)));
        assert!(!e.test(&Feature::new(41)));
    }

    #[test]
    fn case_reads_feature_state() {
        let e = Expr::Case {
            branches: vec![(
                Expr::Boolean(Box::new(Expr::FeatureState("hover".into())), false),
                Expr::lit("#95a5a6"),
            )],
            fallback: Box::new(Expr::lit("#ffffff")),
        };
        let f = Feature::new(3);
        assert_eq!(e.evaluate(&f), json!("#ffffff"));

        let mut state = BTreeMap::new();
        state.insert("hover".to_string(), Value::Bool(true));
        assert_eq!(e.evaluate_with_state(&f, &state), json!("#95a5a6"));
    }

    #[test]
    fn arithmetic_on_non_numbers_is_null() {
        let e = Expr::Mul(vec![Expr::get("height"), Expr::lit(2)]);
        assert_eq!(e.evaluate(&Feature::new(1).with("height", "x")), Value::Null);
    }
}
