use serde_json::{Map, Value, json};

use crate::expr::Expr;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LayerId(pub &'static str);

impl LayerId {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LayerKind {
    FillExtrusion,
    Line,
}

impl LayerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::FillExtrusion => "fill-extrusion",
            LayerKind::Line => "line",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

impl Visibility {
    pub fn from_flag(visible: bool) -> Self {
        if visible {
            Visibility::Visible
        } else {
            Visibility::Hidden
        }
    }

    /// Value of the `visibility` layout property.
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Visible => "visible",
            Visibility::Hidden => "none",
        }
    }
}

/// Tiled vector source backing the story layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub id: String,
    pub url: String,
    /// Layer name inside the tileset.
    pub source_layer: String,
}

impl SourceSpec {
    pub fn to_json(&self) -> Value {
        json!({ "type": "vector", "url": self.url })
    }
}

/// A style layer ready to be added to a map.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: LayerId,
    pub kind: LayerKind,
    pub source: String,
    pub source_layer: String,
    pub minzoom: Option<f64>,
    pub filter: Option<Expr>,
    pub paint: Vec<(&'static str, Expr)>,
}

impl LayerSpec {
    pub fn new(id: LayerId, kind: LayerKind, source: &SourceSpec) -> Self {
        Self {
            id,
            kind,
            source: source.id.clone(),
            source_layer: source.source_layer.clone(),
            minzoom: None,
            filter: None,
            paint: Vec::new(),
        }
    }

    pub fn paint(mut self, property: &'static str, value: Expr) -> Self {
        self.paint.push((property, value));
        self
    }

    pub fn paint_value(&self, property: &str) -> Option<&Expr> {
        self.paint
            .iter()
            .find(|(k, _)| *k == property)
            .map(|(_, v)| v)
    }

    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("id".into(), json!(self.id.as_str()));
        out.insert("type".into(), json!(self.kind.as_str()));
        out.insert("source".into(), json!(self.source));
        out.insert("source-layer".into(), json!(self.source_layer));
        if let Some(minzoom) = self.minzoom {
            out.insert("minzoom".into(), json!(minzoom));
        }
        if let Some(filter) = &self.filter {
            out.insert("filter".into(), filter.to_json());
        }
        let paint: Map<String, Value> = self
            .paint
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_json()))
            .collect();
        out.insert("paint".into(), Value::Object(paint));
        Value::Object(out)
    }
}
