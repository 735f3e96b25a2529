use std::collections::{BTreeMap, BTreeSet};

use foundation::{FeatureId, LonLat};
use layers::{Expr, LayerId, LayerSpec, SourceSpec};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Per-feature state map (`{"hover": true}`), read by `feature-state` expressions.
pub type FeatureState = BTreeMap<String, Value>;

pub fn hover_state(on: bool) -> FeatureState {
    let mut state = FeatureState::new();
    state.insert(layers::symbology::HOVER_STATE.to_string(), Value::Bool(on));
    state
}

/// Animated camera transition. Issuing a new one supersedes any in flight.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlyTo {
    pub center: LonLat,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
    pub duration_ms: u32,
    /// Run even when the user prefers reduced motion.
    pub essential: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

impl Cursor {
    /// CSS `cursor` value for the map canvas.
    pub fn as_css(&self) -> &'static str {
        match self {
            Cursor::Default => "",
            Cursor::Pointer => "pointer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("feature {0} is not in view")]
    FeatureNotInView(FeatureId),
    #[error("map surface: {0}")]
    Backend(String),
}

/// Capabilities the story engine needs from a rendered map.
///
/// Layer-touching calls are only made after `has_layer` returned true.
pub trait MapSurface {
    fn has_source(&self, id: &str) -> bool;
    fn add_source(&mut self, source: &SourceSpec);
    fn has_layer(&self, layer: LayerId) -> bool;
    fn add_layer(&mut self, spec: &LayerSpec);
    /// `None` removes the filter.
    fn set_filter(&mut self, layer: LayerId, filter: Option<&Expr>);
    fn set_paint_property(&mut self, layer: LayerId, property: &str, value: &Expr);
    fn set_layout_property(&mut self, layer: LayerId, property: &str, value: &str);
    fn fly_to(&mut self, target: &FlyTo);
    fn pitch(&self) -> f64;
    fn bearing(&self) -> f64;
    fn set_feature_state(
        &mut self,
        source: &SourceSpec,
        id: &FeatureId,
        state: &FeatureState,
    ) -> Result<(), SurfaceError>;
    fn set_cursor(&mut self, cursor: Cursor);
    /// Tears the map down and releases its event bindings.
    fn remove(&mut self);
}

/// One call made on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SurfaceCommand {
    AddSource {
        id: String,
    },
    AddLayer {
        id: String,
    },
    SetFilter {
        layer: String,
        filter: Option<Value>,
    },
    SetPaint {
        layer: String,
        property: String,
        value: Value,
    },
    SetLayout {
        layer: String,
        property: String,
        value: String,
    },
    FlyTo(FlyTo),
    SetFeatureState {
        id: FeatureId,
        state: FeatureState,
    },
    SetCursor {
        cursor: &'static str,
    },
    Remove,
}

impl SurfaceCommand {
    /// Camera and layer-style commands; the ones explore mode suspends.
    pub fn is_step_effect(&self) -> bool {
        matches!(
            self,
            SurfaceCommand::FlyTo(_)
                | SurfaceCommand::SetFilter { .. }
                | SurfaceCommand::SetPaint { .. }
                | SurfaceCommand::SetLayout { .. }
        )
    }
}

/// Current style of a layer held by a [`RecordingSurface`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerState {
    pub filter: Option<Expr>,
    pub paint: BTreeMap<String, Expr>,
    pub layout: BTreeMap<String, String>,
}

/// In-memory map surface that keeps the resulting style state and a log of
/// every call, in order.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    sources: BTreeSet<String>,
    layers: BTreeMap<&'static str, LayerState>,
    camera: Option<FlyTo>,
    pitch: f64,
    bearing: f64,
    feature_states: BTreeMap<FeatureId, FeatureState>,
    in_view: Option<BTreeSet<FeatureId>>,
    cursor: Cursor,
    removed: bool,
    log: Vec<SurfaceCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts feature-state updates to `ids`; others fail like an
    /// unloaded tile would.
    pub fn set_features_in_view(&mut self, ids: impl IntoIterator<Item = FeatureId>) {
        self.in_view = Some(ids.into_iter().collect());
    }

    pub fn layer(&self, id: LayerId) -> Option<&LayerState> {
        self.layers.get(id.as_str())
    }

    /// Last camera target issued.
    pub fn camera(&self) -> Option<&FlyTo> {
        self.camera.as_ref()
    }

    pub fn feature_state(&self, id: &FeatureId) -> Option<&FeatureState> {
        self.feature_states.get(id)
    }

    pub fn is_hovered(&self, id: &FeatureId) -> bool {
        self.feature_state(id)
            .and_then(|s| s.get(layers::symbology::HOVER_STATE))
            == Some(&Value::Bool(true))
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.log
    }

    pub fn drain(&mut self) -> Vec<SurfaceCommand> {
        std::mem::take(&mut self.log)
    }

    fn layer_mut(&mut self, id: LayerId) -> Option<&mut LayerState> {
        self.layers.get_mut(id.as_str())
    }
}

impl MapSurface for RecordingSurface {
    fn has_source(&self, id: &str) -> bool {
        self.sources.contains(id)
    }

    fn add_source(&mut self, source: &SourceSpec) {
        self.sources.insert(source.id.clone());
        self.log.push(SurfaceCommand::AddSource {
            id: source.id.clone(),
        });
    }

    fn has_layer(&self, layer: LayerId) -> bool {
        self.layers.contains_key(layer.as_str())
    }

    fn add_layer(&mut self, spec: &LayerSpec) {
        let state = LayerState {
            filter: spec.filter.clone(),
            paint: spec
                .paint
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            layout: BTreeMap::new(),
        };
        self.layers.insert(spec.id.as_str(), state);
        self.log.push(SurfaceCommand::AddLayer {
            id: spec.id.to_string(),
        });
    }

    fn set_filter(&mut self, layer: LayerId, filter: Option<&Expr>) {
        if let Some(state) = self.layer_mut(layer) {
            state.filter = filter.cloned();
        }
        self.log.push(SurfaceCommand::SetFilter {
            layer: layer.to_string(),
            filter: filter.map(Expr::to_json),
        });
    }

    fn set_paint_property(&mut self, layer: LayerId, property: &str, value: &Expr) {
        if let Some(state) = self.layer_mut(layer) {
            state.paint.insert(property.to_string(), value.clone());
        }
        self.log.push(SurfaceCommand::SetPaint {
            layer: layer.to_string(),
            property: property.to_string(),
            value: value.to_json(),
        });
    }

    fn set_layout_property(&mut self, layer: LayerId, property: &str, value: &str) {
        if let Some(state) = self.layer_mut(layer) {
            state.layout.insert(property.to_string(), value.to_string());
        }
        self.log.push(SurfaceCommand::SetLayout {
            layer: layer.to_string(),
            property: property.to_string(),
            value: value.to_string(),
        });
    }

    fn fly_to(&mut self, target: &FlyTo) {
        // Transitions complete instantly here.
        self.pitch = target.pitch;
        self.bearing = target.bearing;
        self.camera = Some(target.clone());
        self.log.push(SurfaceCommand::FlyTo(target.clone()));
    }

    fn pitch(&self) -> f64 {
        self.pitch
    }

    fn bearing(&self) -> f64 {
        self.bearing
    }

    fn set_feature_state(
        &mut self,
        _source: &SourceSpec,
        id: &FeatureId,
        state: &FeatureState,
    ) -> Result<(), SurfaceError> {
        if let Some(in_view) = &self.in_view
            && !in_view.contains(id)
        {
            return Err(SurfaceError::FeatureNotInView(id.clone()));
        }
        let entry = self.feature_states.entry(id.clone()).or_default();
        entry.extend(state.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.log.push(SurfaceCommand::SetFeatureState {
            id: id.clone(),
            state: state.clone(),
        });
        Ok(())
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
        self.log.push(SurfaceCommand::SetCursor {
            cursor: cursor.as_css(),
        });
    }

    fn remove(&mut self) {
        self.layers.clear();
        self.sources.clear();
        self.removed = true;
        self.log.push(SurfaceCommand::Remove);
    }
}
