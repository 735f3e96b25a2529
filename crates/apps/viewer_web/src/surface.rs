use foundation::FeatureId;
use js_sys::{Object, Reflect};
use layers::{Expr, LayerId, LayerSpec, SourceSpec};
use story::{Cursor, FeatureState, FlyTo, MapSurface, SurfaceError};
use wasm_bindgen::JsValue;

use crate::ffi::{MapboxMap, from_js, to_js};

/// [`MapSurface`] backed by a live mapbox-gl map.
pub struct MapboxSurface {
    map: MapboxMap,
}

impl MapboxSurface {
    pub fn new(map: MapboxMap) -> Self {
        Self { map }
    }

    pub fn map(&self) -> &MapboxMap {
        &self.map
    }
}

impl std::fmt::Debug for MapboxSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MapboxSurface")
    }
}

fn feature_ref(source: &SourceSpec, id: &FeatureId) -> Result<JsValue, JsValue> {
    let obj = Object::new();
    Reflect::set(&obj, &"source".into(), &source.id.as_str().into())?;
    Reflect::set(&obj, &"sourceLayer".into(), &source.source_layer.as_str().into())?;
    Reflect::set(&obj, &"id".into(), &to_js(&id.to_json()))?;
    Ok(obj.into())
}

impl MapSurface for MapboxSurface {
    fn has_source(&self, id: &str) -> bool {
        !self.map.get_source(id).is_undefined()
    }

    fn add_source(&mut self, source: &SourceSpec) {
        self.map.add_source(&source.id, &to_js(&source.to_json()));
    }

    fn has_layer(&self, layer: LayerId) -> bool {
        !self.map.get_layer(layer.as_str()).is_undefined()
    }

    fn add_layer(&mut self, spec: &LayerSpec) {
        self.map.add_layer(&to_js(&spec.to_json()));
    }

    fn set_filter(&mut self, layer: LayerId, filter: Option<&Expr>) {
        let filter = filter.map_or(JsValue::NULL, |f| to_js(&f.to_json()));
        self.map.set_filter(layer.as_str(), &filter);
    }

    fn set_paint_property(&mut self, layer: LayerId, property: &str, value: &Expr) {
        self.map
            .set_paint_property(layer.as_str(), property, &to_js(&value.to_json()));
    }

    fn set_layout_property(&mut self, layer: LayerId, property: &str, value: &str) {
        self.map.set_layout_property(layer.as_str(), property, value);
    }

    fn fly_to(&mut self, target: &FlyTo) {
        match serde_json::to_value(target) {
            Ok(mut options) => {
                // mapbox-gl names the duration `duration`.
                if let Some(obj) = options.as_object_mut()
                    && let Some(ms) = obj.remove("durationMs")
                {
                    obj.insert("duration".to_string(), ms);
                }
                self.map.fly_to(&to_js(&options));
            }
            Err(err) => crate::log(&format!("flyTo options: {err}")),
        }
    }

    fn pitch(&self) -> f64 {
        self.map.get_pitch()
    }

    fn bearing(&self) -> f64 {
        self.map.get_bearing()
    }

    fn set_feature_state(
        &mut self,
        source: &SourceSpec,
        id: &FeatureId,
        state: &FeatureState,
    ) -> Result<(), SurfaceError> {
        let state = serde_json::Value::Object(state.clone().into_iter().collect());
        let target = feature_ref(source, id).map_err(|e| SurfaceError::Backend(describe(&e)))?;
        self.map
            .set_feature_state(&target, &to_js(&state))
            .map_err(|e| SurfaceError::Backend(describe(&e)))
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        let _ = self
            .map
            .get_canvas()
            .style()
            .set_property("cursor", cursor.as_css());
    }

    fn remove(&mut self) {
        self.map.remove();
    }
}

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| from_js(err).to_string())
}
