//! Bindings to the global `mapboxgl` object loaded by the page.
//!
//! Thin wrappers only: no state, no story logic.

use js_sys::{Function, Reflect};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = mapboxgl, js_name = Map)]
    pub type MapboxMap;

    #[wasm_bindgen(constructor, catch, js_namespace = mapboxgl, js_class = "Map")]
    pub fn new(options: &JsValue) -> Result<MapboxMap, JsValue>;

    #[wasm_bindgen(method, js_name = getSource)]
    pub fn get_source(this: &MapboxMap, id: &str) -> JsValue;

    #[wasm_bindgen(method, js_name = addSource)]
    pub fn add_source(this: &MapboxMap, id: &str, spec: &JsValue);

    #[wasm_bindgen(method, js_name = getLayer)]
    pub fn get_layer(this: &MapboxMap, id: &str) -> JsValue;

    #[wasm_bindgen(method, js_name = addLayer)]
    pub fn add_layer(this: &MapboxMap, spec: &JsValue);

    #[wasm_bindgen(method, js_name = setFilter)]
    pub fn set_filter(this: &MapboxMap, layer: &str, filter: &JsValue);

    #[wasm_bindgen(method, js_name = setPaintProperty)]
    pub fn set_paint_property(this: &MapboxMap, layer: &str, property: &str, value: &JsValue);

    #[wasm_bindgen(method, js_name = setLayoutProperty)]
    pub fn set_layout_property(this: &MapboxMap, layer: &str, property: &str, value: &str);

    #[wasm_bindgen(method, js_name = flyTo)]
    pub fn fly_to(this: &MapboxMap, options: &JsValue);

    #[wasm_bindgen(method, js_name = getPitch)]
    pub fn get_pitch(this: &MapboxMap) -> f64;

    #[wasm_bindgen(method, js_name = getBearing)]
    pub fn get_bearing(this: &MapboxMap) -> f64;

    #[wasm_bindgen(method, catch, js_name = setFeatureState)]
    pub fn set_feature_state(
        this: &MapboxMap,
        feature: &JsValue,
        state: &JsValue,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = getCanvas)]
    pub fn get_canvas(this: &MapboxMap) -> web_sys::HtmlElement;

    #[wasm_bindgen(method, catch)]
    pub fn resize(this: &MapboxMap) -> Result<(), JsValue>;

    #[wasm_bindgen(method)]
    pub fn remove(this: &MapboxMap);

    #[wasm_bindgen(method, js_name = on)]
    pub fn on(this: &MapboxMap, event: &str, handler: &Function);

    #[wasm_bindgen(method, js_name = on)]
    pub fn on_layer(this: &MapboxMap, event: &str, layer: &str, handler: &Function);

    #[wasm_bindgen(method, js_name = off)]
    pub fn off(this: &MapboxMap, event: &str, handler: &Function);

    #[wasm_bindgen(method, js_name = off)]
    pub fn off_layer(this: &MapboxMap, event: &str, layer: &str, handler: &Function);
}

/// Sets `mapboxgl.accessToken`.
pub fn set_access_token(token: &str) -> Result<(), JsValue> {
    let mapboxgl = Reflect::get(&js_sys::global(), &JsValue::from_str("mapboxgl"))?;
    if mapboxgl.is_undefined() {
        return Err(JsValue::from_str("mapboxgl is not loaded"));
    }
    Reflect::set(&mapboxgl, &JsValue::from_str("accessToken"), &JsValue::from_str(token))?;
    Ok(())
}

/// Converts a JSON value into a plain JS value.
pub fn to_js(value: &serde_json::Value) -> JsValue {
    js_sys::JSON::parse(&value.to_string()).unwrap_or(JsValue::NULL)
}

/// Converts a plain JS value into JSON; functions and cycles become `null`.
pub fn from_js(value: &JsValue) -> serde_json::Value {
    if value.is_undefined() || value.is_null() {
        return serde_json::Value::Null;
    }
    js_sys::JSON::stringify(value)
        .ok()
        .and_then(|s| s.as_string())
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or(serde_json::Value::Null)
}
