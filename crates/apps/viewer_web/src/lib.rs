use console_error_panic_hook::set_once;
use gloo_net::http::Request;
use js_sys::Function;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use web_sys::{KeyboardEvent, ResizeObserver};

use foundation::Feature;
use layers::buildings::EXTRUSION_LAYER;
use story::scroll::ScrollZoom;
use story::{Key, Phase, StepTable, StoryConfig, StoryEngine};

mod ffi;
mod surface;

use ffi::{MapboxMap, from_js, to_js};
use surface::MapboxSurface;

const MOUNT_EVENTS: [&str; 3] = ["mousemove", "mouseleave", "click"];

/// A JS callback registered on the map, the page or a resize observer for
/// the lifetime of a mounted story. Dropped (and deregistered) on unmount.
struct Listener {
    target: ListenerTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(JsValue)>,
}

enum ListenerTarget {
    Map,
    MapLayer(&'static str),
    Window,
    Document,
    /// Observer watching the map container element.
    Resize(ResizeObserver),
}

struct Host {
    engine: StoryEngine<MapboxSurface>,
    listeners: Vec<Listener>,
    on_change: Option<Function>,
}

thread_local! {
    static HOST: RefCell<Option<Host>> = const { RefCell::new(None) };
}

pub(crate) fn log(msg: &str) {
    web_sys::console::error_1(&JsValue::from_str(msg));
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// True when `token` is blank; the page then shows a missing-token notice
/// instead of the map.
#[wasm_bindgen]
pub fn story_missing_token(token: &str) -> bool {
    StoryConfig::with_token(token).require_token().is_err()
}

/// Creates the map in `container_id` and binds the story engine to it.
///
/// `steps_json` overrides the built-in story. Returns `false` without
/// touching the DOM when the access token is missing.
#[wasm_bindgen]
pub fn story_mount(
    container_id: &str,
    access_token: &str,
    steps_json: Option<String>,
) -> Result<bool, JsValue> {
    let config = StoryConfig::with_token(access_token);
    let token = match config.require_token() {
        Ok(token) => token,
        Err(err) => {
            log(&err.to_string());
            return Ok(false);
        }
    };
    if HOST.with(|h| h.borrow().is_some()) {
        story_unmount();
    }

    let steps = match steps_json {
        Some(json) => StepTable::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => StepTable::khartoum(),
    };

    ffi::set_access_token(token)?;
    let map = MapboxMap::new(&to_js(&map_options(container_id, &config)))?;
    let engine = StoryEngine::new(MapboxSurface::new(map), steps, config.source.clone());

    HOST.with(|h| {
        *h.borrow_mut() = Some(Host {
            engine,
            listeners: Vec::new(),
            on_change: None,
        });
    });

    listen(ListenerTarget::Map, "load", |_| on_map_load())?;
    listen(ListenerTarget::Window, "keydown", |event| {
        let Ok(event) = event.dyn_into::<KeyboardEvent>() else {
            return;
        };
        with_engine(|engine| engine.handle_key(Key::from_dom(&event.key())));
    })?;
    listen(ListenerTarget::Window, "resize", |_| resize_map())?;
    listen(ListenerTarget::Document, "fullscreenchange", |_| resize_map())?;
    observe_container(container_id)?;
    Ok(true)
}

/// Removes the map and releases every listener.
#[wasm_bindgen]
pub fn story_unmount() {
    let Some(host) = HOST.with(|h| h.borrow_mut().take()) else {
        return;
    };
    let map = host.engine.surface().map();
    for listener in &host.listeners {
        let f: &Function = listener.closure.as_ref().unchecked_ref();
        match &listener.target {
            ListenerTarget::Map => map.off(listener.event, f),
            ListenerTarget::MapLayer(layer) => map.off_layer(listener.event, layer, f),
            ListenerTarget::Resize(observer) => observer.disconnect(),
            ListenerTarget::Window => {
                if let Some(w) = web_sys::window() {
                    let _ = w.remove_event_listener_with_callback(listener.event, f);
                }
            }
            ListenerTarget::Document => {
                if let Some(d) = web_sys::window().and_then(|w| w.document()) {
                    let _ = d.remove_event_listener_with_callback(listener.event, f);
                }
            }
        }
    }
    let Host { engine, .. } = host;
    engine.teardown();
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum FullscreenToggle {
    Enter,
    Exit,
}

impl FullscreenToggle {
    /// Any fullscreen element, ours or not, makes the toggle exit.
    fn from_state(something_fullscreen: bool) -> Self {
        if something_fullscreen {
            FullscreenToggle::Exit
        } else {
            FullscreenToggle::Enter
        }
    }
}

/// Enters fullscreen on `wrapper_id`, or leaves it when something is
/// already fullscreen.
#[wasm_bindgen]
pub fn story_toggle_fullscreen(wrapper_id: &str) -> Result<(), JsValue> {
    let document = document()?;
    if FullscreenToggle::from_state(document.fullscreen_element().is_some())
        == FullscreenToggle::Exit
    {
        document.exit_fullscreen();
        return Ok(());
    }
    let wrapper = document
        .get_element_by_id(wrapper_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element #{wrapper_id}")))?;
    // Browsers refuse fullscreen outside a user gesture; that is not fatal.
    if let Err(err) = wrapper.request_fullscreen() {
        log(&format!("fullscreen: {err:?}"));
    }
    Ok(())
}

/// Called with the narrative view (a plain object) after every change.
#[wasm_bindgen]
pub fn story_on_change(callback: Function) {
    HOST.with(|h| {
        if let Some(host) = h.borrow_mut().as_mut() {
            host.on_change = Some(callback);
        }
    });
    notify();
}

#[wasm_bindgen]
pub fn story_view() -> JsValue {
    HOST.with(|h| {
        h.borrow()
            .as_ref()
            .and_then(|host| serde_json::to_value(host.engine.view()).ok())
            .map_or(JsValue::NULL, |v| to_js(&v))
    })
}

#[wasm_bindgen]
pub fn story_next() {
    with_engine(|e| e.go_next());
}

#[wasm_bindgen]
pub fn story_prev() {
    with_engine(|e| e.go_prev());
}

#[wasm_bindgen]
pub fn story_go_to(index: usize) {
    with_engine(|e| e.go_to_step(index));
}

/// Moves to `index` without leaving explore mode (scroll-observer sync).
#[wasm_bindgen]
pub fn story_set_step(index: usize) {
    with_engine(|e| e.set_step_index(index));
}

#[wasm_bindgen]
pub fn story_toggle_explore() {
    with_engine(|e| e.toggle_explore());
}

/// `phase` is `"pre"` or `"post"`.
#[wasm_bindgen]
pub fn story_select_phase(phase: &str) -> Result<(), JsValue> {
    let phase: Phase = serde_json::from_value(serde_json::Value::from(phase))
        .map_err(|e| JsValue::from_str(&format!("unknown phase {phase:?}: {e}")))?;
    with_engine(|e| e.select_phase(phase));
    Ok(())
}

#[wasm_bindgen]
pub fn story_reset_selection() {
    with_engine(|e| e.reset_selection());
}

#[wasm_bindgen]
pub fn story_dismiss_toast() {
    with_engine(|e| e.dismiss_toast());
}

#[wasm_bindgen]
pub fn story_close_inspect() {
    with_engine(|e| e.close_inspect());
}

/// Scale, radius and shadow of the map host for scroll `progress`, or
/// `null` when reduced motion disables the pin/zoom effect.
#[wasm_bindgen]
pub fn story_scroll_frame(progress: f64) -> JsValue {
    let Some(zoom) = ScrollZoom::activate(prefers_reduced_motion()) else {
        return JsValue::NULL;
    };
    serde_json::to_value(zoom.frame_at(progress)).map_or(JsValue::NULL, |v| to_js(&v))
}

/// Fetches and validates an authored step table; resolves to its JSON for
/// `story_mount`.
#[wasm_bindgen]
pub async fn story_load_steps(url: String) -> Result<String, JsValue> {
    let resp = Request::get(&url)
        .send()
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let text = resp
        .text()
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let table = StepTable::from_json(&text).map_err(|e| JsValue::from_str(&e.to_string()))?;
    table
        .to_json_pretty()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn map_options(container_id: &str, config: &StoryConfig) -> serde_json::Value {
    let view = &config.initial_view;
    serde_json::json!({
        "container": container_id,
        "style": config.style_url,
        "config": {
            "basemap": {
                "showPedestrianRoads": false,
                "show3dObjects": true,
                "showPlaceLabels": false,
                "showPointOfInterestLabels": false,
                "showRoadLabels": false,
                "showTransitLabels": false,
                "showAdminBoundaries": false,
                "showLandmarkIconLabels": false
            }
        },
        "zoom": view.zoom,
        "center": view.center,
        "pitch": view.pitch,
        "antialias": true
    })
}

fn on_map_load() {
    with_engine(|e| e.on_load());
    let registered = MOUNT_EVENTS.iter().try_for_each(|&event| {
        listen(ListenerTarget::MapLayer(EXTRUSION_LAYER.as_str()), event, move |e| {
            on_layer_event(event, &e)
        })
    });
    if let Err(err) = registered {
        log(&format!("layer listeners: {err:?}"));
    }
}

fn on_layer_event(event: &str, e: &JsValue) {
    let feature = first_feature(e);
    with_engine(|engine| match event {
        "mousemove" => engine.on_pointer_move(feature.as_ref()),
        "mouseleave" => engine.on_pointer_leave(),
        "click" => engine.on_click(feature.as_ref()),
        _ => {}
    });
}

fn first_feature(event: &JsValue) -> Option<Feature> {
    let features = js_sys::Reflect::get(event, &"features".into()).ok()?;
    let first = js_sys::Reflect::get(&features, &JsValue::from(0)).ok()?;
    if first.is_undefined() || first.is_null() {
        return None;
    }
    let id = js_sys::Reflect::get(&first, &"id".into()).unwrap_or(JsValue::UNDEFINED);
    let properties = js_sys::Reflect::get(&first, &"properties".into()).unwrap_or(JsValue::NULL);
    let payload = serde_json::json!({ "id": from_js(&id), "properties": from_js(&properties) });
    match serde_json::from_value::<Feature>(payload) {
        Ok(feature) => Some(feature),
        Err(err) => {
            log(&format!("feature payload: {err}"));
            None
        }
    }
}

fn resize_map() {
    HOST.with(|h| {
        if let Ok(host) = h.try_borrow()
            && let Some(host) = host.as_ref()
        {
            let _ = host.engine.surface().map().resize();
        }
    });
}

fn document() -> Result<web_sys::Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

/// Keeps the map sized to its container while the page scales or
/// fullscreens it.
fn observe_container(container_id: &str) -> Result<(), JsValue> {
    let container = document()?
        .get_element_by_id(container_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element #{container_id}")))?;
    let closure = Closure::<dyn FnMut(JsValue)>::new(|_| resize_map());
    let observer = ResizeObserver::new(closure.as_ref().unchecked_ref())?;
    observer.observe(&container);
    HOST.with(|h| match h.borrow_mut().as_mut() {
        Some(host) => {
            host.listeners.push(Listener {
                target: ListenerTarget::Resize(observer),
                event: "resize",
                closure,
            });
            Ok(())
        }
        None => {
            observer.disconnect();
            Err(JsValue::from_str("story is not mounted"))
        }
    })
}

fn prefers_reduced_motion() -> bool {
    web_sys::window()
        .and_then(|w| w.match_media("(prefers-reduced-motion: reduce)").ok().flatten())
        .is_some_and(|m| m.matches())
}

/// Runs `f` on the mounted engine, then pushes the new view to the page.
fn with_engine<R>(f: impl FnOnce(&mut StoryEngine<MapboxSurface>) -> R) -> Option<R> {
    let out = HOST.with(|h| {
        let Ok(mut host) = h.try_borrow_mut() else {
            log("story engine is busy");
            return None;
        };
        host.as_mut().map(|host| f(&mut host.engine))
    });
    if out.is_some() {
        notify();
    }
    out
}

fn notify() {
    let (callback, view) = HOST.with(|h| {
        let host = h.borrow();
        let Some(host) = host.as_ref() else {
            return (None, JsValue::NULL);
        };
        let view = serde_json::to_value(host.engine.view()).map_or(JsValue::NULL, |v| to_js(&v));
        (host.on_change.clone(), view)
    });
    if let Some(callback) = callback
        && let Err(err) = callback.call1(&JsValue::NULL, &view)
    {
        log(&format!("on_change callback: {err:?}"));
    }
}

fn listen(
    target: ListenerTarget,
    event: &'static str,
    handler: impl FnMut(JsValue) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(JsValue)>::new(handler);
    HOST.with(|h| {
        let mut host = h.borrow_mut();
        let Some(host) = host.as_mut() else {
            return Err(JsValue::from_str("story is not mounted"));
        };
        let f: &Function = closure.as_ref().unchecked_ref();
        let map = host.engine.surface().map();
        match &target {
            ListenerTarget::Map => map.on(event, f),
            ListenerTarget::MapLayer(layer) => map.on_layer(event, layer, f),
            ListenerTarget::Window => web_sys::window()
                .ok_or_else(|| JsValue::from_str("no window"))?
                .add_event_listener_with_callback(event, f)?,
            ListenerTarget::Document => document()?.add_event_listener_with_callback(event, f)?,
            ListenerTarget::Resize(_) => {
                return Err(JsValue::from_str("resize observers register through observe_container"));
            }
        }
        host.listeners.push(Listener {
            target,
            event,
            closure,
        });
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fullscreen_toggle_follows_document_state() {
        assert_eq!(FullscreenToggle::from_state(false), FullscreenToggle::Enter);
        assert_eq!(FullscreenToggle::from_state(true), FullscreenToggle::Exit);
    }

    #[test]
    fn map_options_use_config_view() {
        let options = map_options("map", &StoryConfig::default());
        assert_eq!(options["container"], "map");
        assert_eq!(options["style"], "mapbox://styles/mapbox/standard-satellite");
        assert_eq!(options["zoom"], 18.0);
        assert_eq!(options["pitch"], 60.0);
        assert_eq!(options["config"]["basemap"]["show3dObjects"], true);
    }
}
