use foundation::Feature;
use layers::filter::{CATEGORY_KEY, HEIGHT_KEY, STATUS_KEY};
use serde::Serialize;
use serde_json::Value;

use crate::step::Popup;

pub const INSPECT_TITLE: &str = "Building details";

/// Attribute details of the clicked feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectPanel {
    pub title: String,
    /// `Label: value` lines, in display order.
    pub lines: Vec<String>,
}

impl InspectPanel {
    pub fn for_feature(feature: &Feature) -> Self {
        let field = |key: &str, missing: &str| {
            feature
                .get(key)
                .map(display_value)
                .unwrap_or_else(|| missing.to_string())
        };
        let category = field(CATEGORY_KEY, "unknown");
        let status = field(STATUS_KEY, "unknown");
        let height = field(HEIGHT_KEY, "n/a");
        Self {
            title: INSPECT_TITLE.to_string(),
            lines: vec![
                format!("Category: {category}"),
                format!("Status: {status}"),
                format!("Height: {height}"),
            ],
        }
    }
}

fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Everything the narrative panel, toast and controls render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeView {
    pub step_id: String,
    pub title: String,
    pub body: String,
    pub step_index: usize,
    pub step_count: usize,
    pub explore_mode: bool,
    /// "Pre-conflict" or "Post-conflict".
    pub mode_label: &'static str,
    /// "Step 3/7"
    pub progress_label: String,
    pub can_go_prev: bool,
    pub can_go_next: bool,
    pub toast: Option<Popup>,
    pub inspect: Option<InspectPanel>,
}
