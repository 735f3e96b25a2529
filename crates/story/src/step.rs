use foundation::LonLat;
use serde::{Deserialize, Serialize};

/// Camera transition used when a step leaves `duration_ms` unset.
pub const DEFAULT_FLY_DURATION_MS: u32 = 1400;

/// Which side of the conflict a step looks at.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Pre,
    Post,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Pre => "Pre-conflict",
            Mode::Post => "Post-conflict",
        }
    }
}

/// Title and body of a step toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Popup {
    pub title: String,
    pub body: String,
}

impl Popup {
    pub fn new(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraTarget {
    pub center: LonLat,
    pub zoom: f64,
    /// Keeps the map's current pitch when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    /// Keeps the map's current bearing when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u32>,
}

impl CameraTarget {
    pub fn duration_ms(&self) -> u32 {
        self.duration_ms.unwrap_or(DEFAULT_FLY_DURATION_MS)
    }
}

/// Data and style directives of a step. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepActions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statuses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline_damaged: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popup: Option<Popup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub title: String,
    pub body: String,
    pub camera: CameraTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<StepActions>,
}

impl Step {
    pub fn mode(&self) -> Option<Mode> {
        self.actions.as_ref().and_then(|a| a.mode)
    }

    pub fn categories(&self) -> &[String] {
        self.actions
            .as_ref()
            .map(|a| a.categories.as_slice())
            .unwrap_or_default()
    }

    pub fn statuses(&self) -> &[String] {
        self.actions
            .as_ref()
            .map(|a| a.statuses.as_slice())
            .unwrap_or_default()
    }

    pub fn height_scale(&self) -> f64 {
        self.actions
            .as_ref()
            .and_then(|a| a.height_scale)
            .unwrap_or(1.0)
    }

    /// Outline is hidden unless the step asks for it.
    pub fn outline_damaged(&self) -> bool {
        self.actions
            .as_ref()
            .and_then(|a| a.outline_damaged)
            .unwrap_or(false)
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.actions.as_ref().and_then(|a| a.popup.as_ref())
    }
}
