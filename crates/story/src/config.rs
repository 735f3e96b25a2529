use foundation::LonLat;
use layers::SourceSpec;

use crate::error::StoryError;
use crate::khartoum::CITY_CENTER;

/// Environment variable the native tools read the access token from.
pub const ACCESS_TOKEN_ENV: &str = "MAPBOX_TOKEN";

/// Map view before the first step is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialView {
    pub center: LonLat,
    pub zoom: f64,
    pub pitch: f64,
}

/// Everything the host needs to create the map surface.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryConfig {
    pub access_token: String,
    pub style_url: String,
    pub source: SourceSpec,
    pub initial_view: InitialView,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            style_url: "mapbox://styles/mapbox/standard-satellite".to_string(),
            source: SourceSpec {
                id: "khartoum".to_string(),
                url: "mapbox://paschek7.khartoum_buildings_v1".to_string(),
                source_layer: "buildings".to_string(),
            },
            initial_view: InitialView {
                center: CITY_CENTER,
                zoom: 18.0,
                pitch: 60.0,
            },
        }
    }
}

impl StoryConfig {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            access_token: token.into(),
            ..Self::default()
        }
    }

    /// The access token, or `MissingAccessToken` when it is blank.
    pub fn require_token(&self) -> Result<&str, StoryError> {
        let token = self.access_token.trim();
        if token.is_empty() {
            return Err(StoryError::MissingAccessToken(ACCESS_TOKEN_ENV));
        }
        Ok(token)
    }
}
