use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoryError {
    /// The map access token is empty; the map must not be initialised.
    #[error("missing map access token ({0})")]
    MissingAccessToken(&'static str),

    #[error("step table is empty")]
    EmptyStepTable,

    #[error("duplicate step id: {0}")]
    DuplicateStepId(String),

    #[error("invalid step {id:?}: {reason}")]
    InvalidStep { id: String, reason: String },

    /// A scripted user action that does not parse.
    #[error("invalid event {token:?}: {reason}")]
    InvalidEvent { token: String, reason: String },

    #[error("step table json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl StoryError {
    pub(crate) fn invalid(id: &str, reason: impl Into<String>) -> Self {
        StoryError::InvalidStep {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
