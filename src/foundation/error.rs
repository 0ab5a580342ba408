pub type CamStackResult<T> = Result<T, CamStackError>;

/// Errors surfaced by the blend-stack core.
///
/// Frame evaluation itself never fails; these come out of construction, snapshot loading and
/// configuration parsing.
#[derive(thiserror::Error, Debug)]
pub enum CamStackError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("construction error: {0}")]
    Construction(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CamStackError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn construction(msg: impl Into<String>) -> Self {
        Self::Construction(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for CamStackError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
