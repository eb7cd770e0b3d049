use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Atom not found: {id}")]
    NotFound { id: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl CoreError {
    pub(crate) fn not_found(id: impl std::fmt::Display) -> Self {
        CoreError::NotFound { id: id.to_string() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound { .. })
    }
}
