use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KarmaError {
    #[error("configuration error: manifest not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("configuration error: {0}")]
    InvalidConfig(String),

    #[error("profile store {} is corrupt: {source}", .path.display())]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KarmaError>;
