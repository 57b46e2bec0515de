use thiserror::Error;

#[derive(Error, Debug)]
pub enum CareError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Building not found: {0:?}")]
    BuildingNotFound(crate::core::types::BuildingId),
}

pub type Result<T> = std::result::Result<T, CareError>;
