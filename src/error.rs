use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown target language: {0}")]
    UnknownLanguage(String),
}

pub type Result<T> = std::result::Result<T, RpyError>;
