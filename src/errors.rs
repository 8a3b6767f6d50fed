use thiserror::Error;

#[derive(Error, Debug)]
pub enum CastdropError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credential: {0} not set in the environment")]
    MissingCredential(&'static str),

    #[error("Search API rejected the configured API key (HTTP 401)")]
    Unauthorized,

    #[error("Search API rate limit exceeded (HTTP 429)")]
    RateLimited,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Custom error: {0}")]
    Custom(String),
}

impl From<&str> for CastdropError {
    fn from(msg: &str) -> Self {
        Self::Custom(msg.to_string())
    }
}

impl From<String> for CastdropError {
    fn from(msg: String) -> Self {
        Self::Custom(msg)
    }
}

pub type Result<T> = std::result::Result<T, CastdropError>;
