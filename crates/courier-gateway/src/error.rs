use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid gateway base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Invalid client setting: {0}")]
    InvalidInput(&'static str),

    #[error("Gateway transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
