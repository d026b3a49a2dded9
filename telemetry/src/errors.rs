use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
