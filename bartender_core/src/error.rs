use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ApplianceError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("unknown drink '{0}'")]
    UnknownDrink(String),
    #[error("ingredient '{0}' has no pump assigned")]
    Unpourable(String),
    #[error("invalid state: {0}")]
    State(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
