use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid frequency '{0}': expected one of daily, weekly, monthly, oneoff")]
    InvalidFrequency(String),

    #[error("Invalid PIN: {0}")]
    InvalidPin(String),
}

pub type Result<T> = std::result::Result<T, Error>;
