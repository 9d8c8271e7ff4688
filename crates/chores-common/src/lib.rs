pub mod config;
pub mod error;
pub mod format;
pub mod pin;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
