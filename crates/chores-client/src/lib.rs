//! API gateway client for the household chores server.
//!
//! Every backend operation is one request/response round trip exposed through
//! the [`ChoresApi`] trait. [`HttpClient`] talks to the real server;
//! [`MemoryBackend`] implements the same contract in process.

pub mod api;
pub mod error;
pub mod http;
pub mod memory;

pub use api::ChoresApi;
pub use error::ApiError;
pub use http::HttpClient;
pub use memory::MemoryBackend;
