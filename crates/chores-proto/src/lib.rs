//! Contract between the chores client and the household server.
//!
//! [`paths`] names every endpoint; [`wire`] holds the request bodies and the
//! response envelopes that are not plain domain types.

pub mod paths;
pub mod wire;

pub use wire::*;
