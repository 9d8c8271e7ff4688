//! Application state controller for the household chores tracker.
//!
//! [`AppController`] owns an [`AppState`] and turns user actions (navigation,
//! PIN entry, child and chore edits, the report, PIN changes) into
//! [`chores_client::ChoresApi`] calls. Prompts and confirmations are awaitable
//! through the [`ModalHost`], which the rendering layer watches and resolves.

pub mod app;
pub mod error;
pub mod guard;
pub mod modal;
pub mod state;

pub use app::{AppController, PinOutcome};
pub use error::{AppError, Result};
pub use guard::Action;
pub use modal::{ModalError, ModalHost, ModalSnapshot};
pub use state::{AppState, Notice, NoticeLevel, ParentTab, View};
