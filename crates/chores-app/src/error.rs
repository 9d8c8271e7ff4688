use chores_client::ApiError;
use chores_common::ChoreId;
use thiserror::Error;

use crate::guard::Action;
use crate::state::View;

/// Failures a controller operation hands back to the frontend.
///
/// Wrong PINs and form validation are not errors; they end up as PIN pad
/// text or a [`crate::Notice`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Already busy: {0}")]
    Busy(Action),

    #[error("Cannot {action} from the {from} view")]
    InvalidTransition { action: &'static str, from: View },

    #[error("Parent PIN required")]
    NotAuthenticated,

    #[error("No child is being edited")]
    NoChildBeingEdited,

    #[error("Chore {0} is not loaded")]
    ChoreNotLoaded(ChoreId),
}

pub type Result<T> = std::result::Result<T, AppError>;
