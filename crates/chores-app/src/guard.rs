use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chores_common::{ChildId, ChoreId};

/// A user-triggerable operation, keyed finely enough that unrelated
/// operations never block each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    SelectChild(ChildId),
    ToggleChore(ChoreId),
    AddChild,
    RenameChild(ChildId),
    RemoveChild(ChildId),
    EditChildChores(ChildId),
    ConfirmAddChore,
    RenameChore(ChoreId),
    DeleteChore(ChoreId),
    UncompleteChore(ChoreId),
    LoadReport,
    ChangePin,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::SelectChild(id) => write!(f, "select child {id}"),
            Action::ToggleChore(id) => write!(f, "complete chore {id}"),
            Action::AddChild => f.write_str("add child"),
            Action::RenameChild(id) => write!(f, "rename child {id}"),
            Action::RemoveChild(id) => write!(f, "remove child {id}"),
            Action::EditChildChores(id) => write!(f, "load chores for child {id}"),
            Action::ConfirmAddChore => f.write_str("add chore"),
            Action::RenameChore(id) => write!(f, "rename chore {id}"),
            Action::DeleteChore(id) => write!(f, "delete chore {id}"),
            Action::UncompleteChore(id) => write!(f, "undo chore {id}"),
            Action::LoadReport => f.write_str("load report"),
            Action::ChangePin => f.write_str("change PIN"),
        }
    }
}

/// Set of actions with a request outstanding.
#[derive(Clone, Default)]
pub struct InFlight {
    active: Arc<Mutex<HashSet<Action>>>,
}

impl InFlight {
    /// Mark `action` as running. `None` if it already is.
    pub fn try_begin(&self, action: Action) -> Option<InFlightGuard> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(action) {
            return None;
        }
        Some(InFlightGuard { action, active: Arc::clone(&self.active) })
    }

    pub fn is_active(&self, action: Action) -> bool {
        self.active.lock().unwrap_or_else(PoisonError::into_inner).contains(&action)
    }
}

/// Clears its action when dropped, including when the flow errors or is cancelled.
pub struct InFlightGuard {
    action: Action,
    active: Arc<Mutex<HashSet<Action>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.active.lock().unwrap_or_else(PoisonError::into_inner).remove(&self.action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_is_refused_until_guard_drops() {
        let in_flight = InFlight::default();

        let guard = in_flight.try_begin(Action::ToggleChore(3)).unwrap();
        assert!(in_flight.try_begin(Action::ToggleChore(3)).is_none());
        assert!(in_flight.try_begin(Action::ToggleChore(4)).is_some());
        assert!(in_flight.is_active(Action::ToggleChore(3)));

        drop(guard);
        assert!(!in_flight.is_active(Action::ToggleChore(3)));
        assert!(in_flight.try_begin(Action::ToggleChore(3)).is_some());
    }
}
