use chores_common::{ChildId, ChoreId};

pub const PIN_EXISTS: &str = "/api/auth/pin-exists";
pub const VERIFY_PIN: &str = "/api/auth/verify-pin";
pub const SET_PIN: &str = "/api/auth/set-pin";
pub const CHILDREN: &str = "/api/children";
pub const HISTORY: &str = "/api/history";

pub fn child(id: ChildId) -> String {
    format!("{CHILDREN}/{id}")
}

pub fn child_chores(child_id: ChildId) -> String {
    format!("{CHILDREN}/{child_id}/chores")
}

pub fn chore(chore_id: ChoreId) -> String {
    format!("/api/chores/{chore_id}")
}

pub fn chore_completion(chore_id: ChoreId) -> String {
    format!("/api/chores/{chore_id}/complete")
}

pub fn child_history(child_id: ChildId) -> String {
    format!("{HISTORY}/child/{child_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_paths() {
        assert_eq!(child(3), "/api/children/3");
        assert_eq!(child_chores(3), "/api/children/3/chores");
        assert_eq!(chore(12), "/api/chores/12");
        assert_eq!(chore_completion(12), "/api/chores/12/complete");
        assert_eq!(child_history(3), "/api/history/child/3");
    }
}
