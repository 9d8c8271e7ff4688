use anyhow::{bail, Result};
use chores_app::AppController;
use chores_common::Child;

pub mod children;
pub mod chores;
pub mod parent;
pub mod report;

/// Find a loaded child by id or by case-insensitive name.
pub async fn resolve_child(controller: &AppController, key: &str) -> Result<Child> {
    let key = key.trim();
    let found = controller
        .read(|state| match key.parse::<i64>() {
            Ok(id) => state.children.iter().find(|c| c.id == id).cloned(),
            Err(_) => state.children.iter().find(|c| c.name.eq_ignore_ascii_case(key)).cloned(),
        })
        .await;

    match found {
        Some(child) => Ok(child),
        None => bail!("No child matching '{}'", key),
    }
}
