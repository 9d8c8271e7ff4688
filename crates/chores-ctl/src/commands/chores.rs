use anyhow::{bail, Result};
use chores_app::state::chores_by_frequency;
use chores_app::AppController;
use chores_common::format::{format_frequency, format_time};
use chores_common::{Chore, ChoreId, Frequency};

use super::resolve_child;

/// Print chores grouped by frequency, skipping empty groups.
pub fn print_grouped(chores: &[Chore]) {
    if chores.is_empty() {
        println!("  (no chores)");
        return;
    }

    for frequency in Frequency::ALL {
        let group = chores_by_frequency(chores, frequency);
        if group.is_empty() {
            continue;
        }

        println!("{}:", format_frequency(Some(frequency)));
        for chore in group {
            let mark = if chore.completed { "x" } else { " " };
            let done_at = format_time(chore.completed_at.as_deref());
            if done_at.is_empty() {
                println!("  [{}] {:>4}  {}", mark, chore.id, chore.title);
            } else {
                println!("  [{}] {:>4}  {} (done {})", mark, chore.id, chore.title, done_at);
            }
        }
    }
}

/// Kid view: a child's chores for the current period.
pub async fn show(controller: &AppController, child: &str) -> Result<()> {
    let child = resolve_child(controller, child).await?;
    controller.select_child(&child).await?;

    println!("Chores for {}", child.name);
    controller.read(|s| print_grouped(&s.chores)).await;
    Ok(())
}

/// Kid view: mark one chore done.
pub async fn done(controller: &AppController, child: &str, chore_id: ChoreId) -> Result<()> {
    let child = resolve_child(controller, child).await?;
    controller.select_child(&child).await?;

    let Some(chore) = controller.read(|s| s.chores.iter().find(|c| c.id == chore_id).cloned()).await
    else {
        bail!("{} has no chore {}", child.name, chore_id);
    };

    if controller.toggle_chore(chore_id).await? {
        println!("Nice work, {}! '{}' is done.", child.name, chore.title);
    } else if chore.completed {
        println!("'{}' was already done.", chore.title);
    } else {
        println!("'{}' could not be marked done.", chore.title);
    }
    Ok(())
}
