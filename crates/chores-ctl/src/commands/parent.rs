use anyhow::{bail, Context, Result};
use chores_app::{AppController, NoticeLevel, ParentTab};
use chores_common::{Chore, ChoreId, Frequency};

use super::chores::print_grouped;
use super::resolve_child;
use crate::auth;
use crate::frontend::{self, read_line, Answers};

/// Open the child's chores in the editor and find one of them.
async fn editing_chore(controller: &AppController, child: &str, chore_id: ChoreId) -> Result<Chore> {
    let child = resolve_child(controller, child).await?;
    controller.edit_child_chores(&child).await?;

    let chore =
        controller.read(|s| s.editing_chores.iter().find(|c| c.id == chore_id).cloned()).await;
    chore.with_context(|| format!("{} has no chore {}", child.name, chore_id))
}

async fn print_editing_chores(controller: &AppController) {
    controller
        .read(|s| {
            if let Some(child) = &s.editing_child {
                println!("Chores for {}", child.name);
            }
            print_grouped(&s.editing_chores);
        })
        .await;
}

pub async fn add_child(controller: &AppController, name: Option<String>) -> Result<()> {
    if frontend::drive(controller.modals(), Answers::text(name), controller.add_child()).await? {
        println!("Child added.");
        super::children::list(controller).await?;
    } else {
        println!("No child added.");
    }
    Ok(())
}

pub async fn rename_child(controller: &AppController, child: &str, name: Option<String>) -> Result<()> {
    let child = resolve_child(controller, child).await?;

    if frontend::drive(controller.modals(), Answers::text(name), controller.rename_child(&child))
        .await?
    {
        println!("Renamed.");
    } else {
        println!("Name unchanged.");
    }
    Ok(())
}

pub async fn remove_child(controller: &AppController, child: &str, yes: bool) -> Result<()> {
    let child = resolve_child(controller, child).await?;

    if frontend::drive(controller.modals(), Answers::assume_yes(yes), controller.remove_child(&child))
        .await?
    {
        println!("Removed {}.", child.name);
    } else {
        println!("Cancelled.");
    }
    Ok(())
}

pub async fn add_chore(
    controller: &AppController,
    child: &str,
    title: Option<String>,
    frequency: Option<Frequency>,
) -> Result<()> {
    let child = resolve_child(controller, child).await?;
    controller.edit_child_chores(&child).await?;
    controller.open_add_chore().await?;

    let title = match title {
        Some(title) => title,
        None => read_line("Chore title: ".to_string()).await?.unwrap_or_default(),
    };
    let frequency = match frequency {
        Some(frequency) => Some(frequency),
        None => read_line("Frequency (daily, weekly, monthly, oneoff): ".to_string())
            .await?
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.parse::<Frequency>())
            .transpose()?,
    };

    controller.set_add_chore_title(title).await;
    controller.set_add_chore_frequency(frequency).await;

    if !controller.confirm_add_chore().await? {
        controller.cancel_add_chore().await;
        bail!("A chore needs both a title and a frequency");
    }

    print_editing_chores(controller).await;
    Ok(())
}

pub async fn rename_chore(
    controller: &AppController,
    child: &str,
    chore_id: ChoreId,
    title: Option<String>,
) -> Result<()> {
    let chore = editing_chore(controller, child, chore_id).await?;

    if frontend::drive(controller.modals(), Answers::text(title), controller.rename_chore(&chore))
        .await?
    {
        print_editing_chores(controller).await;
    } else {
        println!("Title unchanged.");
    }
    Ok(())
}

pub async fn delete_chore(
    controller: &AppController,
    child: &str,
    chore_id: ChoreId,
    yes: bool,
) -> Result<()> {
    let chore = editing_chore(controller, child, chore_id).await?;

    if frontend::drive(controller.modals(), Answers::assume_yes(yes), controller.delete_chore(&chore))
        .await?
    {
        print_editing_chores(controller).await;
    } else {
        println!("Cancelled.");
    }
    Ok(())
}

pub async fn undo(controller: &AppController, child: &str, chore_id: ChoreId) -> Result<()> {
    let chore = editing_chore(controller, child, chore_id).await?;
    if !chore.completed {
        println!("'{}' is not done yet.", chore.title);
        return Ok(());
    }

    controller.uncomplete_chore(&chore).await?;
    print_editing_chores(controller).await;
    Ok(())
}

pub async fn change_pin(controller: &AppController) -> Result<()> {
    controller.set_parent_tab(ParentTab::Settings).await?;

    let current = auth::read_secret("Current PIN: ").await?;
    let new = auth::read_secret("New PIN: ").await?;
    controller.set_current_pin_input(current.as_str()).await;
    controller.set_new_pin_input(new.as_str()).await;

    controller.change_pin().await?;
    match controller.take_notice().await {
        Some(notice) if notice.level == NoticeLevel::Error => bail!("{}", notice.message),
        Some(notice) => println!("{}", notice.message),
        None => {}
    }
    Ok(())
}
