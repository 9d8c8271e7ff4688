use anyhow::{bail, Result};
use chores_app::{AppController, ParentTab};
use chores_common::format::{format_date_local, format_time};
use chores_common::HistoryDay;

fn print_report(days: u32, report: &[HistoryDay]) {
    println!("Completed chores, last {} days", days);
    println!("═══════════════════════════════════════════════");

    if report.is_empty() {
        println!("Nothing completed in this period.");
        return;
    }

    for day in report {
        println!("\n{}", format_date_local(&day.date));
        for child in &day.children {
            println!("  {}", child.name);
            for chore in &child.chores {
                println!("    {:>8}  {}", format_time(chore.completed_at.as_deref()), chore.title);
            }
        }
    }
}

/// Completion report for the configured or requested window.
pub async fn show(controller: &AppController, days: Option<u32>) -> Result<()> {
    controller.set_parent_tab(ParentTab::Report).await?;
    if let Some(days) = days {
        if !controller.set_report_days(days).await {
            bail!("The report needs at least one day");
        }
    }
    controller.load_report().await?;

    controller.read(|s| print_report(s.report_days, &s.report)).await;
    Ok(())
}
