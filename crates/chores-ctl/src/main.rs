use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chores_app::AppController;
use chores_client::{ChoresApi, HttpClient, MemoryBackend};
use chores_common::{ChoreId, Frequency};
use clap::{Parser, Subcommand};
use chores_proto::MAX_HISTORY_DAYS;
use tracing::{error, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, EnvFilter, Registry};

mod auth;
mod commands;
mod config;
mod frontend;

#[derive(Parser)]
#[command(name = "chores-ctl")]
#[command(about = "Household chores tracker", long_about = None)]
struct Cli {
    #[arg(long, global = true, help = "Path to the client configuration file")]
    config: Option<PathBuf>,

    #[arg(long, global = true, env = "CHORES_SERVER", help = "Server base URL")]
    server: Option<String>,

    #[arg(long, global = true, help = "Use built-in demo data instead of a server")]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List children
    Children,

    /// Show a child's chores
    Chores {
        #[arg(help = "Child id or name")]
        child: String,
    },

    /// Mark a chore as done
    Done {
        #[arg(help = "Child id or name")]
        child: String,
        chore_id: ChoreId,
    },

    /// Parent actions (asks for the PIN)
    Parent {
        #[command(subcommand)]
        action: ParentAction,
    },
}

#[derive(Subcommand)]
enum ParentAction {
    AddChild {
        name: Option<String>,
    },
    RenameChild {
        child: String,
        name: Option<String>,
    },
    RemoveChild {
        child: String,
        #[arg(short, long, help = "Do not ask for confirmation")]
        yes: bool,
    },
    AddChore {
        child: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long, help = "daily, weekly, monthly or oneoff")]
        frequency: Option<Frequency>,
    },
    RenameChore {
        child: String,
        chore_id: ChoreId,
        #[arg(short, long)]
        title: Option<String>,
    },
    DeleteChore {
        child: String,
        chore_id: ChoreId,
        #[arg(short, long, help = "Do not ask for confirmation")]
        yes: bool,
    },
    /// Undo a completion for the current period
    Undo {
        child: String,
        chore_id: ChoreId,
    },
    Report {
        #[arg(
            short,
            long,
            help = "Number of days to include",
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_HISTORY_DAYS))
        )]
        days: Option<u32>,
    },
    ChangePin,
}

/// Start logging at `info` so config loading is visible; the configured
/// level is applied later through the returned handle.
fn init_tracing() -> reload::Handle<EnvFilter, Registry> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_line_number(true),
        )
        .init();
    handle
}

/// Switch to the configured level unless RUST_LOG overrides it.
fn apply_log_level(handle: &reload::Handle<EnvFilter, Registry>, level: &str) -> Result<()> {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_none() {
        handle.reload(EnvFilter::new(level))?;
    }
    Ok(())
}

async fn run(controller: &AppController, command: Commands) -> Result<()> {
    controller.init().await?;

    match command {
        Commands::Children => commands::children::list(controller).await?,
        Commands::Chores { child } => commands::chores::show(controller, &child).await?,
        Commands::Done { child, chore_id } => {
            commands::chores::done(controller, &child, chore_id).await?
        }
        Commands::Parent { action } => {
            auth::authenticate(controller).await?;
            match action {
                ParentAction::AddChild { name } => {
                    commands::parent::add_child(controller, name).await?
                }
                ParentAction::RenameChild { child, name } => {
                    commands::parent::rename_child(controller, &child, name).await?
                }
                ParentAction::RemoveChild { child, yes } => {
                    commands::parent::remove_child(controller, &child, yes).await?
                }
                ParentAction::AddChore { child, title, frequency } => {
                    commands::parent::add_chore(controller, &child, title, frequency).await?
                }
                ParentAction::RenameChore { child, chore_id, title } => {
                    commands::parent::rename_chore(controller, &child, chore_id, title).await?
                }
                ParentAction::DeleteChore { child, chore_id, yes } => {
                    commands::parent::delete_chore(controller, &child, chore_id, yes).await?
                }
                ParentAction::Undo { child, chore_id } => {
                    commands::parent::undo(controller, &child, chore_id).await?
                }
                ParentAction::Report { days } => commands::report::show(controller, days).await?,
                ParentAction::ChangePin => commands::parent::change_pin(controller).await?,
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_handle = init_tracing();

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        config.server.base_url = server;
    }
    apply_log_level(&log_handle, &config.general.log_level)?;
    config::validate(&config)?;

    let api: Arc<dyn ChoresApi> = if cli.offline {
        info!("Running offline with demo data");
        Arc::new(MemoryBackend::new().with_demo_data())
    } else {
        Arc::new(HttpClient::from_config(&config.server)?)
    };
    let controller = AppController::with_report_days(api, config.report.default_days);

    if let Err(e) = run(&controller, cli.command).await {
        error!("Command failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_days_must_be_positive() {
        let parse = |days: &str| Cli::try_parse_from(["chores-ctl", "parent", "report", "--days", days]);

        assert!(parse("0").is_err());
        assert!(parse("366").is_err());
        match parse("14").unwrap().command {
            Commands::Parent { action: ParentAction::Report { days } } => assert_eq!(days, Some(14)),
            _ => panic!("expected the report command"),
        }
    }

    #[test]
    fn test_configured_log_level_replaces_bootstrap_filter() {
        let (filter, handle) = reload::Layer::new(EnvFilter::new("info"));
        let _subscriber = tracing_subscriber::registry().with(filter);

        apply_log_level(&handle, "debug").unwrap();

        let current = handle.with_current(|f| f.to_string()).unwrap();
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_none() {
            assert_eq!(current, "debug");
        } else {
            assert_eq!(current, "info");
        }
    }
}
