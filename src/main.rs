//! # Kountdown CLI
//!
//! Countdown event reminders: stores events and subscribers, schedules
//! lead-time notifications, and runs the background poller that delivers them.
//!
//! Usage:
//!   kountdown add "Launch" "First crewed flight" "2026-03-01 12:00:00"
//!   kountdown list                    # Pending events
//!   kountdown list --subscribers      # Recipients
//!   kountdown edit 3 --time "2026-03-02 12:00:00"
//!   kountdown remove 3
//!   kountdown subscribe "#ops"
//!   kountdown run                     # Start the poller until ctrl-c

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use kountdown_core::KountdownConfig;
use kountdown_core::traits::{EventStore, SubscriberStore};
use kountdown_dispatch::create_dispatcher;
use kountdown_scheduler::Engine;
use kountdown_store::SqliteStore;

#[derive(Parser)]
#[command(
    name = "kountdown",
    version,
    about = "Countdown event reminders for users and channels"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a countdown event
    Add {
        name: String,
        description: String,
        /// Target time as UTC "YYYY-MM-DD HH:MM:SS"
        time: String,
    },

    /// List pending events (or subscribers)
    List {
        /// List subscribers instead of events
        #[arg(long)]
        subscribers: bool,
    },

    /// Delete an event by id
    Remove { id: i64 },

    /// Edit an event by id
    Edit {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// New target time as UTC "YYYY-MM-DD HH:MM:SS"
        #[arg(long)]
        time: Option<String>,
    },

    /// Subscribe a user or #channel to notifications
    Subscribe { name: String },

    /// Unsubscribe a user or #channel
    Unsubscribe { name: String },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run the notification poller until interrupted
    Run,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the current configuration to ~/.kountdown/config.toml
    Init,
    /// Show the effective configuration
    Show,
}

fn parse_target_time(input: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S")
        .with_context(|| format!("invalid time '{input}', expected YYYY-MM-DD HH:MM:SS"))?;
    Ok(Utc.from_utc_datetime(&naive))
}

fn load_config(cli: &Cli) -> Result<KountdownConfig> {
    let config = match &cli.config {
        Some(path) => KountdownConfig::load_from(std::path::Path::new(path))?,
        None => KountdownConfig::load()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_config(&cli)?;
    let store = Arc::new(SqliteStore::open(&config.database_path())?);

    match cli.command {
        Commands::Add {
            name,
            description,
            time,
        } => {
            let target_time = parse_target_time(&time)?;
            let event = store.add(&name, &description, target_time).await?;
            println!(
                "Added event #{}: {} at {}",
                event.id,
                event.name,
                event.target_time.format("%Y-%m-%d %H:%M:%S")
            );
        }

        Commands::List { subscribers } => {
            if subscribers {
                for sub in SubscriberStore::list(store.as_ref()).await? {
                    println!("{}", sub.name);
                }
            } else {
                let now = Utc::now();
                for event in EventStore::list(store.as_ref()).await? {
                    let marker = if event.target_time < now { " (past)" } else { "" };
                    println!(
                        "#{}: {} at {}{}",
                        event.id,
                        event.name,
                        event.target_time.format("%Y-%m-%d %H:%M:%S"),
                        marker
                    );
                }
            }
        }

        Commands::Remove { id } => {
            store.remove(id).await?;
            println!("Removed event #{id}");
        }

        Commands::Edit {
            id,
            name,
            description,
            time,
        } => {
            let mut event = store
                .get(id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("no event with id {id}"))?;
            if let Some(name) = name {
                event.name = name;
            }
            if let Some(description) = description {
                event.description = description;
            }
            if let Some(time) = time {
                event.target_time = parse_target_time(&time)?;
            }
            store.update(&event).await?;
            println!("Updated event #{id}");
        }

        Commands::Subscribe { name } => {
            store.subscribe(&name).await?;
            println!("Subscribed {name}");
        }

        Commands::Unsubscribe { name } => {
            store.unsubscribe(&name).await?;
            println!("Unsubscribed {name}");
        }

        Commands::Config { action } => match action {
            ConfigAction::Init => {
                config.save()?;
                println!("Wrote {}", KountdownConfig::default_path().display());
            }
            ConfigAction::Show => {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        },

        Commands::Run => {
            let engine = Engine::new(store.clone(), store.clone());
            engine.on_startup().await?;

            let dispatcher = create_dispatcher(&config)?;
            let (poller, handle) =
                engine.start_poller(dispatcher, Duration::from_secs(config.poll_interval_secs));

            tokio::signal::ctrl_c().await?;
            tracing::info!("shutting down");
            poller.shutdown();
            handle.await?;
        }
    }

    Ok(())
}
