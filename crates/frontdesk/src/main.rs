// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Frontdesk - an automated SMS front desk for a small business.
//!
//! This is the binary entry point: the `serve` loop plus operator and
//! inspection commands.

mod adapters;
mod admin;
mod inspect;
mod serve;

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;

use frontdesk_config::FrontdeskConfig;
use frontdesk_core::{ConversationId, ConversationStatus, FrontdeskError};

use crate::admin::Admin;

/// Frontdesk - an automated SMS front desk for a small business.
#[derive(Parser, Debug)]
#[command(name = "frontdesk", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Process JSON-lines events from stdin, writing outcomes to stdout.
    Serve,
    /// Show the canonical form of a phone number.
    Normalize { raw: String },
    /// Run the classifier chain over a message.
    Classify {
        text: String,
        /// Origin identifier (phone number, short code or sender ID).
        #[arg(long, default_value = "")]
        from: String,
    },
    /// Extract contact details and a customer name from a message.
    Extract { text: String },
    /// Check whether a closure notice is active.
    Holiday {
        /// Notice text; defaults to `business.special_notice`.
        notice: Option<String>,
        /// Date to check (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Return lapsed manual conversations to auto once.
    Sweep,
    /// Inspect and control conversations.
    Conversations {
        #[command(subcommand)]
        action: ConversationCommand,
    },
    /// Kill switch: pause every auto and manual conversation.
    PauseAll,
    /// Release the kill switch, restoring each conversation's prior status.
    ResumeAll,
    /// Show recent staff alerts.
    Alerts {
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Validate configuration and exit.
    CheckConfig {
        /// Print the effective configuration as TOML.
        #[arg(long)]
        print: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConversationCommand {
    /// List conversations, most recently updated first.
    List {
        #[arg(long)]
        status: Option<ConversationStatus>,
        #[arg(long)]
        json: bool,
    },
    /// Show a conversation's mode and staff cooldown.
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Hand a conversation back to automation.
    Resume { id: String },
    /// Assign a conversation to a staff member.
    Takeover {
        id: String,
        #[arg(long)]
        assignee: String,
    },
    /// Close a conversation; the customer's next text opens a new one.
    Archive { id: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => frontdesk_config::load_and_validate_path(path),
        None => frontdesk_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            frontdesk_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli.command, config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Option<Commands>, config: FrontdeskConfig) -> Result<(), FrontdeskError> {
    match command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Normalize { raw }) => print_json(&inspect::normalize(&config, &raw)),
        Some(Commands::Classify { text, from }) => {
            print_json(&inspect::classify(&config, &text, &from))
        }
        Some(Commands::Extract { text }) => print_json(&inspect::extract(&text)),
        Some(Commands::Holiday { notice, date }) => {
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            print_json(&inspect::holiday(&config, notice.as_deref(), date))
        }
        Some(Commands::CheckConfig { print }) => {
            if print {
                let rendered = toml::to_string_pretty(&config).map_err(|e| {
                    FrontdeskError::Internal(format!("failed to render config: {e}"))
                })?;
                print!("{rendered}");
                return Ok(());
            }
            println!(
                "frontdesk: config ok (agent.name={}, database={})",
                config.agent.name, config.storage.database_path
            );
            Ok(())
        }
        Some(command) => run_admin(command, &config).await,
        None => {
            println!("frontdesk: use --help for available commands");
            Ok(())
        }
    }
}

async fn run_admin(command: Commands, config: &FrontdeskConfig) -> Result<(), FrontdeskError> {
    serve::init_tracing(&config.agent.log_level);
    let admin = Admin::open(config).await?;
    let result = run_admin_command(&admin, command).await;
    admin.close().await?;
    result
}

async fn run_admin_command(admin: &Admin, command: Commands) -> Result<(), FrontdeskError> {
    let now = Utc::now();
    match command {
        Commands::Sweep => {
            let reset = admin.sweep(now).await?;
            println!("{reset} conversation(s) returned to auto");
        }
        Commands::PauseAll => {
            let paused = admin.pause_all(now).await?;
            println!("{paused} conversation(s) paused");
        }
        Commands::ResumeAll => {
            let resumed = admin.resume_all(now).await?;
            println!("{resumed} conversation(s) resumed");
        }
        Commands::Alerts { limit, json } => {
            let alerts = admin.alerts(limit).await?;
            if json {
                print_json(&alerts)?;
            } else if alerts.is_empty() {
                println!("no alerts");
            } else {
                for alert in &alerts {
                    println!("{}", admin::alert_row(alert));
                }
            }
        }
        Commands::Conversations { action } => match action {
            ConversationCommand::List { status, json } => {
                let conversations = admin.list(status).await?;
                if json {
                    print_json(&conversations)?;
                } else {
                    println!("{}", admin::conversation_header());
                    for conversation in &conversations {
                        println!("{}", admin::conversation_row(conversation));
                    }
                }
            }
            ConversationCommand::Show { id, json } => {
                let view = admin.show(&ConversationId(id), now).await?;
                if json {
                    print_json(&view)?;
                } else {
                    println!("{}", admin::describe_view(&view));
                }
            }
            ConversationCommand::Resume { id } => {
                let conversation = admin.resume(&ConversationId(id), now).await?;
                println!("{} is now {}", conversation.id, conversation.status);
            }
            ConversationCommand::Takeover { id, assignee } => {
                let conversation = admin.takeover(&ConversationId(id), &assignee, now).await?;
                println!("{} assigned to {assignee}", conversation.id);
            }
            ConversationCommand::Archive { id } => {
                let conversation = admin.archive(&ConversationId(id), now).await?;
                println!("{} archived", conversation.id);
            }
        },
        other => {
            return Err(FrontdeskError::Internal(format!(
                "{other:?} is not an operator command"
            )));
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), FrontdeskError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| FrontdeskError::Internal(format!("failed to encode output: {e}")))?;
    println!("{rendered}");
    Ok(())
}
