//! # taskboard
//!
//! Terminal front end for the task-management API.
//!
//! ```bash
//! taskboard login admin@example.com --password secret
//! taskboard list --status in_progress --include assignee
//! taskboard create "Write report" --priority high --due 2025-12-01
//! taskboard update <ID> --status done
//! taskboard board
//! taskboard stats
//! ```
//!
//! The API base URL comes from `TASKBOARD_API_URL` (default
//! `http://localhost:8080`). The session token is kept in
//! `TASKBOARD_TOKEN_FILE`, or the local data directory when unset.

mod commands;
mod render;

use std::io::{self, BufRead};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use taskboard_core::{ClientConfig, TaskApi, UreqTransport};

use commands::*;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Task board client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        email: String,
        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the stored session token
    Logout,
    /// List tasks, newest first
    List {
        /// todo, in_progress, review or done
        #[arg(short, long)]
        status: Option<String>,
        /// Related records to join, e.g. assignee
        #[arg(short, long)]
        include: Option<String>,
    },
    /// Show one task with its relations
    Show { id: String },
    /// Create a task
    Create {
        title: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Change fields of a task
    Update {
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
        /// Hours actually spent
        #[arg(short = 'A', long)]
        actual: Option<f64>,
    },
    /// Delete a task
    Delete { id: String },
    /// Case-insensitive search over title and description
    Search { query: String },
    /// Dashboard counters
    Stats,
    /// Tasks grouped into status columns
    Board,
    /// Recorded edits of a task
    History { id: String },
}

#[derive(Args)]
struct FieldArgs {
    #[arg(short, long)]
    description: Option<String>,
    /// todo, in_progress, review or done
    #[arg(short, long)]
    status: Option<String>,
    /// low, medium, high or urgent
    #[arg(short, long)]
    priority: Option<String>,
    /// Assignee user id
    #[arg(short, long)]
    assignee: Option<String>,
    /// Due date in YYYY-MM-DD or RFC3339
    #[arg(long)]
    due: Option<String>,
    /// Estimated hours, e.g. 1.5
    #[arg(short = 'H', long)]
    hours: Option<f64>,
}

impl FieldArgs {
    fn into_fields(self, title: Option<String>, actual: Option<f64>) -> TaskFields {
        TaskFields {
            title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            assignee: self.assignee,
            due: self.due,
            hours: self.hours,
            actual,
        }
    }
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "taskboard=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr);
    if json_logs {
        builder.with_target(false).json().init();
    } else {
        builder.init();
    }
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn run(command: Commands, api: &mut TaskApi<UreqTransport>) -> Result<String> {
    match command {
        Commands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            cmd_login(api, &email, &password)
        }
        Commands::Logout => cmd_logout(api),
        Commands::List { status, include } => cmd_list(api, status, include),
        Commands::Show { id } => cmd_show(api, &id),
        Commands::Create { title, fields } => cmd_create(api, title, fields.into_fields(None, None)),
        Commands::Update { id, title, fields, actual } => cmd_update(api, &id, fields.into_fields(title, actual)),
        Commands::Delete { id } => cmd_delete(api, &id),
        Commands::Search { query } => cmd_search(api, &query),
        Commands::Stats => cmd_stats(api),
        Commands::Board => cmd_board(api),
        Commands::History { id } => cmd_history(api, &id),
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = ClientConfig::from_env();
    let result = TaskApi::from_config(&config)
        .map_err(anyhow::Error::from)
        .and_then(|mut api| run(cli.command, &mut api));

    match result {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
