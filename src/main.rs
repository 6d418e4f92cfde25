use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "learntrack")]
#[command(about = "Gamified learning progress tracker - points, streaks, achievements")]
#[command(version)]
struct Cli {
    /// Path to the progress database (defaults to ~/.learntrack/progress.db)
    #[arg(short, long, global = true)]
    db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database and seed the Foundations course catalog
    Init,

    /// Register a new user
    AddUser {
        /// Username to register
        username: String,
    },

    /// Mark a lesson complete
    Complete {
        /// Username
        username: String,
        /// Lesson id (see `dashboard` for the list)
        lesson_id: i64,
    },

    /// Remove a completion
    Uncomplete {
        /// Username
        username: String,
        /// Lesson id
        lesson_id: i64,
    },

    /// Show a user's dashboard
    Dashboard {
        /// Username
        username: String,
    },

    /// Show the leaderboard once
    Leaderboard {
        /// Print as JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Record the view for this user (counts toward visit achievements)
        #[arg(long)]
        user: Option<String>,
    },

    /// Follow the leaderboard live, printing each update
    Watch,

    /// Erase all progress for a user
    Reset {
        /// Username
        username: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    match cli.command {
        Commands::Init => {
            cli::init::init_command(cli.db.as_deref())?;
        }
        Commands::AddUser { username } => {
            cli::user::add_user_command(cli.db.as_deref(), &username)?;
        }
        Commands::Complete {
            username,
            lesson_id,
        } => {
            cli::complete::complete_command(cli.db.as_deref(), &username, lesson_id)?;
        }
        Commands::Uncomplete {
            username,
            lesson_id,
        } => {
            cli::complete::uncomplete_command(cli.db.as_deref(), &username, lesson_id)?;
        }
        Commands::Dashboard { username } => {
            cli::dashboard::dashboard_command(cli.db.as_deref(), &username)?;
        }
        Commands::Leaderboard { json, user } => {
            cli::leaderboard::leaderboard_command(cli.db.as_deref(), json, user.as_deref())?;
        }
        Commands::Watch => {
            cli::leaderboard::watch_command(cli.db.as_deref()).await?;
        }
        Commands::Reset { username, yes } => {
            cli::reset::reset_command(cli.db.as_deref(), &username, yes)?;
        }
    }

    Ok(())
}
