//! Roster CLI - Main entry point

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use roster_cli::{commands, AppContext};
use roster_core::Rank;
use roster_engine::{Actor, RosterConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Roster - clan membership and moderation ledger", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Id of the operator performing the action
    #[arg(long, default_value = "operator")]
    actor: String,

    /// Operator holds the administrative capability (required for add/remove)
    #[arg(long)]
    admin: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add members (insert-if-absent)
    Add {
        /// Game ids, whitespace separated
        #[arg(required = true)]
        ids: Vec<String>,
        /// Linked chat identity
        #[arg(long)]
        linked: Option<String>,
        /// Join day, DD/MM/YYYY
        #[arg(long)]
        day: Option<String>,
        #[arg(long)]
        rank: Option<Rank>,
        #[arg(long)]
        note: Option<String>,
    },

    /// Remove members (hard delete)
    Remove {
        #[arg(required = true)]
        ids: Vec<String>,
        /// Effective day, DD/MM/YYYY
        #[arg(long)]
        day: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },

    /// List members grouped by rank
    List,

    /// Check whether a game id is banned
    BanCheck { game_id: String },

    /// List active bans, newest first
    ListBan,

    /// Warn a game id; the third warning bans
    Warn {
        game_id: String,
        reason: String,
        #[arg(long)]
        linked: Option<String>,
        /// Evidence link
        #[arg(long)]
        evidence: Option<String>,
    },

    /// Remove one warning by its 1-based number
    Unwarn { game_id: String, index: usize },

    /// Show the warnings of a game id
    Warnlog { game_id: String },

    /// Ban a game id
    Ban {
        game_id: String,
        reason: String,
        #[arg(long)]
        linked: Option<String>,
        #[arg(long)]
        evidence: Option<String>,
    },

    /// Lift a ban
    Unban {
        game_id: String,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long)]
        linked: Option<String>,
    },

    /// Promote to deputy or sergeant
    Promote {
        rank: Rank,
        game_id: String,
        #[arg(long)]
        linked: Option<String>,
    },

    /// Demote to sergeant or member
    Demote {
        rank: Rank,
        game_id: String,
        #[arg(long)]
        linked: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = RosterConfig::load(cli.config.as_deref())?;
    let actor = Actor {
        id: cli.actor,
        can_administer: cli.admin,
    };
    let ctx = AppContext::new(config, actor).await?;

    let result = match cli.command {
        Commands::Add {
            ids,
            linked,
            day,
            rank,
            note,
        } => {
            commands::add(
                &ctx,
                &ids.join(" "),
                linked.as_deref(),
                day.as_deref(),
                rank,
                note.as_deref(),
            )
            .await
        }
        Commands::Remove { ids, day, note } => {
            commands::remove(&ctx, &ids.join(" "), day.as_deref(), note.as_deref()).await
        }
        Commands::List => commands::list(&ctx).await,
        Commands::BanCheck { game_id } => commands::ban_check(&ctx, &game_id).await,
        Commands::ListBan => commands::list_bans(&ctx).await,
        Commands::Warn {
            game_id,
            reason,
            linked,
            evidence,
        } => {
            commands::warn(&ctx, &game_id, &reason, linked.as_deref(), evidence.as_deref()).await
        }
        Commands::Unwarn { game_id, index } => commands::unwarn(&ctx, &game_id, index).await,
        Commands::Warnlog { game_id } => commands::warnlog(&ctx, &game_id).await,
        Commands::Ban {
            game_id,
            reason,
            linked,
            evidence,
        } => commands::ban(&ctx, &game_id, &reason, linked.as_deref(), evidence.as_deref()).await,
        Commands::Unban {
            game_id,
            reason,
            linked,
        } => commands::unban(&ctx, &game_id, reason.as_deref(), linked.as_deref()).await,
        Commands::Promote {
            rank,
            game_id,
            linked,
        } => commands::promote(&ctx, rank, &game_id, linked.as_deref()).await,
        Commands::Demote {
            rank,
            game_id,
            linked,
        } => commands::demote(&ctx, rank, &game_id, linked.as_deref()).await,
    };

    // Deliver pending side effects even when the command failed.
    ctx.shutdown().await?;
    println!("{}", result?);
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
