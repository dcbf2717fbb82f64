//! Souk REST API and maintenance CLI entry point.
//!
//! Binary name: `soukd`
//!
//! Parses CLI arguments, initializes database and services, then either
//! starts the REST API server or runs a maintenance command.

mod http;
mod state;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use clap_complete::generate;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use souk_types::comment::CommentId;
use souk_types::event::MarketEvent;

use http::router::build_router;
use state::AppState;

#[derive(Parser)]
#[command(name = "soukd", version, about = "Souk marketplace backend")]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1:8080", env = "SOUK_BIND")]
        bind: String,
    },
    /// Out-of-band moderation commands. No authentication here: access
    /// to this binary on the host IS the authorization, so gate it at
    /// the deployment boundary.
    Moderate {
        #[command(subcommand)]
        action: ModerateAction,
    },
    /// Generate shell completions
    Completions { shell: clap_complete::Shell },
}

#[derive(Subcommand)]
enum ModerateAction {
    /// Delete any comment, bypassing the ownership check
    DeleteComment {
        /// Comment id
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "info,souk=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "soukd", &mut std::io::stdout());
        return Ok(());
    }

    // Initialize application state (DB, services)
    let state = AppState::init().await?;

    match cli.command {
        Commands::Serve { bind } => {
            spawn_notification_sink(&state);

            let router = build_router(state);
            let listener = tokio::net::TcpListener::bind(&bind)
                .await
                .with_context(|| format!("failed to bind {bind}"))?;
            tracing::info!(%bind, "souk listening");
            axum::serve(listener, router).await?;
        }
        Commands::Moderate { action } => match action {
            ModerateAction::DeleteComment { id } => {
                let comment_id: CommentId = id.parse().context("invalid comment id")?;
                state
                    .discussion
                    .delete_comment_unchecked(&comment_id)
                    .await
                    .context("moderation delete failed")?;
                println!("comment {id} deleted");
            }
        },
        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Drain domain events into the log. This is the default notification
/// sink; a webhook forwarder would subscribe the same way. Delivery is
/// fire-and-forget by construction -- a lagged or closed receiver never
/// touches the publishing side.
fn spawn_notification_sink(state: &AppState) {
    let mut rx = state.events.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(MarketEvent::UserCreated { username }) => {
                    tracing::info!(%username, event = "user_created", "notification");
                }
                Ok(MarketEvent::ItemCreated { item }) => {
                    tracing::info!(slug = %item.slug, event = "item_created", "notification");
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "notification sink lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
