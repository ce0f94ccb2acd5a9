//! castline entry point: `start` serves, `connect` joins.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod session;
mod tui;

use castline_core::Result;
use session::Session;
use tui::app::Outcome;

#[derive(Parser)]
#[command(name = "castline", about = "castline is a live chat server/client", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a castline server users can join with `castline connect`
    Start {
        /// Port to serve on
        #[arg(short, long, default_value = ":3000")]
        port: String,
    },
    /// Connect to a running castline server
    Connect {
        /// Username to use in the live chat
        #[arg(short, long, default_value = "default_user")]
        username: String,
        /// Server address to connect to
        #[arg(long, default_value = "localhost:3000")]
        host: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Start { port } => {
            init_tracing("info");
            tracing::info!(%port, "starting castline server");
            if let Err(e) = castline_server::serve(&port, shutdown_signal()).await {
                tracing::error!(error = %e, "server error");
                std::process::exit(1);
            }
        }
        Command::Connect { username, host } => {
            // logging defaults off so nothing scribbles over the alternate
            // screen; RUST_LOG opts back in
            init_tracing("off");
            match run_client(&host, &username).await {
                Ok(Outcome::Clean) => {}
                Ok(Outcome::Conflict) => {
                    eprintln!("castline: username {username:?} is already in chat");
                    std::process::exit(1);
                }
                Ok(Outcome::Fault) => {
                    eprintln!("castline: connection to {host} failed");
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("castline: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}

async fn run_client(host: &str, username: &str) -> Result<Outcome> {
    let session = Session::join(host, username).await?;
    tui::run(session, host).await
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
