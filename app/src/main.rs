#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use clap::{Parser, Subcommand};
use tourdesk_config::Config;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod command;

use command::chat::{ChatInput, run_chat};

#[derive(Parser)]
#[command(name = "tourdesk")]
#[command(about = "BlingDestinations travel booking assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the travel assistant
    Chat {
        /// Session id to resume (a new one is generated if omitted)
        #[arg(short, long)]
        session: Option<String>,

        /// Customer name for the booking
        #[arg(long)]
        name: Option<String>,

        /// Customer email for the booking confirmation
        #[arg(long)]
        email: Option<String>,

        /// Customer phone number
        #[arg(long)]
        phone: Option<String>,

        /// Single message to send (non-interactive mode)
        #[arg(short = 'm', long)]
        message: Option<String>,
    },
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            session,
            name,
            email,
            phone,
            message,
        } => {
            let config = Config::load()?;
            info!("Loaded config from ~/tourdesk/config.json");
            run_chat(
                &config,
                ChatInput {
                    session,
                    name,
                    email,
                    phone,
                    message,
                },
            )
            .await?;
        }
        Commands::Init => {
            Config::create_config()?;
        }
        Commands::Version => {
            println!("tourdesk {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
