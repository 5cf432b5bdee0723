// command line interface

use crate::{Archive, Gemini, Server};
use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "codeguard", about = "AI security audits for your source code")]
struct Cli {
    /// archive connection url
    #[arg(long, short, env = "DATABASE_URL")]
    db: Option<String>,

    /// gemini api key
    #[arg(long, short = 'k', env = "GEMINI_API_KEY")]
    api_key: Option<String>,

    /// port number
    #[arg(long, short, default_value = "8000")]
    port: u16,

    /// host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // both clients are optional - the service starts either way and
    // degrades per-request
    let gemini = match Gemini::new(cli.api_key) {
        Ok(g) => {
            tracing::info!("gemini engine initialized");
            Some(g)
        }
        Err(_) => {
            tracing::warn!("gemini api key is missing, audit requests will be rejected");
            None
        }
    };

    let archive = match cli.db {
        Some(url) => match Archive::connect(&url).await {
            Ok(a) => {
                tracing::info!("cloud archive linked");
                Some(a)
            }
            Err(e) => {
                tracing::error!(error = %e, "cloud archive link failed, persistence disabled");
                None
            }
        },
        None => {
            tracing::warn!("database url is missing, persistence disabled");
            None
        }
    };

    Ok(Server::run(gemini, archive, &cli.host, cli.port).await?)
}
