use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use yaya_gateway::config::{load_config, load_dotenv, GatewayConfig};
use yaya_gateway::lifecycle::build_transactions_api;
use yaya_gateway::signing::{sign, PathForm, Payload, SigningVariant, TimestampPrecision};
use yaya_gateway::upstream::{Clock, FixedClock, Outcome, SystemClock};

#[derive(Parser)]
#[command(name = "yaya-cli")]
#[command(about = "Signing diagnostics and direct calls for the YaYa wallet API", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "YAYA_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical string and signature for a request
    Sign {
        #[arg(short, long, default_value = "GET")]
        method: String,
        /// Endpoint exactly as it should be signed, e.g. /api/en/transaction/find-by-user?p=1
        #[arg(short, long)]
        endpoint: String,
        /// Already-serialized body
        #[arg(short, long)]
        body: Option<String>,
        /// Millisecond timestamp; defaults to now
        #[arg(short, long)]
        timestamp: Option<u64>,
        /// Sign with the microsecond form (milliseconds + "000")
        #[arg(long)]
        micros: bool,
    },
    /// List the wallet's transactions
    Transactions {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Search the wallet's transactions
    Search {
        #[arg(short, long)]
        query: String,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    load_dotenv()?;
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Sign {
            method,
            endpoint,
            body,
            timestamp,
            micros,
        } => print_signature(&config, &method, &endpoint, body, timestamp, micros)?,
        Commands::Transactions { page } => {
            let api = build_transactions_api(&config)?;
            print_outcome(api.list(page).await?)?;
        }
        Commands::Search { query, page } => {
            let api = build_transactions_api(&config)?;
            print_outcome(api.search(&query, page).await?)?;
        }
    }

    Ok(())
}

fn print_signature(
    config: &GatewayConfig,
    method: &str,
    endpoint: &str,
    body: Option<String>,
    timestamp: Option<u64>,
    micros: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let secret = config.upstream.api_secret.as_deref().unwrap_or_default();

    let clock: Arc<dyn Clock> = match timestamp {
        Some(millis) => Arc::new(FixedClock::new(millis)),
        None => Arc::new(SystemClock),
    };
    let precision = if micros {
        TimestampPrecision::Microseconds
    } else {
        TimestampPrecision::Milliseconds
    };
    let variant = SigningVariant::new(precision, PathForm::WithQuery);
    let timestamp = variant.timestamp(clock.now_millis());

    let payload = body.map_or(Payload::None, Payload::Text);
    let signed = sign(method, endpoint, &payload, secret, &timestamp)?;

    println!("timestamp: {}", timestamp);
    println!("canonical: {}", signed.canonical);
    println!("signature: {}", signed.signature);
    Ok(())
}

fn print_outcome(outcome: Outcome) -> Result<(), Box<dyn std::error::Error>> {
    if !(200..300).contains(&outcome.status) {
        eprintln!("Error: wallet API returned status {}", outcome.status);
    }
    println!("{}", serde_json::to_string_pretty(&outcome.data)?);
    Ok(())
}
