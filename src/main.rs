//! HealthChain gateway diagnostic CLI
//!
//! Read-only ledger queries, pinning and session inspection over a direct
//! JSON-RPC endpoint. Writes need a wallet extension to sign, so they stay
//! with the embedding UI; reads here run unattended against the configured
//! RPC URL.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use healthchain_gateway::chain::rpc::{HttpRpcProvider, LedgerRpc};
use healthchain_gateway::config::{GatewayConfig, PinningConfig};
use healthchain_gateway::gateway::ContractGateway;
use healthchain_gateway::session::{JsonFileStore, SessionStore};
use healthchain_gateway::storage::{ContentStore, PinMetadata};
use healthchain_gateway::Error;

/// Signer placeholder for read-only commands; `eth_call` needs no sender
const OBSERVER_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

#[derive(Parser)]
#[command(name = "healthchain-gateway", version, about = "HealthChain Sentinel ledger diagnostics")]
struct Cli {
    /// TOML gateway configuration; HEALTHCHAIN_* environment variables are
    /// used when absent
    #[arg(long, global = true, env = "HEALTHCHAIN_CONFIG")]
    config: Option<PathBuf>,

    /// Session file location
    #[arg(
        long,
        global = true,
        env = "HEALTHCHAIN_SESSION_FILE",
        default_value = ".healthchain-session.json"
    )]
    session_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare the RPC endpoint's chain id against the configured network
    NetworkCheck,
    /// Read a doctor's consultation fee from the on-ledger registry
    DoctorFee {
        #[arg(long)]
        doctor_id: u64,
    },
    /// Read one appointment record
    Appointment {
        #[arg(long)]
        id: u128,
    },
    /// Pin a file to the content-addressed storage network
    Pin {
        file: PathBuf,
        #[arg(long, default_value = "application/octet-stream")]
        content_type: String,
    },
    /// Show or clear the locally stored session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    Show,
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();
    info!(
        "healthchain-gateway v{} ({}, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_SHA"),
        env!("BUILD_DATE")
    );

    if let Err(err) = run(cli).await {
        if let Some(gateway_err) = err.downcast_ref::<Error>() {
            eprintln!("error: {}", gateway_err.user_message());
            if gateway_err.is_recoverable_by_retry() {
                eprintln!("this action can be retried");
            }
        } else {
            eprintln!("error: {err:#}");
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::NetworkCheck => {
            let config = load_config(cli.config.as_deref())?;
            let rpc_url = first_rpc_url(&config)?;
            let provider = Arc::new(HttpRpcProvider::new(rpc_url)?);
            let chain_id = LedgerRpc::new(provider).chain_id().await?;
            if chain_id == config.network.chain_id {
                println!(
                    "{} reports chain {} ({}), matching the configured network",
                    rpc_url, chain_id, config.network.chain_name
                );
            } else {
                anyhow::bail!(
                    "{} reports chain {}, but the configured network is {} ({})",
                    rpc_url,
                    chain_id,
                    config.network.chain_id,
                    config.network.chain_name
                );
            }
        }
        Command::DoctorFee { doctor_id } => {
            let gateway = read_only_gateway(cli.config.as_deref())?;
            let fee = gateway.doctor_fee(doctor_id).await?;
            println!("doctor {doctor_id} consultation fee: {fee} wei");
        }
        Command::Appointment { id } => {
            let gateway = read_only_gateway(cli.config.as_deref())?;
            let details = gateway.appointment_details(id).await?;
            println!("appointment {id}");
            println!("  patient:      {}", details.patient);
            println!("  doctor id:    {}", details.doctor_id);
            println!("  scheduled at: {} (epoch seconds)", details.scheduled_at);
            println!("  cancelled:    {}", details.cancelled);
        }
        Command::Pin { file, content_type } => {
            let pinning = PinningConfig::from_env()?;
            let store = healthchain_gateway::storage::pinata::PinataStore::new(pinning)?;
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let filename = file
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("upload.bin");
            let metadata = PinMetadata::for_bytes(filename, &content_type, &data);
            let cid = store.pin(data, metadata).await?;
            println!("pinned {} -> {}", filename, cid);
            println!("retrievable at {}", store.retrieval_url(&cid));
        }
        Command::Session { action } => {
            let store = JsonFileStore::new(&cli.session_file);
            match action {
                SessionAction::Show => match store.load()? {
                    Some(session) => {
                        println!("address:  {}", session.short_address());
                        println!("role:     {}", session.chain_account_type);
                        println!("provider: {}", session.provider_name);
                    }
                    None => println!("no session (logged out)"),
                },
                SessionAction::Clear => {
                    store.clear()?;
                    println!("session cleared");
                }
            }
        }
    }
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<GatewayConfig> {
    match path {
        Some(path) => GatewayConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => GatewayConfig::from_env().context("loading config from environment"),
    }
}

fn first_rpc_url(config: &GatewayConfig) -> anyhow::Result<&str> {
    config
        .network
        .rpc_urls
        .first()
        .map(String::as_str)
        .context("network descriptor has no RPC endpoints")
}

fn read_only_gateway(path: Option<&std::path::Path>) -> anyhow::Result<ContractGateway> {
    let config = load_config(path)?;
    let provider = Arc::new(HttpRpcProvider::new(first_rpc_url(&config)?)?);
    let gateway = ContractGateway::new(provider, config);
    gateway.initialize(OBSERVER_ADDRESS)?;
    Ok(gateway)
}
