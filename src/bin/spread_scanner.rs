use anyhow::Result;
use clap::{Parser, Subcommand};
use pump_dlmm_spread::{
    config::Config,
    engine::{self, ServiceContext},
    monitoring::logging,
    rpc::ResilientRpcClient,
    wallet,
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Écart de prix PumpSwap / Meteora DLMM", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Arrête la boucle après N cycles (scan / monitor).
    #[arg(long, global = true)]
    cycles: Option<u64>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Commands {
    /// Détection continue des opportunités (mode par défaut).
    Scan,
    /// Surveillance de l'écart de prix unitaire, sans seuil.
    Monitor,
    /// Rapport ponctuel en JSON.
    Analysis,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    logging::setup_logging(&config.log_level, config.log_json);

    let wallet = match wallet::load_wallet(config.keypair_path.as_deref(), config.private_key.as_deref()) {
        Ok(wallet) => wallet,
        Err(e) => {
            error!(error = %format!("{:#}", e), "[Main] Portefeuille invalide.");
            std::process::exit(1);
        }
    };

    let rpc = Arc::new(ResilientRpcClient::new(
        config.rpc_url.clone(),
        config.rpc_max_retries,
        config.rpc_retry_delay_ms,
    ));
    info!(rpc_url = %rpc.url(), dry_run = config.dry_run, "[Main] Démarrage.");
    let ctx = ServiceContext::new(config, rpc, wallet)?;

    match cli.command.unwrap_or(Commands::Scan) {
        Commands::Scan => {
            tokio::select! {
                result = engine::run_scan(&ctx, cli.cycles) => result?,
                _ = tokio::signal::ctrl_c() => info!("[Main] Arrêt demandé."),
            }
        }
        Commands::Monitor => {
            tokio::select! {
                result = engine::run_monitor(&ctx, cli.cycles) => result?,
                _ = tokio::signal::ctrl_c() => info!("[Main] Arrêt demandé."),
            }
        }
        Commands::Analysis => {
            let report = engine::run_analysis(&ctx).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
