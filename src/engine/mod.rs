// DANS : src/engine/mod.rs

use crate::config::Config;
use crate::quoting::{DlmmAdapter, PumpAmmAdapter, Slippage};
use crate::rpc::LedgerClient;
use crate::state::DecimalsResolver;
use crate::strategies::ArbitrageEvaluator;
use anyhow::Result;
use solana_sdk::signature::Keypair;
use std::sync::Arc;
use tracing::{error, info, warn};

pub mod scanner;

pub use scanner::{run_analysis, run_monitor, run_scan, scan_once, AnalysisReport};

/// Tout l'état longue durée du scanner, construit une fois au démarrage et
/// passé explicitement à la boucle de scan. Les caches (pools, décimales)
/// vivent ici, pas dans des globales.
pub struct ServiceContext {
    pub config: Config,
    pub rpc: Arc<dyn LedgerClient>,
    pub decimals: Arc<DecimalsResolver>,
    pub pump: Arc<PumpAmmAdapter>,
    pub dlmm: Arc<DlmmAdapter>,
    pub evaluator: ArbitrageEvaluator,
    pub wallet: Option<Keypair>,
}

impl ServiceContext {
    pub fn new(config: Config, rpc: Arc<dyn LedgerClient>, wallet: Option<Keypair>) -> Result<Self> {
        let slippage = Slippage::from_fraction(config.slippage)?;
        let decimals = Arc::new(DecimalsResolver::new());
        let pump = Arc::new(PumpAmmAdapter::new(rpc.clone(), config.pumpswap_pool, config.cache_duration, decimals.clone()));
        let dlmm = Arc::new(DlmmAdapter::new(rpc.clone(), config.dlmm_pool, config.cache_duration, decimals.clone()));
        let evaluator = ArbitrageEvaluator::new(pump.clone(), dlmm.clone(), config.base_mint, slippage, config.min_profit_pct);

        info!(
            pumpswap_pool = %config.pumpswap_pool,
            dlmm_pool = %config.dlmm_pool,
            target_mint = %config.target_mint,
            base_mint = %config.base_mint,
            trade_size = config.trade_size,
            min_profit_pct = config.min_profit_pct,
            "[Engine] Contexte initialisé."
        );

        Ok(Self { config, rpc, decimals, pump, dlmm, evaluator, wallet })
    }

    /// Reconstruit la connexion RPC puis vérifie qu'elle répond.
    pub async fn recover_connection(&self) -> bool {
        warn!("[Engine] Problème de connectivité, reconstruction de la connexion RPC...");
        self.rpc.reconnect();
        match self.rpc.get_version().await {
            Ok(version) => {
                info!(%version, "[Engine] Connexion RPC rétablie.");
                true
            }
            Err(e) => {
                error!(error = %format!("{:#}", e), "[Engine] Le nœud ne répond toujours pas, nouvel essai au prochain cycle.");
                false
            }
        }
    }
}
