// DANS : src/config.rs

use crate::error::ArbError;
use anyhow::Result;
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::time::Duration;

pub const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";
const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

fn default_rpc_url() -> String { DEFAULT_RPC_URL.to_string() }
fn default_base_mint() -> String { WSOL_MINT.to_string() }
fn default_slippage() -> f64 { 0.01 }
fn default_cache_duration() -> u64 { 60_000 }
fn default_min_profit_pct() -> f64 { 0.3 }
fn default_trade_size() -> f64 { 0.1 }
fn default_process_delay() -> u64 { 3_000 }
fn default_dry_run() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_rpc_max_retries() -> u8 { 3 }
fn default_rpc_retry_delay() -> u64 { 500 }
fn default_bin_range() -> i32 { 10 }

/// Borne de `DLMM_BIN_RANGE` : ±1000 bins tiennent en une trentaine de BinArrays,
/// sous la limite de 100 comptes d'un `get_multiple_accounts`.
pub const MAX_DLMM_BIN_RANGE: i32 = 1_000;

/// Miroir brut des variables d'environnement, tel que lu par `envy`.
#[derive(Deserialize, Debug)]
struct EnvConfig {
    #[serde(default = "default_rpc_url")]
    rpc_url: String,
    keypair_path: Option<String>,
    private_key: Option<String>,
    pumpswap_pool: Option<String>,
    dlmm_pool: Option<String>,
    mint: Option<String>,
    #[serde(default = "default_base_mint")]
    base_mint: String,
    #[serde(default = "default_slippage")]
    slippage: f64,
    #[serde(default = "default_cache_duration")]
    cache_duration: u64,
    #[serde(default = "default_min_profit_pct")]
    min_profit_pct: f64,
    #[serde(default = "default_trade_size")]
    wsol_trade_size: f64,
    #[serde(default = "default_process_delay")]
    process_delay: u64,
    #[serde(default = "default_dry_run")]
    dry_run: bool,
    #[serde(default = "default_log_level")]
    log_level: String,
    log_format: Option<String>,
    #[serde(default = "default_rpc_max_retries")]
    rpc_max_retries: u8,
    #[serde(default = "default_rpc_retry_delay")]
    rpc_retry_delay_ms: u64,
    #[serde(default = "default_bin_range")]
    dlmm_bin_range: i32,
}

/// Configuration validée du scanner. Les adresses sont déjà parsées.
#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub keypair_path: Option<String>,
    pub private_key: Option<String>,
    pub pumpswap_pool: Pubkey,
    pub dlmm_pool: Pubkey,
    pub target_mint: Pubkey,
    pub base_mint: Pubkey,
    pub slippage: f64,
    pub cache_duration: Duration,
    pub min_profit_pct: f64,
    pub trade_size: f64,
    pub process_delay: Duration,
    pub dry_run: bool,
    pub log_level: String,
    pub log_json: bool,
    pub rpc_max_retries: u8,
    pub rpc_retry_delay_ms: u64,
    pub dlmm_bin_range: i32,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let env = envy::from_env::<EnvConfig>()
            .map_err(|e| ArbError::Configuration(e.to_string()))?;
        Ok(Self::from_env_config(env)?)
    }

    /// Construit la configuration depuis une liste explicite de paires clé/valeur.
    /// Utilisé par les tests pour ne pas dépendre de l'environnement du processus.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let env = envy::from_iter::<_, EnvConfig>(pairs)
            .map_err(|e| ArbError::Configuration(e.to_string()))?;
        Ok(Self::from_env_config(env)?)
    }

    fn from_env_config(env: EnvConfig) -> std::result::Result<Self, ArbError> {
        let pumpswap_pool = required_pubkey("PUMPSWAP_POOL", env.pumpswap_pool)?;
        let dlmm_pool = required_pubkey("DLMM_POOL", env.dlmm_pool)?;
        let target_mint = required_pubkey("MINT", env.mint)?;
        let base_mint = parse_pubkey("BASE_MINT", &env.base_mint)?;

        if !(0.0..1.0).contains(&env.slippage) {
            return Err(ArbError::Configuration(format!("SLIPPAGE doit être dans [0, 1), reçu {}", env.slippage)));
        }
        if !(env.wsol_trade_size > 0.0) {
            return Err(ArbError::Configuration(format!("WSOL_TRADE_SIZE doit être > 0, reçu {}", env.wsol_trade_size)));
        }
        if env.cache_duration == 0 {
            return Err(ArbError::Configuration("CACHE_DURATION doit être > 0".into()));
        }
        if !(env.min_profit_pct >= 0.0) {
            return Err(ArbError::Configuration(format!("MIN_PROFIT_PCT doit être >= 0, reçu {}", env.min_profit_pct)));
        }
        if target_mint == base_mint {
            return Err(ArbError::Configuration("MINT et BASE_MINT sont identiques".into()));
        }

        Ok(Config {
            rpc_url: env.rpc_url,
            keypair_path: env.keypair_path.filter(|s| !s.trim().is_empty()),
            private_key: env.private_key.filter(|s| !s.trim().is_empty()),
            pumpswap_pool,
            dlmm_pool,
            target_mint,
            base_mint,
            slippage: env.slippage,
            cache_duration: Duration::from_millis(env.cache_duration),
            min_profit_pct: env.min_profit_pct,
            trade_size: env.wsol_trade_size,
            process_delay: Duration::from_millis(env.process_delay),
            dry_run: env.dry_run,
            log_level: env.log_level,
            log_json: env.log_format.is_some_and(|f| f.eq_ignore_ascii_case("json")),
            rpc_max_retries: env.rpc_max_retries,
            rpc_retry_delay_ms: env.rpc_retry_delay_ms,
            dlmm_bin_range: env.dlmm_bin_range.clamp(0, MAX_DLMM_BIN_RANGE),
        })
    }
}

fn required_pubkey(name: &str, value: Option<String>) -> std::result::Result<Pubkey, ArbError> {
    match value {
        Some(v) if !v.trim().is_empty() => parse_pubkey(name, &v),
        _ => Err(ArbError::Configuration(format!("variable d'environnement requise absente: {}", name))),
    }
}

fn parse_pubkey(name: &str, value: &str) -> std::result::Result<Pubkey, ArbError> {
    Pubkey::from_str(value.trim())
        .map_err(|e| ArbError::Configuration(format!("{} n'est pas une adresse valide ({}): {}", name, value, e)))
}
