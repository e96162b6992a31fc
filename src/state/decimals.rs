// DANS : src/state/decimals.rs

use crate::error::ArbError;
use crate::rpc::LedgerClient;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, warn};

/// Précision du SOL natif, utilisée quand la lecture on-chain échoue.
pub const FALLBACK_DECIMALS: u8 = 9;

/// Cache permanent mint -> nombre de décimales.
///
/// Les décimales d'un mint ne changent jamais, donc pas d'expiration.
/// Deux misses simultanés sur le même mint font deux appels RPC ; c'est sans
/// conséquence, l'appel est idempotent.
#[derive(Default)]
pub struct DecimalsResolver {
    cache: RwLock<HashMap<String, u8>>,
}

impl DecimalsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self, mint: &Pubkey) -> Option<u8> {
        let reader = self.cache.read().unwrap_or_else(|e| e.into_inner());
        reader.get(&mint.to_string()).copied()
    }

    /// Ne renvoie jamais d'erreur : en cas d'échec on retombe sur 9.
    /// ATTENTION : un 9 ne prouve donc pas que la lecture a réussi.
    /// La valeur de repli n'est pas mise en cache, le prochain appel réessaiera.
    pub async fn get_decimals(&self, rpc: &dyn LedgerClient, mint: &Pubkey) -> u8 {
        if let Some(decimals) = self.cached(mint) {
            return decimals;
        }
        match rpc.get_token_decimals(mint).await {
            Ok(decimals) => {
                debug!(mint = %mint, decimals, "[Decimals] Mint résolu.");
                let mut writer = self.cache.write().unwrap_or_else(|e| e.into_inner());
                writer.insert(mint.to_string(), decimals);
                decimals
            }
            Err(e) => {
                let error = ArbError::DecimalsFetch { mint: mint.to_string(), reason: format!("{:#}", e) };
                warn!(error = %error, fallback = FALLBACK_DECIMALS, "[Decimals] Lecture impossible, valeur de repli.");
                FALLBACK_DECIMALS
            }
        }
    }
}
