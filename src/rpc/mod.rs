// src/rpc/mod.rs

use anyhow::Result;
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

pub mod resilient_client;
#[cfg(test)]
pub(crate) mod memory;

pub use resilient_client::ResilientRpcClient;

/// Les seuls appels RPC dont le moteur a besoin.
///
/// `ResilientRpcClient` est l'implémentation réelle ; les tests utilisent un
/// registre de comptes en mémoire.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Données brutes d'un compte. `None` si le compte n'existe pas.
    async fn get_account_data(&self, pubkey: &Pubkey) -> Result<Option<Vec<u8>>>;

    /// Données brutes de plusieurs comptes, dans l'ordre demandé.
    async fn get_multiple_accounts_data(&self, pubkeys: &[Pubkey]) -> Result<Vec<Option<Vec<u8>>>>;

    /// Nombre de décimales d'un mint, lu depuis les métadonnées de supply.
    async fn get_token_decimals(&self, mint: &Pubkey) -> Result<u8>;

    /// Appel léger servant à vérifier que le nœud répond.
    async fn get_version(&self) -> Result<String>;

    /// Reconstruit la connexion sous-jacente. Rien à faire par défaut.
    fn reconnect(&self) {}
}
