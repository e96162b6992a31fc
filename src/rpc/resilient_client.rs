use super::LedgerClient;
use crate::error::ArbError;
use anyhow::Result;
use arc_swap::ArcSwap;
use async_trait::async_trait;
use solana_client::{
    client_error::{ClientError, ClientErrorKind, Result as ClientResult},
    nonblocking::rpc_client::RpcClient,
};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use std::{future::Future, sync::Arc, time::Duration};
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Un "wrapper" autour du RpcClient de Solana qui ajoute une logique de
/// ré-essai pour les erreurs réseau temporaires, et qui peut reconstruire
/// sa connexion à chaud (`reconnect`).
pub struct ResilientRpcClient {
    rpc_url: String,
    client: ArcSwap<RpcClient>,
    max_retries: u8,
    delay_ms: u64,
}

impl ResilientRpcClient {
    pub fn new(rpc_url: String, max_retries: u8, delay_ms: u64) -> Self {
        let client = ArcSwap::from_pointee(Self::build_client(&rpc_url));
        Self { rpc_url, client, max_retries, delay_ms }
    }

    fn build_client(rpc_url: &str) -> RpcClient {
        RpcClient::new_with_commitment(rpc_url.to_string(), CommitmentConfig::confirmed())
    }

    pub fn url(&self) -> &str {
        &self.rpc_url
    }

    /// Remplace le client sous-jacent par une connexion neuve.
    /// Les appels déjà en vol terminent sur l'ancien client.
    fn rebuild_client(&self) {
        info!(rpc_url = %self.rpc_url, "[RPC] Reconstruction de la connexion...");
        self.client.store(Arc::new(Self::build_client(&self.rpc_url)));
    }

    /// Détermine si une erreur du client est temporaire.
    fn is_retryable(error: &ClientError) -> bool {
        matches!(
            error.kind,
            ClientErrorKind::Reqwest(_) | ClientErrorKind::RpcError(_) | ClientErrorKind::Io(_)
        )
    }

    fn is_transport(error: &ClientError) -> bool {
        matches!(error.kind, ClientErrorKind::Reqwest(_) | ClientErrorKind::Io(_))
    }

    async fn with_retries<T, F, Fut>(&self, method: &str, op: F) -> Result<T>
    where
        F: Fn(Arc<RpcClient>) -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let mut attempt: u8 = 0;
        loop {
            let client = self.client.load_full();
            match op(client).await {
                Ok(value) => return Ok(value),
                Err(e) if Self::is_retryable(&e) && attempt < self.max_retries => {
                    attempt += 1;
                    debug!(method, attempt, error = %e, "[RPC] Échec temporaire, nouvelle tentative.");
                    sleep(Duration::from_millis(self.delay_ms)).await;
                }
                Err(e) => {
                    if Self::is_transport(&e) {
                        warn!(method, error = %e, "[RPC] Nœud injoignable.");
                        return Err(ArbError::Connection(format!("{} a échoué: {}", method, e)).into());
                    }
                    return Err(anyhow::Error::new(e).context(format!("Échec final de {}", method)));
                }
            }
        }
    }
}

#[async_trait]
impl LedgerClient for ResilientRpcClient {
    async fn get_account_data(&self, pubkey: &Pubkey) -> Result<Option<Vec<u8>>> {
        let key = *pubkey;
        let commitment = CommitmentConfig::confirmed();
        let response = self
            .with_retries("get_account", move |c| async move {
                c.get_account_with_commitment(&key, commitment).await
            })
            .await?;
        Ok(response.value.map(|account| account.data))
    }

    async fn get_multiple_accounts_data(&self, pubkeys: &[Pubkey]) -> Result<Vec<Option<Vec<u8>>>> {
        let keys = pubkeys.to_vec();
        let accounts = self
            .with_retries("get_multiple_accounts", move |c| {
                let keys = keys.clone();
                async move { c.get_multiple_accounts(&keys).await }
            })
            .await?;
        Ok(accounts.into_iter().map(|opt| opt.map(|account| account.data)).collect())
    }

    async fn get_token_decimals(&self, mint: &Pubkey) -> Result<u8> {
        let key = *mint;
        let supply = self
            .with_retries("get_token_supply", move |c| async move { c.get_token_supply(&key).await })
            .await?;
        Ok(supply.decimals)
    }

    async fn get_version(&self) -> Result<String> {
        let version = self
            .with_retries("get_version", |c| async move { c.get_version().await })
            .await?;
        Ok(version.solana_core)
    }

    fn reconnect(&self) {
        self.rebuild_client();
    }
}
