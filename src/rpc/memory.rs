// Registre de comptes en mémoire, utilisé par les tests unitaires à la place du RPC.

use super::LedgerClient;
use crate::error::ArbError;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub(crate) struct MemoryLedger {
    accounts: Mutex<HashMap<Pubkey, Vec<u8>>>,
    decimals: Mutex<HashMap<Pubkey, u8>>,
    pub offline: std::sync::atomic::AtomicBool,
    pub account_reads: AtomicUsize,
    pub decimals_reads: AtomicUsize,
    pub reconnects: AtomicUsize,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_account(&self, key: Pubkey, data: Vec<u8>) {
        self.accounts.lock().unwrap().insert(key, data);
    }

    pub fn set_decimals(&self, mint: Pubkey, decimals: u8) {
        self.decimals.lock().unwrap().insert(mint, decimals);
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ArbError::Connection("memory ledger offline".into()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerClient for MemoryLedger {
    async fn get_account_data(&self, pubkey: &Pubkey) -> Result<Option<Vec<u8>>> {
        self.check_online()?;
        self.account_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.accounts.lock().unwrap().get(pubkey).cloned())
    }

    async fn get_multiple_accounts_data(&self, pubkeys: &[Pubkey]) -> Result<Vec<Option<Vec<u8>>>> {
        self.check_online()?;
        self.account_reads.fetch_add(1, Ordering::SeqCst);
        let accounts = self.accounts.lock().unwrap();
        Ok(pubkeys.iter().map(|k| accounts.get(k).cloned()).collect())
    }

    async fn get_token_decimals(&self, mint: &Pubkey) -> Result<u8> {
        self.check_online()?;
        self.decimals_reads.fetch_add(1, Ordering::SeqCst);
        self.decimals
            .lock()
            .unwrap()
            .get(mint)
            .copied()
            .ok_or_else(|| anyhow!("Invalid param: could not find mint {}", mint))
    }

    async fn get_version(&self) -> Result<String> {
        self.check_online()?;
        Ok("memory".to_string())
    }

    fn reconnect(&self) {
        self.reconnects.fetch_add(1, Ordering::SeqCst);
        self.offline.store(false, Ordering::SeqCst);
    }
}
