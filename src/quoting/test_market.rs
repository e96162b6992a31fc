// Marché complet en mémoire (pool pump.fun + LbPair DLMM), partagé par les tests.

use crate::config::WSOL_MINT;
use crate::decoders::meteora::dlmm::pool::{self as dlmm_pool, fixtures as dlmm_fixtures};
use crate::decoders::meteora::dlmm::bin_array::get_bin_array_address;
use crate::decoders::pump::amm::pool::{encode_global_config, encode_pool_account, global_config_address, sample_record, GlobalFees};
use crate::decoders::spl_token_decoders::account::encode_token_account;
use crate::quoting::{DlmmAdapter, PumpAmmAdapter};
use crate::rpc::memory::MemoryLedger;
use crate::state::DecimalsResolver;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub(crate) struct TestMarket {
    pub ledger: Arc<MemoryLedger>,
    pub decimals: Arc<DecimalsResolver>,
    pub token: Pubkey,
    pub wsol: Pubkey,
    pub pump_pool: Pubkey,
    pub dlmm_pool: Pubkey,
}

impl TestMarket {
    /// 900 tokens (6 déc.) contre 1000 SOL : ~1.111 SOL le token sur pump.
    pub const PUMP_TOKEN_RESERVE: u64 = 900_000_000;
    pub const PUMP_SOL_RESERVE: u64 = 1_000_000_000_000;
    /// Prix brut au bin actif DLMM : 1000 lamports par unité brute de token, soit 1 SOL le token.
    pub const DLMM_ACTIVE_PRICE: u128 = 1_000;

    pub fn build() -> Self {
        let ledger = Arc::new(MemoryLedger::new());
        let token = Pubkey::new_unique();
        let wsol = Pubkey::from_str(WSOL_MINT).unwrap();
        ledger.set_decimals(token, 6);
        ledger.set_decimals(wsol, 9);

        // pump.fun : base = token, quote = WSOL
        let pump_pool = Pubkey::new_unique();
        let (base_vault, quote_vault) = (Pubkey::new_unique(), Pubkey::new_unique());
        ledger.set_account(pump_pool, encode_pool_account(&sample_record(token, wsol, base_vault, quote_vault)));
        ledger.set_account(base_vault, encode_token_account(Self::PUMP_TOKEN_RESERVE));
        ledger.set_account(quote_vault, encode_token_account(Self::PUMP_SOL_RESERVE));
        ledger.set_account(global_config_address(), encode_global_config(&GlobalFees::default()));

        // DLMM : X = token, Y = WSOL
        let dlmm_pool = Pubkey::new_unique();
        let (reserve_x, reserve_y) = (Pubkey::new_unique(), Pubkey::new_unique());
        let raw = dlmm_fixtures::lb_pair_data(token, wsol, reserve_x, reserve_y);
        ledger.set_account(dlmm_pool, dlmm_fixtures::encode_lb_pair(&raw));
        ledger.set_account(reserve_x, encode_token_account(100_000_000_000));
        ledger.set_account(reserve_y, encode_token_account(100_000_000_000_000));
        for (index, data) in dlmm_fixtures::scaled_bin_arrays(&dlmm_pool, 1_000_000_000, 1_000_000_000_000, Self::DLMM_ACTIVE_PRICE) {
            ledger.set_account(get_bin_array_address(&dlmm_pool, index, &dlmm_pool::PROGRAM_ID), data);
        }

        Self { ledger, decimals: Arc::new(DecimalsResolver::new()), token, wsol, pump_pool, dlmm_pool }
    }

    pub fn pump_adapter(&self) -> PumpAmmAdapter {
        PumpAmmAdapter::new(self.ledger.clone(), self.pump_pool, Duration::from_secs(60), self.decimals.clone())
    }

    pub fn dlmm_adapter(&self) -> DlmmAdapter {
        DlmmAdapter::new(self.ledger.clone(), self.dlmm_pool, Duration::from_secs(60), self.decimals.clone())
    }
}
