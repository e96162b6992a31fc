// DANS : src/quoting/dlmm.rs

use super::{to_human, to_raw, BinDirection, Quote, Slippage, Venue};
use crate::decoders::meteora::dlmm::{self, BinSnapshot, DecodedDlmmPool};
use crate::error::ArbError;
use crate::rpc::LedgerClient;
use crate::state::{DecimalsResolver, PoolSlot};
use anyhow::{Context, Result};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

const VENUE: Venue = Venue::MeteoraDlmm;
const BPS_DENOMINATOR: u128 = 10_000;

/// Quote sur le LbPair Meteora DLMM configuré.
///
/// Le LbPair est mis en cache ; les BinArrays sont relus à chaque quote.
pub struct DlmmAdapter {
    rpc: Arc<dyn LedgerClient>,
    pool_address: Pubkey,
    slot: PoolSlot<DecodedDlmmPool>,
    decimals: Arc<DecimalsResolver>,
}

impl DlmmAdapter {
    pub fn new(rpc: Arc<dyn LedgerClient>, pool_address: Pubkey, cache_duration: Duration, decimals: Arc<DecimalsResolver>) -> Self {
        Self {
            rpc,
            pool_address,
            slot: PoolSlot::new(VENUE.display_name(), cache_duration),
            decimals,
        }
    }

    pub fn venue(&self) -> Venue {
        VENUE
    }

    pub fn pool_address(&self) -> Pubkey {
        self.pool_address
    }

    pub async fn fetch_pool(&self) -> Result<Arc<DecodedDlmmPool>> {
        self.slot
            .get_or_try_fetch(&self.pool_address, Instant::now(), || dlmm::fetch_pool(self.rpc.as_ref(), &self.pool_address))
            .await
            .with_context(|| format!("[{}] Récupération du LbPair {}", VENUE, self.pool_address))
    }

    pub async fn quote(&self, input_amount: f64, direction: BinDirection, slippage: Slippage) -> Result<Quote> {
        self.quote_inner(input_amount, direction, slippage)
            .await
            .with_context(|| format!("[{}] Quote {:?} de {}", VENUE, direction, input_amount))
    }

    async fn quote_inner(&self, input_amount: f64, direction: BinDirection, slippage: Slippage) -> Result<Quote> {
        let pool = self.fetch_pool().await?;
        let swap_for_y = direction.swap_for_y();
        let (input_mint, output_mint) = if swap_for_y {
            (pool.token_x_mint, pool.token_y_mint)
        } else {
            (pool.token_y_mint, pool.token_x_mint)
        };
        let input_decimals = self.decimals.get_decimals(self.rpc.as_ref(), &input_mint).await;
        let output_decimals = self.decimals.get_decimals(self.rpc.as_ref(), &output_mint).await;

        let raw_input = to_raw(input_amount, input_decimals)?;
        if raw_input == 0 {
            return Err(ArbError::quote(VENUE.display_name(), format!("{} rounds to 0 raw units", input_amount)).into());
        }

        let indices = pool.swap_bin_array_indices(swap_for_y);
        let bin_arrays = dlmm::fetch_bin_arrays(self.rpc.as_ref(), &pool, &indices).await?;
        let now_ts = chrono::Utc::now().timestamp();
        let outcome = pool
            .simulate_swap(&bin_arrays, raw_input, swap_for_y, now_ts)
            .map_err(|e| ArbError::quote(VENUE.display_name(), e.to_string()))?;

        let slippage_bps = slippage.to_bps().min(BPS_DENOMINATOR as u64) as u128;
        let raw_min_output = (outcome.amount_out as u128 * (BPS_DENOMINATOR - slippage_bps) / BPS_DENOMINATOR) as u64;

        debug!(
            ?direction,
            raw_input,
            raw_output = outcome.amount_out,
            bins_crossed = outcome.bins_crossed,
            active_id = pool.active_id,
            slippage_bps,
            "[DLMM] Quote calculée."
        );

        Ok(Quote {
            venue: VENUE,
            input_mint,
            output_mint,
            input_amount: to_human(raw_input, input_decimals),
            output_amount: to_human(outcome.amount_out, output_decimals),
            min_output_amount: to_human(raw_min_output, output_decimals),
            fee: to_human(outcome.fee, input_decimals),
            price_impact_pct: outcome.price_impact_pct,
            raw_input,
            raw_output: outcome.amount_out,
        })
    }

    pub async fn unit_price(&self, direction: BinDirection) -> Result<f64> {
        Ok(self.quote(1.0, direction, Slippage::ZERO).await?.output_amount)
    }

    /// Photo des bins `active_id ± range` avec leur prix relatif au bin actif.
    pub async fn get_bins_around_active(&self, range: i32) -> Result<BinSnapshot> {
        let pool = self.fetch_pool().await?;
        let indices = pool.bin_array_indices_around_active(range);
        let bin_arrays = dlmm::fetch_bin_arrays(self.rpc.as_ref(), &pool, &indices)
            .await
            .with_context(|| format!("[{}] Lecture des bins autour de {}", VENUE, pool.active_id))?;
        Ok(pool.bins_around_active(&bin_arrays, range))
    }
}
