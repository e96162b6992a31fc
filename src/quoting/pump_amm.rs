// DANS : src/quoting/pump_amm.rs

use super::{to_human, to_raw, AmmDirection, Quote, Slippage, Venue};
use crate::decoders::pump::amm::{self, math, DecodedPumpAmmPool};
use crate::error::ArbError;
use crate::rpc::LedgerClient;
use crate::state::{DecimalsResolver, PoolSlot};
use anyhow::{Context, Result};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

const VENUE: Venue = Venue::PumpSwap;

/// Quote sur le pool AMM pump.fun configuré.
///
/// Le descripteur du pool est mis en cache (`PoolSlot`) ; les réserves et les
/// frais sont relus à chaque quote.
pub struct PumpAmmAdapter {
    rpc: Arc<dyn LedgerClient>,
    pool_address: Pubkey,
    slot: PoolSlot<DecodedPumpAmmPool>,
    decimals: Arc<DecimalsResolver>,
}

impl PumpAmmAdapter {
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

    pub async fn fetch_pool(&self) -> Result<Arc<DecodedPumpAmmPool>> {
        self.slot
            .get_or_try_fetch(&self.pool_address, Instant::now(), || amm::fetch_pool(self.rpc.as_ref(), &self.pool_address))
            .await
            .with_context(|| format!("[{}] Récupération du pool {}", VENUE, self.pool_address))
    }

    /// `input_amount` est en unités humaines du token d'entrée.
    /// BaseToQuote vend le token de base du pool, QuoteToBase l'achète.
    pub async fn quote(&self, input_amount: f64, direction: AmmDirection, slippage: Slippage) -> Result<Quote> {
        self.quote_inner(input_amount, direction, slippage)
            .await
            .with_context(|| format!("[{}] Quote {:?} de {}", VENUE, direction, input_amount))
    }

    async fn quote_inner(&self, input_amount: f64, direction: AmmDirection, slippage: Slippage) -> Result<Quote> {
        let pool = self.fetch_pool().await?;
        let (input_mint, output_mint) = match direction {
            AmmDirection::BaseToQuote => (pool.base_mint, pool.quote_mint),
            AmmDirection::QuoteToBase => (pool.quote_mint, pool.base_mint),
        };
        let input_decimals = self.decimals.get_decimals(self.rpc.as_ref(), &input_mint).await;
        let output_decimals = self.decimals.get_decimals(self.rpc.as_ref(), &output_mint).await;

        let raw_input = to_raw(input_amount, input_decimals)?;
        if raw_input == 0 {
            return Err(ArbError::quote(VENUE.display_name(), format!("{} rounds to 0 raw units", input_amount)).into());
        }

        let reserves = amm::fetch_reserves(self.rpc.as_ref(), &pool).await?;
        let fee_bps = reserves.fees.total_fee_basis_points();
        let outcome = match direction {
            AmmDirection::QuoteToBase => math::quote_buy(raw_input, reserves.base_reserve, reserves.quote_reserve, fee_bps),
            AmmDirection::BaseToQuote => math::quote_sell(raw_input, reserves.base_reserve, reserves.quote_reserve, fee_bps),
        }
        .map_err(|e| ArbError::quote(VENUE.display_name(), e.to_string()))?;

        debug!(
            ?direction,
            raw_input,
            raw_output = outcome.amount_out,
            base_reserve = reserves.base_reserve,
            quote_reserve = reserves.quote_reserve,
            fee_bps,
            "[PumpAmm] Quote calculée."
        );

        let raw_min_output = (outcome.amount_out as f64 * (1.0 - slippage.fraction())).floor() as u64;
        let fee_decimals = if outcome.fee_on_input { input_decimals } else { output_decimals };
        Ok(Quote {
            venue: VENUE,
            input_mint,
            output_mint,
            input_amount: to_human(raw_input, input_decimals),
            output_amount: to_human(outcome.amount_out, output_decimals),
            min_output_amount: to_human(raw_min_output, output_decimals),
            fee: to_human(outcome.fee, fee_decimals),
            price_impact_pct: outcome.price_impact_pct,
            raw_input,
            raw_output: outcome.amount_out,
        })
    }

    /// Sortie pour exactement 1 unité humaine d'entrée.
    pub async fn unit_price(&self, direction: AmmDirection) -> Result<f64> {
        Ok(self.quote(1.0, direction, Slippage::ZERO).await?.output_amount)
    }
}
