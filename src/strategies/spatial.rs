// DANS : src/strategies/spatial.rs

use crate::decoders::meteora::dlmm::DecodedDlmmPool;
use crate::decoders::pump::amm::DecodedPumpAmmPool;
use crate::decoders::PoolOperations;
use crate::error::{is_connectivity_error, ArbError};
use crate::quoting::{AmmDirection, BinDirection, DlmmAdapter, PumpAmmAdapter, Quote, Slippage, Venue};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Étape d'un aller-retour : on sort de l'actif de base, puis on y revient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hop {
    IntoTarget,
    IntoBase,
}

/// Sens d'un aller-retour, nommé par la venue où l'on achète le token cible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    PumpToDlmm,
    DlmmToPump,
}

impl Direction {
    pub fn venues(&self) -> (Venue, Venue) {
        match self {
            Direction::PumpToDlmm => (Venue::PumpSwap, Venue::MeteoraDlmm),
            Direction::DlmmToPump => (Venue::MeteoraDlmm, Venue::PumpSwap),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (buy, sell) = self.venues();
        write!(f, "{} -> {}", buy, sell)
    }
}

// --- CORRESPONDANCE DES SENS ---
// Chaque venue a son propre type de sens. On détecte de quel côté du pool se
// trouve l'actif de base au lieu de le supposer.

/// Vrai si l'actif de base est le second token du pool (quote pour pump, Y pour DLMM).
fn base_is_second_side<P: PoolOperations>(pool: &P, base_mint: &Pubkey) -> Result<bool> {
    if !pool.holds_mint(base_mint) {
        return Err(ArbError::quote(
            pool.venue_name(),
            format!("base mint {} absent du pool {}", base_mint, pool.address()),
        )
        .into());
    }
    Ok(pool.get_mints().1 == *base_mint)
}

pub fn amm_direction_for(hop: Hop, pool: &DecodedPumpAmmPool, base_mint: &Pubkey) -> Result<AmmDirection> {
    Ok(match (hop, base_is_second_side(pool, base_mint)?) {
        (Hop::IntoTarget, true) | (Hop::IntoBase, false) => AmmDirection::QuoteToBase,
        (Hop::IntoTarget, false) | (Hop::IntoBase, true) => AmmDirection::BaseToQuote,
    })
}

pub fn bin_direction_for(hop: Hop, pair: &DecodedDlmmPool, base_mint: &Pubkey) -> Result<BinDirection> {
    Ok(match (hop, base_is_second_side(pair, base_mint)?) {
        (Hop::IntoTarget, true) | (Hop::IntoBase, false) => BinDirection::YtoX,
        (Hop::IntoTarget, false) | (Hop::IntoBase, true) => BinDirection::XtoY,
    })
}

/// Une venue vue par l'évaluateur : une quote par étape d'aller-retour.
#[async_trait]
pub trait HopQuoter: Send + Sync {
    fn venue(&self) -> Venue;

    async fn quote_hop(&self, hop: Hop, amount: f64, base_mint: &Pubkey, slippage: Slippage) -> Result<Quote>;

    /// Tokens cibles obtenus pour exactement 1 unité de l'actif de base.
    async fn unit_price(&self, base_mint: &Pubkey) -> Result<f64> {
        Ok(self.quote_hop(Hop::IntoTarget, 1.0, base_mint, Slippage::ZERO).await?.output_amount)
    }
}

#[async_trait]
impl HopQuoter for PumpAmmAdapter {
    fn venue(&self) -> Venue {
        PumpAmmAdapter::venue(self)
    }

    async fn quote_hop(&self, hop: Hop, amount: f64, base_mint: &Pubkey, slippage: Slippage) -> Result<Quote> {
        let pool = self.fetch_pool().await?;
        let direction = amm_direction_for(hop, &pool, base_mint)?;
        self.quote(amount, direction, slippage).await
    }
}

#[async_trait]
impl HopQuoter for DlmmAdapter {
    fn venue(&self) -> Venue {
        DlmmAdapter::venue(self)
    }

    async fn quote_hop(&self, hop: Hop, amount: f64, base_mint: &Pubkey, slippage: Slippage) -> Result<Quote> {
        let pair = self.fetch_pool().await?;
        let direction = bin_direction_for(hop, &pair, base_mint)?;
        self.quote(amount, direction, slippage).await
    }
}

// --- RÉSULTATS ---

#[derive(Debug, Clone, Serialize)]
pub struct ArbitrageOpportunity {
    pub direction: Direction,
    pub buy_venue: &'static str,
    pub sell_venue: &'static str,
    pub input_amount: f64,
    pub output_amount: f64,
    pub profit: f64,
    pub profit_pct: f64,
    pub timestamp: DateTime<Utc>,
    pub buy_leg: Quote,
    pub sell_leg: Quote,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectionFailure {
    pub direction: Direction,
    pub reason: String,
    /// Vrai si l'échec vient du réseau (la boucle de scan reconnectera).
    pub connectivity: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub best: Option<ArbitrageOpportunity>,
    /// Dans l'ordre d'évaluation : PumpToDlmm puis DlmmToPump.
    pub opportunities: Vec<ArbitrageOpportunity>,
    pub failures: Vec<DirectionFailure>,
}

impl CycleReport {
    pub fn has_connectivity_failure(&self) -> bool {
        self.failures.iter().any(|f| f.connectivity)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SpreadReport {
    /// Tokens cibles pour 1 unité de base, sur chaque venue.
    pub pump_price: f64,
    pub dlmm_price: f64,
    pub spread_pct: f64,
    /// Venue où le token cible est le moins cher (celle qui en donne le plus).
    pub cheaper_venue: Venue,
    pub timestamp: DateTime<Utc>,
}

/// Parmi les opportunités au-dessus du seuil, la première au profit strictement
/// le plus élevé. À égalité, la première vue gagne.
pub fn select_best(opportunities: &[ArbitrageOpportunity], min_profit_pct: f64) -> Option<&ArbitrageOpportunity> {
    let mut best: Option<&ArbitrageOpportunity> = None;
    for opportunity in opportunities.iter().filter(|o| o.profit_pct >= min_profit_pct) {
        if best.is_none_or(|b| opportunity.profit_pct > b.profit_pct) {
            best = Some(opportunity);
        }
    }
    best
}

// --- ÉVALUATEUR ---

pub struct ArbitrageEvaluator {
    pump: Arc<dyn HopQuoter>,
    dlmm: Arc<dyn HopQuoter>,
    base_mint: Pubkey,
    slippage: Slippage,
    min_profit_pct: f64,
}

impl ArbitrageEvaluator {
    pub fn new(
        pump: Arc<dyn HopQuoter>,
        dlmm: Arc<dyn HopQuoter>,
        base_mint: Pubkey,
        slippage: Slippage,
        min_profit_pct: f64,
    ) -> Self {
        Self { pump, dlmm, base_mint, slippage, min_profit_pct }
    }

    pub fn min_profit_pct(&self) -> f64 {
        self.min_profit_pct
    }

    /// Évalue les deux sens en parallèle (même thread) et attend les deux.
    /// L'échec d'un sens n'empêche jamais le rapport de l'autre.
    pub async fn evaluate_cycle(&self, trade_size: f64) -> CycleReport {
        let (pump_first, dlmm_first) = tokio::join!(
            self.evaluate_direction(Direction::PumpToDlmm, trade_size),
            self.evaluate_direction(Direction::DlmmToPump, trade_size),
        );

        let mut opportunities = Vec::with_capacity(2);
        let mut failures = Vec::new();
        for (direction, result) in [(Direction::PumpToDlmm, pump_first), (Direction::DlmmToPump, dlmm_first)] {
            match result {
                Ok(opportunity) => {
                    debug!(
                        %direction,
                        input = opportunity.input_amount,
                        output = opportunity.output_amount,
                        profit_pct = opportunity.profit_pct,
                        "[Spatial] Sens évalué."
                    );
                    opportunities.push(opportunity);
                }
                Err(e) => {
                    let reason = format!("{:#}", e);
                    warn!(%direction, error = %reason, "[Spatial] Échec de l'évaluation, sens ignoré pour ce cycle.");
                    failures.push(DirectionFailure { direction, connectivity: is_connectivity_error(&e), reason });
                }
            }
        }

        let best = select_best(&opportunities, self.min_profit_pct).cloned();
        if let Some(b) = &best {
            info!(
                direction = %b.direction,
                profit = b.profit,
                profit_pct = b.profit_pct,
                "[Spatial] Opportunité au-dessus du seuil."
            );
        }
        CycleReport { best, opportunities, failures }
    }

    async fn evaluate_direction(&self, direction: Direction, trade_size: f64) -> Result<ArbitrageOpportunity> {
        let (buy, sell) = match direction {
            Direction::PumpToDlmm => (&self.pump, &self.dlmm),
            Direction::DlmmToPump => (&self.dlmm, &self.pump),
        };

        let buy_leg = buy
            .quote_hop(Hop::IntoTarget, trade_size, &self.base_mint, self.slippage)
            .await
            .with_context(|| format!("{} : achat sur {}", direction, buy.venue()))?;
        let sell_leg = sell
            .quote_hop(Hop::IntoBase, buy_leg.output_amount, &self.base_mint, self.slippage)
            .await
            .with_context(|| format!("{} : revente sur {}", direction, sell.venue()))?;

        let profit = sell_leg.output_amount - trade_size;
        Ok(ArbitrageOpportunity {
            direction,
            buy_venue: buy.venue().display_name(),
            sell_venue: sell.venue().display_name(),
            input_amount: trade_size,
            output_amount: sell_leg.output_amount,
            profit,
            profit_pct: profit / trade_size * 100.0,
            timestamp: Utc::now(),
            buy_leg,
            sell_leg,
        })
    }

    /// Prix unitaire sur chaque venue et écart en %, sans seuil de profit.
    pub async fn price_spread(&self) -> Result<SpreadReport> {
        let (pump_price, dlmm_price) = tokio::join!(
            self.pump.unit_price(&self.base_mint),
            self.dlmm.unit_price(&self.base_mint),
        );
        let pump_price = pump_price.with_context(|| format!("Prix unitaire {}", self.pump.venue()))?;
        let dlmm_price = dlmm_price.with_context(|| format!("Prix unitaire {}", self.dlmm.venue()))?;

        let lower = pump_price.min(dlmm_price);
        if !(lower > 0.0) {
            return Err(ArbError::quote("spread", format!("prix unitaire nul (pump={}, dlmm={})", pump_price, dlmm_price)).into());
        }
        Ok(SpreadReport {
            pump_price,
            dlmm_price,
            spread_pct: (pump_price - dlmm_price).abs() / lower * 100.0,
            cheaper_venue: if pump_price >= dlmm_price { self.pump.venue() } else { self.dlmm.venue() },
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quoting::test_market::TestMarket;
    use std::sync::atomic::Ordering;

    fn opportunity(direction: Direction, profit_pct: f64) -> ArbitrageOpportunity {
        let leg = Quote {
            venue: Venue::PumpSwap,
            input_mint: Pubkey::default(),
            output_mint: Pubkey::default(),
            input_amount: 0.1,
            output_amount: 0.1,
            min_output_amount: 0.1,
            fee: 0.0,
            price_impact_pct: 0.0,
            raw_input: 1,
            raw_output: 1,
        };
        let (buy, sell) = direction.venues();
        ArbitrageOpportunity {
            direction,
            buy_venue: buy.display_name(),
            sell_venue: sell.display_name(),
            input_amount: 0.1,
            output_amount: 0.1 * (1.0 + profit_pct / 100.0),
            profit: 0.1 * profit_pct / 100.0,
            profit_pct,
            timestamp: Utc::now(),
            buy_leg: leg.clone(),
            sell_leg: leg,
        }
    }

    #[test]
    fn best_is_first_strictly_greater_above_threshold() {
        let candidates = vec![
            opportunity(Direction::PumpToDlmm, 0.2),
            opportunity(Direction::DlmmToPump, 0.5),
            opportunity(Direction::PumpToDlmm, 0.5),
        ];
        let best = select_best(&candidates, 0.3).unwrap();
        assert_eq!(best.direction, Direction::DlmmToPump);
        assert!(std::ptr::eq(best, &candidates[1]));
    }

    #[test]
    fn nothing_below_threshold_is_selected() {
        let candidates = vec![opportunity(Direction::PumpToDlmm, 0.2), opportunity(Direction::DlmmToPump, -1.0)];
        assert!(select_best(&candidates, 0.3).is_none());
        // Le seuil est inclusif.
        assert!(select_best(&candidates, 0.2).is_some());
    }

    #[tokio::test]
    async fn direction_mapping_detects_base_side() {
        let market = TestMarket::build();
        let pump = market.pump_adapter().fetch_pool().await.unwrap();
        let dlmm = market.dlmm_adapter().fetch_pool().await.unwrap();

        // pump : WSOL est le côté quote ; DLMM : WSOL est Y.
        assert_eq!(amm_direction_for(Hop::IntoTarget, &pump, &market.wsol).unwrap(), AmmDirection::QuoteToBase);
        assert_eq!(amm_direction_for(Hop::IntoBase, &pump, &market.wsol).unwrap(), AmmDirection::BaseToQuote);
        assert_eq!(bin_direction_for(Hop::IntoTarget, &dlmm, &market.wsol).unwrap(), BinDirection::YtoX);
        assert_eq!(bin_direction_for(Hop::IntoBase, &dlmm, &market.wsol).unwrap(), BinDirection::XtoY);

        // Mêmes pools, base inversée.
        assert_eq!(amm_direction_for(Hop::IntoTarget, &pump, &market.token).unwrap(), AmmDirection::BaseToQuote);
        assert_eq!(bin_direction_for(Hop::IntoTarget, &dlmm, &market.token).unwrap(), BinDirection::XtoY);

        let stranger = Pubkey::new_unique();
        assert!(amm_direction_for(Hop::IntoTarget, &pump, &stranger).is_err());
        assert!(bin_direction_for(Hop::IntoBase, &dlmm, &stranger).is_err());
    }

    fn evaluator(market: &TestMarket, min_profit_pct: f64) -> ArbitrageEvaluator {
        ArbitrageEvaluator::new(
            Arc::new(market.pump_adapter()),
            Arc::new(market.dlmm_adapter()),
            market.wsol,
            Slippage::from_fraction(0.01).unwrap(),
            min_profit_pct,
        )
    }

    #[tokio::test]
    async fn cycle_finds_the_cheap_side() {
        // Token à 1 SOL sur DLMM, ~1.11 SOL sur pump : acheter DLMM, revendre pump.
        let market = TestMarket::build();
        let report = evaluator(&market, 0.3).evaluate_cycle(0.1).await;
        assert!(report.failures.is_empty());
        assert_eq!(report.opportunities.len(), 2);
        assert_eq!(report.opportunities[0].direction, Direction::PumpToDlmm);
        assert!(report.opportunities[0].profit_pct < 0.0);

        let best = report.best.unwrap();
        assert_eq!(best.direction, Direction::DlmmToPump);
        assert_eq!(best.buy_venue, "Meteora DLMM");
        assert!(best.profit_pct > 9.0 && best.profit_pct < 11.0);
        assert!((best.profit - (best.output_amount - 0.1)).abs() < 1e-15);
        assert!((best.sell_leg.input_amount - best.buy_leg.output_amount).abs() < 1e-9);
    }

    #[tokio::test]
    async fn offline_ledger_marks_failures_as_connectivity() {
        let market = TestMarket::build();
        market.ledger.offline.store(true, Ordering::SeqCst);
        let report = evaluator(&market, 0.3).evaluate_cycle(0.1).await;
        assert!(report.opportunities.is_empty());
        assert_eq!(report.failures.len(), 2);
        assert!(report.has_connectivity_failure());
        assert!(report.best.is_none());
    }

    #[tokio::test]
    async fn spread_compares_unit_prices() {
        let market = TestMarket::build();
        let spread = evaluator(&market, 0.3).price_spread().await.unwrap();
        // 1 SOL achète ~0.998 token sur DLMM, ~0.896 sur pump.
        assert!(spread.dlmm_price > spread.pump_price);
        assert_eq!(spread.cheaper_venue, Venue::MeteoraDlmm);
        assert!(spread.spread_pct > 10.0 && spread.spread_pct < 13.0);
    }
}
