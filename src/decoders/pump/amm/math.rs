// DANS : src/decoders/pump/amm/math.rs

use anyhow::{bail, Result};

const BPS_DENOMINATOR: u128 = 10_000;

/// Résultat brut d'un swap sur la courbe x*y=k de pump.fun.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwapOutcome {
    pub amount_out: u64,
    /// Frais prélevés, en unités brutes du token sur lequel ils sont pris.
    pub fee: u64,
    /// Vrai si les frais sont pris sur l'input (achat), faux s'ils sont pris sur l'output (vente).
    pub fee_on_input: bool,
    /// Écart (en %) entre le prix spot des réserves et le prix d'exécution, hors frais.
    pub price_impact_pct: f64,
}

/// Achat : on paie en token de quote, on reçoit le token de base.
/// Les frais sont pris sur l'INPUT, le swap se fait sur le montant NET.
pub fn quote_buy(quote_in: u64, base_reserve: u64, quote_reserve: u64, total_fee_bps: u64) -> Result<SwapOutcome> {
    ensure_liquidity(base_reserve, quote_reserve)?;
    let amount_in = quote_in as u128;
    let fee = amount_in * total_fee_bps as u128 / BPS_DENOMINATOR;
    let net_in = amount_in.saturating_sub(fee);
    let amount_out = constant_product_out(net_in, quote_reserve as u128, base_reserve as u128);

    Ok(SwapOutcome {
        amount_out: amount_out as u64,
        fee: fee as u64,
        fee_on_input: true,
        price_impact_pct: impact_pct(net_in, quote_reserve as u128),
    })
}

/// Vente : on paie en token de base, on reçoit le token de quote.
/// Le swap se fait sur le montant BRUT, les frais sont pris sur l'OUTPUT.
pub fn quote_sell(base_in: u64, base_reserve: u64, quote_reserve: u64, total_fee_bps: u64) -> Result<SwapOutcome> {
    ensure_liquidity(base_reserve, quote_reserve)?;
    let amount_in = base_in as u128;
    let gross_out = constant_product_out(amount_in, base_reserve as u128, quote_reserve as u128);
    let fee = gross_out * total_fee_bps as u128 / BPS_DENOMINATOR;

    Ok(SwapOutcome {
        amount_out: gross_out.saturating_sub(fee) as u64,
        fee: fee as u64,
        fee_on_input: false,
        price_impact_pct: impact_pct(amount_in, base_reserve as u128),
    })
}

fn ensure_liquidity(base_reserve: u64, quote_reserve: u64) -> Result<()> {
    if base_reserve == 0 || quote_reserve == 0 {
        bail!("pool has no liquidity (base={}, quote={})", base_reserve, quote_reserve);
    }
    Ok(())
}

fn constant_product_out(amount_in: u128, in_reserve: u128, out_reserve: u128) -> u128 {
    let denominator = in_reserve + amount_in;
    if denominator == 0 { return 0; }
    amount_in * out_reserve / denominator
}

// spot = in * R_out / R_in ; exécution = in * R_out / (R_in + in)
// => impact = in / (R_in + in)
fn impact_pct(net_in: u128, in_reserve: u128) -> f64 {
    let denominator = in_reserve + net_in;
    if denominator == 0 { return 0.0; }
    net_in as f64 / denominator as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_RESERVE: u64 = 200_000_000_000_000; // 200M tokens (6 décimales)
    const QUOTE_RESERVE: u64 = 100_000_000_000; // 100 SOL

    #[test]
    fn buy_takes_fee_on_input() {
        let out = quote_buy(1_000_000_000, BASE_RESERVE, QUOTE_RESERVE, 30).unwrap();
        // 1 SOL - 0.3% = 0.997 SOL net
        assert_eq!(out.fee, 3_000_000);
        assert!(out.fee_on_input);
        let expected = 997_000_000u128 * BASE_RESERVE as u128 / (QUOTE_RESERVE as u128 + 997_000_000);
        assert_eq!(out.amount_out as u128, expected);
    }

    #[test]
    fn sell_takes_fee_on_output() {
        let out = quote_sell(2_000_000_000_000, BASE_RESERVE, QUOTE_RESERVE, 30).unwrap();
        let gross = 2_000_000_000_000u128 * QUOTE_RESERVE as u128 / (BASE_RESERVE as u128 + 2_000_000_000_000);
        assert_eq!(out.fee as u128, gross * 30 / 10_000);
        assert_eq!(out.amount_out as u128, gross - gross * 30 / 10_000);
        assert!(!out.fee_on_input);
    }

    #[test]
    fn round_trip_loses_value() {
        let bought = quote_buy(1_000_000_000, BASE_RESERVE, QUOTE_RESERVE, 30).unwrap();
        let sold = quote_sell(bought.amount_out, BASE_RESERVE, QUOTE_RESERVE, 30).unwrap();
        assert!(sold.amount_out < 1_000_000_000);
    }

    #[test]
    fn impact_grows_with_size() {
        let small = quote_buy(10_000_000, BASE_RESERVE, QUOTE_RESERVE, 30).unwrap();
        let large = quote_buy(10_000_000_000, BASE_RESERVE, QUOTE_RESERVE, 30).unwrap();
        assert!(small.price_impact_pct < large.price_impact_pct);
        assert!(large.price_impact_pct > 9.0 && large.price_impact_pct < 10.0);
    }

    #[test]
    fn empty_pool_is_an_error() {
        assert!(quote_buy(1, 0, QUOTE_RESERVE, 30).is_err());
        assert!(quote_sell(1, BASE_RESERVE, 0, 30).is_err());
    }
}
