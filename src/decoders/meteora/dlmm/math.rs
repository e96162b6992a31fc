// DANS : src/decoders/meteora/dlmm/math.rs

use anyhow::{anyhow, Result};
use ruint::aliases::U256;

pub const FEE_PRECISION: u128 = 1_000_000_000;
pub const BASIS_POINT_MAX: f64 = 10_000.0;
const MAX_FEE_RATE: u128 = 100_000_000; // 10%
const SCALE_Q64: f64 = 18_446_744_073_709_551_616.0; // 2^64

/// Conversion dans un bin à prix constant. `price` est le prix Q64.64 de X exprimé en Y.
/// `swap_for_y` : X en entrée, Y en sortie.
pub fn get_amount_out(amount_in: u64, price: u128, swap_for_y: bool) -> Result<u64> {
    let amount_in_u256: U256 = U256::from(amount_in);
    let price_u256: U256 = U256::from(price);

    let amount_out_u256: U256 = if swap_for_y {
        (amount_in_u256 * price_u256) >> 64
    } else {
        if price_u256.is_zero() { return Ok(0); }
        (amount_in_u256 << 64) / price_u256
    };
    Ok(amount_out_u256.try_into().unwrap_or(u64::MAX))
}

/// Prix d'un bin relativement au bin actif : `(1 + binStep/10000) ^ (id - activeId)`.
pub fn bin_price_relative(bin_id: i32, active_id: i32, bin_step: u16) -> f64 {
    price_from_id(bin_id - active_id, bin_step)
}

/// Prix "absolu" d'un bin (en unités brutes de Y par unité brute de X).
pub fn price_from_id(bin_id: i32, bin_step: u16) -> f64 {
    (1.0 + bin_step as f64 / BASIS_POINT_MAX).powi(bin_id)
}

/// Même prix, en Q64.64. Utilisé quand un bin n'a pas encore de prix stocké.
pub fn q64_price_from_id(bin_id: i32, bin_step: u16) -> u128 {
    let scaled = price_from_id(bin_id, bin_step) * SCALE_Q64;
    if !scaled.is_finite() || scaled >= u128::MAX as f64 {
        return u128::MAX;
    }
    scaled as u128
}

pub fn q64_to_f64(price: u128) -> f64 {
    price as f64 / SCALE_Q64
}

// --- HELPERS DE CALCUL DE FRAIS ---

pub fn get_base_fee(bin_step: u16, base_factor: u16, base_fee_power_factor: u8) -> Result<u128> {
    u128::from(base_factor)
        .checked_mul(bin_step.into())
        .and_then(|v| v.checked_mul(10))
        .and_then(|v| v.checked_mul(10u128.checked_pow(base_fee_power_factor.into())?))
        .ok_or_else(|| anyhow!("MathOverflow: base fee"))
}

pub fn compute_variable_fee(volatility_accumulator: u32, bin_step: u16, variable_fee_control: u32) -> Result<u128> {
    if variable_fee_control == 0 {
        return Ok(0);
    }
    let vfa: u128 = volatility_accumulator.into();
    let v_fee = vfa
        .checked_mul(bin_step.into())
        .and_then(|v| v.checked_pow(2))
        .and_then(|v| v.checked_mul(variable_fee_control.into()))
        .ok_or_else(|| anyhow!("MathOverflow: variable fee"))?;
    // Arrondi au plafond, comme le programme on-chain.
    Ok(v_fee.div_ceil(100_000_000_000))
}

pub fn get_total_fee(base_fee: u128, variable_fee: u128) -> u128 {
    base_fee.saturating_add(variable_fee).min(MAX_FEE_RATE)
}

pub fn fee_rate_as_percent(fee_rate: u128) -> f64 {
    fee_rate as f64 / FEE_PRECISION as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_price_follows_bin_step() {
        assert!((bin_price_relative(101, 100, 10) - 1.001).abs() < 1e-12);
        assert!((bin_price_relative(99, 100, 10) - 0.999_000_999_000_999).abs() < 1e-12);
        assert!((bin_price_relative(100, 100, 10) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn q64_conversion_round_trips_within_precision() {
        let q = q64_price_from_id(-5_000, 25);
        let expected = price_from_id(-5_000, 25);
        assert!((q64_to_f64(q) - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn amount_out_in_both_directions() {
        let two = 2u128 << 64;
        assert_eq!(get_amount_out(1_000, two, true).unwrap(), 2_000);
        assert_eq!(get_amount_out(1_000, two, false).unwrap(), 500);
        assert_eq!(get_amount_out(1_000, 0, false).unwrap(), 0);
    }

    #[test]
    fn base_fee_uses_power_factor() {
        // base_factor 10_000, bin_step 25 => 0.25%
        let fee = get_base_fee(25, 10_000, 0).unwrap();
        assert_eq!(fee, 2_500_000);
        assert!((fee_rate_as_percent(fee) - 0.25).abs() < 1e-12);
        assert_eq!(get_base_fee(25, 10_000, 1).unwrap(), 25_000_000);
    }

    #[test]
    fn total_fee_is_capped_at_ten_percent() {
        assert_eq!(get_total_fee(90_000_000, 50_000_000), 100_000_000);
        assert_eq!(compute_variable_fee(1_000, 25, 0).unwrap(), 0);
        assert!(compute_variable_fee(10_000, 25, 7_500).unwrap() > 0);
    }
}
