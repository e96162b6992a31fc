// DANS : src/quoting/mod.rs

//! Adaptateurs de quote : montants "humains" en entrée et en sortie, unités
//! brutes du ledger entre les deux.

use anyhow::{bail, Result};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::fmt;

pub mod dlmm;
pub mod pump_amm;
#[cfg(test)]
pub(crate) mod test_market;

pub use dlmm::DlmmAdapter;
pub use pump_amm::PumpAmmAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Venue {
    PumpSwap,
    MeteoraDlmm,
}

impl Venue {
    pub fn display_name(&self) -> &'static str {
        match self {
            Venue::PumpSwap => "PumpSwap",
            Venue::MeteoraDlmm => "Meteora DLMM",
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Sens d'un swap sur le pool AMM, nommé d'après les côtés base/quote du pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AmmDirection {
    BaseToQuote,
    QuoteToBase,
}

/// Sens d'un swap sur le pool à bins. Volontairement distinct d'`AmmDirection`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinDirection {
    XtoY,
    YtoX,
}

impl BinDirection {
    pub fn swap_for_y(&self) -> bool {
        matches!(self, BinDirection::XtoY)
    }
}

/// Tolérance de slippage, stockée en fraction (0.01 = 1%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Slippage(f64);

impl Slippage {
    pub const ZERO: Slippage = Slippage(0.0);

    pub fn from_fraction(fraction: f64) -> Result<Self> {
        if !fraction.is_finite() || !(0.0..1.0).contains(&fraction) {
            bail!("slippage must be a fraction in [0, 1), got {}", fraction);
        }
        Ok(Self(fraction))
    }

    pub fn fraction(&self) -> f64 {
        self.0
    }

    pub fn percent(&self) -> f64 {
        self.0 * 100.0
    }

    /// Points de base pour la venue à bins : `floor(pourcentage * 100)`.
    ///
    /// Calculé sur l'écriture décimale la plus courte de la fraction (celle que
    /// l'utilisateur a saisie), pas sur le produit f64 : 0.0029 donne 29 et non 28.
    pub fn to_bps(&self) -> u64 {
        // `{}` sur un f64 n'utilise jamais la notation exponentielle.
        let repr = format!("{}", self.0);
        let (int_part, frac_part) = repr.split_once('.').unwrap_or((&repr, ""));
        let whole: u64 = int_part.parse().unwrap_or(0);
        let bps_digits: u64 = frac_part
            .chars()
            .chain(std::iter::repeat('0'))
            .take(4)
            .fold(0, |acc, c| acc * 10 + c.to_digit(10).unwrap_or(0) as u64);
        whole * 10_000 + bps_digits
    }
}

/// Résultat d'une quote, en unités humaines. Éphémère.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub venue: Venue,
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    pub input_amount: f64,
    pub output_amount: f64,
    /// Sortie minimale acceptée avec la tolérance de slippage demandée.
    pub min_output_amount: f64,
    /// Frais, dans le token sur lequel ils sont prélevés.
    pub fee: f64,
    pub price_impact_pct: f64,
    pub raw_input: u64,
    pub raw_output: u64,
}

fn scale(decimals: u8) -> f64 {
    10f64.powi(decimals as i32)
}

/// Humain -> brut, par troncature. Garantit `to_human(to_raw(x, d), d) <= x`.
pub fn to_raw(amount: f64, decimals: u8) -> Result<u64> {
    if !amount.is_finite() || amount < 0.0 {
        bail!("invalid token amount: {}", amount);
    }
    let scale = scale(decimals);
    let scaled = (amount * scale).floor();
    if scaled >= u64::MAX as f64 {
        bail!("token amount {} overflows u64 at {} decimals", amount, decimals);
    }
    let mut raw = scaled as u64;
    // La multiplication flottante peut arrondir vers le haut d'un ulp.
    while raw > 0 && raw as f64 / scale > amount {
        raw -= 1;
    }
    Ok(raw)
}

pub fn to_human(raw: u64, decimals: u8) -> f64 {
    raw as f64 / scale(decimals)
}
