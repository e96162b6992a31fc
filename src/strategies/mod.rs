// src/strategies/mod.rs

// Arbitrage spatial entre le pool pump.fun et le LbPair DLMM du même token.
pub mod spatial;

pub use spatial::{
    amm_direction_for, bin_direction_for, select_best, ArbitrageEvaluator, ArbitrageOpportunity, CycleReport,
    Direction, DirectionFailure, Hop, HopQuoter, SpreadReport,
};
