// src/decoders/mod.rs

// Chaque venue a son décodeur : lecture du compte on-chain, hydratation
// des réserves et mathématiques de swap.
pub mod meteora;
pub mod pool_operations;
pub mod pump;
pub mod spl_token_decoders;

pub use pool_operations::PoolOperations;
