// DANS : src/state/mod.rs

// Caches vivant aussi longtemps que le processus, possédés par le `ServiceContext`.
pub mod decimals;
pub mod pool_cache;

pub use decimals::DecimalsResolver;
pub use pool_cache::PoolSlot;
