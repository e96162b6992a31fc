// src/decoders/pool_operations.rs

use solana_sdk::pubkey::Pubkey;

/// Vue commune des descripteurs de pool des deux venues.
pub trait PoolOperations {
    fn address(&self) -> Pubkey;
    /// (mint A, mint B) : (base, quote) pour pump, (X, Y) pour DLMM.
    fn get_mints(&self) -> (Pubkey, Pubkey);
    /// Comptes de jetons qui détiennent les réserves, dans le même ordre que `get_mints`.
    fn get_vaults(&self) -> (Pubkey, Pubkey);
    fn venue_name(&self) -> &'static str;

    /// Vrai si `mint` est l'un des deux tokens du pool.
    fn holds_mint(&self, mint: &Pubkey) -> bool {
        let (a, b) = self.get_mints();
        *mint == a || *mint == b
    }
}
