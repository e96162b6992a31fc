// DANS : src/decoders/meteora/dlmm/bin_array.rs

use anyhow::{bail, Result};
use bytemuck::{pod_read_unaligned, Pod, Zeroable};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::mem;

pub const MAX_BIN_PER_ARRAY: usize = 70;
const BIN_ARRAY_SEED: &[u8] = b"bin_array";
const BIN_ARRAY_DISCRIMINATOR: [u8; 8] = [92, 142, 92, 220, 5, 148, 70, 181];
// index (i64) | version (u8) | padding [u8; 7] | lb_pair (32)
const BINS_FIELD_OFFSET: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecodedBin {
    pub amount_x: u64,
    pub amount_y: u64,
    /// Prix Q64.64 stocké on-chain (0 si le bin n'a jamais été initialisé).
    pub price: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedBinArray {
    pub index: i64,
    pub bins: Vec<DecodedBin>,
}

impl DecodedBinArray {
    pub fn bin(&self, bin_id: i32) -> Option<&DecodedBin> {
        self.bins.get(bin_offset_in_array(bin_id))
    }
}

pub(crate) mod onchain_layouts {
    use super::*;

    #[repr(C, packed)]
    #[derive(Clone, Copy, Pod, Zeroable, Debug)]
    pub struct Bin {
        pub amount_x: u64,
        pub amount_y: u64,
        pub price: u128,
        pub liquidity_supply: u128,
        pub reward_per_token_stored: [u128; 2],
        pub fee_amount_x_per_token_stored: u128,
        pub fee_amount_y_per_token_stored: u128,
        pub amount_x_in: u128,
        pub amount_y_in: u128,
    }
}

pub fn get_bin_array_index_from_bin_id(bin_id: i32) -> i64 {
    (bin_id as i64).div_euclid(MAX_BIN_PER_ARRAY as i64)
}

fn bin_offset_in_array(bin_id: i32) -> usize {
    (bin_id as i64).rem_euclid(MAX_BIN_PER_ARRAY as i64) as usize
}

pub fn get_bin_array_address(lb_pair: &Pubkey, bin_array_index: i64, program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[BIN_ARRAY_SEED, &lb_pair.to_bytes(), &bin_array_index.to_le_bytes()], program_id).0
}

pub fn decode_bin_array(index: i64, data: &[u8]) -> Result<DecodedBinArray> {
    if data.get(..8) != Some(&BIN_ARRAY_DISCRIMINATOR) {
        bail!("Invalid BinArray discriminator");
    }
    let data_slice = &data[8..];
    let bin_size = mem::size_of::<onchain_layouts::Bin>();

    let mut bins = Vec::with_capacity(MAX_BIN_PER_ARRAY);
    for i in 0..MAX_BIN_PER_ARRAY {
        let bin_offset = BINS_FIELD_OFFSET + i * bin_size;
        let bin_end_offset = bin_offset + bin_size;
        if data_slice.len() < bin_end_offset {
            bail!("BinArray data slice too short to read bin #{}", i);
        }
        let bin: onchain_layouts::Bin = pod_read_unaligned(&data_slice[bin_offset..bin_end_offset]);
        bins.push(DecodedBin { amount_x: bin.amount_x, amount_y: bin.amount_y, price: bin.price });
    }
    Ok(DecodedBinArray { index, bins })
}

/// Construit les données brutes d'un BinArray (tests uniquement).
#[cfg(test)]
pub(crate) fn encode_bin_array(index: i64, lb_pair: &Pubkey, bins: &[DecodedBin]) -> Vec<u8> {
    let mut data = BIN_ARRAY_DISCRIMINATOR.to_vec();
    data.extend_from_slice(&index.to_le_bytes());
    data.extend_from_slice(&[0u8; 8]);
    data.extend_from_slice(lb_pair.as_ref());
    for i in 0..MAX_BIN_PER_ARRAY {
        let b = bins.get(i).copied().unwrap_or_default();
        let raw = onchain_layouts::Bin {
            amount_x: b.amount_x,
            amount_y: b.amount_y,
            price: b.price,
            ..Zeroable::zeroed()
        };
        data.extend_from_slice(bytemuck::bytes_of(&raw));
    }
    data
}
