// DANS : src/decoders/meteora/dlmm/pool.rs

use super::bin_array::{decode_bin_array, get_bin_array_address, get_bin_array_index_from_bin_id, DecodedBinArray};
use super::math::{self, FEE_PRECISION};
use crate::decoders::pool_operations::PoolOperations;
use crate::decoders::spl_token_decoders::account::decode_token_amount;
use crate::error::ArbError;
use crate::rpc::LedgerClient;
use anyhow::{anyhow, Context, Result};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;
use std::collections::BTreeMap;
use std::mem;
use tracing::debug;

// --- CONSTANTES ---
pub const PROGRAM_ID: Pubkey = pubkey!("LBUZKhRxPF3XUpBCjp4YzTKgLccjZhTSDM9YuVaPwxo");
pub const LB_PAIR_DISCRIMINATOR: [u8; 8] = [33, 11, 49, 98, 181, 101, 177, 13];
/// Nombre de BinArrays chargés pour une quote : l'actif puis deux dans le sens du swap.
pub const SWAP_BIN_ARRAY_DEPTH: i64 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedDlmmPool {
    pub address: Pubkey,
    pub token_x_mint: Pubkey,
    pub token_y_mint: Pubkey,
    pub reserve_x: Pubkey,
    pub reserve_y: Pubkey,
    pub oracle: Pubkey,
    pub active_id: i32,
    pub bin_step: u16,
    pub status: u8,
    pub pair_type: u8,
    /// Frais de base, précision 1e9.
    pub base_fee_rate: u128,
    /// Part du protocole sur les frais, en points de base.
    pub protocol_share_bps: u16,
    pub parameters: onchain_layouts::StaticParameters,
    pub v_parameters: onchain_layouts::VariableParameters,
    // Soldes des comptes de réserve au moment du fetch.
    pub reserve_x_amount: u64,
    pub reserve_y_amount: u64,
}

/// Résultat d'un parcours de bins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinSwapOutcome {
    pub amount_out: u64,
    /// Frais totaux, en unités brutes du token d'entrée.
    pub fee: u64,
    pub bins_crossed: u32,
    pub end_bin_id: i32,
    pub price_impact_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinLiquidity {
    pub bin_id: i32,
    /// Prix relatif au bin actif.
    pub price: f64,
    pub amount_x: u64,
    pub amount_y: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinSnapshot {
    pub active_id: i32,
    pub bin_step: u16,
    pub bins: Vec<BinLiquidity>,
}

impl DecodedDlmmPool {
    pub fn fee_as_percent(&self) -> f64 {
        math::fee_rate_as_percent(self.base_fee_rate)
    }

    /// Index des BinArrays à charger pour un swap dans ce sens.
    pub fn swap_bin_array_indices(&self, swap_for_y: bool) -> Vec<i64> {
        let active = get_bin_array_index_from_bin_id(self.active_id);
        (0..SWAP_BIN_ARRAY_DEPTH)
            .map(|i| if swap_for_y { active - i } else { active + i })
            .collect()
    }

    /// Index des BinArrays couvrant `active_id ± range`.
    pub fn bin_array_indices_around_active(&self, range: i32) -> Vec<i64> {
        let low = get_bin_array_index_from_bin_id(self.active_id.saturating_sub(range));
        let high = get_bin_array_index_from_bin_id(self.active_id.saturating_add(range));
        (low..=high).collect()
    }

    fn variable_fee_control(&self) -> u32 { self.parameters.variable_fee_control }

    /// Simule un swap "exact in" en parcourant les bins depuis le bin actif.
    /// X->Y descend vers les ids inférieurs, Y->X monte.
    pub fn simulate_swap(
        &self,
        bin_arrays: &BTreeMap<i64, DecodedBinArray>,
        amount_in: u64,
        swap_for_y: bool,
        current_timestamp: i64,
    ) -> Result<BinSwapOutcome> {
        if amount_in == 0 {
            return Err(anyhow!("amount_in must be > 0"));
        }
        let mut amount_remaining_in = amount_in as u128;
        let mut total_amount_out: u128 = 0;
        let mut total_fee: u128 = 0;
        let mut bins_crossed: u32 = 0;
        let mut current_bin_id = self.active_id;

        let mut temp_v_params = self.v_parameters;
        update_references(&mut temp_v_params, &self.parameters, self.active_id, current_timestamp)?;

        while amount_remaining_in > 0 {
            if current_bin_id < self.parameters.min_bin_id || current_bin_id > self.parameters.max_bin_id {
                break;
            }
            let bin_array_idx = get_bin_array_index_from_bin_id(current_bin_id);
            let Some(current_bin) = bin_arrays.get(&bin_array_idx).and_then(|a| a.bin(current_bin_id)) else {
                break;
            };

            // On ne met à jour l'accumulateur qu'une fois par bin traversé
            update_volatility_accumulator(&mut temp_v_params, &self.parameters, current_bin_id)?;
            let variable_fee = math::compute_variable_fee(temp_v_params.volatility_accumulator, self.bin_step, self.variable_fee_control())?;
            let total_fee_rate = math::get_total_fee(self.base_fee_rate, variable_fee);

            let out_reserve = if swap_for_y { current_bin.amount_y } else { current_bin.amount_x };
            let price = if current_bin.price == 0 {
                math::q64_price_from_id(current_bin_id, self.bin_step)
            } else {
                current_bin.price
            };

            if out_reserve > 0 {
                // Combien d'input faut-il pour vider la réserve de sortie de ce bin ?
                let max_amount_out_from_bin = out_reserve as u128;
                let required_net_in_for_max_out = math::get_amount_out(out_reserve, price, !swap_for_y)? as u128;
                let fee_for_max_out = (required_net_in_for_max_out * total_fee_rate).div_ceil(FEE_PRECISION - total_fee_rate);
                let required_gross_in_for_max_out = required_net_in_for_max_out + fee_for_max_out;

                if amount_remaining_in >= required_gross_in_for_max_out {
                    // On prend tout le bin
                    total_amount_out += max_amount_out_from_bin;
                    total_fee += fee_for_max_out;
                    amount_remaining_in -= required_gross_in_for_max_out;
                } else {
                    // On ne prend qu'une partie du bin et on termine
                    let fee_on_remaining_in = (amount_remaining_in * total_fee_rate).div_ceil(FEE_PRECISION);
                    let net_amount_in = amount_remaining_in - fee_on_remaining_in;
                    let amount_out_chunk = math::get_amount_out(net_amount_in as u64, price, swap_for_y)? as u128;
                    total_amount_out += amount_out_chunk.min(max_amount_out_from_bin);
                    total_fee += fee_on_remaining_in;
                    amount_remaining_in = 0;
                }
            }

            if amount_remaining_in > 0 {
                bins_crossed += 1;
                current_bin_id = if swap_for_y { current_bin_id - 1 } else { current_bin_id + 1 };
            }
        }

        if amount_remaining_in > 0 {
            return Err(anyhow!(
                "insufficient liquidity: {} of {} input unconsumed after bin {}",
                amount_remaining_in, amount_in, current_bin_id
            ));
        }
        if total_amount_out == 0 {
            return Err(anyhow!("swap output rounds to zero"));
        }

        let price_impact_pct = self.price_impact_pct(bin_arrays, amount_in as u128 - total_fee, total_amount_out, swap_for_y)?;

        Ok(BinSwapOutcome {
            amount_out: total_amount_out as u64,
            fee: total_fee as u64,
            bins_crossed,
            end_bin_id: current_bin_id,
            price_impact_pct,
        })
    }

    /// Compare la sortie réelle à celle qu'on obtiendrait si tout le montant net
    /// s'échangeait au prix du bin actif.
    fn price_impact_pct(
        &self,
        bin_arrays: &BTreeMap<i64, DecodedBinArray>,
        net_in: u128,
        actual_out: u128,
        swap_for_y: bool,
    ) -> Result<f64> {
        let active_price = bin_arrays
            .get(&get_bin_array_index_from_bin_id(self.active_id))
            .and_then(|a| a.bin(self.active_id))
            .map(|b| b.price)
            .filter(|p| *p > 0)
            .unwrap_or_else(|| math::q64_price_from_id(self.active_id, self.bin_step));
        let expected = math::get_amount_out(net_in.min(u64::MAX as u128) as u64, active_price, swap_for_y)? as f64;
        if expected <= 0.0 {
            return Ok(0.0);
        }
        Ok(((expected - actual_out as f64) / expected * 100.0).max(0.0))
    }

    /// Bins autour du bin actif, avec leur prix relatif. Les prix non positifs sont écartés.
    pub fn bins_around_active(&self, bin_arrays: &BTreeMap<i64, DecodedBinArray>, range: i32) -> BinSnapshot {
        let range = range.max(0);
        let bins = (self.active_id.saturating_sub(range)..=self.active_id.saturating_add(range))
            .filter_map(|bin_id| {
                let bin = bin_arrays.get(&get_bin_array_index_from_bin_id(bin_id))?.bin(bin_id)?;
                let price = math::bin_price_relative(bin_id, self.active_id, self.bin_step);
                (price.is_finite() && price > 0.0).then_some(BinLiquidity {
                    bin_id,
                    price,
                    amount_x: bin.amount_x,
                    amount_y: bin.amount_y,
                })
            })
            .collect();
        BinSnapshot { active_id: self.active_id, bin_step: self.bin_step, bins }
    }
}

impl PoolOperations for DecodedDlmmPool {
    fn address(&self) -> Pubkey { self.address }
    fn get_mints(&self) -> (Pubkey, Pubkey) { (self.token_x_mint, self.token_y_mint) }
    fn get_vaults(&self) -> (Pubkey, Pubkey) { (self.reserve_x, self.reserve_y) }
    fn venue_name(&self) -> &'static str { "Meteora DLMM" }
}

pub fn decode_lb_pair(address: &Pubkey, data: &[u8]) -> Result<DecodedDlmmPool> {
    if data.get(..8) != Some(&LB_PAIR_DISCRIMINATOR) {
        return Err(ArbError::PoolDecode(format!("{}: discriminateur LbPair invalide", address)).into());
    }
    let data_slice = &data[8..];
    let size = mem::size_of::<onchain_layouts::LbPairData>();
    if data_slice.len() < size {
        return Err(ArbError::PoolDecode(format!("{}: LbPair trop court ({} < {} octets)", address, data_slice.len(), size)).into());
    }
    let pool_struct: onchain_layouts::LbPairData = bytemuck::pod_read_unaligned(&data_slice[..size]);

    let base_fee_rate = math::get_base_fee(
        pool_struct.bin_step,
        pool_struct.parameters.base_factor,
        pool_struct.parameters.base_fee_power_factor,
    )
    .map_err(|e| ArbError::PoolDecode(format!("{}: {}", address, e)))?;

    Ok(DecodedDlmmPool {
        address: *address,
        token_x_mint: Pubkey::new_from_array(pool_struct.token_x_mint),
        token_y_mint: Pubkey::new_from_array(pool_struct.token_y_mint),
        reserve_x: Pubkey::new_from_array(pool_struct.reserve_x),
        reserve_y: Pubkey::new_from_array(pool_struct.reserve_y),
        oracle: Pubkey::new_from_array(pool_struct.oracle),
        active_id: pool_struct.active_id,
        bin_step: pool_struct.bin_step,
        status: pool_struct.status,
        pair_type: pool_struct.pair_type,
        base_fee_rate,
        protocol_share_bps: pool_struct.parameters.protocol_share,
        parameters: pool_struct.parameters,
        v_parameters: pool_struct.v_parameters,
        reserve_x_amount: 0,
        reserve_y_amount: 0,
    })
}

/// Récupère le LbPair puis les soldes de ses deux réserves, et ne renvoie
/// qu'un descripteur complet.
pub async fn fetch_pool(rpc: &dyn LedgerClient, address: &Pubkey) -> Result<DecodedDlmmPool> {
    let data = rpc
        .get_account_data(address)
        .await
        .with_context(|| format!("Lecture du LbPair {}", address))?;
    let mut pool = match data {
        Some(bytes) if !bytes.is_empty() => decode_lb_pair(address, &bytes)?,
        _ => return Err(ArbError::PoolNotFound(format!("LbPair Meteora {}", address)).into()),
    };

    let reserves = rpc
        .get_multiple_accounts_data(&[pool.reserve_x, pool.reserve_y])
        .await
        .with_context(|| format!("Lecture des réserves du LbPair {}", address))?;
    let amount = |i: usize| -> Result<u64> {
        let data = reserves
            .get(i)
            .and_then(|r| r.as_ref())
            .ok_or_else(|| ArbError::PoolNotFound(format!("réserve #{} du LbPair {}", i, address)))?;
        decode_token_amount(data)
    };
    pool.reserve_x_amount = amount(0)?;
    pool.reserve_y_amount = amount(1)?;
    Ok(pool)
}

/// Charge les BinArrays demandés en un seul appel. Les comptes absents ou
/// illisibles sont ignorés : le parcours s'arrêtera simplement au bord.
pub async fn fetch_bin_arrays(
    rpc: &dyn LedgerClient,
    pool: &DecodedDlmmPool,
    indices: &[i64],
) -> Result<BTreeMap<i64, DecodedBinArray>> {
    let addresses: Vec<Pubkey> = indices
        .iter()
        .map(|&index| get_bin_array_address(&pool.address, index, &PROGRAM_ID))
        .collect();
    let accounts = rpc
        .get_multiple_accounts_data(&addresses)
        .await
        .with_context(|| format!("Lecture des BinArrays du LbPair {}", pool.address))?;

    let mut arrays = BTreeMap::new();
    for (&index, account) in indices.iter().zip(accounts) {
        match account.map(|data| decode_bin_array(index, &data)) {
            Some(Ok(array)) => {
                arrays.insert(index, array);
            }
            Some(Err(e)) => debug!(index, error = %e, "[DLMM] BinArray illisible, ignoré."),
            None => debug!(index, "[DLMM] BinArray inexistant."),
        }
    }
    Ok(arrays)
}

// --- MISE À JOUR DES PARAMÈTRES DE VOLATILITÉ ---

fn update_references(
    v_params: &mut onchain_layouts::VariableParameters,
    s_params: &onchain_layouts::StaticParameters,
    active_id: i32,
    current_timestamp: i64,
) -> Result<()> {
    let elapsed = current_timestamp
        .checked_sub(v_params.last_update_timestamp)
        .ok_or_else(|| anyhow!("MathOverflow: timestamp diff"))?;
    if elapsed >= s_params.filter_period as i64 {
        v_params.index_reference = active_id;
        if elapsed < s_params.decay_period as i64 {
            v_params.volatility_reference = v_params
                .volatility_accumulator
                .checked_mul(s_params.reduction_factor as u32)
                .ok_or_else(|| anyhow!("MathOverflow"))?
                / 10_000;
        } else {
            v_params.volatility_reference = 0;
        }
    }
    Ok(())
}

fn update_volatility_accumulator(
    v_params: &mut onchain_layouts::VariableParameters,
    s_params: &onchain_layouts::StaticParameters,
    end_id: i32,
) -> Result<()> {
    // La distance parcourue DEPUIS LA RÉFÉRENCE, pas depuis le début du swap.
    let delta_id = (i64::from(v_params.index_reference) - i64::from(end_id)).unsigned_abs();
    let new_volatility_accumulator = u64::from(v_params.volatility_reference)
        .checked_add(delta_id.checked_mul(10_000).ok_or_else(|| anyhow!("MathOverflow: delta_id mul"))?)
        .ok_or_else(|| anyhow!("MathOverflow: volatility_accumulator add"))?;
    v_params.volatility_accumulator = new_volatility_accumulator.min(s_params.max_volatility_accumulator as u64) as u32;
    Ok(())
}

pub mod onchain_layouts {
    use super::*;

    #[repr(C)]
    #[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct StaticParameters {
        pub base_factor: u16,
        pub filter_period: u16,
        pub decay_period: u16,
        pub reduction_factor: u16,
        pub variable_fee_control: u32,
        pub max_volatility_accumulator: u32,
        pub min_bin_id: i32,
        pub max_bin_id: i32,
        pub protocol_share: u16,
        pub base_fee_power_factor: u8,
        pub padding: [u8; 5],
    }

    #[repr(C)]
    #[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct VariableParameters {
        pub volatility_accumulator: u32,
        pub volatility_reference: u32,
        pub index_reference: i32,
        pub padding: [u8; 4],
        pub last_update_timestamp: i64,
        pub padding1: [u8; 8],
    }

    #[repr(C, packed)]
    #[derive(Clone, Copy, Pod, Zeroable, Debug)]
    pub struct ProtocolFee {
        pub amount_x: u64,
        pub amount_y: u64,
    }

    #[repr(C, packed)]
    #[derive(Clone, Copy, Pod, Zeroable, Debug)]
    pub struct RewardInfo {
        pub mint: [u8; 32],
        pub vault: [u8; 32],
        pub funder: [u8; 32],
        pub reward_duration: u64,
        pub reward_duration_end: u64,
        pub reward_rate: u128,
        pub last_update_time: u64,
        pub cumulative_seconds_with_empty_liquidity_reward: u64,
    }

    #[repr(C)]
    #[derive(Clone, Copy, Pod, Zeroable, Debug)]
    pub struct LbPairData {
        pub parameters: StaticParameters,
        pub v_parameters: VariableParameters,
        pub bump_seed: [u8; 1],
        pub bin_step_seed: [u8; 2],
        pub pair_type: u8,
        pub active_id: i32,
        pub bin_step: u16,
        pub status: u8,
        pub require_base_factor_seed: u8,
        pub base_factor_seed: [u8; 2],
        pub activation_type: u8,
        pub creator_pool_on_off_control: u8,
        pub token_x_mint: [u8; 32],
        pub token_y_mint: [u8; 32],
        pub reserve_x: [u8; 32],
        pub reserve_y: [u8; 32],
        pub protocol_fee: ProtocolFee,
        pub padding1: [u8; 32],
        pub reward_infos: [RewardInfo; 2],
        pub oracle: [u8; 32],
        pub bin_array_bitmap: [u64; 16],
        pub last_updated_at: i64,
        pub padding2: [u8; 32],
        pub pre_activation_swap_address: [u8; 32],
        pub base_key: [u8; 32],
        pub activation_point: u64,
        pub pre_activation_duration: u64,
        pub padding3: [u8; 8],
        pub padding4: u64,
        pub creator: [u8; 32],
        pub token_mint_x_program_flag: u8,
        pub token_mint_y_program_flag: u8,
        pub reserved: [u8; 22],
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::decoders::spl_token_decoders::account::encode_token_account;
    use crate::rpc::memory::MemoryLedger;

    fn decoded_pool() -> (DecodedDlmmPool, Pubkey) {
        let address = Pubkey::new_unique();
        let raw = lb_pair_data(Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        (decode_lb_pair(&address, &encode_lb_pair(&raw)).unwrap(), address)
    }

    fn arrays_for(pool: &DecodedDlmmPool, x_per_bin: u64, y_per_bin: u64) -> BTreeMap<i64, DecodedBinArray> {
        uniform_bin_arrays(&pool.address, x_per_bin, y_per_bin)
            .into_iter()
            .map(|(i, data)| (i, decode_bin_array(i, &data).unwrap()))
            .collect()
    }

    #[test]
    fn lb_pair_layout_is_896_bytes() {
        assert_eq!(mem::size_of::<onchain_layouts::LbPairData>(), 896);
    }

    #[test]
    fn decode_lb_pair_reads_core_fields() {
        let (pool, address) = decoded_pool();
        assert_eq!(pool.address, address);
        assert_eq!(pool.active_id, ACTIVE_ID);
        assert_eq!(pool.bin_step, BIN_STEP);
        assert_eq!(pool.protocol_share_bps, 500);
        // base_factor 10_000 * bin_step 10 * 10 => 0.1%
        assert_eq!(pool.base_fee_rate, 1_000_000);
        assert!((pool.fee_as_percent() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn decode_lb_pair_rejects_short_data() {
        let mut data = LB_PAIR_DISCRIMINATOR.to_vec();
        data.extend_from_slice(&[0u8; 100]);
        let err = decode_lb_pair(&Pubkey::new_unique(), &data).unwrap_err();
        assert!(matches!(err.downcast_ref::<ArbError>(), Some(ArbError::PoolDecode(_))));
    }

    #[test]
    fn swap_indices_follow_direction() {
        let (pool, _) = decoded_pool();
        assert_eq!(pool.swap_bin_array_indices(true), vec![1, 0, -1]);
        assert_eq!(pool.swap_bin_array_indices(false), vec![1, 2, 3]);
        assert_eq!(pool.bin_array_indices_around_active(40), vec![0, 1, 2]);
    }

    #[test]
    fn widest_snapshot_range_fits_one_batched_read() {
        let (pool, _) = decoded_pool();
        let indices = pool.bin_array_indices_around_active(crate::config::MAX_DLMM_BIN_RANGE);
        assert!(indices.len() <= 100, "{} BinArrays", indices.len());
    }

    #[test]
    fn small_swap_stays_in_active_bin() {
        let (pool, _) = decoded_pool();
        let arrays = arrays_for(&pool, 1_000_000_000, 1_000_000_000);
        let out = pool.simulate_swap(&arrays, 1_000_000, true, 0).unwrap();
        assert_eq!(out.bins_crossed, 0);
        assert_eq!(out.end_bin_id, ACTIVE_ID);
        // Prix 1.0 au bin actif, frais 0.1% + variable
        assert!(out.amount_out <= 999_000 && out.amount_out > 990_000);
        assert!(out.fee >= 1_000);
        assert!(out.price_impact_pct < 0.01);
    }

    #[test]
    fn large_swap_walks_down_and_pays_impact() {
        let (pool, _) = decoded_pool();
        let arrays = arrays_for(&pool, 1_000_000, 1_000_000);
        let out = pool.simulate_swap(&arrays, 5_000_000, true, 0).unwrap();
        assert!(out.bins_crossed >= 4);
        assert!(out.end_bin_id < ACTIVE_ID);
        assert!(out.price_impact_pct > 0.0);
        assert!(out.amount_out < 5_000_000);
    }

    #[test]
    fn y_to_x_walks_up() {
        let (pool, _) = decoded_pool();
        let arrays = arrays_for(&pool, 1_000_000, 1_000_000);
        let out = pool.simulate_swap(&arrays, 3_000_000, false, 0).unwrap();
        assert!(out.end_bin_id > ACTIVE_ID);
    }

    #[test]
    fn exhausting_loaded_bins_is_insufficient_liquidity() {
        let (pool, _) = decoded_pool();
        let arrays = arrays_for(&pool, 10, 10);
        let err = pool.simulate_swap(&arrays, 1_000_000_000, true, 0).unwrap_err();
        assert!(err.to_string().contains("insufficient liquidity"));
    }

    #[test]
    fn snapshot_uses_relative_price_formula() {
        let (pool, _) = decoded_pool();
        let arrays = arrays_for(&pool, 5, 7);
        let snapshot = pool.bins_around_active(&arrays, 1);
        assert_eq!(snapshot.bins.len(), 3);
        assert_eq!(snapshot.bins[0].bin_id, 99);
        assert!((snapshot.bins[0].price - 0.999_000_999_000_999).abs() < 1e-12);
        assert!((snapshot.bins[1].price - 1.0).abs() < f64::EPSILON);
        assert!((snapshot.bins[2].price - 1.001).abs() < 1e-12);
        assert_eq!(snapshot.bins[1].amount_x, 5);
        assert_eq!(snapshot.bins[1].amount_y, 7);
    }

    #[tokio::test]
    async fn fetch_pool_hydrates_reserves() {
        let ledger = MemoryLedger::new();
        let (rx, ry) = (Pubkey::new_unique(), Pubkey::new_unique());
        let address = Pubkey::new_unique();
        ledger.set_account(address, encode_lb_pair(&lb_pair_data(Pubkey::new_unique(), Pubkey::new_unique(), rx, ry)));
        ledger.set_account(rx, encode_token_account(11));
        ledger.set_account(ry, encode_token_account(22));

        let pool = fetch_pool(&ledger, &address).await.unwrap();
        assert_eq!((pool.reserve_x_amount, pool.reserve_y_amount), (11, 22));
    }

    #[tokio::test]
    async fn fetch_bin_arrays_skips_missing_accounts() {
        let ledger = MemoryLedger::new();
        let (pool, _) = decoded_pool();
        for (index, data) in uniform_bin_arrays(&pool.address, 1, 1) {
            if index != 2 {
                ledger.set_account(get_bin_array_address(&pool.address, index, &PROGRAM_ID), data);
            }
        }
        let arrays = fetch_bin_arrays(&ledger, &pool, &[0, 1, 2]).await.unwrap();
        assert_eq!(arrays.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
    }
}
