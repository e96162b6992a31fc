// DANS: src/decoders/pump/amm/pool.rs

use crate::decoders::pool_operations::PoolOperations;
use crate::decoders::spl_token_decoders::account::decode_token_amount;
use crate::error::ArbError;
use crate::rpc::LedgerClient;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, warn};

// --- CONSTANTES DU PROTOCOLE ---
// Trouvées dans l'IDL
pub const PUMP_PROGRAM_ID: Pubkey = solana_sdk::pubkey!("pAMMBay6oceH9fJKBRHGP5D4bD4sWpmSwMn52FMfXEA");
pub const POOL_ACCOUNT_DISCRIMINATOR: [u8; 8] = [241, 154, 109, 4, 17, 177, 109, 188];
const GLOBAL_CONFIG_ACCOUNT_DISCRIMINATOR: [u8; 8] = [149, 8, 156, 202, 160, 252, 176, 217];

/// Taille du record Pool après le discriminateur :
/// bump (1) + index (2) + 7 clés (creator, 3 mints, 2 vaults, coin_creator) + lp_supply (8).
pub const POOL_RECORD_LEN: usize = 1 + 2 + 7 * 32 + 8;

// Frais appliqués si le GlobalConfig est illisible (valeurs publiées par pump.fun).
pub const DEFAULT_LP_FEE_BPS: u64 = 20;
pub const DEFAULT_PROTOCOL_FEE_BPS: u64 = 5;
pub const DEFAULT_COIN_CREATOR_FEE_BPS: u64 = 5;


// --- STRUCTURE DE SORTIE "PROPRE" ---
// Descripteur immuable, mis en cache tel quel. Les réserves vivent à part
// (`PumpReserves`) et sont relues à chaque quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedPumpAmmPool {
    pub address: Pubkey,
    pub pool_bump: u8,
    pub index: u16,
    pub creator: Pubkey,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub lp_mint: Pubkey,
    pub pool_base_token_account: Pubkey,
    pub pool_quote_token_account: Pubkey,
    pub lp_supply: u64,
    pub coin_creator: Pubkey,
}

/// Frais du protocole, lus depuis le compte GlobalConfig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalFees {
    pub lp_fee_basis_points: u64,
    pub protocol_fee_basis_points: u64,
    pub coin_creator_fee_basis_points: u64,
}

impl Default for GlobalFees {
    fn default() -> Self {
        Self {
            lp_fee_basis_points: DEFAULT_LP_FEE_BPS,
            protocol_fee_basis_points: DEFAULT_PROTOCOL_FEE_BPS,
            coin_creator_fee_basis_points: DEFAULT_COIN_CREATOR_FEE_BPS,
        }
    }
}

impl GlobalFees {
    pub fn total_fee_basis_points(&self) -> u64 {
        self.lp_fee_basis_points
            .saturating_add(self.protocol_fee_basis_points)
            .saturating_add(self.coin_creator_fee_basis_points)
    }
}

/// Photo des réserves du pool au moment d'une quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PumpReserves {
    pub base_reserve: u64,
    pub quote_reserve: u64,
    pub fees: GlobalFees,
}


// --- MODULE POUR LES STRUCTURES ON-CHAIN ---
pub mod onchain_layouts {
    use borsh::{BorshDeserialize, BorshSerialize};
    use bytemuck::{Pod, Zeroable};

    /// Miroir exact du compte Pool (sans le discriminateur).
    #[derive(BorshDeserialize, BorshSerialize, Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PoolRecord {
        pub pool_bump: u8,
        pub index: u16,
        pub creator: [u8; 32],
        pub base_mint: [u8; 32],
        pub quote_mint: [u8; 32],
        pub lp_mint: [u8; 32],
        pub pool_base_token_account: [u8; 32],
        pub pool_quote_token_account: [u8; 32],
        pub lp_supply: u64,
        pub coin_creator: [u8; 32],
    }

    #[repr(C, packed)]
    #[derive(Clone, Copy, Pod, Zeroable, Debug)]
    pub struct GlobalConfig {
        pub admin: [u8; 32],
        pub lp_fee_basis_points: u64,
        pub protocol_fee_basis_points: u64,
        pub disable_flags: u8,
        pub protocol_fee_recipients: [[u8; 32]; 8],
        pub coin_creator_fee_basis_points: u64,
        pub admin_set_coin_creator_authority: [u8; 32],
    }
}

use onchain_layouts::PoolRecord;

impl DecodedPumpAmmPool {
    fn from_record(address: &Pubkey, record: &PoolRecord) -> Self {
        Self {
            address: *address,
            pool_bump: record.pool_bump,
            index: record.index,
            creator: Pubkey::new_from_array(record.creator),
            base_mint: Pubkey::new_from_array(record.base_mint),
            quote_mint: Pubkey::new_from_array(record.quote_mint),
            lp_mint: Pubkey::new_from_array(record.lp_mint),
            pool_base_token_account: Pubkey::new_from_array(record.pool_base_token_account),
            pool_quote_token_account: Pubkey::new_from_array(record.pool_quote_token_account),
            lp_supply: record.lp_supply,
            coin_creator: Pubkey::new_from_array(record.coin_creator),
        }
    }
}

/// Décodage par schéma (borsh). Les octets au-delà du record sont ignorés.
pub fn decode_record_with_schema(record_bytes: &[u8]) -> Result<PoolRecord> {
    let mut reader = record_bytes;
    let record = <PoolRecord as borsh::BorshDeserialize>::deserialize(&mut reader)
        .map_err(|e| anyhow!("borsh: {}", e))?;
    Ok(record)
}

/// Lecteur d'octets à offsets fixes, little-endian.
struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let end = self.offset + N;
        let slice = self.data.get(self.offset..end).ok_or_else(|| {
            anyhow!("record tronqué: besoin de {} octets à l'offset {}, {} disponibles", N, self.offset, self.data.len())
        })?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        self.offset = end;
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take::<1>()?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.take::<2>()?))
    }

    fn u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.take::<8>()?))
    }

    fn key(&mut self) -> Result<[u8; 32]> {
        self.take::<32>()
    }
}

/// Décodage manuel, champ par champ. Doit rester identique au chemin borsh :
/// même ordre, mêmes largeurs, little-endian.
pub fn decode_record_manual(record_bytes: &[u8]) -> Result<PoolRecord> {
    let mut r = ByteReader::new(record_bytes);
    Ok(PoolRecord {
        pool_bump: r.u8()?,
        index: r.u16()?,
        creator: r.key()?,
        base_mint: r.key()?,
        quote_mint: r.key()?,
        lp_mint: r.key()?,
        pool_base_token_account: r.key()?,
        pool_quote_token_account: r.key()?,
        lp_supply: r.u64()?,
        coin_creator: r.key()?,
    })
}

/// Décode les données brutes d'un compte Pool pump.fun (discriminateur inclus).
pub fn decode_pool(address: &Pubkey, data: &[u8]) -> Result<DecodedPumpAmmPool> {
    if data.get(..8) != Some(&POOL_ACCOUNT_DISCRIMINATOR) {
        return Err(ArbError::PoolDecode(format!("{}: discriminateur invalide, pas un compte Pool pump.fun", address)).into());
    }
    let record_bytes = &data[8..];

    let record = match decode_record_with_schema(record_bytes) {
        Ok(record) => record,
        Err(schema_err) => {
            warn!(pool = %address, error = %schema_err, "[PumpAmm] Décodage borsh impossible, bascule sur le décodage manuel.");
            decode_record_manual(record_bytes).map_err(|manual_err| {
                ArbError::PoolDecode(format!("{}: schéma ({}) puis manuel ({})", address, schema_err, manual_err))
            })?
        }
    };

    Ok(DecodedPumpAmmPool::from_record(address, &record))
}

/// Lit les frais dans les données du compte GlobalConfig (discriminateur inclus).
pub fn decode_global_fees(data: &[u8]) -> Result<GlobalFees> {
    if data.get(..8) != Some(&GLOBAL_CONFIG_ACCOUNT_DISCRIMINATOR) {
        return Err(anyhow!("Invalid discriminator for pump.fun GlobalConfig account"));
    }
    let config_data_slice = &data[8..];
    let size = std::mem::size_of::<onchain_layouts::GlobalConfig>();
    if config_data_slice.len() < size {
        return Err(anyhow!("pump.fun GlobalConfig data length mismatch: {} < {}", config_data_slice.len(), size));
    }
    let config: onchain_layouts::GlobalConfig = bytemuck::pod_read_unaligned(&config_data_slice[..size]);
    Ok(GlobalFees {
        lp_fee_basis_points: config.lp_fee_basis_points,
        protocol_fee_basis_points: config.protocol_fee_basis_points,
        coin_creator_fee_basis_points: config.coin_creator_fee_basis_points,
    })
}

pub fn global_config_address() -> Pubkey {
    Pubkey::find_program_address(&[b"global_config"], &PUMP_PROGRAM_ID).0
}

/// Récupère et décode le compte du pool.
pub async fn fetch_pool(rpc: &dyn LedgerClient, address: &Pubkey) -> Result<DecodedPumpAmmPool> {
    let data = rpc
        .get_account_data(address)
        .await
        .with_context(|| format!("Lecture du pool pump.fun {}", address))?;
    match data {
        Some(bytes) if !bytes.is_empty() => decode_pool(address, &bytes),
        _ => Err(ArbError::PoolNotFound(format!("pool pump.fun {}", address)).into()),
    }
}

/// Lit les soldes des deux vaults et les frais globaux en un seul appel groupé.
pub async fn fetch_reserves(rpc: &dyn LedgerClient, pool: &DecodedPumpAmmPool) -> Result<PumpReserves> {
    let keys = [pool.pool_base_token_account, pool.pool_quote_token_account, global_config_address()];
    let accounts = rpc
        .get_multiple_accounts_data(&keys)
        .await
        .with_context(|| format!("Lecture des vaults du pool pump.fun {}", pool.address))?;

    let vault = |i: usize, label: &str| -> Result<u64> {
        let data = accounts
            .get(i)
            .and_then(|a| a.as_ref())
            .ok_or_else(|| ArbError::PoolNotFound(format!("vault {} du pool pump.fun {}", label, pool.address)))?;
        decode_token_amount(data)
    };
    let base_reserve = vault(0, "base")?;
    let quote_reserve = vault(1, "quote")?;

    let fees = match accounts.get(2).and_then(|a| a.as_ref()).map(|d| decode_global_fees(d)) {
        Some(Ok(fees)) => fees,
        Some(Err(e)) => {
            debug!(error = %e, "[PumpAmm] GlobalConfig illisible, frais par défaut.");
            GlobalFees::default()
        }
        None => GlobalFees::default(),
    };

    Ok(PumpReserves { base_reserve, quote_reserve, fees })
}

impl PoolOperations for DecodedPumpAmmPool {
    fn address(&self) -> Pubkey { self.address }

    fn get_mints(&self) -> (Pubkey, Pubkey) {
        (self.base_mint, self.quote_mint)
    }

    fn get_vaults(&self) -> (Pubkey, Pubkey) {
        (self.pool_base_token_account, self.pool_quote_token_account)
    }

    fn venue_name(&self) -> &'static str { "PumpSwap" }
}

/// Sérialise un record complet (discriminateur inclus). Sert aux tests.
#[cfg(test)]
pub(crate) fn encode_pool_account(record: &PoolRecord) -> Vec<u8> {
    let mut data = POOL_ACCOUNT_DISCRIMINATOR.to_vec();
    data.extend(borsh::to_vec(record).unwrap());
    data
}

#[cfg(test)]
pub(crate) fn encode_global_config(fees: &GlobalFees) -> Vec<u8> {
    let mut data = GLOBAL_CONFIG_ACCOUNT_DISCRIMINATOR.to_vec();
    data.extend_from_slice(&[7u8; 32]);
    data.extend_from_slice(&fees.lp_fee_basis_points.to_le_bytes());
    data.extend_from_slice(&fees.protocol_fee_basis_points.to_le_bytes());
    data.push(0);
    data.extend_from_slice(&[9u8; 32 * 8]);
    data.extend_from_slice(&fees.coin_creator_fee_basis_points.to_le_bytes());
    data.extend_from_slice(&[0u8; 32]);
    data
}

#[cfg(test)]
pub(crate) fn sample_record(base_mint: Pubkey, quote_mint: Pubkey, base_vault: Pubkey, quote_vault: Pubkey) -> PoolRecord {
    PoolRecord {
        pool_bump: 254,
        index: 0,
        creator: [3u8; 32],
        base_mint: base_mint.to_bytes(),
        quote_mint: quote_mint.to_bytes(),
        lp_mint: [4u8; 32],
        pool_base_token_account: base_vault.to_bytes(),
        pool_quote_token_account: quote_vault.to_bytes(),
        lp_supply: 4_193_388_976_385,
        coin_creator: [5u8; 32],
    }
}
