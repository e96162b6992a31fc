// DANS : src/wallet.rs

use crate::error::ArbError;
use anyhow::Result;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use std::fs;
use tracing::{info, warn};

/// Charge le portefeuille : `KEYPAIR_PATH` (tableau JSON de 64 octets) d'abord,
/// puis `PRIVATE_KEY` (base58) si le fichier est absent ou illisible.
///
/// Aucune des deux : `Ok(None)`, le scanner tourne en lecture seule.
/// Erreur seulement si toutes les clés fournies sont illisibles.
pub fn load_wallet(keypair_path: Option<&str>, private_key: Option<&str>) -> Result<Option<Keypair>> {
    let keypair = match (keypair_path, private_key) {
        (None, None) => {
            warn!("[Wallet] Ni KEYPAIR_PATH ni PRIVATE_KEY : mode surveillance uniquement.");
            return Ok(None);
        }
        (Some(path), None) => keypair_from_file(path)?,
        (None, Some(encoded)) => keypair_from_base58(encoded)?,
        (Some(path), Some(encoded)) => match keypair_from_file(path) {
            Ok(keypair) => keypair,
            Err(file_err) => {
                warn!(path = %path, error = %file_err, "[Wallet] KEYPAIR_PATH illisible, on essaie PRIVATE_KEY.");
                keypair_from_base58(encoded).map_err(|key_err| {
                    ArbError::Wallet(format!("KEYPAIR_PATH ({}) puis PRIVATE_KEY ({})", file_err, key_err))
                })?
            }
        },
    };
    info!(pubkey = %keypair.pubkey(), "[Wallet] Portefeuille chargé.");
    Ok(Some(keypair))
}

fn keypair_from_file(path: &str) -> Result<Keypair> {
    let data = fs::read_to_string(path).map_err(|e| ArbError::Wallet(format!("lecture de {} impossible: {}", path, e)))?;
    let bytes: Vec<u8> = serde_json::from_str(&data)
        .map_err(|e| ArbError::Wallet(format!("{} n'est pas un tableau JSON d'octets: {}", path, e)))?;
    keypair_from_bytes(&bytes)
}

fn keypair_from_base58(encoded: &str) -> Result<Keypair> {
    let bytes = bs58::decode(encoded.trim())
        .into_vec()
        .map_err(|e| ArbError::Wallet(format!("PRIVATE_KEY n'est pas du base58 valide: {}", e)))?;
    keypair_from_bytes(&bytes)
}

fn keypair_from_bytes(bytes: &[u8]) -> Result<Keypair> {
    if bytes.len() != 64 {
        return Err(ArbError::Wallet(format!("clé secrète de {} octets, 64 attendus", bytes.len())).into());
    }
    Keypair::try_from(bytes).map_err(|e| ArbError::Wallet(format!("clé secrète invalide: {}", e)).into())
}
