use anyhow::{bail, Result};

// Layout d'un compte de jeton SPL : mint (32) | owner (32) | amount (u64 LE) | ...
const AMOUNT_OFFSET: usize = 64;
const AMOUNT_END: usize = AMOUNT_OFFSET + 8;

/// Lit le solde (`amount`) d'un compte de jeton SPL ou Token-2022.
pub fn decode_token_amount(data: &[u8]) -> Result<u64> {
    if data.len() < AMOUNT_END {
        bail!("Token account data too short ({} bytes)", data.len());
    }
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[AMOUNT_OFFSET..AMOUNT_END]);
    Ok(u64::from_le_bytes(bytes))
}

/// Construit les données minimales d'un compte de jeton (tests uniquement).
#[cfg(test)]
pub(crate) fn encode_token_account(amount: u64) -> Vec<u8> {
    let mut data = vec![0u8; 165];
    data[AMOUNT_OFFSET..AMOUNT_END].copy_from_slice(&amount.to_le_bytes());
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_amount_at_offset_64() {
        let data = encode_token_account(1_234_567_890);
        assert_eq!(decode_token_amount(&data).unwrap(), 1_234_567_890);
    }

    #[test]
    fn short_data_is_rejected() {
        assert!(decode_token_amount(&[0u8; 70]).is_err());
    }
}
