// DANS : src/error.rs

use thiserror::Error;

/// Taxonomie des erreurs du moteur de détection.
///
/// Les fonctions de la librairie retournent des `anyhow::Result`. Ces variantes
/// sont levées aux endroits où l'appelant doit pouvoir les distinguer
/// (via `downcast_ref`), par exemple la boucle de scan qui doit savoir si
/// une erreur vient du réseau.
#[derive(Debug, Clone, Error)]
pub enum ArbError {
    /// Variable d'environnement absente ou invalide. Fatal au démarrage.
    #[error("Configuration Error: {0}")]
    Configuration(String),

    /// Le nœud RPC est injoignable.
    #[error("Connection Error: {0}")]
    Connection(String),

    /// Le compte du pool n'existe pas ou ne contient aucune donnée.
    #[error("Pool not found: {0}")]
    PoolNotFound(String),

    /// Les données du compte du pool ne correspondent pas au layout attendu.
    #[error("Pool decode error: {0}")]
    PoolDecode(String),

    /// Le calcul de quote a échoué (liquidité insuffisante, pool vide...).
    #[error("Quote Error ({venue}): {reason}")]
    Quote { venue: String, reason: String },

    /// Lecture des décimales impossible. Jamais propagée hors du résolveur.
    #[error("Decimals fetch error for {mint}: {reason}")]
    DecimalsFetch { mint: String, reason: String },

    /// Clé du portefeuille présente mais illisible.
    #[error("Wallet Error: {0}")]
    Wallet(String),
}

impl ArbError {
    pub fn quote(venue: impl Into<String>, reason: impl Into<String>) -> Self {
        ArbError::Quote { venue: venue.into(), reason: reason.into() }
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, ArbError::Connection(_))
    }
}

// Comparés mot à mot : une adresse base58 ne forme qu'un seul mot et ne peut
// donc pas déclencher un faux positif.
const CONNECTIVITY_WORDS: [&str; 5] = ["dns", "timeout", "502", "503", "network"];
const CONNECTIVITY_PHRASES: [&str; 3] = ["timed out", "connection reset", "broken pipe"];

/// Détermine si une erreur (quelle que soit sa profondeur dans la chaîne de contexte)
/// signale un problème de connectivité avec le RPC.
///
/// Une `ArbError` dans la chaîne fait foi. Sinon, chaque cause est examinée
/// séparément avec l'heuristique sur le message.
pub fn is_connectivity_error(error: &anyhow::Error) -> bool {
    if let Some(typed) = error.chain().find_map(|cause| cause.downcast_ref::<ArbError>()) {
        return typed.is_connectivity();
    }
    error.chain().any(|cause| is_connectivity_message(&cause.to_string()))
}

pub fn is_connectivity_message(message: &str) -> bool {
    let lowered = message.to_lowercase();
    if CONNECTIVITY_PHRASES.iter().any(|phrase| lowered.contains(phrase)) {
        return true;
    }
    lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| word.starts_with("connect") || CONNECTIVITY_WORDS.contains(&word))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};

    #[test]
    fn typed_connection_error_is_detected_through_context() {
        let err: anyhow::Error = anyhow::Error::new(ArbError::Connection("rpc down".into()))
            .context("get_account_data")
            .context("cycle failed");
        assert!(is_connectivity_error(&err));
    }

    #[test]
    fn message_heuristic_matches_common_transport_failures() {
        assert!(is_connectivity_error(&anyhow!("error sending request: operation timed out")));
        assert!(is_connectivity_error(&anyhow!("HTTP status server error (503 Service Unavailable)")));
        assert!(is_connectivity_message("tcp connect error: Connection refused"));
    }

    #[test]
    fn quote_and_decode_errors_are_not_connectivity() {
        let err = Err::<(), _>(ArbError::quote("PumpSwap", "pool has no liquidity"))
            .context("direction PumpToDlmm")
            .unwrap_err();
        assert!(!is_connectivity_error(&err));
        assert!(!is_connectivity_error(&anyhow::Error::new(ArbError::PoolDecode("bad discriminator".into()))));
    }

    #[test]
    fn addresses_in_context_do_not_look_like_network_failures() {
        // Adresse base58 contenant "DNs".
        let pool = "11EDNs2ZtWq5936HkY7mJ9rXv4cT8pLbGfQa1uNwKde";
        let err = Err::<(), _>(ArbError::quote("Meteora DLMM", "insufficient liquidity"))
            .with_context(|| format!("Lecture du pool {}", pool))
            .unwrap_err();
        assert!(!is_connectivity_error(&err));

        let plain = anyhow!("bin array manquant").context(format!("pool {}", pool));
        assert!(!is_connectivity_error(&plain));
        assert!(!is_connectivity_message(pool));
    }

    #[test]
    fn untyped_transport_cause_under_context_is_detected() {
        let err = anyhow!("tcp connect error: Connection refused (os error 111)").context("get_multiple_accounts");
        assert!(is_connectivity_error(&err));
        assert!(is_connectivity_message("dns error: failed to lookup address"));
        assert!(is_connectivity_message("request timeout"));
    }
}
