// DANS : src/execution/mod.rs

// Porte d'exécution. Aucun envoi de transaction n'existe dans ce scanner :
// la fonction journalise l'opportunité et refuse toujours.

use crate::strategies::ArbitrageOpportunity;
use serde::Serialize;
use solana_sdk::signature::Keypair;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExecutionDecision {
    /// `DRY_RUN=true` : rien n'est tenté.
    DryRun,
    /// Pas de portefeuille chargé.
    NoWallet,
    /// L'exécution n'est pas implémentée.
    NotImplemented,
}

pub fn maybe_execute(opportunity: &ArbitrageOpportunity, dry_run: bool, wallet: Option<&Keypair>) -> ExecutionDecision {
    let decision = if dry_run {
        ExecutionDecision::DryRun
    } else if wallet.is_none() {
        ExecutionDecision::NoWallet
    } else {
        ExecutionDecision::NotImplemented
    };

    match decision {
        ExecutionDecision::DryRun => info!(
            direction = %opportunity.direction,
            profit_pct = opportunity.profit_pct,
            "[Execution] DRY_RUN actif, opportunité non exécutée."
        ),
        ExecutionDecision::NoWallet => warn!(
            direction = %opportunity.direction,
            "[Execution] Aucun portefeuille chargé, opportunité ignorée."
        ),
        ExecutionDecision::NotImplemented => warn!(
            direction = %opportunity.direction,
            profit = opportunity.profit,
            "[Execution] Exécution non implémentée, opportunité ignorée."
        ),
    }
    decision
}
