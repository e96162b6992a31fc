// DANS : src/engine/scanner.rs

use super::ServiceContext;
use crate::decoders::meteora::dlmm::{BinSnapshot, DecodedDlmmPool};
use crate::decoders::pump::amm::DecodedPumpAmmPool;
use crate::error::is_connectivity_error;
use crate::execution::{maybe_execute, ExecutionDecision};
use crate::strategies::{CycleReport, SpreadReport};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::sleep;
use tracing::{error, info};

/// Un cycle de détection : les deux sens, sélection, porte d'exécution.
/// Les échecs sont contenus dans le rapport, jamais propagés.
pub async fn scan_once(ctx: &ServiceContext) -> (CycleReport, Option<ExecutionDecision>) {
    let report = ctx.evaluator.evaluate_cycle(ctx.config.trade_size).await;

    for opportunity in &report.opportunities {
        info!(
            direction = %opportunity.direction,
            input = opportunity.input_amount,
            output = opportunity.output_amount,
            profit = opportunity.profit,
            profit_pct = %format!("{:.4}", opportunity.profit_pct),
            "[Scan] Résultat."
        );
    }

    let decision = report
        .best
        .as_ref()
        .map(|best| maybe_execute(best, ctx.config.dry_run, ctx.wallet.as_ref()));
    (report, decision)
}

/// Boucle de détection continue. `max_cycles = None` tourne indéfiniment.
pub async fn run_scan(ctx: &ServiceContext, max_cycles: Option<u64>) -> Result<()> {
    info!(
        trade_size = ctx.config.trade_size,
        min_profit_pct = ctx.config.min_profit_pct,
        delay_ms = ctx.config.process_delay.as_millis() as u64,
        "[Scan] Démarrage de la boucle de détection."
    );
    let mut cycle: u64 = 0;
    loop {
        cycle += 1;
        let (report, _) = scan_once(ctx).await;
        if report.best.is_none() {
            info!(cycle, failures = report.failures.len(), "[Scan] Aucune opportunité au-dessus du seuil.");
        }
        if report.has_connectivity_failure() {
            ctx.recover_connection().await;
        }
        if max_cycles.is_some_and(|max| cycle >= max) {
            return Ok(());
        }
        sleep(ctx.config.process_delay).await;
    }
}

/// Surveillance de l'écart de prix unitaire, sans seuil de profit.
pub async fn run_monitor(ctx: &ServiceContext, max_cycles: Option<u64>) -> Result<()> {
    info!("[Monitor] Démarrage de la surveillance de l'écart de prix.");
    let mut cycle: u64 = 0;
    loop {
        cycle += 1;
        match ctx.evaluator.price_spread().await {
            Ok(spread) => info!(
                pump_price = spread.pump_price,
                dlmm_price = spread.dlmm_price,
                spread_pct = %format!("{:.4}", spread.spread_pct),
                cheaper = %spread.cheaper_venue,
                "[Monitor] Écart de prix."
            ),
            Err(e) => {
                error!(error = %format!("{:#}", e), "[Monitor] Échec du calcul de l'écart.");
                if is_connectivity_error(&e) {
                    ctx.recover_connection().await;
                }
            }
        }
        if max_cycles.is_some_and(|max| cycle >= max) {
            return Ok(());
        }
        sleep(ctx.config.process_delay).await;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub trade_size: f64,
    pub min_profit_pct: f64,
    pub pump_pool: DecodedPumpAmmPool,
    pub dlmm_pool: DecodedDlmmPool,
    pub cycle: CycleReport,
    pub spread: Option<SpreadReport>,
    pub spread_error: Option<String>,
    pub bins: BinSnapshot,
}

/// Analyse ponctuelle : pools, un cycle complet, l'écart et les bins autour du bin actif.
/// Un pool introuvable est fatal ici.
pub async fn run_analysis(ctx: &ServiceContext) -> Result<AnalysisReport> {
    let (pump_pool, dlmm_pool) = tokio::try_join!(ctx.pump.fetch_pool(), ctx.dlmm.fetch_pool())?;
    let (cycle, _) = scan_once(ctx).await;
    let (spread, spread_error) = match ctx.evaluator.price_spread().await {
        Ok(spread) => (Some(spread), None),
        Err(e) => (None, Some(format!("{:#}", e))),
    };
    let bins = ctx.dlmm.get_bins_around_active(ctx.config.dlmm_bin_range).await?;

    Ok(AnalysisReport {
        generated_at: Utc::now(),
        trade_size: ctx.config.trade_size,
        min_profit_pct: ctx.config.min_profit_pct,
        pump_pool: (*pump_pool).clone(),
        dlmm_pool: (*dlmm_pool).clone(),
        cycle,
        spread,
        spread_error,
        bins,
    })
}
