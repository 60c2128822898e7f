//! Wires configuration, the data store, the engine and the optional
//! advisory model into one weekly run.

use anyhow::Result;
use tracing::{info, warn};

use crate::advisor::client::{AdvisorClient, AdvisorParams};
use crate::advisor::http::SidecarAdvisor;
use crate::advisor::prompt::{build_prompt, SYSTEM_PROMPT};
use crate::config::{load_base, AppConfig};
use crate::data::{CsvStore, HistoryProvider};
use crate::engine::Optimizer;
use crate::execution::executor::total_budget;

pub async fn bootstrap() -> Result<()> {
    let cfg = load_base().unwrap_or_else(|err| {
        warn!(%err, "falling back to default configuration");
        AppConfig::default()
    });

    let store = CsvStore::new(&cfg.data.dir);
    run_cycle(&cfg, &store).await
}

/// One full weekly cycle over the given provider.
pub async fn run_cycle(cfg: &AppConfig, store: &CsvStore) -> Result<()> {
    let optimizer = Optimizer::new(cfg.policy.clone());

    let week = store
        .latest_week()?
        .ok_or(crate::error::EngineError::NoHistory)?;
    let state = optimizer.enrich(store, week)?;
    let mut decisions = optimizer.recommend(&state);

    if cfg.advisor.enabled {
        let advisor = SidecarAdvisor::new(cfg.advisor.url.clone());
        let prompt = build_prompt(&state.portfolio, &state.campaigns, &state.ad_groups, &state.audiences)?;
        let params = AdvisorParams::from(&cfg.advisor);
        match advisor.generate(SYSTEM_PROMPT, &prompt, &params).await {
            Ok(raw) => match crate::advisor::parse_decisions(&raw) {
                Ok(overlay) => decisions = optimizer.merge_with_advisor(&state, decisions, overlay),
                Err(err) => warn!(%err, "advisor reply unusable, keeping deterministic decisions"),
            },
            Err(err) => warn!(%err, "advisor unreachable, keeping deterministic decisions"),
        }
    }

    let (adjusted, next_week) = optimizer.apply(&state, &decisions);

    info!(
        week,
        budget_before = total_budget(&state.campaigns.iter().map(|c| c.row.clone()).collect::<Vec<_>>()),
        budget_after = total_budget(&adjusted.campaigns),
        "weekly adjustments applied"
    );

    let report = serde_json::json!({
        "week": week,
        "portfolio": state.portfolio,
        "decisions": decisions,
        "budget_adjustments": adjusted.budget_adjustments,
        "bid_adjustments": adjusted.bid_adjustments,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    if cfg.data.commit_next_week {
        store.append_week("campaigns.csv", &next_week.campaigns)?;
        store.append_week("ad_groups.csv", &next_week.ad_groups)?;
        store.append_week("audiences.csv", &next_week.audiences)?;
        info!(week = next_week.week, "next-week baseline committed");
    }

    Ok(())
}
