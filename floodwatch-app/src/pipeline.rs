//! The sequential collection pipeline: each run is one loop over its
//! configured accounts, normalized and written out as a CSV corpus.

use crate::export;
use anyhow::{Context, Result};
use clap::ValueEnum;
use floodwatch_config::{FloodwatchConfig, HistoricalRun, TimelineRun};
use floodwatch_social::{normalize, TweetRecord, TwitterApi};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunKind {
    /// Flood-period posts from the Harvey window.
    Harvey,
    /// Recent labeled traffic corpus.
    Traffic,
    /// Recent labeled non-traffic corpus.
    NonTraffic,
}

/// Run the configured collection runs (all of them unless `only` narrows
/// it), sequentially, writing one CSV per run.
pub async fn run_collect(
    api: &TwitterApi,
    cfg: &FloodwatchConfig,
    only: Option<RunKind>,
) -> Result<()> {
    std::fs::create_dir_all(&cfg.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            cfg.output_dir.display()
        )
    })?;
    let wants = |kind| only.is_none_or(|o| o == kind);

    if wants(RunKind::Harvey) {
        historical(api, &cfg.collect.harvey, &cfg.output_dir).await?;
    }
    if wants(RunKind::NonTraffic) {
        timelines(api, &cfg.collect.non_traffic, &cfg.output_dir).await?;
    }
    if wants(RunKind::Traffic) {
        historical(api, &cfg.collect.traffic, &cfg.output_dir).await?;
    }
    Ok(())
}

/// One date-windowed pull from a single account.
async fn historical(api: &TwitterApi, run: &HistoricalRun, out_dir: &Path) -> Result<()> {
    let (since, until) = run.window()?;
    tracing::info!(account = %run.account, %since, %until, "collect.historical.start");

    let raw = api
        .historical_search(&run.account, since, until, run.max_tweets)
        .await?;
    let records: Vec<TweetRecord> = raw.iter().map(normalize).collect();

    export::write_corpus(&out_dir.join(&run.output), &records, run.tag.as_deref())
}

/// Recent timelines over the configured account list, concatenated in
/// configuration order.
async fn timelines(api: &TwitterApi, run: &TimelineRun, out_dir: &Path) -> Result<()> {
    let mut parts: Vec<Vec<TweetRecord>> = Vec::with_capacity(run.accounts.len());
    for handle in &run.accounts {
        let posts = api.user_timeline(handle, run.per_account).await?;
        tracing::info!(handle, got = posts.len(), "collect.timeline");
        parts.push(posts.iter().map(normalize).collect());
    }

    let merged = export::concat(parts);
    export::write_corpus(&out_dir.join(&run.output), &merged, run.tag.as_deref())
}
