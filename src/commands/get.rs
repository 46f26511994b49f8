use anyhow::{anyhow, Error, Result};
use humansize::{format_size, DECIMAL};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{info, info_span, warn, Instrument};

use crate::archive::{image, page};
use crate::models::DownloadPlan;

pub const WAIT_PERIOD: Duration = Duration::from_secs(5);
pub const MIN_WAIT: Duration = Duration::from_secs(1);
const INITIAL_BACKOFF: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Pause between plans, shared archive server courtesy.
    pub wait: Duration,
    /// Extra attempts for page and image requests. Missing maps are never retried.
    pub retries: u32,
    pub initial_backoff: Duration,
}

impl DownloadOptions {
    /// Options for a run against the archive. The wait between plans may not drop below `MIN_WAIT`.
    pub fn new(wait: Duration, retries: u32) -> Result<Self> {
        if wait < MIN_WAIT {
            return Err(anyhow!(
                "wait between downloads must be at least {}s, got {}s",
                MIN_WAIT.as_secs(),
                wait.as_secs_f64()
            ));
        }
        Ok(DownloadOptions {
            wait,
            retries,
            ..DownloadOptions::default()
        })
    }
}

impl Default for DownloadOptions {
    fn default() -> Self {
        DownloadOptions {
            wait: WAIT_PERIOD,
            retries: 0,
            initial_backoff: INITIAL_BACKOFF,
        }
    }
}

#[derive(Debug)]
pub enum PlanOutcome {
    Saved { bytes: u64 },
    /// The page loaded but the archive has no map for this time and type.
    Unavailable,
    PageFailed(Error),
    StoreFailed(Error),
}

#[derive(Debug)]
pub struct PlanReport {
    pub plan: DownloadPlan,
    pub outcome: PlanOutcome,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub saved: usize,
    pub unavailable: usize,
    pub failed: usize,
    pub skipped: usize,
    pub bytes: u64,
}

/// Downloads every plan in order, waiting `options.wait` between plans.
///
/// A failed plan never stops the run. Setting `cancel` to `true` stops before the next plan.
pub async fn get(
    client: &Client,
    plans: Vec<DownloadPlan>,
    options: &DownloadOptions,
    mut cancel: watch::Receiver<bool>,
) -> Vec<PlanReport> {
    let total = plans.len();
    let mut reports = Vec::with_capacity(total);
    info!(total, wait_secs = options.wait.as_secs_f64(), "downloading maps");

    for (index, plan) in plans.into_iter().enumerate() {
        if index > 0 {
            tokio::select! {
                _ = sleep(options.wait) => {}
                _ = cancelled(&mut cancel) => {}
            }
        }
        if *cancel.borrow() {
            warn!(skipped = total - index, "download cancelled");
            break;
        }

        let plan_span = info_span!(
            "plan",
            n = index + 1,
            total,
            map_type = %plan.map_type,
            valid_at = %plan.valid_at.format("%Y-%m-%d %HZ")
        );
        let outcome = process_plan(client, &plan, options)
            .instrument(plan_span)
            .await;
        reports.push(PlanReport { plan, outcome });
    }

    reports
}

async fn process_plan(
    client: &Client,
    plan: &DownloadPlan,
    options: &DownloadOptions,
) -> PlanOutcome {
    let map_page = match with_retries(options, || page::get(client, &plan.page_url)).await {
        Ok(map_page) => map_page,
        Err(err) => {
            warn!(error = ?err, "failed to fetch archive page");
            return PlanOutcome::PageFailed(err);
        }
    };
    let image_url = match map_page.scrape_map_image_url() {
        Ok(Some(image_url)) => image_url,
        Ok(None) => return PlanOutcome::Unavailable,
        Err(err) => {
            warn!(error = ?err, "failed to scrape archive page");
            return PlanOutcome::PageFailed(err);
        }
    };

    let stored = with_retries(options, || {
        image::download_map(client, &image_url, &plan.map_path)
    })
    .await;
    match stored {
        Ok(bytes) => {
            info!(
                path = %plan.map_path.display(),
                size = %format_size(bytes, DECIMAL),
                "saved map"
            );
            PlanOutcome::Saved { bytes }
        }
        Err(err) => {
            warn!(error = ?err, "failed to download map");
            PlanOutcome::StoreFailed(err)
        }
    }
}

async fn with_retries<T, F, Fut>(options: &DownloadOptions, mut attempt: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut backoff = options.initial_backoff;
    let mut tries = 0;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) if tries < options.retries => {
                tries += 1;
                warn!(
                    error = ?err,
                    attempt = tries,
                    backoff_secs = backoff.as_secs_f64(),
                    "request failed, retrying"
                );
                sleep(backoff).await;
                backoff *= 2;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Resolves once `cancel` holds `true`. Never resolves if the sender is gone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    while !*cancel.borrow() {
        if cancel.changed().await.is_err() {
            futures::future::pending::<()>().await;
        }
    }
}

pub fn summarize(total: usize, reports: &[PlanReport]) -> RunSummary {
    let mut summary = RunSummary {
        skipped: total.saturating_sub(reports.len()),
        ..RunSummary::default()
    };
    for report in reports {
        match &report.outcome {
            PlanOutcome::Saved { bytes } => {
                summary.saved += 1;
                summary.bytes += bytes;
            }
            PlanOutcome::Unavailable => {
                summary.unavailable += 1;
                warn!(
                    map_type = %report.plan.map_type,
                    valid_at = %report.plan.valid_at.format("%Y-%m-%d %HZ"),
                    "no map available"
                );
            }
            PlanOutcome::PageFailed(err) | PlanOutcome::StoreFailed(err) => {
                summary.failed += 1;
                warn!(
                    map_type = %report.plan.map_type,
                    valid_at = %report.plan.valid_at.format("%Y-%m-%d %HZ"),
                    error = %err,
                    "map download failed"
                );
            }
        }
    }
    info!(
        saved = summary.saved,
        unavailable = summary.unavailable,
        failed = summary.failed,
        skipped = summary.skipped,
        size = %format_size(summary.bytes, DECIMAL),
        "finished downloading maps"
    );
    summary
}
