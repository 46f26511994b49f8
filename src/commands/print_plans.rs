use anyhow::Result;
use tracing::info;

use crate::models::DownloadPlan;

/// Prints each plan as a JSON line without downloading anything.
pub fn print_plans(plans: &[DownloadPlan]) -> Result<()> {
    for plan in plans {
        println!("{}", serde_json::to_string(plan)?);
    }
    info!(num_plans = plans.len(), "dry run, no maps downloaded");
    Ok(())
}
