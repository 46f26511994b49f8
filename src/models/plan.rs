use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, instrument};

use super::map_type::MapType;
use crate::archive::{page_url, IMAGE_FILE_TYPE};

/// One archive page to scrape and the file its map is saved to.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadPlan {
    pub valid_at: DateTime<Utc>,
    pub map_type: MapType,
    pub page_url: String,
    pub map_path: PathBuf,
}

/// Expands a leading `~` to the current user's home directory.
pub fn expand_home(dir: &str) -> Result<PathBuf> {
    if dir == "~" || dir.starts_with("~/") {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        let rest = dir.trim_start_matches('~').trim_start_matches('/');
        if rest.is_empty() {
            return Ok(home);
        }
        return Ok(home.join(rest));
    }
    Ok(PathBuf::from(dir))
}

/// Expands and absolutizes `map_dir`, creating it and any missing parents.
pub fn prepare_map_dir(map_dir: &str) -> Result<PathBuf> {
    let dir = expand_home(map_dir)?;
    let dir = if dir.is_absolute() {
        dir
    } else {
        env::current_dir()
            .context("Failed to read current directory")?
            .join(dir)
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create map directory {}", dir.display()))?;
    Ok(dir)
}

pub fn map_file_name(valid_at: &DateTime<Utc>, map_type: MapType) -> String {
    format!(
        "{}_{}.{}",
        valid_at.format("%Y%m%d_%Hz"),
        map_type.as_str(),
        IMAGE_FILE_TYPE
    )
}

/// Absolute path of the image file for one map, e.g. `20170704_12z_namussfc.gif`.
pub fn map_path(map_dir: &str, valid_at: &DateTime<Utc>, map_type: MapType) -> Result<PathBuf> {
    let dir = prepare_map_dir(map_dir)?;
    Ok(dir.join(map_file_name(valid_at, map_type)))
}

/// Builds one plan per (time, map type), time-major.
#[instrument(skip(times, map_types), fields(times = times.len(), map_types = map_types.len()))]
pub fn build_plans(
    map_dir: &str,
    times: &[DateTime<Utc>],
    map_types: &[MapType],
) -> Result<Vec<DownloadPlan>> {
    let dir = prepare_map_dir(map_dir)?;
    let mut plans = Vec::with_capacity(times.len() * map_types.len());
    for valid_at in times {
        for map_type in map_types {
            plans.push(DownloadPlan {
                valid_at: *valid_at,
                map_type: *map_type,
                page_url: page_url(valid_at, *map_type),
                map_path: dir.join(map_file_name(valid_at, *map_type)),
            });
        }
    }
    debug!(num_plans = plans.len(), "built download plans");
    Ok(plans)
}
