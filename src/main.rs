use anyhow::{anyhow, Context, Result};
use argh::FromArgs;
use dotenv::dotenv;
use std::collections::HashSet;
use std::env;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod archive;
mod commands;
mod models;

use archive::USER_AGENT;
use commands::{get, list_maps, print_plans, summarize, DownloadOptions};
use models::plan::build_plans;
use models::time_series::{make_time_series, parse_date};
use models::{MapType, Period};

const MAP_DIR: &str = "~/Desktop/Wx_Maps";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(FromArgs)]
/// Downloads a series of surface weather maps from the Weather Prediction Center's surface analysis archive.
/// One map of each type is downloaded for every date and time in the range.
struct Args {
    /// starting date as YYYY-MM-DD or YYYYMMDD (inclusive)
    #[argh(option, short = 's')]
    start_date: Option<String>,

    /// ending date as YYYY-MM-DD or YYYYMMDD (inclusive)
    #[argh(option, short = 'e')]
    end_date: Option<String>,

    /// hours between maps: 3, 6, 12 or 24. The first map of each day is always 00Z
    #[argh(option, short = 'p', default = "Period::default()")]
    period: Period,

    /// map type to download, repeat for several types (see --list-maps). Defaults to namussfc
    #[argh(option, short = 'm')]
    maps: Vec<MapType>,

    /// directory to store downloaded maps. Defaults to $WX_MAP_DIR or ~/Desktop/Wx_Maps
    #[argh(option, short = 'd')]
    map_dir: Option<String>,

    /// seconds to wait between downloads, at least 1
    #[argh(option, short = 'w', default = "5")]
    wait: u64,

    /// times to retry a failed page or image request
    #[argh(option, default = "0")]
    retries: u32,

    /// print the download plans as JSON lines instead of downloading
    #[argh(switch)]
    dry_run: bool,

    /// list the available map types and exit
    #[argh(switch)]
    list_maps: bool,

    /// write logs to hourly rolling files in this directory instead of stderr
    #[argh(option)]
    log_dir: Option<String>,
}

fn init_tracing(log_dir: Option<&str>) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wx_map=info"));
    match log_dir {
        Some(log_dir) => {
            let appender = tracing_appender::rolling::hourly(log_dir, "wx-map.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}

#[tokio::main]
pub async fn main() -> Result<()> {
    dotenv().ok();
    let args: Args = argh::from_env();
    let _guard = init_tracing(args.log_dir.as_deref());

    if args.list_maps {
        list_maps();
        return Ok(());
    }

    let start_date = args
        .start_date
        .as_deref()
        .ok_or_else(|| anyhow!("--start-date is required"))
        .and_then(parse_date)?;
    let end_date = args
        .end_date
        .as_deref()
        .ok_or_else(|| anyhow!("--end-date is required"))
        .and_then(parse_date)?;
    let mut map_types = args.maps.clone();
    if map_types.is_empty() {
        map_types.push(MapType::NamUsSfc);
    }
    let mut seen = HashSet::new();
    map_types.retain(|map_type| seen.insert(*map_type));
    let map_dir = args
        .map_dir
        .clone()
        .or_else(|| env::var("WX_MAP_DIR").ok())
        .unwrap_or_else(|| MAP_DIR.to_string());

    info!(
        %start_date,
        %end_date,
        period = %args.period,
        map_types = ?map_types,
        map_dir = %map_dir,
        "planning map downloads"
    );
    let options = DownloadOptions::new(Duration::from_secs(args.wait), args.retries)?;

    let times = make_time_series(start_date, end_date, args.period);
    let plans = build_plans(&map_dir, &times, &map_types)?;

    if args.dry_run {
        return print_plans(&plans);
    }

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("received interrupt, stopping after the current map");
            cancel_tx.send(true).ok();
        }
    });

    let total = plans.len();
    let reports = get(&client, plans, &options, cancel_rx).await;
    summarize(total, &reports);

    Ok(())
}
