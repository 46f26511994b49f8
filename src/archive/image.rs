use anyhow::{anyhow, Context, Result};
use futures::{Stream, TryStreamExt};
use reqwest::{Client, Url};
use std::io;
use std::path::Path;
use tempfile::Builder;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::compat::FuturesAsyncReadCompatExt;
use tracing::{info, instrument};

/// Streams the map image at `image_url` into `map_path`, replacing any existing file.
///
/// Returns the number of bytes written.
#[instrument(skip(client, image_url, map_path), fields(image_url = %image_url, map_path = %map_path.display()))]
pub async fn download_map(client: &Client, image_url: &Url, map_path: &Path) -> Result<u64> {
    fetch_and_store(client, image_url, map_path)
        .await
        .with_context(|| {
            format!(
                "Failed to store map {} at {}",
                image_url,
                map_path.display()
            )
        })
}

async fn fetch_and_store(client: &Client, image_url: &Url, map_path: &Path) -> Result<u64> {
    let res = client
        .get(image_url.clone())
        .send()
        .await?
        .error_for_status()?;
    info!(status = %res.status(), "fetched map image");

    let byte_stream = res
        .bytes_stream()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e));
    store_stream(byte_stream, map_path).await
}

/// Copies `byte_stream` into a temp file beside `map_path`, then renames it into place.
pub async fn store_stream<S, B>(byte_stream: S, map_path: &Path) -> Result<u64>
where
    S: Stream<Item = io::Result<B>> + Unpin,
    B: AsRef<[u8]>,
{
    let dir = map_path
        .parent()
        .ok_or_else(|| anyhow!("Map path {} has no parent directory", map_path.display()))?;
    let mut builder = Builder::new();
    // Temp files default to 0600, saved maps get the same mode `File::create` gives.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let temp_file = builder.tempfile_in(dir)?;
    let mut tokio_file = File::from_std(temp_file.reopen()?);

    // See: https://github.com/benkay86/async-applied/blob/master/reqwest-tokio-compat/src/main.rs
    let mut reader = byte_stream.into_async_read().compat();
    let written = tokio::io::copy(&mut reader, &mut tokio_file).await?;
    tokio_file.flush().await?;
    drop(tokio_file);

    temp_file.persist(map_path).map_err(|e| e.error)?;
    info!(bytes = written, "saved map image");
    Ok(written)
}
