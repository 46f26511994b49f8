use anyhow::{Context, Result};
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use tracing::{info, instrument, warn};

use super::MAP_CSS_SELECTOR;

pub struct MapPageResponse {
    url: Url,
    html: Html,
}

/// Fetches an archive page. Non-2xx statuses are returned as errors.
#[instrument(skip(client))]
pub async fn get(client: &Client, page_url: &str) -> Result<MapPageResponse> {
    let res = client
        .get(page_url)
        .send()
        .await
        .with_context(|| format!("Failed to request archive page {}", page_url))?
        .error_for_status()
        .with_context(|| format!("Archive page {} returned an error status", page_url))?;
    info!(status = %res.status(), "fetched archive page");
    let url = res.url().clone();
    let text = res
        .text()
        .await
        .with_context(|| format!("Failed to read archive page {}", page_url))?;

    Ok(MapPageResponse::new(url, &text))
}

impl MapPageResponse {
    pub fn new(url: Url, text: &str) -> Self {
        MapPageResponse {
            url,
            html: Html::parse_document(text),
        }
    }

    /// Absolute URL of the map image, or `None` when the page has no map.
    #[instrument(skip(self), fields(url = %self.url))]
    pub fn scrape_map_image_url(&self) -> Result<Option<Url>> {
        let map_select = Selector::parse(MAP_CSS_SELECTOR).expect("failed to parse CSS selector");
        let src = match self
            .html
            .select(&map_select)
            .next()
            .and_then(|elem| elem.value().attr("src"))
        {
            Some(src) => src.trim(),
            None => {
                warn!("could not find map image on archive page");
                return Ok(None);
            }
        };
        if src.is_empty() {
            warn!("map image on archive page has an empty src");
            return Ok(None);
        }
        let image_url = self
            .url
            .join(src)
            .with_context(|| format!("Invalid map image src {:?}", src))?;
        info!(image_url = %image_url, "scraped map image url from archive page");
        Ok(Some(image_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(text: &str) -> MapPageResponse {
        let url = Url::parse(
            "http://www.wpc.ncep.noaa.gov/archives/web_pages/sfc/sfc_archive_maps.php?arcdate=07/04/2017&selmap=2017070400&maptype=namussfc",
        )
        .unwrap();
        MapPageResponse::new(url, text)
    }

    #[test]
    fn resolves_relative_src_against_page() {
        let resp = page(
            r#"<html><body>
                <img src="/images/logo.gif">
                <img class="sfcmapimage" src="../../sfc/2017/namussfc2017070400.gif">
            </body></html>"#,
        );
        assert_eq!(
            resp.scrape_map_image_url().unwrap().unwrap().as_str(),
            "http://www.wpc.ncep.noaa.gov/archives/sfc/2017/namussfc2017070400.gif"
        );
    }

    #[test]
    fn keeps_absolute_src() {
        let resp = page(
            r#"<img class="map sfcmapimage" src="https://cdn.example.com/namussfc2017070400.gif">"#,
        );
        assert_eq!(
            resp.scrape_map_image_url().unwrap().unwrap().as_str(),
            "https://cdn.example.com/namussfc2017070400.gif"
        );
    }

    #[test]
    fn missing_map_is_not_found() {
        let resp = page("<html><body><p>No map available for this date.</p></body></html>");
        assert!(resp.scrape_map_image_url().unwrap().is_none());
    }

    #[test]
    fn map_without_src_is_not_found() {
        let resp = page(r#"<img class="sfcmapimage" alt="surface map">"#);
        assert!(resp.scrape_map_image_url().unwrap().is_none());
    }

    #[test]
    fn uses_first_matching_element() {
        let resp = page(
            r#"<img class="sfcmapimage" src="first.gif"><img class="sfcmapimage" src="second.gif">"#,
        );
        assert_eq!(
            resp.scrape_map_image_url().unwrap().unwrap().as_str(),
            "http://www.wpc.ncep.noaa.gov/archives/web_pages/sfc/first.gif"
        );
    }
}
