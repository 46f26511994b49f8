use chrono::{DateTime, Utc};

use crate::models::MapType;

pub mod image;
pub mod page;

pub static SITE_URL: &str = "http://www.wpc.ncep.noaa.gov/";
pub static PAGE_PATH: &str = "archives/web_pages/sfc/sfc_archive_maps.php";
pub static MAP_CSS_SELECTOR: &str = ".sfcmapimage";
pub static IMAGE_FILE_TYPE: &str = "gif";
pub static USER_AGENT: &str = "wx-map/0.1";

/// URL of the archive page holding the `map_type` map valid at `valid_at`.
pub fn page_url(valid_at: &DateTime<Utc>, map_type: MapType) -> String {
    format!(
        "{}{}?arcdate={}&selmap={}&maptype={}",
        SITE_URL,
        PAGE_PATH,
        valid_at.format("%m/%d/%Y"),
        valid_at.format("%Y%m%d%H"),
        map_type.as_str()
    )
}
