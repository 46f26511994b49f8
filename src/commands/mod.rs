pub mod get;
pub mod list_maps;
pub mod print_plans;

pub use get::{get, summarize, DownloadOptions};
pub use list_maps::list_maps;
pub use print_plans::print_plans;
