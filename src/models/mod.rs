pub mod map_type;
pub mod period;
pub mod plan;
pub mod time_series;

pub use map_type::MapType;
pub use period::Period;
pub use plan::DownloadPlan;
