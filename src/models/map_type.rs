use anyhow::{anyhow, Error};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Surface analysis products published by the WPC archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MapType {
    #[serde(rename = "namussfc")]
    NamUsSfc,
    #[serde(rename = "usfntsfc")]
    UsFntSfc,
    #[serde(rename = "print_us")]
    PrintUs,
    #[serde(rename = "ussatsfc")]
    UsSatSfc,
    #[serde(rename = "radsfcus_exp")]
    RadSfcUsExp,
    #[serde(rename = "namfntsfc")]
    NamFntSfc,
    #[serde(rename = "satsfcnps")]
    SatSfcNps,
}

impl MapType {
    pub const ALL: [MapType; 7] = [
        MapType::NamUsSfc,
        MapType::UsFntSfc,
        MapType::PrintUs,
        MapType::UsSatSfc,
        MapType::RadSfcUsExp,
        MapType::NamFntSfc,
        MapType::SatSfcNps,
    ];

    /// The tag the archive expects in the `maptype` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            MapType::NamUsSfc => "namussfc",
            MapType::UsFntSfc => "usfntsfc",
            MapType::PrintUs => "print_us",
            MapType::UsSatSfc => "ussatsfc",
            MapType::RadSfcUsExp => "radsfcus_exp",
            MapType::NamFntSfc => "namfntsfc",
            MapType::SatSfcNps => "satsfcnps",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MapType::NamUsSfc => "United States (CONUS)",
            MapType::UsFntSfc => "United States (Fronts/Analysis Only)",
            MapType::PrintUs => "United States (B/W)",
            MapType::UsSatSfc => "U.S. Analysis/Satellite Composite",
            MapType::RadSfcUsExp => "U.S. Analysis/Radar Composite",
            MapType::NamFntSfc => "North America (Fronts/Analysis Only)",
            MapType::SatSfcNps => "North America Analysis/Satellite Composite",
        }
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MapType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        MapType::ALL
            .iter()
            .copied()
            .find(|map_type| map_type.as_str() == tag)
            .ok_or_else(|| {
                anyhow!(
                    "unknown map type {:?}, expected one of: {}",
                    s,
                    MapType::ALL
                        .iter()
                        .map(MapType::as_str)
                        .collect::<Vec<&str>>()
                        .join(", ")
                )
            })
    }
}
