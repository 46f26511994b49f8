use anyhow::{anyhow, Error};
use std::fmt;
use std::str::FromStr;

/// Hours between maps within one UTC day. Every variant divides 24.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Three,
    Six,
    Twelve,
    TwentyFour,
}

impl Period {
    pub fn hours(&self) -> u32 {
        match self {
            Period::Three => 3,
            Period::Six => 6,
            Period::Twelve => 12,
            Period::TwentyFour => 24,
        }
    }

    pub fn maps_per_day(&self) -> u32 {
        24 / self.hours()
    }

    /// Map hours for a single day, starting at 00Z.
    pub fn daily_hours(&self) -> impl Iterator<Item = u32> {
        let hours = self.hours();
        (0..self.maps_per_day()).map(move |n| hours * n)
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::TwentyFour
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hours())
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "3" => Ok(Period::Three),
            "6" => Ok(Period::Six),
            "12" => Ok(Period::Twelve),
            "24" => Ok(Period::TwentyFour),
            other => Err(anyhow!(
                "invalid period {:?}, expected one of: 3, 6, 12, 24",
                other
            )),
        }
    }
}
