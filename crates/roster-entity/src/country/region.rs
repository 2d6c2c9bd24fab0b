//! World region enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Region a country belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    /// Europe.
    Europe,
    /// Asia.
    Asia,
    /// Africa.
    Africa,
    /// North America.
    NorthAmerica,
    /// South America.
    SouthAmerica,
    /// Oceania.
    Oceania,
    /// Antarctica.
    Antarctica,
    /// Not recognised.
    #[default]
    Unknown,
}

impl Region {
    /// Return the region as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Europe => "Europe",
            Self::Asia => "Asia",
            Self::Africa => "Africa",
            Self::NorthAmerica => "NorthAmerica",
            Self::SouthAmerica => "SouthAmerica",
            Self::Oceania => "Oceania",
            Self::Antarctica => "Antarctica",
            Self::Unknown => "Unknown",
        }
    }

    /// Parse a stored or imported value, mapping anything unrecognised to
    /// `Unknown`.
    pub fn parse_lossy(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Region {
    type Err = roster_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "europe" => Ok(Self::Europe),
            "asia" => Ok(Self::Asia),
            "africa" => Ok(Self::Africa),
            "northamerica" => Ok(Self::NorthAmerica),
            "southamerica" => Ok(Self::SouthAmerica),
            "oceania" => Ok(Self::Oceania),
            "antarctica" => Ok(Self::Antarctica),
            "unknown" => Ok(Self::Unknown),
            _ => Err(roster_core::AppError::validation(format!(
                "Invalid region: '{s}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("Europe".parse::<Region>().unwrap(), Region::Europe);
        assert_eq!("north america".parse::<Region>().unwrap(), Region::NorthAmerica);
        assert_eq!("SOUTH_AMERICA".parse::<Region>().unwrap(), Region::SouthAmerica);
        assert!("Atlantis".parse::<Region>().is_err());
    }

    #[test]
    fn test_lossy_falls_back_to_unknown() {
        assert_eq!(Region::parse_lossy("Atlantis"), Region::Unknown);
        assert_eq!(Region::parse_lossy(""), Region::Unknown);
        assert_eq!(Region::parse_lossy(Region::Oceania.as_str()), Region::Oceania);
    }
}
