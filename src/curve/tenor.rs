//! Tenor ladder for the yield curve

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named point on the yield curve.
///
/// Variant order is the ladder order and day counts strictly increase with it,
/// so `Tenor::ALL` is the interpolation domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tenor {
    M1,
    M3,
    M6,
    Y1,
    Y2,
    Y3,
    Y5,
    Y7,
    Y10,
    Y15,
    Y20,
    Y30,
}

impl Tenor {
    /// All tenors, shortest first
    pub const ALL: [Tenor; 12] = [
        Tenor::M1,
        Tenor::M3,
        Tenor::M6,
        Tenor::Y1,
        Tenor::Y2,
        Tenor::Y3,
        Tenor::Y5,
        Tenor::Y7,
        Tenor::Y10,
        Tenor::Y15,
        Tenor::Y20,
        Tenor::Y30,
    ];

    /// Day count of the tenor (1M = 30 ... 30Y = 10950)
    pub fn days(&self) -> i64 {
        match self {
            Tenor::M1 => 30,
            Tenor::M3 => 90,
            Tenor::M6 => 180,
            Tenor::Y1 => 365,
            Tenor::Y2 => 730,
            Tenor::Y3 => 1095,
            Tenor::Y5 => 1825,
            Tenor::Y7 => 2555,
            Tenor::Y10 => 3650,
            Tenor::Y15 => 5475,
            Tenor::Y20 => 7300,
            Tenor::Y30 => 10950,
        }
    }

    /// Label as used in curve files and reports
    pub fn label(&self) -> &'static str {
        match self {
            Tenor::M1 => "1M",
            Tenor::M3 => "3M",
            Tenor::M6 => "6M",
            Tenor::Y1 => "1Y",
            Tenor::Y2 => "2Y",
            Tenor::Y3 => "3Y",
            Tenor::Y5 => "5Y",
            Tenor::Y7 => "7Y",
            Tenor::Y10 => "10Y",
            Tenor::Y15 => "15Y",
            Tenor::Y20 => "20Y",
            Tenor::Y30 => "30Y",
        }
    }

    /// Position in `Tenor::ALL`
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tenor {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Tenor::ALL
            .iter()
            .copied()
            .find(|t| t.label() == wanted)
            .ok_or_else(|| EngineError::UnknownTenor {
                label: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_counts_strictly_increase() {
        for pair in Tenor::ALL.windows(2) {
            assert!(pair[0].days() < pair[1].days(), "{} !< {}", pair[0], pair[1]);
        }
        assert_eq!(Tenor::M1.days(), 30);
        assert_eq!(Tenor::Y30.days(), 10950);
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("10Y".parse::<Tenor>().unwrap(), Tenor::Y10);
        assert_eq!(" 3m ".parse::<Tenor>().unwrap(), Tenor::M3);
        assert!("4Y".parse::<Tenor>().is_err());
    }

    #[test]
    fn test_index_matches_ladder_position() {
        for (i, tenor) in Tenor::ALL.iter().enumerate() {
            assert_eq!(tenor.index(), i);
        }
    }
}
