//! Session direction and the legacy numeric mode flags.

use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Read,
    Write,
}

impl Direction {
    pub const READ_BITS: u32 = 1;
    pub const WRITE_BITS: u32 = 2;

    /// Maps a legacy mode value onto a direction.
    ///
    /// Only the two single-flag values are accepted; `0` and the combined
    /// `READ_BITS | WRITE_BITS` have no direction.
    #[must_use]
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            Self::READ_BITS => Some(Self::Read),
            Self::WRITE_BITS => Some(Self::Write),
            _ => None,
        }
    }

    #[must_use]
    pub fn bits(self) -> u32 {
        match self {
            Self::Read => Self::READ_BITS,
            Self::Write => Self::WRITE_BITS,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "read" | "r" => Ok(Self::Read),
            "write" | "w" => Ok(Self::Write),
            _ => Err(StoreError::InvalidDirection {
                value: value.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Direction;
    use crate::error::StoreError;

    #[test]
    fn legacy_bits_map_to_single_directions() {
        assert_eq!(Direction::from_bits(1), Some(Direction::Read));
        assert_eq!(Direction::from_bits(2), Some(Direction::Write));
        assert_eq!(Direction::from_bits(0), None);
        assert_eq!(Direction::from_bits(3), None);
        assert_eq!(Direction::from_bits(42), None);
    }

    #[test]
    fn bits_round_trip_through_from_bits() {
        for direction in [Direction::Read, Direction::Write] {
            assert_eq!(Direction::from_bits(direction.bits()), Some(direction));
        }
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Read".parse::<Direction>().ok(), Some(Direction::Read));
        assert_eq!(" W ".parse::<Direction>().ok(), Some(Direction::Write));

        let error = "append"
            .parse::<Direction>()
            .expect_err("unknown direction must fail");
        assert!(matches!(
            error,
            StoreError::InvalidDirection { ref value } if value == "append"
        ));
    }
}
