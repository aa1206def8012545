//! Storage slot identifiers as printed on the shelf QR labels.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("invalid location code '{0}': expected <row>-<level>")]
    InvalidFormat(String),
}

/// Lift setting encoded in the level part of a location code.
///
/// Only two levels are reachable by the lift; every other value is a valid
/// slot the robot can drive to but cannot serve, which is reported rather
/// than rejected at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Level {
    /// Level "01": lower the lift.
    Lower,
    /// Level "02": raise the lift.
    Raise,
    /// Any other level token; no actuator action exists for it.
    Unsupported(String),
}

impl Level {
    pub fn as_str(&self) -> &str {
        match self {
            Level::Lower => "01",
            Level::Raise => "02",
            Level::Unsupported(s) => s,
        }
    }

    pub fn is_reachable(&self) -> bool {
        !matches!(self, Level::Unsupported(_))
    }
}

impl From<&str> for Level {
    fn from(s: &str) -> Self {
        match s {
            "01" => Level::Lower,
            "02" => Level::Raise,
            other => Level::Unsupported(other.to_string()),
        }
    }
}

/// A parsed `<row>-<level>` slot identifier, e.g. `A-01`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationCode {
    pub row: String,
    pub level: Level,
}

impl FromStr for LocationCode {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, level) = s
            .split_once('-')
            .ok_or_else(|| LocationError::InvalidFormat(s.to_string()))?;
        if row.is_empty() || level.is_empty() {
            return Err(LocationError::InvalidFormat(s.to_string()));
        }
        Ok(LocationCode {
            row: row.to_string(),
            level: Level::from(level),
        })
    }
}

impl fmt::Display for LocationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.level.as_str())
    }
}
