//! # Severity Resolver
//! Maps the free-form CAP `parameter` list to one of the three AEMET
//! warning levels. Pure logic, no I/O.
//!
//! Policy: the first parameter whose name contains "level" (or the Spanish
//! "nivel") supplies the token; later matches are ignored. Anything that is
//! not amarillo/naranja/rojo resolves to `None` and the record is excluded
//! downstream.

use serde::{Deserialize, Serialize};
use std::fmt;

/// AEMET warning level, ordered by priority.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    /// No recognized level; the record never reaches the output.
    #[default]
    None,
    Amarillo,
    Naranja,
    Rojo,
}

impl SeverityLevel {
    /// Numeric rank used for dedup precedence and output ordering.
    pub fn priority(self) -> u8 {
        match self {
            SeverityLevel::None => 0,
            SeverityLevel::Amarillo => 1,
            SeverityLevel::Naranja => 2,
            SeverityLevel::Rojo => 3,
        }
    }

    /// Display color for map rendering; `None` has no color.
    pub fn color(self) -> Option<&'static str> {
        match self {
            SeverityLevel::None => None,
            SeverityLevel::Amarillo => Some("#FFFF00"),
            SeverityLevel::Naranja => Some("#FF7F00"),
            SeverityLevel::Rojo => Some("#FF0000"),
        }
    }

    /// Lowercase token as it appears in CAP parameters and JSON output.
    pub fn token(self) -> &'static str {
        match self {
            SeverityLevel::None => "none",
            SeverityLevel::Amarillo => "amarillo",
            SeverityLevel::Naranja => "naranja",
            SeverityLevel::Rojo => "rojo",
        }
    }

    fn from_token(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "amarillo" => SeverityLevel::Amarillo,
            "naranja" => SeverityLevel::Naranja,
            "rojo" => SeverityLevel::Rojo,
            _ => SeverityLevel::None,
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

fn is_level_parameter(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("level") || lower.contains("nivel")
}

/// Resolve the warning level from a CAP parameter list, in document order.
/// First-match-wins: only the first level-bearing parameter is consulted.
pub fn resolve<'a, I>(parameters: I) -> SeverityLevel
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    for (name, value) in parameters {
        if is_level_parameter(name) {
            return SeverityLevel::from_token(value);
        }
    }
    SeverityLevel::None
}
