//! Team model and display-name mapping

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four teams the voting backend knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    #[serde(rename = "team-a")]
    A,
    #[serde(rename = "team-b")]
    B,
    #[serde(rename = "team-c")]
    C,
    #[serde(rename = "team-d")]
    D,
}

impl Team {
    /// All configured teams, in display order
    pub const ALL: [Self; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// Stable internal code (e.g. `team-a`)
    pub const fn code(self) -> &'static str {
        match self {
            Self::A => "team-a",
            Self::B => "team-b",
            Self::C => "team-c",
            Self::D => "team-d",
        }
    }

    /// Name the backend uses when reporting votes and results
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::A => "Team 01",
            Self::B => "Team 02",
            Self::C => "Team 03",
            Self::D => "Team 04",
        }
    }

    /// Look up a team by its backend display name
    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|team| team.display_name() == name)
    }

    /// Display name for a stored team code, falling back to the code itself
    pub fn display_name_for_code(code: &str) -> String {
        code.parse::<Self>()
            .map_or_else(|_| code.to_string(), |team| team.display_name().to_string())
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Team {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|team| team.code() == s)
            .ok_or_else(|| format!("unknown team code: {s}"))
    }
}

/// Map a backend team display name to the internal team code.
///
/// Known names map to their fixed codes. Anything else degrades to a
/// lowercase, hyphenated form of the name. The fallback is not reversible and
/// will silently produce new codes if the backend changes its display strings.
///
/// # Examples
///
/// ```
/// use tally_core::models::team_code_for_name;
///
/// assert_eq!(team_code_for_name("Team 02"), "team-b");
/// assert_eq!(team_code_for_name("Red Squad"), "red-squad");
/// ```
pub fn team_code_for_name(name: &str) -> String {
    Team::from_display_name(name).map_or_else(
        || name.to_lowercase().replace(' ', "-"),
        |team| team.code().to_string(),
    )
}
