//! Session kinds within a race weekend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single event within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Race,
    Sprint,
    SprintQualifying,
    Qualifying,
    /// Practice without a session number; dated with the first practice.
    FreePractice,
    FreePractice1,
    FreePractice2,
    FreePractice3,
    /// Nothing recognisable in the name. Behaves like [`SessionType::Race`].
    Unclassified,
}

impl SessionType {
    /// Classification precedence, highest first.
    ///
    /// When a filename matches several rules, the type appearing earliest here
    /// wins. `Race` is the fallback and never needs a rule of its own.
    pub const PRECEDENCE: [SessionType; 8] = [
        SessionType::SprintQualifying,
        SessionType::Sprint,
        SessionType::Qualifying,
        SessionType::FreePractice,
        SessionType::FreePractice1,
        SessionType::FreePractice2,
        SessionType::FreePractice3,
        SessionType::Race,
    ];

    /// Position in [`Self::PRECEDENCE`]; lower wins. `Unclassified` ranks last.
    pub fn precedence(self) -> usize {
        Self::PRECEDENCE
            .iter()
            .position(|t| *t == self)
            .unwrap_or(Self::PRECEDENCE.len())
    }

    /// Stable lowercase identifier, also used as the config key.
    pub fn as_str(self) -> &'static str {
        match self {
            SessionType::Race => "race",
            SessionType::Sprint => "sprint",
            SessionType::SprintQualifying => "sprint_qualifying",
            SessionType::Qualifying => "qualifying",
            SessionType::FreePractice => "free_practice",
            SessionType::FreePractice1 => "free_practice_1",
            SessionType::FreePractice2 => "free_practice_2",
            SessionType::FreePractice3 => "free_practice_3",
            SessionType::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "race" => Ok(Self::Race),
            "sprint" => Ok(Self::Sprint),
            "sprint_qualifying" | "sprint_quali" | "sprint_shootout" => {
                Ok(Self::SprintQualifying)
            }
            "qualifying" | "quali" => Ok(Self::Qualifying),
            "free_practice" | "fp" => Ok(Self::FreePractice),
            "free_practice_1" | "fp1" => Ok(Self::FreePractice1),
            "free_practice_2" | "fp2" => Ok(Self::FreePractice2),
            "free_practice_3" | "fp3" => Ok(Self::FreePractice3),
            "unclassified" => Ok(Self::Unclassified),
            _ => Err(format!("Unknown session type: {}", s)),
        }
    }
}
