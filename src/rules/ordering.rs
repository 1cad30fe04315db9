//! Display ordering of sessions within a round.
//!
//! Media browsers sort episodes of one round by their sort title,
//! `"<race name> <key>"`. From the cutover season onwards sprint weekends run
//! sprint qualifying and the sprint before grand prix qualifying, so those
//! three sessions swap places.

use pitwall_common::SessionType;

use crate::config::OrderingConfig;

/// Computes sort keys and display titles for sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderingPolicy {
    cutover_season: u32,
}

impl OrderingPolicy {
    pub fn new(cutover_season: u32) -> Self {
        Self { cutover_season }
    }

    pub fn from_config(config: &OrderingConfig) -> Self {
        Self::new(config.cutover_season)
    }

    /// Numeric position of `session` within a round of `season`.
    pub fn rank(&self, season: u32, session: SessionType) -> u8 {
        let sprint_first = season >= self.cutover_season;
        match session {
            SessionType::FreePractice => 0,
            SessionType::FreePractice1 => 1,
            SessionType::FreePractice2 => 2,
            SessionType::FreePractice3 => 3,
            SessionType::Qualifying if sprint_first => 6,
            SessionType::Qualifying => 4,
            SessionType::SprintQualifying if sprint_first => 4,
            SessionType::SprintQualifying => 5,
            SessionType::Sprint if sprint_first => 5,
            SessionType::Sprint => 6,
            SessionType::Race | SessionType::Unclassified => 7,
        }
    }

    pub fn sort_key(&self, season: u32, session: SessionType) -> String {
        self.rank(season, session).to_string()
    }

    /// `"<race name> <key>"`.
    pub fn sort_title(&self, race_name: &str, season: u32, session: SessionType) -> String {
        format!("{} {}", race_name, self.sort_key(season, session))
    }
}

impl Default for OrderingPolicy {
    fn default() -> Self {
        Self::from_config(&OrderingConfig::default())
    }
}

/// Episode title for `session` of the round called `race_name`.
pub fn session_title(race_name: &str, session: SessionType) -> String {
    let suffix = match session {
        SessionType::Race | SessionType::Unclassified => return race_name.to_string(),
        SessionType::Sprint => "Sprint",
        SessionType::SprintQualifying => "Sprint Qualification",
        SessionType::Qualifying => "Qualification",
        SessionType::FreePractice => "Free practice",
        SessionType::FreePractice1 => "Free practice 1",
        SessionType::FreePractice2 => "Free practice 2",
        SessionType::FreePractice3 => "Free practice 3",
    };
    format!("{} - {}", race_name, suffix)
}
