//! Season calendar model.
//!
//! A [`Season`] is built once per reconciliation pass from calendar data and is
//! read-only afterwards. Every session date on a [`Round`] is optional: a session
//! that did not take place (no sprint at most weekends, no third practice on
//! sprint weekends) is `None` rather than a made-up date.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};
use crate::session::SessionType;

/// Date of a session, with the UTC start time when the calendar knows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionDate {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
}

impl SessionDate {
    pub fn new(date: NaiveDate, time: Option<NaiveTime>) -> Self {
        Self { date, time }
    }

    /// Parse the `date` / `time` pair used by the race calendar API,
    /// e.g. `("2024-03-02", Some("15:00:00Z"))`.
    pub fn parse(date: &str, time: Option<&str>) -> Result<Self> {
        let parsed_date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|e| Error::parse(format!("invalid date {:?}: {}", date, e)))?;

        let parsed_time = match time.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => {
                let t = t.trim_end_matches('Z');
                let parsed = NaiveTime::parse_from_str(t, "%H:%M:%S")
                    .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
                    .map_err(|e| Error::parse(format!("invalid time {:?}: {}", t, e)))?;
                Some(parsed)
            }
            None => None,
        };

        Ok(Self::new(parsed_date, parsed_time))
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// `YYYY-MM-DD`, used to build poster identifiers.
    pub fn day_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for SessionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.time {
            Some(time) => write!(f, "{}T{}Z", self.day_string(), time.format("%H:%M:%S")),
            None => f.write_str(&self.day_string()),
        }
    }
}

/// One race weekend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub season: u32,
    /// 1-based round number.
    pub round: u32,
    pub race_name: String,
    pub circuit_id: String,
    #[serde(default)]
    pub wiki_url: Option<String>,
    /// Race date.
    #[serde(default)]
    pub date: Option<SessionDate>,
    #[serde(default)]
    pub sprint: Option<SessionDate>,
    #[serde(default)]
    pub sprint_qualifying: Option<SessionDate>,
    #[serde(default)]
    pub qualifying: Option<SessionDate>,
    #[serde(default)]
    pub first_practice: Option<SessionDate>,
    #[serde(default)]
    pub second_practice: Option<SessionDate>,
    #[serde(default)]
    pub third_practice: Option<SessionDate>,
}

impl Round {
    /// Create a round with only the mandatory fields set.
    pub fn new(
        season: u32,
        round: u32,
        race_name: impl Into<String>,
        circuit_id: impl Into<String>,
    ) -> Self {
        Self {
            season,
            round,
            race_name: race_name.into(),
            circuit_id: circuit_id.into(),
            wiki_url: None,
            date: None,
            sprint: None,
            sprint_qualifying: None,
            qualifying: None,
            first_practice: None,
            second_practice: None,
            third_practice: None,
        }
    }

    /// The date that belongs to `session`.
    ///
    /// Generic free practice recordings are dated with the first practice.
    pub fn session_date(&self, session: SessionType) -> Option<&SessionDate> {
        match session {
            SessionType::Sprint => self.sprint.as_ref(),
            SessionType::SprintQualifying => self.sprint_qualifying.as_ref(),
            SessionType::Qualifying => self.qualifying.as_ref(),
            SessionType::FreePractice | SessionType::FreePractice1 => {
                self.first_practice.as_ref()
            }
            SessionType::FreePractice2 => self.second_practice.as_ref(),
            SessionType::FreePractice3 => self.third_practice.as_ref(),
            SessionType::Race | SessionType::Unclassified => self.date.as_ref(),
        }
    }
}

/// All rounds of one season, indexed by round number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Season {
    pub year: u32,
    rounds: Vec<Round>,
}

impl Season {
    /// Build a season from rounds in calendar order.
    ///
    /// Fails when two rounds share a number or a round belongs to another season.
    pub fn new(year: u32, rounds: Vec<Round>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(rounds.len());
        for round in &rounds {
            if round.season != year {
                return Err(Error::parse(format!(
                    "round {} belongs to season {}, not {}",
                    round.round, round.season, year
                )));
            }
            if !seen.insert(round.round) {
                return Err(Error::parse(format!(
                    "duplicate round {} in season {}",
                    round.round, year
                )));
            }
        }
        Ok(Self { year, rounds })
    }

    /// Find round `number`.
    ///
    /// Calendars are normally contiguous, so position `number - 1` is checked
    /// first; a gap in the numbering falls back to a search by number.
    pub fn lookup(&self, number: u32) -> Option<&Round> {
        let position = (number as usize).checked_sub(1)?;
        match self.rounds.get(position) {
            Some(r) if r.round == number => Some(r),
            _ => self.rounds.iter().find(|r| r.round == number),
        }
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// Race date of the first round.
    pub fn start_date(&self) -> Option<&SessionDate> {
        self.rounds.first().and_then(|r| r.date.as_ref())
    }

    /// Race date of the last round.
    pub fn end_date(&self) -> Option<&SessionDate> {
        self.rounds.last().and_then(|r| r.date.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(n: u32) -> Round {
        Round::new(2024, n, format!("Grand Prix {}", n), format!("circuit_{}", n))
    }

    #[test]
    fn test_session_date_parse_with_time() {
        let d = SessionDate::parse("2024-03-02", Some("15:00:00Z")).unwrap();
        assert_eq!(d.to_string(), "2024-03-02T15:00:00Z");
        assert_eq!(d.day_string(), "2024-03-02");
        assert_eq!(d.year(), 2024);
    }

    #[test]
    fn test_session_date_parse_without_time() {
        let d = SessionDate::parse("1994-05-01", None).unwrap();
        assert_eq!(d.to_string(), "1994-05-01");
        assert!(d.time.is_none());

        let d = SessionDate::parse("1994-05-01", Some("")).unwrap();
        assert!(d.time.is_none());
    }

    #[test]
    fn test_session_date_rejects_garbage() {
        assert!(SessionDate::parse("02/03/2024", None).is_err());
        assert!(SessionDate::parse("2024-03-02", Some("3pm")).is_err());
    }

    #[test]
    fn test_lookup_contiguous() {
        let season = Season::new(2024, (1..=5).map(round).collect()).unwrap();
        assert_eq!(season.lookup(1).unwrap().round, 1);
        assert_eq!(season.lookup(5).unwrap().round, 5);
        assert!(season.lookup(6).is_none());
        assert!(season.lookup(0).is_none());
    }

    #[test]
    fn test_lookup_with_gap() {
        // Round 3 was cancelled.
        let season = Season::new(2024, vec![round(1), round(2), round(4), round(5)]).unwrap();
        assert!(season.lookup(3).is_none());
        assert_eq!(season.lookup(4).unwrap().race_name, "Grand Prix 4");
        assert_eq!(season.lookup(5).unwrap().race_name, "Grand Prix 5");
    }

    #[test]
    fn test_duplicate_round_rejected() {
        assert!(Season::new(2024, vec![round(1), round(1)]).is_err());
    }

    #[test]
    fn test_foreign_round_rejected() {
        let mut r = round(1);
        r.season = 2023;
        assert!(Season::new(2024, vec![r]).is_err());
    }

    #[test]
    fn test_session_date_selection() {
        let mut r = round(5);
        r.date = Some(SessionDate::parse("2024-04-21", Some("07:00:00Z")).unwrap());
        r.sprint = Some(SessionDate::parse("2024-04-20", Some("03:00:00Z")).unwrap());
        r.sprint_qualifying = Some(SessionDate::parse("2024-04-19", Some("07:30:00Z")).unwrap());
        r.first_practice = Some(SessionDate::parse("2024-04-19", Some("03:30:00Z")).unwrap());

        assert_eq!(r.session_date(SessionType::Race), r.date.as_ref());
        assert_eq!(r.session_date(SessionType::Unclassified), r.date.as_ref());
        assert_eq!(r.session_date(SessionType::Sprint), r.sprint.as_ref());
        assert_eq!(
            r.session_date(SessionType::SprintQualifying),
            r.sprint_qualifying.as_ref()
        );
        assert_eq!(
            r.session_date(SessionType::FreePractice),
            r.first_practice.as_ref()
        );
        assert!(r.session_date(SessionType::FreePractice3).is_none());
        assert!(r.session_date(SessionType::Qualifying).is_none());
    }

    #[test]
    fn test_start_and_end_dates() {
        let mut first = round(1);
        first.date = Some(SessionDate::parse("2024-03-02", None).unwrap());
        let mut last = round(2);
        last.date = Some(SessionDate::parse("2024-12-08", None).unwrap());
        let season = Season::new(2024, vec![first, last]).unwrap();

        assert_eq!(season.start_date().unwrap().to_string(), "2024-03-02");
        assert_eq!(season.end_date().unwrap().to_string(), "2024-12-08");
    }
}
