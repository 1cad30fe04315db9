//! Jolpica race calendar.
//!
//! Implements [`CalendarSource`] against the Jolpica mirror of the Ergast F1
//! API (`{base}/{year}.json`).
//!
//! Features:
//! - Token-bucket rate limiting at 4 requests / second via [`governor`].
//! - Retry on HTTP 429 with `Retry-After` support.
//! - 10-second request timeout.

use std::time::Duration;

use async_trait::async_trait;
use pitwall_common::{Error, Result, Round, Season, SessionDate};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{build_client, get_with_retry, rate_limiter, DirectRateLimiter};
use crate::metadata::provider::CalendarSource;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const REQUESTS_PER_SECOND: u32 = 4;
/// Season used to probe the API at startup.
const PROBE_SEASON: u32 = 2011;
const SOURCE: &str = "jolpica";

// ---------------------------------------------------------------------------
// API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CalendarResponse {
    #[serde(rename = "MRData")]
    mr_data: MrData,
}

#[derive(Debug, Deserialize)]
struct MrData {
    #[serde(rename = "RaceTable")]
    race_table: RaceTable,
}

#[derive(Debug, Deserialize)]
struct RaceTable {
    #[serde(rename = "Races", default)]
    races: Vec<ApiRace>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiRace {
    #[serde(rename = "season")]
    season: String,
    #[serde(rename = "round")]
    round: String,
    #[serde(rename = "url")]
    url: Option<String>,
    #[serde(rename = "raceName")]
    race_name: String,
    circuit: ApiCircuit,
    #[serde(rename = "date")]
    date: Option<String>,
    #[serde(rename = "time")]
    time: Option<String>,
    first_practice: Option<ApiSession>,
    second_practice: Option<ApiSession>,
    third_practice: Option<ApiSession>,
    qualifying: Option<ApiSession>,
    sprint: Option<ApiSession>,
    sprint_qualifying: Option<ApiSession>,
    /// Name used for sprint qualifying in 2023.
    sprint_shootout: Option<ApiSession>,
}

#[derive(Debug, Deserialize)]
struct ApiCircuit {
    #[serde(rename = "circuitId")]
    circuit_id: String,
}

#[derive(Debug, Deserialize)]
struct ApiSession {
    date: String,
    time: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Jolpica calendar client.
pub struct JolpicaCalendar {
    client: reqwest::Client,
    base_url: String,
    rate_limiter: DirectRateLimiter,
}

impl JolpicaCalendar {
    /// Create a client for the API rooted at `base_url`
    /// (e.g. `https://api.jolpi.ca/ergast/f1`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client(REQUEST_TIMEOUT)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limiter: rate_limiter(REQUESTS_PER_SECOND),
        })
    }

    fn season_url(&self, year: u32) -> String {
        format!("{}/{}.json?limit=100", self.base_url, year)
    }

    /// Probe the API once. A failure here means the configured endpoint is
    /// unusable and nothing can be reconciled.
    pub async fn check_connection(&self) -> Result<()> {
        let url = self.season_url(PROBE_SEASON);
        let resp = get_with_retry(&self.client, Some(&self.rate_limiter), SOURCE, &url).await?;
        if !resp.status().is_success() {
            return Err(Error::fetch(format!(
                "calendar API check failed with HTTP {}: {}",
                resp.status(),
                url
            )));
        }
        info!(url = %self.base_url, "Calendar API reachable");
        Ok(())
    }
}

#[async_trait]
impl CalendarSource for JolpicaCalendar {
    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn get_season(&self, year: u32) -> Result<Season> {
        let url = self.season_url(year);
        debug!(season = year, url = %url, "Fetching season calendar");

        let resp = get_with_retry(&self.client, Some(&self.rate_limiter), SOURCE, &url).await?;
        if !resp.status().is_success() {
            return Err(Error::fetch(format!(
                "calendar returned HTTP {} for season {}",
                resp.status(),
                year
            )));
        }

        let body: CalendarResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                Error::timeout(format!("calendar body for season {} timed out", year))
            } else {
                Error::fetch(format!("invalid calendar response for season {}: {}", year, e))
            }
        })?;

        let rounds = body
            .mr_data
            .race_table
            .races
            .into_iter()
            .map(|race| convert_race(year, race))
            .collect::<Result<Vec<_>>>()?;

        if rounds.is_empty() {
            return Err(Error::fetch(format!("calendar has no rounds for season {}", year)));
        }

        let season = Season::new(year, rounds)?;
        info!(season = year, rounds = season.len(), "Loaded season calendar");
        Ok(season)
    }
}

fn convert_race(year: u32, race: ApiRace) -> Result<Round> {
    let season: u32 = race
        .season
        .parse()
        .map_err(|_| Error::parse(format!("invalid season {:?} in calendar", race.season)))?;
    let number: u32 = race
        .round
        .parse()
        .map_err(|_| Error::parse(format!("invalid round {:?} in season {}", race.round, year)))?;

    let mut round = Round::new(season, number, race.race_name, race.circuit.circuit_id);
    round.wiki_url = race.url.filter(|u| !u.is_empty());
    round.date = race
        .date
        .as_deref()
        .and_then(|d| session_date(year, number, "race", d, race.time.as_deref()));

    let session = |name: &str, s: &Option<ApiSession>| {
        s.as_ref()
            .and_then(|s| session_date(year, number, name, &s.date, s.time.as_deref()))
    };
    round.first_practice = session("first_practice", &race.first_practice);
    round.second_practice = session("second_practice", &race.second_practice);
    round.third_practice = session("third_practice", &race.third_practice);
    round.qualifying = session("qualifying", &race.qualifying);
    round.sprint = session("sprint", &race.sprint);
    round.sprint_qualifying = session("sprint_qualifying", &race.sprint_qualifying)
        .or_else(|| session("sprint_shootout", &race.sprint_shootout));

    if round.date.is_none() {
        warn!(season = year, round = number, "No race date in calendar");
    }
    Ok(round)
}

/// Parse one session date; a malformed value is logged and left unset.
fn session_date(
    year: u32,
    round: u32,
    session: &str,
    date: &str,
    time: Option<&str>,
) -> Option<SessionDate> {
    match SessionDate::parse(date, time) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(season = year, round, session, error = %e, "Ignoring malformed session date");
            None
        }
    }
}
