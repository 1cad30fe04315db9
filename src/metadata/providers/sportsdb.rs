//! Season poster table from TheSportsDB.
//!
//! The table is fetched once at startup and handed to the poster source; it
//! is never modified afterwards.

use std::collections::HashMap;
use std::time::Duration;

use pitwall_common::{Error, Result};
use serde::Deserialize;
use tracing::info;

use super::{build_client, get_with_retry, request_error};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SOURCE: &str = "thesportsdb";

#[derive(Debug, Deserialize)]
struct SeasonsResponse {
    #[serde(default)]
    seasons: Option<Vec<SeasonEntry>>,
}

#[derive(Debug, Deserialize)]
struct SeasonEntry {
    #[serde(rename = "strSeason")]
    season: String,
    #[serde(rename = "strPoster")]
    poster: Option<String>,
}

/// Season year to poster URL.
#[derive(Debug, Clone, Default)]
pub struct SeasonPosterTable {
    posters: HashMap<u32, String>,
}

impl SeasonPosterTable {
    /// Download the listing at `url`.
    pub async fn fetch(url: &str) -> Result<Self> {
        let client = build_client(REQUEST_TIMEOUT)?;
        let resp = get_with_retry(&client, None, SOURCE, url).await?;
        if !resp.status().is_success() {
            return Err(Error::fetch(format!(
                "season poster listing returned HTTP {}",
                resp.status()
            )));
        }
        let body: SeasonsResponse = resp.json().await.map_err(|e| request_error(SOURCE, url, e))?;
        let table = Self::from_entries(
            body.seasons
                .unwrap_or_default()
                .into_iter()
                .filter_map(|e| Some((e.season, e.poster?))),
        );
        info!(seasons = table.len(), "Loaded season poster table");
        Ok(table)
    }

    /// Build a table from `(season, poster url)` pairs. Seasons that are not
    /// a plain year and empty URLs are dropped.
    pub fn from_entries<I, S, U>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, U)>,
        S: AsRef<str>,
        U: Into<String>,
    {
        let posters = entries
            .into_iter()
            .filter_map(|(season, url)| {
                let year = season.as_ref().trim().parse::<u32>().ok()?;
                let url = url.into();
                (!url.trim().is_empty()).then_some((year, url))
            })
            .collect();
        Self { posters }
    }

    pub fn get(&self, year: u32) -> Option<&str> {
        self.posters.get(&year).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.posters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posters.is_empty()
    }
}
