//! Round posters from eventartworks.de.
//!
//! Round artwork lives at `{base}/{YYYY-MM-DD}-{circuit}.webp`, keyed by race
//! day. The site does not always use the calendar's circuit id, so a
//! [`CircuitAliases`] table rewrites ids before the URL is built.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use pitwall_common::{Error, Result, SessionDate};
use tracing::{debug, warn};

use super::{build_client, get_with_retry, request_error, SeasonPosterTable};
use crate::images::{Poster, PosterFormat};
use crate::metadata::provider::PosterSource;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SOURCE: &str = "eventartworks";

/// Circuit id rewrites for poster lookups.
///
/// Two kinds of key are recognised:
/// - `"<YYYY-MM-DD>-<circuit>"` maps to the complete image id for that one race;
/// - `"<circuit>"` maps to the circuit name the site uses for every race there.
#[derive(Debug, Clone, Default)]
pub struct CircuitAliases {
    aliases: BTreeMap<String, String>,
}

impl CircuitAliases {
    pub fn new(aliases: BTreeMap<String, String>) -> Self {
        Self { aliases }
    }

    /// Image id for the race at `circuit_id` on `date`.
    pub fn poster_id(&self, circuit_id: &str, date: &SessionDate) -> String {
        let day = date.day_string();
        let dated = format!("{}-{}", day, circuit_id);
        if let Some(full) = self.aliases.get(&dated) {
            return full.clone();
        }
        match self.aliases.get(circuit_id) {
            Some(alias) => format!("{}-{}", day, alias),
            None => dated,
        }
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// [`PosterSource`] backed by eventartworks.de for rounds and a
/// [`SeasonPosterTable`] for seasons.
pub struct EventArtworksPosters {
    client: reqwest::Client,
    base_url: String,
    aliases: CircuitAliases,
    season_posters: SeasonPosterTable,
}

impl EventArtworksPosters {
    pub fn new(
        base_url: impl Into<String>,
        aliases: CircuitAliases,
        season_posters: SeasonPosterTable,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(REQUEST_TIMEOUT)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            aliases,
            season_posters,
        })
    }

    pub fn round_poster_url(&self, circuit_id: &str, date: &SessionDate) -> String {
        format!("{}/{}.webp", self.base_url, self.aliases.poster_id(circuit_id, date))
    }
}

#[async_trait]
impl PosterSource for EventArtworksPosters {
    async fn round_poster(&self, circuit_id: &str, date: &SessionDate) -> Result<Option<Poster>> {
        let url = self.round_poster_url(circuit_id, date);
        debug!(url = %url, "Fetching round poster");

        let resp = get_with_retry(&self.client, None, SOURCE, &url).await?;
        if !resp.status().is_success() {
            debug!(url = %url, status = %resp.status(), "No round poster");
            return Ok(None);
        }

        let content_type = content_type(&resp);
        if PosterFormat::from_content_type(&content_type) != Some(PosterFormat::Webp) {
            warn!(
                url = %url,
                content_type = %content_type,
                "Round poster is not webp; add a circuit alias for this race"
            );
            return Err(Error::image_format(format!(
                "expected image/webp from {}, got {:?}",
                url, content_type
            )));
        }

        let bytes = resp.bytes().await.map_err(|e| request_error(SOURCE, &url, e))?;
        Ok(Some(Poster::new(bytes, PosterFormat::Webp)))
    }

    async fn season_poster(&self, year: u32) -> Result<Option<Poster>> {
        let Some(url) = self.season_posters.get(year) else {
            debug!(season = year, "No season poster listed");
            return Ok(None);
        };

        let resp = get_with_retry(&self.client, None, SOURCE, url).await?;
        if !resp.status().is_success() {
            debug!(season = year, status = %resp.status(), "Season poster unavailable");
            return Ok(None);
        }

        let declared = PosterFormat::from_content_type(&content_type(&resp));
        let bytes = resp.bytes().await.map_err(|e| request_error(SOURCE, url, e))?;
        let format = declared
            .or_else(|| PosterFormat::detect(&bytes))
            .ok_or_else(|| Error::image_format(format!("unrecognised season poster at {}", url)))?;
        Ok(Some(Poster::new(bytes, format)))
    }
}

fn content_type(resp: &reqwest::Response) -> String {
    resp.headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn race_day() -> SessionDate {
        SessionDate::parse("2024-11-03", Some("17:00:00Z")).unwrap()
    }

    #[test]
    fn test_poster_id_without_alias() {
        let aliases = CircuitAliases::default();
        assert_eq!(aliases.poster_id("interlagos", &race_day()), "2024-11-03-interlagos");
    }

    #[test]
    fn test_circuit_alias() {
        let aliases = CircuitAliases::new(BTreeMap::from([(
            "interlagos".to_string(),
            "sao-paulo".to_string(),
        )]));
        assert_eq!(aliases.poster_id("interlagos", &race_day()), "2024-11-03-sao-paulo");
    }

    #[test]
    fn test_dated_alias_wins() {
        let aliases = CircuitAliases::new(BTreeMap::from([
            ("interlagos".to_string(), "sao-paulo".to_string()),
            (
                "2024-11-03-interlagos".to_string(),
                "2024-11-03-brazil-rain".to_string(),
            ),
        ]));
        assert_eq!(aliases.poster_id("interlagos", &race_day()), "2024-11-03-brazil-rain");
    }

    #[test]
    fn test_round_poster_url() {
        let source = EventArtworksPosters::new(
            "https://www.eventartworks.de/images/f1@1200/",
            CircuitAliases::default(),
            SeasonPosterTable::default(),
        )
        .unwrap();
        assert_eq!(
            source.round_poster_url("interlagos", &race_day()),
            "https://www.eventartworks.de/images/f1@1200/2024-11-03-interlagos.webp"
        );
    }
}
