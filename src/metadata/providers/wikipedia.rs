//! Wikipedia intro extracts used as plot text.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use pitwall_common::{Error, Result, Round};
use serde::Deserialize;
use tracing::debug;

use super::{build_client, get_with_retry, request_error};
use crate::metadata::provider::SynopsisSource;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
/// Paragraphs of a round article kept as plot.
const ROUND_PARAGRAPHS: usize = 2;
const SOURCE: &str = "wikipedia";

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<Query>,
}

#[derive(Debug, Deserialize)]
struct Query {
    #[serde(default)]
    pages: BTreeMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    extract: Option<String>,
}

/// Reads article intros through the MediaWiki action API.
pub struct WikipediaSynopsis {
    client: reqwest::Client,
    api_url: String,
}

impl WikipediaSynopsis {
    /// `api_url` is the `api.php` endpoint, e.g. `https://en.wikipedia.org/w/api.php`.
    pub fn new(api_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client(REQUEST_TIMEOUT)?,
            api_url: api_url.into(),
        })
    }

    async fn intro(&self, title: &str) -> Result<Option<String>> {
        let url = format!(
            "{}?action=query&prop=extracts&exintro=1&explaintext=1&redirects=1&format=json&titles={}",
            self.api_url,
            urlencoding::encode(title)
        );
        debug!(title, "Fetching Wikipedia extract");

        let resp = get_with_retry(&self.client, None, SOURCE, &url).await?;
        if !resp.status().is_success() {
            return Err(Error::fetch(format!(
                "Wikipedia returned HTTP {} for {:?}",
                resp.status(),
                title
            )));
        }

        let body: QueryResponse = resp
            .json()
            .await
            .map_err(|e| request_error(SOURCE, &url, e))?;

        Ok(body
            .query
            .and_then(|q| q.pages.into_values().find_map(|p| p.extract))
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty()))
    }
}

#[async_trait]
impl SynopsisSource for WikipediaSynopsis {
    async fn round_synopsis(&self, round: &Round) -> Result<Option<String>> {
        let Some(title) = round.wiki_url.as_deref().and_then(article_title) else {
            return Ok(None);
        };
        Ok(self
            .intro(&title)
            .await?
            .map(|text| leading_paragraphs(&text, ROUND_PARAGRAPHS)))
    }

    async fn season_synopsis(&self, year: u32) -> Result<Option<String>> {
        self.intro(&format!("{}_Formula_One_season", year)).await
    }
}

/// Article title from a `.../wiki/<Title>` URL, percent-decoded.
pub(crate) fn article_title(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    let (_, raw) = path.rsplit_once("/wiki/")?;
    let raw = raw.trim_end_matches('/');
    if raw.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(raw).ok()?;
    Some(decoded.into_owned())
}

fn leading_paragraphs(text: &str, count: usize) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(count)
        .collect::<Vec<_>>()
        .join("\n")
}
