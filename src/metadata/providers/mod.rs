//! HTTP implementations of the metadata source traits.
//!
//! - [`JolpicaCalendar`] -- race calendar from the Jolpica (Ergast) API.
//! - [`WikipediaSynopsis`] -- intro extracts from the Wikipedia action API.
//! - [`EventArtworksPosters`] -- round posters from eventartworks.de, season
//!   posters from a [`SeasonPosterTable`].

mod eventartworks;
mod jolpica;
mod sportsdb;
mod wikipedia;

pub use eventartworks::{CircuitAliases, EventArtworksPosters};
pub use jolpica::JolpicaCalendar;
pub use sportsdb::SeasonPosterTable;
pub use wikipedia::WikipediaSynopsis;

use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use pitwall_common::{Error, Result};
use reqwest::StatusCode;
use tracing::warn;

const MAX_RETRIES: u32 = 3;

pub(crate) type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter allowing `per_second` requests.
pub(crate) fn rate_limiter(per_second: u32) -> DirectRateLimiter {
    let quota = Quota::per_second(NonZeroU32::new(per_second.max(1)).unwrap_or(NonZeroU32::MIN));
    RateLimiter::direct(quota)
}

/// A reqwest client with a per-request deadline.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("pitwall/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))
}

/// Map a transport error onto the source error kinds.
pub(crate) fn request_error(source: &str, url: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::timeout(format!("{} did not answer in time: {}", source, url))
    } else {
        Error::fetch(format!("{} request failed: {}: {}", source, url, err))
    }
}

/// GET `url`, backing off on HTTP 429.
///
/// The response is returned whatever its status; callers decide what a
/// non-success status means for them.
pub(crate) async fn get_with_retry(
    client: &reqwest::Client,
    limiter: Option<&DirectRateLimiter>,
    source: &str,
    url: &str,
) -> Result<reqwest::Response> {
    let mut retries = 0u32;
    loop {
        if let Some(limiter) = limiter {
            limiter.until_ready().await;
        }

        let resp = client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(source, url, e))?;

        if resp.status() == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RETRIES {
            retries += 1;
            let wait = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(1);
            warn!(source, retry = retries, wait_secs = wait, "Rate limited, backing off");
            tokio::time::sleep(Duration::from_secs(wait)).await;
            continue;
        }

        return Ok(resp);
    }
}
