//! Trait definitions for the remote data the reconciler depends on.
//!
//! The engine only talks to these traits, so a run can be driven by the HTTP
//! clients in [`providers`](super::providers) or by in-memory fakes.

use async_trait::async_trait;
use pitwall_common::{Result, Round, Season, SessionDate};

use crate::images::Poster;

/// Authoritative race calendar.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Short, lowercase identifier for log output (e.g. `"jolpica"`).
    fn name(&self) -> &'static str;

    /// Fetch every round of `year`.
    ///
    /// Fails with `Fetch` or `Timeout`, both of which abort only the season
    /// being processed.
    async fn get_season(&self, year: u32) -> Result<Season>;
}

/// Round and season artwork.
#[async_trait]
pub trait PosterSource: Send + Sync {
    /// Poster for the round held at `circuit_id` on `date`.
    ///
    /// `Ok(None)` means the source has no poster for the round. A poster of the
    /// wrong type is an `ImageFormat` error. Either way the caller falls back
    /// to the default image.
    async fn round_poster(&self, circuit_id: &str, date: &SessionDate) -> Result<Option<Poster>>;

    /// Poster for a whole season.
    async fn season_poster(&self, year: u32) -> Result<Option<Poster>>;
}

/// Plot text for rounds and seasons.
#[async_trait]
pub trait SynopsisSource: Send + Sync {
    async fn round_synopsis(&self, round: &Round) -> Result<Option<String>>;

    async fn season_synopsis(&self, year: u32) -> Result<Option<String>>;
}
