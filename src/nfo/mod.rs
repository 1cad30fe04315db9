//! Metadata output.
//!
//! The engine hands fully resolved requests to a [`MetadataSink`]; the sink
//! only decides how they land on disk. [`NfoWriter`] writes Kodi/Jellyfin
//! NFO files and stores the posters they reference.

mod document;
mod writer;

pub use document::{render_episode, render_season};
pub use writer::NfoWriter;

use pitwall_common::{Result, SeasonLayout, SessionDate, SessionType};

use crate::images::PosterArtwork;

/// Metadata for one session recording.
#[derive(Debug, Clone)]
pub struct RoundMetadataRequest {
    /// File name of the video without extension.
    pub video_stem: String,
    pub session: SessionType,
    pub season: u32,
    /// Round number, used as the episode number.
    pub episode: u32,
    pub title: String,
    pub sort_title: String,
    pub synopsis: String,
    pub aired: Option<SessionDate>,
    pub poster: PosterArtwork,
    /// Poster file name inside the artwork directory.
    pub poster_file: String,
    /// Poster path as written into the record.
    pub poster_ref: String,
}

/// Metadata for a season directory.
#[derive(Debug, Clone)]
pub struct SeasonMetadataRequest {
    pub season: u32,
    pub title: String,
    pub synopsis: String,
    pub premiered: Option<SessionDate>,
    pub end_date: Option<SessionDate>,
    pub poster: PosterArtwork,
    /// Poster file name inside the season directory.
    pub poster_file: String,
    pub poster_ref: String,
}

/// What a sink call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The metadata file already existed and was left alone.
    AlreadyPresent,
}

/// Destination for generated metadata.
///
/// Implementations must never overwrite an existing metadata file: its
/// presence is what marks a recording as processed.
pub trait MetadataSink: Send + Sync {
    fn write_round_metadata(
        &self,
        layout: &SeasonLayout,
        request: &RoundMetadataRequest,
    ) -> Result<WriteOutcome>;

    fn write_season_metadata(
        &self,
        layout: &SeasonLayout,
        request: &SeasonMetadataRequest,
    ) -> Result<WriteOutcome>;
}
