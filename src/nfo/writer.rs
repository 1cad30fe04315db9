//! Filesystem [`MetadataSink`] writing NFO files and posters.

use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use pitwall_common::{Error, Result, SeasonLayout};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::{
    render_episode, render_season, MetadataSink, RoundMetadataRequest, SeasonMetadataRequest,
    WriteOutcome,
};
use crate::images::{DefaultImage, PosterArtwork};

/// Writes NFO files next to the videos and posters beside them.
pub struct NfoWriter {
    default_image: DefaultImage,
    date_added: Option<NaiveDate>,
}

impl NfoWriter {
    pub fn new(default_image: DefaultImage) -> Self {
        Self {
            default_image,
            date_added: None,
        }
    }

    /// Pin the `dateadded` value instead of using today's date.
    pub fn with_date_added(mut self, date: NaiveDate) -> Self {
        self.date_added = Some(date);
        self
    }

    fn date_added(&self) -> NaiveDate {
        self.date_added
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Store the poster for a request, unless a file is already there.
    fn store_poster(&self, poster: &PosterArtwork, path: &Path) -> Result<()> {
        let bytes = match poster {
            PosterArtwork::Existing => return Ok(()),
            PosterArtwork::Fetched(poster) => &poster.bytes[..],
            PosterArtwork::Default => self.default_image.bytes(),
        };
        if path.exists() {
            debug!(path = %path.display(), "Poster already present");
            return Ok(());
        }
        write_new_file(path, bytes)?;
        debug!(path = %path.display(), default = poster.is_default(), "Stored poster");
        Ok(())
    }
}

impl MetadataSink for NfoWriter {
    fn write_round_metadata(
        &self,
        layout: &SeasonLayout,
        request: &RoundMetadataRequest,
    ) -> Result<WriteOutcome> {
        let nfo_path = layout.round_metadata_path(&request.video_stem);
        if nfo_path.exists() {
            return Ok(WriteOutcome::AlreadyPresent);
        }

        let artwork_dir = layout.artwork_dir();
        std::fs::create_dir_all(&artwork_dir)
            .map_err(|e| Error::write(&artwork_dir, e.to_string()))?;
        self.store_poster(&request.poster, &artwork_dir.join(&request.poster_file))?;

        let document = render_episode(request, self.date_added())
            .map_err(|e| Error::write(&nfo_path, e.to_string()))?;
        let outcome = write_new_file(&nfo_path, &document)?;

        info!(
            season = request.season,
            round = request.episode,
            session = %request.session,
            file = %nfo_path.display(),
            "Wrote episode metadata"
        );
        Ok(outcome)
    }

    fn write_season_metadata(
        &self,
        layout: &SeasonLayout,
        request: &SeasonMetadataRequest,
    ) -> Result<WriteOutcome> {
        let nfo_path = layout.season_metadata_path();
        if nfo_path.exists() {
            return Ok(WriteOutcome::AlreadyPresent);
        }

        self.store_poster(&request.poster, &layout.dir().join(&request.poster_file))?;

        let document = render_season(request, self.date_added())
            .map_err(|e| Error::write(&nfo_path, e.to_string()))?;
        let outcome = write_new_file(&nfo_path, &document)?;

        info!(season = request.season, file = %nfo_path.display(), "Wrote season metadata");
        Ok(outcome)
    }
}

/// Write `bytes` to `path` through a temp file in the same directory, so a
/// partially written file never appears under the final name. An existing
/// file at `path` is left untouched.
fn write_new_file(path: &Path, bytes: &[u8]) -> Result<WriteOutcome> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::write(path, "path has no parent directory"))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::write(path, e.to_string()))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| Error::write(path, e.to_string()))?;

    match tmp.persist_noclobber(path) {
        Ok(_) => Ok(WriteOutcome::Written),
        Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
            Ok(WriteOutcome::AlreadyPresent)
        }
        Err(e) => Err(Error::write(path, e.error.to_string())),
    }
}
