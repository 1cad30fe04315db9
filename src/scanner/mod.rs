//! Season directory reconciliation.
//!
//! A [`Reconciler`] walks the season directories under a base folder, finds
//! recordings without a metadata file, resolves each against the season's
//! race calendar and hands the resulting requests to a [`MetadataSink`].
//!
//! Per directory the flow is: list entries, drop recordings that already
//! have metadata, fetch the calendar (only when something is missing), write
//! the season record if absent, then process the missing recordings round by
//! round. A failure on one recording skips that recording; a calendar failure
//! aborts that directory only.

pub mod identifier;
pub mod report;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pitwall_common::paths::{file_stem, ARTWORK_DIR, SEASON_POSTER_STEM};
use pitwall_common::{Error, Result, Round, Season, SeasonLayout};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::images::{encode_for_storage, Poster, PosterArtwork, PosterFormat};
use crate::metadata::{CalendarSource, PosterSource, SynopsisSource};
use crate::nfo::{MetadataSink, RoundMetadataRequest, SeasonMetadataRequest, WriteOutcome};
use crate::rules::{session_title, OrderingPolicy, SessionClassifier};

pub use identifier::{EpisodeToken, EpisodeTokenParser};
pub use report::{PendingFile, RunReport, SeasonOutcome, SeasonReport, SkippedFile};

/// Extensions checked, in order, for a poster already stored for a recording.
const POSTER_EXTENSIONS: [&str; 4] = ["webp", "jpg", "jpeg", "png"];

/// The external services a [`Reconciler`] works against.
#[derive(Clone)]
pub struct Collaborators {
    pub calendar: Arc<dyn CalendarSource>,
    pub posters: Arc<dyn PosterSource>,
    pub synopses: Arc<dyn SynopsisSource>,
    pub sink: Arc<dyn MetadataSink>,
}

/// A recording lacking metadata.
#[derive(Debug, Clone)]
struct MissingFile {
    filename: String,
    token: EpisodeToken,
}

/// Entries of one season directory.
#[derive(Debug)]
struct SeasonListing {
    missing: Vec<MissingFile>,
    unparsed: Vec<SkippedFile>,
    /// File name of an existing `folder.*` image.
    season_poster: Option<String>,
    /// Whether `season.<ext>` exists, in any case.
    season_metadata_present: bool,
}

/// Reconciles season directories against the race calendar.
pub struct Reconciler {
    classifier: SessionClassifier,
    ordering: OrderingPolicy,
    tokens: EpisodeTokenParser,
    metadata_ext: String,
    convert_to_jpg: bool,
    mapped_root: Option<String>,
    dry_run: bool,
    collaborators: Collaborators,
}

impl Reconciler {
    pub fn new(config: &Config, collaborators: Collaborators) -> Result<Self> {
        Ok(Self {
            classifier: SessionClassifier::from_config(&config.sessions)?,
            ordering: OrderingPolicy::from_config(&config.ordering),
            tokens: EpisodeTokenParser::new(&config.library.season_episode_pattern)?,
            metadata_ext: config.library.metadata_extension.clone(),
            convert_to_jpg: config.artwork.convert_to_jpg,
            mapped_root: None,
            dry_run: false,
            collaborators,
        })
    }

    /// Root written into poster references instead of the local base folder,
    /// for media servers that see the library under another path.
    pub fn with_mapped_root(mut self, root: impl Into<String>) -> Self {
        self.mapped_root = Some(root.into());
        self
    }

    /// Resolve everything but write nothing.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Reconcile every season directory directly under `base`, in name order.
    ///
    /// Only an unreadable `base` is an error; problems inside a season
    /// directory are reported in its [`SeasonOutcome`].
    pub async fn run(&self, base: &Path) -> Result<RunReport> {
        if !base.is_dir() {
            return Err(Error::config(format!("base folder {:?} is not a directory", base)));
        }

        let mut report = RunReport::default();
        for dir in season_directories(base) {
            report.outcomes.push(self.reconcile_season(&dir).await);
        }

        info!(
            seasons = report.outcomes.len(),
            emitted = report.emitted(),
            skipped = report.skipped(),
            aborted = report.aborted(),
            "Reconciliation finished"
        );
        Ok(report)
    }

    /// Reconcile one season directory.
    pub async fn reconcile_season(&self, dir: &Path) -> SeasonOutcome {
        let layout = SeasonLayout::new(dir, &self.metadata_ext);
        let directory = dir.to_path_buf();

        let listing = match self.list_season(&layout) {
            Ok(listing) => listing,
            Err(error) => {
                error!(dir = %dir.display(), error = %error, "Cannot read season directory");
                return SeasonOutcome::Aborted { directory, error };
            }
        };

        let Some(first) = listing.missing.first() else {
            debug!(dir = %dir.display(), "Season directory is up to date");
            return SeasonOutcome::UpToDate { directory };
        };
        let year = first.token.season;

        if let Some(other) = listing.missing.iter().find(|f| f.token.season != year) {
            let error = Error::MixedSeasons {
                expected: year,
                found: other.token.season,
                file: other.filename.clone(),
            };
            error!(dir = %dir.display(), error = %error, "Refusing to process directory");
            return SeasonOutcome::Aborted { directory, error };
        }

        info!(
            season = year,
            dir = %dir.display(),
            missing = listing.missing.len(),
            "Reconciling season"
        );

        let season = match self.collaborators.calendar.get_season(year).await {
            Ok(season) => season,
            Err(error) => {
                error!(
                    season = year,
                    source = self.collaborators.calendar.name(),
                    retryable = error.is_retryable(),
                    error = %error,
                    "Calendar unavailable, skipping season"
                );
                return SeasonOutcome::Aborted { directory, error };
            }
        };

        let mut report = SeasonReport::new(year, directory);
        report.skipped.extend(listing.unparsed.iter().cloned());

        if !listing.season_metadata_present {
            report.season_metadata_written = self
                .emit_season_metadata(&layout, &season, listing.season_poster.as_deref())
                .await;
        }

        let mut by_round: BTreeMap<u32, Vec<&MissingFile>> = BTreeMap::new();
        for file in &listing.missing {
            by_round.entry(file.token.round).or_default().push(file);
        }

        for (number, files) in by_round {
            match season.lookup(number) {
                Some(round) => self.emit_round(&layout, round, &files, &mut report).await,
                None => {
                    for file in files {
                        let error = Error::Lookup { season: year, round: number };
                        warn!(season = year, round = number, file = %file.filename, "{}", error);
                        report.skip(&file.filename, error.to_string());
                    }
                }
            }
        }

        info!(
            season = year,
            emitted = report.emitted.len(),
            skipped = report.skipped.len(),
            "Season done"
        );
        SeasonOutcome::Completed(report)
    }

    fn list_season(&self, layout: &SeasonLayout) -> Result<SeasonListing> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(layout.dir())? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            } else {
                warn!(file = ?entry.file_name(), "Skipping non UTF-8 file name");
            }
        }
        names.sort();

        // Metadata markers match regardless of case, so `X.NFO` covers `X.mkv`.
        let metadata_names: HashSet<String> = names
            .iter()
            .filter(|name| layout.is_metadata_file(name))
            .map(|name| name.to_lowercase())
            .collect();

        let mut listing = SeasonListing {
            missing: Vec::new(),
            unparsed: Vec::new(),
            season_poster: None,
            season_metadata_present: metadata_names
                .contains(&layout.season_metadata_name().to_lowercase()),
        };

        for name in &names {
            if layout.is_season_poster(name) {
                listing.season_poster.get_or_insert_with(|| name.clone());
                continue;
            }
            if !layout.is_candidate(name) {
                continue;
            }

            let token = match self.tokens.parse(name) {
                Ok(Some(token)) => token,
                Ok(None) => {
                    debug!(file = %name, "No season/episode token, ignoring");
                    continue;
                }
                Err(e) => {
                    warn!(file = %name, error = %e, "Skipping file");
                    listing.unparsed.push(SkippedFile {
                        filename: name.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let metadata_name = layout.metadata_file_name(file_stem(name)).to_lowercase();
            if metadata_names.contains(&metadata_name) {
                continue;
            }

            listing.missing.push(MissingFile {
                filename: name.clone(),
                token,
            });
        }

        Ok(listing)
    }

    /// Write the season record. Returns whether a file was written.
    async fn emit_season_metadata(
        &self,
        layout: &SeasonLayout,
        season: &Season,
        existing_poster: Option<&str>,
    ) -> bool {
        let year = season.year;

        let (poster, poster_file) = match existing_poster {
            Some(name) => (PosterArtwork::Existing, name.to_string()),
            None => {
                let poster = match self.collaborators.posters.season_poster(year).await {
                    Ok(Some(poster)) => self.prepare_poster(poster),
                    Ok(None) => {
                        warn!(season = year, "No season poster, using default");
                        PosterArtwork::Default
                    }
                    Err(e) => {
                        warn!(season = year, error = %e, "Season poster failed, using default");
                        PosterArtwork::Default
                    }
                };
                let file = poster_file_name(SEASON_POSTER_STEM, &poster);
                (poster, file)
            }
        };

        let synopsis = match self.collaborators.synopses.season_synopsis(year).await {
            Ok(Some(text)) => text,
            Ok(None) => season_fallback(year),
            Err(e) => {
                warn!(season = year, error = %e, "Season synopsis unavailable");
                season_fallback(year)
            }
        };

        let request = SeasonMetadataRequest {
            season: year,
            title: format!("Season {}", year),
            synopsis,
            premiered: season.start_date().copied(),
            end_date: season.end_date().copied(),
            poster_ref: format!("{}/{}", self.season_reference(layout), poster_file),
            poster,
            poster_file,
        };

        if self.dry_run {
            info!(season = year, "Dry run: would write season metadata");
            return false;
        }

        match self.collaborators.sink.write_season_metadata(layout, &request) {
            Ok(outcome) => outcome == WriteOutcome::Written,
            Err(e) => {
                warn!(season = year, error = %e, "Failed to write season metadata");
                false
            }
        }
    }

    async fn emit_round(
        &self,
        layout: &SeasonLayout,
        round: &Round,
        files: &[&MissingFile],
        report: &mut SeasonReport,
    ) {
        let synopsis = match self.collaborators.synopses.round_synopsis(round).await {
            Ok(Some(text)) => text,
            Ok(None) => round_fallback(round),
            Err(e) => {
                warn!(season = round.season, round = round.round, error = %e, "Round synopsis unavailable");
                round_fallback(round)
            }
        };

        let mut fetched_poster: Option<PosterArtwork> = None;

        for file in files {
            let stem = file_stem(&file.filename);
            let session = self.classifier.classify(&file.filename);
            let sort_key = self.ordering.sort_key(round.season, session);

            let (poster, poster_file) = match existing_round_poster(layout, stem) {
                Some(name) => (PosterArtwork::Existing, name),
                None => {
                    let poster = match &fetched_poster {
                        Some(poster) => poster.clone(),
                        None => {
                            let poster = self.fetch_round_poster(round).await;
                            fetched_poster = Some(poster.clone());
                            poster
                        }
                    };
                    let name = poster_file_name(stem, &poster);
                    (poster, name)
                }
            };

            let request = RoundMetadataRequest {
                video_stem: stem.to_string(),
                session,
                season: round.season,
                episode: round.round,
                title: session_title(&round.race_name, session),
                sort_title: self.ordering.sort_title(&round.race_name, round.season, session),
                synopsis: synopsis.clone(),
                aired: round.session_date(session).copied(),
                poster_ref: format!(
                    "{}/{}/{}",
                    self.season_reference(layout),
                    ARTWORK_DIR,
                    poster_file
                ),
                poster,
                poster_file,
            };

            if request.aired.is_none() {
                warn!(
                    season = round.season,
                    round = round.round,
                    session = %session,
                    "Calendar has no date for this session"
                );
            }

            let pending = PendingFile {
                filename: file.filename.clone(),
                round: round.round,
                session_type: session,
                sort_key,
            };

            if self.dry_run {
                info!(file = %file.filename, session = %session, sort_key = %pending.sort_key, "Dry run: would write metadata");
                report.emitted.push(pending);
                continue;
            }

            match self.collaborators.sink.write_round_metadata(layout, &request) {
                Ok(WriteOutcome::Written) => report.emitted.push(pending),
                Ok(WriteOutcome::AlreadyPresent) => {
                    debug!(file = %file.filename, "Metadata appeared meanwhile");
                }
                Err(e) => {
                    warn!(file = %file.filename, error = %e, "Failed to write metadata");
                    report.skip(&file.filename, e.to_string());
                }
            }
        }
    }

    async fn fetch_round_poster(&self, round: &Round) -> PosterArtwork {
        let Some(date) = round.date.as_ref() else {
            warn!(season = round.season, round = round.round, "No race date for poster lookup, using default");
            return PosterArtwork::Default;
        };

        match self
            .collaborators
            .posters
            .round_poster(&round.circuit_id, date)
            .await
        {
            Ok(Some(poster)) => self.prepare_poster(poster),
            Ok(None) => {
                warn!(season = round.season, round = round.round, circuit = %round.circuit_id, "Round poster not found, using default");
                PosterArtwork::Default
            }
            Err(e) => {
                warn!(season = round.season, round = round.round, error = %e, "Round poster failed, using default");
                PosterArtwork::Default
            }
        }
    }

    /// Apply JPEG conversion; a poster that cannot be converted is replaced
    /// by the default image.
    fn prepare_poster(&self, poster: Poster) -> PosterArtwork {
        if !self.convert_to_jpg || poster.format == PosterFormat::Jpeg {
            return PosterArtwork::Fetched(poster);
        }
        match encode_for_storage(&poster, true) {
            Ok(bytes) => PosterArtwork::Fetched(Poster::new(bytes, PosterFormat::Jpeg)),
            Err(e) => {
                warn!(error = %e, "Poster conversion failed, using default");
                PosterArtwork::Default
            }
        }
    }

    /// Season directory as seen by the media server.
    fn season_reference(&self, layout: &SeasonLayout) -> String {
        match &self.mapped_root {
            Some(root) => format!("{}/{}", root.trim_end_matches('/'), layout.dir_name()),
            None => layout.dir().display().to_string(),
        }
    }
}

/// Name of the stored poster file for `stem`. The default image is JPEG.
fn poster_file_name(stem: &str, poster: &PosterArtwork) -> String {
    let ext = match poster {
        PosterArtwork::Fetched(poster) => poster.format.extension(),
        PosterArtwork::Default | PosterArtwork::Existing => PosterFormat::Jpeg.extension(),
    };
    format!("{}.{}", stem, ext)
}

fn existing_round_poster(layout: &SeasonLayout, stem: &str) -> Option<String> {
    POSTER_EXTENSIONS
        .iter()
        .map(|ext| layout.round_poster_path(stem, ext))
        .find(|path| path.is_file())
        .and_then(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
}

fn round_fallback(round: &Round) -> String {
    format!("{} {}", round.season, round.race_name)
}

fn season_fallback(year: u32) -> String {
    format!("{} Formula One season", year)
}

/// Directories under `base` that [`Reconciler::run`] would visit.
pub fn season_directories(base: &Path) -> Vec<PathBuf> {
    WalkDir::new(base)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir() && !e.file_name().to_string_lossy().starts_with('.'))
        .map(|e| e.into_path())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poster_file_names() {
        let webp = PosterArtwork::Fetched(Poster::new(vec![0u8], PosterFormat::Webp));
        assert_eq!(poster_file_name("F1-s2024e05-Sprint", &webp), "F1-s2024e05-Sprint.webp");
        assert_eq!(
            poster_file_name("F1-s2024e05-Sprint", &PosterArtwork::Default),
            "F1-s2024e05-Sprint.jpg"
        );
        assert_eq!(poster_file_name("folder", &PosterArtwork::Default), "folder.jpg");
    }

    #[test]
    fn test_existing_round_poster() {
        let dir = tempfile::tempdir().unwrap();
        let layout = SeasonLayout::new(dir.path(), "nfo");
        assert_eq!(existing_round_poster(&layout, "F1-s2024e01-Race"), None);

        std::fs::create_dir(dir.path().join("metadata")).unwrap();
        std::fs::write(dir.path().join("metadata/F1-s2024e01-Race.jpg"), b"x").unwrap();
        assert_eq!(
            existing_round_poster(&layout, "F1-s2024e01-Race").as_deref(),
            Some("F1-s2024e01-Race.jpg")
        );
    }

    #[test]
    fn test_fallback_texts() {
        let round = Round::new(2024, 1, "Bahrain Grand Prix", "bahrain");
        assert_eq!(round_fallback(&round), "2024 Bahrain Grand Prix");
        assert_eq!(season_fallback(2024), "2024 Formula One season");
    }

    #[test]
    fn test_season_directories_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Season 2024", "Season 2021", ".trash"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let dirs: Vec<_> = season_directories(dir.path())
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(dirs, vec!["Season 2021", "Season 2024"]);
    }
}
