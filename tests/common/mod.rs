//! Shared test harness for reconciliation tests.
//!
//! Provides in-memory [`CalendarSource`], [`PosterSource`] and
//! [`SynopsisSource`] fakes plus a [`RecordingSink`] that keeps every request
//! before handing it to the real [`NfoWriter`].

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use tempfile::TempDir;

use pitwall::config::Config;
use pitwall::images::{DefaultImage, Poster, PosterFormat};
use pitwall::metadata::{CalendarSource, PosterSource, SynopsisSource};
use pitwall::nfo::{
    MetadataSink, NfoWriter, RoundMetadataRequest, SeasonMetadataRequest, WriteOutcome,
};
use pitwall::scanner::{Collaborators, Reconciler};
use pitwall_common::{Error, Result, Round, Season, SeasonLayout, SessionDate};

/// Fake poster bytes; only decoded when conversion is enabled.
pub const WEBP_BYTES: &[u8] = b"RIFF\x1a\x00\x00\x00WEBPVP8 fake";

pub fn date(day: &str, time: &str) -> Option<SessionDate> {
    Some(SessionDate::parse(day, Some(time)).unwrap())
}

/// Round 5 of 2024, a sprint weekend after the format change.
pub fn chinese_gp_2024() -> Round {
    let mut round = Round::new(2024, 5, "Chinese Grand Prix", "shanghai");
    round.wiki_url = Some("https://en.wikipedia.org/wiki/2024_Chinese_Grand_Prix".to_string());
    round.date = date("2024-04-21", "07:00:00Z");
    round.first_practice = date("2024-04-19", "03:30:00Z");
    round.sprint_qualifying = date("2024-04-19", "07:30:00Z");
    round.sprint = date("2024-04-20", "03:00:00Z");
    round.qualifying = date("2024-04-20", "07:00:00Z");
    round
}

/// A season with rounds `1..=count`, each dated a week apart from March 2nd.
/// Round 5 is the Chinese sprint weekend when the season is 2024.
pub fn season(year: u32, count: u32) -> Season {
    let start = NaiveDate::from_ymd_opt(year as i32, 3, 2).unwrap();
    let rounds = (1..=count)
        .map(|n| {
            if year == 2024 && n == 5 {
                return chinese_gp_2024();
            }
            let mut round = Round::new(year, n, format!("Grand Prix {}", n), format!("circuit{}", n));
            let day = start + chrono::Duration::weeks(i64::from(n - 1));
            round.date = Some(SessionDate::new(day, None));
            round.qualifying = Some(SessionDate::new(day - chrono::Duration::days(1), None));
            round.first_practice = Some(SessionDate::new(day - chrono::Duration::days(2), None));
            round
        })
        .collect();
    Season::new(year, rounds).unwrap()
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeCalendar {
    seasons: HashMap<u32, Season>,
    failing: HashSet<u32>,
    calls: Mutex<Vec<u32>>,
}

impl FakeCalendar {
    pub fn with_season(mut self, season: Season) -> Self {
        self.seasons.insert(season.year, season);
        self
    }

    pub fn failing(mut self, year: u32) -> Self {
        self.failing.insert(year);
        self
    }

    pub fn calls(&self) -> Vec<u32> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarSource for FakeCalendar {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn get_season(&self, year: u32) -> Result<Season> {
        self.calls.lock().unwrap().push(year);
        if self.failing.contains(&year) {
            return Err(Error::fetch(format!("HTTP 503 for {}", year)));
        }
        self.seasons
            .get(&year)
            .cloned()
            .ok_or_else(|| Error::fetch(format!("no calendar for {}", year)))
    }
}

#[derive(Clone)]
pub enum PosterMode {
    Found(Poster),
    NotFound,
    WrongType,
    Unreachable,
}

pub struct FakePosters {
    round: PosterMode,
    season: PosterMode,
    round_calls: Mutex<usize>,
    season_calls: Mutex<usize>,
}

impl FakePosters {
    pub fn new(round: PosterMode, season: PosterMode) -> Self {
        Self {
            round,
            season,
            round_calls: Mutex::new(0),
            season_calls: Mutex::new(0),
        }
    }

    pub fn webp() -> Self {
        let poster = Poster::new(WEBP_BYTES.to_vec(), PosterFormat::Webp);
        Self::new(PosterMode::Found(poster.clone()), PosterMode::Found(poster))
    }

    pub fn round_calls(&self) -> usize {
        *self.round_calls.lock().unwrap()
    }

    pub fn season_calls(&self) -> usize {
        *self.season_calls.lock().unwrap()
    }

    fn answer(mode: &PosterMode) -> Result<Option<Poster>> {
        match mode {
            PosterMode::Found(poster) => Ok(Some(poster.clone())),
            PosterMode::NotFound => Ok(None),
            PosterMode::WrongType => Err(Error::image_format("text/html")),
            PosterMode::Unreachable => Err(Error::timeout("posters")),
        }
    }
}

#[async_trait]
impl PosterSource for FakePosters {
    async fn round_poster(&self, _circuit_id: &str, _date: &SessionDate) -> Result<Option<Poster>> {
        *self.round_calls.lock().unwrap() += 1;
        Self::answer(&self.round)
    }

    async fn season_poster(&self, _year: u32) -> Result<Option<Poster>> {
        *self.season_calls.lock().unwrap() += 1;
        Self::answer(&self.season)
    }
}

#[derive(Default)]
pub struct FakeSynopses {
    pub unavailable: bool,
}

#[async_trait]
impl SynopsisSource for FakeSynopses {
    async fn round_synopsis(&self, round: &Round) -> Result<Option<String>> {
        if self.unavailable {
            return Err(Error::timeout("wikipedia"));
        }
        Ok(Some(format!("The {} {}.", round.season, round.race_name)))
    }

    async fn season_synopsis(&self, year: u32) -> Result<Option<String>> {
        if self.unavailable {
            return Ok(None);
        }
        Ok(Some(format!("The {} FIA Formula One World Championship.", year)))
    }
}

/// Keeps every request, then writes through [`NfoWriter`]. Recordings listed
/// in `failing` get a write error instead.
pub struct RecordingSink {
    writer: NfoWriter,
    failing: HashSet<String>,
    pub rounds: Mutex<Vec<RoundMetadataRequest>>,
    pub seasons: Mutex<Vec<SeasonMetadataRequest>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            writer: NfoWriter::new(DefaultImage::generated().unwrap())
                .with_date_added(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
            failing: HashSet::new(),
            rounds: Mutex::new(Vec::new()),
            seasons: Mutex::new(Vec::new()),
        }
    }

    /// Fail every write for the recording with this stem.
    pub fn failing_for(mut self, video_stem: &str) -> Self {
        self.failing.insert(video_stem.to_string());
        self
    }

    pub fn rounds(&self) -> Vec<RoundMetadataRequest> {
        self.rounds.lock().unwrap().clone()
    }

    pub fn seasons(&self) -> Vec<SeasonMetadataRequest> {
        self.seasons.lock().unwrap().clone()
    }
}

impl MetadataSink for RecordingSink {
    fn write_round_metadata(
        &self,
        layout: &SeasonLayout,
        request: &RoundMetadataRequest,
    ) -> Result<WriteOutcome> {
        self.rounds.lock().unwrap().push(request.clone());
        if self.failing.contains(&request.video_stem) {
            return Err(Error::write(
                layout.round_metadata_path(&request.video_stem),
                "No space left on device",
            ));
        }
        self.writer.write_round_metadata(layout, request)
    }

    fn write_season_metadata(
        &self,
        layout: &SeasonLayout,
        request: &SeasonMetadataRequest,
    ) -> Result<WriteOutcome> {
        self.seasons.lock().unwrap().push(request.clone());
        self.writer.write_season_metadata(layout, request)
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// A temporary library plus the fakes a [`Reconciler`] runs against.
pub struct TestHarness {
    pub base: TempDir,
    pub config: Config,
    pub calendar: Arc<FakeCalendar>,
    pub posters: Arc<FakePosters>,
    pub synopses: Arc<FakeSynopses>,
    pub sink: Arc<RecordingSink>,
}

impl TestHarness {
    pub fn new(calendar: FakeCalendar, posters: FakePosters) -> Self {
        Self {
            base: tempfile::tempdir().unwrap(),
            config: Config::default(),
            calendar: Arc::new(calendar),
            posters: Arc::new(posters),
            synopses: Arc::new(FakeSynopses::default()),
            sink: Arc::new(RecordingSink::new()),
        }
    }

    pub fn with_sink(mut self, sink: RecordingSink) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn reconciler(&self) -> Reconciler {
        let collaborators = Collaborators {
            calendar: self.calendar.clone(),
            posters: self.posters.clone(),
            synopses: self.synopses.clone(),
            sink: self.sink.clone(),
        };
        Reconciler::new(&self.config, collaborators).unwrap()
    }

    /// Create `dir` under the base folder and touch `files` in it.
    pub fn season_dir(&self, dir: &str, files: &[&str]) -> PathBuf {
        let path = self.base.path().join(dir);
        std::fs::create_dir_all(&path).unwrap();
        for file in files {
            std::fs::write(path.join(file), b"").unwrap();
        }
        path
    }
}

/// Names of the regular files directly inside `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
