//! Outcomes of a reconciliation run.

use std::path::PathBuf;

use pitwall_common::SessionType;

/// A recording that received metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub filename: String,
    pub round: u32,
    pub session_type: SessionType,
    pub sort_key: String,
}

/// A recording that was left without metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: String,
}

/// What happened in one season directory that needed work.
#[derive(Debug, Clone, Default)]
pub struct SeasonReport {
    pub season: u32,
    pub directory: PathBuf,
    pub emitted: Vec<PendingFile>,
    pub skipped: Vec<SkippedFile>,
    pub season_metadata_written: bool,
}

impl SeasonReport {
    pub fn new(season: u32, directory: PathBuf) -> Self {
        Self {
            season,
            directory,
            ..Default::default()
        }
    }

    pub(crate) fn skip(&mut self, filename: impl Into<String>, reason: impl Into<String>) {
        self.skipped.push(SkippedFile {
            filename: filename.into(),
            reason: reason.into(),
        });
    }
}

/// Result for one season directory.
#[derive(Debug)]
pub enum SeasonOutcome {
    /// Every recording already has metadata; nothing was fetched.
    UpToDate { directory: PathBuf },
    Completed(SeasonReport),
    /// The directory could not be processed at all.
    Aborted {
        directory: PathBuf,
        error: pitwall_common::Error,
    },
}

impl SeasonOutcome {
    pub fn directory(&self) -> &PathBuf {
        match self {
            Self::UpToDate { directory } | Self::Aborted { directory, .. } => directory,
            Self::Completed(report) => &report.directory,
        }
    }

    pub fn report(&self) -> Option<&SeasonReport> {
        match self {
            Self::Completed(report) => Some(report),
            _ => None,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

/// Outcomes of every season directory under a base folder, in scan order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<SeasonOutcome>,
}

impl RunReport {
    pub fn emitted(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(SeasonOutcome::report)
            .map(|r| r.emitted.len())
            .sum()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(SeasonOutcome::report)
            .map(|r| r.skipped.len())
            .sum()
    }

    pub fn aborted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_aborted()).count()
    }

    pub fn up_to_date(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SeasonOutcome::UpToDate { .. }))
            .count()
    }
}
