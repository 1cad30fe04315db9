//! Synthetic season trees for manual runs.
//!
//! Creates empty video files named the way recordings usually arrive, for a
//! classic sprint season (2021) and a season after the sprint format change
//! (2024), so a full run against the live sources can be checked by eye.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};
use walkdir::WalkDir;

const VIDEO_EXTENSIONS: [&str; 3] = ["avi", "mp4", "mkv"];
const SUFFIX_LEN: usize = 20;

/// Session part of a generated file name; empty for an unlabelled race.
const RACE: &str = "Race";
const UNLABELLED: &str = "";
const FREE_PRACTICE: &str = "Free practice";
const FP1: &str = "FP1";
const FP2: &str = "FP2";
const FP3: &str = "FP3";
const QUALI: &str = "QUALI";
const SPRINT_QUALI: &str = "SprintQuali";
const SPRINT: &str = "Sprint";

/// `(season, round, sessions)` of every generated round.
const ROUNDS: &[(u32, u32, &[&str])] = &[
    (2021, 1, &[UNLABELLED, FREE_PRACTICE]),
    (2021, 9, &[RACE, FP2, QUALI]),
    (2021, 10, &[UNLABELLED, SPRINT]),
    (2021, 14, &[FP1, FP2, FP3, QUALI, SPRINT, RACE]),
    (2024, 1, &[RACE, FP2, QUALI]),
    (2024, 5, &[UNLABELLED, SPRINT_QUALI, SPRINT]),
    (2024, 21, &[FP1, QUALI, SPRINT_QUALI, SPRINT, RACE]),
    (2024, 23, &[SPRINT, RACE]),
];

/// Metadata and artwork extensions removed by [`clean`].
const GENERATED_EXTENSIONS: [&str; 4] = ["nfo", "jpg", "webp", "png"];

/// Create the fixture tree under `base`. Returns the created files.
pub fn generate(base: &Path) -> Result<Vec<PathBuf>> {
    let mut rng = rand::thread_rng();
    let mut created = Vec::new();

    for (season, round, sessions) in ROUNDS {
        let dir = base.join(season.to_string());
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create season folder: {:?}", dir))?;

        for session in sessions.iter() {
            let suffix: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(SUFFIX_LEN)
                .map(char::from)
                .collect();
            let ext = VIDEO_EXTENSIONS.choose(&mut rng).copied().unwrap_or("mkv");
            let label = if session.is_empty() {
                String::new()
            } else {
                format!("{} ", session)
            };
            let name = format!(
                "Formula 1 - s{}e{:02} - {}{}.{}",
                season, round, label, suffix, ext
            );

            let path = dir.join(name);
            std::fs::File::create(&path)
                .with_context(|| format!("Failed to create fixture: {:?}", path))?;
            debug!(file = %path.display(), "Created fixture");
            created.push(path);
        }
    }

    info!(files = created.len(), base = %base.display(), "Generated fixture tree");
    Ok(created)
}

/// Remove generated metadata and artwork under `base`, keeping the videos.
/// Returns the number of removed files.
pub fn clean(base: &Path) -> Result<usize> {
    let mut removed = 0;
    for entry in WalkDir::new(base).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let generated = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| GENERATED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if generated {
            std::fs::remove_file(entry.path())
                .with_context(|| format!("Failed to remove {:?}", entry.path()))?;
            debug!(file = %entry.path().display(), "Removed");
            removed += 1;
        }
    }
    info!(removed, base = %base.display(), "Cleaned fixture tree");
    Ok(removed)
}
