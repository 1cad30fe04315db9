use pitwall_common::SessionType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub library: LibraryConfig,

    #[serde(default)]
    pub sessions: SessionPatterns,

    #[serde(default)]
    pub ordering: OrderingConfig,

    #[serde(default)]
    pub artwork: ArtworkConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    /// Poster id aliases. A `<date>-<circuit>` key maps to a complete image id,
    /// a bare `<circuit>` key maps to the circuit name the artwork site uses.
    #[serde(default)]
    pub circuit_aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConfig {
    /// Extension of generated metadata files, without the dot.
    #[serde(default = "default_metadata_extension")]
    pub metadata_extension: String,

    /// Regex locating the season/episode token in a filename. Named groups
    /// `season` and `round` are used when present, otherwise the first two
    /// digit runs of the match.
    #[serde(default = "default_season_episode_pattern")]
    pub season_episode_pattern: String,
}

fn default_metadata_extension() -> String {
    "nfo".to_string()
}

fn default_season_episode_pattern() -> String {
    r"s(?P<season>\d{4})e(?P<round>\d+)".to_string()
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            metadata_extension: default_metadata_extension(),
            season_episode_pattern: default_season_episode_pattern(),
        }
    }
}

/// One case-insensitive pattern per session type. An empty pattern disables
/// the rule.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionPatterns {
    #[serde(default = "default_sprint_qualifying")]
    pub sprint_qualifying: String,

    #[serde(default = "default_sprint")]
    pub sprint: String,

    #[serde(default = "default_qualifying")]
    pub qualifying: String,

    #[serde(default = "default_free_practice")]
    pub free_practice: String,

    #[serde(default = "default_fp1")]
    pub free_practice_1: String,

    #[serde(default = "default_fp2")]
    pub free_practice_2: String,

    #[serde(default = "default_fp3")]
    pub free_practice_3: String,

    /// Race files need no pattern; anything unmatched is a race.
    #[serde(default)]
    pub race: Option<String>,
}

fn default_sprint_qualifying() -> String {
    r"sprint[ ._-]?(quali|shootout)".to_string()
}
fn default_sprint() -> String {
    "sprint".to_string()
}
fn default_qualifying() -> String {
    "quali".to_string()
}
fn default_free_practice() -> String {
    r"free[ ._-]?practice".to_string()
}
fn default_fp1() -> String {
    "fp1".to_string()
}
fn default_fp2() -> String {
    "fp2".to_string()
}
fn default_fp3() -> String {
    "fp3".to_string()
}

impl Default for SessionPatterns {
    fn default() -> Self {
        Self {
            sprint_qualifying: default_sprint_qualifying(),
            sprint: default_sprint(),
            qualifying: default_qualifying(),
            free_practice: default_free_practice(),
            free_practice_1: default_fp1(),
            free_practice_2: default_fp2(),
            free_practice_3: default_fp3(),
            race: None,
        }
    }
}

impl SessionPatterns {
    /// The configured patterns as classification rules, skipping empty ones.
    pub fn rules(&self) -> Vec<ClassificationRule> {
        let mut pairs = vec![
            (SessionType::SprintQualifying, self.sprint_qualifying.as_str()),
            (SessionType::Sprint, self.sprint.as_str()),
            (SessionType::Qualifying, self.qualifying.as_str()),
            (SessionType::FreePractice, self.free_practice.as_str()),
            (SessionType::FreePractice1, self.free_practice_1.as_str()),
            (SessionType::FreePractice2, self.free_practice_2.as_str()),
            (SessionType::FreePractice3, self.free_practice_3.as_str()),
        ];
        if let Some(race) = self.race.as_deref() {
            pairs.push((SessionType::Race, race));
        }

        pairs
            .into_iter()
            .filter(|(_, pattern)| !pattern.trim().is_empty())
            .map(|(session_type, pattern)| ClassificationRule {
                session_type,
                pattern: pattern.to_string(),
            })
            .collect()
    }
}

/// A filename pattern that identifies one session type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClassificationRule {
    pub session_type: SessionType,
    pub pattern: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrderingConfig {
    /// First season in which sprint sessions sort ahead of qualifying.
    #[serde(default = "default_cutover_season")]
    pub cutover_season: u32,
}

fn default_cutover_season() -> u32 {
    2024
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            cutover_season: default_cutover_season(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArtworkConfig {
    /// Store posters as JPEG instead of the WebP the artwork site serves.
    #[serde(default)]
    pub convert_to_jpg: bool,

    /// Image used when no poster can be fetched. A plain generated JPEG is
    /// used when unset.
    #[serde(default)]
    pub default_image: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourcesConfig {
    #[serde(default = "default_calendar_api")]
    pub calendar_api: String,

    #[serde(default = "default_wikipedia_api")]
    pub wikipedia_api: String,

    #[serde(default = "default_poster_base_url")]
    pub poster_base_url: String,

    /// Season poster listing. Leave empty to skip season posters.
    #[serde(default = "default_season_posters_url")]
    pub season_posters_url: String,
}

fn default_calendar_api() -> String {
    "https://api.jolpi.ca/ergast/f1".to_string()
}
fn default_wikipedia_api() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}
fn default_poster_base_url() -> String {
    "https://www.eventartworks.de/images/f1@1200".to_string()
}
fn default_season_posters_url() -> String {
    "https://www.thesportsdb.com/api/v1/json/3/search_all_seasons.php?id=4370&poster=1".to_string()
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            calendar_api: default_calendar_api(),
            wikipedia_api: default_wikipedia_api(),
            poster_base_url: default_poster_base_url(),
            season_posters_url: default_season_posters_url(),
        }
    }
}
