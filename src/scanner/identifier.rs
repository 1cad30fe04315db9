//! Season/round identification from filenames.
//!
//! Recordings carry an `sYYYYeNN` style token somewhere in their name. The
//! token pattern is configurable; named groups `season` and `round` are used
//! when the pattern has them, otherwise the first two digit runs of the match.

use pitwall_common::{Error, Result};
use regex::{Regex, RegexBuilder};

/// Season and round parsed from a filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EpisodeToken {
    pub season: u32,
    pub round: u32,
}

/// Finds the season/episode token in filenames.
#[derive(Debug, Clone)]
pub struct EpisodeTokenParser {
    regex: Regex,
}

impl EpisodeTokenParser {
    /// Compile `pattern` case-insensitively.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::config(format!("invalid season/episode pattern: {}", e)))?;
        Ok(Self { regex })
    }

    /// `Ok(None)` when the name has no token at all; `Err(Parse)` when a token
    /// is present but its numbers are unusable.
    pub fn parse(&self, filename: &str) -> Result<Option<EpisodeToken>> {
        let Some(caps) = self.regex.captures(filename) else {
            return Ok(None);
        };

        let (season, round) = match (caps.name("season"), caps.name("round")) {
            (Some(season), Some(round)) => (season.as_str(), round.as_str()),
            _ => {
                let Some(token) = caps.get(0) else {
                    return Ok(None);
                };
                let mut runs = token
                    .as_str()
                    .split(|c: char| !c.is_ascii_digit())
                    .filter(|run| !run.is_empty());
                match (runs.next(), runs.next()) {
                    (Some(season), Some(round)) => (season, round),
                    _ => {
                        return Err(Error::parse(format!(
                            "token {:?} in {:?} lacks season and round numbers",
                            token.as_str(),
                            filename
                        )))
                    }
                }
            }
        };

        let season = parse_number(season, filename)?;
        let round = parse_number(round, filename)?;
        if round == 0 {
            return Err(Error::parse(format!("round 0 in {:?}", filename)));
        }
        Ok(Some(EpisodeToken { season, round }))
    }
}

fn parse_number(digits: &str, filename: &str) -> Result<u32> {
    digits
        .parse()
        .map_err(|_| Error::parse(format!("invalid number {:?} in {:?}", digits, filename)))
}
