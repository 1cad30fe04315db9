//! Session classification from filenames.
//!
//! A single recording name can legitimately match several rules: a
//! `SprintQuali` token also contains `Sprint` and `Quali`. Every rule is tested
//! and the match with the highest [`SessionType::precedence`] wins, so the order
//! in which rules are declared never changes the outcome.

use pitwall_common::{Error, Result, SessionType};
use regex::{Regex, RegexBuilder};

use crate::config::{ClassificationRule, SessionPatterns};

/// A classification rule with its pattern compiled case-insensitively.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub session_type: SessionType,
    regex: Regex,
}

impl CompiledRule {
    pub fn new(rule: &ClassificationRule) -> Result<Self> {
        let regex = RegexBuilder::new(&rule.pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                Error::config(format!(
                    "pattern {:?} for {} does not compile: {}",
                    rule.pattern, rule.session_type, e
                ))
            })?;

        Ok(Self {
            session_type: rule.session_type,
            regex,
        })
    }

    pub fn is_match(&self, filename: &str) -> bool {
        self.regex.is_match(filename)
    }
}

/// Classify `filename` against `rules`, returning the highest-precedence match
/// or [`SessionType::Race`] when nothing matches.
pub fn classify(filename: &str, rules: &[CompiledRule]) -> SessionType {
    rules
        .iter()
        .filter(|rule| rule.is_match(filename))
        .map(|rule| rule.session_type)
        .min_by_key(|session| session.precedence())
        .unwrap_or(SessionType::Race)
}

/// Compiled rule set used by the scanner.
#[derive(Debug, Clone)]
pub struct SessionClassifier {
    rules: Vec<CompiledRule>,
}

impl SessionClassifier {
    pub fn from_rules(rules: &[ClassificationRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(CompiledRule::new)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn from_config(patterns: &SessionPatterns) -> Result<Self> {
        Self::from_rules(&patterns.rules())
    }

    pub fn classify(&self, filename: &str) -> SessionType {
        classify(filename, &self.rules)
    }
}

impl Default for SessionClassifier {
    fn default() -> Self {
        Self::from_config(&SessionPatterns::default())
            .expect("default session patterns are valid")
    }
}
