mod types;

pub use types::*;

use anyhow::{Context, Result};
use pitwall_common::paths::normalize_extension;
use std::path::Path;

use crate::rules::SessionClassifier;
use crate::scanner::EpisodeTokenParser;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    prepare_config(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./pitwall.toml",
        "~/.config/pitwall/config.toml",
        "/etc/pitwall/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    let mut config = Config::default();
    prepare_config(&mut config);
    Ok(config)
}

fn prepare_config(config: &mut Config) {
    config.library.metadata_extension = normalize_extension(&config.library.metadata_extension);
    config.artwork.default_image = config
        .artwork
        .default_image
        .take()
        .map(|p| shellexpand::tilde(&p.to_string_lossy()).into_owned().into());
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.library.metadata_extension.is_empty() {
        anyhow::bail!("library.metadata_extension cannot be empty");
    }

    EpisodeTokenParser::new(&config.library.season_episode_pattern)
        .context("Invalid library.season_episode_pattern")?;

    SessionClassifier::from_rules(&config.sessions.rules())
        .context("Invalid session pattern")?;

    if config.ordering.cutover_season < 1950 {
        anyhow::bail!(
            "ordering.cutover_season {} predates the championship",
            config.ordering.cutover_season
        );
    }

    if config.sources.calendar_api.is_empty() {
        anyhow::bail!("sources.calendar_api cannot be empty");
    }

    if let Some(ref image) = config.artwork.default_image {
        if !image.exists() {
            tracing::warn!("Default image does not exist: {:?}", image);
        }
    }

    Ok(())
}
