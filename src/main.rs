mod cli;

use pitwall::{
    config, fixtures,
    images::DefaultImage,
    metadata::providers::{
        CircuitAliases, EventArtworksPosters, JolpicaCalendar, SeasonPosterTable,
        WikipediaSynopsis,
    },
    nfo::NfoWriter,
    rules::{OrderingPolicy, SessionClassifier},
    scanner::{Collaborators, EpisodeTokenParser, Reconciler, RunReport, SeasonOutcome},
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise derive from the flags
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        let level = match (cli.verbose, cli.log_level) {
            (true, _) => "trace",
            (false, Some(level)) => level.as_str(),
            (false, None) => "info",
        };
        format!("warn,pitwall={0},pitwall_common={0}", level)
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            base,
            mapped_folder,
            convert_to_jpg,
            dry_run,
        } => {
            let mut config = config::load_config_or_default(cli.config.as_deref())?;
            if convert_to_jpg {
                config.artwork.convert_to_jpg = true;
            }
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_reconcile(&base, mapped_folder, dry_run, config))
        }
        Commands::Classify { files } => classify_files(&files, cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Fixtures { dir, clean } => {
            if clean {
                let removed = fixtures::clean(&dir)?;
                println!("Removed {} generated files", removed);
            } else {
                let created = fixtures::generate(&dir)?;
                println!("Created {} files under {}", created.len(), dir.display());
            }
            Ok(())
        }
        Commands::Version => {
            println!("pitwall {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn run_reconcile(
    base: &Path,
    mapped_folder: Option<String>,
    dry_run: bool,
    config: config::Config,
) -> Result<()> {
    if !base.is_dir() {
        anyhow::bail!("Base folder does not exist: {:?}", base);
    }

    let calendar = JolpicaCalendar::new(&config.sources.calendar_api)?;
    calendar
        .check_connection()
        .await
        .with_context(|| format!("Calendar API is not usable: {}", config.sources.calendar_api))?;

    let season_posters = if config.sources.season_posters_url.trim().is_empty() {
        SeasonPosterTable::default()
    } else {
        match SeasonPosterTable::fetch(&config.sources.season_posters_url).await {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!("Season posters unavailable, using defaults: {}", e);
                SeasonPosterTable::default()
            }
        }
    };

    let posters = EventArtworksPosters::new(
        &config.sources.poster_base_url,
        CircuitAliases::new(config.circuit_aliases.clone()),
        season_posters,
    )?;
    let synopses = WikipediaSynopsis::new(&config.sources.wikipedia_api)?;
    let default_image = DefaultImage::load(config.artwork.default_image.as_deref())?;

    let collaborators = Collaborators {
        calendar: Arc::new(calendar),
        posters: Arc::new(posters),
        synopses: Arc::new(synopses),
        sink: Arc::new(NfoWriter::new(default_image)),
    };

    let mut reconciler = Reconciler::new(&config, collaborators)?.with_dry_run(dry_run);
    if let Some(root) = mapped_folder {
        reconciler = reconciler.with_mapped_root(root);
    }

    tracing::info!("Reconciling {}", base.display());
    let report = reconciler.run(base).await?;
    print_report(&report, dry_run);
    Ok(())
}

fn print_report(report: &RunReport, dry_run: bool) {
    let verb = if dry_run { "would write" } else { "wrote" };
    for outcome in &report.outcomes {
        let dir = outcome.directory().display();
        match outcome {
            SeasonOutcome::UpToDate { .. } => println!("{}: up to date", dir),
            SeasonOutcome::Completed(season) => {
                println!(
                    "{}: season {} {} {} file(s), skipped {}",
                    dir,
                    season.season,
                    verb,
                    season.emitted.len(),
                    season.skipped.len()
                );
                for skipped in &season.skipped {
                    println!("  skipped {}: {}", skipped.filename, skipped.reason);
                }
            }
            SeasonOutcome::Aborted { error, .. } if error.is_retryable() => {
                println!("{}: aborted, will be retried next run: {}", dir, error)
            }
            SeasonOutcome::Aborted { error, .. } => println!("{}: aborted: {}", dir, error),
        }
    }
    println!(
        "Done: {} emitted, {} skipped, {} aborted, {} up to date",
        report.emitted(),
        report.skipped(),
        report.aborted(),
        report.up_to_date()
    );
}

fn classify_files(files: &[String], config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let classifier = SessionClassifier::from_config(&config.sessions)?;
    let ordering = OrderingPolicy::from_config(&config.ordering);
    let tokens = EpisodeTokenParser::new(&config.library.season_episode_pattern)?;

    for file in files {
        let name = Path::new(file)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.clone());
        let session = classifier.classify(&name);

        match tokens.parse(&name) {
            Ok(Some(token)) => println!(
                "{}\tseason {} round {}\t{}\tsort key {}",
                name,
                token.season,
                token.round,
                session,
                ordering.sort_key(token.season, session)
            ),
            Ok(None) => println!("{}\tno season/episode token\t{}", name, session),
            Err(e) => println!("{}\t{}\t{}", name, e, session),
        }
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("✓ Configuration is valid");
    println!("  Metadata extension: .{}", config.library.metadata_extension);
    println!("  Episode pattern: {}", config.library.season_episode_pattern);
    println!("  Session rules: {}", config.sessions.rules().len());
    println!("  Cutover season: {}", config.ordering.cutover_season);
    println!("  Convert to JPEG: {}", config.artwork.convert_to_jpg);
    println!("  Calendar API: {}", config.sources.calendar_api);
    println!("  Circuit aliases: {}", config.circuit_aliases.len());

    Ok(())
}
