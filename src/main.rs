//! lftracker - Main entry point

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lftracker::cli::{Cli, Commands, ConfigCommands};
use lftracker::process_guard;
use lftracker::repository::{PackageRepository, PacmanRepository};
use lftracker::resolver::DependencyResolver;
use lftracker::size::{SizeAggregator, humanize_size, to_display_unit};
use lftracker::{
    Backend, CatalogBuilder, CatalogStore, SectorFilter, TrackerConfig, apply, report,
};

/// Initialize logging on stderr; RUST_LOG overrides the default level
fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> Result<()> {
    let Cli {
        config: config_path,
        verbose,
        command,
    } = Cli::parse_args();
    init_logger(verbose);
    debug!("lftracker starting up");

    if let Err(e) = process_guard::install_signal_handlers() {
        warn!("Failed to initialize signal handlers: {}", e);
    }

    let command = match command {
        Some(Commands::Config { action }) => return run_config_command(action),
        other => other,
    };
    let config = load_config(config_path.as_deref())?;

    match command {
        None => run_report(&config, "All", !config.include_unreferenced, false, false),
        Some(Commands::Report {
            sector,
            dependents_only,
            show_dependents,
            json,
        }) => run_report(
            &config,
            &sector,
            dependents_only || !config.include_unreferenced,
            show_dependents,
            json,
        ),
        Some(Commands::Sectors) => {
            print_sectors(&config);
            Ok(())
        }
        Some(Commands::Classify { packages }) => {
            let classifier = config.classifier();
            for package in &packages {
                println!("{}\t{}", package, classifier.classify(package));
            }
            Ok(())
        }
        Some(Commands::Dependents { package }) => {
            let repo = open_repository(&config)?;
            let resolver = DependencyResolver::new(repo.as_ref());
            for dependent in resolver.reverse_dependents(&package) {
                println!("{}", dependent);
            }
            Ok(())
        }
        Some(Commands::Size { packages }) => {
            let repo = open_repository(&config)?;
            let sizes = SizeAggregator::new(repo.as_ref());
            for package in &packages {
                println!("{}\t{}", package, humanize_size(sizes.raw_size(package)));
            }
            println!("total\t{}", to_display_unit(sizes.aggregate(&packages)));
            Ok(())
        }
        Some(Commands::Config { .. }) => Ok(()),
    }
}

fn load_config(path: Option<&Path>) -> Result<TrackerConfig> {
    let config = match path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            TrackerConfig::load_from_file(path)?
        }
        None => TrackerConfig::default(),
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn open_repository(config: &TrackerConfig) -> Result<Arc<dyn PackageRepository>> {
    match config.backend {
        Backend::Pacman => Ok(Arc::new(
            PacmanRepository::new(&config.db_path, config.query_timeout())
                .with_reverse_depth(config.reverse_depth),
        )),
        #[cfg(feature = "alpm")]
        Backend::Alpm => Ok(Arc::new(lftracker::AlpmRepository::from_pacman_conf(
            &config.pacman_conf,
        )?)),
        #[cfg(not(feature = "alpm"))]
        Backend::Alpm => anyhow::bail!("backend \"alpm\" requires the alpm feature"),
    }
}

fn run_report(
    config: &TrackerConfig,
    sector: &str,
    dependents_only: bool,
    show_dependents: bool,
    json: bool,
) -> Result<()> {
    let repo = open_repository(config)?;
    let builder = CatalogBuilder::new(repo, config.classifier(), config.workers)?;
    debug!(workers = builder.workers(), "query pool ready");
    let store = CatalogStore::new();

    if let Err(e) = store.rebuild(&builder, !dependents_only) {
        error!("Catalog build failed: {}", e);
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
    let catalog = store.current().context("No catalog was published")?;

    let Ok(filter) = sector.parse::<SectorFilter>();
    let view = apply(&catalog, &filter);

    if json {
        println!("{}", report::render_json(&view, catalog.stats())?);
    } else {
        print!("{}", report::render_text(&view, show_dependents));
        if let Some(note) = report::soft_failure_note(&catalog.stats()) {
            eprintln!("{}", note);
        }
    }
    Ok(())
}

fn print_sectors(config: &TrackerConfig) {
    let classifier = config.classifier();
    println!("Sector order: {}", classifier.sector_order().join(", "));
    println!("Default sector: {}", classifier.default_sector());
    for (package, sector) in classifier.table() {
        println!("{}\t{}", package, sector);
    }
}

fn run_config_command(action: ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Init { path } => {
            TrackerConfig::default().save_to_file(&path)?;
            println!("✓ Default configuration written to {}", path.display());
        }
        ConfigCommands::Validate { path } => {
            let config = TrackerConfig::load_from_file(&path)?;
            match config.validate() {
                Ok(()) => println!("✓ Configuration file is valid: {}", path.display()),
                Err(e) => {
                    eprintln!("✗ Configuration validation failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
    Ok(())
}
