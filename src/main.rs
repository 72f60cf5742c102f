//! Bateau CLI
//!
//! Command-line interface for filtering containers and images:
//! - Run a filter against a snapshot and print matching ids
//! - List the fields a filter may use
//! - Generate a default config file

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bateau::config::{generate_default_config, Config, LogFormat, LoggingConfig};
use bateau::entity::{scan, EntityKind, SnapshotSource};
use bateau::query::{Matcher, ParseError, QueryError, SystemClock};

#[derive(Parser)]
#[command(name = "bateau")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Filter containers and images with a small boolean query language")]
#[command(long_about = "Bateau evaluates filter expressions such as\n  running & label.env=prod\n  !running & exited>2w\nagainst container and image records and prints the ids that match.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the ids of entities matching a filter
    Query {
        /// Filter expression, e.g. "running & label.env=prod"
        query: String,
        /// Filter containers
        #[arg(short, long, conflicts_with = "images")]
        containers: bool,
        /// Filter images
        #[arg(short, long)]
        images: bool,
        /// Snapshot file to read ("-" for stdin)
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// List the fields and operators a filter may use
    Fields {
        /// Show image fields instead of container fields
        #[arg(short, long)]
        images: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        report(&e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging)?;

    match &config.origin {
        Some(path) => tracing::debug!("Loaded config from {:?}", path),
        None => tracing::debug!("Using default config with environment overrides"),
    }
    for warning in &config.warnings {
        tracing::warn!("{}", warning);
    }

    match cli.command {
        Commands::Query {
            query,
            containers,
            images,
            snapshot,
        } => {
            let kind = if images {
                EntityKind::Image
            } else if containers {
                EntityKind::Container
            } else {
                config.query.default_kind
            };

            let Some(path) = snapshot.or(config.source.snapshot) else {
                bail!("No snapshot given: pass --snapshot or set source.snapshot in the config");
            };

            let matcher = Matcher::parse(&query, kind.schema())?;
            let source = SnapshotSource::from_path(&path)
                .with_context(|| format!("Cannot load snapshot {:?}", path))?;

            for id in scan(&source, kind, &matcher, &SystemClock)? {
                println!("{}", id);
            }
        }

        Commands::Fields { images } => {
            let kind = if images {
                EntityKind::Image
            } else {
                EntityKind::Container
            };

            println!("{:<16} OPERATORS", "FIELD");
            for rule in kind.schema().rules() {
                let operators: Vec<String> = rule.operators.iter().map(|op| op.to_string()).collect();
                println!("{:<16} {}", rule.spec.to_string(), operators.join(" "));
            }
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bateau={}", logging.level)));

    let writer = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Cannot open log file {}", path))?;
            BoxMakeWriter::new(std::sync::Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let registry = tracing_subscriber::registry().with(filter);
    match logging.log_format() {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(writer))
            .init(),
        LogFormat::Full => registry
            .with(tracing_subscriber::fmt::layer().with_writer(writer))
            .init(),
    }

    Ok(())
}

/// Print an error to stderr, with a caret under the offending character
/// when the error points into an expression or literal
fn report(error: &anyhow::Error) {
    eprintln!("Error: {:#}", error);

    let caret = if let Some(e) = error.downcast_ref::<ParseError>() {
        Some(e.caret())
    } else if let Some(QueryError::Literal(e)) = error.downcast_ref::<QueryError>() {
        Some(e.caret())
    } else {
        None
    };

    if let Some(caret) = caret {
        eprintln!("{}", caret);
    }
}
