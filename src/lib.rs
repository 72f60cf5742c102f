//! # Bateau
//!
//! Filter query engine for container runtime entities. A short boolean
//! expression over entity attributes is compiled once, validated against the
//! entity kind's field schema, and evaluated against each container or image.
//!
//! ## Modules
//!
//! - [`query`]: Filter language, literal parsers, comparators and evaluator
//! - [`entity`]: Container and image adapters, field schemas and sources
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bateau::entity::{scan_containers, SnapshotSource, CONTAINER_FIELDS};
//! use bateau::query::{Matcher, SystemClock};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = SnapshotSource::from_path("snapshot.json".as_ref())?;
//!     let matcher = Matcher::parse("!running & exited>2w", &CONTAINER_FIELDS)?;
//!
//!     for id in scan_containers(&source, &matcher, &SystemClock)? {
//!         println!("{}", id);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod entity;
pub mod query;

// Re-export top-level types for convenience
pub use config::{Config, ConfigError, LogFormat, LoggingConfig, QueryConfig, SourceConfig};

pub use entity::{
    scan, scan_containers, scan_images, ContainerEntity, EntityKind, ImageEntity, Inspector,
    SnapshotSource, SourceError, CONTAINER_FIELDS, IMAGE_FIELDS,
};

pub use query::{
    parse_duration, parse_size, Expr, FieldSchema, Matcher, Operator, ParseError, QueryError,
    QueryResult, Queryable,
};
