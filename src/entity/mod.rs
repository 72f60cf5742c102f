//! Runtime entities
//!
//! Adapters that let containers and images take part in filter evaluation,
//! the field schemas they expose, and the sources they are read from.

mod container;
mod error;
mod image;
mod source;
mod types;

pub use container::{ContainerEntity, CONTAINER_FIELDS};
pub use error::{SourceError, SourceResult};
pub use image::{ImageEntity, IMAGE_FIELDS};
pub use source::{Inspector, Snapshot, SnapshotSource};
pub use types::{
    ContainerDetails, ContainerState, ContainerSummary, ImageDetails, ImageSummary, RunConfig,
};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::query::{compare_str, Clock, FieldSchema, Matcher, Operator, QueryResult};

/// Kind of entity a filter runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[default]
    #[serde(alias = "containers")]
    Container,
    #[serde(alias = "images")]
    Image,
}

impl EntityKind {
    /// Field schema filters for this kind are validated against
    pub fn schema(&self) -> &'static FieldSchema {
        match self {
            EntityKind::Container => &CONTAINER_FIELDS,
            EntityKind::Image => &IMAGE_FIELDS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Container => "container",
            EntityKind::Image => "image",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "container" | "containers" => Ok(EntityKind::Container),
            "image" | "images" => Ok(EntityKind::Image),
            other => Err(format!("unknown entity kind '{}'", other)),
        }
    }
}

/// Compare one label. A bare `label.key` tests presence; any other operator
/// compares the value, with a missing label reading as empty.
pub(crate) fn compare_label(
    labels: Option<&HashMap<String, String>>,
    key: &str,
    op: Operator,
    pattern: &str,
) -> QueryResult<bool> {
    let value = labels.and_then(|labels| labels.get(key));
    match op {
        Operator::Is => Ok(value.is_some()),
        op => compare_str(value.map(String::as_str).unwrap_or(""), op, pattern),
    }
}

/// Ids of the containers matching `matcher`, in listing order
pub fn scan_containers<I: Inspector + ?Sized>(
    inspector: &I,
    matcher: &Matcher,
    clock: &dyn Clock,
) -> QueryResult<Vec<String>> {
    let summaries = inspector.list_containers()?;
    let total = summaries.len();

    let mut matched = Vec::new();
    for summary in summaries {
        let mut entity = ContainerEntity::new(inspector, clock, summary);
        if matcher.matches(&mut entity)? {
            matched.push(entity.id().to_string());
        }
    }

    tracing::info!(
        filter = %matcher,
        total,
        matched = matched.len(),
        "Scanned containers"
    );
    Ok(matched)
}

/// Ids of the images matching `matcher`, in listing order
pub fn scan_images<I: Inspector + ?Sized>(
    inspector: &I,
    matcher: &Matcher,
    clock: &dyn Clock,
) -> QueryResult<Vec<String>> {
    let summaries = inspector.list_images()?;
    let total = summaries.len();

    let mut matched = Vec::new();
    for summary in summaries {
        let mut entity = ImageEntity::new(inspector, clock, summary);
        if matcher.matches(&mut entity)? {
            matched.push(entity.id().to_string());
        }
    }

    tracing::info!(
        filter = %matcher,
        total,
        matched = matched.len(),
        "Scanned images"
    );
    Ok(matched)
}

/// Scan every entity of `kind`
pub fn scan<I: Inspector + ?Sized>(
    inspector: &I,
    kind: EntityKind,
    matcher: &Matcher,
    clock: &dyn Clock,
) -> QueryResult<Vec<String>> {
    match kind {
        EntityKind::Container => scan_containers(inspector, matcher, clock),
        EntityKind::Image => scan_images(inspector, matcher, clock),
    }
}
