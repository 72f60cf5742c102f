//! Image adapter

use std::sync::LazyLock;

use crate::entity::compare_label;
use crate::entity::source::Inspector;
use crate::entity::types::{non_zero, ImageDetails, ImageSummary, RunConfig};
use crate::query::{
    compare_any, compare_elapsed, compare_size, compare_str, Clock, Field, FieldSchema, Operator,
    QueryError, QueryResult, Queryable,
};

/// Fields an image filter may use
pub static IMAGE_FIELDS: LazyLock<FieldSchema> = LazyLock::new(|| {
    FieldSchema::builder("image")
        .fields(
            &[
                "id",
                "cmd",
                "entrypoint",
                "comment",
                "author",
                "arch",
                "docker_version",
            ],
            &[Operator::Eq, Operator::Like],
        )
        .wildcard("label", &[Operator::Is, Operator::Eq, Operator::Like])
        .fields(&["size", "created"], &[Operator::Eq, Operator::Gt])
        .build()
});

/// An image being matched against a filter.
///
/// `id` and `size` come from the list summary; the remaining fields trigger
/// a single inspect call.
pub struct ImageEntity<'a, I: Inspector + ?Sized> {
    inspector: &'a I,
    clock: &'a dyn Clock,
    summary: ImageSummary,
    details: Option<ImageDetails>,
}

impl<'a, I: Inspector + ?Sized> ImageEntity<'a, I> {
    pub fn new(inspector: &'a I, clock: &'a dyn Clock, summary: ImageSummary) -> Self {
        Self {
            inspector,
            clock,
            summary,
            details: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.summary.id
    }

    pub fn is_inspected(&self) -> bool {
        self.details.is_some()
    }

    fn details(&mut self) -> QueryResult<&ImageDetails> {
        let details = match self.details.take() {
            Some(details) => details,
            None => {
                tracing::debug!(id = %self.summary.id, "Inspecting image");
                self.inspector.inspect_image(&self.summary.id)?
            }
        };
        Ok(self.details.insert(details))
    }

    fn run_config(&mut self) -> QueryResult<Option<&RunConfig>> {
        Ok(self.details()?.config.as_ref())
    }
}

impl<I: Inspector + ?Sized> Queryable for ImageEntity<'_, I> {
    fn is(&mut self, field: &Field, op: Operator, pattern: &str) -> QueryResult<bool> {
        let clock = self.clock;

        let name = match field {
            Field::Wildcard { prefix, key } if prefix == "label" => {
                let labels = self.run_config()?.and_then(|c| c.labels.as_ref());
                return compare_label(labels, key, op, pattern);
            }
            Field::Named(name) => name.as_str(),
            other => return Err(QueryError::InvalidField(other.to_string())),
        };

        match name {
            "id" => compare_str(&self.summary.id, op, pattern),
            "size" => compare_size(self.summary.total_size(), op, pattern),
            "comment" => compare_str(&self.details()?.comment, op, pattern),
            "author" => compare_str(&self.details()?.author, op, pattern),
            "arch" => compare_str(&self.details()?.architecture, op, pattern),
            "docker_version" => compare_str(&self.details()?.docker_version, op, pattern),
            "cmd" => {
                let cmd = self.run_config()?.map(RunConfig::cmd).unwrap_or_default();
                compare_any(cmd, op, pattern)
            }
            "entrypoint" => {
                let entrypoint = self
                    .run_config()?
                    .map(RunConfig::entrypoint)
                    .unwrap_or_default();
                compare_any(entrypoint, op, pattern)
            }
            "created" => compare_elapsed(non_zero(self.details()?.created), op, pattern, clock),
            other => Err(QueryError::InvalidField(other.to_string())),
        }
    }
}
