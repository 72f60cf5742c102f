//! Container adapter
//!
//! Answers filter comparisons for one container. Only `id` and `image` are
//! served from the list summary; every other field needs the inspect record,
//! which is fetched on first use and kept for the adapter's lifetime.

use std::sync::LazyLock;

use crate::entity::source::Inspector;
use crate::entity::types::{non_zero, ContainerDetails, ContainerSummary};
use crate::entity::compare_label;
use crate::query::{
    compare_any, compare_elapsed, compare_int, compare_str, Clock, Field, FieldSchema, Operator,
    QueryError, QueryResult, Queryable,
};

/// Fields a container filter may use
pub static CONTAINER_FIELDS: LazyLock<FieldSchema> = LazyLock::new(|| {
    FieldSchema::builder("container")
        .fields(&["running", "paused", "restarting"], &[Operator::Is])
        .wildcard("label", &[Operator::Is, Operator::Eq, Operator::Like])
        .fields(
            &["id", "name", "image", "cmd", "entrypoint"],
            &[Operator::Eq, Operator::Like],
        )
        .fields(&["exit", "created", "exited"], &[Operator::Eq, Operator::Gt])
        .build()
});

/// A container being matched against a filter
pub struct ContainerEntity<'a, I: Inspector + ?Sized> {
    inspector: &'a I,
    clock: &'a dyn Clock,
    summary: ContainerSummary,
    details: Option<ContainerDetails>,
}

impl<'a, I: Inspector + ?Sized> ContainerEntity<'a, I> {
    pub fn new(inspector: &'a I, clock: &'a dyn Clock, summary: ContainerSummary) -> Self {
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

    /// Whether the inspect record has been fetched yet
    pub fn is_inspected(&self) -> bool {
        self.details.is_some()
    }

    fn details(&mut self) -> QueryResult<&ContainerDetails> {
        let details = match self.details.take() {
            Some(details) => details,
            None => {
                tracing::debug!(id = %self.summary.id, "Inspecting container");
                self.inspector.inspect_container(&self.summary.id)?
            }
        };
        Ok(self.details.insert(details))
    }
}

impl<I: Inspector + ?Sized> Queryable for ContainerEntity<'_, I> {
    fn is(&mut self, field: &Field, op: Operator, pattern: &str) -> QueryResult<bool> {
        let clock = self.clock;

        let name = match field {
            Field::Wildcard { prefix, key } if prefix == "label" => {
                let labels = self.details()?.config.labels.as_ref();
                return compare_label(labels, key, op, pattern);
            }
            Field::Named(name) => name.as_str(),
            other => return Err(QueryError::InvalidField(other.to_string())),
        };

        match name {
            "running" => Ok(self.details()?.state.running),
            "paused" => Ok(self.details()?.state.paused),
            "restarting" => Ok(self.details()?.state.restarting),
            "id" => compare_str(&self.summary.id, op, pattern),
            "image" => compare_str(&self.summary.image, op, pattern),
            "name" => compare_str(self.details()?.display_name(), op, pattern),
            "exit" => {
                let code = self.details()?.state.exit_code;
                Ok(code != -1 && compare_int(code, op, pattern)?)
            }
            "cmd" => compare_any(self.details()?.config.cmd(), op, pattern),
            "entrypoint" => compare_any(self.details()?.config.entrypoint(), op, pattern),
            "created" => compare_elapsed(non_zero(self.details()?.created), op, pattern, clock),
            "exited" => {
                let finished_at = non_zero(self.details()?.state.finished_at);
                compare_elapsed(finished_at, op, pattern, clock)
            }
            other => Err(QueryError::InvalidField(other.to_string())),
        }
    }
}
