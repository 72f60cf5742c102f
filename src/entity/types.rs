//! Entity records
//!
//! Mirrors the subset of the Docker Engine API objects the filters read.
//! Summaries are what a bulk list call returns. Details are what an inspect
//! call returns for a single entity.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A container as returned by a list call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerSummary {
    pub id: String,
    #[serde(default)]
    pub image: String,
}

impl ContainerSummary {
    pub fn new(id: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            image: image.into(),
        }
    }
}

/// A container as returned by an inspect call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerDetails {
    pub id: String,
    /// Name with Docker's leading `/`
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub state: ContainerState,
    #[serde(default)]
    pub config: RunConfig,
}

impl ContainerDetails {
    /// Name without the leading `/`
    pub fn display_name(&self) -> &str {
        self.name.strip_prefix('/').unwrap_or(&self.name)
    }
}

/// Runtime state of a container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerState {
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub restarting: bool,
    /// `-1` when the container never ran
    #[serde(default = "default_exit_code")]
    pub exit_code: i64,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

fn default_exit_code() -> i64 {
    -1
}

impl Default for ContainerState {
    fn default() -> Self {
        Self {
            running: false,
            paused: false,
            restarting: false,
            exit_code: default_exit_code(),
            finished_at: None,
        }
    }
}

/// Run configuration shared by containers and images
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RunConfig {
    #[serde(default)]
    pub labels: Option<HashMap<String, String>>,
    #[serde(default)]
    pub cmd: Option<Vec<String>>,
    #[serde(default)]
    pub entrypoint: Option<Vec<String>>,
}

impl RunConfig {
    pub fn cmd(&self) -> &[String] {
        self.cmd.as_deref().unwrap_or_default()
    }

    pub fn entrypoint(&self) -> &[String] {
        self.entrypoint.as_deref().unwrap_or_default()
    }
}

/// An image as returned by a list call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageSummary {
    pub id: String,
    #[serde(default)]
    pub size: i64,
    /// Dropped from recent API versions in favour of `Size`
    #[serde(default)]
    pub virtual_size: Option<i64>,
}

impl ImageSummary {
    pub fn new(id: impl Into<String>, size: i64) -> Self {
        Self {
            id: id.into(),
            size,
            ..Default::default()
        }
    }

    /// Size in bytes including shared layers
    pub fn total_size(&self) -> i64 {
        self.virtual_size.unwrap_or(self.size)
    }
}

/// An image as returned by an inspect call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageDetails {
    pub id: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub architecture: String,
    #[serde(default)]
    pub docker_version: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub config: Option<RunConfig>,
}

/// Docker reports "never" as `0001-01-01T00:00:00Z`
pub(crate) fn non_zero(timestamp: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    timestamp.filter(|t| t.year() > 1)
}
