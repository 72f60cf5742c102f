//! Entity sources
//!
//! An [`Inspector`] lists entities cheaply and fetches the full record of one
//! entity on demand. [`SnapshotSource`] serves both from a JSON document, e.g.
//! one assembled from `docker ps`/`docker inspect` output:
//!
//! ```text
//! {
//!   "containers": [ { "Id": "...", "Image": "...", ... } ],
//!   "container_details": [ { "Id": "...", "State": { ... }, "Config": { ... } } ],
//!   "images": [ ... ],
//!   "image_details": [ ... ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::entity::error::{SourceError, SourceResult};
use crate::entity::types::{ContainerDetails, ContainerSummary, ImageDetails, ImageSummary};
use crate::entity::EntityKind;

/// Lists entities and retrieves their full detail
pub trait Inspector {
    fn list_containers(&self) -> SourceResult<Vec<ContainerSummary>>;

    fn inspect_container(&self, id: &str) -> SourceResult<ContainerDetails>;

    fn list_images(&self) -> SourceResult<Vec<ImageSummary>>;

    fn inspect_image(&self, id: &str) -> SourceResult<ImageDetails>;
}

/// On-disk snapshot layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub containers: Vec<ContainerSummary>,
    #[serde(default)]
    pub container_details: Vec<ContainerDetails>,
    #[serde(default)]
    pub images: Vec<ImageSummary>,
    #[serde(default)]
    pub image_details: Vec<ImageDetails>,
}

/// Inspector backed by an in-memory snapshot
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    containers: Vec<ContainerSummary>,
    container_details: HashMap<String, ContainerDetails>,
    images: Vec<ImageSummary>,
    image_details: HashMap<String, ImageDetails>,
}

impl SnapshotSource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            containers: snapshot.containers,
            container_details: snapshot
                .container_details
                .into_iter()
                .map(|d| (d.id.clone(), d))
                .collect(),
            images: snapshot.images,
            image_details: snapshot
                .image_details
                .into_iter()
                .map(|d| (d.id.clone(), d))
                .collect(),
        }
    }

    /// Load a snapshot from any JSON reader
    pub fn from_reader<R: Read>(reader: R) -> SourceResult<Self> {
        let snapshot: Snapshot = serde_json::from_reader(reader)?;
        Ok(Self::new(snapshot))
    }

    /// Load a snapshot file, `-` meaning stdin
    pub fn from_path(path: &Path) -> SourceResult<Self> {
        if path == Path::new("-") {
            tracing::debug!("Reading snapshot from stdin");
            return Self::from_reader(std::io::stdin().lock());
        }

        let file = std::fs::File::open(path).map_err(|error| SourceError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        let source = Self::from_reader(std::io::BufReader::new(file))?;

        tracing::debug!(
            path = %path.display(),
            containers = source.containers.len(),
            images = source.images.len(),
            "Loaded snapshot"
        );
        Ok(source)
    }
}

impl Inspector for SnapshotSource {
    fn list_containers(&self) -> SourceResult<Vec<ContainerSummary>> {
        Ok(self.containers.clone())
    }

    fn inspect_container(&self, id: &str) -> SourceResult<ContainerDetails> {
        self.container_details
            .get(id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                kind: EntityKind::Container,
                id: id.to_string(),
            })
    }

    fn list_images(&self) -> SourceResult<Vec<ImageSummary>> {
        Ok(self.images.clone())
    }

    fn inspect_image(&self, id: &str) -> SourceResult<ImageDetails> {
        self.image_details
            .get(id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                kind: EntityKind::Image,
                id: id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SNAPSHOT: &str = r#"{
        "containers": [
            {"Id": "c1", "Image": "nginx", "Names": ["/web"]},
            {"Id": "c2", "Image": "redis"}
        ],
        "container_details": [
            {"Id": "c1", "Name": "/web", "State": {"Running": true}}
        ],
        "images": [
            {"Id": "sha256:i1", "Size": 1024}
        ]
    }"#;

    #[test]
    fn test_from_reader() {
        let source = SnapshotSource::from_reader(SNAPSHOT.as_bytes()).unwrap();

        let containers = source.list_containers().unwrap();
        assert_eq!(containers.len(), 2);
        assert_eq!(containers[1].image, "redis");

        let details = source.inspect_container("c1").unwrap();
        assert!(details.state.running);

        assert_eq!(source.list_images().unwrap()[0].size, 1024);
    }

    #[test]
    fn test_inspect_missing() {
        let source = SnapshotSource::from_reader(SNAPSHOT.as_bytes()).unwrap();

        let err = source.inspect_container("c2").unwrap_err();
        assert!(matches!(
            err,
            SourceError::NotFound { kind: EntityKind::Container, ref id } if id == "c2"
        ));
        assert!(source.inspect_image("sha256:i1").is_err());
    }

    #[test]
    fn test_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT.as_bytes()).unwrap();

        let source = SnapshotSource::from_path(file.path()).unwrap();
        assert_eq!(source.list_containers().unwrap().len(), 2);
    }

    #[test]
    fn test_from_path_errors() {
        let err = SnapshotSource::from_path(Path::new("/nonexistent/snapshot.json")).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let err = SnapshotSource::from_path(file.path()).unwrap_err();
        assert!(matches!(err, SourceError::Json(_)));
    }

    #[test]
    fn test_empty_snapshot() {
        let source = SnapshotSource::from_reader("{}".as_bytes()).unwrap();
        assert!(source.list_containers().unwrap().is_empty());
        assert!(source.list_images().unwrap().is_empty());
    }
}
