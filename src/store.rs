//! Persisted region resources and the stores that read and write them.
//!
//! Resource paths are forward-slash strings relative to the project root,
//! e.g. `sprites/hero_idle.tres`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};
use crate::geometry::Rect;

pub const RESOURCE_EXTENSION: &str = "tres";

/// On-disk form of one atlas region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasResource {
    pub source_path: String,
    pub region: Rect,
    #[serde(default)]
    pub margin: Rect,
    #[serde(default)]
    pub filter_clip: bool,
}

/// Appends the resource extension when `path` does not already end with it.
pub fn canonical_resource_path(path: &str) -> String {
    let suffix = format!(".{RESOURCE_EXTENSION}");
    if path.ends_with(&suffix) {
        path.to_string()
    } else {
        log::debug!("{path} has no .{RESOURCE_EXTENSION} extension, adding it");
        format!("{path}{suffix}")
    }
}

pub fn is_resource_path(path: &str) -> bool {
    path.ends_with(&format!(".{RESOURCE_EXTENSION}"))
}

/// Directory part of a resource path, without the trailing slash.
pub fn parent_path(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) => &path[..i],
        None => "",
    }
}

/// File name part of a resource path.
pub fn file_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) => &path[i + 1..],
        None => path,
    }
}

// ── Store port ──────────────────────────────────────────────────────────────

/// Persistence collaborator. Every call is synchronous and either
/// completes or fails before returning.
pub trait ResourceStore {
    fn save(&mut self, path: &str, resource: &AtlasResource) -> StoreResult<()>;
    fn load(&self, path: &str) -> StoreResult<AtlasResource>;
    fn delete(&mut self, path: &str) -> StoreResult<()>;
    /// Moves `from` to `to`. Fails with `AlreadyExists` rather than
    /// overwriting another resource.
    fn rename(&mut self, from: &str, to: &str) -> StoreResult<()>;
    fn exists(&self, path: &str) -> bool;
}

// ── Filesystem store ────────────────────────────────────────────────────────

/// Stores resources as pretty-printed JSON files under a project root.
#[derive(Clone, Debug)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn absolute(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }
}

fn io_error(path: &str, source: std::io::Error) -> StoreError {
    if source.kind() == ErrorKind::NotFound {
        StoreError::NotFound(path.to_string())
    } else {
        StoreError::Io {
            path: path.to_string(),
            source,
        }
    }
}

impl ResourceStore for FsStore {
    fn save(&mut self, path: &str, resource: &AtlasResource) -> StoreResult<()> {
        let target = self.absolute(path);
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir).map_err(|e| io_error(path, e))?;
        }
        let data = serde_json::to_string_pretty(resource).map_err(|source| StoreError::Format {
            path: path.to_string(),
            source,
        })?;
        fs::write(&target, data).map_err(|e| io_error(path, e))?;
        log::info!("Saved atlas region {path}");
        Ok(())
    }

    fn load(&self, path: &str) -> StoreResult<AtlasResource> {
        let data = fs::read_to_string(self.absolute(path)).map_err(|e| io_error(path, e))?;
        serde_json::from_str(&data).map_err(|source| StoreError::Format {
            path: path.to_string(),
            source,
        })
    }

    fn delete(&mut self, path: &str) -> StoreResult<()> {
        fs::remove_file(self.absolute(path)).map_err(|e| io_error(path, e))?;
        log::info!("Deleted atlas region {path}");
        Ok(())
    }

    fn rename(&mut self, from: &str, to: &str) -> StoreResult<()> {
        let target = self.absolute(to);
        if target.exists() {
            return Err(StoreError::AlreadyExists(to.to_string()));
        }
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir).map_err(|e| io_error(to, e))?;
        }
        fs::rename(self.absolute(from), &target).map_err(|e| io_error(from, e))?;
        log::info!("Moved atlas region {from} to {to}");
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.absolute(path).is_file()
    }
}
