//! Editor settings, read from an optional TOML file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::geometry::Grid;
use crate::history::UndoStack;

pub const CONFIG_FILE_NAME: &str = "quick-atlas.toml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Edge of a handle square, in screen units.
    pub handle_size: f32,
    pub zoom: ZoomConfig,
    pub grid: Grid,
    pub history: HistoryConfig,
    /// File stem for placeholder names of freshly drawn regions.
    pub new_region_stem: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min_percent: u32,
    pub max_percent: u32,
    pub step_percent: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub capacity: usize,
    pub merge_window_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            handle_size: 5.0,
            zoom: ZoomConfig::default(),
            grid: Grid::default(),
            history: HistoryConfig::default(),
            new_region_stem: "new_atlas_texture".to_string(),
        }
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_percent: 25,
            max_percent: 800,
            step_percent: 10,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            merge_window_ms: 800,
        }
    }
}

impl HistoryConfig {
    pub fn build(&self) -> UndoStack {
        UndoStack::new(self.capacity, Duration::from_millis(self.merge_window_ms))
    }
}

impl EditorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Loads `explicit` when given, else `quick-atlas.toml` under `root` if
    /// it exists, else defaults.
    pub fn discover(explicit: Option<&Path>, root: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            log::info!("Using config {}", candidate.display());
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }
}
