//! Editing core for atlas texture regions: rectangular sub-areas of a
//! source image, each persisted as its own resource file.

pub mod config;
pub mod edits;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod history;
pub mod input;
pub mod scan;
pub mod store;

pub use config::EditorConfig;
pub use edits::{Attribute, RegionEdits, Snapshot};
pub use editor::{AtlasEditor, DeletePrompt, Gesture, Highlight, RegionKey, RegionView};
pub use error::{ConfigError, EditError, EditResult, StoreError, StoreResult};
pub use geometry::{Grab, Grid, Handle, Rect, Vec2};
pub use history::{Action, Command, CommandHistory, MergeMode, UndoStack};
pub use input::{Effect, InputEvent, PreviewInput, Zoom};
pub use scan::{CollectionIndex, FsScanner, ResourceScanner};
pub use store::{AtlasResource, FsStore, ResourceStore};
