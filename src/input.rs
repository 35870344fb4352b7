//! Pointer and keyboard routing for the region preview.
//!
//! The host translates its toolkit's events into `InputEvent`s with
//! positions relative to the preview origin (the source image's top-left
//! corner at the current zoom) and acts on the returned `Effect`s.

use crate::config::ZoomConfig;
use crate::editor::{AtlasEditor, DeletePrompt};
use crate::error::EditError;
use crate::geometry::Vec2;
use crate::history::CommandHistory;
use crate::scan::ResourceScanner;
use crate::store::ResourceStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// Buttons held during a pointer move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonMask {
    pub primary: bool,
    pub middle: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Delete,
    Z,
    Y,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    ButtonDown { button: PointerButton, position: Vec2 },
    ButtonUp { button: PointerButton, position: Vec2 },
    /// `delta` is the movement since the previous pointer event.
    PointerMove { position: Vec2, delta: Vec2, buttons: ButtonMask },
    /// Positive steps zoom in.
    Wheel { steps: i32, position: Vec2 },
    KeyPress { key: Key, modifiers: Modifiers },
}

/// Work the host has to do in response to an event.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Redraw,
    /// Scroll the preview by this many screen units.
    Scroll(Vec2),
    /// Ask the user, then call `AtlasEditor::resolve_delete`.
    ConfirmDelete(DeletePrompt),
    ShowError(String),
    ZoomChanged(u32),
}

// ── Zoom ────────────────────────────────────────────────────────────────────

/// Preview zoom in whole percent, stepped and clamped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Zoom {
    percent: u32,
    min: u32,
    max: u32,
    step: u32,
}

impl Zoom {
    pub fn new(config: &ZoomConfig) -> Self {
        let min = config.min_percent.max(1);
        let max = config.max_percent.max(min);
        Self {
            percent: 100.clamp(min, max),
            min,
            max,
            step: config.step_percent.max(1),
        }
    }

    pub fn percent(&self) -> u32 {
        self.percent
    }

    /// Screen units per source pixel.
    pub fn scale(&self) -> f32 {
        self.percent as f32 / 100.0
    }

    /// Moves `steps` increments; returns whether the zoom changed.
    pub fn step_by(&mut self, steps: i32) -> bool {
        let delta = steps.saturating_mul(self.step as i32);
        let target = (self.percent as i64 + delta as i64).clamp(self.min as i64, self.max as i64);
        let changed = target as u32 != self.percent;
        self.percent = target as u32;
        changed
    }

    pub fn reset(&mut self) {
        self.percent = 100.clamp(self.min, self.max);
    }
}

// ── Preview input ───────────────────────────────────────────────────────────

pub struct PreviewInput {
    zoom: Zoom,
}

impl PreviewInput {
    pub fn new(zoom: Zoom) -> Self {
        Self { zoom }
    }

    pub fn zoom(&self) -> &Zoom {
        &self.zoom
    }

    pub fn zoom_mut(&mut self) -> &mut Zoom {
        &mut self.zoom
    }

    pub fn handle<S, F, H>(&mut self, editor: &mut AtlasEditor<S, F, H>, event: InputEvent) -> Vec<Effect>
    where
        S: ResourceStore,
        F: ResourceScanner,
        H: CommandHistory,
    {
        let scale = self.zoom.scale();
        match event {
            InputEvent::ButtonDown {
                button: PointerButton::Primary,
                position,
            } => match editor.begin_gesture(position, scale) {
                Ok(_) => vec![Effect::Redraw],
                Err(EditError::NoSource) => Vec::new(),
                Err(e) => vec![Effect::ShowError(e.to_string())],
            },
            InputEvent::ButtonUp {
                button: PointerButton::Primary,
                ..
            } => match editor.end_gesture() {
                Ok(_) => vec![Effect::Redraw],
                Err(e) => vec![Effect::ShowError(e.to_string()), Effect::Redraw],
            },
            InputEvent::ButtonDown { .. } | InputEvent::ButtonUp { .. } => Vec::new(),
            InputEvent::PointerMove {
                position,
                delta,
                buttons,
            } => {
                if buttons.primary && editor.gesture().is_some() {
                    editor.drag_gesture(position, delta, scale);
                    vec![Effect::Redraw]
                } else if buttons.middle && !buttons.primary {
                    vec![Effect::Scroll(delta * -1.0)]
                } else {
                    Vec::new()
                }
            }
            InputEvent::Wheel { steps, .. } => {
                if self.zoom.step_by(steps) {
                    log::debug!("Zoom {}%", self.zoom.percent());
                    vec![Effect::ZoomChanged(self.zoom.percent()), Effect::Redraw]
                } else {
                    Vec::new()
                }
            }
            InputEvent::KeyPress { key, modifiers } => self.key_press(editor, key, modifiers),
        }
    }

    fn key_press<S, F, H>(
        &mut self,
        editor: &mut AtlasEditor<S, F, H>,
        key: Key,
        modifiers: Modifiers,
    ) -> Vec<Effect>
    where
        S: ResourceStore,
        F: ResourceScanner,
        H: CommandHistory,
    {
        let result = match (key, modifiers.ctrl, modifiers.shift) {
            (Key::Delete, _, _) => {
                return editor
                    .request_delete()
                    .map(|prompt| vec![Effect::ConfirmDelete(prompt)])
                    .unwrap_or_default();
            }
            (Key::Z, true, false) => editor.undo(),
            (Key::Z, true, true) | (Key::Y, true, _) => editor.redo(),
            _ => return Vec::new(),
        };
        match result {
            Ok(true) => vec![Effect::Redraw],
            Ok(false) => Vec::new(),
            Err(e) => vec![Effect::ShowError(e.to_string()), Effect::Redraw],
        }
    }
}
