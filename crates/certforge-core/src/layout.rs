//! Session-scoped layout state
//!
//! One [`EditorSession`] per certificate being edited. It owns the position
//! of every overlay slot, the currently focused slot, and the ephemeral
//! touch anchors. The slot set is closed: keys are never created or removed
//! at runtime.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::input::{keyboard_nudge, NudgeKey};

/// Position every overlay starts at until it is first moved.
pub const DEFAULT_POSITION: Position = Position { x: 50.0, y: 50.0 };

/// The closed set of overlay slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKey {
    Name,
    Course,
    Tenure,
    Description,
    Code,
}

impl ElementKey {
    /// All slots, in render order.
    pub const ALL: [ElementKey; 5] = [
        ElementKey::Name,
        ElementKey::Course,
        ElementKey::Tenure,
        ElementKey::Description,
        ElementKey::Code,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKey::Name => "Name",
            ElementKey::Course => "Course",
            ElementKey::Tenure => "Tenure",
            ElementKey::Description => "Description",
            ElementKey::Code => "Code",
        }
    }

    /// Parse the slot name used by the host page.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Name" => Some(ElementKey::Name),
            "Course" => Some(ElementKey::Course),
            "Tenure" => Some(ElementKey::Tenure),
            "Description" => Some(ElementKey::Description),
            "Code" => Some(ElementKey::Code),
            _ => None,
        }
    }
}

/// Pixel position relative to the composition container's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Finger-to-corner offset recorded at touch-start, consumed on touch-move.
/// Overwritten by the next touch-start on the same slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchAnchor {
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Mutable editing state for one certificate session.
#[derive(Debug, Default)]
pub struct EditorSession {
    positions: HashMap<ElementKey, Position>,
    focused: Option<ElementKey>,
    touch_anchors: HashMap<ElementKey, TouchAnchor>,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position of a slot, falling back to [`DEFAULT_POSITION`] for
    /// slots that were never moved.
    pub fn position_of(&self, key: ElementKey) -> Position {
        self.positions.get(&key).copied().unwrap_or(DEFAULT_POSITION)
    }

    /// Commit a new position. Controllers clamp before calling this; the
    /// store itself does not re-clamp.
    pub fn set_position(&mut self, key: ElementKey, position: Position) {
        self.positions.insert(key, position);
    }

    pub fn focused(&self) -> Option<ElementKey> {
        self.focused
    }

    pub fn focus(&mut self, key: ElementKey) {
        self.focused = Some(key);
    }

    /// Clear focus, but only if the blurred slot is the one that holds it.
    pub fn blur(&mut self, key: ElementKey) {
        if self.focused == Some(key) {
            self.focused = None;
        }
    }

    /// Apply a keyboard nudge to the focused slot. Returns the committed
    /// position, or `None` when `key` does not hold focus (a no-op that
    /// leaves all state untouched).
    pub fn nudge_focused(&mut self, key: ElementKey, nudge: NudgeKey) -> Option<Position> {
        if self.focused != Some(key) {
            return None;
        }
        let next = keyboard_nudge(self.position_of(key), nudge);
        self.set_position(key, next);
        Some(next)
    }

    pub fn set_touch_anchor(&mut self, key: ElementKey, anchor: TouchAnchor) {
        self.touch_anchors.insert(key, anchor);
    }

    pub fn touch_anchor(&self, key: ElementKey) -> Option<TouchAnchor> {
        self.touch_anchors.get(&key).copied()
    }
}
