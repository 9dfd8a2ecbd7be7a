//! Input controllers
//!
//! Three independent input paths commit positions into the same session:
//! pointer drag, keyboard nudge, and touch drag. Each computes a candidate
//! position and clamps it before the commit.
//!
//! The two drag paths use deliberately different clamping policies: pointer
//! drops clamp against the element's measured box, touch moves clamp against
//! a fixed 50 px assumed size. Keyboard nudges clamp only their lower bound,
//! and only for Up/Left. All three are observed behavior and pinned by tests.

use crate::layout::{Position, TouchAnchor};

/// Step size of one arrow-key nudge, in pixels.
pub const NUDGE_STEP: f64 = 5.0;

/// Assumed element size for the touch clamp, regardless of rendered size.
pub const TOUCH_ELEMENT_SIZE: f64 = 50.0;

/// Measured bounding box of the composition container, in client pixels.
/// Taken synchronously inside the same handler that commits, so the
/// measurement cannot tear against a concurrent layout change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Measured size of one overlay element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementBox {
    pub width: f64,
    pub height: f64,
}

/// Pointer drag: position of the element after a drag-end at the given
/// client point, clamped so the whole measured box stays inside the
/// container.
pub fn pointer_drop(
    container: ContainerBounds,
    element: ElementBox,
    client_x: f64,
    client_y: f64,
) -> Position {
    let x = client_x - container.left;
    let y = client_y - container.top;
    // Upper bound first, zero floor last: an element wider than the
    // container lands at 0, not at a negative offset.
    Position {
        x: x.min(container.width - element.width).max(0.0),
        y: y.min(container.height - element.height).max(0.0),
    }
}

/// An arrow key recognized by the keyboard controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeKey {
    Up,
    Down,
    Left,
    Right,
}

impl NudgeKey {
    /// Map a DOM `KeyboardEvent.key` value. Any other key is a no-op for
    /// the controller.
    pub fn from_event_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(NudgeKey::Up),
            "ArrowDown" => Some(NudgeKey::Down),
            "ArrowLeft" => Some(NudgeKey::Left),
            "ArrowRight" => Some(NudgeKey::Right),
            _ => None,
        }
    }
}

/// Keyboard nudge: one fixed step per keypress. Up and Left clamp at zero;
/// Down and Right have no upper bound and may leave the container.
pub fn keyboard_nudge(current: Position, key: NudgeKey) -> Position {
    let Position { x, y } = current;
    match key {
        NudgeKey::Up => Position {
            x,
            y: (y - NUDGE_STEP).max(0.0),
        },
        NudgeKey::Down => Position {
            x,
            y: y + NUDGE_STEP,
        },
        NudgeKey::Left => Position {
            x: (x - NUDGE_STEP).max(0.0),
            y,
        },
        NudgeKey::Right => Position {
            x: x + NUDGE_STEP,
            y,
        },
    }
}

/// Touch start: record the offset between the touch point and the element's
/// current top-left corner.
pub fn touch_anchor_at(
    touch_x: f64,
    touch_y: f64,
    element_left: f64,
    element_top: f64,
) -> TouchAnchor {
    TouchAnchor {
        offset_x: touch_x - element_left,
        offset_y: touch_y - element_top,
    }
}

/// Touch move: new top-left from the anchored offset, clamped with the
/// fixed [`TOUCH_ELEMENT_SIZE`] policy.
pub fn touch_move(
    container: ContainerBounds,
    anchor: TouchAnchor,
    touch_x: f64,
    touch_y: f64,
) -> Position {
    let x = touch_x - container.left - anchor.offset_x;
    let y = touch_y - container.top - anchor.offset_y;
    Position {
        x: x.min(container.width - TOUCH_ELEMENT_SIZE).max(0.0),
        y: y.min(container.height - TOUCH_ELEMENT_SIZE).max(0.0),
    }
}
