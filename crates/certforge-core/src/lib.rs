//! Certificate layout & export engine
//!
//! The interactive core of the certificate generator: session-scoped overlay
//! positioning with per-controller clamping, template page geometry, the
//! scannable code payload, and the snapshot-to-PDF export builder.
//!
//! Everything here is DOM-free. Geometry is injected by the caller
//! ([`input::ContainerBounds`] / [`input::ElementBox`]) so the layout math is
//! unit-testable without a rendering surface; the wasm app owns the actual
//! measurement and event wiring.

pub mod export;
pub mod input;
pub mod layout;
pub mod payload;
pub mod template;

pub use export::{build_certificate_pdf, export_filename, Snapshot, DEFAULT_EXPORT_NAME};
pub use input::{ContainerBounds, ElementBox, NudgeKey, NUDGE_STEP, TOUCH_ELEMENT_SIZE};
pub use layout::{EditorSession, ElementKey, Position, TouchAnchor, DEFAULT_POSITION};
pub use payload::{CodePayload, CODE_SIZE};
pub use template::{TemplatePage, RASTER_SCALE};

/// Failures local to one editing session. Nothing here is fatal to the host
/// application; a failed decode or export simply leaves the session without
/// a background or without a produced file.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("failed to decode template document: {0}")]
    TemplateDecode(#[from] lopdf::Error),

    #[error("template document has no pages")]
    EmptyTemplate,

    #[error("malformed page geometry: {0}")]
    BadGeometry(String),

    #[error("failed to decode snapshot image: {0}")]
    SnapshotDecode(#[from] png::DecodingError),

    #[error("unsupported snapshot pixel format: {0}")]
    SnapshotFormat(String),

    #[error("failed to encode code payload: {0}")]
    Payload(String),

    #[error("failed to assemble export document: {0}")]
    Export(String),
}
