//! Scannable code payload
//!
//! The full field record, serialized to compact JSON with a stable key
//! order, rendered as a QR code with high error correction. The code is one
//! more overlay slot ([`crate::ElementKey::Code`]) and moves under the same
//! controllers as the text overlays.

use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};

use certforge_types::FieldRecord;

use crate::CoreError;

/// Rendered side length of the code overlay, in pixels.
pub const CODE_SIZE: u32 = 64;

/// Serialized record plus its QR rendering.
#[derive(Debug, Clone)]
pub struct CodePayload {
    json: String,
}

/// Module matrix of a generated code: `width * width` cells, row-major,
/// `true` for dark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeModules {
    pub width: usize,
    pub dark: Vec<bool>,
}

impl CodePayload {
    pub fn new(record: &FieldRecord) -> Result<Self, CoreError> {
        let json = serde_json::to_string(record).map_err(|e| CoreError::Payload(e.to_string()))?;
        Ok(Self { json })
    }

    /// The encoded text, exactly as embedded in the code.
    pub fn as_json(&self) -> &str {
        &self.json
    }

    /// SVG rendering at [`CODE_SIZE`], for the live overlay element.
    pub fn svg(&self) -> Result<String, CoreError> {
        let code = self.qr()?;
        Ok(code
            .render::<svg::Color>()
            .min_dimensions(CODE_SIZE, CODE_SIZE)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#ffffff"))
            .build())
    }

    /// Raw module matrix, for painting the code onto the export snapshot.
    pub fn modules(&self) -> Result<CodeModules, CoreError> {
        let code = self.qr()?;
        let width = code.width();
        let dark = code
            .to_colors()
            .into_iter()
            .map(|c| c == qrcode::Color::Dark)
            .collect();
        Ok(CodeModules { width, dark })
    }

    fn qr(&self) -> Result<QrCode, CoreError> {
        QrCode::with_error_correction_level(self.json.as_bytes(), EcLevel::H)
            .map_err(|e| CoreError::Payload(e.to_string()))
    }
}
