//! Composition snapshot
//!
//! Flattens the live composition — background image plus every overlay at
//! its current position — onto an off-screen canvas and extracts the result
//! as PNG bytes for the export builder.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use certforge_core::{
    payload::CodePayload, EditorSession, ElementKey, CODE_SIZE,
};
use certforge_types::FieldRecord;

/// Font the host page renders overlays with; the snapshot must match it.
const OVERLAY_FONT: &str = "16px sans-serif";

/// Offset from an overlay's top edge to its text baseline.
const TEXT_BASELINE: f64 = 16.0;

/// Draw the whole composition onto a fresh canvas and return its data URI.
pub fn compose(
    background: &HtmlImageElement,
    container_width: f64,
    container_height: f64,
    session: &EditorSession,
    record: &FieldRecord,
    payload: &CodePayload,
) -> Result<String, JsValue> {
    let document = web_sys::window()
        .ok_or_else(|| JsValue::from_str("No window object available"))?
        .document()
        .ok_or_else(|| JsValue::from_str("No document object available"))?;

    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    canvas.set_width(container_width as u32);
    canvas.set_height(container_height as u32);

    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("Canvas has no 2d context"))?
        .dyn_into()?;

    ctx.draw_image_with_html_image_element_and_dw_and_dh(
        background,
        0.0,
        0.0,
        container_width,
        container_height,
    )?;

    ctx.set_font(OVERLAY_FONT);
    ctx.set_fill_style_str("#000000");
    for key in ElementKey::ALL {
        let position = session.position_of(key);
        let text = match key {
            ElementKey::Name => record.candidate_name.clone(),
            ElementKey::Course => record.course_name.clone(),
            ElementKey::Tenure => record.tenure_text(),
            ElementKey::Description => record.description.clone(),
            ElementKey::Code => {
                draw_code(&ctx, payload, position.x, position.y)?;
                continue;
            }
        };
        ctx.fill_text(&text, position.x, position.y + TEXT_BASELINE)?;
    }

    canvas.to_data_url()
}

/// Paint the code overlay as scaled module squares.
fn draw_code(
    ctx: &CanvasRenderingContext2d,
    payload: &CodePayload,
    x: f64,
    y: f64,
) -> Result<(), JsValue> {
    let modules = payload
        .modules()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let cell = CODE_SIZE as f64 / modules.width as f64;

    ctx.set_fill_style_str("#ffffff");
    ctx.fill_rect(x, y, CODE_SIZE as f64, CODE_SIZE as f64);

    ctx.set_fill_style_str("#000000");
    for row in 0..modules.width {
        for col in 0..modules.width {
            if modules.dark[row * modules.width + col] {
                ctx.fill_rect(x + col as f64 * cell, y + row as f64 * cell, cell, cell);
            }
        }
    }
    Ok(())
}

/// Extract the raw PNG bytes from a canvas `toDataURL()` string.
pub fn png_bytes_from_data_url(data_url: &str) -> Result<Vec<u8>, JsValue> {
    let encoded = data_url
        .strip_prefix("data:image/png;base64,")
        .ok_or_else(|| JsValue::from_str("Snapshot is not a base64 PNG data URI"))?;
    STANDARD
        .decode(encoded)
        .map_err(|e| JsValue::from_str(&format!("Failed to decode snapshot: {}", e)))
}
