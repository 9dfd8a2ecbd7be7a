//! Template page geometry
//!
//! Decodes the uploaded template document and exposes the first page's
//! geometry. Rust owns decoding and measurement; painting the page pixels is
//! delegated to the host canvas, which sizes itself to [`TemplatePage::viewport`].
//!
//! Only the first page is ever consulted. Multi-page templates are not a
//! supported input shape.

use lopdf::Document;

use crate::CoreError;

/// Fixed upscale factor applied when rasterizing the template page.
pub const RASTER_SCALE: f64 = 2.0;

/// Pixel size of the raster surface the host should prepare.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterViewport {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

/// First page of an uploaded template document.
#[derive(Debug)]
pub struct TemplatePage {
    doc: Document,
    media_box: [f64; 4],
}

impl TemplatePage {
    /// Decode a template from its raw bytes and resolve the first page's
    /// MediaBox. Decode errors are not recovered; the caller's session stays
    /// without a background.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CoreError> {
        let doc = Document::load_mem(data)?;
        let first_page_id = doc
            .get_pages()
            .values()
            .next()
            .copied()
            .ok_or(CoreError::EmptyTemplate)?;

        let page = doc.get_object(first_page_id)?;
        let page_dict = page
            .as_dict()
            .map_err(|_| CoreError::BadGeometry("page is not a dictionary".to_string()))?;
        let media_box = resolve_media_box(&doc, page_dict)?;

        Ok(Self { doc, media_box })
    }

    /// Page width in PDF points.
    pub fn width(&self) -> f64 {
        self.media_box[2]
    }

    /// Page height in PDF points.
    pub fn height(&self) -> f64 {
        self.media_box[3]
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Raster surface size at the fixed 2x scale.
    pub fn viewport(&self) -> RasterViewport {
        RasterViewport {
            width: self.width() * RASTER_SCALE,
            height: self.height() * RASTER_SCALE,
            scale: RASTER_SCALE,
        }
    }
}

/// Resolve the MediaBox for a page: direct entry, inherited from Parent, or
/// the US Letter fallback.
fn resolve_media_box(doc: &Document, page_dict: &lopdf::Dictionary) -> Result<[f64; 4], CoreError> {
    if let Ok(media_box) = page_dict.get(b"MediaBox") {
        return parse_rect(doc, media_box);
    }

    if let Ok(parent_ref) = page_dict.get(b"Parent") {
        if let Ok(parent_id) = parent_ref.as_reference() {
            if let Ok(parent) = doc.get_object(parent_id) {
                if let Ok(parent_dict) = parent.as_dict() {
                    if let Ok(media_box) = parent_dict.get(b"MediaBox") {
                        return parse_rect(doc, media_box);
                    }
                }
            }
        }
    }

    Ok([0.0, 0.0, 612.0, 792.0])
}

/// Parse a PDF rectangle into `[x, y, width, height]`.
fn parse_rect(doc: &Document, obj: &lopdf::Object) -> Result<[f64; 4], CoreError> {
    let arr = match obj {
        lopdf::Object::Array(a) => a.clone(),
        lopdf::Object::Reference(id) => doc
            .get_object(*id)?
            .as_array()
            .map_err(|_| CoreError::BadGeometry("MediaBox reference is not an array".to_string()))?
            .clone(),
        _ => return Err(CoreError::BadGeometry("MediaBox is not an array".to_string())),
    };

    if arr.len() != 4 {
        return Err(CoreError::BadGeometry(format!(
            "MediaBox has {} elements, expected 4",
            arr.len()
        )));
    }

    let mut values = [0.0f64; 4];
    for (i, obj) in arr.iter().enumerate() {
        values[i] = extract_number(doc, obj)?;
    }

    Ok([
        values[0],
        values[1],
        values[2] - values[0],
        values[3] - values[1],
    ])
}

fn extract_number(doc: &Document, obj: &lopdf::Object) -> Result<f64, CoreError> {
    match obj {
        lopdf::Object::Integer(i) => Ok(*i as f64),
        lopdf::Object::Real(r) => Ok(*r as f64),
        lopdf::Object::Reference(id) => extract_number(doc, doc.get_object(*id)?),
        _ => Err(CoreError::BadGeometry(
            "expected number in rectangle".to_string(),
        )),
    }
}
