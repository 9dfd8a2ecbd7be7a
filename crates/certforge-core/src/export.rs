//! Export document builder
//!
//! Takes the raster snapshot of the composed certificate and flattens it
//! into a single-page PDF: a landscape page sized to the snapshot's pixel
//! dimensions with the snapshot painted full-bleed at the origin. One
//! atomic build per export action, no retry.

use std::io::Write as _;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{Dictionary, Document, Object, Stream};

use crate::CoreError;

/// Filename stem used when the candidate name is empty.
pub const DEFAULT_EXPORT_NAME: &str = "certificate";

/// Decoded snapshot of the composition container, normalized to RGB8.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    rgb: Vec<u8>,
}

impl Snapshot {
    /// Decode a PNG capture. Alpha is composited over white; 16-bit and
    /// palette images are rejected.
    pub fn from_png(bytes: &[u8]) -> Result<Self, CoreError> {
        let decoder = png::Decoder::new(bytes);
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0u8; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        buf.truncate(info.buffer_size());

        if info.bit_depth != png::BitDepth::Eight {
            return Err(CoreError::SnapshotFormat(format!(
                "unsupported bit depth {:?}",
                info.bit_depth
            )));
        }

        let rgb = match info.color_type {
            png::ColorType::Rgb => buf,
            png::ColorType::Rgba => buf
                .chunks_exact(4)
                .flat_map(|px| {
                    let a = px[3] as u16;
                    [
                        over_white(px[0], a),
                        over_white(px[1], a),
                        over_white(px[2], a),
                    ]
                })
                .collect(),
            png::ColorType::Grayscale => buf.iter().flat_map(|&g| [g, g, g]).collect(),
            png::ColorType::GrayscaleAlpha => buf
                .chunks_exact(2)
                .flat_map(|px| {
                    let g = over_white(px[0], px[1] as u16);
                    [g, g, g]
                })
                .collect(),
            other => {
                return Err(CoreError::SnapshotFormat(format!(
                    "unsupported color type {:?}",
                    other
                )))
            }
        };

        Ok(Self {
            width: info.width,
            height: info.height,
            rgb,
        })
    }

    #[cfg(test)]
    fn from_rgb(width: u32, height: u32, rgb: Vec<u8>) -> Self {
        Self { width, height, rgb }
    }
}

fn over_white(channel: u8, alpha: u16) -> u8 {
    ((channel as u16 * alpha + 255 * (255 - alpha)) / 255) as u8
}

/// Page size in landscape orientation: sides swapped when the snapshot is
/// taller than wide, matching the original export call's behavior with an
/// explicit pixel format.
fn page_size_landscape(width: u32, height: u32) -> (f64, f64) {
    if height > width {
        (height as f64, width as f64)
    } else {
        (width as f64, height as f64)
    }
}

/// Build the export document: one page sized to the snapshot, pixel units,
/// the snapshot as a DeviceRGB image XObject painted to fill the page.
pub fn build_certificate_pdf(snapshot: &Snapshot) -> Result<Vec<u8>, CoreError> {
    let (page_width, page_height) = page_size_landscape(snapshot.width, snapshot.height);

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&snapshot.rgb)
        .map_err(|e| CoreError::Export(e.to_string()))?;
    let compressed = encoder
        .finish()
        .map_err(|e| CoreError::Export(e.to_string()))?;

    let mut doc = Document::with_version("1.5");

    let mut image_dict = Dictionary::new();
    image_dict.set("Type", Object::Name(b"XObject".to_vec()));
    image_dict.set("Subtype", Object::Name(b"Image".to_vec()));
    image_dict.set("Width", Object::Integer(snapshot.width as i64));
    image_dict.set("Height", Object::Integer(snapshot.height as i64));
    image_dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    image_dict.set("BitsPerComponent", Object::Integer(8));
    image_dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
    let image_id = doc.add_object(Object::Stream(Stream::new(image_dict, compressed)));

    // Scale the unit image square up to the page and paint at the origin.
    let content = format!(
        "q\n{} 0 0 {} 0 0 cm\n/Im0 Do\nQ\n",
        page_width, page_height
    );
    let content_id = doc.add_object(Object::Stream(Stream::new(
        Dictionary::new(),
        content.into_bytes(),
    )));

    let mut xobjects = Dictionary::new();
    xobjects.set("Im0", Object::Reference(image_id));
    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    let pages_id = doc.new_object_id();
    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(page_width as f32),
            Object::Real(page_height as f32),
        ]),
    );
    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));
    let page_id = doc.add_object(Object::Dictionary(page_dict));

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
    pages.set("Count", Object::Integer(1));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(Object::Dictionary(catalog));
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| CoreError::Export(e.to_string()))?;
    Ok(buffer)
}

/// Filename for the downloaded document. The candidate name is used raw;
/// only an empty name falls back to the default.
pub fn export_filename(candidate_name: &str) -> String {
    if candidate_name.trim().is_empty() {
        format!("{}.pdf", DEFAULT_EXPORT_NAME)
    } else {
        format!("{}.pdf", candidate_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Encode an RGBA test image to PNG bytes.
    fn rgba_png(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            let data: Vec<u8> = (0..width * height).flat_map(|_| pixel).collect();
            writer.write_image_data(&data).unwrap();
        }
        out
    }

    fn page_media_box(pdf: &[u8]) -> [f64; 4] {
        let doc = Document::load_mem(pdf).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let arr = page.get(b"MediaBox").unwrap().as_array().unwrap();
        let mut out = [0.0; 4];
        for (i, v) in arr.iter().enumerate() {
            out[i] = match v {
                Object::Integer(n) => *n as f64,
                Object::Real(r) => *r as f64,
                _ => panic!("non-numeric MediaBox entry"),
            };
        }
        out
    }

    #[test]
    fn snapshot_decodes_rgba() {
        let png = rgba_png(4, 2, [10, 20, 30, 255]);
        let snap = Snapshot::from_png(&png).unwrap();
        assert_eq!((snap.width, snap.height), (4, 2));
        assert_eq!(snap.rgb.len(), 4 * 2 * 3);
        assert_eq!(&snap.rgb[..3], &[10, 20, 30]);
    }

    #[test]
    fn transparent_pixels_composite_over_white() {
        let png = rgba_png(1, 1, [0, 0, 0, 0]);
        let snap = Snapshot::from_png(&png).unwrap();
        assert_eq!(&snap.rgb[..], &[255, 255, 255]);
    }

    #[test]
    fn garbage_snapshot_rejected() {
        assert!(matches!(
            Snapshot::from_png(b"nope"),
            Err(CoreError::SnapshotDecode(_))
        ));
    }

    #[test]
    fn page_sized_to_snapshot_pixels() {
        let snap = Snapshot::from_rgb(800, 600, vec![255; 800 * 600 * 3]);
        let pdf = build_certificate_pdf(&snap).unwrap();
        assert_eq!(page_media_box(&pdf), [0.0, 0.0, 800.0, 600.0]);
    }

    #[test]
    fn portrait_snapshot_swapped_to_landscape() {
        let snap = Snapshot::from_rgb(200, 300, vec![0; 200 * 300 * 3]);
        let pdf = build_certificate_pdf(&snap).unwrap();
        assert_eq!(page_media_box(&pdf), [0.0, 0.0, 300.0, 200.0]);
    }

    #[test]
    fn export_is_deterministic() {
        let snap = Snapshot::from_rgb(64, 48, vec![128; 64 * 48 * 3]);
        let a = build_certificate_pdf(&snap).unwrap();
        let b = build_certificate_pdf(&snap).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn exported_document_has_one_page() {
        let snap = Snapshot::from_rgb(32, 16, vec![9; 32 * 16 * 3]);
        let pdf = build_certificate_pdf(&snap).unwrap();
        let doc = Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn filename_uses_candidate_name_raw() {
        assert_eq!(export_filename("Ada Lovelace"), "Ada Lovelace.pdf");
    }

    #[test]
    fn empty_name_falls_back() {
        assert_eq!(export_filename(""), "certificate.pdf");
        assert_eq!(export_filename("   "), "certificate.pdf");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: the export page always comes out landscape, and its
        /// area equals the snapshot's pixel area.
        #[test]
        fn landscape_page_preserves_area(w in 1u32..500, h in 1u32..500) {
            let (pw, ph) = page_size_landscape(w, h);
            prop_assert!(pw >= ph);
            prop_assert_eq!(pw * ph, w as f64 * h as f64);
        }

        /// Property: alpha compositing stays within channel range and is
        /// identity for opaque pixels.
        #[test]
        fn over_white_in_range(c in 0u8..=255, a in 0u16..=255) {
            let out = over_white(c, a);
            if a == 255 {
                prop_assert_eq!(out, c);
            }
            if a == 0 {
                prop_assert_eq!(out, 255);
            }
        }
    }
}
