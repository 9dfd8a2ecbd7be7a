//! CertForge - certificate layout editor
//!
//! Browser surface of the layout & export engine. The host page owns the
//! DOM and its event listeners; every listener forwards the raw event data
//! into [`CertificateEditor`], which measures, clamps, and commits within
//! the same call.

use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, HtmlImageElement};

pub mod download;
pub mod snapshot;

use certforge_core::{
    export_filename, input, payload::CodePayload, template::TemplatePage, CoreError, EditorSession,
    ElementKey, NudgeKey, Snapshot,
};
use certforge_types::FieldRecord;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"CertForge WASM initialized".into());
}

fn js_err(e: CoreError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn element_key(key: &str) -> Result<ElementKey, JsValue> {
    ElementKey::parse(key).ok_or_else(|| JsValue::from_str(&format!("Unknown overlay slot: {}", key)))
}

fn position_js(position: certforge_core::Position) -> Result<JsValue, JsValue> {
    let out = js_sys::Object::new();
    js_sys::Reflect::set(&out, &"x".into(), &position.x.into())?;
    js_sys::Reflect::set(&out, &"y".into(), &position.y.into())?;
    Ok(out.into())
}

/// One certificate editing session: the field record and template handed
/// over by the intake form, the background image once rasterized, and the
/// live layout state.
#[wasm_bindgen]
pub struct CertificateEditor {
    record: Option<FieldRecord>,
    payload: Option<CodePayload>,
    template: Option<TemplatePage>,
    background: Option<String>,
    session: EditorSession,
}

impl Default for CertificateEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl CertificateEditor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            record: None,
            payload: None,
            template: None,
            background: None,
            session: EditorSession::new(),
        }
    }

    /// Take over the intake form's record (JSON, camelCase keys). The
    /// record is already validated by the intake form and is immutable for
    /// the rest of the session.
    #[wasm_bindgen(js_name = loadRecord)]
    pub fn load_record(&mut self, json: &str) -> Result<(), JsValue> {
        let record: FieldRecord = serde_json::from_str(json)
            .map_err(|e| JsValue::from_str(&format!("Invalid field record: {}", e)))?;
        self.payload = Some(CodePayload::new(&record).map_err(js_err)?);
        self.record = Some(record);
        Ok(())
    }

    /// Decode the uploaded template and return the raster viewport the host
    /// canvas must be sized to: `{width, height, scale}` at the fixed 2x
    /// scale. A second call replaces the template; there is no cancellation
    /// of a host paint already in flight.
    #[wasm_bindgen(js_name = loadTemplate)]
    pub fn load_template(&mut self, bytes: Vec<u8>) -> Result<JsValue, JsValue> {
        let template = TemplatePage::from_bytes(&bytes).map_err(js_err)?;
        let viewport = template.viewport();
        self.template = Some(template);

        let info = js_sys::Object::new();
        js_sys::Reflect::set(&info, &"width".into(), &viewport.width.into())?;
        js_sys::Reflect::set(&info, &"height".into(), &viewport.height.into())?;
        js_sys::Reflect::set(&info, &"scale".into(), &viewport.scale.into())?;
        Ok(info.into())
    }

    /// Capture the host-rendered template page as the session background.
    /// Once set it does not change for the session; later captures are
    /// ignored.
    #[wasm_bindgen(js_name = captureBackground)]
    pub fn capture_background(&mut self, canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
        if self.background.is_none() {
            self.background = Some(canvas.to_data_url()?);
        }
        Ok(())
    }

    /// Data URI of the background image, once rasterized.
    #[wasm_bindgen(js_name = backgroundImage)]
    pub fn background_image(&self) -> Option<String> {
        self.background.clone()
    }

    /// Whether a source document has been supplied this session.
    #[wasm_bindgen(js_name = hasTemplate)]
    pub fn has_template(&self) -> bool {
        self.template.is_some()
    }

    /// Page count of the loaded template. Only the first page is ever
    /// rasterized; the count is informational.
    #[wasm_bindgen(js_name = templatePageCount)]
    pub fn template_page_count(&self) -> u32 {
        self.template.as_ref().map(|t| t.page_count() as u32).unwrap_or(0)
    }

    /// Overlays render only when both the record and the background are
    /// present; until then the host shows the not-ready state.
    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.record.is_some() && self.background.is_some()
    }

    /// Display text for a text overlay slot.
    #[wasm_bindgen(js_name = overlayText)]
    pub fn overlay_text(&self, key: &str) -> Result<String, JsValue> {
        let record = self
            .record
            .as_ref()
            .ok_or_else(|| JsValue::from_str("No field record loaded"))?;
        match element_key(key)? {
            ElementKey::Name => Ok(record.candidate_name.clone()),
            ElementKey::Course => Ok(record.course_name.clone()),
            ElementKey::Tenure => Ok(record.tenure_text()),
            ElementKey::Description => Ok(record.description.clone()),
            ElementKey::Code => Err(JsValue::from_str("Code overlay has no text")),
        }
    }

    /// SVG for the scannable code overlay.
    #[wasm_bindgen(js_name = codeSvg)]
    pub fn code_svg(&self) -> Result<String, JsValue> {
        self.payload
            .as_ref()
            .ok_or_else(|| JsValue::from_str("No field record loaded"))?
            .svg()
            .map_err(js_err)
    }

    /// Current position of a slot: `{x, y}` in container pixels.
    #[wasm_bindgen(js_name = elementPosition)]
    pub fn element_position(&self, key: &str) -> Result<JsValue, JsValue> {
        position_js(self.session.position_of(element_key(key)?))
    }

    /// Drag-end of an element: clamp the pointer position against the
    /// container and the element's measured box, commit, and return the
    /// committed `{x, y}`.
    #[wasm_bindgen(js_name = pointerDrop)]
    #[allow(clippy::too_many_arguments)]
    pub fn pointer_drop(
        &mut self,
        key: &str,
        client_x: f64,
        client_y: f64,
        container_left: f64,
        container_top: f64,
        container_width: f64,
        container_height: f64,
        element_width: f64,
        element_height: f64,
    ) -> Result<JsValue, JsValue> {
        let key = element_key(key)?;
        let position = input::pointer_drop(
            input::ContainerBounds {
                left: container_left,
                top: container_top,
                width: container_width,
                height: container_height,
            },
            input::ElementBox {
                width: element_width,
                height: element_height,
            },
            client_x,
            client_y,
        );
        self.session.set_position(key, position);
        position_js(position)
    }

    /// Focus-gain of an overlay.
    #[wasm_bindgen(js_name = focusElement)]
    pub fn focus_element(&mut self, key: &str) -> Result<(), JsValue> {
        self.session.focus(element_key(key)?);
        Ok(())
    }

    /// Focus-loss of an overlay. Clears focus only when this slot holds it.
    #[wasm_bindgen(js_name = blurElement)]
    pub fn blur_element(&mut self, key: &str) -> Result<(), JsValue> {
        self.session.blur(element_key(key)?);
        Ok(())
    }

    /// Keydown on an overlay. Commits at most one nudge; returns whether a
    /// move happened (false for non-arrow keys or when the slot is not
    /// focused).
    #[wasm_bindgen(js_name = keyNudge)]
    pub fn key_nudge(&mut self, key: &str, event_key: &str) -> Result<bool, JsValue> {
        let key = element_key(key)?;
        let Some(nudge) = NudgeKey::from_event_key(event_key) else {
            return Ok(false);
        };
        Ok(self.session.nudge_focused(key, nudge).is_some())
    }

    /// Touch-start: anchor the finger offset against the element corner.
    #[wasm_bindgen(js_name = touchStart)]
    pub fn touch_start(
        &mut self,
        key: &str,
        touch_x: f64,
        touch_y: f64,
        element_left: f64,
        element_top: f64,
    ) -> Result<(), JsValue> {
        let key = element_key(key)?;
        let anchor = input::touch_anchor_at(touch_x, touch_y, element_left, element_top);
        self.session.set_touch_anchor(key, anchor);
        Ok(())
    }

    /// Touch-move: commit the anchored, clamped position and return it, or
    /// `null` when no anchor was recorded for this slot. The host calls
    /// `preventDefault()` on the event to suppress scrolling.
    #[wasm_bindgen(js_name = touchMove)]
    #[allow(clippy::too_many_arguments)]
    pub fn touch_move(
        &mut self,
        key: &str,
        touch_x: f64,
        touch_y: f64,
        container_left: f64,
        container_top: f64,
        container_width: f64,
        container_height: f64,
    ) -> Result<JsValue, JsValue> {
        let key = element_key(key)?;
        let Some(anchor) = self.session.touch_anchor(key) else {
            return Ok(JsValue::NULL);
        };
        let position = input::touch_move(
            input::ContainerBounds {
                left: container_left,
                top: container_top,
                width: container_width,
                height: container_height,
            },
            anchor,
            touch_x,
            touch_y,
        );
        self.session.set_position(key, position);
        position_js(position)
    }

    /// Snapshot the composition (background + overlays at their current
    /// positions) and return it as PNG bytes.
    #[wasm_bindgen(js_name = composeSnapshot)]
    pub fn compose_snapshot(
        &self,
        background: &HtmlImageElement,
        container_width: f64,
        container_height: f64,
    ) -> Result<Vec<u8>, JsValue> {
        let record = self
            .record
            .as_ref()
            .ok_or_else(|| JsValue::from_str("No field record loaded"))?;
        let payload = self
            .payload
            .as_ref()
            .ok_or_else(|| JsValue::from_str("No field record loaded"))?;
        if self.background.is_none() {
            return Err(JsValue::from_str("No background rasterized"));
        }

        let data_url = snapshot::compose(
            background,
            container_width,
            container_height,
            &self.session,
            record,
            payload,
        )?;
        snapshot::png_bytes_from_data_url(&data_url)
    }

    /// Flatten a snapshot into the export document.
    #[wasm_bindgen(js_name = exportPdf)]
    pub fn export_pdf(&self, snapshot_png: &[u8]) -> Result<Vec<u8>, JsValue> {
        let snapshot = Snapshot::from_png(snapshot_png).map_err(js_err)?;
        certforge_core::build_certificate_pdf(&snapshot).map_err(js_err)
    }

    /// Filename the export will be saved under.
    #[wasm_bindgen(js_name = exportFilename)]
    pub fn export_filename(&self) -> String {
        let name = self
            .record
            .as_ref()
            .map(|r| r.candidate_name.as_str())
            .unwrap_or("");
        export_filename(name)
    }

    /// Build the export document from a snapshot and trigger the local
    /// save. One atomic action; a failure produces no file.
    #[wasm_bindgen(js_name = downloadPdf)]
    pub fn download_pdf(&self, snapshot_png: &[u8]) -> Result<(), JsValue> {
        let pdf = self.export_pdf(snapshot_png)?;
        download::save_file(&pdf, &self.export_filename())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_json() -> &'static str {
        concat!(
            "{\"id\":\"1\",\"candidateName\":\"Ada Lovelace\",",
            "\"courseName\":\"Engines\",\"courseId\":\"E-1\",",
            "\"startDate\":\"2024-01-01\",\"endDate\":\"2024-02-01\",",
            "\"description\":\"Done\"}",
        )
    }

    #[test]
    fn editor_starts_not_ready() {
        let editor = CertificateEditor::new();
        assert!(!editor.is_ready());
        assert!(editor.background_image().is_none());
        assert!(!editor.has_template());
        assert_eq!(editor.template_page_count(), 0);
    }

    #[test]
    fn record_alone_is_not_ready() {
        let mut editor = CertificateEditor::new();
        editor.load_record(record_json()).unwrap();
        assert!(!editor.is_ready());
    }

    #[test]
    fn overlay_text_per_slot() {
        let mut editor = CertificateEditor::new();
        editor.load_record(record_json()).unwrap();
        assert_eq!(editor.overlay_text("Name").unwrap(), "Ada Lovelace");
        assert_eq!(editor.overlay_text("Course").unwrap(), "Engines");
        assert_eq!(
            editor.overlay_text("Tenure").unwrap(),
            "2024-01-01 to 2024-02-01"
        );
        assert_eq!(editor.overlay_text("Description").unwrap(), "Done");
    }

    #[test]
    fn filename_tracks_candidate_name() {
        let mut editor = CertificateEditor::new();
        assert_eq!(editor.export_filename(), "certificate.pdf");
        editor.load_record(record_json()).unwrap();
        assert_eq!(editor.export_filename(), "Ada Lovelace.pdf");
    }

    #[test]
    fn nudge_only_while_focused() {
        let mut editor = CertificateEditor::new();
        assert!(!editor.key_nudge("Name", "ArrowDown").unwrap());
        editor.focus_element("Name").unwrap();
        assert!(editor.key_nudge("Name", "ArrowDown").unwrap());
        assert!(!editor.key_nudge("Name", "Enter").unwrap());
        editor.blur_element("Name").unwrap();
        assert!(!editor.key_nudge("Name", "ArrowDown").unwrap());
    }
}

// Browser-only coverage for the canvas and download paths.
#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn capture_background_from_canvas() {
        let document = web_sys::window().unwrap().document().unwrap();
        let canvas: web_sys::HtmlCanvasElement = document
            .create_element("canvas")
            .unwrap()
            .dyn_into()
            .unwrap();
        canvas.set_width(10);
        canvas.set_height(10);

        let mut editor = CertificateEditor::new();
        editor.capture_background(&canvas).unwrap();
        let uri = editor.background_image().unwrap();
        assert!(uri.starts_with("data:image/png"));
    }

    #[wasm_bindgen_test]
    fn bad_record_json_rejected() {
        let mut editor = CertificateEditor::new();
        assert!(editor.load_record("{\"id\":").is_err());
    }

    #[wasm_bindgen_test]
    fn code_slot_has_no_text() {
        let mut editor = CertificateEditor::new();
        editor
            .load_record(concat!(
                "{\"id\":\"1\",\"candidateName\":\"A\",",
                "\"courseName\":\"B\",\"courseId\":\"C\",",
                "\"startDate\":\"2024-01-01\",\"endDate\":\"2024-02-01\",",
                "\"description\":\"D\"}",
            ))
            .unwrap();
        assert!(editor.overlay_text("Code").is_err());
    }

    #[wasm_bindgen_test]
    fn unknown_slot_rejected() {
        let mut editor = CertificateEditor::new();
        assert!(editor.focus_element("QR").is_err());
    }

    #[wasm_bindgen_test]
    fn pointer_drop_commits_clamped_position() {
        let mut editor = CertificateEditor::new();
        let value = editor
            .pointer_drop("Name", 750.0, 590.0, 0.0, 0.0, 800.0, 600.0, 100.0, 30.0)
            .unwrap();
        let x = js_sys::Reflect::get(&value, &"x".into()).unwrap().as_f64();
        let y = js_sys::Reflect::get(&value, &"y".into()).unwrap().as_f64();
        assert_eq!(x, Some(700.0));
        assert_eq!(y, Some(570.0));
    }

    #[wasm_bindgen_test]
    fn touch_move_without_anchor_is_null() {
        let mut editor = CertificateEditor::new();
        let value = editor
            .touch_move("Name", 100.0, 100.0, 0.0, 0.0, 800.0, 600.0)
            .unwrap();
        assert!(value.is_null());
    }
}
