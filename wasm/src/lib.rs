use cwl_svg_renderer::config::parse_config;
use cwl_svg_renderer::{Config, PointerEvent, Visualizer};
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn to_js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(to_js_error)
}

fn build_config(options_json: Option<String>) -> Result<Config, JsValue> {
    match options_json {
        Some(raw) if !raw.trim().is_empty() => parse_config(&raw).map_err(to_js_error),
        _ => Ok(Config::default()),
    }
}

/// A visualizer instance bound to one host element. Options use the same
/// JSON shape as the CLI config file.
#[wasm_bindgen]
pub struct CwlVisualizer {
    inner: Visualizer,
}

#[wasm_bindgen]
impl CwlVisualizer {
    #[wasm_bindgen(constructor)]
    pub fn new(options_json: Option<String>) -> Result<CwlVisualizer, JsValue> {
        Ok(Self {
            inner: Visualizer::new(build_config(options_json)?),
        })
    }

    /// Returns `{ success, error?, workflowId?, inputs?, steps?, outputs?, connections? }`.
    pub fn load(&mut self, text: &str) -> Result<String, JsValue> {
        to_json(&self.inner.load(text))
    }

    #[wasm_bindgen(js_name = loadObject)]
    pub fn load_object(&mut self, json: &str) -> Result<String, JsValue> {
        let doc: serde_json::Value = serde_json::from_str(json).map_err(to_js_error)?;
        to_json(&cwl_svg_renderer::LoadOutcome::from(self.inner.load_from_object(&doc)))
    }

    #[wasm_bindgen(js_name = exportSvg)]
    pub fn export_svg(&self) -> String {
        self.inner.export_svg()
    }

    #[wasm_bindgen(js_name = downloadSvg)]
    pub fn download_svg(&self, filename: Option<String>) -> Result<String, JsValue> {
        to_json(&self.inner.download_svg(filename.as_deref()))
    }

    pub fn zoom(&mut self, factor: f32) {
        self.inner.zoom(factor);
    }

    #[wasm_bindgen(js_name = zoomLevel)]
    pub fn zoom_level(&self) -> f32 {
        self.inner.zoom_level()
    }

    #[wasm_bindgen(js_name = resetView)]
    pub fn reset_view(&mut self) {
        self.inner.reset_view();
    }

    #[wasm_bindgen(js_name = autoLayout)]
    pub fn auto_layout(&mut self) {
        self.inner.auto_layout();
    }

    #[wasm_bindgen(js_name = fitToContent)]
    pub fn fit_to_content(&mut self) {
        self.inner.fit_to_content();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.inner.resize(width, height);
    }

    /// Returns whether a selection was dropped.
    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) -> bool {
        self.inner.clear_selection()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// The loaded workflow model as JSON, or `null`.
    pub fn workflow(&self) -> Result<String, JsValue> {
        to_json(&self.inner.workflow())
    }

    /// Feeds one pointer event (`{"type": "down", "x": .., "y": ..}` etc).
    /// Returns whether the scene changed and should be re-exported.
    pub fn pointer(&mut self, event_json: &str) -> Result<bool, JsValue> {
        let event: PointerEvent = serde_json::from_str(event_json).map_err(to_js_error)?;
        Ok(self.inner.handle_pointer(event))
    }
}

/// One-shot rendering of a workflow document to SVG.
#[wasm_bindgen]
pub fn render_cwl_svg(text: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let mut visualizer = Visualizer::new(build_config(options_json)?);
    visualizer.load_from_text(text).map_err(to_js_error)?;
    Ok(visualizer.export_svg())
}
