use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::config::Config;
use crate::error::{Result, VisualizerError};
use crate::ir::WorkflowGraph;
use crate::parser::{build_from_value, parse_document, InputFormat};
use crate::render::{render_empty, render_svg};
use crate::scene::{PointerEvent, Scene};

pub const DEFAULT_DOWNLOAD_NAME: &str = "cwl-workflow.svg";
pub const SVG_MIME_TYPE: &str = "image/svg+xml;charset=utf-8";

/// Source of workflow text for [`Visualizer::load_from_url`].
pub trait Fetch {
    fn fetch(&self, url: &Url) -> Result<String>;
}

/// Blocking HTTP loader.
#[cfg(feature = "fetch")]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "fetch")]
impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|err| VisualizerError::Fetch(err.to_string()))?;
        Ok(Self { client })
    }
}

#[cfg(feature = "fetch")]
impl Fetch for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<String> {
        debug!(%url, "fetching workflow");
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|err| VisualizerError::Fetch(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(VisualizerError::Fetch(format!(
                "HTTP error! status: {}",
                status.as_u16()
            )));
        }
        response
            .text()
            .map_err(|err| VisualizerError::Fetch(err.to_string()))
    }
}

/// Host-facing summary of a load attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections: Option<usize>,
}

impl LoadOutcome {
    pub fn loaded(graph: &WorkflowGraph) -> Self {
        Self {
            success: true,
            error: None,
            workflow_id: Some(graph.id.clone()),
            inputs: Some(graph.inputs.len()),
            steps: Some(graph.steps.len()),
            outputs: Some(graph.outputs.len()),
            connections: Some(graph.connections.len()),
        }
    }

    pub fn failed(err: &VisualizerError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
            workflow_id: None,
            inputs: None,
            steps: None,
            outputs: None,
            connections: None,
        }
    }
}

impl<'a> From<Result<&'a WorkflowGraph>> for LoadOutcome {
    fn from(result: Result<&'a WorkflowGraph>) -> Self {
        match result {
            Ok(graph) => LoadOutcome::loaded(graph),
            Err(err) => LoadOutcome::failed(&err),
        }
    }
}

/// What a host needs to offer the current rendering as a file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SvgDownload {
    pub filename: String,
    pub mime_type: &'static str,
    pub contents: String,
}

/// One independently usable visualizer. Each instance owns its workflow,
/// scene and view; loads replace the scene only when they succeed.
#[derive(Debug, Default)]
pub struct Visualizer {
    config: Config,
    scene: Option<Scene>,
}

impl Visualizer {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            scene: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn load_from_text(&mut self, text: &str) -> Result<&WorkflowGraph> {
        self.load_from_text_with_format(text, InputFormat::Auto)
    }

    pub fn load_from_text_with_format(&mut self, text: &str, format: InputFormat) -> Result<&WorkflowGraph> {
        let doc = parse_document(text, format)?;
        self.load_from_object(&doc)
    }

    pub fn load_from_object(&mut self, doc: &Value) -> Result<&WorkflowGraph> {
        check_markers(doc)?;
        let graph = build_from_value(doc)?;
        Ok(self.install(graph))
    }

    pub fn load_from_url(&mut self, url: &str, fetcher: &dyn Fetch) -> Result<&WorkflowGraph> {
        let parsed =
            Url::parse(url).map_err(|err| VisualizerError::Fetch(format!("invalid URL {url}: {err}")))?;
        let text = fetcher.fetch(&parsed)?;
        self.load_from_text(&text)
    }

    pub fn load_from_file(&mut self, path: &Path) -> Result<&WorkflowGraph> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| VisualizerError::Fetch(format!("{}: {err}", path.display())))?;
        let format = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => InputFormat::Json,
            _ => InputFormat::Auto,
        };
        self.load_from_text_with_format(&text, format)
    }

    /// Loads text and reports the result as a structured outcome instead of
    /// an error.
    pub fn load(&mut self, text: &str) -> LoadOutcome {
        self.load_from_text(text).into()
    }

    fn install(&mut self, graph: WorkflowGraph) -> &WorkflowGraph {
        info!(
            id = %graph.id,
            nodes = graph.node_count(),
            connections = graph.connections.len(),
            "workflow loaded"
        );
        let scene = Scene::new(graph, &self.config);
        &self.scene.insert(scene).graph
    }

    pub fn clear(&mut self) {
        if self.scene.take().is_some() {
            debug!("visualizer cleared");
        }
    }

    pub fn workflow(&self) -> Option<&WorkflowGraph> {
        self.scene.as_ref().map(|scene| &scene.graph)
    }

    pub fn export_svg(&self) -> String {
        match &self.scene {
            Some(scene) => render_svg(scene, &self.config.theme),
            None => render_empty(&self.config.theme, &self.config.render),
        }
    }

    pub fn download_svg(&self, filename: Option<&str>) -> SvgDownload {
        let filename = filename
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_DOWNLOAD_NAME);
        SvgDownload {
            filename: filename.to_string(),
            mime_type: SVG_MIME_TYPE,
            contents: self.export_svg(),
        }
    }

    pub fn zoom(&mut self, factor: f32) {
        if let Some(scene) = &mut self.scene {
            scene.zoom(factor);
        }
    }

    pub fn zoom_level(&self) -> f32 {
        self.scene.as_ref().map_or(1.0, |scene| scene.view.zoom)
    }

    pub fn reset_view(&mut self) {
        if let Some(scene) = &mut self.scene {
            scene.reset_view();
        }
    }

    pub fn auto_layout(&mut self) {
        if let Some(scene) = &mut self.scene {
            scene.auto_layout();
        }
    }

    pub fn fit_to_content(&mut self) {
        if let Some(scene) = &mut self.scene {
            scene.fit_to_content();
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.config.render.width = width;
        self.config.render.height = height;
        if let Some(scene) = &mut self.scene {
            scene.resize(width, height);
        }
    }

    pub fn clear_selection(&mut self) -> bool {
        self.scene
            .as_mut()
            .is_some_and(|scene| scene.clear_selection())
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        match &mut self.scene {
            Some(scene) => scene.handle(event),
            None => false,
        }
    }
}

/// A loadable object names its CWL version and either a process class or a
/// `$graph` bundle.
fn check_markers(doc: &Value) -> Result<()> {
    let Some(map) = doc.as_object() else {
        return Err(VisualizerError::InvalidFormat(
            "workflow document must be an object".to_string(),
        ));
    };
    let has_version = map.get("cwlVersion").is_some_and(|v| !v.is_null());
    let has_class = map.contains_key("class") || map.contains_key("$graph");
    if has_version && has_class {
        Ok(())
    } else {
        Err(VisualizerError::InvalidFormat(
            "missing class or cwlVersion".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    struct StaticFetcher {
        body: std::result::Result<String, String>,
        requested: RefCell<Vec<String>>,
    }

    impl StaticFetcher {
        fn ok(body: &str) -> Self {
            Self {
                body: Ok(body.to_string()),
                requested: RefCell::new(Vec::new()),
            }
        }

        fn status(code: u16) -> Self {
            Self {
                body: Err(format!("HTTP error! status: {code}")),
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl Fetch for StaticFetcher {
        fn fetch(&self, url: &Url) -> Result<String> {
            self.requested.borrow_mut().push(url.to_string());
            self.body.clone().map_err(VisualizerError::Fetch)
        }
    }

    const TOOL: &str = r#"{
        "cwlVersion": "v1.2",
        "class": "CommandLineTool",
        "id": "cat",
        "inputs": {"a": "File", "b": "File"},
        "outputs": {"out": "File"}
    }"#;

    #[test]
    fn tool_loads_with_three_connections() {
        let mut viz = Visualizer::default();
        let graph = viz.load_from_text(TOOL).unwrap();
        assert_eq!(graph.inputs.len(), 2);
        assert_eq!(graph.steps.len(), 1);
        assert_eq!(graph.outputs.len(), 1);
        let pairs: Vec<(String, String)> = graph
            .connections
            .iter()
            .map(|c| (c.from.id.clone(), c.to.id.clone()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "cat".to_string()),
                ("b".to_string(), "cat".to_string()),
                ("cat".to_string(), "out".to_string()),
            ]
        );
    }

    #[test]
    fn missing_markers_are_invalid_and_keep_previous_scene() {
        let mut viz = Visualizer::default();
        viz.load_from_text(TOOL).unwrap();
        let err = viz
            .load_from_object(&json!({"class": "Workflow", "steps": {}}))
            .unwrap_err();
        assert!(matches!(err, VisualizerError::InvalidFormat(_)));
        assert_eq!(viz.workflow().map(|g| g.id.as_str()), Some("workflow_cat"));

        let err = viz.load_from_object(&json!({"cwlVersion": "v1.0"})).unwrap_err();
        assert!(matches!(err, VisualizerError::InvalidFormat(_)));
    }

    #[test]
    fn load_reports_structured_outcome() {
        let mut viz = Visualizer::default();
        let outcome = viz.load("{ not json");
        assert!(!outcome.success);
        assert!(outcome.error.as_deref().unwrap_or("").contains("parse"));
        assert!(viz.workflow().is_none());

        let outcome = viz.load(TOOL);
        assert!(outcome.success);
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["workflowId"], "workflow_cat");
        assert_eq!(value["connections"], 3);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn url_loads_go_through_the_fetcher() {
        let mut viz = Visualizer::default();
        let fetcher = StaticFetcher::ok(TOOL);
        viz.load_from_url("https://example.org/cat.cwl", &fetcher).unwrap();
        assert_eq!(fetcher.requested.borrow().as_slice(), ["https://example.org/cat.cwl"]);

        let err = viz.load_from_url("not a url", &fetcher).unwrap_err();
        assert!(matches!(err, VisualizerError::Fetch(_)));

        let err = viz
            .load_from_url("https://example.org/missing.cwl", &StaticFetcher::status(404))
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to fetch workflow: HTTP error! status: 404");
        assert!(viz.workflow().is_some());
    }

    #[test]
    fn file_loads_and_read_errors() {
        let path = std::env::temp_dir().join("cwl_svg_renderer_visualizer_test.json");
        std::fs::write(&path, TOOL).unwrap();
        let mut viz = Visualizer::default();
        assert!(viz.load_from_file(&path).is_ok());
        let _ = std::fs::remove_file(&path);

        let err = viz.load_from_file(Path::new("/nonexistent/dir/wf.cwl")).unwrap_err();
        assert!(matches!(err, VisualizerError::Fetch(_)));
    }

    #[test]
    fn clear_is_idempotent_and_export_falls_back_to_empty() {
        let mut viz = Visualizer::default();
        viz.load(TOOL);
        assert!(viz.export_svg().contains("data-id=\"cat\""));
        viz.clear();
        viz.clear();
        assert!(viz.workflow().is_none());
        let svg = viz.export_svg();
        assert!(svg.starts_with("<svg"));
        assert!(!svg.contains("data-id"));
    }

    #[test]
    fn download_uses_default_name() {
        let mut viz = Visualizer::default();
        viz.load(TOOL);
        let download = viz.download_svg(None);
        assert_eq!(download.filename, "cwl-workflow.svg");
        assert_eq!(download.mime_type, "image/svg+xml;charset=utf-8");
        assert_eq!(download.contents, viz.export_svg());
        assert_eq!(viz.download_svg(Some("mine.svg")).filename, "mine.svg");
    }

    #[test]
    fn view_operations_without_scene_are_noops() {
        let mut viz = Visualizer::default();
        viz.zoom(2.0);
        viz.reset_view();
        viz.auto_layout();
        viz.fit_to_content();
        assert_eq!(viz.zoom_level(), 1.0);
        assert!(!viz.handle_pointer(PointerEvent::Leave));
    }

    #[test]
    fn zoom_and_inverse_restore_level() {
        let mut viz = Visualizer::default();
        viz.load(TOOL);
        let start = viz.zoom_level();
        viz.zoom(1.25);
        viz.zoom(0.8);
        assert!((viz.zoom_level() - start).abs() < 1e-5);
        viz.zoom(1.5);
        viz.reset_view();
        assert!((viz.zoom_level() - start).abs() < 1e-5);
    }

    #[test]
    fn clear_selection_restores_normal_edges() {
        let mut viz = Visualizer::default();
        viz.load(TOOL);
        assert!(!viz.clear_selection());

        let scene = viz.scene().unwrap();
        let (x, y) = scene.position("cat").unwrap();
        let (sx, sy) = scene.view.to_screen(x, y);
        viz.handle_pointer(PointerEvent::Down {
            x: sx,
            y: sy,
            modifiers: Default::default(),
        });
        viz.handle_pointer(PointerEvent::Up { x: sx, y: sy });
        assert!(viz.scene().unwrap().is_selected("cat"));

        assert!(viz.clear_selection());
        let scene = viz.scene().unwrap();
        assert!(scene.selection.is_empty());
        assert!(scene
            .edges
            .iter()
            .all(|edge| scene.edge_state(edge) == crate::scene::EdgeState::Normal));
        assert!(!viz.export_svg().contains("edge dimmed"));
    }

    #[test]
    fn instances_are_independent() {
        let mut first = Visualizer::default();
        let second = Visualizer::default();
        first.load(TOOL);
        assert!(first.workflow().is_some());
        assert!(second.workflow().is_none());
    }
}
