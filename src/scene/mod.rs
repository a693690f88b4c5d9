mod details;
mod interaction;
mod labels;
mod view;

pub use details::{DetailsPanel, PortDetails, ROW_HEIGHT, StepDetails};
pub use interaction::{Modifiers, PointerEvent};
pub use labels::{PortLabel, label_width};
pub use view::{Bounds, ViewState};

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use indexmap::IndexSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::ir::{Connection, WorkflowGraph};
use crate::layout::{compute_layout, Layout, NodeLayout};
use crate::ports::{self, input_ports, output_ports, port_coordinate, PortSide};
use crate::routing::{route_connection, Bias, ConnectionPath};

const PORT_HIT_SLOP: f32 = 3.0;
const TITLE_OFFSET: f32 = 30.0;
const TITLE_CHAR_WIDTH: f32 = 8.0;

/// What the pointer is currently doing to the scene.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Mode {
    #[default]
    Ready,
    Panning {
        origin: (f32, f32),
        start_pan: (f32, f32),
    },
    Dragging {
        node_id: String,
        origin: (f32, f32),
        node_start: (f32, f32),
        moved: bool,
    },
}

/// Topmost scene element under a screen point.
#[derive(Debug, Clone, PartialEq)]
pub enum Hit {
    DetailsClose,
    Panel,
    Port {
        node_id: String,
        port_id: String,
        side: PortSide,
    },
    Node(String),
    Background,
}

impl Hit {
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Hit::Port { node_id, .. } => Some(node_id),
            Hit::Node(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeState {
    Normal,
    Highlighted,
    Dimmed,
}

/// A connection together with its current route. `path` is `None` when an
/// endpoint has no position.
#[derive(Debug, Clone, Serialize)]
pub struct SceneEdge {
    pub connection: Connection,
    pub path: Option<ConnectionPath>,
}

/// Port labels currently shown for the hovered node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverLabels {
    pub node_id: String,
    pub labels: Vec<PortLabel>,
}

/// In-memory state of one rendered workflow. The SVG is produced from this
/// by [`crate::render::render_svg`]; nothing is ever read back from markup.
#[derive(Debug, Clone)]
pub struct Scene {
    pub graph: WorkflowGraph,
    pub layout: Layout,
    pub edges: Vec<SceneEdge>,
    pub view: ViewState,
    pub selection: IndexSet<String>,
    pub hover: Option<HoverLabels>,
    pub details: Option<DetailsPanel>,
    pub mode: Mode,
    pub bias: Bias,
    config: Config,
}

impl Scene {
    pub fn new(graph: WorkflowGraph, config: &Config) -> Self {
        let layout = compute_layout(&graph, &config.layout, &config.render);
        Self::with_layout(graph, layout, config)
    }

    /// Builds a scene from a precomputed layout. Nodes the layout does not
    /// place get a pseudo-random position derived from their id.
    pub fn with_layout(graph: WorkflowGraph, mut layout: Layout, config: &Config) -> Self {
        fill_missing_positions(&graph, &mut layout, config);
        let edges = graph
            .connections
            .iter()
            .map(|connection| SceneEdge {
                connection: connection.clone(),
                path: None,
            })
            .collect();
        let mut scene = Self {
            graph,
            layout,
            edges,
            view: ViewState::default(),
            selection: IndexSet::new(),
            hover: None,
            details: None,
            mode: Mode::Ready,
            bias: Bias::default(),
            config: config.clone(),
        };
        scene.reroute_all();
        scene.fit_to_content();
        debug!(
            nodes = scene.layout.nodes.len(),
            edges = scene.edges.len(),
            zoom = scene.view.zoom,
            "scene ready"
        );
        scene
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn canvas_size(&self) -> (f32, f32) {
        (self.config.render.width, self.config.render.height)
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.config.render.width = width;
        self.config.render.height = height;
        self.refresh_labels();
    }

    pub fn position(&self, id: &str) -> Option<(f32, f32)> {
        self.layout.position(id)
    }

    pub fn node_radius(&self, id: &str) -> f32 {
        ports::node_radius(&self.graph, id, &self.config.ports)
    }

    pub fn visible_bounds(&self) -> Bounds {
        let (width, height) = self.canvas_size();
        self.view.visible_bounds(width, height)
    }

    fn route(&self, connection: &Connection) -> Option<ConnectionPath> {
        route_connection(&self.graph, &self.layout, connection, &self.config.ports, self.bias)
    }

    fn reroute_all(&mut self) {
        for idx in 0..self.edges.len() {
            let path = self.route(&self.edges[idx].connection);
            if path.is_none() {
                warn!(
                    from = %self.edges[idx].connection.from.id,
                    to = %self.edges[idx].connection.to.id,
                    "connection endpoint has no position, edge skipped"
                );
            }
            self.edges[idx].path = path;
        }
    }

    /// Re-routes only the edges touching `node_id`; returns how many.
    fn reroute_node(&mut self, node_id: &str) -> usize {
        let mut count = 0;
        for idx in 0..self.edges.len() {
            if self.edges[idx].connection.touches(node_id) {
                let path = self.route(&self.edges[idx].connection);
                self.edges[idx].path = path;
                count += 1;
            }
        }
        count
    }

    /// Moves a node centre and updates its edges and hover labels.
    pub fn move_node(&mut self, node_id: &str, x: f32, y: f32) -> bool {
        if !self.layout.set_position(node_id, x, y) {
            return false;
        }
        self.reroute_node(node_id);
        if self.hover.as_ref().is_some_and(|h| h.node_id == node_id) {
            self.refresh_labels();
        }
        true
    }

    pub fn select_node(&mut self, node_id: &str, additive: bool) {
        if !additive {
            self.selection.clear();
        }
        self.selection.insert(node_id.to_string());
    }

    /// Drops every selected node; returns whether anything was selected.
    pub fn clear_selection(&mut self) -> bool {
        let had_selection = !self.selection.is_empty();
        self.selection.clear();
        had_selection
    }

    pub fn is_selected(&self, node_id: &str) -> bool {
        self.selection.contains(node_id)
    }

    pub fn edge_state(&self, edge: &SceneEdge) -> EdgeState {
        if self.selection.is_empty() {
            EdgeState::Normal
        } else if self.selection.iter().any(|id| edge.connection.touches(id)) {
            EdgeState::Highlighted
        } else {
            EdgeState::Dimmed
        }
    }

    /// Scene-space box around node circles, titles and edge control hulls.
    pub fn content_bounds(&self) -> Bounds {
        let mut bounds = Bounds::empty();
        for node in self.layout.nodes.values() {
            let r = self.node_radius(&node.id);
            bounds.include_circle(node.x, node.y, r);
            let title = self.graph.node_label(&node.id).unwrap_or(node.id.as_str());
            let half = title.chars().count() as f32 * TITLE_CHAR_WIDTH / 2.0;
            let baseline = node.y + r + TITLE_OFFSET;
            bounds.include(node.x - half, baseline - self.config.theme.title_font_size);
            bounds.include(node.x + half, baseline + 4.0);
        }
        for edge in &self.edges {
            if let Some(path) = &edge.path {
                for (x, y) in path.points() {
                    bounds.include(x, y);
                }
            }
        }
        bounds
    }

    pub fn fit_to_content(&mut self) {
        let bounds = self.content_bounds();
        let (width, height) = self.canvas_size();
        self.view.fit(&bounds, width, height, &self.config.view);
        self.refresh_labels();
    }

    pub fn zoom(&mut self, factor: f32) {
        self.view.zoom_by(factor, &self.config.view);
        self.refresh_labels();
    }

    pub fn reset_view(&mut self) {
        self.view = ViewState::default();
        self.fit_to_content();
    }

    /// Recomputes the layered layout, discarding manual moves.
    pub fn auto_layout(&mut self) {
        let mut layout = compute_layout(&self.graph, &self.config.layout, &self.config.render);
        fill_missing_positions(&self.graph, &mut layout, &self.config);
        self.layout = layout;
        self.reroute_all();
        self.fit_to_content();
    }

    pub fn hit_test(&self, x: f32, y: f32) -> Hit {
        let (sx, sy) = self.view.to_scene(x, y);
        if let Some(panel) = &self.details {
            if panel.hits_close(sx, sy) {
                return Hit::DetailsClose;
            }
            if panel.contains(sx, sy) {
                return Hit::Panel;
            }
        }

        let handle = self.config.ports.handle_radius + PORT_HIT_SLOP;
        for node in self.layout.nodes.values().rev() {
            for side in [PortSide::Input, PortSide::Output] {
                for port_id in ports::port_ids(&self.graph, &node.id, side) {
                    let Some((px, py)) =
                        port_coordinate(&self.graph, &node.id, (node.x, node.y), port_id, side, &self.config.ports)
                    else {
                        continue;
                    };
                    if (sx - px).hypot(sy - py) <= handle {
                        return Hit::Port {
                            node_id: node.id.clone(),
                            port_id: port_id.to_string(),
                            side,
                        };
                    }
                }
            }
            if (sx - node.x).hypot(sy - node.y) <= self.node_radius(&node.id) {
                return Hit::Node(node.id.clone());
            }
        }
        Hit::Background
    }

    pub fn show_labels(&mut self, node_id: &str) {
        let Some(center) = self.position(node_id) else {
            return;
        };
        let visible = self.visible_bounds();
        let labels = input_ports(&self.graph, node_id)
            .into_iter()
            .chain(output_ports(&self.graph, node_id))
            .filter_map(|port| {
                let anchor = port_coordinate(&self.graph, node_id, center, &port.id, port.side, &self.config.ports)?;
                Some(PortLabel::new(&port, anchor, &visible))
            })
            .collect();
        self.hover = Some(HoverLabels {
            node_id: node_id.to_string(),
            labels,
        });
    }

    pub fn hide_labels(&mut self) -> bool {
        self.hover.take().is_some()
    }

    /// Repositions the shown labels without rebuilding them.
    fn refresh_labels(&mut self) {
        let visible = self.visible_bounds();
        let Some(hover) = self.hover.as_mut() else {
            return;
        };
        let Some(center) = self.layout.position(&hover.node_id) else {
            return;
        };
        for label in &mut hover.labels {
            if let Some(anchor) = port_coordinate(
                &self.graph,
                &hover.node_id,
                center,
                &label.port_id,
                label.side,
                &self.config.ports,
            ) {
                label.place(anchor, &visible);
            }
        }
    }

    pub fn show_step_details(&mut self, node_id: &str) -> bool {
        let Some(center) = self.position(node_id) else {
            return false;
        };
        match StepDetails::new(&self.graph, node_id, center) {
            Some(panel) => {
                self.details = Some(DetailsPanel::Step(panel));
                true
            }
            None => false,
        }
    }

    pub fn show_port_details(&mut self, node_id: &str, port_id: &str, side: PortSide) -> bool {
        let Some(center) = self.position(node_id) else {
            return false;
        };
        let candidates = match side {
            PortSide::Input => input_ports(&self.graph, node_id),
            PortSide::Output => output_ports(&self.graph, node_id),
        };
        let Some(port) = candidates.into_iter().find(|p| p.id == port_id) else {
            return false;
        };
        let radius = self.node_radius(node_id);
        self.details = Some(DetailsPanel::Port(PortDetails::new(node_id, port, center, radius)));
        true
    }

    pub fn close_details(&mut self) -> bool {
        self.details.take().is_some()
    }
}

fn fallback_position(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let mut rng = StdRng::seed_from_u64(hasher.finish());
    (
        100.0 + rng.random::<f32>() * 200.0,
        100.0 + rng.random::<f32>() * 100.0,
    )
}

fn fill_missing_positions(graph: &WorkflowGraph, layout: &mut Layout, config: &Config) {
    for (id, kind) in graph.nodes() {
        if layout.nodes.contains_key(id) {
            continue;
        }
        let (x, y) = fallback_position(id);
        warn!(node = id, x, y, "node has no layout position, using fallback");
        layout.nodes.insert(
            id.to_string(),
            NodeLayout {
                id: id.to_string(),
                kind,
                level: 0,
                x,
                y,
                width: config.layout.node_width,
                height: config.layout.node_height,
            },
        );
    }
}
