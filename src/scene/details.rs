use crate::ir::WorkflowGraph;
use crate::ports::{input_ports, output_ports, Port};
use serde::Serialize;

pub const STEP_PANEL_WIDTH: f32 = 200.0;
pub const PORT_PANEL_WIDTH: f32 = 180.0;
pub const PORT_PANEL_HEIGHT: f32 = 80.0;
pub const ROW_HEIGHT: f32 = 18.0;
const CLOSE_RADIUS: f32 = 8.0;

/// Port listing for a clicked step, anchored to the right of the node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDetails {
    pub node_id: String,
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
}

impl StepDetails {
    pub fn new(graph: &WorkflowGraph, node_id: &str, center: (f32, f32)) -> Option<Self> {
        let step = graph.steps.get(node_id)?;
        let inputs = input_ports(graph, node_id);
        let outputs = output_ports(graph, node_id);
        let mut height = 50.0;
        if !inputs.is_empty() {
            height += 30.0 + ROW_HEIGHT * inputs.len() as f32;
        }
        if !outputs.is_empty() {
            height += 40.0 + ROW_HEIGHT * outputs.len() as f32;
        }
        Some(Self {
            node_id: node_id.to_string(),
            label: step.label.clone(),
            x: center.0 + 80.0,
            y: center.1,
            width: STEP_PANEL_WIDTH,
            height: height.max(80.0),
            inputs,
            outputs,
        })
    }
}

/// Name and type of a single clicked port.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortDetails {
    pub node_id: String,
    pub port: Port,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PortDetails {
    pub fn new(node_id: &str, port: Port, center: (f32, f32), radius: f32) -> Self {
        Self {
            node_id: node_id.to_string(),
            port,
            x: center.0 + radius + 20.0,
            y: center.1 - 10.0,
            width: PORT_PANEL_WIDTH,
            height: PORT_PANEL_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DetailsPanel {
    Step(StepDetails),
    Port(PortDetails),
}

impl DetailsPanel {
    pub fn node_id(&self) -> &str {
        match self {
            DetailsPanel::Step(step) => &step.node_id,
            DetailsPanel::Port(port) => &port.node_id,
        }
    }

    pub fn close_center(&self) -> (f32, f32) {
        match self {
            DetailsPanel::Step(p) => (p.x + p.width - 10.0, p.y + 10.0),
            DetailsPanel::Port(p) => (p.x + p.width - 12.0, p.y + 12.0),
        }
    }

    /// Whether the scene point hits the close button.
    pub fn hits_close(&self, x: f32, y: f32) -> bool {
        let (cx, cy) = self.close_center();
        (x - cx).hypot(y - cy) <= CLOSE_RADIUS
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        let (px, py, w, h) = match self {
            DetailsPanel::Step(p) => (p.x, p.y, p.width, p.height),
            DetailsPanel::Port(p) => (p.x, p.y, p.width, p.height),
        };
        x >= px && x <= px + w && y >= py && y <= py + h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cwl_type::CwlType;
    use crate::parser::build_from_value;
    use crate::ports::PortSide;
    use serde_json::json;

    #[test]
    fn step_panel_grows_with_ports() {
        let graph = build_from_value(&json!({
            "class": "Workflow",
            "inputs": {"x": "File"},
            "steps": {
                "s1": {"in": {"a": "x", "b": "x"}, "out": ["y"]},
                "bare": {"in": {}, "out": []}
            },
            "outputs": {}
        }))
        .unwrap();
        let panel = StepDetails::new(&graph, "s1", (100.0, 100.0)).unwrap();
        assert_eq!((panel.x, panel.y), (180.0, 100.0));
        assert_eq!(panel.height, 50.0 + 30.0 + 36.0 + 40.0 + 18.0);
        assert_eq!(panel.inputs.len(), 2);

        let bare = StepDetails::new(&graph, "bare", (0.0, 0.0)).unwrap();
        assert_eq!(bare.height, 80.0);
        assert!(StepDetails::new(&graph, "x", (0.0, 0.0)).is_none());
    }

    #[test]
    fn close_button_hit_test() {
        let port = Port {
            id: "o".into(),
            name: "o".into(),
            ty: CwlType::any(),
            side: PortSide::Output,
        };
        let panel = DetailsPanel::Port(PortDetails::new("s", port, (100.0, 100.0), 41.0));
        let (cx, cy) = panel.close_center();
        assert_eq!((cx, cy), (161.0 + 180.0 - 12.0, 102.0));
        assert!(panel.hits_close(cx + 3.0, cy - 3.0));
        assert!(!panel.hits_close(cx - 40.0, cy));
        assert!(panel.contains(200.0, 120.0));
        assert_eq!(panel.node_id(), "s");
    }
}
