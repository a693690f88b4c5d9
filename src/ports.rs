use crate::config::PortConfig;
use crate::cwl_type::{CwlType, Primitive};
use crate::ir::{NodeKind, WorkflowGraph};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortSide {
    Input,
    Output,
}

impl PortSide {
    pub fn as_str(self) -> &'static str {
        match self {
            PortSide::Input => "input",
            PortSide::Output => "output",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Port {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: CwlType,
    pub side: PortSide,
}

/// Port ids on one side of a node, in placement order. Input nodes expose a
/// single `output` port and output nodes a single `input` port.
pub fn port_ids<'g>(graph: &'g WorkflowGraph, node_id: &str, side: PortSide) -> Vec<&'g str> {
    match (graph.node_kind(node_id), side) {
        (Some(NodeKind::Step), PortSide::Input) => graph
            .steps
            .get(node_id)
            .map(|step| step.inputs.keys().map(String::as_str).collect())
            .unwrap_or_default(),
        (Some(NodeKind::Step), PortSide::Output) => graph
            .steps
            .get(node_id)
            .map(|step| step.outputs.iter().map(|o| o.id.as_str()).collect())
            .unwrap_or_default(),
        (Some(NodeKind::Input), PortSide::Output) => vec!["output"],
        (Some(NodeKind::Output), PortSide::Input) => vec!["input"],
        _ => Vec::new(),
    }
}

fn ports(graph: &WorkflowGraph, node_id: &str, side: PortSide) -> Vec<Port> {
    let name_of = |port_id: &str| -> String {
        match graph.node_kind(node_id) {
            Some(NodeKind::Input) => graph.inputs.get(node_id).map(|n| n.label.clone()),
            Some(NodeKind::Output) => graph.outputs.get(node_id).map(|n| n.label.clone()),
            _ => None,
        }
        .unwrap_or_else(|| port_id.to_string())
    };
    port_ids(graph, node_id, side)
        .into_iter()
        .map(|port_id| Port {
            id: port_id.to_string(),
            name: name_of(port_id),
            ty: resolve_port_type(graph, node_id, port_id, side),
            side,
        })
        .collect()
}

pub fn input_ports(graph: &WorkflowGraph, node_id: &str) -> Vec<Port> {
    ports(graph, node_id, PortSide::Input)
}

pub fn output_ports(graph: &WorkflowGraph, node_id: &str) -> Vec<Port> {
    ports(graph, node_id, PortSide::Output)
}

/// Node circles grow with the busier of their two port sides.
pub fn node_radius(graph: &WorkflowGraph, node_id: &str, config: &PortConfig) -> f32 {
    let inputs = port_ids(graph, node_id, PortSide::Input).len();
    let outputs = port_ids(graph, node_id, PortSide::Output).len();
    config.base_radius + inputs.max(outputs) as f32 * config.radius_increment
}

/// Offset of port `index` of `count` from the node centre. Ports spread over
/// an arc of `aperture` degrees centred on 0° for outputs and 180° for inputs.
pub fn port_offset(index: usize, count: usize, radius: f32, side: PortSide, aperture: f32) -> (f32, f32) {
    let step = aperture / (count as f32 + 1.0);
    let slot = (index as f32 + 1.0) * step;
    let degrees = match side {
        PortSide::Output => -aperture / 2.0 + slot,
        PortSide::Input => 180.0 + aperture / 2.0 - slot,
    };
    let radians = degrees.to_radians();
    (radius * radians.cos(), radius * radians.sin())
}

/// Absolute position of a port for a node centred at `center`, or `None`
/// when the node has no such port.
pub fn port_coordinate(
    graph: &WorkflowGraph,
    node_id: &str,
    center: (f32, f32),
    port_id: &str,
    side: PortSide,
    config: &PortConfig,
) -> Option<(f32, f32)> {
    let ids = port_ids(graph, node_id, side);
    let index = ids.iter().position(|id| *id == port_id)?;
    let radius = node_radius(graph, node_id, config);
    let (dx, dy) = port_offset(index, ids.len(), radius, side, config.aperture_degrees);
    Some((center.0 + dx, center.1 + dy))
}

fn known(ty: &CwlType) -> Option<CwlType> {
    (!ty.is_any()).then(|| ty.clone())
}

/// Best known type of a port.
///
/// Workflow inputs and outputs report their declared type. Step ports try,
/// in order: a workflow input/output sharing the port id, the type declared
/// on the step or by the process it runs, the type of whatever feeds the
/// port, a guess from the port name, and finally `Any`.
pub fn resolve_port_type(graph: &WorkflowGraph, node_id: &str, port_id: &str, side: PortSide) -> CwlType {
    match graph.node_kind(node_id) {
        Some(NodeKind::Input) => {
            return graph.inputs.get(node_id).map(|n| n.ty.clone()).unwrap_or_default();
        }
        Some(NodeKind::Output) => {
            return graph.outputs.get(node_id).map(|n| n.ty.clone()).unwrap_or_default();
        }
        _ => {}
    }
    step_port_type(graph, node_id, port_id, side)
        .or_else(|| infer_type_from_name(port_id))
        .unwrap_or_default()
}

fn step_port_type(graph: &WorkflowGraph, step_id: &str, port_id: &str, side: PortSide) -> Option<CwlType> {
    let step = graph.steps.get(step_id)?;

    let global = match side {
        PortSide::Input => graph.inputs.get(port_id).map(|n| &n.ty),
        PortSide::Output => graph.outputs.get(port_id).map(|n| &n.ty),
    };
    if let Some(ty) = global.and_then(known) {
        return Some(ty);
    }

    let summary = step.run.summary();
    let declared = match side {
        PortSide::Input => step
            .inputs
            .get(port_id)
            .and_then(|p| p.ty.as_ref())
            .or_else(|| summary.and_then(|s| s.inputs.get(port_id))),
        PortSide::Output => step
            .outputs
            .iter()
            .find(|o| o.id == port_id)
            .and_then(|o| o.ty.as_ref())
            .or_else(|| summary.and_then(|s| s.outputs.get(port_id))),
    };
    if let Some(ty) = declared.and_then(known) {
        return Some(ty);
    }

    match side {
        PortSide::Input => step
            .inputs
            .get(port_id)?
            .sources
            .iter()
            .find_map(|source| source_type(graph, source)),
        PortSide::Output => {
            let reference = format!("{step_id}/{port_id}");
            graph
                .outputs
                .values()
                .find(|o| o.output_source.iter().any(|s| *s == reference))
                .and_then(|o| known(&o.ty))
        }
    }
}

fn source_type(graph: &WorkflowGraph, source: &str) -> Option<CwlType> {
    if let Some(input) = graph.inputs.get(source) {
        return known(&input.ty);
    }
    let (step_id, port) = source.split_once('/').unwrap_or((source, "output"));
    if !graph.steps.contains_key(step_id) {
        return None;
    }
    step_port_type(graph, step_id, port, PortSide::Output)
}

pub fn infer_type_from_name(name: &str) -> Option<CwlType> {
    let name = name.to_ascii_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| name.contains(n));
    let primitive = if has(&["file", "input", "output"]) {
        Primitive::File
    } else if has(&["param", "value"]) {
        Primitive::String
    } else if has(&["count", "number", "size"]) {
        Primitive::Int
    } else if has(&["flag", "enable", "disable"]) {
        Primitive::Boolean
    } else {
        return None;
    };
    Some(CwlType::primitive(primitive))
}
