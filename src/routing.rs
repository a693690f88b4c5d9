use crate::config::PortConfig;
use crate::ir::{Connection, WorkflowGraph};
use crate::layout::Layout;
use crate::ports::{node_radius, port_coordinate, PortSide};
use serde::Serialize;

/// Direction the control points lean towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bias {
    None,
    Left,
    #[default]
    Right,
}

/// A single cubic Bezier from an output port to an input port.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConnectionPath {
    pub start: (f32, f32),
    pub control1: (f32, f32),
    pub control2: (f32, f32),
    pub end: (f32, f32),
}

impl ConnectionPath {
    pub fn to_svg_path(&self) -> String {
        format!(
            "M {:.2} {:.2} C {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
            self.start.0,
            self.start.1,
            self.control1.0,
            self.control1.1,
            self.control2.0,
            self.control2.1,
            self.end.0,
            self.end.1
        )
    }

    pub fn points(&self) -> [(f32, f32); 4] {
        [self.start, self.control1, self.control2, self.end]
    }
}

pub fn connection_path(from: (f32, f32), to: (f32, f32), bias: Bias) -> ConnectionPath {
    let (x1, y1) = from;
    let (x2, y2) = to;
    let half_span = (x1 - x2).abs() / 2.0;
    let (out_x, in_x) = match bias {
        Bias::None => {
            let mid = x1 + (x2 - x1) / 2.0;
            (mid, mid)
        }
        Bias::Right => (x1 + half_span, x2 - half_span),
        Bias::Left => (x1 - half_span, x2 + half_span),
    };
    ConnectionPath {
        start: from,
        control1: (out_x, y1),
        control2: (in_x, y2),
        end: to,
    }
}

/// Port anchors for `conn`. A node without a position drops the edge; a
/// port that cannot be found anchors on the node's edge instead.
pub fn connection_endpoints(
    graph: &WorkflowGraph,
    layout: &Layout,
    conn: &Connection,
    ports: &PortConfig,
) -> Option<((f32, f32), (f32, f32))> {
    let from_center = layout.position(&conn.from.id)?;
    let to_center = layout.position(&conn.to.id)?;

    let start = port_coordinate(graph, &conn.from.id, from_center, &conn.from.port, PortSide::Output, ports)
        .unwrap_or_else(|| {
            tracing::warn!(node = %conn.from.id, port = %conn.from.port, "output port not found, anchoring on node edge");
            (from_center.0 + node_radius(graph, &conn.from.id, ports), from_center.1)
        });
    let end = port_coordinate(graph, &conn.to.id, to_center, &conn.to.port, PortSide::Input, ports)
        .unwrap_or_else(|| {
            tracing::warn!(node = %conn.to.id, port = %conn.to.port, "input port not found, anchoring on node edge");
            (to_center.0 - node_radius(graph, &conn.to.id, ports), to_center.1)
        });
    Some((start, end))
}

pub fn route_connection(
    graph: &WorkflowGraph,
    layout: &Layout,
    conn: &Connection,
    ports: &PortConfig,
    bias: Bias,
) -> Option<ConnectionPath> {
    let (start, end) = connection_endpoints(graph, layout, conn, ports)?;
    Some(connection_path(start, end, bias))
}
