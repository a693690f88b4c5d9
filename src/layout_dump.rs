use crate::ports::{input_ports, node_radius, output_ports};
use crate::scene::{EdgeState, Scene, ViewState};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub workflow_id: String,
    pub width: f32,
    pub height: f32,
    pub view: ViewState,
    pub levels: Vec<Vec<String>>,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub kind: String,
    pub label: String,
    pub level: usize,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub input_ports: Vec<String>,
    pub output_ports: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub from_port: String,
    pub to: String,
    pub to_port: String,
    pub state: EdgeState,
    pub path: Option<String>,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_scene(scene: &Scene) -> Self {
        let ports = &scene.config().ports;
        let nodes = scene
            .layout
            .nodes
            .values()
            .map(|node| NodeDump {
                id: node.id.clone(),
                kind: node.kind.as_str().to_string(),
                label: scene.graph.node_label(&node.id).unwrap_or(node.id.as_str()).to_string(),
                level: node.level,
                x: node.x,
                y: node.y,
                radius: node_radius(&scene.graph, &node.id, ports),
                input_ports: input_ports(&scene.graph, &node.id)
                    .into_iter()
                    .map(|p| format!("{}: {}", p.id, p.ty))
                    .collect(),
                output_ports: output_ports(&scene.graph, &node.id)
                    .into_iter()
                    .map(|p| format!("{}: {}", p.id, p.ty))
                    .collect(),
            })
            .collect();

        let edges = scene
            .edges
            .iter()
            .map(|edge| EdgeDump {
                from: edge.connection.from.id.clone(),
                from_port: edge.connection.from.port.clone(),
                to: edge.connection.to.id.clone(),
                to_port: edge.connection.to.port.clone(),
                state: scene.edge_state(edge),
                path: edge.path.map(|p| p.to_svg_path()),
                points: edge
                    .path
                    .map(|p| p.points().iter().map(|(x, y)| [*x, *y]).collect())
                    .unwrap_or_default(),
            })
            .collect();

        LayoutDump {
            workflow_id: scene.graph.id.clone(),
            width: scene.layout.width,
            height: scene.layout.height,
            view: scene.view,
            levels: scene.layout.levels.clone(),
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(path: &Path, scene: &Scene) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_scene(scene);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
