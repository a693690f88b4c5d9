use indexmap::IndexMap;
use serde::Serialize;

use crate::ir::NodeKind;

/// Placement of one node. `x`/`y` is the node centre; the renderer moves it
/// during drags without re-running the layout.
#[derive(Debug, Clone, Serialize)]
pub struct NodeLayout {
    pub id: String,
    pub kind: NodeKind,
    pub level: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub levels: Vec<Vec<String>>,
    pub nodes: IndexMap<String, NodeLayout>,
    pub width: f32,
    pub height: f32,
}

impl Layout {
    pub fn position(&self, id: &str) -> Option<(f32, f32)> {
        self.nodes.get(id).map(|node| (node.x, node.y))
    }

    pub fn set_position(&mut self, id: &str, x: f32, y: f32) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.x = x;
                node.y = y;
                true
            }
            None => false,
        }
    }

    pub fn level_of(&self, id: &str) -> Option<usize> {
        self.nodes.get(id).map(|node| node.level)
    }
}
