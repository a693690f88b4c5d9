mod ranking;
pub(crate) mod types;
pub use ranking::compute_levels;
pub use types::*;

use crate::config::{LayoutConfig, RenderConfig};
use crate::ir::{NodeKind, WorkflowGraph};
use indexmap::IndexMap;

/// Places every node of `graph` left to right by level. Within a level the
/// nodes stack vertically as a group centred in the canvas height, never
/// closer to the top than the layout margin.
pub fn compute_layout(graph: &WorkflowGraph, config: &LayoutConfig, canvas: &RenderConfig) -> Layout {
    let levels = compute_levels(graph);
    let mut nodes = IndexMap::with_capacity(graph.node_count());
    let mut current_x = config.margin;
    let mut max_y: f32 = 0.0;

    for (level_idx, level) in levels.iter().enumerate() {
        let count = level.len() as f32;
        let level_height = count * config.node_height + (count - 1.0).max(0.0) * config.node_spacing;
        let start_y = config.margin.max((canvas.height - level_height) / 2.0);

        for (idx, id) in level.iter().enumerate() {
            let y = start_y + idx as f32 * (config.node_height + config.node_spacing);
            max_y = max_y.max(y);
            nodes.insert(
                id.clone(),
                NodeLayout {
                    id: id.clone(),
                    kind: graph.node_kind(id).unwrap_or(NodeKind::Step),
                    level: level_idx,
                    x: current_x,
                    y,
                    width: config.node_width,
                    height: config.node_height,
                },
            );
        }
        current_x += config.node_width + config.level_spacing;
    }

    let width = if levels.is_empty() {
        0.0
    } else {
        current_x - config.level_spacing + config.margin
    };
    let height = if nodes.is_empty() {
        0.0
    } else {
        max_y + config.node_height + config.margin
    };

    Layout {
        levels,
        nodes,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::build_from_value;
    use serde_json::json;

    #[test]
    fn positions_follow_columns_and_centering() {
        let graph = build_from_value(&json!({
            "class": "CommandLineTool",
            "id": "t",
            "inputs": {"a": "File", "b": "File"},
            "outputs": {"o": "File"}
        }))
        .unwrap();
        let layout = compute_layout(&graph, &LayoutConfig::default(), &RenderConfig::default());

        // two inputs: 2*70 + 80 = 220 tall, centred in 600
        assert_eq!(layout.position("a"), Some((50.0, 190.0)));
        assert_eq!(layout.position("b"), Some((50.0, 340.0)));
        assert_eq!(layout.position("t"), Some((370.0, 265.0)));
        assert_eq!(layout.position("o"), Some((690.0, 265.0)));
        assert_eq!(layout.level_of("o"), Some(2));
    }

    #[test]
    fn tall_levels_respect_top_margin() {
        let inputs: serde_json::Map<String, serde_json::Value> = (0..8)
            .map(|i| (format!("in{i}"), json!("File")))
            .collect();
        let graph = build_from_value(&json!({
            "class": "CommandLineTool",
            "inputs": inputs,
            "outputs": {}
        }))
        .unwrap();
        let layout = compute_layout(&graph, &LayoutConfig::default(), &RenderConfig::default());
        assert_eq!(layout.position("in0"), Some((50.0, 50.0)));
        assert!(layout.nodes.len() == 9);
    }

    #[test]
    fn empty_graph_has_empty_layout() {
        let graph = build_from_value(&json!({"class": "Workflow"})).unwrap();
        let layout = compute_layout(&graph, &LayoutConfig::default(), &RenderConfig::default());
        assert!(layout.nodes.is_empty());
        assert_eq!(layout.width, 0.0);
    }
}
