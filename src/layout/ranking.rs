use std::collections::{HashMap, HashSet};

use crate::ir::{NodeKind, WorkflowGraph};

/// Assigns every node to a column.
///
/// Workflows with at most one step use the fixed `[inputs] [steps] [outputs]`
/// arrangement. Larger graphs are levelled with Kahn's algorithm over the
/// connection edges; when only cyclic nodes remain they all land in the
/// current level so the loop always terminates.
pub fn compute_levels(graph: &WorkflowGraph) -> Vec<Vec<String>> {
    let nodes = graph.nodes();
    if graph.steps.len() <= 1 {
        return simple_levels(&nodes);
    }

    let kinds: HashMap<&str, NodeKind> = nodes.iter().copied().collect();
    let mut in_degree: HashMap<&str, usize> = nodes.iter().map(|(id, _)| (*id, 0)).collect();
    let mut successors: HashMap<&str, Vec<&str>> = HashMap::new();
    for conn in &graph.connections {
        if !kinds.contains_key(conn.from.id.as_str()) {
            continue;
        }
        if let Some(degree) = in_degree.get_mut(conn.to.id.as_str()) {
            *degree += 1;
            successors
                .entry(conn.from.id.as_str())
                .or_default()
                .push(conn.to.id.as_str());
        }
    }

    let mut levels: Vec<Vec<String>> = Vec::new();
    let mut processed: HashSet<&str> = HashSet::with_capacity(nodes.len());
    while processed.len() < nodes.len() {
        let mut current: Vec<(&str, NodeKind)> = nodes
            .iter()
            .filter(|(id, _)| !processed.contains(id) && in_degree.get(id) == Some(&0))
            .copied()
            .collect();
        if current.is_empty() {
            current = nodes
                .iter()
                .filter(|(id, _)| !processed.contains(id))
                .copied()
                .collect();
        }
        current.sort_by_key(|(_, kind)| *kind);

        for (id, _) in &current {
            processed.insert(*id);
            for next in successors.get(id).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(next) {
                    *degree = degree.saturating_sub(1);
                }
            }
        }
        levels.push(current.into_iter().map(|(id, _)| id.to_string()).collect());
    }
    levels
}

fn simple_levels(nodes: &[(&str, NodeKind)]) -> Vec<Vec<String>> {
    [NodeKind::Input, NodeKind::Step, NodeKind::Output]
        .into_iter()
        .map(|kind| {
            nodes
                .iter()
                .filter(|(_, k)| *k == kind)
                .map(|(id, _)| id.to_string())
                .collect::<Vec<_>>()
        })
        .filter(|level| !level.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::build_from_value;
    use serde_json::json;

    fn level_index(levels: &[Vec<String>], id: &str) -> usize {
        levels
            .iter()
            .position(|level| level.iter().any(|n| n == id))
            .unwrap_or_else(|| panic!("{id} not levelled"))
    }

    #[test]
    fn single_step_uses_three_columns() {
        let graph = build_from_value(&json!({
            "class": "CommandLineTool",
            "id": "cat",
            "inputs": {"a": "File", "b": "File"},
            "outputs": {"out": "File"}
        }))
        .unwrap();
        let levels = compute_levels(&graph);
        assert_eq!(
            levels,
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["cat".to_string()],
                vec!["out".to_string()],
            ]
        );
    }

    #[test]
    fn empty_columns_are_omitted() {
        let graph = build_from_value(&json!({
            "class": "Workflow",
            "inputs": {},
            "steps": {"only": {"in": {}, "out": []}},
            "outputs": {}
        }))
        .unwrap();
        assert_eq!(compute_levels(&graph), vec![vec!["only".to_string()]]);
    }

    #[test]
    fn acyclic_edges_point_forward() {
        let graph = build_from_value(&json!({
            "class": "Workflow",
            "inputs": {"x": "File", "y": "int"},
            "steps": {
                "a": {"in": {"x": "x"}, "out": ["o"]},
                "b": {"in": {"i": "a/o", "n": "y"}, "out": ["o"]},
                "c": {"in": {"i": "a/o", "j": "b/o"}, "out": ["o"]}
            },
            "outputs": {"r": {"outputSource": "c/o"}, "side": {"outputSource": "a/o"}}
        }))
        .unwrap();
        let levels = compute_levels(&graph);
        for conn in &graph.connections {
            assert!(level_index(&levels, &conn.from.id) < level_index(&levels, &conn.to.id));
        }
        assert_eq!(levels[0], vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn ties_sort_inputs_before_steps() {
        let graph = build_from_value(&json!({
            "class": "Workflow",
            "inputs": {"x": "File"},
            "steps": {
                "gen": {"in": {}, "out": ["o"]},
                "use": {"in": {"a": "gen/o", "b": "x"}, "out": []}
            },
            "outputs": {"lonely": {"type": "File"}}
        }))
        .unwrap();
        let levels = compute_levels(&graph);
        assert_eq!(
            levels[0],
            vec!["x".to_string(), "gen".to_string(), "lonely".to_string()]
        );
    }

    #[test]
    fn cycles_terminate_with_one_level_per_node() {
        let graph = build_from_value(&json!({
            "class": "Workflow",
            "inputs": {"seed": "int"},
            "steps": {
                "a": {"in": {"s": "seed", "back": "b/o"}, "out": ["o"]},
                "b": {"in": {"i": "a/o"}, "out": ["o"]}
            },
            "outputs": {"r": {"outputSource": "b/o"}}
        }))
        .unwrap();
        let levels = compute_levels(&graph);
        let mut seen: Vec<String> = levels.iter().flatten().cloned().collect();
        seen.sort();
        assert_eq!(seen, vec!["a", "b", "r", "seed"]);
    }
}
