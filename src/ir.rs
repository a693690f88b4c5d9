use crate::cwl_type::CwlType;
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Input,
    Step,
    Output,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Input => "input",
            NodeKind::Step => "step",
            NodeKind::Output => "output",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcessClass {
    Workflow,
    CommandLineTool,
    ExpressionTool,
}

impl ProcessClass {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Workflow" => Some(Self::Workflow),
            "CommandLineTool" => Some(Self::CommandLineTool),
            "ExpressionTool" => Some(Self::ExpressionTool),
            _ => None,
        }
    }
}

/// Port types declared by a process that a step runs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSummary {
    pub class: ProcessClass,
    pub id: Option<String>,
    pub inputs: IndexMap<String, CwlType>,
    pub outputs: IndexMap<String, CwlType>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RunRef {
    Path(String),
    Inline(Box<ProcessSummary>),
    Missing,
}

impl RunRef {
    /// Class used to pick the step glyph. Paths only reveal a nested
    /// workflow when they say so.
    pub fn class(&self) -> ProcessClass {
        match self {
            RunRef::Inline(summary) => summary.class,
            RunRef::Path(path) if path.to_ascii_lowercase().contains("workflow") => {
                ProcessClass::Workflow
            }
            _ => ProcessClass::CommandLineTool,
        }
    }

    pub fn summary(&self) -> Option<&ProcessSummary> {
        match self {
            RunRef::Inline(summary) => Some(summary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub ty: CwlType,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub ty: CwlType,
    /// Upstream references; empty when the document names none.
    pub output_source: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInput {
    pub id: String,
    pub sources: Vec<String>,
    #[serde(rename = "type")]
    pub ty: Option<CwlType>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutput {
    pub id: String,
    #[serde(rename = "type")]
    pub ty: Option<CwlType>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepNode {
    pub id: String,
    pub label: String,
    pub run: RunRef,
    #[serde(rename = "in")]
    pub inputs: IndexMap<String, StepInput>,
    #[serde(rename = "out")]
    pub outputs: Vec<StepOutput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub port: String,
}

impl Endpoint {
    pub fn new(id: impl Into<String>, kind: NodeKind, port: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            port: port.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub from: Endpoint,
    pub to: Endpoint,
}

impl Connection {
    pub fn touches(&self, node_id: &str) -> bool {
        self.from.id == node_id || self.to.id == node_id
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowGraph {
    pub id: String,
    pub label: String,
    pub class: ProcessClass,
    pub inputs: IndexMap<String, InputNode>,
    pub outputs: IndexMap<String, OutputNode>,
    pub steps: IndexMap<String, StepNode>,
    pub connections: Vec<Connection>,
}

impl WorkflowGraph {
    pub fn new(id: impl Into<String>, label: impl Into<String>, class: ProcessClass) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            class,
            inputs: IndexMap::new(),
            outputs: IndexMap::new(),
            steps: IndexMap::new(),
            connections: Vec::new(),
        }
    }

    pub fn node_kind(&self, id: &str) -> Option<NodeKind> {
        if self.inputs.contains_key(id) {
            Some(NodeKind::Input)
        } else if self.steps.contains_key(id) {
            Some(NodeKind::Step)
        } else if self.outputs.contains_key(id) {
            Some(NodeKind::Output)
        } else {
            None
        }
    }

    /// Every node in draw order: inputs, then steps, then outputs. An id
    /// that appears in more than one collection is yielded once.
    pub fn nodes(&self) -> Vec<(&str, NodeKind)> {
        let mut out: Vec<(&str, NodeKind)> = Vec::with_capacity(self.node_count());
        let mut seen = std::collections::HashSet::new();
        let all = self
            .inputs
            .keys()
            .map(|id| (id.as_str(), NodeKind::Input))
            .chain(self.steps.keys().map(|id| (id.as_str(), NodeKind::Step)))
            .chain(self.outputs.keys().map(|id| (id.as_str(), NodeKind::Output)));
        for (id, kind) in all {
            if seen.insert(id) {
                out.push((id, kind));
            }
        }
        out
    }

    pub fn node_count(&self) -> usize {
        self.inputs.len() + self.steps.len() + self.outputs.len()
    }

    pub fn node_label(&self, id: &str) -> Option<&str> {
        match self.node_kind(id)? {
            NodeKind::Input => self.inputs.get(id).map(|n| n.label.as_str()),
            NodeKind::Step => self.steps.get(id).map(|n| n.label.as_str()),
            NodeKind::Output => self.outputs.get(id).map(|n| n.label.as_str()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_class_from_path() {
        assert_eq!(
            RunRef::Path("subworkflows/align-workflow.cwl".into()).class(),
            ProcessClass::Workflow
        );
        assert_eq!(
            RunRef::Path("tools/bwa.cwl".into()).class(),
            ProcessClass::CommandLineTool
        );
        assert_eq!(RunRef::Missing.class(), ProcessClass::CommandLineTool);
    }

    #[test]
    fn nodes_are_unique_and_ordered() {
        let mut graph = WorkflowGraph::new("wf", "wf", ProcessClass::Workflow);
        graph.outputs.insert(
            "x".into(),
            OutputNode {
                id: "x".into(),
                label: "x".into(),
                ty: CwlType::any(),
                output_source: Vec::new(),
            },
        );
        graph.inputs.insert(
            "x".into(),
            InputNode {
                id: "x".into(),
                label: "x".into(),
                ty: CwlType::any(),
                doc: None,
            },
        );
        let nodes = graph.nodes();
        assert_eq!(nodes, vec![("x", NodeKind::Input)]);
        assert_eq!(graph.node_kind("x"), Some(NodeKind::Input));
    }
}
