use crate::cwl_type::CwlType;
use crate::error::{Result, VisualizerError};
use crate::ir::{
    Connection, Endpoint, InputNode, NodeKind, OutputNode, ProcessClass, ProcessSummary, RunRef,
    StepInput, StepNode, StepOutput, WorkflowGraph,
};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    #[default]
    Auto,
    Json,
    Yaml,
}

impl InputFormat {
    /// Text whose first non-blank character opens an object or list is JSON.
    pub fn detect(text: &str) -> Self {
        let trimmed = text.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            InputFormat::Json
        } else {
            InputFormat::Yaml
        }
    }

    fn resolve(self, text: &str) -> Self {
        match self {
            InputFormat::Auto => InputFormat::detect(text),
            other => other,
        }
    }
}

/// The three document layouts the builder understands, decided before any
/// field beyond `class` and `$graph` is read.
#[derive(Debug, Clone, Copy)]
pub enum DocumentShape<'a> {
    GraphBundle {
        main: &'a Value,
        entries: &'a [Value],
    },
    Tool(&'a Value),
    Workflow(&'a Value),
}

pub fn build(text: &str, format: InputFormat) -> Result<WorkflowGraph> {
    let doc = parse_document(text, format)?;
    build_from_value(&doc)
}

pub fn build_from_value(doc: &Value) -> Result<WorkflowGraph> {
    let graph = match classify(doc)? {
        DocumentShape::GraphBundle { main, entries } => build_workflow(main, entries),
        DocumentShape::Tool(tool) => build_tool(tool),
        DocumentShape::Workflow(workflow) => build_workflow(workflow, &[]),
    };
    debug!(
        id = %graph.id,
        inputs = graph.inputs.len(),
        steps = graph.steps.len(),
        outputs = graph.outputs.len(),
        connections = graph.connections.len(),
        "built workflow graph"
    );
    Ok(graph)
}

pub fn parse_document(text: &str, format: InputFormat) -> Result<Value> {
    match format.resolve(text) {
        InputFormat::Json => {
            serde_json::from_str(text).map_err(|err| VisualizerError::Parse(err.to_string()))
        }
        _ => parse_yaml(text),
    }
}

#[cfg(feature = "yaml")]
fn parse_yaml(text: &str) -> Result<Value> {
    match serde_yaml::from_str::<Value>(text) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Ok(value),
        Ok(_) => parse_key_values(text)
            .ok_or_else(|| VisualizerError::Parse("document is not a mapping".to_string())),
        Err(err) => {
            debug!(error = %err, "YAML parse failed, trying key/value fallback");
            parse_key_values(text).ok_or_else(|| VisualizerError::Parse(err.to_string()))
        }
    }
}

#[cfg(not(feature = "yaml"))]
fn parse_yaml(_text: &str) -> Result<Value> {
    Err(VisualizerError::Parse(
        "YAML support is not enabled in this build".to_string(),
    ))
}

/// Flat `key: value` reader used when structured parsing fails. Comment
/// lines are skipped and surrounding quotes are stripped from values.
pub fn parse_key_values(text: &str) -> Option<Value> {
    let mut map = Map::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        map.insert(key.to_string(), Value::String(unquote(value.trim()).to_string()));
    }
    if map.is_empty() {
        None
    } else {
        Some(Value::Object(map))
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

pub fn classify(doc: &Value) -> Result<DocumentShape<'_>> {
    if !doc.is_object() {
        return Err(VisualizerError::InvalidFormat(
            "document root must be a mapping".to_string(),
        ));
    }
    if let Some(graph) = doc.get("$graph") {
        let entries = graph
            .as_array()
            .ok_or_else(|| VisualizerError::InvalidFormat("$graph must be a list".to_string()))?;
        let workflows = || entries.iter().filter(|e| class_of(e) == Some("Workflow"));
        let main = workflows()
            .find(|e| matches!(raw_id(e), Some("#main" | "main")))
            .or_else(|| workflows().next())
            .ok_or(VisualizerError::NoWorkflowInGraph)?;
        return Ok(DocumentShape::GraphBundle {
            main,
            entries: entries.as_slice(),
        });
    }
    match class_of(doc) {
        Some("CommandLineTool" | "ExpressionTool") => Ok(DocumentShape::Tool(doc)),
        Some("Workflow") | None => Ok(DocumentShape::Workflow(doc)),
        Some(other) => Err(VisualizerError::InvalidFormat(format!(
            "unsupported class '{other}'"
        ))),
    }
}

fn class_of(value: &Value) -> Option<&str> {
    value.get("class").and_then(Value::as_str)
}

fn raw_id(value: &Value) -> Option<&str> {
    value.get("id").and_then(Value::as_str)
}

/// Maps document identifiers to graph-local ones. Packed documents qualify
/// every id with the owning process (`#main/step1/out`).
struct Scope<'a> {
    prefix: Option<String>,
    bundle: &'a [Value],
}

impl<'a> Scope<'a> {
    fn new(process_id: Option<&str>, bundle: &'a [Value]) -> Self {
        Self {
            prefix: process_id
                .map(|id| id.trim_start_matches('#').to_string())
                .filter(|id| !id.is_empty()),
            bundle,
        }
    }

    /// Only `#`-qualified references carry the process prefix; bare ids such
    /// as `step/port` are already local.
    fn local(&self, raw: &str) -> String {
        if !raw.starts_with('#') {
            return raw.to_string();
        }
        let id = raw.trim_start_matches('#');
        if let Some(prefix) = &self.prefix {
            if let Some(rest) = id.strip_prefix(prefix.as_str()).and_then(|r| r.strip_prefix('/')) {
                return rest.to_string();
            }
        }
        id.to_string()
    }

    fn local_port(&self, step_id: &str, raw: &str) -> String {
        let id = self.local(raw);
        if !raw.starts_with('#') {
            return id;
        }
        match id.strip_prefix(step_id).and_then(|r| r.strip_prefix('/')) {
            Some(port) => port.to_string(),
            None => id,
        }
    }

    fn find_entry(&self, reference: &str) -> Option<&'a Value> {
        let wanted = reference.trim_start_matches('#');
        self.bundle
            .iter()
            .find(|entry| raw_id(entry).map(|id| id.trim_start_matches('#')) == Some(wanted))
    }
}

/// Normalizes list-or-map sections into `(id, definition)` pairs. List
/// entries without an id get a positional one.
fn entries<'v>(value: Option<&'v Value>, prefix: &str, scope: &Scope) -> Vec<(String, &'v Value)> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let id = raw_id(item)
                    .map(|id| scope.local(id))
                    .unwrap_or_else(|| format!("{prefix}_{idx}"));
                (id, item)
            })
            .collect(),
        Some(Value::Object(map)) => map.iter().map(|(key, def)| (scope.local(key), def)).collect(),
        _ => Vec::new(),
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn doc_field(value: &Value) -> Option<String> {
    match value.get("doc")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(lines) => Some(
            lines
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        _ => None,
    }
}

/// Type of a parameter definition, accepting the `name: Type` shorthand.
fn declared_type(def: &Value) -> CwlType {
    match def {
        Value::Object(map) => match map.get("type") {
            Some(Value::String(kind)) if kind == "array" && map.contains_key("items") => {
                CwlType::from_value(def)
            }
            Some(ty) => CwlType::from_value(ty),
            None => CwlType::any(),
        },
        other => CwlType::from_value(other),
    }
}

fn sources(value: &Value, scope: &Scope) -> Vec<String> {
    match value {
        Value::String(s) => vec![scope.local(s)],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| scope.local(s))
            .collect(),
        _ => Vec::new(),
    }
}

fn input_node(id: String, def: &Value) -> InputNode {
    InputNode {
        label: string_field(def, "label").unwrap_or_else(|| id.clone()),
        ty: declared_type(def),
        doc: doc_field(def),
        id,
    }
}

fn output_node(id: String, def: &Value, scope: &Scope) -> OutputNode {
    OutputNode {
        label: string_field(def, "label").unwrap_or_else(|| id.clone()),
        ty: declared_type(def),
        output_source: def
            .get("outputSource")
            .map(|s| sources(s, scope))
            .unwrap_or_default(),
        id,
    }
}

fn step_input(id: String, def: &Value, scope: &Scope) -> StepInput {
    match def {
        Value::Object(map) => StepInput {
            sources: map.get("source").map(|s| sources(s, scope)).unwrap_or_default(),
            ty: map.get("type").map(CwlType::from_value),
            id,
        },
        other => StepInput {
            sources: sources(other, scope),
            ty: None,
            id,
        },
    }
}

fn step_inputs(step_id: &str, value: Option<&Value>, scope: &Scope) -> IndexMap<String, StepInput> {
    let mut inputs = IndexMap::new();
    match value {
        Some(Value::Object(map)) => {
            for (key, def) in map {
                let id = scope.local_port(step_id, key);
                inputs.insert(id.clone(), step_input(id, def, scope));
            }
        }
        Some(Value::Array(items)) => {
            for item in items {
                match item {
                    Value::String(name) => {
                        let id = scope.local_port(step_id, name);
                        inputs.insert(
                            id.clone(),
                            StepInput {
                                sources: vec![scope.local(name)],
                                ty: None,
                                id,
                            },
                        );
                    }
                    Value::Object(_) => {
                        let Some(raw) = raw_id(item) else {
                            warn!(step = step_id, "step input without id ignored");
                            continue;
                        };
                        let id = scope.local_port(step_id, raw);
                        inputs.insert(id.clone(), step_input(id, item, scope));
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
    inputs
}

fn step_outputs(step_id: &str, value: Option<&Value>, scope: &Scope) -> Vec<StepOutput> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(StepOutput {
                    id: scope.local_port(step_id, name),
                    ty: None,
                }),
                Value::Object(_) => raw_id(item).map(|raw| StepOutput {
                    id: scope.local_port(step_id, raw),
                    ty: item.get("type").map(CwlType::from_value),
                }),
                _ => None,
            })
            .collect(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(key, def)| StepOutput {
                id: scope.local_port(step_id, key),
                ty: def.get("type").map(CwlType::from_value),
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn process_summary(doc: &Value) -> ProcessSummary {
    let bare = Scope::new(None, &[]);
    let port_types = |section: Option<&Value>, prefix: &str| -> IndexMap<String, CwlType> {
        entries(section, prefix, &bare)
            .into_iter()
            .map(|(id, def)| {
                let name = id.rsplit('/').next().unwrap_or(id.as_str()).to_string();
                (name, declared_type(def))
            })
            .collect()
    };
    ProcessSummary {
        class: class_of(doc)
            .and_then(ProcessClass::from_name)
            .unwrap_or(ProcessClass::CommandLineTool),
        id: raw_id(doc).map(|id| id.trim_start_matches('#').to_string()),
        inputs: port_types(doc.get("inputs"), "input"),
        outputs: port_types(doc.get("outputs"), "output"),
    }
}

fn run_ref(value: Option<&Value>, scope: &Scope) -> RunRef {
    match value {
        Some(Value::String(path)) => {
            if path.starts_with('#') {
                if let Some(entry) = scope.find_entry(path) {
                    return RunRef::Inline(Box::new(process_summary(entry)));
                }
            }
            RunRef::Path(path.clone())
        }
        Some(inline @ Value::Object(_)) => RunRef::Inline(Box::new(process_summary(inline))),
        _ => RunRef::Missing,
    }
}

fn step_node(id: String, def: &Value, scope: &Scope) -> StepNode {
    StepNode {
        label: string_field(def, "label").unwrap_or_else(|| id.clone()),
        run: run_ref(def.get("run"), scope),
        inputs: step_inputs(&id, def.get("in"), scope),
        outputs: step_outputs(&id, def.get("out"), scope),
        id,
    }
}

fn build_workflow(doc: &Value, bundle: &[Value]) -> WorkflowGraph {
    let scope = Scope::new(raw_id(doc), bundle);
    let id = raw_id(doc)
        .map(|id| id.trim_start_matches('#').to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| "workflow".to_string());
    let label = string_field(doc, "label").unwrap_or_else(|| id.clone());
    let mut graph = WorkflowGraph::new(id, label, ProcessClass::Workflow);

    for (id, def) in entries(doc.get("inputs"), "input", &scope) {
        if graph.inputs.contains_key(&id) {
            warn!(input = %id, "duplicate input id, keeping the last definition");
        }
        graph.inputs.insert(id.clone(), input_node(id, def));
    }
    for (id, def) in entries(doc.get("outputs"), "output", &scope) {
        if graph.outputs.contains_key(&id) {
            warn!(output = %id, "duplicate output id, keeping the last definition");
        }
        graph.outputs.insert(id.clone(), output_node(id, def, &scope));
    }
    for (id, def) in entries(doc.get("steps"), "step", &scope) {
        if graph.steps.contains_key(&id) {
            warn!(step = %id, "duplicate step id, keeping the last definition");
        }
        graph.steps.insert(id.clone(), step_node(id, def, &scope));
    }

    warn_on_shared_ids(&graph);
    graph.connections = derive_connections(&graph);
    graph
}

fn base_command(doc: &Value) -> Option<String> {
    let command = match doc.get("baseCommand")? {
        Value::String(s) => s.trim().to_string(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" "),
        _ => return None,
    };
    (!command.is_empty()).then_some(command)
}

/// Wraps a single tool as a one-step workflow: every tool input feeds the
/// step and every tool output is fed by it.
fn build_tool(doc: &Value) -> WorkflowGraph {
    let scope = Scope::new(raw_id(doc), &[]);
    let tool_id = raw_id(doc)
        .map(|id| id.trim_start_matches('#').to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| "tool".to_string());
    let tool_label = string_field(doc, "label")
        .or_else(|| base_command(doc))
        .unwrap_or_else(|| tool_id.clone());
    let class = class_of(doc)
        .and_then(ProcessClass::from_name)
        .unwrap_or(ProcessClass::CommandLineTool);
    let mut graph = WorkflowGraph::new(
        format!("workflow_{tool_id}"),
        format!("Workflow: {tool_label}"),
        class,
    );

    for (id, def) in entries(doc.get("inputs"), "input", &scope) {
        graph.inputs.insert(id.clone(), input_node(id, def));
    }
    for (id, def) in entries(doc.get("outputs"), "output", &scope) {
        let mut node = output_node(id, def, &scope);
        node.output_source = vec![format!("{tool_id}/{}", node.id)];
        graph.outputs.insert(node.id.clone(), node);
    }

    let step = StepNode {
        id: tool_id.clone(),
        label: tool_label,
        run: RunRef::Inline(Box::new(process_summary(doc))),
        inputs: graph
            .inputs
            .keys()
            .map(|id| {
                (
                    id.clone(),
                    StepInput {
                        id: id.clone(),
                        sources: vec![id.clone()],
                        ty: None,
                    },
                )
            })
            .collect(),
        outputs: graph
            .outputs
            .keys()
            .map(|id| StepOutput {
                id: id.clone(),
                ty: None,
            })
            .collect(),
    };
    graph.steps.insert(tool_id, step);

    warn_on_shared_ids(&graph);
    graph.connections = derive_connections(&graph);
    graph
}

fn warn_on_shared_ids(graph: &WorkflowGraph) {
    for id in graph.steps.keys() {
        if graph.inputs.contains_key(id) || graph.outputs.contains_key(id) {
            warn!(node = %id, "step id collides with a workflow input/output");
        }
    }
    for id in graph.outputs.keys() {
        if graph.inputs.contains_key(id) {
            warn!(node = %id, "output id collides with a workflow input");
        }
    }
}

/// Resolves a source reference to the endpoint that produces it. A bare id
/// names a workflow input (or a step's default `output` port); `step/port`
/// names a step output. `consumer` is excluded so a step never feeds itself.
fn resolve_source(graph: &WorkflowGraph, source: &str, consumer: Option<&str>) -> Option<Endpoint> {
    if graph.inputs.contains_key(source) {
        return Some(Endpoint::new(source, NodeKind::Input, "output"));
    }
    let (step_id, port) = match source.split_once('/') {
        Some((step_id, port)) => (step_id, port),
        None => (source, "output"),
    };
    if consumer == Some(step_id) || !graph.steps.contains_key(step_id) {
        return None;
    }
    Some(Endpoint::new(step_id, NodeKind::Step, port))
}

/// Derives connections from step `in` sources and output `outputSource`
/// references. Each resolved reference yields one connection; merges are not
/// deduplicated and unresolvable references are dropped.
pub fn derive_connections(graph: &WorkflowGraph) -> Vec<Connection> {
    let mut connections = Vec::new();
    for step in graph.steps.values() {
        for (port, input) in &step.inputs {
            for source in &input.sources {
                match resolve_source(graph, source, Some(step.id.as_str())) {
                    Some(from) => connections.push(Connection {
                        from,
                        to: Endpoint::new(step.id.as_str(), NodeKind::Step, port.as_str()),
                    }),
                    None => debug!(step = %step.id, port = %port, source = %source, "unresolved step source dropped"),
                }
            }
        }
    }
    for output in graph.outputs.values() {
        for source in &output.output_source {
            match resolve_source(graph, source, None) {
                Some(from) => connections.push(Connection {
                    from,
                    to: Endpoint::new(output.id.as_str(), NodeKind::Output, "input"),
                }),
                None => debug!(output = %output.id, source = %source, "unresolved output source dropped"),
            }
        }
    }
    connections
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(graph: &WorkflowGraph) -> Vec<(String, String)> {
        graph
            .connections
            .iter()
            .map(|c| {
                (
                    format!("{}:{}", c.from.id, c.from.port),
                    format!("{}:{}", c.to.id, c.to.port),
                )
            })
            .collect()
    }

    #[test]
    fn detects_format_from_leading_character() {
        assert_eq!(InputFormat::detect("  {\"a\": 1}"), InputFormat::Json);
        assert_eq!(InputFormat::detect("\n[1]"), InputFormat::Json);
        assert_eq!(InputFormat::detect("cwlVersion: v1.2"), InputFormat::Yaml);
    }

    #[test]
    fn tool_becomes_single_step_workflow() {
        let doc = json!({
            "cwlVersion": "v1.2",
            "class": "CommandLineTool",
            "id": "sort",
            "baseCommand": ["sort", "-n"],
            "inputs": {"a": {"type": "File"}, "b": "int"},
            "outputs": {"out": {"type": "File"}}
        });
        let graph = build_from_value(&doc).unwrap();
        assert_eq!(graph.label, "Workflow: sort -n");
        assert_eq!(graph.steps["sort"].label, "sort -n");
        assert_eq!(
            pairs(&graph),
            vec![
                ("a:output".to_string(), "sort:a".to_string()),
                ("b:output".to_string(), "sort:b".to_string()),
                ("sort:out".to_string(), "out:input".to_string()),
            ]
        );
        assert_eq!(graph.inputs["b"].ty.to_string(), "int");
    }

    #[test]
    fn tool_without_id_uses_default_step() {
        let doc = json!({"class": "ExpressionTool", "inputs": [], "outputs": []});
        let graph = build_from_value(&doc).unwrap();
        assert!(graph.steps.contains_key("tool"));
        assert_eq!(graph.class, ProcessClass::ExpressionTool);
    }

    #[test]
    fn workflow_connections_follow_sources() {
        let doc = json!({
            "class": "Workflow",
            "inputs": {"x": "File"},
            "steps": {"s1": {"run": "tool.cwl", "in": {"x": "x"}, "out": ["y"]}},
            "outputs": {"result": {"type": "File", "outputSource": "s1/y"}}
        });
        let graph = build_from_value(&doc).unwrap();
        assert_eq!(
            pairs(&graph),
            vec![
                ("x:output".to_string(), "s1:x".to_string()),
                ("s1:y".to_string(), "result:input".to_string()),
            ]
        );
    }

    #[test]
    fn list_sections_get_positional_ids() {
        let doc = json!({
            "class": "Workflow",
            "inputs": [{"type": "string"}, {"id": "named"}],
            "outputs": [{"type": "File"}],
            "steps": [{"run": "a.cwl"}]
        });
        let graph = build_from_value(&doc).unwrap();
        assert!(graph.inputs.contains_key("input_0"));
        assert!(graph.inputs.contains_key("named"));
        assert!(graph.outputs.contains_key("output_0"));
        assert!(graph.steps.contains_key("step_0"));
        assert!(graph.inputs["named"].ty.is_any());
        assert_eq!(graph.inputs["input_0"].label, "input_0");
    }

    #[test]
    fn merged_output_sources_each_connect() {
        let doc = json!({
            "class": "Workflow",
            "inputs": {},
            "steps": {
                "s1": {"in": {}, "out": ["y"]},
                "s2": {"in": {}, "out": ["y"]}
            },
            "outputs": {"all": {"type": "File[]", "outputSource": ["s1/y", "s2/y"]}}
        });
        let graph = build_from_value(&doc).unwrap();
        let into_all = graph.connections.iter().filter(|c| c.to.id == "all").count();
        assert_eq!(into_all, 2);
    }

    #[test]
    fn step_sources_accept_objects_and_lists() {
        let doc = json!({
            "class": "Workflow",
            "inputs": {"a": "File", "b": "File"},
            "steps": {
                "merge": {
                    "in": {"files": {"source": ["a", "b"], "type": "File[]"}},
                    "out": [{"id": "merged"}]
                },
                "report": {"in": [{"id": "src", "source": "merge/merged"}], "out": []}
            },
            "outputs": {}
        });
        let graph = build_from_value(&doc).unwrap();
        assert_eq!(
            pairs(&graph),
            vec![
                ("a:output".to_string(), "merge:files".to_string()),
                ("b:output".to_string(), "merge:files".to_string()),
                ("merge:merged".to_string(), "report:src".to_string()),
            ]
        );
        assert_eq!(
            graph.steps["merge"].inputs["files"].ty.as_ref().map(|t| t.to_string()),
            Some("File[]".to_string())
        );
    }

    #[test]
    fn unresolved_and_self_sources_are_dropped() {
        let doc = json!({
            "class": "Workflow",
            "inputs": {},
            "steps": {"s1": {"in": {"a": "missing", "b": "s1/out"}, "out": ["out"]}},
            "outputs": {"o": {"outputSource": "nowhere/x"}}
        });
        let graph = build_from_value(&doc).unwrap();
        assert!(graph.connections.is_empty());
    }

    #[test]
    fn output_can_pass_through_input() {
        let doc = json!({
            "class": "Workflow",
            "inputs": {"x": "File"},
            "steps": {},
            "outputs": {"copy": {"outputSource": "x"}}
        });
        let graph = build_from_value(&doc).unwrap();
        assert_eq!(pairs(&graph), vec![("x:output".to_string(), "copy:input".to_string())]);
    }

    #[test]
    fn graph_bundle_matches_bare_workflow() {
        let workflow = json!({
            "class": "Workflow",
            "inputs": {"x": "File"},
            "steps": {"s1": {"run": "#tool", "in": {"x": "x"}, "out": ["y"]}},
            "outputs": {"result": {"outputSource": "s1/y"}}
        });
        let bundle = json!({
            "cwlVersion": "v1.2",
            "$graph": [
                {"class": "CommandLineTool", "id": "#tool", "inputs": {"x": "File"}, "outputs": {"y": "File"}},
                workflow.clone()
            ]
        });
        let bare = build_from_value(&workflow).unwrap();
        let wrapped = build_from_value(&bundle).unwrap();
        assert_eq!(bare.connections, wrapped.connections);
        assert_eq!(
            bare.steps.keys().collect::<Vec<_>>(),
            wrapped.steps.keys().collect::<Vec<_>>()
        );
        let summary = wrapped.steps["s1"].run.summary().unwrap();
        assert_eq!(summary.outputs["y"].to_string(), "File");
    }

    #[test]
    fn graph_bundle_without_workflow_fails() {
        let doc = json!({"$graph": [{"class": "CommandLineTool"}]});
        assert!(matches!(build_from_value(&doc), Err(VisualizerError::NoWorkflowInGraph)));
    }

    #[test]
    fn packed_ids_are_localized() {
        let doc = json!({
            "$graph": [{
                "class": "Workflow",
                "id": "#main",
                "inputs": [{"id": "#main/reads", "type": "File"}],
                "steps": [{
                    "id": "#main/align",
                    "run": "#bwa.cwl",
                    "in": [{"id": "#main/align/fq", "source": "#main/reads"}],
                    "out": ["#main/align/bam"]
                }],
                "outputs": [{"id": "#main/bam", "outputSource": "#main/align/bam"}]
            }]
        });
        let graph = build_from_value(&doc).unwrap();
        assert_eq!(graph.id, "main");
        assert_eq!(
            pairs(&graph),
            vec![
                ("reads:output".to_string(), "align:fq".to_string()),
                ("align:bam".to_string(), "bam:input".to_string()),
            ]
        );
        assert!(matches!(graph.steps["align"].run, RunRef::Path(_)));
    }

    #[test]
    fn non_mapping_root_is_invalid() {
        assert!(matches!(
            build_from_value(&json!([1, 2])),
            Err(VisualizerError::InvalidFormat(_))
        ));
        assert!(matches!(
            build_from_value(&json!({"class": "Operation"})),
            Err(VisualizerError::InvalidFormat(_))
        ));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(
            build("{\"class\": ", InputFormat::Auto),
            Err(VisualizerError::Parse(_))
        ));
    }

    #[test]
    fn key_value_fallback_reads_flat_pairs() {
        let text = "# comment\ncwlVersion: v1.2\nclass: 'Workflow'\nlabel: \"My flow\"\n";
        let value = parse_key_values(text).unwrap();
        assert_eq!(value["class"], "Workflow");
        assert_eq!(value["label"], "My flow");
        assert!(parse_key_values("no pairs here").is_none());
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn parses_yaml_workflow() {
        let text = r#"
cwlVersion: v1.2
class: Workflow
inputs:
  reads: File[]
steps:
  count:
    run: wc.cwl
    in:
      files: reads
    out: [total]
outputs:
  total:
    type: int
    outputSource: count/total
"#;
        let graph = build(text, InputFormat::Auto).unwrap();
        assert_eq!(graph.inputs["reads"].ty.to_string(), "File[]");
        assert_eq!(graph.connections.len(), 2);
    }

    #[test]
    fn workflow_id_matching_a_step_keeps_step_sources() {
        let doc = json!({
            "cwlVersion": "v1.2",
            "class": "Workflow",
            "id": "bwa",
            "inputs": {"reads": "File"},
            "steps": {
                "bwa": {"run": "bwa.cwl", "in": {"fq": "reads"}, "out": ["bam"]},
                "sort": {"run": "sort.cwl", "in": {"bam": "bwa/bam"}, "out": ["sorted"]}
            },
            "outputs": {"aligned": {"type": "File", "outputSource": "bwa/bam"}}
        });
        let graph = build_from_value(&doc).unwrap();
        assert_eq!(graph.steps["sort"].inputs["bam"].sources, vec!["bwa/bam".to_string()]);
        assert_eq!(graph.outputs["aligned"].output_source, vec!["bwa/bam".to_string()]);
        assert_eq!(
            pairs(&graph),
            vec![
                ("reads:output".to_string(), "bwa:fq".to_string()),
                ("bwa:bam".to_string(), "sort:bam".to_string()),
                ("bwa:bam".to_string(), "aligned:input".to_string()),
            ]
        );
    }

    #[test]
    fn list_ids_sharing_the_step_prefix_stay_whole() {
        let doc = json!({
            "cwlVersion": "v1.2",
            "class": "Workflow",
            "id": "main",
            "inputs": [{"id": "main/reads", "type": "File"}],
            "steps": [{
                "id": "count",
                "run": "wc.cwl",
                "in": [{"id": "count/file", "source": "main/reads"}],
                "out": ["count/total"]
            }],
            "outputs": []
        });
        let graph = build_from_value(&doc).unwrap();
        assert!(graph.inputs.contains_key("main/reads"));
        assert!(graph.steps["count"].inputs.contains_key("count/file"));
        assert_eq!(graph.steps["count"].outputs[0].id, "count/total");
        assert_eq!(
            pairs(&graph),
            vec![("main/reads:output".to_string(), "count:count/file".to_string())]
        );
    }

    #[cfg(not(feature = "yaml"))]
    #[test]
    fn yaml_without_parser_is_parse_error() {
        let text = "cwlVersion: v1.2\nclass: Workflow\ninputs:\n  x: File\n";
        assert!(matches!(
            build(text, InputFormat::Yaml),
            Err(VisualizerError::Parse(_))
        ));
        assert!(matches!(
            build(text, InputFormat::Auto),
            Err(VisualizerError::Parse(_))
        ));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn plain_text_is_parse_error() {
        assert!(matches!(
            build("just some words", InputFormat::Yaml),
            Err(VisualizerError::Parse(_))
        ));
    }
}
