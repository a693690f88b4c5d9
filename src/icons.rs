use crate::cwl_type::CwlType;
use crate::ir::{NodeKind, ProcessClass, WorkflowGraph};
use crate::ports::PortSide;

/// Glyph drawn in the middle of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeIcon {
    FileInput,
    TypeInput,
    FileOutput,
    TypeOutput,
    Workflow,
    Tool,
}

impl NodeIcon {
    pub fn for_node(graph: &WorkflowGraph, id: &str) -> Self {
        match graph.node_kind(id) {
            Some(NodeKind::Input) => match graph.inputs.get(id) {
                Some(input) if input.ty.is_file() => NodeIcon::FileInput,
                _ => NodeIcon::TypeInput,
            },
            Some(NodeKind::Output) => match graph.outputs.get(id) {
                Some(output) if output.ty.is_file() => NodeIcon::FileOutput,
                _ => NodeIcon::TypeOutput,
            },
            Some(NodeKind::Step) => match graph.steps.get(id).map(|s| s.run.class()) {
                Some(ProcessClass::Workflow) => NodeIcon::Workflow,
                _ => NodeIcon::Tool,
            },
            None => NodeIcon::Tool,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            NodeIcon::FileInput => "file_input",
            NodeIcon::TypeInput => "type_input",
            NodeIcon::FileOutput => "file_output",
            NodeIcon::TypeOutput => "type_output",
            NodeIcon::Workflow => "workflow",
            NodeIcon::Tool => "tool2",
        }
    }

    /// Self-contained `<svg>` element positioned around the node origin.
    pub fn svg(self, color: &str) -> String {
        let (view_box, x, y, w, h, body) = match self {
            NodeIcon::FileInput => (
                "0 0 499 462.86",
                -11,
                -10,
                20,
                20,
                r#"<path d="M386.06,0H175V58.29l50,50V50H337.81V163.38h25l86.19.24V412.86H225V353.71l-50,50v59.15H499V112.94Zm1.75,113.45v-41l41.1,41.1Z"/><polygon points="387.81 1.06 387.81 1.75 387.12 1.06 387.81 1.06"/><polygon points="290.36 231 176.68 344.68 141.32 309.32 194.64 256 0 256 0 206 194.64 206 141.32 152.68 176.68 117.32 290.36 231"/>"#,
            ),
            NodeIcon::TypeInput => (
                "0 0 499 365",
                -11,
                -10,
                20,
                20,
                r#"<path d="M316.5,68a181.72,181.72,0,0,0-114.12,40.09L238,143.72a132.5,132.5,0,1,1,1.16,214.39L203.48,393.8A182.5,182.5,0,1,0,316.5,68Z" transform="translate(0 -68)"/><polygon points="290.36 182 176.68 295.68 141.32 260.32 219.64 182 141.32 103.68 176.68 68.32 290.36 182"/>"#,
            ),
            NodeIcon::FileOutput => (
                "0 0 499 462.86",
                -7,
                -11,
                20,
                20,
                r#"<polygon points="387.81 1.06 387.81 1.75 387.12 1.06 387.81 1.06"/><polygon points="499 231 385.32 344.68 349.96 309.32 403.28 256 208.64 256 208.64 206 403.28 206 350.96 153.68 386.32 118.32 499 231"/><path d="M187.81,163.38l77.69.22H324V112.94L211.06,0H0V462.86H324V298.5H274V412.86H50V50H187.81Z"/>"#,
            ),
            NodeIcon::TypeOutput => (
                "0 0 500.36 365",
                -9,
                -10,
                20,
                20,
                r#"<path d="M291.95,325.23a134,134,0,0,1-15.76,19,132.5,132.5,0,1,1,0-187.38,133.9,133.9,0,0,1,16.16,19.55l35.81-35.81A182.5,182.5,0,1,0,327.73,361Z" transform="translate(0 -68)"/><polygon points="209.04 182 322.72 68.32 358.08 103.68 279.76 182 358.08 260.32 322.72 295.68 209.04 182"/>"#,
            ),
            NodeIcon::Workflow => (
                "0 0 400.01 399.88",
                -9,
                -10,
                20,
                20,
                r#"<path d="M400,200a80,80,0,0,1-140.33,52.53L158.23,303.24a80,80,0,1,1-17.9-35.77l101.44-50.71a80.23,80.23,0,0,1,0-33.52L140.33,132.53a79.87,79.87,0,1,1,17.9-35.77l101.44,50.71A80,80,0,0,1,400,200Z" transform="translate(0.01 -0.16)"/>"#,
            ),
            NodeIcon::Tool => (
                "0 0 398.39 397.78",
                -10,
                -8,
                20,
                15,
                r#"<polygon points="38.77 397.57 0 366 136.15 198.78 0 31.57 38.77 0 200.63 198.78 38.77 397.57"/><rect x="198.39" y="347.78" width="200" height="50"/>"#,
            ),
        };
        format!(
            r#"<svg class="node-icon" xmlns="http://www.w3.org/2000/svg" viewBox="{view_box}" x="{x}" y="{y}" width="{w}" height="{h}" fill="{color}"><title>{}</title>{body}</svg>"#,
            self.title()
        )
    }
}

/// Small type glyph shown inside hover labels, drawn in `color`.
pub fn port_type_icon(ty: &CwlType, side: PortSide, x: f32, y: f32, color: &str) -> String {
    let name = ty.to_string().to_ascii_lowercase();
    let has = |needle: &str| name.contains(needle);
    let (view_box, body) = if has("file") {
        match side {
            PortSide::Input => (
                "0 0 499 462.86",
                r#"<path d="M386.06,0H175V58.29l50,50V50H337.81V163.38h25l86.19.24V412.86H225V353.71l-50,50v59.15H499V112.94Zm1.75,113.45v-41l41.1,41.1Z" fill="currentColor"/><polygon points="290.36 231 176.68 344.68 141.32 309.32 194.64 256 0 256 0 206 194.64 206 141.32 152.68 176.68 118.32 290.36 231" fill="currentColor"/>"#,
            ),
            PortSide::Output => (
                "0 0 499 462.86",
                r#"<polygon points="499 231 385.32 344.68 349.96 309.32 403.28 256 208.64 256 208.64 206 403.28 206 350.96 153.68 386.32 118.32 499 231" fill="currentColor"/><path d="M187.81,163.38l77.69.22H324V112.94L211.06,0H0V462.86H324V298.5H274V412.86H50V50H161.06L187.81,76.75Z" fill="currentColor"/>"#,
            ),
        }
    } else if has("directory") {
        (
            "0 0 24 24",
            r#"<path d="M3 4h6l2 2h10v12H3V4z" fill="none" stroke="currentColor" stroke-width="1.5"/>"#,
        )
    } else if has("int") || has("float") || has("double") || has("long") {
        (
            "0 0 24 24",
            r##"<text x="12" y="16" text-anchor="middle" font-size="14" font-weight="bold" fill="currentColor">#</text>"##,
        )
    } else if has("boolean") {
        (
            "0 0 24 24",
            r#"<circle cx="12" cy="12" r="8" fill="none" stroke="currentColor" stroke-width="1.5"/><circle cx="12" cy="12" r="3" fill="currentColor"/>"#,
        )
    } else if has("string") || has("text") {
        (
            "0 0 24 24",
            r#"<path d="M3 7h18M3 12h18M3 17h12" stroke="currentColor" stroke-width="1.5" stroke-linecap="round"/>"#,
        )
    } else if has("array") || has("[]") {
        (
            "0 0 24 24",
            r#"<path d="M6 6h2v12H6M16 6h2v12h-2M10 9h4M10 12h4M10 15h4" stroke="currentColor" stroke-width="1.5" stroke-linecap="round"/>"#,
        )
    } else {
        (
            "0 0 24 24",
            r#"<circle cx="12" cy="12" r="8" fill="none" stroke="currentColor" stroke-width="1.5"/><text x="12" y="16" text-anchor="middle" font-size="10" fill="currentColor">?</text>"#,
        )
    };
    format!(
        r#"<svg class="port-type-icon" xmlns="http://www.w3.org/2000/svg" viewBox="{view_box}" x="{x:.2}" y="{y:.2}" width="12" height="12" color="{color}">{body}</svg>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::build_from_value;
    use serde_json::json;

    #[test]
    fn icons_follow_node_kind_and_type() {
        let graph = build_from_value(&json!({
            "class": "Workflow",
            "inputs": {"reads": "File[]", "k": "int"},
            "steps": {
                "sub": {"run": "nested-workflow.cwl", "in": {"r": "reads"}, "out": ["o"]},
                "tool": {"run": "tool.cwl", "in": {"k": "k"}, "out": ["o"]}
            },
            "outputs": {
                "bam": {"type": "File", "outputSource": "sub/o"},
                "n": {"type": "int", "outputSource": "tool/o"}
            }
        }))
        .unwrap();
        assert_eq!(NodeIcon::for_node(&graph, "reads"), NodeIcon::FileInput);
        assert_eq!(NodeIcon::for_node(&graph, "k"), NodeIcon::TypeInput);
        assert_eq!(NodeIcon::for_node(&graph, "sub"), NodeIcon::Workflow);
        assert_eq!(NodeIcon::for_node(&graph, "tool"), NodeIcon::Tool);
        assert_eq!(NodeIcon::for_node(&graph, "bam"), NodeIcon::FileOutput);
        assert_eq!(NodeIcon::for_node(&graph, "n"), NodeIcon::TypeOutput);
        assert!(NodeIcon::Workflow.svg("#333").contains("<title>workflow</title>"));
    }

    #[test]
    fn port_icons_match_type_names() {
        let icon = |raw: &str| port_type_icon(&CwlType::parse(raw), PortSide::Input, 0.0, 0.0, "#fff");
        assert!(icon("File").contains("M386.06"));
        assert!(icon("Directory").contains("M3 4h6"));
        assert!(icon("long").contains(">#</text>"));
        assert!(icon("boolean").contains(r#"r="3""#));
        assert!(icon("string[]").contains("M3 7h18"));
        assert!(icon("Any").contains(">?</text>"));
        let out = port_type_icon(&CwlType::file(), PortSide::Output, 4.0, 5.0, "#fff");
        assert!(out.contains(r#"x="4.00" y="5.00""#));
        assert!(out.contains("M187.81"));
    }
}
