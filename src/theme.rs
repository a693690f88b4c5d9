use crate::cwl_type::CwlType;
use serde::{Deserialize, Serialize};

/// Port indicator colors keyed by the base CWL type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortPalette {
    pub string: String,
    pub int: String,
    pub float: String,
    pub boolean: String,
    pub file: String,
    pub directory: String,
    pub any: String,
    pub null: String,
    pub fallback: String,
}

impl Default for PortPalette {
    fn default() -> Self {
        Self {
            string: "#22c55e".to_string(),
            int: "#3b82f6".to_string(),
            float: "#8b5cf6".to_string(),
            boolean: "#f59e0b".to_string(),
            file: "#ef4444".to_string(),
            directory: "#84cc16".to_string(),
            any: "#6b7280".to_string(),
            null: "#9ca3af".to_string(),
            fallback: "#64748b".to_string(),
        }
    }
}

impl PortPalette {
    pub fn color_for(&self, ty: &CwlType) -> &str {
        match ty.base_name() {
            "string" => &self.string,
            "int" => &self.int,
            "float" => &self.float,
            "boolean" => &self.boolean,
            "File" => &self.file,
            "Directory" => &self.directory,
            "Any" => &self.any,
            "null" => &self.null,
            _ => &self.fallback,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub title_font_size: f32,
    pub label_font_size: f32,
    pub background: String,
    pub node_outer_fill: String,
    pub node_outer_stroke: String,
    pub node_outer_stroke_width: f32,
    pub node_selected_stroke: String,
    pub io_inner_fill: String,
    pub step_inner_fill: String,
    pub icon_color: String,
    pub title_color: String,
    pub title_halo: String,
    pub port_fill: String,
    pub edge_outer: String,
    pub edge_outer_width: f32,
    pub edge_inner: String,
    pub edge_inner_width: f32,
    pub edge_highlight: String,
    pub edge_dimmed_opacity: f32,
    pub label_background: String,
    pub label_text: String,
    pub panel_background: String,
    pub panel_border: String,
    pub panel_title: String,
    pub panel_heading: String,
    pub panel_text: String,
    pub panel_close: String,
    pub port_colors: PortPalette,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            font_family: "system-ui, -apple-system, sans-serif".to_string(),
            title_font_size: 14.0,
            label_font_size: 11.0,
            background: "#303030".to_string(),
            node_outer_fill: "#ffffff".to_string(),
            node_outer_stroke: "rgb(154, 154, 154)".to_string(),
            node_outer_stroke_width: 2.0,
            node_selected_stroke: "#11a7a7".to_string(),
            io_inner_fill: "#c3c3c3".to_string(),
            step_inner_fill: "#11a7a7".to_string(),
            icon_color: "#333333".to_string(),
            title_color: "#333333".to_string(),
            title_halo: "#ffffff".to_string(),
            port_fill: "rgb(154, 154, 154)".to_string(),
            edge_outer: "#222222".to_string(),
            edge_outer_width: 4.0,
            edge_inner: "#ffffff".to_string(),
            edge_inner_width: 2.0,
            edge_highlight: "#11a7a7".to_string(),
            edge_dimmed_opacity: 0.3,
            label_background: "#303030".to_string(),
            label_text: "#ffffff".to_string(),
            panel_background: "#ffffff".to_string(),
            panel_border: "#e5e7eb".to_string(),
            panel_title: "#1f2937".to_string(),
            panel_heading: "#4b5563".to_string(),
            panel_text: "#6b7280".to_string(),
            panel_close: "#ef4444".to_string(),
            port_colors: PortPalette::default(),
        }
    }

    pub fn light() -> Self {
        Self {
            background: "#f8fafc".to_string(),
            edge_outer: "#94a3b8".to_string(),
            edge_inner: "#f8fafc".to_string(),
            label_background: "#e2e8f0".to_string(),
            label_text: "#0f172a".to_string(),
            title_halo: "#f8fafc".to_string(),
            ..Self::dark()
        }
    }
}
