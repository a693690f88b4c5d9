use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    pub node_spacing: f32,
    pub level_spacing: f32,
    /// Distance of the first column from the left edge and the minimum top offset.
    pub margin: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 140.0,
            node_height: 70.0,
            node_spacing: 80.0,
            level_spacing: 180.0,
            margin: 50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortConfig {
    pub base_radius: f32,
    pub radius_increment: f32,
    pub aperture_degrees: f32,
    pub handle_radius: f32,
    pub inner_ratio: f32,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            base_radius: 35.0,
            radius_increment: 6.0,
            aperture_degrees: 140.0,
            handle_radius: 5.0,
            inner_ratio: 0.75,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub wheel_zoom_in: f32,
    pub wheel_zoom_out: f32,
    pub fit_padding: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 5.0,
            wheel_zoom_in: 1.1,
            wheel_zoom_out: 0.9,
            fit_padding: 50.0,
        }
    }
}

impl ViewConfig {
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 600.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub ports: PortConfig,
    pub view: ViewConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    background: Option<String>,
    node_fill: Option<String>,
    node_stroke: Option<String>,
    step_fill: Option<String>,
    io_fill: Option<String>,
    edge_color: Option<String>,
    edge_inner_color: Option<String>,
    highlight_color: Option<String>,
    label_background: Option<String>,
    label_color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    node_width: Option<f32>,
    node_height: Option<f32>,
    node_spacing: Option<f32>,
    level_spacing: Option<f32>,
    margin: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PortConfigFile {
    base_radius: Option<f32>,
    radius_increment: Option<f32>,
    aperture_degrees: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewConfigFile {
    min_zoom: Option<f32>,
    max_zoom: Option<f32>,
    fit_padding: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    ports: Option<PortConfigFile>,
    view: Option<ViewConfigFile>,
    width: Option<f32>,
    height: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Applies a JSON config document on top of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "light" => config.theme = Theme::light(),
            "dark" | "default" => config.theme = Theme::dark(),
            other => tracing::warn!(theme = other, "unknown theme name, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_outer_fill = v;
        }
        if let Some(v) = vars.node_stroke {
            config.theme.node_outer_stroke = v;
        }
        if let Some(v) = vars.step_fill {
            config.theme.step_inner_fill = v;
        }
        if let Some(v) = vars.io_fill {
            config.theme.io_inner_fill = v;
        }
        if let Some(v) = vars.edge_color {
            config.theme.edge_outer = v;
        }
        if let Some(v) = vars.edge_inner_color {
            config.theme.edge_inner = v;
        }
        if let Some(v) = vars.highlight_color {
            config.theme.edge_highlight = v.clone();
            config.theme.node_selected_stroke = v;
        }
        if let Some(v) = vars.label_background {
            config.theme.label_background = v;
        }
        if let Some(v) = vars.label_color {
            config.theme.label_text = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.node_width {
            config.layout.node_width = v;
        }
        if let Some(v) = layout.node_height {
            config.layout.node_height = v;
        }
        if let Some(v) = layout.node_spacing {
            config.layout.node_spacing = v;
        }
        if let Some(v) = layout.level_spacing {
            config.layout.level_spacing = v;
        }
        if let Some(v) = layout.margin {
            config.layout.margin = v;
        }
    }

    if let Some(ports) = parsed.ports {
        if let Some(v) = ports.base_radius {
            config.ports.base_radius = v;
        }
        if let Some(v) = ports.radius_increment {
            config.ports.radius_increment = v;
        }
        if let Some(v) = ports.aperture_degrees {
            config.ports.aperture_degrees = v.clamp(0.0, 180.0);
        }
    }

    if let Some(view) = parsed.view {
        if let Some(v) = view.min_zoom {
            config.view.min_zoom = v.max(f32::EPSILON);
        }
        if let Some(v) = view.max_zoom {
            config.view.max_zoom = v.max(config.view.min_zoom);
        }
        if let Some(v) = view.fit_padding {
            config.view.fit_padding = v;
        }
    }

    if let Some(v) = parsed.width {
        config.render.width = v;
    }
    if let Some(v) = parsed.height {
        config.render.height = v;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_canvas() {
        let config = Config::default();
        assert_eq!(config.render.width, 900.0);
        assert_eq!(config.render.height, 600.0);
        assert_eq!(config.layout.node_height, 70.0);
        assert_eq!(config.view.clamp_zoom(10.0), 5.0);
        assert_eq!(config.view.clamp_zoom(0.01), 0.1);
    }

    #[test]
    fn parses_overrides() {
        let config = parse_config(
            r##"{
                "theme": "light",
                "themeVariables": {"highlightColor": "#ff0000"},
                "layout": {"levelSpacing": 240},
                "ports": {"apertureDegrees": 120},
                "width": 1200
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.background, Theme::light().background);
        assert_eq!(config.theme.edge_highlight, "#ff0000");
        assert_eq!(config.layout.level_spacing, 240.0);
        assert_eq!(config.ports.aperture_degrees, 120.0);
        assert_eq!(config.render.width, 1200.0);
        assert_eq!(config.render.height, 600.0);
    }
}
