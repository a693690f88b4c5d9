use crate::config::RenderConfig;
use crate::icons::{port_type_icon, NodeIcon};
use crate::ir::NodeKind;
use crate::ports::{port_ids, port_offset, PortSide};
use crate::scene::{DetailsPanel, EdgeState, PortDetails, PortLabel, Scene, SceneEdge, StepDetails, ROW_HEIGHT};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Serializes the scene exactly as it currently looks: view transform,
/// edge states, hover labels and any open details panel included.
pub fn render_svg(scene: &Scene, theme: &Theme) -> String {
    let (width, height) = scene.canvas_size();
    let mut svg = String::new();
    open_svg(&mut svg, width, height, theme);

    svg.push_str(&format!(
        "<g class=\"workflow\" transform=\"{}\">",
        scene.view.transform_attr()
    ));

    svg.push_str("<g class=\"connections\">");
    for edge in &scene.edges {
        svg.push_str(&edge_svg(scene, edge, theme));
    }
    svg.push_str("</g>");

    svg.push_str("<g class=\"nodes\">");
    for (id, kind) in scene.graph.nodes() {
        svg.push_str(&node_svg(scene, id, kind, theme));
    }
    svg.push_str("</g>");

    if let Some(hover) = &scene.hover {
        svg.push_str(&format!(
            "<g class=\"port-labels\" data-node-id=\"{}\">",
            escape_xml(&hover.node_id)
        ));
        for label in &hover.labels {
            svg.push_str(&label_svg(label, theme));
        }
        svg.push_str("</g>");
    }

    match &scene.details {
        Some(DetailsPanel::Step(panel)) => svg.push_str(&step_details_svg(panel, theme)),
        Some(DetailsPanel::Port(panel)) => svg.push_str(&port_details_svg(panel, theme)),
        None => {}
    }

    svg.push_str("</g></svg>");
    svg
}

/// Canvas with no workflow loaded.
pub fn render_empty(theme: &Theme, config: &RenderConfig) -> String {
    let mut svg = String::new();
    open_svg(&mut svg, config.width, config.height, theme);
    svg.push_str("<g class=\"workflow\" transform=\"translate(0.00, 0.00) scale(1.0000)\"></g></svg>");
    svg
}

fn open_svg(svg: &mut String, width: f32, height: f32, theme: &Theme) {
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" class=\"cwl-workflow\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\" font-family=\"{}\">",
        escape_xml(&theme.font_family)
    ));
    svg.push_str(&format!(
        "<rect class=\"background\" width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
}

fn edge_svg(scene: &Scene, edge: &SceneEdge, theme: &Theme) -> String {
    let Some(path) = &edge.path else {
        return String::new();
    };
    let d = path.to_svg_path();
    let state = scene.edge_state(edge);
    let (class, outer_color, outer_width, opacity) = match state {
        EdgeState::Normal => ("edge", theme.edge_outer.as_str(), theme.edge_outer_width, None),
        EdgeState::Highlighted => ("edge highlighted", theme.edge_highlight.as_str(), 5.0, None),
        EdgeState::Dimmed => (
            "edge dimmed",
            theme.edge_outer.as_str(),
            theme.edge_outer_width,
            Some(theme.edge_dimmed_opacity),
        ),
    };
    let opacity = opacity
        .map(|o| format!(" opacity=\"{o:.2}\""))
        .unwrap_or_default();
    let conn = &edge.connection;
    format!(
        "<g class=\"{class}\" data-source-node=\"{}\" data-source-port=\"{}\" data-destination-node=\"{}\" data-destination-port=\"{}\"{opacity}><path class=\"sub-edge outer\" d=\"{d}\" fill=\"none\" stroke=\"{outer_color}\" stroke-width=\"{outer_width}\"/><path class=\"sub-edge inner\" d=\"{d}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/></g>",
        escape_xml(&conn.from.id),
        escape_xml(&conn.from.port),
        escape_xml(&conn.to.id),
        escape_xml(&conn.to.port),
        theme.edge_inner,
        theme.edge_inner_width
    )
}

fn node_svg(scene: &Scene, id: &str, kind: NodeKind, theme: &Theme) -> String {
    let Some((x, y)) = scene.position(id) else {
        return String::new();
    };
    let ports = &scene.config().ports;
    let radius = scene.node_radius(id);
    let selected = scene.is_selected(id);
    let class = if selected {
        format!("node {} selected", kind.as_str())
    } else {
        format!("node {}", kind.as_str())
    };
    let stroke = if selected {
        &theme.node_selected_stroke
    } else {
        &theme.node_outer_stroke
    };
    let inner_fill = match kind {
        NodeKind::Step => &theme.step_inner_fill,
        NodeKind::Input | NodeKind::Output => &theme.io_inner_fill,
    };
    let label = scene.graph.node_label(id).unwrap_or(id);

    let mut out = format!(
        "<g class=\"{class}\" data-id=\"{}\" transform=\"matrix(1, 0, 0, 1, {x:.2}, {y:.2})\">",
        escape_xml(id)
    );
    out.push_str(&format!(
        "<g class=\"core\"><circle class=\"outer\" r=\"{radius:.2}\" fill=\"{}\" stroke=\"{stroke}\" stroke-width=\"{}\"/><circle class=\"inner\" r=\"{:.2}\" fill=\"{inner_fill}\"/>{}</g>",
        theme.node_outer_fill,
        theme.node_outer_stroke_width,
        radius * ports.inner_ratio,
        NodeIcon::for_node(&scene.graph, id).svg(&theme.icon_color)
    ));
    out.push_str(&format!(
        "<text class=\"title label\" x=\"0\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"4\" paint-order=\"stroke\">{}</text>",
        radius + 30.0,
        theme.title_font_size,
        theme.title_color,
        theme.title_halo,
        escape_xml(label)
    ));

    for side in [PortSide::Input, PortSide::Output] {
        let ids = port_ids(&scene.graph, id, side);
        let side_class = match side {
            PortSide::Input => "input-port",
            PortSide::Output => "output-port",
        };
        for (idx, port_id) in ids.iter().enumerate() {
            let (dx, dy) = port_offset(idx, ids.len(), radius, side, ports.aperture_degrees);
            out.push_str(&format!(
                "<g class=\"port {side_class}\" data-port-id=\"{}\" transform=\"matrix(1, 0, 0, 1, {dx:.2}, {dy:.2})\"><circle class=\"port-handle\" r=\"{}\" fill=\"{}\"/></g>",
                escape_xml(port_id),
                ports.handle_radius,
                theme.port_fill
            ));
        }
    }

    out.push_str("</g>");
    out
}

fn label_svg(label: &PortLabel, theme: &Theme) -> String {
    format!(
        "<g class=\"port-label\" data-port-id=\"{}\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"3\" ry=\"3\" fill=\"{}\"/>{}<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{}\" fill=\"{}\">{}</text></g>",
        escape_xml(&label.port_id),
        label.rect_x,
        label.rect_y,
        label.width,
        label.height,
        theme.label_background,
        port_type_icon(&label.ty, label.side, label.icon_x, label.icon_y, &theme.label_text),
        label.text_x,
        label.text_y,
        theme.label_font_size,
        theme.label_text,
        escape_xml(&label.text)
    )
}

fn panel_frame(x: f32, y: f32, width: f32, height: f32, class: &str, theme: &Theme) -> String {
    format!(
        "<g class=\"{class}\"><rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" rx=\"6\" ry=\"6\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
        theme.panel_background, theme.panel_border
    )
}

fn step_details_svg(panel: &StepDetails, theme: &Theme) -> String {
    let (x, y) = (panel.x, panel.y);
    let mut out = panel_frame(x, y, panel.width, panel.height, "details-panel step-details", theme);
    out.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"14\" font-weight=\"bold\" fill=\"{}\">Ports: {}</text>",
        x + 10.0,
        y + 20.0,
        theme.panel_title,
        escape_xml(&panel.label)
    ));

    let mut current_y = y + 40.0;
    let sections = [("Inputs:", &panel.inputs), ("Outputs:", &panel.outputs)];
    for (idx, (heading, ports)) in sections.into_iter().enumerate() {
        if ports.is_empty() {
            continue;
        }
        if idx > 0 {
            current_y += 10.0;
        }
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{current_y:.2}\" font-size=\"12\" fill=\"{}\">{heading}</text>",
            x + 15.0,
            theme.panel_heading
        ));
        current_y += 20.0;
        for port in ports.iter() {
            out.push_str(&format!(
                "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"3\" fill=\"{}\"/><text x=\"{:.2}\" y=\"{current_y:.2}\" font-size=\"11\" fill=\"{}\">{}: {}</text>",
                x + 20.0,
                current_y - 4.0,
                theme.port_colors.color_for(&port.ty),
                x + 25.0,
                theme.panel_text,
                escape_xml(&port.name),
                escape_xml(&port.ty.to_string())
            ));
            current_y += ROW_HEIGHT;
        }
    }

    let (cx, cy) = DetailsPanel::Step(panel.clone()).close_center();
    out.push_str(&close_button(cx, cy, theme));
    out.push_str("</g>");
    out
}

fn port_details_svg(panel: &PortDetails, theme: &Theme) -> String {
    let (x, y) = (panel.x, panel.y);
    let mut out = panel_frame(x, y, panel.width, panel.height, "details-panel port-details", theme);
    out.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"12\" font-weight=\"bold\" fill=\"{}\">Port Details</text>",
        x + 10.0,
        y + 20.0,
        theme.panel_title
    ));
    out.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"11\" fill=\"{}\">Name: {}</text>",
        x + 10.0,
        y + 38.0,
        theme.panel_heading,
        escape_xml(&panel.port.name)
    ));
    out.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"11\" fill=\"{}\">Type: {}</text>",
        x + 10.0,
        y + 54.0,
        theme.panel_heading,
        escape_xml(&panel.port.ty.to_string())
    ));
    out.push_str(&format!(
        "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"6\" fill=\"{}\"/>",
        x + panel.width - 30.0,
        y + 15.0,
        theme.port_colors.color_for(&panel.port.ty)
    ));
    let (cx, cy) = DetailsPanel::Port(panel.clone()).close_center();
    out.push_str(&close_button(cx, cy, theme));
    out.push_str("</g>");
    out
}

fn close_button(cx: f32, cy: f32, theme: &Theme) -> String {
    format!(
        "<g class=\"close-button\"><circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"8\" fill=\"{}\"/><text x=\"{cx:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"12\" fill=\"#ffffff\">\u{00d7}</text></g>",
        theme.panel_close,
        cy + 4.0
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
