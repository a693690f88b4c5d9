use crate::cwl_type::CwlType;
use crate::ports::{Port, PortSide};
use crate::scene::view::Bounds;
use serde::Serialize;

const CHAR_WIDTH: f32 = 7.0;
const TEXT_PADDING: f32 = 4.0;
const ICON_SPACE: f32 = 16.0;
const LABEL_HEIGHT: f32 = 16.0;
const PORT_GAP: f32 = 8.0;
const EDGE_MARGIN: f32 = 10.0;

/// Hover tag shown beside one port: a dark pill with a type icon and
/// `name: type`. Geometry is in scene coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortLabel {
    pub port_id: String,
    pub side: PortSide,
    pub text: String,
    #[serde(rename = "type")]
    pub ty: CwlType,
    pub rect_x: f32,
    pub rect_y: f32,
    pub width: f32,
    pub height: f32,
    pub text_x: f32,
    pub text_y: f32,
    pub icon_x: f32,
    pub icon_y: f32,
}

pub fn label_width(text: &str) -> f32 {
    text.chars().count() as f32 * CHAR_WIDTH + TEXT_PADDING + ICON_SPACE
}

impl PortLabel {
    pub fn new(port: &Port, anchor: (f32, f32), visible: &Bounds) -> Self {
        let text = format!("{}: {}", port.name, port.ty);
        let mut label = Self {
            port_id: port.id.clone(),
            side: port.side,
            width: label_width(&text),
            text,
            ty: port.ty.clone(),
            rect_x: 0.0,
            rect_y: 0.0,
            height: LABEL_HEIGHT,
            text_x: 0.0,
            text_y: 0.0,
            icon_x: 0.0,
            icon_y: 0.0,
        };
        label.place(anchor, visible);
        label
    }

    /// Moves the label next to the port at `anchor`, keeping it inside the
    /// visible part of the scene horizontally. Text and type are untouched.
    pub fn place(&mut self, anchor: (f32, f32), visible: &Bounds) {
        let (x, y) = anchor;
        match self.side {
            PortSide::Input => {
                let mut rect_x = x - self.width - PORT_GAP;
                if rect_x < visible.min_x + EDGE_MARGIN {
                    rect_x = visible.min_x + EDGE_MARGIN;
                }
                self.rect_x = rect_x;
                self.icon_x = rect_x + 2.0;
                self.text_x = rect_x + 2.0 + ICON_SPACE;
            }
            PortSide::Output => {
                let mut rect_x = x + PORT_GAP;
                if rect_x + self.width > visible.max_x - EDGE_MARGIN {
                    rect_x = visible.max_x - self.width - EDGE_MARGIN;
                }
                self.rect_x = rect_x;
                self.text_x = rect_x + 2.0;
                self.icon_x = rect_x + self.width - 14.0;
            }
        }
        self.rect_y = y - LABEL_HEIGHT / 2.0;
        self.text_y = y + 3.0;
        self.icon_y = y - 6.0;
    }
}
