use crate::config::ViewConfig;
use serde::Serialize;

/// Axis-aligned box accumulated from points; starts empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}

impl Bounds {
    pub fn empty() -> Self {
        Self {
            min_x: f32::INFINITY,
            min_y: f32::INFINITY,
            max_x: f32::NEG_INFINITY,
            max_y: f32::NEG_INFINITY,
        }
    }

    pub fn from_rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + width,
            max_y: y + height,
        }
    }

    pub fn include(&mut self, x: f32, y: f32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn include_circle(&mut self, cx: f32, cy: f32, r: f32) {
        self.include(cx - r, cy - r);
        self.include(cx + r, cy + r);
    }

    pub fn is_empty(&self) -> bool {
        !(self.min_x <= self.max_x && self.min_y <= self.max_y)
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// Pan and zoom applied to the whole scene as one transform:
/// `screen = scene * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl ViewState {
    pub fn transform_attr(&self) -> String {
        format!(
            "translate({:.2}, {:.2}) scale({:.4})",
            self.pan_x, self.pan_y, self.zoom
        )
    }

    pub fn to_scene(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pan_x) / self.zoom, (y - self.pan_y) / self.zoom)
    }

    pub fn to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.zoom + self.pan_x, y * self.zoom + self.pan_y)
    }

    /// The part of the scene currently visible on a `width`×`height` canvas.
    pub fn visible_bounds(&self, width: f32, height: f32) -> Bounds {
        let (x0, y0) = self.to_scene(0.0, 0.0);
        let (x1, y1) = self.to_scene(width, height);
        Bounds {
            min_x: x0,
            min_y: y0,
            max_x: x1,
            max_y: y1,
        }
    }

    /// Multiplies the zoom level, keeping the pan.
    pub fn zoom_by(&mut self, factor: f32, config: &ViewConfig) {
        self.zoom = config.clamp_zoom(self.zoom * factor);
    }

    /// Zooms while keeping the scene point under `anchor` (screen space) fixed.
    pub fn zoom_at(&mut self, factor: f32, anchor: (f32, f32), config: &ViewConfig) {
        let (sx, sy) = self.to_scene(anchor.0, anchor.1);
        self.zoom_by(factor, config);
        self.pan_x = anchor.0 - sx * self.zoom;
        self.pan_y = anchor.1 - sy * self.zoom;
    }

    /// Largest zoom not above 1 that fits `content` inside the canvas with
    /// `padding` on every side, centred. Empty content leaves the view alone.
    pub fn fit(&mut self, content: &Bounds, width: f32, height: f32, config: &ViewConfig) {
        if content.is_empty() {
            return;
        }
        let padding = config.fit_padding;
        let mut scale: f32 = 1.0;
        if content.width() > 0.0 {
            scale = scale.min((width - 2.0 * padding) / content.width());
        }
        if content.height() > 0.0 {
            scale = scale.min((height - 2.0 * padding) / content.height());
        }
        if !scale.is_finite() || scale <= 0.0 {
            scale = config.min_zoom;
        }
        self.zoom = config.clamp_zoom(scale);
        self.pan_x = (width - content.width() * self.zoom) / 2.0 - content.min_x * self.zoom;
        self.pan_y = (height - content.height() * self.zoom) / 2.0 - content.min_y * self.zoom;
    }
}
