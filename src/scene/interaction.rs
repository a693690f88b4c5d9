use serde::Deserialize;
use tracing::trace;

use super::{Hit, Mode, Scene};
use crate::ir::NodeKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn multi_select(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer input in canvas (screen) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerEvent {
    Down {
        x: f32,
        y: f32,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Move {
        x: f32,
        y: f32,
    },
    Up {
        x: f32,
        y: f32,
    },
    Leave,
    Wheel {
        x: f32,
        y: f32,
        #[serde(rename = "deltaY")]
        delta_y: f32,
    },
}

impl Scene {
    /// Feeds one pointer event through the pan/drag/hover state machine.
    /// Returns whether anything visible changed.
    pub fn handle(&mut self, event: PointerEvent) -> bool {
        trace!(?event, mode = ?self.mode, "pointer event");
        match event {
            PointerEvent::Down { x, y, modifiers } => self.pointer_down(x, y, modifiers),
            PointerEvent::Move { x, y } => self.pointer_move(x, y),
            PointerEvent::Up { x, y } => self.pointer_up(x, y),
            PointerEvent::Leave => self.pointer_leave(),
            PointerEvent::Wheel { x, y, delta_y } => {
                let factor = if delta_y > 0.0 {
                    self.config.view.wheel_zoom_out
                } else {
                    self.config.view.wheel_zoom_in
                };
                self.view.zoom_at(factor, (x, y), &self.config.view);
                self.refresh_labels();
                true
            }
        }
    }

    fn pointer_down(&mut self, x: f32, y: f32, modifiers: Modifiers) -> bool {
        if self.mode != Mode::Ready {
            return false;
        }
        match self.hit_test(x, y) {
            Hit::DetailsClose => self.close_details(),
            Hit::Panel => false,
            Hit::Port {
                node_id,
                port_id,
                side,
            } => self.show_port_details(&node_id, &port_id, side),
            Hit::Node(node_id) => {
                self.select_node(&node_id, modifiers.multi_select());
                let node_start = self.position(&node_id).unwrap_or_default();
                self.mode = Mode::Dragging {
                    node_id,
                    origin: (x, y),
                    node_start,
                    moved: false,
                };
                true
            }
            Hit::Background => {
                let closed = self.close_details();
                self.mode = Mode::Panning {
                    origin: (x, y),
                    start_pan: (self.view.pan_x, self.view.pan_y),
                };
                closed
            }
        }
    }

    fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        match &mut self.mode {
            Mode::Dragging {
                node_id,
                origin,
                node_start,
                moved,
            } => {
                let dx = (x - origin.0) / self.view.zoom;
                let dy = (y - origin.1) / self.view.zoom;
                if dx != 0.0 || dy != 0.0 {
                    *moved = true;
                }
                let node_id = node_id.clone();
                let target = (node_start.0 + dx, node_start.1 + dy);
                self.move_node(&node_id, target.0, target.1)
            }
            Mode::Panning { origin, start_pan } => {
                self.view.pan_x = start_pan.0 + (x - origin.0);
                self.view.pan_y = start_pan.1 + (y - origin.1);
                self.refresh_labels();
                true
            }
            Mode::Ready => self.update_hover(x, y),
        }
    }

    fn update_hover(&mut self, x: f32, y: f32) -> bool {
        let hit = self.hit_test(x, y);
        match hit.node_id() {
            Some(node_id) => {
                if self.hover.as_ref().is_some_and(|h| h.node_id == node_id) {
                    return false;
                }
                let node_id = node_id.to_string();
                self.show_labels(&node_id);
                true
            }
            None => self.hide_labels(),
        }
    }

    fn pointer_up(&mut self, x: f32, y: f32) -> bool {
        match std::mem::take(&mut self.mode) {
            Mode::Dragging { node_id, moved, .. } => {
                let mut changed = false;
                if !moved && self.graph.node_kind(&node_id) == Some(NodeKind::Step) {
                    changed |= self.show_step_details(&node_id);
                }
                let still_over = self.hit_test(x, y).node_id() == Some(node_id.as_str());
                if !still_over && self.hover.as_ref().is_some_and(|h| h.node_id == node_id) {
                    changed |= self.hide_labels();
                }
                changed
            }
            Mode::Panning { .. } | Mode::Ready => false,
        }
    }

    /// Leaving the canvas ends a pan and clears hover labels. A drag keeps
    /// its capture until the pointer is released.
    fn pointer_leave(&mut self) -> bool {
        if matches!(self.mode, Mode::Dragging { .. }) {
            return false;
        }
        self.mode = Mode::Ready;
        self.hide_labels()
    }
}
