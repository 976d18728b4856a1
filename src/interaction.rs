//! Interaction Controller - Gesture State Machine
//!
//! One controller per editor surface. It owns the full gesture lifecycle:
//! idle -> selected -> { dragging | resizing | rotating } -> selected -> idle.
//! At most one gesture is in flight; pointer-down on another layer cancels
//! the current one (last writer wins, no queueing).
//!
//! The controller mutates a `DesignSession` handed to it by the caller; it
//! keeps no reference of its own, so geometry stays UI-framework-independent.

use crate::model::{DesignSession, LayerKind, Position, MIN_LAYER_SIZE_PX};

/// Font size floor for text layers, coupled to box height on resize.
const MIN_FONT_SIZE: f64 = 8.0;
const FONT_HEIGHT_RATIO: f64 = 0.8;

/// The eight resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    Nw,
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
}

impl ResizeHandle {
    fn moves_left_edge(self) -> bool {
        matches!(self, Self::Nw | Self::W | Self::Sw)
    }

    fn moves_right_edge(self) -> bool {
        matches!(self, Self::Ne | Self::E | Self::Se)
    }

    fn moves_top_edge(self) -> bool {
        matches!(self, Self::Nw | Self::N | Self::Ne)
    }

    fn moves_bottom_edge(self) -> bool {
        matches!(self, Self::Sw | Self::S | Self::Se)
    }
}

/// What the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Body,
    Handle(ResizeHandle),
    RotationGrip,
}

#[derive(Debug, Clone, PartialEq)]
enum GestureState {
    Idle,
    Selected {
        layer_id: String,
    },
    Dragging {
        layer_id: String,
        grab: Position,
        start: Position,
    },
    Resizing {
        layer_id: String,
        handle: ResizeHandle,
        grab: Position,
        start_pos: Position,
        start_width: f64,
        start_height: f64,
    },
    Rotating {
        layer_id: String,
        last_angle: f64,
    },
}

pub struct GestureController {
    state: GestureState,
    zoom: f64,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureController {
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
            zoom: 1.0,
        }
    }

    /// Editor zoom factor; pointer deltas are divided by it so gestures track
    /// the cursor at any zoom level. Non-positive values are ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom > 0.0 {
            self.zoom = zoom;
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn selected_layer(&self) -> Option<&str> {
        match &self.state {
            GestureState::Idle => None,
            GestureState::Selected { layer_id }
            | GestureState::Dragging { layer_id, .. }
            | GestureState::Resizing { layer_id, .. }
            | GestureState::Rotating { layer_id, .. } => Some(layer_id),
        }
    }

    pub fn gesture_active(&self) -> bool {
        matches!(
            self.state,
            GestureState::Dragging { .. }
                | GestureState::Resizing { .. }
                | GestureState::Rotating { .. }
        )
    }

    /// Pointer-down over a layer. Selects it and, unless the layer is locked,
    /// arms the gesture the hit implies. A down on a different layer cancels
    /// any in-flight gesture; its last committed delta stands.
    pub fn pointer_down(
        &mut self,
        session: &DesignSession,
        layer_id: &str,
        hit: Hit,
        pointer: Position,
    ) {
        let Some(layer) = session.layer(layer_id) else {
            return;
        };

        if layer.locked {
            self.state = GestureState::Selected {
                layer_id: layer_id.to_string(),
            };
            return;
        }

        self.state = match hit {
            Hit::Body => GestureState::Dragging {
                layer_id: layer_id.to_string(),
                grab: pointer,
                start: layer.position,
            },
            Hit::Handle(handle) => GestureState::Resizing {
                layer_id: layer_id.to_string(),
                handle,
                grab: pointer,
                start_pos: layer.position,
                start_width: layer.style.width,
                start_height: layer.style.height,
            },
            // The grip sits above the visual center; only the angle from the
            // center matters, so the offset needs no special casing.
            Hit::RotationGrip => GestureState::Rotating {
                layer_id: layer_id.to_string(),
                last_angle: angle_to(layer.center(), pointer),
            },
        };
    }

    /// Pointer-move while a gesture is in flight. Applies the delta to the
    /// session. A move with no active gesture is a no-op.
    pub fn pointer_move(&mut self, session: &mut DesignSession, pointer: Position) {
        match &mut self.state {
            GestureState::Dragging { layer_id, grab, start } => {
                if let Some(layer) = session.layer_mut(layer_id) {
                    // No clamping: overflow is clipped by the viewport, not
                    // by repositioning.
                    layer.position.x = start.x + (pointer.x - grab.x) / self.zoom;
                    layer.position.y = start.y + (pointer.y - grab.y) / self.zoom;
                }
            }
            GestureState::Resizing {
                layer_id,
                handle,
                grab,
                start_pos,
                start_width,
                start_height,
            } => {
                let dx = (pointer.x - grab.x) / self.zoom;
                let dy = (pointer.y - grab.y) / self.zoom;
                let (pos, width, height) =
                    apply_resize(*start_pos, *start_width, *start_height, *handle, dx, dy);
                if let Some(layer) = session.layer_mut(layer_id) {
                    layer.position = pos;
                    layer.style.width = width;
                    layer.style.height = height;
                    if layer.kind == LayerKind::Text {
                        layer.style.font_size =
                            Some((height * FONT_HEIGHT_RATIO).max(MIN_FONT_SIZE));
                    }
                }
            }
            GestureState::Rotating { layer_id, last_angle } => {
                if let Some(layer) = session.layer_mut(layer_id) {
                    let angle = angle_to(layer.center(), pointer);
                    // Shortest-arc delta per tick accumulates continuously,
                    // so repeated partial turns compose through the +/-180
                    // wrap.
                    let delta = wrap_degrees(angle - *last_angle);
                    layer.transform.rotation =
                        (layer.transform.rotation + delta).rem_euclid(360.0);
                    *last_angle = angle;
                }
            }
            GestureState::Idle | GestureState::Selected { .. } => {}
        }
    }

    /// Pointer-up: the gesture's last committed delta stands and the layer
    /// stays selected. Also the recovery path when pointer capture is lost.
    pub fn pointer_up(&mut self) {
        self.state = match std::mem::replace(&mut self.state, GestureState::Idle) {
            GestureState::Idle => GestureState::Idle,
            GestureState::Selected { layer_id }
            | GestureState::Dragging { layer_id, .. }
            | GestureState::Resizing { layer_id, .. }
            | GestureState::Rotating { layer_id, .. } => GestureState::Selected { layer_id },
        };
    }

    pub fn deselect(&mut self) {
        self.state = GestureState::Idle;
    }

    /// Must be called when a layer is removed from the session; a controller
    /// pointing at a deleted layer returns to idle.
    pub fn layer_removed(&mut self, layer_id: &str) {
        if self.selected_layer() == Some(layer_id) {
            self.state = GestureState::Idle;
        }
    }
}

/// Resize arithmetic, separated from the state machine for testability.
///
/// Corner handles move both dimensions and shift the handle-side anchor so
/// the diagonally opposite corner stays fixed; edge handles move one
/// dimension (n/w also move the position coordinate). Dimensions clamp to
/// the 20px minimum, and the anchor math keeps the fixed corner fixed even
/// under the clamp.
pub fn apply_resize(
    start_pos: Position,
    start_width: f64,
    start_height: f64,
    handle: ResizeHandle,
    dx: f64,
    dy: f64,
) -> (Position, f64, f64) {
    let right = start_pos.x + start_width;
    let bottom = start_pos.y + start_height;

    let (mut x, mut width) = (start_pos.x, start_width);
    if handle.moves_left_edge() {
        width = (start_width - dx).max(MIN_LAYER_SIZE_PX);
        x = right - width;
    } else if handle.moves_right_edge() {
        width = (start_width + dx).max(MIN_LAYER_SIZE_PX);
    }

    let (mut y, mut height) = (start_pos.y, start_height);
    if handle.moves_top_edge() {
        height = (start_height - dy).max(MIN_LAYER_SIZE_PX);
        y = bottom - height;
    } else if handle.moves_bottom_edge() {
        height = (start_height + dy).max(MIN_LAYER_SIZE_PX);
    }

    (Position::new(x, y), width, height)
}

/// Angle from `center` to `point`, in degrees.
fn angle_to(center: Position, point: Position) -> f64 {
    (point.y - center.y).atan2(point.x - center.x).to_degrees()
}

/// Wraps a degree delta into (-180, 180].
fn wrap_degrees(delta: f64) -> f64 {
    let wrapped = delta.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resize(handle: ResizeHandle, dx: f64, dy: f64) -> (Position, f64, f64) {
        apply_resize(Position::new(50.0, 50.0), 100.0, 40.0, handle, dx, dy)
    }

    #[test]
    fn se_grows_both_dimensions_position_fixed() {
        let (pos, w, h) = resize(ResizeHandle::Se, 20.0, 10.0);
        assert_eq!(pos, Position::new(50.0, 50.0));
        assert_eq!((w, h), (120.0, 50.0));
    }

    #[test]
    fn nw_keeps_bottom_right_corner() {
        let (pos, w, h) = resize(ResizeHandle::Nw, 15.0, 5.0);
        assert_eq!(pos.x + w, 150.0);
        assert_eq!(pos.y + h, 90.0);
        assert_eq!((w, h), (85.0, 35.0));
    }

    #[test]
    fn edge_handles_move_one_dimension() {
        let (pos, w, h) = resize(ResizeHandle::E, 30.0, 99.0);
        assert_eq!((w, h), (130.0, 40.0));
        assert_eq!(pos, Position::new(50.0, 50.0));

        let (pos, w, h) = resize(ResizeHandle::N, 99.0, 10.0);
        assert_eq!((w, h), (100.0, 30.0));
        assert_eq!(pos, Position::new(50.0, 60.0));
    }

    #[test]
    fn clamp_preserves_fixed_corner() {
        // Dragging the west edge far right clamps width at 20 while the
        // right edge stays at 150.
        let (pos, w, _) = resize(ResizeHandle::W, 500.0, 0.0);
        assert_eq!(w, MIN_LAYER_SIZE_PX);
        assert_eq!(pos.x + w, 150.0);
    }

    #[test]
    fn wrap_degrees_shortest_arc() {
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(0.0), 0.0);
    }
}
