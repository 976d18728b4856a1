//! Geometry & Bounds Resolution
//!
//! Pure lookups and mappings shared by the canvas and the mockup renderer.
//! Nothing here holds state: both renderers call the same functions and can
//! never disagree.

use serde::{Deserialize, Serialize};

use crate::model::{DesignLayer, MockupView, Position, PrintSide, ProductKind, ProductSize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// A layer position mapped into mockup-overlay space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayPlacement {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

/// Printable rectangle in editor pixels for a (product, size, side) triple.
///
/// Fixed lookup: five garment sizes by two sides; bags print one fixed panel
/// on either side.
pub fn print_area_bounds(kind: ProductKind, size: ProductSize, side: PrintSide) -> Rect {
    match kind {
        ProductKind::Bag => Rect::new(180.0, 200.0, 240.0, 260.0),
        ProductKind::Garment => {
            let front = match size {
                ProductSize::Xs => Rect::new(170.0, 140.0, 260.0, 360.0),
                ProductSize::S => Rect::new(160.0, 135.0, 280.0, 380.0),
                ProductSize::M => Rect::new(150.0, 130.0, 300.0, 400.0),
                ProductSize::L => Rect::new(140.0, 125.0, 320.0, 420.0),
                ProductSize::Xl => Rect::new(130.0, 120.0, 340.0, 440.0),
            };
            match side {
                PrintSide::Front => front,
                // Back panels start higher (no collar cutout) and run longer.
                PrintSide::Back => Rect::new(front.x, front.y - 20.0, front.width, front.height + 30.0),
            }
        }
    }
}

/// Overlay rectangle on a product photo, as absolute pixels of the photo.
///
/// Percentage-anchored (35-39% of the photo dimensions), centered, with
/// view-specific offsets for the folded and hanging perspectives.
pub fn overlay_bounds(photo_w: f64, photo_h: f64, view: MockupView) -> Rect {
    let (fw, fh, dx, dy) = match view {
        MockupView::Front => (0.38, 0.38, 0.0, 0.02),
        MockupView::Back => (0.38, 0.38, 0.0, 0.02),
        MockupView::Folded => (0.35, 0.35, 0.03, -0.04),
        MockupView::Hanging => (0.36, 0.36, -0.01, 0.06),
    };
    let width = photo_w * fw;
    let height = photo_h * fh;
    Rect::new(
        (photo_w - width) / 2.0 + photo_w * dx,
        (photo_h - height) / 2.0 + photo_h * dy,
        width,
        height,
    )
}

/// Maps an editor-space position into overlay space.
///
/// The scale is uniform (min of the two axis ratios) so aspect ratio is
/// preserved; the position is taken relative to the print-area origin,
/// scaled, then offset into the overlay origin.
pub fn to_overlay_space(position: Position, print_area: &Rect, overlay: &Rect) -> OverlayPlacement {
    let scale = (overlay.width / print_area.width).min(overlay.height / print_area.height);
    OverlayPlacement {
        x: overlay.x + (position.x - print_area.x) * scale,
        y: overlay.y + (position.y - print_area.y) * scale,
        scale,
    }
}

/// Whether any part of the layer's box falls outside the print area.
///
/// Feedback only: callers render a clipping warning. Nothing repositions the
/// layer.
pub fn is_outside_print_area(layer: &DesignLayer, bounds: &Rect) -> bool {
    let (x1, y1, x2, y2) = layer.bounding_box();
    x1 < bounds.x || y1 < bounds.y || x2 > bounds.right() || y2 > bounds.bottom()
}
