//! Pricing Calculator
//!
//! Derives a monetary amount (integer minor units) purely from session mode
//! and decal geometry. The order service recomputes the same formula from the
//! submitted width/height; for a given size the two results must be equal
//! bit-for-bit, so every px->cm conversion goes through this module.

use crate::model::{DesignLayer, DesignSession, LayerKind, ProductKind, ProductMode};

/// Canonical editor-pixels-per-centimeter ratio. Single authority: nothing
/// else may convert px to cm.
pub const PX_PER_CM: f64 = 10.0;

/// Billable decal size window in centimeters.
pub const MIN_DECAL_CM: f64 = 5.0;
pub const MAX_DECAL_CM: f64 = 28.0;

/// Combo mode fallbacks when the catalog did not supply a price.
pub const COMBO_PRICE_GARMENT: i64 = 139_000;
pub const COMBO_PRICE_BAG: i64 = 99_000;

/// Price of one decal of the given size: `(sizeCm + 5) * 1000`.
pub fn decal_price(size_cm: f64) -> i64 {
    ((size_cm + 5.0) * 1000.0).round() as i64
}

/// Billable size of a non-frame layer, estimated from its pixel box and
/// clamped to the billable window.
pub fn estimated_size_cm(layer: &DesignLayer) -> f64 {
    (layer.style.width.max(layer.style.height) / PX_PER_CM).clamp(MIN_DECAL_CM, MAX_DECAL_CM)
}

/// Billable size of a decal frame: the larger declared dimension, falling
/// back to the pixel estimate when the frame carries no declared size.
fn frame_size_cm(frame: &DesignLayer) -> f64 {
    match &frame.decal_size {
        Some(size) => size.width_cm.max(size.height_cm),
        None => estimated_size_cm(frame),
    }
}

/// Price for the whole session.
///
/// Combo mode is one fixed price regardless of layer count or size. In
/// decal-only mode, declared frames are the unit of billing when any exist;
/// otherwise every visible non-frame layer is billed at its estimated size.
pub fn price_session(session: &DesignSession) -> i64 {
    match session.product_mode {
        ProductMode::Combo => session.combo_price.unwrap_or(match session.product_kind {
            ProductKind::Garment => COMBO_PRICE_GARMENT,
            ProductKind::Bag => COMBO_PRICE_BAG,
        }),
        ProductMode::DecalOnly => {
            let frames: Vec<&DesignLayer> = session
                .layers
                .iter()
                .filter(|l| l.kind == LayerKind::DecalFrame)
                .collect();
            if !frames.is_empty() {
                frames.iter().map(|f| decal_price(frame_size_cm(f))).sum()
            } else {
                session
                    .layers
                    .iter()
                    .filter(|l| l.visible && l.kind != LayerKind::DecalFrame)
                    .map(|l| decal_price(estimated_size_cm(l)))
                    .sum()
            }
        }
    }
}
