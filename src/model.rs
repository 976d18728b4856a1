//! Layer Model - Canonical Session Structures
//!
//! The serialized shape of `DesignSession` / `DesignLayer` is persisted
//! verbatim and re-parsed by order/admin previews; field names are a wire
//! contract.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::LayerContent;

/// Minimum layer box dimension after any resize, in editor pixels.
pub const MIN_LAYER_SIZE_PX: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductSize {
    Xs,
    S,
    M,
    L,
    Xl,
}

impl ProductSize {
    pub const ALL: [ProductSize; 5] = [
        ProductSize::Xs,
        ProductSize::S,
        ProductSize::M,
        ProductSize::L,
        ProductSize::Xl,
    ];
}

/// One of the two printable surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintSide {
    Front,
    Back,
}

/// Rendering view for mockup previews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MockupView {
    Front,
    Back,
    Folded,
    Hanging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Garment,
    Bag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductMode {
    Combo,
    DecalOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerKind {
    Text,
    Image,
    Sticker,
    Shape,
    DecalFrame,
}

impl LayerKind {
    /// Layers whose content points at an uploaded binary.
    pub fn carries_binary(self) -> bool {
        matches!(self, LayerKind::Image | LayerKind::Sticker)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

/// Kind-dependent presentation. Width/height are always present (editor px);
/// the optional fields apply to text and shape layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerStyle {
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl LayerStyle {
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            font_family: None,
            font_size: None,
            color: None,
            background: None,
        }
    }
}

/// Physical size a decal frame declares, in centimeters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecalSize {
    pub width_cm: f64,
    pub height_cm: f64,
    pub label: String,
}

/// Derived back-reference to an enclosing frame's pixel box. Never
/// authoritative: recomputed whenever the frame moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecalConstraints {
    pub max_width_px: f64,
    pub max_height_px: f64,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignLayer {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    pub position: Position,
    #[serde(default)]
    pub transform: Transform,
    pub style: LayerStyle,
    pub content: LayerContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decal_size: Option<DecalSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decal_constraints: Option<DecalConstraints>,
    pub print_area: PrintSide,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
}

impl DesignLayer {
    pub fn new(kind: LayerKind, content: LayerContent, print_area: PrintSide) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            position: Position::default(),
            transform: Transform::default(),
            style: LayerStyle::sized(100.0, 100.0),
            content,
            decal_size: None,
            decal_constraints: None,
            print_area,
            visible: true,
            locked: false,
        }
    }

    pub fn text(text: impl Into<String>, print_area: PrintSide) -> Self {
        let mut layer = Self::new(
            LayerKind::Text,
            LayerContent::Unrenderable(serde_json::Value::String(text.into())),
            print_area,
        );
        layer.style = LayerStyle {
            width: 100.0,
            height: 40.0,
            font_family: Some("Inter".to_string()),
            font_size: Some(32.0),
            color: Some("#000000".to_string()),
            background: None,
        };
        layer
    }

    pub fn image(content: LayerContent, print_area: PrintSide) -> Self {
        Self::new(LayerKind::Image, content, print_area)
    }

    pub fn decal_frame(size: DecalSize, print_area: PrintSide) -> Self {
        let mut layer = Self::new(
            LayerKind::DecalFrame,
            LayerContent::Unrenderable(serde_json::Value::Null),
            print_area,
        );
        layer.decal_size = Some(size);
        layer
    }

    /// Axis-aligned box in editor space, ignoring rotation.
    pub fn bounding_box(&self) -> (f64, f64, f64, f64) {
        (
            self.position.x,
            self.position.y,
            self.position.x + self.style.width,
            self.position.y + self.style.height,
        )
    }

    pub fn center(&self) -> Position {
        Position::new(
            self.position.x + self.style.width / 2.0,
            self.position.y + self.style.height / 2.0,
        )
    }
}

/// The editing session. Owns its layer sequence; order is z-order
/// (later layers render on top).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSession {
    pub selected_size: ProductSize,
    pub selected_colorway: String,
    pub current_print_area: PrintSide,
    pub product_kind: ProductKind,
    pub product_mode: ProductMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combo_price: Option<i64>,
    #[serde(default)]
    pub layers: Vec<DesignLayer>,
}

impl DesignSession {
    pub fn new(kind: ProductKind, mode: ProductMode, size: ProductSize, colorway: &str) -> Self {
        Self {
            selected_size: size,
            selected_colorway: colorway.to_string(),
            current_print_area: PrintSide::Front,
            product_kind: kind,
            product_mode: mode,
            combo_price: None,
            layers: Vec::new(),
        }
    }

    /// Appends a layer (top of the z-order) and returns its id.
    pub fn add_layer(&mut self, layer: DesignLayer) -> String {
        let id = layer.id.clone();
        self.layers.push(layer);
        id
    }

    /// Removes a layer by id. Returns whether anything was removed.
    pub fn remove_layer(&mut self, id: &str) -> bool {
        let before = self.layers.len();
        self.layers.retain(|l| l.id != id);
        self.layers.len() != before
    }

    pub fn layer(&self, id: &str) -> Option<&DesignLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_mut(&mut self, id: &str) -> Option<&mut DesignLayer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn layers_for_side(&self, side: PrintSide) -> impl Iterator<Item = &DesignLayer> {
        self.layers.iter().filter(move |l| l.print_area == side)
    }

    /// Re-derives every non-frame layer's `decalConstraints` from the topmost
    /// frame on its side that contains the layer's origin. Frame geometry is
    /// the only authority; stale constraints are dropped.
    pub fn recompute_decal_constraints(&mut self) {
        let frames: Vec<(PrintSide, f64, f64, f64, f64, f64, f64)> = self
            .layers
            .iter()
            .filter(|l| l.kind == LayerKind::DecalFrame)
            .map(|f| {
                let (x1, y1, x2, y2) = f.bounding_box();
                (f.print_area, x1, y1, x2, y2, f.style.width, f.style.height)
            })
            .collect();

        for layer in &mut self.layers {
            if layer.kind == LayerKind::DecalFrame {
                continue;
            }
            // Topmost enclosing frame wins (frames collected in z-order).
            layer.decal_constraints = frames
                .iter()
                .rev()
                .find(|(side, x1, y1, x2, y2, _, _)| {
                    *side == layer.print_area
                        && layer.position.x >= *x1
                        && layer.position.x <= *x2
                        && layer.position.y >= *y1
                        && layer.position.y <= *y2
                })
                .map(|(_, _, _, _, _, w, h)| DecalConstraints {
                    max_width_px: *w,
                    max_height_px: *h,
                });
        }
    }
}
