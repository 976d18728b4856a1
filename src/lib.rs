//! Decal Studio Core - Design Layer Engine
//!
//! # Core Guarantees
//! 1. Geometry Is Pure - canvas and mockup never disagree
//! 2. Pricing Matches The Server Bit-For-Bit
//! 3. Content Classification Never Throws
//! 4. Promotion Is Best-Effort Per Layer
//! 5. Persistence Failures Never Lose The Session

pub mod content;
pub mod geometry;
pub mod interaction;
pub mod model;
pub mod persistence;
pub mod pricing;
pub mod promotion;

pub use content::LayerContent;
pub use geometry::{overlay_bounds, print_area_bounds, to_overlay_space, OverlayPlacement, Rect};
pub use interaction::{GestureController, Hit, ResizeHandle};
pub use model::{
    DecalConstraints, DecalSize, DesignLayer, DesignSession, LayerKind, LayerStyle, MockupView,
    Position, PrintSide, ProductKind, ProductMode, ProductSize, Transform,
};
pub use persistence::{
    deserialize_session, serialize_session, PersistedSession, SessionAutosave, SessionStore,
    StoreError,
};
pub use pricing::{decal_price, estimated_size_cm, price_session};
pub use promotion::{sweep_stale, PromotionPipeline, PromotionReport, SweepReport};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
