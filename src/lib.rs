//! # Tanzaku
//!
//! Styled text layout and rasterization for 2D scene graphs.
//!
//! ## Overview
//!
//! `tanzaku` turns a style descriptor plus a string into a rasterized
//! surface and a synced host texture: shorthand font parsing, cached
//! font-metric probing, greedy word wrapping, tab stops, per-character
//! style runs, and shadow/stroke/fill composition. The raster target is a
//! trait seam ([`Surface`]); the bundled [`CpuSurface`] renders with
//! `fontdb` + `fontdue`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tanzaku::{CpuSurface, TextSprite};
//! use tanzaku::style::Color;
//!
//! // 1. Pick a raster backend
//! let surface = CpuSurface::with_system_fonts();
//!
//! // 2. Build a sprite and mutate it
//! let mut sprite = TextSprite::new(Box::new(surface));
//! sprite.set_text("Photon Storm");
//! sprite.set_font("bold 28px sans-serif");
//! sprite.add_color(Color::rgb(1.0, 1.0, 0.0), 7);
//!
//! // 3. Render lazily; getters flush pending layout
//! let width = sprite.width();
//! let pixels = sprite.surface().pixels();
//! ```
//!
//! ## Features
//!
//! *   **Lazy invalidation**: every mutation sets a dirty bit; layout and
//!     compositing run once per flush on the calling thread.
//! *   **Metric memoization**: ascent/descent probes are cached
//!     process-wide per exact font string.
//! *   **Pluggable backend**: hosts with their own 2D context implement
//!     [`Surface`] instead of using the CPU rasterizer.

pub mod font_desc;
pub mod font_metrics;
pub mod style;
pub mod surface;
pub mod text;
pub mod text_sprite;
pub mod texture;

// common re-exports
pub use font_desc::FontDescriptor;
pub use font_metrics::{FontMetrics, MetricsCache};
pub use style::TextStyle;
pub use surface::{CpuSurface, FontStore, Surface};
pub use text_sprite::TextSprite;
pub use texture::Texture;

// re-export dependencies
pub use euclid;
pub use fontdb;
pub use fontdue;
pub use parking_lot;
