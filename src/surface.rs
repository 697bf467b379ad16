/// The bundled CPU raster backend.
pub mod cpu;
/// Font database + lazily loaded rasterizer faces.
pub mod font_store;

pub use cpu::CpuSurface;
pub use font_store::FontStore;

use euclid::default::Rect;

use crate::style::Color;

/// Resolved shadow parameters applied to subsequent draw calls.
#[derive(Clone, Debug, PartialEq)]
pub struct ShadowParams {
    pub offset_x: f32,
    pub offset_y: f32,
    pub blur: f32,
    pub color: Color,
}

/// A resizable 2D raster target consumed by the layout and compositing
/// passes.
///
/// Coordinates are logical pixels; `reset` establishes the physical pixel
/// size together with the logical-to-physical scale factor. Text is drawn
/// on the alphabetic baseline: `y` is the baseline position, not the glyph
/// top.
///
/// Implementations keep the drawing state (current font, shadow
/// parameters) across `reset`; only the pixel store is reallocated.
pub trait Surface {
    /// Resizes the backing store to `width_px` x `height_px` physical
    /// pixels, clearing it, and sets the scale applied to subsequent
    /// logical coordinates.
    fn reset(&mut self, width_px: u32, height_px: u32, scale: f32);

    /// Current physical pixel dimensions.
    fn physical_size(&self) -> (u32, u32);

    /// Selects the active font from a shorthand font string.
    fn set_font(&mut self, font: &str);

    /// Advance width of `text` in logical pixels under the active font.
    fn measure_text(&mut self, text: &str) -> f32;

    /// Fills a logical-coordinate rectangle.
    fn fill_rect(&mut self, rect: Rect<f32>, color: Color);

    /// Fills `text` with `color`, baseline at `(x, y)`.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Color);

    /// Strokes `text` with `color` at the given thickness, baseline at
    /// `(x, y)`.
    fn stroke_text(&mut self, text: &str, x: f32, y: f32, color: Color, thickness: f32);

    /// Sets or clears the shadow applied by following draw calls.
    fn set_shadow(&mut self, shadow: Option<&ShadowParams>);

    /// Raw RGBA pixel readback (physical-size rows), or `None` when the
    /// backend cannot expose its pixels.
    fn pixels(&self) -> Option<&[u8]>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! A recording surface with a fixed per-character advance, shared by
    //! the layout, compositing, and metrics tests.

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    pub enum DrawOp {
        Reset { width: u32, height: u32, scale: f32 },
        SetFont(String),
        FillRect { color: Color },
        FillText { text: String, x: f32, y: f32, color: Color },
        StrokeText { text: String, x: f32, y: f32, color: Color, thickness: f32 },
        Shadow(bool),
    }

    pub struct MockSurface {
        pub char_width: f32,
        pub ops: Vec<DrawOp>,
        pub font: String,
        width: u32,
        height: u32,
    }

    impl MockSurface {
        pub fn new() -> Self {
            Self {
                char_width: 10.0,
                ops: Vec::new(),
                font: String::new(),
                width: 0,
                height: 0,
            }
        }

        pub fn fill_texts(&self) -> Vec<&DrawOp> {
            self.ops
                .iter()
                .filter(|op| matches!(op, DrawOp::FillText { .. }))
                .collect()
        }
    }

    impl Surface for MockSurface {
        fn reset(&mut self, width_px: u32, height_px: u32, scale: f32) {
            self.width = width_px;
            self.height = height_px;
            self.ops.push(DrawOp::Reset { width: width_px, height: height_px, scale });
        }

        fn physical_size(&self) -> (u32, u32) {
            (self.width, self.height)
        }

        fn set_font(&mut self, font: &str) {
            self.font = font.to_string();
            self.ops.push(DrawOp::SetFont(font.to_string()));
        }

        fn measure_text(&mut self, text: &str) -> f32 {
            text.chars().count() as f32 * self.char_width
        }

        fn fill_rect(&mut self, _rect: Rect<f32>, color: Color) {
            self.ops.push(DrawOp::FillRect { color });
        }

        fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Color) {
            self.ops.push(DrawOp::FillText { text: text.to_string(), x, y, color });
        }

        fn stroke_text(&mut self, text: &str, x: f32, y: f32, color: Color, thickness: f32) {
            self.ops.push(DrawOp::StrokeText {
                text: text.to_string(),
                x,
                y,
                color,
                thickness,
            });
        }

        fn set_shadow(&mut self, shadow: Option<&ShadowParams>) {
            self.ops.push(DrawOp::Shadow(shadow.is_some()));
        }

        fn pixels(&self) -> Option<&[u8]> {
            None
        }
    }
}
