use std::collections::HashMap;
use std::sync::Arc;

use euclid::default::Rect;

use crate::font_desc::FontDescriptor;
use crate::style::Color;
use crate::surface::{FontStore, ShadowParams, Surface};

/// Glyph raster cache keys quantize the pixel size to avoid unbounded
/// growth from tiny floating point differences.
const SIZE_QUANTIZE: f32 = 256.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct GlyphKey {
    font_id: fontdb::ID,
    glyph: u16,
    size: u32,
}

impl GlyphKey {
    fn new(font_id: fontdb::ID, glyph: u16, size: f32) -> Self {
        Self {
            font_id,
            glyph,
            size: (size * SIZE_QUANTIZE).round() as u32,
        }
    }
}

struct CachedGlyph {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

#[derive(Clone)]
struct ActiveFont {
    id: fontdb::ID,
    font: Arc<fontdue::Font>,
    /// Logical pixel size from the font descriptor.
    size: f32,
}

/// CPU raster backend over `fontdb` + `fontdue`.
///
/// Pixels are straight-alpha RGBA. Stroking is approximated by blitting
/// the glyph coverage mask at ring offsets around the pen position, which
/// produces a dilated silhouette; shadows are an offset, optionally
/// blurred pre-pass in the shadow color.
pub struct CpuSurface {
    store: FontStore,
    buffer: Vec<u8>,
    width: u32,
    height: u32,
    scale: f32,
    font: Option<ActiveFont>,
    font_string: String,
    shadow: Option<ShadowParams>,
    glyphs: HashMap<GlyphKey, CachedGlyph, fxhash::FxBuildHasher>,
}

impl CpuSurface {
    /// Creates a zero-sized surface over the given store.
    pub fn new(store: FontStore) -> Self {
        Self {
            store,
            buffer: Vec::new(),
            width: 0,
            height: 0,
            scale: 1.0,
            font: None,
            font_string: String::new(),
            shadow: None,
            glyphs: HashMap::with_hasher(fxhash::FxBuildHasher::default()),
        }
    }

    /// Creates a surface with the system fonts loaded.
    pub fn with_system_fonts() -> Self {
        let mut store = FontStore::new();
        store.load_system_fonts();
        Self::new(store)
    }

    pub fn store(&self) -> &FontStore {
        &self.store
    }

    /// Mutable store access. Invalidates the resolved font so newly loaded
    /// faces take part in the next query.
    pub fn store_mut(&mut self) -> &mut FontStore {
        self.font = None;
        self.font_string.clear();
        &mut self.store
    }

    fn ensure_glyph(&mut self, active: &ActiveFont, glyph: u16, size: f32) -> GlyphKey {
        let key = GlyphKey::new(active.id, glyph, size);
        if !self.glyphs.contains_key(&key) {
            let (metrics, data) = active.font.rasterize_indexed(glyph, size);
            self.glyphs.insert(
                key,
                CachedGlyph {
                    width: metrics.width,
                    height: metrics.height,
                    data,
                },
            );
        }
        key
    }

    /// Draws one run of glyphs at physical coordinates derived from the
    /// logical baseline position.
    fn draw_run(&mut self, text: &str, x: f32, y: f32, color: Color, thickness: f32, blur: f32) {
        let Some(active) = self.font.clone() else {
            return;
        };
        let size = active.size * self.scale;
        if size <= 0.0 {
            return;
        }

        let blur_radius = (blur * self.scale).round().max(0.0) as usize;
        let mut pen = x * self.scale;
        let baseline = y * self.scale;
        let mut prev: Option<u16> = None;

        for ch in text.chars() {
            let glyph = active.font.lookup_glyph_index(ch);
            if let Some(prev_glyph) = prev {
                pen += active
                    .font
                    .horizontal_kern_indexed(prev_glyph, glyph, size)
                    .unwrap_or(0.0);
            }

            let metrics = active.font.metrics_indexed(glyph, size);
            let key = self.ensure_glyph(&active, glyph, size);
            let gx = pen + metrics.xmin as f32;
            let gy = baseline - (metrics.ymin as f32 + metrics.height as f32);

            if thickness > 0.0 {
                let radius = thickness * self.scale / 2.0;
                for (dx, dy) in ring_offsets(radius) {
                    self.blit_glyph(key, gx + dx, gy + dy, color, blur_radius);
                }
            }
            self.blit_glyph(key, gx, gy, color, blur_radius);

            pen += metrics.advance_width;
            prev = Some(glyph);
        }
    }

    fn blit_glyph(&mut self, key: GlyphKey, x: f32, y: f32, color: Color, blur_radius: usize) {
        let Self { glyphs, buffer, width, height, .. } = self;
        let Some(glyph) = glyphs.get(&key) else {
            return;
        };
        if glyph.width == 0 || glyph.height == 0 {
            return;
        }

        if blur_radius > 0 {
            let (mask, mask_w, mask_h) =
                blurred_mask(&glyph.data, glyph.width, glyph.height, blur_radius);
            blit_mask(
                buffer,
                *width as usize,
                *height as usize,
                &mask,
                mask_w,
                mask_h,
                x - blur_radius as f32,
                y - blur_radius as f32,
                color,
            );
        } else {
            blit_mask(
                buffer,
                *width as usize,
                *height as usize,
                &glyph.data,
                glyph.width,
                glyph.height,
                x,
                y,
                color,
            );
        }
    }
}

impl Surface for CpuSurface {
    fn reset(&mut self, width_px: u32, height_px: u32, scale: f32) {
        self.width = width_px;
        self.height = height_px;
        self.scale = if scale > 0.0 { scale } else { 1.0 };
        self.buffer = vec![0; width_px as usize * height_px as usize * 4];
    }

    fn physical_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_font(&mut self, font: &str) {
        if font == self.font_string && self.font.is_some() {
            return;
        }

        let desc = FontDescriptor::parse(font);
        let size = desc.size_px();
        self.font = self
            .store
            .query_descriptor(&desc)
            .map(|(id, loaded)| ActiveFont { id, font: loaded, size });
        if self.font.is_none() {
            log::warn!("no font face available for {font:?}");
        }
        self.font_string = font.to_string();
    }

    fn measure_text(&mut self, text: &str) -> f32 {
        let Some(active) = &self.font else {
            return 0.0;
        };

        let mut advance = 0.0;
        let mut prev: Option<u16> = None;
        for ch in text.chars() {
            let glyph = active.font.lookup_glyph_index(ch);
            if let Some(prev_glyph) = prev {
                advance += active
                    .font
                    .horizontal_kern_indexed(prev_glyph, glyph, active.size)
                    .unwrap_or(0.0);
            }
            advance += active.font.metrics_indexed(glyph, active.size).advance_width;
            prev = Some(glyph);
        }
        advance
    }

    fn fill_rect(&mut self, rect: Rect<f32>, color: Color) {
        let x0 = ((rect.origin.x * self.scale).floor().max(0.0)) as usize;
        let y0 = ((rect.origin.y * self.scale).floor().max(0.0)) as usize;
        let x1 = (((rect.max_x()) * self.scale).ceil().max(0.0) as usize).min(self.width as usize);
        let y1 = (((rect.max_y()) * self.scale).ceil().max(0.0) as usize).min(self.height as usize);

        for y in y0..y1 {
            for x in x0..x1 {
                blend_pixel(&mut self.buffer, (y * self.width as usize + x) * 4, color, 1.0);
            }
        }
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Color) {
        if let Some(shadow) = self.shadow.clone() {
            self.draw_run(
                text,
                x + shadow.offset_x,
                y + shadow.offset_y,
                shadow.color,
                0.0,
                shadow.blur,
            );
        }
        self.draw_run(text, x, y, color, 0.0, 0.0);
    }

    fn stroke_text(&mut self, text: &str, x: f32, y: f32, color: Color, thickness: f32) {
        if let Some(shadow) = self.shadow.clone() {
            self.draw_run(
                text,
                x + shadow.offset_x,
                y + shadow.offset_y,
                shadow.color,
                thickness,
                shadow.blur,
            );
        }
        self.draw_run(text, x, y, color, thickness, 0.0);
    }

    fn set_shadow(&mut self, shadow: Option<&ShadowParams>) {
        self.shadow = shadow.cloned();
    }

    fn pixels(&self) -> Option<&[u8]> {
        Some(&self.buffer)
    }
}

fn ring_offsets(radius: f32) -> [(f32, f32); 8] {
    const DIAG: f32 = std::f32::consts::FRAC_1_SQRT_2;
    let d = radius * DIAG;
    [
        (radius, 0.0),
        (-radius, 0.0),
        (0.0, radius),
        (0.0, -radius),
        (d, d),
        (d, -d),
        (-d, d),
        (-d, -d),
    ]
}

/// Blits a coverage mask with src-over blending, clipping to the buffer.
fn blit_mask(
    buffer: &mut [u8],
    buf_width: usize,
    buf_height: usize,
    mask: &[u8],
    mask_width: usize,
    mask_height: usize,
    x: f32,
    y: f32,
    color: Color,
) {
    let origin_x = x.floor() as isize;
    let origin_y = y.floor() as isize;

    for row in 0..mask_height {
        let ty = origin_y + row as isize;
        if ty < 0 || ty as usize >= buf_height {
            continue;
        }
        for col in 0..mask_width {
            let coverage = mask[row * mask_width + col];
            if coverage == 0 {
                continue;
            }
            let tx = origin_x + col as isize;
            if tx < 0 || tx as usize >= buf_width {
                continue;
            }
            let idx = (ty as usize * buf_width + tx as usize) * 4;
            blend_pixel(buffer, idx, color, coverage as f32 / 255.0);
        }
    }
}

/// Straight-alpha src-over blend of `color` at `coverage` onto the pixel
/// starting at `idx`.
fn blend_pixel(buffer: &mut [u8], idx: usize, color: Color, coverage: f32) {
    let a = (color.a * coverage).clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }

    let bg_r = buffer[idx] as f32 / 255.0;
    let bg_g = buffer[idx + 1] as f32 / 255.0;
    let bg_b = buffer[idx + 2] as f32 / 255.0;
    let bg_a = buffer[idx + 3] as f32 / 255.0;

    let out_a = a + bg_a * (1.0 - a);
    if out_a <= 0.0 {
        return;
    }
    let out_r = (color.r * a + bg_r * bg_a * (1.0 - a)) / out_a;
    let out_g = (color.g * a + bg_g * bg_a * (1.0 - a)) / out_a;
    let out_b = (color.b * a + bg_b * bg_a * (1.0 - a)) / out_a;

    buffer[idx] = (out_r * 255.0) as u8;
    buffer[idx + 1] = (out_g * 255.0) as u8;
    buffer[idx + 2] = (out_b * 255.0) as u8;
    buffer[idx + 3] = (out_a * 255.0) as u8;
}

/// Expands the mask by `radius` on every side and applies a separable box
/// blur (a cheap approximation of the gaussian a 2D canvas applies to
/// shadows).
fn blurred_mask(mask: &[u8], width: usize, height: usize, radius: usize) -> (Vec<u8>, usize, usize) {
    let out_w = width + radius * 2;
    let out_h = height + radius * 2;

    let mut padded = vec![0f32; out_w * out_h];
    for row in 0..height {
        for col in 0..width {
            padded[(row + radius) * out_w + col + radius] = mask[row * width + col] as f32;
        }
    }

    let window = (radius * 2 + 1) as f32;
    let mut tmp = vec![0f32; out_w * out_h];

    // horizontal pass
    for row in 0..out_h {
        let mut sum = 0.0;
        for col in 0..out_w.min(radius + 1) {
            sum += padded[row * out_w + col];
        }
        for col in 0..out_w {
            tmp[row * out_w + col] = sum / window;
            if col + radius + 1 < out_w {
                sum += padded[row * out_w + col + radius + 1];
            }
            if col >= radius {
                sum -= padded[row * out_w + col - radius];
            }
        }
    }

    // vertical pass
    let mut out = vec![0f32; out_w * out_h];
    for col in 0..out_w {
        let mut sum = 0.0;
        for row in 0..out_h.min(radius + 1) {
            sum += tmp[row * out_w + col];
        }
        for row in 0..out_h {
            out[row * out_w + col] = sum / window;
            if row + radius + 1 < out_h {
                sum += tmp[(row + radius + 1) * out_w + col];
            }
            if row >= radius {
                sum -= tmp[(row - radius) * out_w + col];
            }
        }
    }

    let bytes = out.iter().map(|v| v.round().clamp(0.0, 255.0) as u8).collect();
    (bytes, out_w, out_h)
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use euclid::default::{Point2D, Size2D};

    fn red() -> Color {
        Color::rgb(1.0, 0.0, 0.0)
    }

    #[test]
    fn reset_allocates_physical_pixels() {
        let mut surface = CpuSurface::new(FontStore::new());
        surface.reset(4, 3, 2.0);
        assert_eq!(surface.physical_size(), (4, 3));
        assert_eq!(surface.pixels().unwrap().len(), 4 * 3 * 4);
    }

    #[test]
    fn fill_rect_writes_scaled_pixels() {
        let mut surface = CpuSurface::new(FontStore::new());
        surface.reset(4, 4, 2.0);
        // logical 1x1 rect covers a 2x2 physical block at scale 2
        surface.fill_rect(
            Rect::new(Point2D::new(0.0, 0.0), Size2D::new(1.0, 1.0)),
            red(),
        );

        let px = surface.pixels().unwrap();
        assert_eq!(&px[0..4], &[255, 0, 0, 255]);
        assert_eq!(&px[(1 * 4 + 1) * 4..(1 * 4 + 1) * 4 + 4], &[255, 0, 0, 255]);
        // outside the block stays transparent
        assert_eq!(&px[(2 * 4 + 2) * 4..(2 * 4 + 2) * 4 + 4], &[0, 0, 0, 0]);
    }

    #[test]
    fn blending_is_src_over() {
        let mut surface = CpuSurface::new(FontStore::new());
        surface.reset(1, 1, 1.0);
        let full = Rect::new(Point2D::new(0.0, 0.0), Size2D::new(1.0, 1.0));
        surface.fill_rect(full, red());
        surface.fill_rect(full, Color::rgba(0.0, 0.0, 0.0, 0.5));

        let px = surface.pixels().unwrap();
        // half-alpha black over opaque red leaves half the red
        assert!(px[0] >= 126 && px[0] <= 128, "red channel {}", px[0]);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn drawing_without_a_font_is_a_noop() {
        let mut surface = CpuSurface::new(FontStore::new());
        surface.reset(4, 4, 1.0);
        surface.set_font("16px NoSuchFamily");
        assert_eq!(surface.measure_text("abc"), 0.0);
        surface.fill_text("abc", 0.0, 3.0, red());
        assert!(surface.pixels().unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn blurred_mask_pads_by_radius() {
        let mask = vec![255u8];
        let (blurred, w, h) = blurred_mask(&mask, 1, 1, 2);
        assert_eq!((w, h), (5, 5));
        // energy spreads outward, center keeps the largest share
        let center = blurred[2 * 5 + 2];
        assert!(center > 0 && center < 255);
        assert!(blurred[0] <= center);
    }

    #[test]
    fn glyph_keys_quantize_size() {
        let id = unsafe { std::mem::transmute::<u64, fontdb::ID>(1u64) };
        assert_eq!(GlyphKey::new(id, 5, 12.0), GlyphKey::new(id, 5, 12.0009));
        assert_ne!(GlyphKey::new(id, 5, 12.0), GlyphKey::new(id, 5, 12.5));
    }
}
