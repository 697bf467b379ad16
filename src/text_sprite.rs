use std::sync::Arc;

use euclid::default::{Point2D, Rect, Size2D};

use crate::font_desc::{FontStyle, FontWeight};
use crate::font_metrics::MetricsCache;
use crate::style::{Color, HorizontalAlign, ShadowStyle, StyleRuns, Tabs, TextStyle, VerticalAlign};
use crate::surface::Surface;
use crate::text::{advanced_wrap, basic_wrap, compose, compute_layout};
use crate::texture::{self, Texture};

/// A text object that renders its content into an exclusively owned
/// raster surface and keeps a host texture in sync with the result.
///
/// Every mutation marks the sprite dirty; the layout + composite pass
/// runs lazily on [`TextSprite::update_text`] or any getter that needs
/// current output, and clears the flag. All work happens inline on the
/// calling thread.
pub struct TextSprite {
    style: TextStyle,
    content: String,
    runs: StyleRuns,
    text_bounds: Option<Rect<f32>>,
    padding: Size2D<f32>,
    line_spacing: f32,
    resolution: f32,
    auto_round: bool,
    pivot: Point2D<f32>,
    dirty: bool,
    surface: Box<dyn Surface>,
    texture: Texture,
    metrics: Arc<MetricsCache>,
    transform_hook: Option<Box<dyn FnMut(f32, f32)>>,
}

impl TextSprite {
    /// Creates an empty sprite with the default style over the given
    /// surface.
    pub fn new(surface: Box<dyn Surface>) -> Self {
        Self::with_style(surface, TextStyle::default())
    }

    pub fn with_style(surface: Box<dyn Surface>, style: TextStyle) -> Self {
        Self {
            style: normalize_style(style),
            content: String::new(),
            runs: StyleRuns::default(),
            text_bounds: None,
            padding: Size2D::zero(),
            line_spacing: 0.0,
            resolution: 1.0,
            auto_round: false,
            pivot: Point2D::origin(),
            dirty: true,
            surface,
            texture: Texture::new(),
            metrics: MetricsCache::global(),
            transform_hook: None,
        }
    }

    /// Substitutes the metrics cache (tests use a fresh instance instead
    /// of the process-wide one).
    pub fn set_metrics_cache(&mut self, cache: Arc<MetricsCache>) {
        self.metrics = cache;
    }

    /// Registers a hook invoked with the logical size after every
    /// completed render pass, so a host scene graph can recompute parent
    /// bounds.
    pub fn set_transform_hook(&mut self, hook: impl FnMut(f32, f32) + 'static) {
        self.transform_hook = Some(Box::new(hook));
    }
}

/// Content.
impl TextSprite {
    pub fn text(&self) -> &str {
        &self.content
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.content = text.into();
        self.dirty = true;
    }

    /// Sets the content from rows of cells, joined with tabs inside a row
    /// and newlines between rows.
    pub fn set_text_from_rows<S: AsRef<str>>(&mut self, rows: &[&[S]]) {
        let text = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.as_ref())
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n");
        self.set_text(text);
    }
}

/// Style.
impl TextSprite {
    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: TextStyle) {
        self.style = normalize_style(style);
        self.dirty = true;
    }

    /// Replaces the font from a shorthand string (lenient parse).
    pub fn set_font(&mut self, font: &str) {
        self.style.font = crate::font_desc::FontDescriptor::parse(font);
        self.dirty = true;
    }

    /// Sets a numeric font size, normalized to `px`.
    pub fn set_font_size(&mut self, px: f32) {
        self.style.font.set_size_px(px);
        self.dirty = true;
    }

    pub fn set_fill(&mut self, fill: Option<Color>) {
        self.style.fill = fill;
        self.dirty = true;
    }

    pub fn set_stroke(&mut self, color: Color, thickness: f32) {
        self.style.stroke = color;
        self.style.stroke_thickness = thickness.max(0.0);
        self.dirty = true;
    }

    pub fn set_background_color(&mut self, color: Option<Color>) {
        self.style.background_color = color;
        self.dirty = true;
    }

    pub fn set_align(&mut self, align: HorizontalAlign) {
        self.style.align = align;
        self.dirty = true;
    }

    pub fn set_bounds_align(&mut self, horizontal: HorizontalAlign, vertical: VerticalAlign) {
        self.style.bounds_align_h = horizontal;
        self.style.bounds_align_v = vertical;
        self.dirty = true;
    }

    pub fn set_word_wrap(&mut self, enabled: bool) {
        self.style.word_wrap = enabled;
        self.dirty = true;
    }

    /// Sets the wrap budget. Values below one pixel fall back to the
    /// documented default of 100.
    pub fn set_word_wrap_width(&mut self, width: f32) {
        self.style.word_wrap_width = validate_wrap_width(width);
        self.dirty = true;
    }

    pub fn set_advanced_wrap(&mut self, enabled: bool) {
        self.style.advanced_wrap = enabled;
        self.dirty = true;
    }

    pub fn set_tabs(&mut self, tabs: Tabs) {
        self.style.tabs = tabs;
        self.dirty = true;
    }

    pub fn set_max_lines(&mut self, max_lines: usize) {
        self.style.max_lines = max_lines;
        self.dirty = true;
    }

    pub fn set_shadow(&mut self, shadow: ShadowStyle) {
        self.style.shadow = shadow;
        self.dirty = true;
    }

    pub fn set_line_spacing(&mut self, spacing: f32) {
        self.line_spacing = spacing;
        self.dirty = true;
    }

    pub fn set_padding(&mut self, padding: Size2D<f32>) {
        self.padding = padding;
        self.dirty = true;
    }

    /// Sets the physical-per-logical pixel factor. Non-positive values
    /// fall back to 1.
    pub fn set_resolution(&mut self, resolution: f32) {
        if resolution > 0.0 {
            self.resolution = resolution;
        } else {
            log::warn!("ignoring non-positive resolution {resolution}");
            self.resolution = 1.0;
        }
        self.dirty = true;
    }

    pub fn set_auto_round(&mut self, enabled: bool) {
        self.auto_round = enabled;
        self.dirty = true;
    }
}

/// Per-character style runs.
impl TextSprite {
    pub fn runs(&self) -> &StyleRuns {
        &self.runs
    }

    /// Overrides the fill color from character `index` onward (until the
    /// next fill run starts).
    pub fn add_color(&mut self, color: Color, index: usize) {
        self.runs.fill.set(index, color);
        self.dirty = true;
    }

    pub fn add_stroke_color(&mut self, color: Color, index: usize) {
        self.runs.stroke.set(index, color);
        self.dirty = true;
    }

    pub fn add_font_style(&mut self, style: FontStyle, index: usize) {
        self.runs.font_style.set(index, style);
        self.dirty = true;
    }

    pub fn add_font_weight(&mut self, weight: FontWeight, index: usize) {
        self.runs.font_weight.set(index, weight);
        self.dirty = true;
    }

    /// Clears both color override maps.
    pub fn clear_colors(&mut self) {
        self.runs.clear_colors();
        self.dirty = true;
    }

    /// Clears the font-style and font-weight override maps.
    pub fn clear_font_values(&mut self) {
        self.runs.clear_font_values();
        self.dirty = true;
    }
}

/// Fixed bounds.
impl TextSprite {
    pub fn text_bounds(&self) -> Option<&Rect<f32>> {
        self.text_bounds.as_ref()
    }

    /// Aligns the rendered surface inside a fixed rectangle, independent
    /// of per-line text alignment. Also clamps the word-wrap budget to
    /// the rectangle width.
    pub fn set_text_bounds(&mut self, bounds: Rect<f32>) {
        self.text_bounds = Some(bounds);
        self.dirty = true;
    }

    pub fn clear_text_bounds(&mut self) {
        self.text_bounds = None;
        self.dirty = true;
    }
}

/// Rendering.
impl TextSprite {
    /// Runs the layout + composite + texture sync pass if the sprite is
    /// dirty; a clean sprite returns immediately.
    pub fn update_text(&mut self) {
        if !self.dirty {
            return;
        }

        // metric probe first: it may draw on our surface, which the final
        // resize below wipes anyway
        let font = self.style.font_string();
        let metrics = self.metrics.measure(&font, self.surface.as_mut());

        let text = if self.style.word_wrap {
            let mut budget = self.style.word_wrap_width;
            if let Some(bounds) = &self.text_bounds {
                budget = budget.min(bounds.size.width);
            }
            let surface = self.surface.as_mut();
            surface.set_font(&font);
            let mut measure = |piece: &str| surface.measure_text(piece);
            if self.style.advanced_wrap {
                advanced_wrap(&self.content, budget, &mut measure)
            } else {
                basic_wrap(&self.content, budget, &mut measure)
            }
        } else {
            self.content.clone()
        };

        let layout = compute_layout(
            &text,
            &self.style,
            metrics,
            self.padding,
            self.line_spacing,
            self.surface.as_mut(),
        );

        let physical_w = (layout.width * self.resolution).ceil() as u32;
        let physical_h = (layout.height * self.resolution).ceil() as u32;
        let surface = self.surface.as_mut();
        surface.reset(physical_w, physical_h, self.resolution);
        compose::draw(&layout, &self.style, &self.runs, self.auto_round, surface);

        let logical = Size2D::new(layout.width, layout.height);
        self.texture.sync((physical_w, physical_h), logical);
        self.pivot = match &self.text_bounds {
            Some(bounds) => {
                let anchor = texture::bounds_anchor(
                    bounds,
                    logical,
                    self.style.bounds_align_h,
                    self.style.bounds_align_v,
                );
                Point2D::new(-anchor.x, -anchor.y)
            }
            None => Point2D::origin(),
        };

        self.dirty = false;

        if let Some(hook) = self.transform_hook.as_mut() {
            hook(logical.width, logical.height);
        }
    }

    /// Current rendered logical width; flushes a pending layout first.
    pub fn width(&mut self) -> f32 {
        self.update_text();
        self.texture.width()
    }

    /// Current rendered logical height; flushes a pending layout first.
    pub fn height(&mut self) -> f32 {
        self.update_text();
        self.texture.height()
    }

    /// Axis-aligned bounding box of the rendered surface, offset by the
    /// bounds-alignment pivot.
    pub fn bounds(&mut self) -> Rect<f32> {
        self.update_text();
        Rect::new(
            Point2D::new(-self.pivot.x, -self.pivot.y),
            self.texture.frame.size,
        )
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The synced host texture. Not flushed; call
    /// [`TextSprite::update_text`] first for current values.
    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    /// Negated bounds anchor applied by the host when positioning the
    /// surface.
    pub fn pivot(&self) -> Point2D<f32> {
        self.pivot
    }

    pub fn physical_size(&self) -> (u32, u32) {
        self.surface.physical_size()
    }

    /// Read access to the owned surface (pixel readback for uploads).
    pub fn surface(&self) -> &dyn Surface {
        self.surface.as_ref()
    }
}

fn normalize_style(mut style: TextStyle) -> TextStyle {
    style.word_wrap_width = validate_wrap_width(style.word_wrap_width);
    style
}

fn validate_wrap_width(width: f32) -> f32 {
    if width >= 1.0 {
        width
    } else {
        log::warn!("word wrap width {width} is below one pixel, using the default 100");
        100.0
    }
}
