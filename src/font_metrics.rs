use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use euclid::default::{Point2D, Rect, Size2D};
use parking_lot::Mutex;

use crate::style::Color;
use crate::surface::Surface;

/// Probe glyph sequence: needs ascenders (`|M`), an accent (`É`), and
/// descenders (`qgy`) so the row scan sees the full vertical extent.
pub const PROBE_TEXT: &str = "|MÉqgy";

/// Row scanning systematically underestimates the descent for fonts whose
/// descenders are thin at the extremes; bias it by a few pixels.
const DESCENT_BIAS: f32 = 6.0;

const SENTINEL: Color = Color::rgb(1.0, 0.0, 0.0);

/// Vertical metrics probed for one exact font string.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
    /// `ascent + descent`.
    pub font_size: f32,
}

/// Process-wide memo of probed font metrics, keyed by the exact font
/// string (two descriptors that serialize differently probe
/// independently).
///
/// Entries are never evicted: distinct font strings are low-cardinality
/// in practice and the metrics for a given string are stable for the
/// process lifetime. The [`MetricsCache::global`] instance is created on
/// first use and never cleared; tests substitute a fresh instance via
/// [`crate::TextSprite::set_metrics_cache`].
pub struct MetricsCache {
    map: Mutex<HashMap<String, FontMetrics, fxhash::FxBuildHasher>>,
}

impl Default for MetricsCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCache {
    pub fn new() -> Self {
        Self {
            map: Mutex::new(HashMap::with_hasher(fxhash::FxBuildHasher::default())),
        }
    }

    /// The shared process-wide cache.
    pub fn global() -> Arc<MetricsCache> {
        static GLOBAL: OnceLock<Arc<MetricsCache>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(MetricsCache::new())))
    }

    /// Returns the metrics for `font`, probing on the first request.
    ///
    /// The probe renders onto `surface` (resizing it); callers run it
    /// before sizing the surface for actual output.
    pub fn measure(&self, font: &str, surface: &mut dyn Surface) -> FontMetrics {
        if let Some(metrics) = self.map.lock().get(font) {
            return *metrics;
        }

        let metrics = probe(font, surface);
        self.map.lock().insert(font.to_string(), metrics);
        metrics
    }

    pub fn contains(&self, font: &str) -> bool {
        self.map.lock().contains_key(font)
    }

    pub fn len(&self) -> usize {
        self.map.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.lock().is_empty()
    }
}

/// Renders the probe text over a sentinel background and scans pixel rows
/// for the ink extent.
fn probe(font: &str, surface: &mut dyn Surface) -> FontMetrics {
    surface.set_font(font);
    surface.set_shadow(None);

    let advance = surface.measure_text(PROBE_TEXT).ceil().max(1.0);
    let em = surface.measure_text("M").ceil().max(1.0);
    let baseline = (em * 1.4).ceil();
    let height = baseline * 2.0;

    surface.reset(advance as u32, height as u32, 1.0);
    surface.set_font(font);
    surface.fill_rect(
        Rect::new(Point2D::origin(), Size2D::new(advance, height)),
        SENTINEL,
    );
    surface.fill_text(PROBE_TEXT, 0.0, baseline, Color::BLACK);

    let (ascent, descent) = match scan_ink_rows(surface, baseline) {
        Some(extent) => extent,
        // no pixel readback (or no ink): estimate from the probe advance
        None => ((em * 1.4).ceil(), (em * 0.5).ceil()),
    };

    let descent = descent + DESCENT_BIAS;
    FontMetrics {
        ascent,
        descent,
        font_size: ascent + descent,
    }
}

/// Finds the first and last rows containing non-sentinel pixels and
/// converts them to ascent/descent around the baseline.
fn scan_ink_rows(surface: &dyn Surface, baseline: f32) -> Option<(f32, f32)> {
    let data = surface.pixels()?;
    let (width, height) = surface.physical_size();
    let (width, height) = (width as usize, height as usize);
    if data.len() < width * height * 4 || width == 0 {
        return None;
    }

    let row_has_ink = |row: usize| {
        let start = row * width * 4;
        data[start..start + width * 4]
            .chunks_exact(4)
            .any(|px| px[0] != 255 || px[1] != 0 || px[2] != 0)
    };

    let top = (0..height).find(|&row| row_has_ink(row))?;
    let bottom = (0..height).rev().find(|&row| row_has_ink(row))?;

    let ascent = (baseline - top as f32).max(0.0);
    let descent = (bottom as f32 - baseline).max(0.0);
    Some((ascent, descent))
}
