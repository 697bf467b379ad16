use euclid::default::Size2D;

use crate::font_metrics::FontMetrics;
use crate::style::{Tabs, TextStyle};
use crate::surface::Surface;

/// Transient result of a layout pass.
///
/// Recomputed from scratch on every dirty flush and never persisted; the
/// compositor consumes it immediately.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<String>,
    /// Pixel width per line, including stroke thickness and padding.
    pub line_widths: Vec<f32>,
    pub max_line_width: f32,
    /// Height of one line: font size + stroke thickness + vertical
    /// padding.
    pub line_height: f32,
    /// Extra spacing between lines, already clamped so a negative value
    /// never exceeds one line height.
    pub line_spacing: f32,
    /// Number of lines that will actually be drawn (`max_lines` cap).
    pub drawn_lines: usize,
    /// Logical canvas width (`ceil` of the widest line).
    pub width: f32,
    /// Logical canvas height over the drawn lines.
    pub height: f32,
    pub metrics: FontMetrics,
}

impl TextLayout {
    /// Baseline Y of line `index`.
    pub fn baseline(&self, style: &TextStyle, index: usize) -> f32 {
        style.stroke_thickness / 2.0
            + index as f32 * self.line_height
            + self.metrics.ascent
            + self.line_spacing * index as f32
    }
}

/// Splits on the universal newline forms `\r\n`, `\r`, and `\n`.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split("\r\n")
        .flat_map(|chunk| chunk.split(['\r', '\n']))
        .collect()
}

/// Snaps `value` up to the next multiple of `gap`.
pub(crate) fn snap_to_ceil(value: f32, gap: f32) -> f32 {
    if gap <= 0.0 { value } else { (value / gap).ceil() * gap }
}

/// Offsets of each tab segment from the line start, under the same rules
/// the width computation uses. Shared with the compositor so segments are
/// drawn exactly where they were measured.
pub(crate) fn segment_offsets(
    segments: &[&str],
    tabs: &Tabs,
    surface: &mut dyn Surface,
) -> Vec<f32> {
    let mut offsets = Vec::with_capacity(segments.len());
    match tabs {
        Tabs::None => offsets.push(0.0),
        Tabs::Fixed(gap) => {
            let mut cursor = 0.0;
            for segment in segments {
                offsets.push(cursor);
                cursor += surface.measure_text(segment).ceil();
                cursor = snap_to_ceil(cursor, *gap);
            }
        }
        Tabs::Stops(stops) => {
            let mut tab = 0.0;
            for c in 0..segments.len() {
                if c > 0 {
                    // out-of-range stops reuse the last defined offset
                    tab = stops.get(c - 1).copied().unwrap_or(tab);
                }
                offsets.push(tab);
            }
        }
    }
    offsets
}

/// Computes line breaks, per-line pixel widths, and the logical canvas
/// size for the given (already wrapped) text.
pub fn compute_layout(
    text: &str,
    style: &TextStyle,
    metrics: FontMetrics,
    padding: Size2D<f32>,
    line_spacing: f32,
    surface: &mut dyn Surface,
) -> TextLayout {
    surface.set_font(&style.font_string());

    let lines: Vec<String> = split_lines(text).into_iter().map(str::to_string).collect();

    let mut line_widths = Vec::with_capacity(lines.len());
    let mut max_line_width = 0.0f32;
    for line in &lines {
        let width = line_width(line, style, padding.width, surface);
        max_line_width = max_line_width.max(width);
        line_widths.push(width);
    }

    let width = max_line_width.ceil();
    let line_height = metrics.font_size + style.stroke_thickness + padding.height;

    let drawn_lines = if style.max_lines > 0 {
        style.max_lines.min(lines.len())
    } else {
        lines.len()
    };

    // negative spacing is clamped so lines can collapse at most onto each
    // other, never into negative total height
    let line_spacing = if line_spacing < 0.0 {
        line_spacing.max(-line_height)
    } else {
        line_spacing
    };

    let mut height = line_height * drawn_lines as f32;
    if drawn_lines > 1 {
        height += line_spacing * (drawn_lines - 1) as f32;
    }

    TextLayout {
        lines,
        line_widths,
        max_line_width,
        line_height,
        line_spacing,
        drawn_lines,
        width,
        height,
        metrics,
    }
}

fn line_width(line: &str, style: &TextStyle, padding_x: f32, surface: &mut dyn Surface) -> f32 {
    if style.tabs.is_none() {
        return surface.measure_text(line) + style.stroke_thickness + padding_x;
    }

    let segments: Vec<&str> = line.split('\t').collect();
    let mut width = padding_x + style.stroke_thickness;
    match &style.tabs {
        Tabs::Fixed(gap) => {
            for segment in &segments {
                width += surface.measure_text(segment).ceil();
                width = snap_to_ceil(width, *gap);
            }
        }
        Tabs::Stops(stops) => {
            // NOTE: width is reassigned per segment, so only the last
            // segment's offset determines the reported line width for
            // array stops; see the layout tests.
            let mut tab = 0.0;
            for (c, segment) in segments.iter().enumerate() {
                if c > 0 {
                    tab = stops.get(c - 1).copied().unwrap_or(tab);
                }
                width = tab + surface.measure_text(segment).ceil();
            }
        }
        Tabs::None => unreachable!("checked above"),
    }
    width
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::testing::MockSurface;

    fn metrics() -> FontMetrics {
        FontMetrics { ascent: 14.0, descent: 10.0, font_size: 24.0 }
    }

    fn layout(text: &str, style: &TextStyle, spacing: f32) -> TextLayout {
        let mut surface = MockSurface::new();
        compute_layout(text, style, metrics(), Size2D::zero(), spacing, &mut surface)
    }

    #[test]
    fn splits_universal_newline_forms() {
        assert_eq!(split_lines("a\r\nb\rc\nd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines(""), vec![""]);
    }

    #[test]
    fn plain_line_widths_include_stroke_and_padding() {
        let mut style = TextStyle::default();
        style.stroke_thickness = 4.0;
        let mut surface = MockSurface::new();
        let out = compute_layout(
            "ab\nabcd",
            &style,
            metrics(),
            Size2D::new(2.0, 0.0),
            0.0,
            &mut surface,
        );

        // 10px per char + 4 stroke + 2 padding
        assert_eq!(out.line_widths, vec![26.0, 46.0]);
        assert_eq!(out.max_line_width, 46.0);
        assert_eq!(out.width, 46.0);
    }

    #[test]
    fn scalar_tabs_snap_each_segment_to_the_next_multiple() {
        let mut style = TextStyle::default();
        style.tabs = Tabs::Fixed(50.0);
        let out = layout("a\tbb\tccc", &style, 0.0);

        // cumulative widths 10 -> 50, 70 -> 100, 130 -> 150
        assert_eq!(out.line_widths, vec![150.0]);

        let mut surface = MockSurface::new();
        let offsets = segment_offsets(&["a", "bb", "ccc"], &style.tabs, &mut surface);
        assert_eq!(offsets, vec![0.0, 50.0, 100.0]);
        // every segment start is a multiple of the tab size at or beyond
        // the previous segment's natural end
        for offset in offsets {
            assert_eq!(offset % 50.0, 0.0);
        }
    }

    #[test]
    fn array_tabs_are_absolute_offsets_not_deltas() {
        let mut style = TextStyle::default();
        style.tabs = Tabs::Stops(vec![30.0, 80.0]);
        let mut surface = MockSurface::new();

        let offsets = segment_offsets(&["a", "bb", "ccc"], &style.tabs, &mut surface);
        assert_eq!(offsets, vec![0.0, 30.0, 80.0]);
    }

    #[test]
    fn array_tab_width_reports_only_the_last_segment() {
        // The reported width is the last segment's offset plus its own
        // width, even when an earlier segment extends further.
        let mut style = TextStyle::default();
        style.tabs = Tabs::Stops(vec![30.0, 80.0]);
        let out = layout("a\tbbbbbbbbbb\tc", &style, 0.0);

        // last segment: offset 80 + ceil(10) = 90; segment 2 actually inks
        // out to 30 + 100 = 130 but is not reported
        assert_eq!(out.line_widths, vec![90.0]);
    }

    #[test]
    fn more_segments_than_stops_reuse_the_last_stop() {
        let style_tabs = Tabs::Stops(vec![30.0]);
        let mut surface = MockSurface::new();
        let offsets = segment_offsets(&["a", "b", "c"], &style_tabs, &mut surface);
        assert_eq!(offsets, vec![0.0, 30.0, 30.0]);
    }

    #[test]
    fn line_height_and_total_height() {
        let style = TextStyle::default();
        let out = layout("a\nb\nc", &style, 0.0);
        assert_eq!(out.line_height, 24.0);
        assert_eq!(out.height, 72.0);

        let out = layout("a\nb\nc", &style, 6.0);
        assert_eq!(out.height, 72.0 + 12.0);
    }

    #[test]
    fn negative_line_spacing_clamps_to_line_height() {
        let style = TextStyle::default();
        let clamped = layout("a\nb", &style, -1000.0);
        let reference = layout("a\nb", &style, -24.0);
        assert_eq!(clamped.line_spacing, -24.0);
        assert_eq!(clamped.height, reference.height);
    }

    #[test]
    fn max_lines_caps_drawn_lines_and_height() {
        let mut style = TextStyle::default();
        style.max_lines = 2;
        let out = layout("a\nb\nc\nd", &style, 0.0);
        assert_eq!(out.lines.len(), 4);
        assert_eq!(out.drawn_lines, 2);
        assert_eq!(out.height, 48.0);
    }

    #[test]
    fn baselines_include_spacing_after_the_first_line() {
        let mut style = TextStyle::default();
        style.stroke_thickness = 2.0;
        let mut surface = MockSurface::new();
        let out = compute_layout("a\nb", &style, metrics(), Size2D::zero(), 5.0, &mut surface);

        // line height = 24 + 2 = 26
        assert_eq!(out.baseline(&style, 0), 1.0 + 14.0);
        assert_eq!(out.baseline(&style, 1), 1.0 + 26.0 + 14.0 + 5.0);
    }
}
