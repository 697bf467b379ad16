use euclid::default::{Point2D, Rect, Size2D};

use crate::style::{Color, HorizontalAlign, StyleRuns, TextStyle};
use crate::surface::{ShadowParams, Surface};
use crate::text::layout::{TextLayout, segment_offsets};

/// Composites a laid-out text block onto the surface.
///
/// Lines without per-character overrides are drawn in one stroke pass and
/// one fill pass each; as soon as any override map is populated the whole
/// block switches to character-by-character drawing so run lookups and
/// font rebuilds can apply at the right global character index.
pub fn draw(
    layout: &TextLayout,
    style: &TextStyle,
    runs: &StyleRuns,
    auto_round: bool,
    surface: &mut dyn Surface,
) {
    surface.set_font(&style.font_string());

    if let Some(background) = style.background_color {
        surface.fill_rect(
            Rect::new(Point2D::origin(), Size2D::new(layout.width, layout.height)),
            background,
        );
    }

    let mut char_count = 0usize;
    for (i, line) in layout.lines.iter().take(layout.drawn_lines).enumerate() {
        let mut x = style.stroke_thickness / 2.0;
        match style.align {
            HorizontalAlign::Left => {}
            HorizontalAlign::Center => x += (layout.max_line_width - layout.line_widths[i]) / 2.0,
            HorizontalAlign::Right => x += layout.max_line_width - layout.line_widths[i],
        }
        let mut y = layout.baseline(style, i);
        if auto_round {
            x = x.round();
            y = y.round();
        }

        if runs.is_empty() {
            draw_line(line, x, y, style, surface);
        } else {
            draw_line_runs(line, x, y, style, runs, &mut char_count, surface);
        }
    }
}

/// Whole-line passes, split into tab segments when tabs are configured.
fn draw_line(line: &str, x: f32, y: f32, style: &TextStyle, surface: &mut dyn Surface) {
    if style.tabs.is_none() {
        draw_piece(line, x, y, style.stroke, style.fill, style, surface);
        return;
    }

    let segments: Vec<&str> = line.split('\t').collect();
    let offsets = segment_offsets(&segments, &style.tabs, surface);
    for (segment, offset) in segments.iter().zip(&offsets) {
        draw_piece(segment, x + offset, y, style.stroke, style.fill, style, surface);
    }
}

/// Character-by-character passes with run lookups.
///
/// `char_count` is the running global index over drawn characters; newline
/// characters (and the tab characters consumed by segment splitting) are
/// not counted.
fn draw_line_runs(
    line: &str,
    x: f32,
    y: f32,
    style: &TextStyle,
    runs: &StyleRuns,
    char_count: &mut usize,
    surface: &mut dyn Surface,
) {
    let rebuild_font = runs.has_font_runs();

    let segments: Vec<&str> = if style.tabs.is_none() {
        vec![line]
    } else {
        line.split('\t').collect()
    };
    let offsets = segment_offsets(&segments, &style.tabs, surface);

    for (segment, offset) in segments.iter().zip(&offsets) {
        let mut pen = x + offset;
        for ch in segment.chars() {
            let mut buf = [0u8; 4];
            let piece: &str = ch.encode_utf8(&mut buf);

            if rebuild_font {
                // merge the base font with any style/weight run active at
                // this index before both sub-passes
                let desc = style.font.with_overrides(
                    runs.font_style.active(*char_count).copied(),
                    runs.font_weight.active(*char_count).copied(),
                );
                surface.set_font(&desc.font_string());
            }

            let stroke = runs.stroke.active(*char_count).copied().unwrap_or(style.stroke);
            let fill = runs.fill.active(*char_count).copied().or(style.fill);
            draw_piece(piece, pen, y, stroke, fill, style, surface);

            pen += surface.measure_text(piece);
            *char_count += 1;
        }
    }

    if rebuild_font {
        surface.set_font(&style.font_string());
    }
}

/// One stroke pass and one fill pass for a piece of text, each with its
/// own shadow enable.
fn draw_piece(
    text: &str,
    x: f32,
    y: f32,
    stroke: Color,
    fill: Option<Color>,
    style: &TextStyle,
    surface: &mut dyn Surface,
) {
    if style.stroke_thickness > 0.0 {
        set_pass_shadow(style, style.shadow.stroke, surface);
        surface.stroke_text(text, x, y, stroke, style.stroke_thickness);
    }
    if let Some(fill) = fill {
        set_pass_shadow(style, style.shadow.fill, surface);
        surface.fill_text(text, x, y, fill);
    }
}

fn set_pass_shadow(style: &TextStyle, enabled: bool, surface: &mut dyn Surface) {
    if enabled && style.shadow.is_visible() {
        surface.set_shadow(Some(&ShadowParams {
            offset_x: style.shadow.offset_x,
            offset_y: style.shadow.offset_y,
            blur: style.shadow.blur,
            color: style.shadow.color,
        }));
    } else {
        surface.set_shadow(None);
    }
}
