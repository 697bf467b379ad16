use std::collections::BTreeMap;

use crate::font_desc::{FontDescriptor, FontStyle, FontWeight};

/// Straight-alpha RGBA color with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    pub const fn rgb(r: f32, g: f32, b: f32) -> Color {
        Color { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Color {
        Color { r, g, b, a }
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Parses a CSS-ish color: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`,
    /// `rgb(...)`, `rgba(...)`, or a small set of named colors.
    pub fn parse(input: &str) -> Option<Color> {
        let s = input.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        if let Some(args) = s
            .strip_prefix("rgba(")
            .or_else(|| s.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let parts: Vec<&str> = args.split(',').map(str::trim).collect();
            if parts.len() != 3 && parts.len() != 4 {
                return None;
            }
            let r = parts[0].parse::<f32>().ok()? / 255.0;
            let g = parts[1].parse::<f32>().ok()? / 255.0;
            let b = parts[2].parse::<f32>().ok()? / 255.0;
            let a = match parts.get(3) {
                Some(p) => p.parse::<f32>().ok()?,
                None => 1.0,
            };
            return Some(Color { r, g, b, a });
        }
        match s.to_ascii_lowercase().as_str() {
            "black" => Some(Color::BLACK),
            "white" => Some(Color::WHITE),
            "red" => Some(Color::rgb(1.0, 0.0, 0.0)),
            "green" => Some(Color::from_rgba8(0, 128, 0, 255)),
            "blue" => Some(Color::rgb(0.0, 0.0, 1.0)),
            "yellow" => Some(Color::rgb(1.0, 1.0, 0.0)),
            "cyan" => Some(Color::rgb(0.0, 1.0, 1.0)),
            "magenta" => Some(Color::rgb(1.0, 0.0, 1.0)),
            "gray" | "grey" => Some(Color::from_rgba8(128, 128, 128, 255)),
            "transparent" => Some(Color::TRANSPARENT),
            _ => None,
        }
    }

    fn parse_hex(hex: &str) -> Option<Color> {
        let nibble = |c: u8| char::from(c).to_digit(16).map(|d| d as u8);
        let bytes = hex.as_bytes();
        match bytes.len() {
            3 | 4 => {
                let mut out = [0u8; 4];
                out[3] = 255;
                for (i, &c) in bytes.iter().enumerate() {
                    let n = nibble(c)?;
                    out[i] = n << 4 | n;
                }
                Some(Color::from_rgba8(out[0], out[1], out[2], out[3]))
            }
            6 | 8 => {
                let mut out = [0u8; 4];
                out[3] = 255;
                for i in 0..bytes.len() / 2 {
                    out[i] = nibble(bytes[i * 2])? << 4 | nibble(bytes[i * 2 + 1])?;
                }
                Some(Color::from_rgba8(out[0], out[1], out[2], out[3]))
            }
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Horizontal justification of each line inside the rendered surface.
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Vertical anchoring of the rendered surface inside a bounds rectangle.
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// Tab stop configuration.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Tabs {
    /// Tab characters receive no special treatment.
    #[default]
    None,
    /// Cumulative line width snaps up to the next multiple of this size
    /// after every tab segment.
    Fixed(f32),
    /// Ordered per-tab-stop offsets from the line start; stop `c - 1`
    /// positions segment `c`.
    Stops(Vec<f32>),
}

impl Tabs {
    pub fn is_none(&self) -> bool {
        matches!(self, Tabs::None)
    }
}

/// Drop shadow configuration.
///
/// The shadow only renders while one of the per-pass flags is set and the
/// offsets or blur are non-zero.
#[derive(Clone, Debug, PartialEq)]
pub struct ShadowStyle {
    pub offset_x: f32,
    pub offset_y: f32,
    pub color: Color,
    pub blur: f32,
    /// Apply the shadow to stroke passes.
    pub stroke: bool,
    /// Apply the shadow to fill passes.
    pub fill: bool,
}

impl Default for ShadowStyle {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            color: Color::BLACK,
            blur: 0.0,
            stroke: false,
            fill: false,
        }
    }
}

impl ShadowStyle {
    pub fn is_visible(&self) -> bool {
        self.offset_x != 0.0 || self.offset_y != 0.0 || self.blur > 0.0
    }
}

/// Full style descriptor for a text sprite.
///
/// Every field has an explicit documented default; setters on
/// [`crate::TextSprite`] validate values instead of falling back on
/// truthiness.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Structured font components. Default: `bold 20pt Arial`.
    pub font: FontDescriptor,
    /// Fill color; `None` skips the fill pass. Default: black.
    pub fill: Option<Color>,
    /// Stroke color. Default: black.
    pub stroke: Color,
    /// Stroke thickness in pixels; `0.0` skips the stroke pass.
    pub stroke_thickness: f32,
    /// Surface background; `None` leaves the surface transparent.
    pub background_color: Option<Color>,
    /// Per-line horizontal alignment. Default: left.
    pub align: HorizontalAlign,
    /// Horizontal surface anchoring inside a bounds rectangle.
    pub bounds_align_h: HorizontalAlign,
    /// Vertical surface anchoring inside a bounds rectangle.
    pub bounds_align_v: VerticalAlign,
    /// Enables greedy word wrapping. Default: off.
    pub word_wrap: bool,
    /// Wrap budget in pixels. Default: 100.
    pub word_wrap_width: f32,
    /// Uses the whitespace-collapsing, word-splitting wrap variant.
    pub advanced_wrap: bool,
    /// Tab stop handling. Default: none.
    pub tabs: Tabs,
    /// Caps the number of drawn lines; `0` means unlimited.
    pub max_lines: usize,
    /// Drop shadow configuration. Default: disabled.
    pub shadow: ShadowStyle,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: FontDescriptor::default(),
            fill: Some(Color::BLACK),
            stroke: Color::BLACK,
            stroke_thickness: 0.0,
            background_color: None,
            align: HorizontalAlign::Left,
            bounds_align_h: HorizontalAlign::Left,
            bounds_align_v: VerticalAlign::Top,
            word_wrap: false,
            word_wrap_width: 100.0,
            advanced_wrap: false,
            tabs: Tabs::None,
            max_lines: 0,
            shadow: ShadowStyle::default(),
        }
    }
}

impl TextStyle {
    /// The canonical shorthand string for the current font components.
    pub fn font_string(&self) -> String {
        self.font.font_string()
    }
}

/// Sparse run-start map from character index to an override value.
///
/// A value set at index `i` applies from `i` up to the next defined index
/// (or the end of the text). Lookups resolve to the most recent defined
/// index at or before the queried one. Writes are last-writer-wins per
/// index; individual runs cannot be removed, only the whole map cleared.
#[derive(Clone, Debug, PartialEq)]
pub struct RunMap<V> {
    runs: BTreeMap<usize, V>,
}

impl<V> Default for RunMap<V> {
    fn default() -> Self {
        Self { runs: BTreeMap::new() }
    }
}

impl<V> RunMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, index: usize, value: V) {
        self.runs.insert(index, value);
    }

    /// The override active at `index`, if any run starts at or before it.
    pub fn active(&self, index: usize) -> Option<&V> {
        self.runs.range(..=index).next_back().map(|(_, v)| v)
    }

    /// Whether a run starts exactly at `index`.
    pub fn starts_at(&self, index: usize) -> bool {
        self.runs.contains_key(&index)
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn clear(&mut self) {
        self.runs.clear();
    }
}

/// The four per-character override maps of a text sprite.
///
/// Indices count drawn characters only; newline characters are not
/// assigned an index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleRuns {
    pub fill: RunMap<Color>,
    pub stroke: RunMap<Color>,
    pub font_style: RunMap<FontStyle>,
    pub font_weight: RunMap<FontWeight>,
}

impl StyleRuns {
    /// True when no override map is populated and whole-line rendering is
    /// possible.
    pub fn is_empty(&self) -> bool {
        self.fill.is_empty()
            && self.stroke.is_empty()
            && self.font_style.is_empty()
            && self.font_weight.is_empty()
    }

    /// True when the active font string must be rebuilt per character.
    pub fn has_font_runs(&self) -> bool {
        !self.font_style.is_empty() || !self.font_weight.is_empty()
    }

    pub fn clear_colors(&mut self) {
        self.fill.clear();
        self.stroke.clear();
    }

    pub fn clear_font_values(&mut self) {
        self.font_style.clear();
        self.font_weight.clear();
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(Color::parse("#ff0"), Some(Color::rgb(1.0, 1.0, 0.0)));
        assert_eq!(Color::parse("#ffff00"), Some(Color::rgb(1.0, 1.0, 0.0)));
        assert_eq!(
            Color::parse("#11223344"),
            Some(Color::from_rgba8(0x11, 0x22, 0x33, 0x44))
        );
        assert_eq!(Color::parse("#12345"), None);
    }

    #[test]
    fn parses_functional_and_named_colors() {
        assert_eq!(
            Color::parse("rgba(0, 0, 0, 0.5)"),
            Some(Color::rgba(0.0, 0.0, 0.0, 0.5))
        );
        assert_eq!(Color::parse("rgb(255, 0, 0)"), Some(Color::rgb(1.0, 0.0, 0.0)));
        assert_eq!(Color::parse("Yellow"), Some(Color::rgb(1.0, 1.0, 0.0)));
        assert_eq!(Color::parse("not-a-color"), None);
    }

    #[test]
    fn run_lookup_resolves_most_recent_start() {
        let mut map = RunMap::new();
        map.set(7, Color::rgb(1.0, 1.0, 0.0));

        assert_eq!(map.active(0), None);
        assert_eq!(map.active(6), None);
        assert_eq!(map.active(7), Some(&Color::rgb(1.0, 1.0, 0.0)));
        // a run persists until the next defined index or the end of text
        assert_eq!(map.active(11), Some(&Color::rgb(1.0, 1.0, 0.0)));

        map.set(9, Color::WHITE);
        assert_eq!(map.active(8), Some(&Color::rgb(1.0, 1.0, 0.0)));
        assert_eq!(map.active(9), Some(&Color::WHITE));
    }

    #[test]
    fn run_writes_are_last_writer_wins() {
        let mut map = RunMap::new();
        map.set(3, Color::BLACK);
        map.set(3, Color::WHITE);
        assert_eq!(map.active(3), Some(&Color::WHITE));
    }

    #[test]
    fn clears_are_per_category() {
        let mut runs = StyleRuns::default();
        runs.fill.set(0, Color::WHITE);
        runs.stroke.set(0, Color::BLACK);
        runs.font_style.set(2, FontStyle::Italic);
        assert!(!runs.is_empty());
        assert!(runs.has_font_runs());

        runs.clear_colors();
        assert!(runs.fill.is_empty());
        assert!(runs.stroke.is_empty());
        assert!(runs.has_font_runs());

        runs.clear_font_values();
        assert!(runs.is_empty());
    }
}
