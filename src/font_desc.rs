use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Slant component of a shorthand font string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontStyle {
    Normal,
    Italic,
    Oblique,
    Inherit,
}

impl FontStyle {
    fn keyword(self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
            FontStyle::Oblique => "oblique",
            FontStyle::Inherit => "inherit",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        match token {
            "normal" => Some(FontStyle::Normal),
            "italic" => Some(FontStyle::Italic),
            "oblique" => Some(FontStyle::Oblique),
            "inherit" => Some(FontStyle::Inherit),
            _ => None,
        }
    }
}

/// Variant component of a shorthand font string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontVariant {
    Normal,
    SmallCaps,
    Inherit,
}

impl FontVariant {
    fn keyword(self) -> &'static str {
        match self {
            FontVariant::Normal => "normal",
            FontVariant::SmallCaps => "small-caps",
            FontVariant::Inherit => "inherit",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        match token {
            "normal" => Some(FontVariant::Normal),
            "small-caps" => Some(FontVariant::SmallCaps),
            "inherit" => Some(FontVariant::Inherit),
            _ => None,
        }
    }
}

/// Weight component of a shorthand font string.
///
/// Numeric weights are restricted to the CSS 100..=900 hundreds the
/// shorthand grammar accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontWeight {
    Normal,
    Bold,
    Bolder,
    Lighter,
    Inherit,
    Weight(u16),
}

impl FontWeight {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "normal" => Some(FontWeight::Normal),
            "bold" => Some(FontWeight::Bold),
            "bolder" => Some(FontWeight::Bolder),
            "lighter" => Some(FontWeight::Lighter),
            "inherit" => Some(FontWeight::Inherit),
            "100" | "200" | "300" | "400" | "500" | "600" | "700" | "800" | "900" => {
                token.parse().ok().map(FontWeight::Weight)
            }
            _ => None,
        }
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontWeight::Normal => f.write_str("normal"),
            FontWeight::Bold => f.write_str("bold"),
            FontWeight::Bolder => f.write_str("bolder"),
            FontWeight::Lighter => f.write_str("lighter"),
            FontWeight::Inherit => f.write_str("inherit"),
            FontWeight::Weight(n) => write!(f, "{n}"),
        }
    }
}

/// Error produced by the strict shorthand parser.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FontParseError {
    /// A token in size position starts like a number but carries a suffix
    /// that is neither `%` nor a 2-5 letter unit.
    #[error("invalid font size token `{0}`")]
    InvalidSize(String),
}

/// Structured components of a CSS-style shorthand font string.
///
/// The grammar is `[style] [variant] [weight] [size] family` where all
/// leading fields are optional and independently omittable and the family
/// is free trailing text (possibly empty). [`FontDescriptor::font_string`]
/// is the inverse; the round trip is semantically equivalent rather than
/// byte-identical because neutral fields are omitted on output.
#[derive(Clone, Debug, PartialEq)]
pub struct FontDescriptor {
    pub style: Option<FontStyle>,
    pub variant: Option<FontVariant>,
    pub weight: Option<FontWeight>,
    /// Canonical size token (`"24px"`, `"medium"`, `"0"`, `"150%"`, ...).
    /// Bare numeric sizes are normalized to `px` on input.
    pub size: Option<String>,
    pub family: String,
    /// The original input string, re-emitted when every component is
    /// neutral or absent.
    raw: String,
}

const NAMED_SIZES: &[&str] = &[
    "xx-small", "x-small", "small", "medium", "large", "x-large", "xx-large", "larger", "smaller",
];

impl FontDescriptor {
    /// Parses a shorthand font string, degrading on failure.
    ///
    /// A string the grammar rejects is kept verbatim: the whole input
    /// becomes the family so later measurement probes can still hand it to
    /// the backend unchanged. A diagnostic is logged.
    pub fn parse(input: &str) -> Self {
        match Self::try_parse(input) {
            Ok(desc) => desc,
            Err(err) => {
                log::warn!("unparsable font shorthand {input:?}: {err}");
                Self {
                    style: None,
                    variant: None,
                    weight: None,
                    size: None,
                    family: input.to_string(),
                    raw: input.to_string(),
                }
            }
        }
    }

    /// Strict variant of [`FontDescriptor::parse`].
    pub fn try_parse(input: &str) -> Result<Self, FontParseError> {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        let mut i = 0;

        let style = tokens.get(i).copied().and_then(FontStyle::parse);
        if style.is_some() {
            i += 1;
        }
        let variant = tokens.get(i).copied().and_then(FontVariant::parse);
        if variant.is_some() {
            i += 1;
        }
        let weight = tokens.get(i).copied().and_then(FontWeight::parse);
        if weight.is_some() {
            i += 1;
        }
        let size = match tokens.get(i).copied() {
            Some(token) => {
                let parsed = parse_size_token(token)?;
                if parsed.is_some() {
                    i += 1;
                }
                parsed
            }
            None => None,
        };

        Ok(Self {
            style,
            variant,
            weight,
            size,
            family: tokens[i..].join(" "),
            raw: input.to_string(),
        })
    }

    /// Serializes back into a shorthand string.
    ///
    /// Fields equal to their neutral default (`normal` for
    /// style/variant/weight, `medium` for size) are omitted; the order is
    /// fixed as style, variant, weight, size, family. When everything is
    /// neutral or absent the original input string is re-emitted.
    pub fn font_string(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if let Some(style) = self.style
            && style != FontStyle::Normal
        {
            parts.push(style.keyword().to_string());
        }
        if let Some(variant) = self.variant
            && variant != FontVariant::Normal
        {
            parts.push(variant.keyword().to_string());
        }
        if let Some(weight) = self.weight
            && weight != FontWeight::Normal
        {
            parts.push(weight.to_string());
        }
        if let Some(size) = &self.size
            && size != "medium"
        {
            parts.push(size.clone());
        }
        if !self.family.is_empty() {
            parts.push(self.family.clone());
        }

        if parts.is_empty() {
            self.raw.clone()
        } else {
            parts.join(" ")
        }
    }

    /// Sets a numeric size, normalized to a `px` token.
    pub fn set_size_px(&mut self, px: f32) {
        self.size = Some(format_px(px));
    }

    /// Resolves the size component to pixels.
    ///
    /// Named keywords follow the CSS ladder around `medium` = 16px with a
    /// 1.2 scale step; relative keywords resolve against `medium`. Unknown
    /// or absent sizes also fall back to `medium`.
    pub fn size_px(&self) -> f32 {
        const MEDIUM: f32 = 16.0;
        const SCALE: f32 = 1.2;

        let Some(token) = self.size.as_deref() else {
            return MEDIUM;
        };
        match token {
            "xx-small" => return MEDIUM / SCALE.powi(3),
            "x-small" => return MEDIUM / SCALE.powi(2),
            "small" | "smaller" => return MEDIUM / SCALE,
            "medium" => return MEDIUM,
            "large" | "larger" => return MEDIUM * SCALE,
            "x-large" => return MEDIUM * SCALE.powi(2),
            "xx-large" => return MEDIUM * SCALE.powi(3),
            "0" => return 0.0,
            _ => {}
        }

        let split = token
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(token.len());
        let Ok(value) = token[..split].parse::<f32>() else {
            return MEDIUM;
        };
        match &token[split..] {
            "" | "px" => value,
            "pt" => value * 4.0 / 3.0,
            "pc" => value * 16.0,
            "in" => value * 96.0,
            "cm" => value * 96.0 / 2.54,
            "mm" => value * 96.0 / 25.4,
            "em" | "rem" => value * MEDIUM,
            "%" => value / 100.0 * MEDIUM,
            _ => MEDIUM,
        }
    }

    /// Returns a copy with the style/weight components replaced where an
    /// override is given. Used when rebuilding the active font for a
    /// per-character style run.
    pub fn with_overrides(
        &self,
        style: Option<FontStyle>,
        weight: Option<FontWeight>,
    ) -> FontDescriptor {
        let mut desc = self.clone();
        if style.is_some() {
            desc.style = style;
        }
        if weight.is_some() {
            desc.weight = weight;
        }
        desc
    }
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self::parse("bold 20pt Arial")
    }
}

impl FromStr for FontDescriptor {
    type Err = FontParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse(s)
    }
}

impl fmt::Display for FontDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.font_string())
    }
}

/// Recognizes a size token: a named keyword, `0`, or a number followed by
/// `%` or a 2-5 letter unit. Returns `Ok(None)` for tokens that are not
/// sizes at all (they belong to the family).
fn parse_size_token(token: &str) -> Result<Option<String>, FontParseError> {
    if NAMED_SIZES.contains(&token) || token == "0" {
        return Ok(Some(token.to_string()));
    }
    if !token.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return Ok(None);
    }

    let split = token
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(token.len());
    let number = &token[..split];
    let unit = &token[split..];
    if number.parse::<f32>().is_err() {
        return Err(FontParseError::InvalidSize(token.to_string()));
    }

    if unit.is_empty() {
        // bare numeric sizes are normalized to px
        return Ok(Some(format!("{number}px")));
    }
    if unit == "%" || ((2..=5).contains(&unit.len()) && unit.chars().all(|c| c.is_ascii_alphabetic()))
    {
        return Ok(Some(token.to_string()));
    }
    Err(FontParseError::InvalidSize(token.to_string()))
}

fn format_px(px: f32) -> String {
    if px == px.trunc() {
        format!("{}px", px as i64)
    } else {
        format!("{px}px")
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_shorthand() {
        let desc = FontDescriptor::parse("italic small-caps bold 24px Arial");
        assert_eq!(desc.style, Some(FontStyle::Italic));
        assert_eq!(desc.variant, Some(FontVariant::SmallCaps));
        assert_eq!(desc.weight, Some(FontWeight::Bold));
        assert_eq!(desc.size.as_deref(), Some("24px"));
        assert_eq!(desc.family, "Arial");
    }

    #[test]
    fn leading_fields_are_independently_omittable() {
        let desc = FontDescriptor::parse("bold 13px Courier New");
        assert_eq!(desc.style, None);
        assert_eq!(desc.variant, None);
        assert_eq!(desc.weight, Some(FontWeight::Bold));
        assert_eq!(desc.size.as_deref(), Some("13px"));
        assert_eq!(desc.family, "Courier New");

        let desc = FontDescriptor::parse("20pt Arial");
        assert_eq!(desc.weight, None);
        assert_eq!(desc.size.as_deref(), Some("20pt"));
        assert_eq!(desc.family, "Arial");
    }

    #[test]
    fn numeric_weight_wins_over_size() {
        let desc = FontDescriptor::parse("300 12px serif");
        assert_eq!(desc.weight, Some(FontWeight::Weight(300)));
        assert_eq!(desc.size.as_deref(), Some("12px"));
        assert_eq!(desc.family, "serif");
    }

    #[test]
    fn bare_numeric_size_normalizes_to_px() {
        let desc = FontDescriptor::parse("24 sans-serif");
        assert_eq!(desc.size.as_deref(), Some("24px"));
    }

    #[test]
    fn family_may_be_empty() {
        let desc = FontDescriptor::parse("italic 10px");
        assert_eq!(desc.style, Some(FontStyle::Italic));
        assert!(desc.family.is_empty());
        assert_eq!(desc.font_string(), "italic 10px");
    }

    #[test]
    fn invalid_size_suffix_degrades_to_opaque() {
        // six-letter unit is outside the grammar
        let desc = FontDescriptor::parse("12pixels Arial");
        assert_eq!(desc.style, None);
        assert_eq!(desc.size, None);
        assert_eq!(desc.family, "12pixels Arial");
        assert_eq!(desc.font_string(), "12pixels Arial");

        assert_eq!(
            FontDescriptor::try_parse("12pixels Arial"),
            Err(FontParseError::InvalidSize("12pixels".to_string()))
        );
    }

    #[test]
    fn serialize_omits_neutral_fields() {
        let mut desc = FontDescriptor::parse("normal normal normal medium Georgia");
        assert_eq!(desc.font_string(), "Georgia");

        desc.weight = Some(FontWeight::Bold);
        assert_eq!(desc.font_string(), "bold Georgia");

        desc.size = Some("18px".to_string());
        assert_eq!(desc.font_string(), "bold 18px Georgia");
    }

    #[test]
    fn serialize_falls_back_to_original_when_everything_is_neutral() {
        let desc = FontDescriptor::parse("normal medium");
        assert_eq!(desc.font_string(), "normal medium");
    }

    #[test]
    fn inherit_is_not_a_neutral_default() {
        let desc = FontDescriptor::parse("inherit inherit inherit medium serif");
        assert_eq!(desc.font_string(), "inherit inherit inherit serif");
    }

    #[test]
    fn round_trip_is_semantically_stable() {
        for input in [
            "italic small-caps bold 24px Arial",
            "bold 20pt Arial",
            "oblique 150% Times New Roman",
            "small-caps 700 xx-large fantasy",
            "10px monospace",
        ] {
            let first = FontDescriptor::parse(input);
            let second = FontDescriptor::parse(&first.font_string());
            assert_eq!(first.style, second.style, "{input}");
            assert_eq!(first.variant, second.variant, "{input}");
            assert_eq!(first.weight, second.weight, "{input}");
            assert_eq!(first.size, second.size, "{input}");
            assert_eq!(first.family, second.family, "{input}");
        }
    }

    #[test]
    fn size_resolution() {
        assert_eq!(FontDescriptor::parse("16px serif").size_px(), 16.0);
        assert_eq!(FontDescriptor::parse("12pt serif").size_px(), 16.0);
        assert_eq!(FontDescriptor::parse("medium serif").size_px(), 16.0);
        assert_eq!(FontDescriptor::parse("200% serif").size_px(), 32.0);
        assert_eq!(FontDescriptor::parse("0 serif").size_px(), 0.0);
        // absent size falls back to medium
        assert_eq!(FontDescriptor::parse("serif").size_px(), 16.0);
    }

    #[test]
    fn set_size_px_formats_cleanly() {
        let mut desc = FontDescriptor::default();
        desc.set_size_px(24.0);
        assert_eq!(desc.size.as_deref(), Some("24px"));
        desc.set_size_px(13.5);
        assert_eq!(desc.size.as_deref(), Some("13.5px"));
    }

    #[test]
    fn override_merge_replaces_only_given_components() {
        let base = FontDescriptor::parse("bold 20px Arial");
        let merged = base.with_overrides(Some(FontStyle::Italic), None);
        assert_eq!(merged.style, Some(FontStyle::Italic));
        assert_eq!(merged.weight, Some(FontWeight::Bold));
        assert_eq!(merged.font_string(), "italic bold 20px Arial");
    }
}
