use euclid::default::{Point2D, Rect, Size2D};

use crate::style::{HorizontalAlign, VerticalAlign};

/// Host-side view of the backing pixel store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BaseTexture {
    /// Physical pixel width of the backing store.
    pub width: u32,
    /// Physical pixel height of the backing store.
    pub height: u32,
    /// Set when the backing pixels changed and the host renderer must
    /// re-upload them.
    pub dirty: bool,
}

/// Host texture whose logical regions track the layout output.
///
/// `frame` and `crop` are logical-pixel rectangles (physical divided by
/// the resolution factor); `renderable` drops to `false` whenever either
/// dimension is zero.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub base: BaseTexture,
    pub frame: Rect<f32>,
    pub crop: Rect<f32>,
    /// The host must re-apply any tint after the pixels changed.
    pub requires_retint: bool,
    pub renderable: bool,
}

impl Default for Texture {
    fn default() -> Self {
        Self::new()
    }
}

impl Texture {
    pub fn new() -> Self {
        Self {
            base: BaseTexture::default(),
            frame: Rect::zero(),
            crop: Rect::zero(),
            requires_retint: false,
            renderable: false,
        }
    }

    /// Propagates a new surface size to the base, crop, and frame
    /// regions and raises the host dirty flags.
    pub fn sync(&mut self, physical: (u32, u32), logical: Size2D<f32>) {
        self.base.width = physical.0;
        self.base.height = physical.1;
        self.frame = Rect::new(Point2D::origin(), logical);
        self.crop = Rect::new(Point2D::origin(), logical);
        self.renderable = logical.width > 0.0 && logical.height > 0.0;
        self.base.dirty = true;
        self.requires_retint = true;
    }

    pub fn width(&self) -> f32 {
        self.frame.size.width
    }

    pub fn height(&self) -> f32 {
        self.frame.size.height
    }
}

/// Anchor position of a surface of `size` inside `bounds` for the given
/// alignment pair.
///
/// The caller exposes the negated anchor as a pivot so the surface
/// renders at the aligned position regardless of content size changes.
pub fn bounds_anchor(
    bounds: &Rect<f32>,
    size: Size2D<f32>,
    align_h: HorizontalAlign,
    align_v: VerticalAlign,
) -> Point2D<f32> {
    let x = match align_h {
        HorizontalAlign::Left => bounds.origin.x,
        HorizontalAlign::Center => bounds.origin.x + (bounds.size.width - size.width) / 2.0,
        HorizontalAlign::Right => bounds.max_x() - size.width,
    };
    let y = match align_v {
        VerticalAlign::Top => bounds.origin.y,
        VerticalAlign::Middle => bounds.origin.y + (bounds.size.height - size.height) / 2.0,
        VerticalAlign::Bottom => bounds.max_y() - size.height,
    };
    Point2D::new(x, y)
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_propagates_dimensions_and_flags() {
        let mut texture = Texture::new();
        texture.sync((200, 80), Size2D::new(100.0, 40.0));

        assert_eq!(texture.base.width, 200);
        assert_eq!(texture.base.height, 80);
        assert_eq!(texture.frame.size, Size2D::new(100.0, 40.0));
        assert_eq!(texture.crop.size, Size2D::new(100.0, 40.0));
        assert!(texture.renderable);
        assert!(texture.base.dirty);
        assert!(texture.requires_retint);
    }

    #[test]
    fn zero_area_is_not_renderable() {
        let mut texture = Texture::new();
        texture.sync((0, 0), Size2D::zero());
        assert!(!texture.renderable);
        assert!(texture.base.dirty);
    }

    #[test]
    fn anchor_center_bottom() {
        let bounds = Rect::new(Point2D::new(0.0, 0.0), Size2D::new(800.0, 600.0));
        let anchor = bounds_anchor(
            &bounds,
            Size2D::new(100.0, 40.0),
            HorizontalAlign::Center,
            VerticalAlign::Bottom,
        );
        assert_eq!(anchor, Point2D::new(350.0, 560.0));
    }

    #[test]
    fn anchor_respects_bounds_origin() {
        let bounds = Rect::new(Point2D::new(10.0, 20.0), Size2D::new(100.0, 100.0));
        let anchor = bounds_anchor(
            &bounds,
            Size2D::new(40.0, 40.0),
            HorizontalAlign::Right,
            VerticalAlign::Top,
        );
        assert_eq!(anchor, Point2D::new(70.0, 20.0));
    }
}
