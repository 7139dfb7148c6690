use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::Interpolation;
use tracing::debug;

use crate::{
    draw,
    error::{CanvasError, Result},
    types::{BoundingBox, Color, Shape, ShapeKind},
};

/// Offset applied to both corners of a rectangle's erase box.
///
/// Erasing a rectangle paints the draw box shifted by this amount, so the
/// erase is an approximation that leaves part of the original outline behind.
pub const RECTANGLE_ERASE_OFFSET: i32 = 10;

/// Largest accepted stroke width, in either direction
pub const MAX_THICKNESS: i32 = 32767;

/// An owned RGB drawing surface.
///
/// Shapes are rasterized straight into the pixel buffer; nothing about them
/// is remembered afterwards. Whole-canvas transforms (see `transform.rs`)
/// read the buffer and return new images without touching it.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbImage,
    interpolation: Interpolation,
}

impl Canvas {
    /// Create a black canvas of the given size
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidDimensions { width, height });
        }
        debug!(width, height, "created canvas");
        Ok(Self {
            image: RgbImage::new(width, height),
            interpolation: Interpolation::Bilinear,
        })
    }

    /// Wrap an existing image as a canvas
    pub fn from_image(image: RgbImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidDimensions { width, height });
        }
        Ok(Self {
            image,
            interpolation: Interpolation::Bilinear,
        })
    }

    /// Set the sampling used by the warping transforms
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `(width, height)` in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Borrow the current pixel buffer
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Draw a shape of the given kind inside `bbox`.
    ///
    /// A positive `thickness` strokes the outline, a negative one fills the
    /// shape. Zero, or a magnitude above [`MAX_THICKNESS`], is rejected.
    /// Shapes accumulate on the same buffer across calls.
    pub fn render_shape(
        &mut self,
        bbox: impl Into<BoundingBox>,
        kind: ShapeKind,
        color: impl Into<Color>,
        thickness: i32,
    ) -> Result<&RgbImage> {
        if thickness == 0 || thickness.unsigned_abs() > MAX_THICKNESS.unsigned_abs() {
            return Err(CanvasError::InvalidThickness(thickness));
        }
        let bbox = bbox.into();
        let color: Color = color.into();
        let color: Rgb<u8> = color.into();
        debug!(%kind, ?bbox, ?color, thickness, "rendering shape");

        let image = &mut self.image;
        let stroke = thickness.unsigned_abs();
        let filled = thickness < 0;

        match kind {
            ShapeKind::Rectangle if filled => draw::fill_rect(image, bbox, color),
            ShapeKind::Rectangle => draw::stroke_rect(image, bbox, color, stroke),
            ShapeKind::Square if filled => draw::fill_rect(image, bbox.square(), color),
            ShapeKind::Square => draw::stroke_rect(image, bbox.square(), color, stroke),
            ShapeKind::Triangle if filled => draw::fill_polygon(image, &bbox.triangle(), color),
            ShapeKind::Triangle => draw::stroke_polyline(image, &bbox.triangle(), true, color, stroke),
            ShapeKind::Rhombus if filled => draw::fill_polygon(image, &bbox.rhombus(), color),
            ShapeKind::Rhombus => draw::stroke_polyline(image, &bbox.rhombus(), true, color, stroke),
        }

        Ok(&self.image)
    }

    /// Draw a shape named by string, e.g. `"rhombus"`.
    ///
    /// The name is validated before any pixel is written.
    pub fn render_named(
        &mut self,
        bbox: impl Into<BoundingBox>,
        kind: &str,
        color: impl Into<Color>,
        thickness: i32,
    ) -> Result<&RgbImage> {
        let kind = ShapeKind::parse(kind)?;
        self.render_shape(bbox, kind, color, thickness)
    }

    /// Draw a shape descriptor
    pub fn render(&mut self, shape: &Shape) -> Result<&RgbImage> {
        self.render_shape(shape.bbox, shape.kind, shape.color, shape.thickness)
    }

    /// Paint a shape's region solid black.
    ///
    /// Rectangles are erased at their draw box shifted by
    /// [`RECTANGLE_ERASE_OFFSET`] on both axes; the other kinds are filled
    /// with their exact draw geometry.
    pub fn erase_shape(&mut self, bbox: impl Into<BoundingBox>, kind: ShapeKind) -> &RgbImage {
        let bbox = bbox.into();
        let black: Rgb<u8> = Color::BLACK.into();
        debug!(%kind, ?bbox, "erasing shape");

        let image = &mut self.image;
        match kind {
            ShapeKind::Rectangle => {
                let shifted = bbox.shifted(RECTANGLE_ERASE_OFFSET, RECTANGLE_ERASE_OFFSET);
                draw::fill_rect(image, shifted, black);
            }
            ShapeKind::Square => draw::fill_rect(image, bbox.square(), black),
            ShapeKind::Triangle => draw::fill_polygon(image, &bbox.triangle(), black),
            ShapeKind::Rhombus => draw::fill_polygon(image, &bbox.rhombus(), black),
        }

        &self.image
    }

    /// Erase a shape named by string; the name is validated first
    pub fn erase_named(&mut self, bbox: impl Into<BoundingBox>, kind: &str) -> Result<&RgbImage> {
        let kind = ShapeKind::parse(kind)?;
        Ok(self.erase_shape(bbox, kind))
    }
}
