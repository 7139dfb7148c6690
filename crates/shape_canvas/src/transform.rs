use image::{Rgb, RgbImage, imageops};
use imageproc::geometric_transformations::{Projection, warp};
use tracing::{debug, warn};

use crate::{
    canvas::Canvas,
    command::Transform,
    error::{CanvasError, Result},
    types::{Axis, BoundingBox},
};

/// Row-major 2x3 affine matrix `[a, b, c, d, e, f]` mapping `(x, y)` to
/// `(a*x + b*y + c, d*x + e*y + f)`
pub type AffineMatrix = [f32; 6];

const BORDER: f32 = 1.0;

/// Rotation about `center` by `angle` degrees (counter-clockwise on screen)
/// combined with a uniform `scale`
pub fn rotation_matrix(center: (f32, f32), angle: f32, scale: f32) -> AffineMatrix {
    let (cx, cy) = center;
    let radians = angle.to_radians();
    let alpha = scale * radians.cos();
    let beta = scale * radians.sin();
    [
        alpha,
        beta,
        (1.0 - alpha) * cx - beta * cy,
        -beta,
        alpha,
        beta * cx + (1.0 - alpha) * cy,
    ]
}

pub fn translation_matrix(tx: f32, ty: f32) -> AffineMatrix {
    [1.0, 0.0, tx, 0.0, 1.0, ty]
}

pub fn shear_matrix(shear_x: f32, shear_y: f32) -> AffineMatrix {
    [1.0, shear_x, 0.0, shear_y, 1.0, 0.0]
}

/// Clamp a half-open `[start, end)` range to `[0, limit]`
fn clamp_range(start: i32, end: i32, limit: u32) -> (u32, u32) {
    let limit = i64::from(limit);
    let start = i64::from(start).clamp(0, limit);
    let end = i64::from(end).clamp(0, limit).max(start);
    (start as u32, (end - start) as u32)
}

impl Canvas {
    /// Integer centre of the canvas, used as the pivot for scale and rotate
    fn pivot(&self) -> (f32, f32) {
        ((self.width() / 2) as f32, (self.height() / 2) as f32)
    }

    /// Warp the whole canvas through `matrix`; output keeps the canvas size and
    /// newly exposed pixels are black.
    ///
    /// The source is framed by a one-pixel black border before warping, so
    /// bilinear sampling of the outermost rows and columns blends with black
    /// instead of dropping them.
    pub fn warp_affine(&self, matrix: AffineMatrix) -> Result<RgbImage> {
        let [a, b, c, d, e, f] = matrix;
        // Same mapping expressed in border-offset coordinates
        let c = c + BORDER - a * BORDER - b * BORDER;
        let f = f + BORDER - d * BORDER - e * BORDER;
        let projection = Projection::from_matrix([a, b, c, d, e, f, 0.0, 0.0, 1.0])
            .ok_or_else(|| CanvasError::SingularTransform(format!("{matrix:?}")))?;

        let (width, height) = self.dimensions();
        let mut framed = RgbImage::new(width + 2, height + 2);
        imageops::replace(&mut framed, self.image(), 1, 1);

        let warped = warp(&framed, &projection, self.interpolation(), Rgb([0, 0, 0]));
        Ok(imageops::crop_imm(&warped, 1, 1, width, height).to_image())
    }

    /// Shift the content by `(tx, ty)` pixels
    pub fn translate(&self, tx: f32, ty: f32) -> Result<RgbImage> {
        debug!(tx, ty, "translating canvas");
        self.warp_affine(translation_matrix(tx, ty))
    }

    /// Scale the content about the canvas centre.
    ///
    /// Only `scale_x` is applied, uniformly on both axes; `scale_y` is
    /// accepted for signature compatibility and otherwise ignored.
    pub fn scale(&self, scale_x: f32, scale_y: f32) -> Result<RgbImage> {
        if scale_y != scale_x {
            warn!(scale_x, scale_y, "scale_y is ignored, scaling uniformly by scale_x");
        }
        debug!(scale_x, "scaling canvas");
        self.warp_affine(rotation_matrix(self.pivot(), 0.0, scale_x))
    }

    /// Rotate the content about the canvas centre; positive is counter-clockwise
    pub fn rotate(&self, angle: f32) -> Result<RgbImage> {
        debug!(angle, "rotating canvas");
        self.warp_affine(rotation_matrix(self.pivot(), angle, 1.0))
    }

    /// Mirror the canvas. Exact, no resampling involved.
    pub fn reflect(&self, axis: Axis) -> RgbImage {
        debug!(%axis, "reflecting canvas");
        match axis {
            Axis::Horizontal => imageops::flip_horizontal(self.image()),
            Axis::Vertical => imageops::flip_vertical(self.image()),
        }
    }

    /// Mirror across an axis named `"horizontal"` or `"vertical"`
    pub fn reflect_named(&self, axis: &str) -> Result<RgbImage> {
        Ok(self.reflect(Axis::parse(axis)?))
    }

    pub fn shear(&self, shear_x: f32, shear_y: f32) -> Result<RgbImage> {
        debug!(shear_x, shear_y, "shearing canvas");
        self.warp_affine(shear_matrix(shear_x, shear_y))
    }

    /// Copy out rows `[start_y, end_y)` and columns `[start_x, end_x)`.
    ///
    /// Out-of-range coordinates are clamped to the canvas, so the result may
    /// be truncated or empty but never fails.
    pub fn crop(&self, bbox: impl Into<BoundingBox>) -> RgbImage {
        let bbox = bbox.into();
        let (x, width) = clamp_range(bbox.start_x, bbox.end_x, self.width());
        let (y, height) = clamp_range(bbox.start_y, bbox.end_y, self.height());
        debug!(x, y, width, height, "cropping canvas");
        imageops::crop_imm(self.image(), x, y, width, height).to_image()
    }

    /// Produce the derived image described by `transform`
    pub fn apply(&self, transform: &Transform) -> Result<RgbImage> {
        match transform {
            Transform::Original => Ok(self.image().clone()),
            Transform::Translate { tx, ty } => self.translate(*tx, *ty),
            Transform::Scale { scale_x, scale_y } => self.scale(*scale_x, *scale_y),
            Transform::Rotate { angle } => self.rotate(*angle),
            Transform::Reflect { axis } => Ok(self.reflect(*axis)),
            Transform::Shear { shear_x, shear_y } => self.shear(*shear_x, *shear_y),
            Transform::Crop { bbox } => Ok(self.crop(*bbox)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Color, ShapeKind};

    fn demo_canvas() -> Canvas {
        let mut canvas = Canvas::new(200, 200).unwrap();
        canvas
            .render_shape((70, 70, 130, 120), ShapeKind::Rectangle, Color::GREEN, 2)
            .unwrap();
        canvas
            .render_shape((80, 80, 120, 115), ShapeKind::Triangle, Color::RED, 1)
            .unwrap();
        canvas
    }

    #[test]
    fn test_rotation_matrix_identity() {
        let m = rotation_matrix((100.0, 100.0), 0.0, 1.0);
        assert_eq!(m, [1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_rotation_matrix_quarter_turn() {
        // +90 degrees maps a point right of the centre to above it
        let m = rotation_matrix((0.0, 0.0), 90.0, 1.0);
        let (x, y) = (10.0f32, 0.0f32);
        let mapped = (m[0] * x + m[1] * y + m[2], m[3] * x + m[4] * y + m[5]);
        assert!((mapped.0 - 0.0).abs() < 1e-4);
        assert!((mapped.1 + 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_rotate_zero_is_identity() {
        let canvas = demo_canvas();
        let rotated = canvas.rotate(0.0).unwrap();
        assert_eq!(rotated.dimensions(), canvas.dimensions());

        // Content lies inside the inscribed circle, away from the border
        for (x, y, pixel) in canvas.image().enumerate_pixels() {
            let (dx, dy) = (x as f32 - 100.0, y as f32 - 100.0);
            if dx * dx + dy * dy < 90.0 * 90.0 {
                assert_eq!(rotated.get_pixel(x, y), pixel, "mismatch at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_reflect_twice_is_identity() {
        let canvas = demo_canvas();
        let once = canvas.reflect(Axis::Horizontal);
        assert_ne!(&once, canvas.image());

        let twice = Canvas::from_image(once).unwrap().reflect(Axis::Horizontal);
        assert_eq!(&twice, canvas.image());
    }

    #[test]
    fn test_reflect_axes() {
        let mut canvas = Canvas::new(10, 6).unwrap();
        canvas
            .render_shape((0, 0, 0, 0), ShapeKind::Rectangle, Color::WHITE, -1)
            .unwrap();

        let horizontal = canvas.reflect(Axis::Horizontal);
        assert_eq!(horizontal.get_pixel(9, 0).0, [255, 255, 255]);

        let vertical = canvas.reflect_named("vertical").unwrap();
        assert_eq!(vertical.get_pixel(0, 5).0, [255, 255, 255]);

        assert!(matches!(
            canvas.reflect_named("sideways"),
            Err(CanvasError::InvalidAxis(_))
        ));
    }

    #[test]
    fn test_translate_moves_content() {
        let mut canvas = Canvas::new(100, 100).unwrap();
        canvas
            .render_shape((10, 10, 20, 20), ShapeKind::Rectangle, Color::WHITE, -1)
            .unwrap();

        let moved = canvas.translate(30.0, 40.0).unwrap();
        assert_eq!(moved.get_pixel(45, 55).0, [255, 255, 255]);
        assert_eq!(moved.get_pixel(15, 15).0, [0, 0, 0]);
        // The stored canvas is untouched
        assert_eq!(canvas.image().get_pixel(15, 15).0, [255, 255, 255]);
    }

    #[test]
    fn test_translate_keeps_last_column() {
        let mut canvas = Canvas::new(100, 100).unwrap();
        canvas
            .render_shape((99, 20, 99, 80), ShapeKind::Rectangle, Color::WHITE, -1)
            .unwrap();

        let unmoved = canvas.translate(0.0, 0.0).unwrap();
        assert_eq!(&unmoved, canvas.image());

        let moved = canvas.translate(-10.0, 0.0).unwrap();
        assert_eq!(moved.get_pixel(89, 50).0, [255, 255, 255]);
        assert_eq!(moved.pixels().filter(|p| p.0 != [0, 0, 0]).count(), 61);
    }

    #[test]
    fn test_warps_keep_edge_rows() {
        let mut canvas = Canvas::new(60, 40).unwrap();
        canvas
            .render_shape((0, 0, 59, 39), ShapeKind::Rectangle, Color::WHITE, 1)
            .unwrap();

        let shifted = canvas.translate(0.0, -5.0).unwrap();
        assert_eq!(shifted.get_pixel(30, 34).0, [255, 255, 255]);
        assert_eq!(shifted.get_pixel(0, 10).0, [255, 255, 255]);

        let rotated = canvas.rotate(0.0).unwrap();
        assert_eq!(&rotated, canvas.image());
    }

    #[test]
    fn test_translate_out_of_bounds_is_black() {
        let mut canvas = Canvas::new(50, 50).unwrap();
        canvas
            .render_shape((0, 0, 49, 49), ShapeKind::Rectangle, Color::WHITE, -1)
            .unwrap();
        let moved = canvas.translate(100.0, 0.0).unwrap();
        assert!(moved.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn test_scale_ignores_scale_y() {
        let canvas = demo_canvas();
        let uniform = canvas.scale(1.5, 1.5).unwrap();
        let mismatched = canvas.scale(1.5, 0.25).unwrap();
        assert_eq!(uniform, mismatched);
        assert_eq!(uniform.dimensions(), canvas.dimensions());
    }

    #[test]
    fn test_scale_grows_about_center() {
        let mut canvas = Canvas::new(100, 100).unwrap();
        canvas
            .render_shape((40, 40, 60, 60), ShapeKind::Rectangle, Color::WHITE, -1)
            .unwrap();
        let scaled = canvas.scale(2.0, 2.0).unwrap();
        // (40,40) maps to (30,30); a pixel just inside is now filled
        assert_eq!(scaled.get_pixel(35, 35).0, [255, 255, 255]);
        assert_eq!(scaled.get_pixel(25, 25).0, [0, 0, 0]);
    }

    #[test]
    fn test_scale_zero_is_singular() {
        let canvas = demo_canvas();
        assert!(matches!(
            canvas.scale(0.0, 1.0),
            Err(CanvasError::SingularTransform(_))
        ));
    }

    #[test]
    fn test_shear() {
        let mut canvas = Canvas::new(100, 100).unwrap();
        canvas
            .render_shape((10, 50, 12, 52), ShapeKind::Rectangle, Color::WHITE, -1)
            .unwrap();
        // x' = x + 0.5 * y
        let sheared = canvas.shear(0.5, 0.0).unwrap();
        assert_eq!(sheared.get_pixel(36, 51).0, [255, 255, 255]);
        assert_eq!(sheared.get_pixel(11, 51).0, [0, 0, 0]);

        assert!(matches!(
            canvas.shear(1.0, 1.0),
            Err(CanvasError::SingularTransform(_))
        ));
    }

    #[test]
    fn test_crop_shape() {
        let canvas = Canvas::new(500, 500).unwrap();
        let cropped = canvas.crop((50, 50, 200, 150));
        assert_eq!(cropped.dimensions(), (150, 100));
        assert_eq!(cropped.as_raw().len(), 100 * 150 * 3);
    }

    #[test]
    fn test_render_then_crop_shows_shape() {
        let mut canvas = Canvas::new(300, 300).unwrap();
        let bbox = BoundingBox::new(40, 60, 180, 200);
        for kind in [ShapeKind::Rectangle, ShapeKind::Triangle, ShapeKind::Square, ShapeKind::Rhombus] {
            canvas.render_shape(bbox, kind, Color::YELLOW, 2).unwrap();
            let cropped = canvas.crop(bbox);
            assert!(cropped.pixels().any(|p| p.0 != [0, 0, 0]), "{kind} not visible in crop");
        }
    }

    #[test]
    fn test_crop_clamps_out_of_range() {
        let canvas = Canvas::new(100, 80).unwrap();

        let truncated = canvas.crop((90, 70, 150, 120));
        assert_eq!(truncated.dimensions(), (10, 10));

        let negative = canvas.crop((-20, -20, 10, 10));
        assert_eq!(negative.dimensions(), (10, 10));

        let inverted = canvas.crop((50, 50, 20, 20));
        assert_eq!(inverted.dimensions(), (0, 0));

        let outside = canvas.crop((200, 200, 300, 300));
        assert_eq!(outside.dimensions(), (0, 0));
    }

    #[test]
    fn test_apply_dispatch() {
        let canvas = demo_canvas();
        assert_eq!(&canvas.apply(&Transform::Original).unwrap(), canvas.image());
        assert_eq!(
            canvas.apply(&Transform::Reflect { axis: Axis::Vertical }).unwrap(),
            canvas.reflect(Axis::Vertical)
        );
        assert_eq!(
            canvas
                .apply(&Transform::Crop { bbox: BoundingBox::new(0, 0, 10, 20) })
                .unwrap()
                .dimensions(),
            (10, 20)
        );
    }
}
