//! # Shape Canvas
//!
//! An owned RGB canvas for drawing simple shapes and deriving whole-canvas
//! affine transforms from it.
//!
//! ## Core Features
//!
//! - **Shapes**: rectangle, triangle, square and rhombus, stroked or filled
//! - **Erasing**: best-effort black-out of a previously drawn shape
//! - **Transforms**: translate, scale, rotate, reflect, shear and crop, each
//!   returning a new image and leaving the canvas untouched
//! - **Commands**: a serializable [`Transform`] enum for scripted pipelines
//! - **Processing**: resize, blur, grayscale and binarization of loaded images
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shape_canvas::{Canvas, Color, ShapeKind, save_image};
//!
//! let mut canvas = Canvas::new(500, 500)?;
//! canvas.render_shape((50, 50, 200, 150), ShapeKind::Rectangle, Color::GREEN, 2)?;
//! canvas.render_shape((250, 50, 400, 200), ShapeKind::Triangle, Color::BLUE, 2)?;
//!
//! let rotated = canvas.rotate(45.0)?;
//! save_image(&rotated, "rotated.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod canvas;
pub mod command;
mod draw;
pub mod error;
pub mod filters;
pub mod io;
pub mod processor;
pub mod transform;
pub mod types;

pub use canvas::{Canvas, MAX_THICKNESS, RECTANGLE_ERASE_OFFSET};
pub use command::Transform;
pub use error::{CanvasError, Result};
pub use filters::{
    BlurKind, BoxBlur, GaussianBlur, ImageOperation, MAX_RESIZE_DIMENSION, Resize, ResizeMethod,
};
pub use io::{load_image, save_image};
pub use processor::{DEFAULT_THRESHOLD, ImageProcessor};
pub use transform::{AffineMatrix, rotation_matrix, shear_matrix, translation_matrix};
pub use types::{Axis, BoundingBox, Color, Shape, ShapeKind};

pub use imageproc::geometric_transformations::Interpolation;

#[cfg(test)]
mod tests {
    use super::*;

    fn combined_canvas() -> Canvas {
        let mut canvas = Canvas::new(500, 500).unwrap();
        canvas.render_shape((50, 50, 200, 150), ShapeKind::Rectangle, Color::GREEN, 2).unwrap();
        canvas.render_shape((250, 50, 400, 200), ShapeKind::Triangle, Color::BLUE, 2).unwrap();
        canvas.render_shape((50, 250, 200, 400), ShapeKind::Square, Color::RED, 2).unwrap();
        canvas.render_shape((250, 250, 400, 400), ShapeKind::Rhombus, Color::CYAN, 2).unwrap();
        canvas
    }

    #[test]
    fn test_transforms_leave_canvas_untouched() {
        let canvas = combined_canvas();
        let before = canvas.image().clone();

        canvas.scale(1.5, 1.5).unwrap();
        canvas.rotate(45.0).unwrap();
        canvas.reflect(Axis::Horizontal);
        canvas.reflect(Axis::Vertical);
        canvas.shear(0.5, 0.2).unwrap();
        canvas.translate(100.0, 100.0).unwrap();
        canvas.crop((50, 50, 200, 150));

        assert_eq!(canvas.image(), &before);
    }

    #[test]
    fn test_warps_keep_canvas_size() {
        let canvas = combined_canvas();
        for transform in [
            Transform::Scale { scale_x: 1.5, scale_y: 1.5 },
            Transform::Rotate { angle: 45.0 },
            Transform::Shear { shear_x: 0.5, shear_y: 0.2 },
            Transform::Translate { tx: 100.0, ty: 100.0 },
        ] {
            let image = canvas.apply(&transform).unwrap();
            assert_eq!(image.dimensions(), (500, 500), "{transform} changed size");
            assert!(image.pixels().any(|p| p.0 != [0, 0, 0]), "{transform} lost all content");
        }
    }

    #[test]
    fn test_nearest_interpolation_rotation() {
        let canvas = combined_canvas().with_interpolation(Interpolation::Nearest);
        let rotated = canvas.rotate(90.0).unwrap();
        // The rectangle's top edge around (100, 50) turns onto the left half, x = 50
        assert_eq!(rotated.get_pixel(50, 400).0, [0, 255, 0]);
    }

    #[test]
    fn test_cropped_rectangle_region() {
        let canvas = combined_canvas();
        let cropped = canvas.crop((50, 50, 200, 150));
        assert_eq!(cropped.dimensions(), (150, 100));
        assert_eq!(cropped.get_pixel(50, 0).0, [0, 255, 0]);
        assert_eq!(cropped.get_pixel(50, 50).0, [0, 0, 0]);
    }
}
