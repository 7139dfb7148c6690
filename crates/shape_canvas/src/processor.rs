use std::path::Path;

use image::{GrayImage, Luma, RgbImage};
use tracing::info;

use crate::{
    error::{CanvasError, Result},
    filters::{BlurKind, ImageOperation, Resize, ResizeMethod},
    io,
};

/// Default binarization threshold
pub const DEFAULT_THRESHOLD: u8 = 128;

/// Holds a loaded image and the grayscale / binary images derived from it.
///
/// Derived images are discarded whenever the source image changes.
#[derive(Debug, Clone, Default)]
pub struct ImageProcessor {
    image: Option<RgbImage>,
    gray: Option<GrayImage>,
    binary: Option<GrayImage>,
}

impl ImageProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a processor from an image file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut processor = Self::new();
        processor.load_image(path)?;
        Ok(processor)
    }

    /// Load an image from file, replacing any current one
    pub fn load_image<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.set_image(io::load_image(path)?);
        Ok(())
    }

    /// Load an image from memory
    pub fn load_image_from_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let image = image::load_from_memory(bytes)?;
        self.set_image(image.to_rgb8());
        Ok(())
    }

    /// Set the image directly
    pub fn set_image(&mut self, image: RgbImage) {
        self.image = Some(image);
        self.gray = None;
        self.binary = None;
    }

    pub fn image(&self) -> Result<&RgbImage> {
        self.image.as_ref().ok_or(CanvasError::NoImageLoaded)
    }

    /// Replace the image with the result of `operation`
    pub fn apply(&mut self, operation: &dyn ImageOperation) -> Result<&RgbImage> {
        let processed = operation.apply(self.image()?)?;
        self.set_image(processed);
        self.image()
    }

    pub fn resize(&mut self, fx: f32, fy: f32, method: ResizeMethod) -> Result<&RgbImage> {
        self.apply(&Resize { fx, fy, method })?;
        let (height, width, _) = self.dimensions()?;
        info!("Resized image dimensions: {}x{}", width, height);
        self.image()
    }

    pub fn blur(&mut self, kind: BlurKind, kernel_size: u32) -> Result<&RgbImage> {
        let operation = kind.operation(kernel_size);
        self.apply(operation.as_ref())?;
        info!("Applied {} blurring", kind);
        self.image()
    }

    /// `(height, width, channels)` of the current image
    pub fn dimensions(&self) -> Result<(u32, u32, u8)> {
        let image = self.image()?;
        Ok((image.height(), image.width(), 3))
    }

    pub fn pixel_count(&self) -> Result<u64> {
        let (height, width, _) = self.dimensions()?;
        Ok(u64::from(height) * u64::from(width))
    }

    /// Rec.601 luma of the current image, cached until the image changes
    pub fn to_grayscale(&mut self) -> Result<&GrayImage> {
        if self.gray.is_none() {
            self.gray = Some(luma_601(self.image()?));
        }
        self.gray.as_ref().ok_or(CanvasError::NoImageLoaded)
    }

    /// Binarize the grayscale image: intensities above `threshold` become 255,
    /// everything else 0
    pub fn to_binary(&mut self, threshold: u8) -> Result<&GrayImage> {
        let binary = imageproc::contrast::threshold(self.to_grayscale()?, threshold);
        self.binary = Some(binary);
        self.binary.as_ref().ok_or(CanvasError::NoBinaryImage)
    }

    /// Number of zero-valued pixels in the last binary image
    pub fn count_black_pixels(&self) -> Result<u64> {
        let binary = self.binary.as_ref().ok_or(CanvasError::NoBinaryImage)?;
        Ok(binary.pixels().filter(|p| p.0[0] == 0).count() as u64)
    }

    /// Write the current image to disk
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        io::save_image(self.image()?, path)
    }
}

/// `0.299 R + 0.587 G + 0.114 B` in 14-bit fixed point, rounded.
///
/// `imageops::grayscale` weighs channels by Rec.709 instead, which shifts
/// binarization results for saturated colours.
fn luma_601(image: &RgbImage) -> GrayImage {
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        let luma = (u32::from(r) * R + u32::from(g) * G + u32::from(b) * B + (1 << 13)) >> 14;
        Luma([luma as u8])
    })
}
