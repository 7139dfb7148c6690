use std::str::FromStr;

use image::{RgbImage, imageops::{self, FilterType}};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::error::{CanvasError, Result};

/// A whole-image operation producing a new image
pub trait ImageOperation: Send + Sync {
    fn apply(&self, image: &RgbImage) -> Result<RgbImage>;
}

#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq, Default
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResizeMethod {
    #[default]
    Linear,
    Nearest,
    /// Catmull-Rom cubic
    #[strum(to_string = "cubic", serialize = "polynomial")]
    Cubic,
}

impl ResizeMethod {
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| {
            CanvasError::InvalidValue(format!(
                "Invalid resize method '{name}'. Choose from {:?}",
                <Self as VariantNames>::VARIANTS
            ))
        })
    }

    fn filter(self) -> FilterType {
        match self {
            Self::Linear => FilterType::Triangle,
            Self::Nearest => FilterType::Nearest,
            Self::Cubic => FilterType::CatmullRom,
        }
    }
}

#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq, Default
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BlurKind {
    /// Normalized box (mean) filter
    #[default]
    Box,
    Gaussian,
}

impl BlurKind {
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| {
            CanvasError::InvalidValue(format!(
                "Invalid blur type '{name}'. Choose from {:?}",
                <Self as VariantNames>::VARIANTS
            ))
        })
    }

    /// Build the blur operation for a square kernel of `kernel_size`
    pub fn operation(self, kernel_size: u32) -> Box<dyn ImageOperation> {
        match self {
            Self::Box => Box::new(BoxBlur {
                kernel_width: kernel_size,
                kernel_height: kernel_size,
            }),
            Self::Gaussian => Box::new(GaussianBlur {
                kernel_size,
                sigma: 0.0,
            }),
        }
    }
}

/// Largest width or height a resize may produce
pub const MAX_RESIZE_DIMENSION: u32 = 1 << 16;

/// Resize by independent factors on each axis
#[derive(Debug, Clone)]
pub struct Resize {
    pub fx: f32,
    pub fy: f32,
    pub method: ResizeMethod,
}

impl Resize {
    pub fn target_size(&self, width: u32, height: u32) -> Result<(u32, u32)> {
        if !(self.fx > 0.0 && self.fy > 0.0) {
            return Err(CanvasError::InvalidValue(format!(
                "Resize factors must be positive, got fx={} fy={}",
                self.fx, self.fy
            )));
        }
        let scaled = |size: u32, factor: f32| {
            let target = (f64::from(size) * f64::from(factor)).round();
            if target > f64::from(MAX_RESIZE_DIMENSION) {
                return Err(CanvasError::InvalidValue(format!(
                    "Resize target {target} exceeds {MAX_RESIZE_DIMENSION} pixels"
                )));
            }
            Ok((target as u32).max(1))
        };
        Ok((scaled(width, self.fx)?, scaled(height, self.fy)?))
    }
}

impl ImageOperation for Resize {
    fn apply(&self, image: &RgbImage) -> Result<RgbImage> {
        let (width, height) = self.target_size(image.width(), image.height())?;
        Ok(imageops::resize(image, width, height, self.method.filter()))
    }
}

/// Mean filter over a `kernel_width x kernel_height` window
#[derive(Debug, Clone)]
pub struct BoxBlur {
    pub kernel_width: u32,
    pub kernel_height: u32,
}

impl Default for BoxBlur {
    fn default() -> Self {
        Self {
            kernel_width: 5,
            kernel_height: 5,
        }
    }
}

impl ImageOperation for BoxBlur {
    fn apply(&self, image: &RgbImage) -> Result<RgbImage> {
        if self.kernel_width == 0 || self.kernel_height == 0 {
            return Err(CanvasError::InvalidValue(
                "Box blur kernel must be at least 1x1".to_string(),
            ));
        }
        let h_kernel = vec![1.0 / self.kernel_width as f32; self.kernel_width as usize];
        let v_kernel = vec![1.0 / self.kernel_height as f32; self.kernel_height as usize];
        Ok(imageproc::filter::separable_filter(image, &h_kernel, &v_kernel))
    }
}

/// Gaussian blur; a non-positive `sigma` is derived from `kernel_size`
#[derive(Debug, Clone)]
pub struct GaussianBlur {
    pub kernel_size: u32,
    pub sigma: f32,
}

impl Default for GaussianBlur {
    fn default() -> Self {
        Self {
            kernel_size: 5,
            sigma: 0.0,
        }
    }
}

impl GaussianBlur {
    pub fn effective_sigma(&self) -> Result<f32> {
        if self.sigma > 0.0 {
            return Ok(self.sigma);
        }
        if self.kernel_size == 0 {
            return Err(CanvasError::InvalidValue(
                "Gaussian blur needs a positive sigma or kernel size".to_string(),
            ));
        }
        let derived = 0.3 * ((self.kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
        // A 1- or 2-pixel kernel derives a sigma too small to blur with
        Ok(derived.max(0.5))
    }
}

impl ImageOperation for GaussianBlur {
    fn apply(&self, image: &RgbImage) -> Result<RgbImage> {
        let sigma = self.effective_sigma()?;
        Ok(imageproc::filter::gaussian_blur_f32(image, sigma))
    }
}
