use std::{fs, ops::Deref, path::Path};

use image::{EncodableLayout, ImageBuffer, PixelWithColorType, RgbImage};
use tracing::info;

use crate::error::{CanvasError, Result};

/// Read an image file as 8-bit RGB
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(CanvasError::ImageNotFound {
            path: path.to_path_buf(),
        });
    }
    let image = image::open(path)?.to_rgb8();
    info!("Read image {:?} ({}x{})", path, image.width(), image.height());
    Ok(image)
}

/// Write an image, choosing the encoder from the file extension.
///
/// Missing parent directories are created.
pub fn save_image<Px, C, P>(image: &ImageBuffer<Px, C>, path: P) -> Result<()>
where
    Px: PixelWithColorType,
    [Px::Subpixel]: EncodableLayout,
    C: Deref<Target = [Px::Subpixel]>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    image.save(path)?;
    info!("Image saved to {:?}", path);
    Ok(())
}
