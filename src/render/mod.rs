//! Turns a [`Figure`] into pixels: PNG/JPEG export and the interactive window.

pub mod canvas;
pub mod font;
pub mod projection;
pub mod raster;
#[cfg(feature = "viewer")]
pub mod viewer;

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageError};
use log::info;
use thiserror::Error;

use crate::scene::Figure;

pub use canvas::Canvas;
pub use raster::{rasterize, rasterize_sized};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write {}: {source}", path.display())]
    Export { path: PathBuf, source: ImageError },
    #[error("resolution must be finite and positive, got {0}")]
    Resolution(f64),
    #[cfg(feature = "viewer")]
    #[error("failed to open window: {0}")]
    Window(#[from] winit::error::OsError),
    #[cfg(feature = "viewer")]
    #[error("rendering surface error: {0}")]
    Surface(#[from] pixels::Error),
    #[cfg(feature = "viewer")]
    #[error("failed to resize surface: {0}")]
    Texture(#[from] pixels::TextureError),
}

fn check_resolution(dpi: f64) -> Result<(), RenderError> {
    if dpi.is_finite() && dpi > 0.0 {
        Ok(())
    } else {
        Err(RenderError::Resolution(dpi))
    }
}

/// Writes the figure to `path`; the format follows the file extension.
pub fn export<P: AsRef<Path>>(figure: &Figure, path: P, dpi: f64) -> Result<(), RenderError> {
    check_resolution(dpi)?;
    let path = path.as_ref();
    let canvas = rasterize(figure, dpi);
    let (width, height) = (canvas.width(), canvas.height());
    // drop alpha so formats without it (jpeg) work too
    let rgb = DynamicImage::ImageRgba8(canvas.into_image()).into_rgb8();
    rgb.save(path).map_err(|source| RenderError::Export {
        path: path.to_path_buf(),
        source,
    })?;
    info!("wrote {width}x{height} figure to {}", path.display());
    Ok(())
}

impl Figure {
    pub fn export<P: AsRef<Path>>(&self, path: P, dpi: f64) -> Result<(), RenderError> {
        export(self, path, dpi)
    }

    /// Opens the interactive window and blocks until it is closed.
    #[cfg(feature = "viewer")]
    pub fn display(&mut self, dpi: f64) -> Result<(), RenderError> {
        viewer::display(self, dpi)
    }
}
