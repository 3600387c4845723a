//! Writing a figure to disk, with the filesystem behind a trait so the
//! switch-off path and the written bytes can be observed in tests.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::figure::{Figure, POINTS_PER_INCH};
use crate::error::{FigureError, FigureResult};
use crate::render::{RenderFrame, Renderer, SvgRenderer};

/// Filesystem operations used by [`save_figure_with`].
pub trait FigureFileSystem {
    fn dir_exists(&self, path: &Path) -> bool;
    fn create_dir_all(&mut self, path: &Path) -> io::Result<()>;
    fn write(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// [`FigureFileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FigureFileSystem for StdFileSystem {
    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&mut self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn write(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        std::fs::write(path, bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveOptions {
    /// Output directory, created when missing.
    pub directory: PathBuf,
    /// Raster resolution; vector output ignores it.
    pub dpi: u32,
    /// Crop the page to the drawn content.
    pub tight_bbox: bool,
    /// Margin kept around the content when cropping, in inches.
    pub pad_inches: f64,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("figure/"),
            dpi: 1000,
            tight_bbox: true,
            pad_inches: 0.1,
        }
    }
}

/// Output encodings chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Svg,
    Png,
}

impl ImageFormat {
    pub fn from_path(path: &Path) -> FigureResult<Self> {
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("svg") => Ok(Self::Svg),
            Some("png") => Ok(Self::Png),
            Some(other) => Err(FigureError::UnsupportedFormat(other.to_owned())),
            None => Err(FigureError::UnsupportedFormat(format!(
                "`{}` has no file extension",
                path.display()
            ))),
        }
    }
}

/// Saves through the real filesystem. See [`save_figure_with`].
pub fn save_figure(
    enabled: bool,
    figure: &Figure,
    relative_path: impl AsRef<Path>,
    options: &SaveOptions,
) -> FigureResult<Option<PathBuf>> {
    save_figure_with(&mut StdFileSystem, enabled, figure, relative_path, options)
}

/// Renders `figure` and writes it to `options.directory / relative_path`.
///
/// With `enabled == false` nothing is touched and `Ok(None)` is returned.
pub fn save_figure_with<F: FigureFileSystem>(
    fs: &mut F,
    enabled: bool,
    figure: &Figure,
    relative_path: impl AsRef<Path>,
    options: &SaveOptions,
) -> FigureResult<Option<PathBuf>> {
    if !enabled {
        return Ok(None);
    }
    if options.dpi == 0 {
        return Err(FigureError::InvalidArgument("dpi must be > 0".to_owned()));
    }
    if !options.pad_inches.is_finite() || options.pad_inches < 0.0 {
        return Err(FigureError::InvalidArgument(
            "pad_inches must be finite and >= 0".to_owned(),
        ));
    }

    let path = options.directory.join(relative_path.as_ref());
    let format = ImageFormat::from_path(&path)?;

    let mut frame = figure.build_render_frame()?;
    if options.tight_bbox {
        frame = frame.cropped_to_content(options.pad_inches * POINTS_PER_INCH);
    }
    let bytes = encode(&frame, format, options.dpi)?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        if !fs.dir_exists(parent) {
            debug!(directory = %parent.display(), "creating output directory");
            fs.create_dir_all(parent).inspect_err(|err| {
                warn!(directory = %parent.display(), error = %err, "failed to create output directory");
            })?;
        }
    }
    fs.write(&path, &bytes).inspect_err(|err| {
        warn!(path = %path.display(), error = %err, "failed to write figure");
    })?;

    debug!(
        path = %path.display(),
        format = ?format,
        dpi = options.dpi,
        bytes = bytes.len(),
        "saved figure"
    );
    Ok(Some(path))
}

fn encode(frame: &RenderFrame, format: ImageFormat, dpi: u32) -> FigureResult<Vec<u8>> {
    match format {
        ImageFormat::Svg => {
            let mut renderer = SvgRenderer::new();
            renderer.render(frame)?;
            Ok(renderer.into_document().into_bytes())
        }
        ImageFormat::Png => encode_png(frame, dpi),
    }
}

#[cfg(feature = "cairo-backend")]
fn encode_png(frame: &RenderFrame, dpi: u32) -> FigureResult<Vec<u8>> {
    let mut renderer = crate::render::CairoRenderer::new(dpi)?;
    renderer.render(frame)?;
    renderer.encode_png()
}

#[cfg(not(feature = "cairo-backend"))]
fn encode_png(_frame: &RenderFrame, _dpi: u32) -> FigureResult<Vec<u8>> {
    Err(FigureError::UnsupportedFormat(
        "png output needs the `cairo-backend` feature".to_owned(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension_case_insensitively() {
        assert_eq!(ImageFormat::from_path(Path::new("a/b.SVG")).expect("svg"), ImageFormat::Svg);
        assert_eq!(ImageFormat::from_path(Path::new("plot.png")).expect("png"), ImageFormat::Png);
        assert!(matches!(
            ImageFormat::from_path(Path::new("plot.bmp")),
            Err(FigureError::UnsupportedFormat(_))
        ));
        assert!(ImageFormat::from_path(Path::new("plot")).is_err());
    }

    #[test]
    fn defaults_match_publication_settings() {
        let options = SaveOptions::default();
        assert_eq!(options.directory, PathBuf::from("figure/"));
        assert_eq!(options.dpi, 1000);
        assert!(options.tight_bbox);
    }
}
