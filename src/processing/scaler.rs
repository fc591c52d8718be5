use std::path::{Path, PathBuf};

use fast_image_resize as fir;
use image::{ImageReader, RgbaImage};
use tracing::{debug, info};

use crate::error::Error;
use crate::events::DisplaySelection;
use crate::geometry::MonitorGeometry;
use crate::processing::layout::{Anchor, anchor_offset, fit_within};

/// Decoded source image, read-only after load.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub path: PathBuf,
    pub pixels: RgbaImage,
}

impl SourceImage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(Error::ImageNotFound { path });
        }

        let decode_err = |source: image::ImageError| Error::ImageDecode {
            path: path.clone(),
            source,
        };
        let reader = ImageReader::open(&path)
            .and_then(ImageReader::with_guessed_format)
            .map_err(|err| decode_err(image::ImageError::IoError(err)))?;
        let pixels = reader.decode().map_err(decode_err)?.to_rgba8();
        debug!(
            path = %path.display(),
            width = pixels.width(),
            height = pixels.height(),
            "decoded source image"
        );
        Ok(Self { path, pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// A source image fitted to the target monitor.
///
/// `offset_x`/`offset_y` place the scaled pixels inside the monitor rectangle.
#[derive(Debug, Clone)]
pub struct ScaledImage {
    pub pixels: RgbaImage,
    pub width: u32,
    pub height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

pub fn scale(
    image: &SourceImage,
    rect: &MonitorGeometry,
    anchor: Anchor,
) -> Result<ScaledImage, Error> {
    let (width, height) = fit_within(image.width(), image.height(), rect.width, rect.height);
    let (offset_x, offset_y) = anchor_offset(anchor, width, height, rect.width, rect.height);
    let pixels = resize_rgba(&image.pixels, width, height).map_err(|reason| Error::Resize {
        path: image.path.clone(),
        reason,
    })?;
    Ok(ScaledImage {
        pixels,
        width,
        height,
        offset_x,
        offset_y,
    })
}

fn resize_rgba(source: &RgbaImage, target_w: u32, target_h: u32) -> Result<RgbaImage, String> {
    if source.width() == 0 || source.height() == 0 {
        return Err("source image has no pixels".to_string());
    }
    if source.width() == target_w && source.height() == target_h {
        return Ok(source.clone());
    }

    let src_view = fir::images::ImageRef::new(
        source.width(),
        source.height(),
        source.as_raw(),
        fir::PixelType::U8x4,
    )
    .map_err(|err| format!("invalid source buffer: {err}"))?;
    let mut dst_image = fir::images::Image::new(target_w, target_h, fir::PixelType::U8x4);
    let options = fir::ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Lanczos3));
    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_view, &mut dst_image, Some(&options))
        .map_err(|err| err.to_string())?;
    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| "resized buffer does not match target size".to_string())
}

/// The two renditions, computed once for the resolved monitor.
#[derive(Debug, Clone)]
pub struct ImagePair {
    images: [ScaledImage; 2],
}

impl ImagePair {
    pub fn new(first: ScaledImage, second: ScaledImage) -> Self {
        Self {
            images: [first, second],
        }
    }

    pub fn load(
        paths: &[PathBuf; 2],
        rect: &MonitorGeometry,
        anchor: Anchor,
    ) -> Result<Self, Error> {
        let [first, second] = paths;
        Ok(Self::new(
            load_scaled(first, rect, anchor)?,
            load_scaled(second, rect, anchor)?,
        ))
    }

    pub fn get(&self, selection: DisplaySelection) -> &ScaledImage {
        &self.images[selection.index()]
    }
}

fn load_scaled(path: &Path, rect: &MonitorGeometry, anchor: Anchor) -> Result<ScaledImage, Error> {
    let source = SourceImage::open(path)?;
    let scaled = scale(&source, rect, anchor)?;
    info!(
        path = %path.display(),
        source = %format!("{}x{}", source.width(), source.height()),
        width = scaled.width,
        height = scaled.height,
        offset_x = scaled.offset_x,
        offset_y = scaled.offset_y,
        "prepared image"
    );
    Ok(scaled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn geometry(width: u32, height: u32) -> MonitorGeometry {
        MonitorGeometry {
            name: "HDMI-1".into(),
            width,
            height,
            origin_x: 0,
            origin_y: 0,
        }
    }

    fn solid(width: u32, height: u32) -> SourceImage {
        SourceImage {
            path: PathBuf::from("solid.png"),
            pixels: RgbaImage::from_pixel(width, height, Rgba([200, 40, 10, 255])),
        }
    }

    #[test]
    fn equal_ratio_fills_rect_without_offsets() {
        let scaled = scale(&solid(1600, 900), &geometry(1920, 1080), Anchor::Center).unwrap();
        assert_eq!((scaled.width, scaled.height), (1920, 1080));
        assert_eq!((scaled.offset_x, scaled.offset_y), (0, 0));
        assert_eq!(scaled.pixels.dimensions(), (1920, 1080));
    }

    #[test]
    fn wide_image_is_letterboxed() {
        let scaled = scale(&solid(1000, 500), &geometry(1920, 1080), Anchor::Center).unwrap();
        assert_eq!((scaled.width, scaled.height), (1920, 960));
        assert_eq!((scaled.offset_x, scaled.offset_y), (0, 60));
    }

    #[test]
    fn top_left_anchor_pins_offsets() {
        let scaled = scale(&solid(1000, 500), &geometry(1920, 1080), Anchor::TopLeft).unwrap();
        assert_eq!((scaled.width, scaled.height), (1920, 960));
        assert_eq!((scaled.offset_x, scaled.offset_y), (0, 0));
    }

    #[test]
    fn scaling_is_repeatable() {
        let source = solid(640, 480);
        let rect = geometry(800, 480);
        let a = scale(&source, &rect, Anchor::Center).unwrap();
        let b = scale(&source, &rect, Anchor::Center).unwrap();
        assert_eq!(
            (a.width, a.height, a.offset_x, a.offset_y),
            (b.width, b.height, b.offset_x, b.offset_y)
        );
        assert_eq!(a.pixels, b.pixels);
    }

    #[test]
    fn resampling_preserves_flat_color() {
        let scaled = scale(&solid(37, 23), &geometry(400, 300), Anchor::Center).unwrap();
        let px = scaled.pixels.get_pixel(scaled.width / 2, scaled.height / 2);
        for (got, want) in px.0.iter().zip([200u8, 40, 10, 255]) {
            assert!(got.abs_diff(want) <= 1, "{:?}", px.0);
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = SourceImage::open("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, Error::ImageNotFound { .. }));
    }

    #[test]
    fn garbage_file_fails_to_decode() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"this is not an image")?;
        let err = SourceImage::open(&path).unwrap_err();
        assert!(matches!(err, Error::ImageDecode { .. }));
        Ok(())
    }
}
