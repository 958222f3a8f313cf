//! Image files to and from [`Frame`]s

use std::path::Path;

use brn_core::{Frame, FrameDecodeError, PixelEncoding};
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use tracing::{debug, instrument};

use crate::error::Result;

/// Read an image file as an `rgb8` frame
pub fn read_frame<P: AsRef<Path>>(path: P) -> Result<Frame> {
    read_frame_as(path, PixelEncoding::Rgb8)
}

/// Read an image file, converting it to `encoding`
#[instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_frame_as<P: AsRef<Path>>(path: P, encoding: PixelEncoding) -> Result<Frame> {
    let decoded = image::open(path.as_ref())?;
    let (width, height) = (decoded.width() as usize, decoded.height() as usize);

    let data = match encoding {
        PixelEncoding::Rgb8 => decoded.to_rgb8().into_raw(),
        PixelEncoding::Rgba8 => decoded.to_rgba8().into_raw(),
        PixelEncoding::Mono8 => decoded.to_luma8().into_raw(),
        PixelEncoding::Bgr8 => swap_red_blue(decoded.to_rgb8().into_raw(), 3),
        PixelEncoding::Bgra8 => swap_red_blue(decoded.to_rgba8().into_raw(), 4),
    };
    debug!(width, height, %encoding, "decoded image");

    Ok(Frame::new(width, height, encoding, data)?)
}

/// Write a frame; the file format follows the path's extension
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn write_frame<P: AsRef<Path>>(path: P, frame: &Frame) -> Result<()> {
    let (w, h) = (frame.width() as u32, frame.height() as u32);
    let data = frame.data().to_vec();
    let short = || FrameDecodeError::BufferSize {
        expected: frame.step() * frame.height(),
        got: frame.data().len(),
    };

    let image = match frame.encoding() {
        PixelEncoding::Rgb8 => {
            DynamicImage::ImageRgb8(RgbImage::from_raw(w, h, data).ok_or_else(short)?)
        }
        PixelEncoding::Bgr8 => DynamicImage::ImageRgb8(
            RgbImage::from_raw(w, h, swap_red_blue(data, 3)).ok_or_else(short)?,
        ),
        PixelEncoding::Rgba8 => {
            DynamicImage::ImageRgba8(RgbaImage::from_raw(w, h, data).ok_or_else(short)?)
        }
        PixelEncoding::Bgra8 => DynamicImage::ImageRgba8(
            RgbaImage::from_raw(w, h, swap_red_blue(data, 4)).ok_or_else(short)?,
        ),
        PixelEncoding::Mono8 => {
            DynamicImage::ImageLuma8(GrayImage::from_raw(w, h, data).ok_or_else(short)?)
        }
    };

    image.save(path.as_ref())?;
    debug!(width = w, height = h, "wrote image");
    Ok(())
}

fn swap_red_blue(mut data: Vec<u8>, channels: usize) -> Vec<u8> {
    for px in data.chunks_exact_mut(channels) {
        px.swap(0, 2);
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::tempdir;

    fn sample() -> Frame {
        let mut frame = Frame::filled(6, 4, PixelEncoding::Bgr8, Rgb([255, 255, 255]));
        frame.put_rgb(1, 2, Rgb([200, 10, 30]));
        frame
    }

    #[test]
    fn test_write_then_read_keeps_colors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("frame.png");
        write_frame(&path, &sample()).unwrap();

        let back = read_frame(&path).unwrap();
        assert_eq!(back.encoding(), PixelEncoding::Rgb8);
        assert_eq!((back.width(), back.height()), (6, 4));
        assert_eq!(back.rgb(1, 2), Rgb([200, 10, 30]));
        assert_eq!(back.rgb(0, 0), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_read_as_bgr_and_mono() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("frame.png");
        write_frame(&path, &sample()).unwrap();

        let bgr = read_frame_as(&path, PixelEncoding::Bgr8).unwrap();
        assert_eq!(bgr.rgb(1, 2), Rgb([200, 10, 30]));
        assert_eq!(&bgr.data()[(2 * 6 + 1) * 3..][..3], &[30, 10, 200]);

        let mono = read_frame_as(&path, PixelEncoding::Mono8).unwrap();
        assert_eq!(mono.data().len(), 24);
        assert_eq!(mono.data()[0], 255);
    }

    #[test]
    fn test_write_mono() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gray.png");
        let frame =
            Frame::new(3, 2, PixelEncoding::Mono8, vec![0, 50, 100, 150, 200, 250]).unwrap();
        write_frame(&path, &frame).unwrap();

        let back = read_frame_as(&path, PixelEncoding::Mono8).unwrap();
        assert_eq!(back.data(), frame.data());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert!(read_frame(dir.path().join("absent.png")).is_err());
    }
}
