//! Color frames and pixel encodings

use std::fmt;
use std::str::FromStr;

use image::{GrayImage, Luma, Rgb};
use serde::{Deserialize, Serialize};

use crate::error::FrameDecodeError;

type Result<T> = std::result::Result<T, FrameDecodeError>;

/// Channel layout of a frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelEncoding {
    Rgb8,
    Bgr8,
    Rgba8,
    Bgra8,
    Mono8,
}

impl PixelEncoding {
    /// Bytes per pixel
    pub fn channels(self) -> usize {
        match self {
            PixelEncoding::Mono8 => 1,
            PixelEncoding::Rgb8 | PixelEncoding::Bgr8 => 3,
            PixelEncoding::Rgba8 | PixelEncoding::Bgra8 => 4,
        }
    }

    /// Transport label, e.g. `"bgr8"`
    pub fn as_str(self) -> &'static str {
        match self {
            PixelEncoding::Rgb8 => "rgb8",
            PixelEncoding::Bgr8 => "bgr8",
            PixelEncoding::Rgba8 => "rgba8",
            PixelEncoding::Bgra8 => "bgra8",
            PixelEncoding::Mono8 => "mono8",
        }
    }

    // Byte offsets of (r, g, b) inside one pixel
    fn rgb_offsets(self) -> Option<[usize; 3]> {
        match self {
            PixelEncoding::Rgb8 | PixelEncoding::Rgba8 => Some([0, 1, 2]),
            PixelEncoding::Bgr8 | PixelEncoding::Bgra8 => Some([2, 1, 0]),
            PixelEncoding::Mono8 => None,
        }
    }
}

impl FromStr for PixelEncoding {
    type Err = FrameDecodeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rgb8" => Ok(PixelEncoding::Rgb8),
            "bgr8" => Ok(PixelEncoding::Bgr8),
            "rgba8" => Ok(PixelEncoding::Rgba8),
            "bgra8" => Ok(PixelEncoding::Bgra8),
            "mono8" | "8uc1" => Ok(PixelEncoding::Mono8),
            _ => Err(FrameDecodeError::UnsupportedEncoding(s.to_string())),
        }
    }
}

impl fmt::Display for PixelEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 8-bit frame, row-major and tightly packed
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    encoding: PixelEncoding,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap a packed buffer, checking its length against the dimensions
    pub fn new(
        width: usize,
        height: usize,
        encoding: PixelEncoding,
        data: Vec<u8>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FrameDecodeError::InvalidDimensions { width, height });
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(encoding.channels()))
            .ok_or(FrameDecodeError::InvalidDimensions { width, height })?;
        if data.len() != expected {
            return Err(FrameDecodeError::BufferSize {
                expected,
                got: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            encoding,
            data,
        })
    }

    /// Build a frame from rows that may carry trailing padding
    ///
    /// `step` is the number of bytes between the starts of two rows.
    pub fn from_rows(
        width: usize,
        height: usize,
        encoding: PixelEncoding,
        step: usize,
        data: &[u8],
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FrameDecodeError::InvalidDimensions { width, height });
        }
        let row_bytes = width * encoding.channels();
        if step < row_bytes {
            return Err(FrameDecodeError::InvalidStep {
                step,
                min: row_bytes,
            });
        }
        // The last row does not need its padding.
        let expected = step * (height - 1) + row_bytes;
        if data.len() < expected {
            return Err(FrameDecodeError::BufferSize {
                expected,
                got: data.len(),
            });
        }

        let mut packed = Vec::with_capacity(row_bytes * height);
        for row in data.chunks(step).take(height) {
            packed.extend_from_slice(&row[..row_bytes]);
        }
        Self::new(width, height, encoding, packed)
    }

    /// Frame with every pixel set to `color`
    pub fn filled(width: usize, height: usize, encoding: PixelEncoding, color: Rgb<u8>) -> Self {
        let mut frame = Self {
            width,
            height,
            encoding,
            data: vec![0; width * height * encoding.channels()],
        };
        for y in 0..height {
            for x in 0..width {
                frame.put_rgb(x, y, color);
            }
        }
        frame
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn encoding(&self) -> PixelEncoding {
        self.encoding
    }

    /// Raw packed bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Bytes per row
    pub fn step(&self) -> usize {
        self.width * self.encoding.channels()
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * self.encoding.channels()
    }

    /// Read a pixel as RGB (mono frames replicate the gray value)
    pub fn rgb(&self, x: usize, y: usize) -> Rgb<u8> {
        let base = self.offset(x, y);
        match self.encoding.rgb_offsets() {
            Some([r, g, b]) => Rgb([
                self.data[base + r],
                self.data[base + g],
                self.data[base + b],
            ]),
            None => {
                let v = self.data[base];
                Rgb([v, v, v])
            }
        }
    }

    /// Write an RGB color in the frame's own channel order
    ///
    /// Mono frames receive the color's luma. Alpha channels are left untouched.
    pub fn put_rgb(&mut self, x: usize, y: usize, color: Rgb<u8>) {
        let base = self.offset(x, y);
        match self.encoding.rgb_offsets() {
            Some([r, g, b]) => {
                self.data[base + r] = color[0];
                self.data[base + g] = color[1];
                self.data[base + b] = color[2];
            }
            None => {
                self.data[base] = luma(color).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    /// 8-bit BT.601 luma plane
    pub fn to_luma8(&self) -> GrayImage {
        let channels = self.encoding.channels();
        let (w, h) = (self.width as u32, self.height as u32);
        match self.encoding.rgb_offsets() {
            None => GrayImage::from_fn(w, h, |x, y| {
                Luma([self.data[y as usize * self.width + x as usize]])
            }),
            Some([r, g, b]) => GrayImage::from_fn(w, h, |x, y| {
                let base = (y as usize * self.width + x as usize) * channels;
                let v = luma(Rgb([
                    self.data[base + r],
                    self.data[base + g],
                    self.data[base + b],
                ]));
                Luma([v.round().clamp(0.0, 255.0) as u8])
            }),
        }
    }
}

/// ITU-R BT.601 luma
fn luma(color: Rgb<u8>) -> f32 {
    0.299 * color[0] as f32 + 0.587 * color[1] as f32 + 0.114 * color[2] as f32
}
