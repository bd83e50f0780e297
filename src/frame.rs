//! Raw frame-buffer descriptor shared with the host pipeline.
//!
//! Video frame rows are commonly padded, so the stride is kept explicit
//! instead of being hidden behind a packed-row container.

use image::{GrayImage, Luma};
use thiserror::Error;

/// A specialized `Result` type for frame descriptor construction.
pub type FrameResult<T> = Result<T, FrameError>;

/// The error type for invalid frame descriptors handed in by the host.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame buffer too small: {width}x{height} with stride {stride} needs {needed} bytes, got {actual}")]
    BufferTooSmall {
        width: u32,
        height: u32,
        stride: usize,
        needed: usize,
        actual: usize,
    },

    #[error("row stride {stride} is smaller than a packed row of {width} four-channel pixels")]
    StrideTooSmall { width: u32, stride: usize },
}

/// Pixel layouts delivered by host frame sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Bgra,
    Bgrx,
    Rgba,
    Nv12,
    I420,
    Yuy2,
}

impl PixelFormat {
    /// The engine only touches the two 4-channel interleaved BGRA-ordered
    /// layouts; everything else passes through untouched.
    pub fn is_supported(self) -> bool {
        matches!(self, PixelFormat::Bgra | PixelFormat::Bgrx)
    }
}

/// Borrowed view over one video frame.
///
/// The engine mutates the pixel data in place for the duration of a single
/// call and never takes ownership of the allocation; the caller retains
/// lifetime responsibility.
pub struct FrameBuffer<'a> {
    data: &'a mut [u8],
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
}

impl<'a> FrameBuffer<'a> {
    /// Wrap a raw host buffer, validating the descriptor geometry.
    pub fn from_raw(
        data: &'a mut [u8],
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
    ) -> FrameResult<Self> {
        if format.is_supported() && stride < width as usize * 4 {
            return Err(FrameError::StrideTooSmall { width, stride });
        }

        let needed = stride.saturating_mul(height as usize);
        if data.len() < needed {
            return Err(FrameError::BufferTooSmall {
                width,
                height,
                stride,
                needed,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            width,
            height,
            stride,
            format,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.data
    }

    /// Convert the BGRA/BGRX pixels to an 8-bit grayscale image for matching.
    ///
    /// Uses Rec.601 integer weights; the weights sum to 256, so achromatic
    /// pixels convert exactly. The frame buffer itself is never converted in
    /// place.
    pub(crate) fn to_gray(&self) -> GrayImage {
        let mut gray = GrayImage::new(self.width, self.height);
        for y in 0..self.height {
            let row = &self.data[y as usize * self.stride..][..self.width as usize * 4];
            for x in 0..self.width {
                let px = &row[x as usize * 4..][..4];
                let (b, g, r) = (u32::from(px[0]), u32::from(px[1]), u32::from(px[2]));
                let luma = (77 * r + 150 * g + 29 * b + 128) >> 8;
                gray.put_pixel(x, y, Luma([luma as u8]));
            }
        }
        gray
    }
}
