use rayon::prelude::*;
use tracing::debug;

use crate::color::Pixel;
use crate::error::{CoreError, Result};

/// Bytes per pixel in an [`ImageBuffer`].
pub const CHANNELS: usize = 3;

// =============================================================================
// ImageBuffer
// =============================================================================

/// An owned RGB pixel buffer. 3 bytes per pixel, row-major.
///
/// Buffers are never modified after construction; transforms always produce
/// a new buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ImageBuffer {
    /// Create a black buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0, 0, 0])
    }

    /// Create a buffer where every pixel has the same value.
    pub fn filled(width: u32, height: u32, px: Pixel) -> Self {
        let data = px.repeat(width as usize * height as usize);
        Self {
            width,
            height,
            data,
        }
    }

    /// Create from existing RGB data.
    pub fn from_rgb_vec(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(CoreError::InvalidDimensions(format!(
                "RGB data length {} doesn't match {}x{}x{}={}",
                data.len(),
                width,
                height,
                CHANNELS,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create from decoded RGBA data, discarding alpha.
    pub fn from_rgba_vec(width: u32, height: u32, data: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(CoreError::InvalidDimensions(format!(
                "RGBA data length {} doesn't match {}x{}x4={}",
                data.len(),
                width,
                height,
                expected
            )));
        }
        let rgb = data
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        Ok(Self {
            width,
            height,
            data: rgb,
        })
    }

    /// Build a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Pixel) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw row-major RGB bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Get pixel RGB at (x, y). Panics if out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} buffer",
            self.width,
            self.height
        );
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    /// Iterate pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        self.data.chunks_exact(CHANNELS).map(|px| [px[0], px[1], px[2]])
    }
}

// =============================================================================
// PixelFn trait
// =============================================================================

/// A per-pixel mapping with no neighbourhood dependence. Implementors are
/// shared read-only across worker threads.
pub trait PixelFn: Send + Sync {
    fn map_pixel(&self, px: Pixel) -> Pixel;

    /// Returns true if the mapping is known to leave every pixel unchanged.
    /// Used to skip work.
    fn is_identity(&self) -> bool {
        false
    }
}

impl<F> PixelFn for F
where
    F: Fn(Pixel) -> Pixel + Send + Sync,
{
    fn map_pixel(&self, px: Pixel) -> Pixel {
        self(px)
    }
}

// =============================================================================
// Buffer adapter
// =============================================================================

/// Map `f` over every pixel of `src`, producing a new buffer of the same size.
/// `src` is left untouched.
pub fn apply_to_buffer<F>(src: &ImageBuffer, f: &F) -> ImageBuffer
where
    F: PixelFn + ?Sized,
{
    debug!(
        width = src.width,
        height = src.height,
        identity = f.is_identity(),
        "Applying per-pixel function"
    );

    if f.is_identity() || src.is_empty() {
        return src.clone();
    }

    let mut data = vec![0u8; src.data.len()];
    let row_bytes = src.width as usize * CHANNELS;

    // Row-based parallelism to avoid rayon micro-task overhead
    data.par_chunks_exact_mut(row_bytes)
        .zip(src.data.par_chunks_exact(row_bytes))
        .for_each(|(dst_row, src_row)| {
            for (dst, s) in dst_row
                .chunks_exact_mut(CHANNELS)
                .zip(src_row.chunks_exact(CHANNELS))
            {
                dst.copy_from_slice(&f.map_pixel([s[0], s[1], s[2]]));
            }
        });

    ImageBuffer {
        width: src.width,
        height: src.height,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_imagebuffer_new() {
        let buf = ImageBuffer::new(4, 3);
        assert_eq!(buf.width(), 4);
        assert_eq!(buf.height(), 3);
        assert_eq!(buf.data().len(), 4 * 3 * 3);
        assert!(buf.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_imagebuffer_into_data() {
        let buf = ImageBuffer::from_rgb_vec(1, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(buf.into_data(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_imagebuffer_filled() {
        let buf = ImageBuffer::filled(2, 2, [10, 20, 30]);
        assert!(buf.pixels().all(|px| px == [10, 20, 30]));
    }

    #[test]
    fn test_imagebuffer_from_rgb_vec() {
        let buf = ImageBuffer::from_rgb_vec(2, 1, vec![255, 0, 0, 0, 255, 0]).unwrap();
        assert_eq!(buf.pixel(0, 0), [255, 0, 0]);
        assert_eq!(buf.pixel(1, 0), [0, 255, 0]);
    }

    #[test]
    fn test_imagebuffer_from_rgb_vec_wrong_size() {
        let err = ImageBuffer::from_rgb_vec(2, 2, vec![0; 10]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDimensions(_)));
        assert!(err.to_string().contains("RGB data length 10"));
    }

    #[test]
    fn test_imagebuffer_from_rgba_drops_alpha() {
        let buf = ImageBuffer::from_rgba_vec(2, 1, &[1, 2, 3, 255, 4, 5, 6, 0]).unwrap();
        assert_eq!(buf.data(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_imagebuffer_from_rgba_wrong_size() {
        assert!(ImageBuffer::from_rgba_vec(1, 1, &[1, 2, 3]).is_err());
    }

    #[test]
    fn test_imagebuffer_from_fn_row_major() {
        let buf = ImageBuffer::from_fn(3, 2, |x, y| [x as u8, y as u8, 0]);
        assert_eq!(buf.pixel(2, 0), [2, 0, 0]);
        assert_eq!(buf.pixel(1, 1), [1, 1, 0]);
        assert_eq!(&buf.data()[..6], &[0, 0, 0, 1, 0, 0]);
    }

    #[test]
    #[should_panic(expected = "outside 2x2 buffer")]
    fn test_pixel_out_of_bounds_panics() {
        ImageBuffer::new(2, 2).pixel(2, 0);
    }

    #[test]
    fn test_apply_to_buffer_maps_every_pixel() {
        let src = ImageBuffer::from_fn(5, 4, |x, y| [x as u8 * 10, y as u8 * 10, 7]);
        let invert = |px: Pixel| [255 - px[0], 255 - px[1], 255 - px[2]];
        let out = apply_to_buffer(&src, &invert);
        assert_eq!(out.width(), 5);
        assert_eq!(out.height(), 4);
        for y in 0..4 {
            for x in 0..5 {
                assert_eq!(out.pixel(x, y), invert(src.pixel(x, y)));
            }
        }
    }

    #[test]
    fn test_apply_to_buffer_leaves_source_untouched() {
        let src = ImageBuffer::filled(3, 3, [100, 150, 200]);
        let before = src.clone();
        let _ = apply_to_buffer(&src, &|_px: Pixel| [0, 0, 0]);
        assert_eq!(src, before);
    }

    #[test]
    fn test_apply_to_buffer_empty() {
        let src = ImageBuffer::new(0, 0);
        let out = apply_to_buffer(&src, &|_px: Pixel| [1, 2, 3]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_apply_to_buffer_dyn_pixel_fn() {
        let src = ImageBuffer::filled(2, 1, [1, 1, 1]);
        let f: Box<dyn PixelFn> = Box::new(|px: Pixel| [px[0] + 1, px[1], px[2]]);
        let out = apply_to_buffer(&src, f.as_ref());
        assert_eq!(out.pixel(1, 0), [2, 1, 1]);
    }
}
