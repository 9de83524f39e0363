use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::buffer::ImageBuffer;
use crate::color::{Pixel, luma};
use crate::error::{CoreError, Result};

// =============================================================================
// Kernel
// =============================================================================

/// A square convolution kernel with odd side length. Row-major weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawKernel")]
pub struct Kernel {
    size: usize,
    weights: Vec<f64>,
}

// Deserialized kernels go through the same validation as `Kernel::new`.
#[derive(Deserialize)]
struct RawKernel {
    size: usize,
    weights: Vec<f64>,
}

impl TryFrom<RawKernel> for Kernel {
    type Error = CoreError;

    fn try_from(raw: RawKernel) -> Result<Self> {
        Kernel::new(raw.size, raw.weights)
    }
}

impl Kernel {
    /// Creates a kernel from row-major weights.
    ///
    /// `size` must be odd and `weights` must hold `size * size` values.
    pub fn new(size: usize, weights: Vec<f64>) -> Result<Self> {
        if size == 0 || size % 2 == 0 {
            return Err(CoreError::InvalidKernel(format!(
                "kernel size must be odd, got {size}"
            )));
        }
        if weights.len() != size * size {
            return Err(CoreError::InvalidKernel(format!(
                "kernel data size {} doesn't match {}x{}",
                weights.len(),
                size,
                size
            )));
        }
        Ok(Self { size, weights })
    }

    /// Creates a kernel from nested rows. Every row must be as long as the
    /// number of rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let size = rows.len();
        if let Some(row) = rows.iter().find(|r| r.len() != size) {
            return Err(CoreError::InvalidKernel(format!(
                "kernel must be square: {} rows but a row of length {}",
                size,
                row.len()
            )));
        }
        Self::new(size, rows.concat())
    }

    /// Leaves the centre sample unchanged.
    pub fn identity(size: usize) -> Result<Self> {
        let mut k = Self::new(size, vec![0.0; size * size])?;
        let c = size / 2;
        k.weights[c * size + c] = 1.0;
        Ok(k)
    }

    /// Simple average.
    pub fn box_blur(size: usize) -> Result<Self> {
        let count = size * size;
        Self::new(size, vec![1.0 / count as f64; count])
    }

    /// Normalised Gaussian with standard deviation `sigma`.
    pub fn gaussian(size: usize, sigma: f64) -> Result<Self> {
        if sigma.is_nan() || sigma <= 0.0 {
            return Err(CoreError::InvalidKernel(format!(
                "gaussian sigma must be positive, got {sigma}"
            )));
        }
        let half = (size / 2) as i64;
        let two_sigma_sq = 2.0 * sigma * sigma;
        let mut weights = Vec::with_capacity(size * size);
        for y in -half..=half {
            for x in -half..=half {
                weights.push((-((x * x + y * y) as f64) / two_sigma_sq).exp());
            }
        }
        let sum: f64 = weights.iter().sum();
        for w in &mut weights {
            *w /= sum;
        }
        Self::new(size, weights)
    }

    pub fn sharpen() -> Self {
        Self::fixed3([0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0])
    }

    /// Laplacian edge detector.
    pub fn edge_detect() -> Self {
        Self::fixed3([-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0])
    }

    pub fn sobel_x() -> Self {
        Self::fixed3([-1.0, 0.0, 1.0, -2.0, 0.0, 2.0, -1.0, 0.0, 1.0])
    }

    pub fn sobel_y() -> Self {
        Self::fixed3([-1.0, -2.0, -1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 1.0])
    }

    pub fn emboss() -> Self {
        Self::fixed3([-2.0, -1.0, 0.0, -1.0, 1.0, 1.0, 0.0, 1.0, 2.0])
    }

    fn fixed3(weights: [f64; 9]) -> Self {
        Self {
            size: 3,
            weights: weights.to_vec(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.weights[row * self.size + col]
    }
}

// =============================================================================
// SamplePatch
// =============================================================================

/// Which scalar of each patch pixel the kernel weights multiply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelSelector {
    Red,
    Green,
    Blue,
    /// Rec.709 luma of the encoded channel values.
    #[default]
    Luminance,
}

impl ChannelSelector {
    pub fn sample(&self, px: Pixel) -> f64 {
        match self {
            Self::Red => px[0] as f64,
            Self::Green => px[1] as f64,
            Self::Blue => px[2] as f64,
            Self::Luminance => luma(px),
        }
    }
}

/// A read-only square snapshot of image pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePatch {
    size: usize,
    pixels: Vec<Pixel>,
}

impl SamplePatch {
    pub fn from_rows(rows: &[Vec<Pixel>]) -> Result<Self> {
        let size = rows.len();
        if size == 0 {
            return Err(CoreError::InvalidDimensions("sample patch is empty".into()));
        }
        if rows.iter().any(|r| r.len() != size) {
            return Err(CoreError::InvalidDimensions(format!(
                "sample patch must be square with {size} columns per row"
            )));
        }
        Ok(Self {
            size,
            pixels: rows.concat(),
        })
    }

    /// Copy a `size`x`size` region whose top-left corner is at (x, y).
    ///
    /// The offset is pulled back so the patch never runs past the image edge.
    /// Fails if the image is smaller than the patch in either direction.
    pub fn extract(image: &ImageBuffer, x: u32, y: u32, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(CoreError::InvalidDimensions("sample patch is empty".into()));
        }
        let (w, h) = (image.width() as usize, image.height() as usize);
        if size > w || size > h {
            return Err(CoreError::InvalidDimensions(format!(
                "{size}x{size} patch does not fit in {w}x{h} image"
            )));
        }
        let x0 = (x as usize).min(w - size);
        let y0 = (y as usize).min(h - size);
        debug!(x = x0, y = y0, size, "Extracting sample patch");

        let mut pixels = Vec::with_capacity(size * size);
        for py in y0..y0 + size {
            for px in x0..x0 + size {
                pixels.push(image.pixel(px as u32, py as u32));
            }
        }
        Ok(Self { size, pixels })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> Pixel {
        self.pixels[row * self.size + col]
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }
}

// =============================================================================
// Product matrix
// =============================================================================

/// Per-cell products of kernel weights and patch samples. Not normalised.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductMatrix {
    size: usize,
    cells: Vec<f64>,
}

impl ProductMatrix {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cells[row * self.size + col]
    }

    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.cells.chunks(self.size).map(|r| r.to_vec()).collect()
    }

    /// Sum of all cells: the convolution response at the patch centre.
    pub fn sum(&self) -> f64 {
        self.cells.iter().sum()
    }
}

/// Multiply each kernel weight by the selected channel of the patch pixel
/// under it.
pub fn kernel_products(
    kernel: &Kernel,
    patch: &SamplePatch,
    channel: ChannelSelector,
) -> Result<ProductMatrix> {
    if kernel.size != patch.size {
        return Err(CoreError::DimensionMismatch {
            kernel: kernel.size,
            patch: patch.size,
        });
    }
    let cells = kernel
        .weights
        .iter()
        .zip(&patch.pixels)
        .map(|(w, px)| w * channel.sample(*px))
        .collect();
    Ok(ProductMatrix {
        size: kernel.size,
        cells,
    })
}
