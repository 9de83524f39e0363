use kernelscope_core::buffer::ImageBuffer;
use kernelscope_core::color::Pixel;
use kernelscope_core::kernel::SamplePatch;
use kernelscope_core::pipeline::Pipeline;
use kernelscope_core::preset::Preset;
use kernelscope_core::stages::StageKind;

/// Builder for test ImageBuffers with sensible defaults.
pub struct ImageBufferBuilder {
    width: u32,
    height: u32,
    fill: Pixel,
    overrides: Vec<(u32, u32, Pixel)>,
}

impl ImageBufferBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fill: [128, 128, 128],
            overrides: Vec::new(),
        }
    }

    pub fn fill(mut self, px: Pixel) -> Self {
        self.fill = px;
        self
    }

    pub fn pixel(mut self, x: u32, y: u32, px: Pixel) -> Self {
        self.overrides.push((x, y, px));
        self
    }

    pub fn build(self) -> ImageBuffer {
        ImageBuffer::from_fn(self.width, self.height, |x, y| {
            self.overrides
                .iter()
                .rev()
                .find(|(ox, oy, _)| *ox == x && *oy == y)
                .map(|(_, _, px)| *px)
                .unwrap_or(self.fill)
        })
    }
}

/// A horizontal red ramp over a vertical green ramp with constant blue.
/// Covers the full 0..=255 range on both axes when the image is 256 wide/tall.
pub fn gradient(width: u32, height: u32, blue: u8) -> ImageBuffer {
    let ramp = |i: u32, n: u32| {
        if n <= 1 {
            0
        } else {
            ((i as u64 * 255) / (n as u64 - 1)) as u8
        }
    };
    ImageBuffer::from_fn(width, height, |x, y| [ramp(x, width), ramp(y, height), blue])
}

/// Builder for ordered pipelines.
#[derive(Default)]
pub struct PipelineBuilder {
    pipeline: Pipeline,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn brightness(self, value: f64) -> Self {
        self.stage(StageKind::Brightness, value)
    }

    pub fn contrast(self, value: f64) -> Self {
        self.stage(StageKind::Contrast, value)
    }

    pub fn saturation(self, value: f64) -> Self {
        self.stage(StageKind::Saturation, value)
    }

    pub fn vibrance(self, value: f64) -> Self {
        self.stage(StageKind::Vibrance, value)
    }

    pub fn hue(self, degrees: f64) -> Self {
        self.stage(StageKind::Hue, degrees)
    }

    pub fn stage(mut self, kind: StageKind, value: f64) -> Self {
        self.pipeline.push(kind, value);
        self
    }

    pub fn build(self) -> Pipeline {
        self.pipeline
    }

    pub fn build_preset(self, name: &str) -> Preset {
        Preset::new(name).with_pipeline(self.pipeline)
    }
}

/// Build a square sample patch from rows of grey levels (R = G = B).
pub struct PatchBuilder {
    rows: Vec<Vec<Pixel>>,
}

impl PatchBuilder {
    pub fn grey<const N: usize>(rows: &[[u8; N]; N]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|r| r.iter().map(|&v| [v, v, v]).collect())
                .collect(),
        }
    }

    /// An `n`x`n` patch where every pixel is `px`.
    pub fn uniform(n: usize, px: Pixel) -> Self {
        Self {
            rows: vec![vec![px; n]; n],
        }
    }

    pub fn build(self) -> SamplePatch {
        SamplePatch::from_rows(&self.rows).expect("invalid sample patch in test builder")
    }
}
