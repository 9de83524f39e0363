use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::buffer::{ImageBuffer, PixelFn, apply_to_buffer};
use crate::color::{Pixel, linear_to_pixel, pixel_to_linear};
use crate::error::{CoreError, Result};
use crate::stages::{ResolvedStage, StageInstance, StageKind};

// =============================================================================
// Pipeline
// =============================================================================

/// An ordered list of adjustment stages. Order is significant: stages run
/// front to back and are never reordered or deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    stages: Vec<StageInstance>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn from_stages(stages: Vec<StageInstance>) -> Self {
        Self { stages }
    }

    /// Append a stage and return its id.
    pub fn push(&mut self, kind: StageKind, value: f64) -> Uuid {
        let stage = StageInstance::with_value(kind, value);
        let id = stage.id;
        self.stages.push(stage);
        id
    }

    /// Builder-style append.
    pub fn with_stage(mut self, kind: StageKind, value: f64) -> Self {
        self.push(kind, value);
        self
    }

    /// Insert a stage at `index`, clamped to the end of the list.
    pub fn insert(&mut self, index: usize, stage: StageInstance) {
        let index = index.min(self.stages.len());
        self.stages.insert(index, stage);
    }

    pub fn remove(&mut self, id: Uuid) -> Result<StageInstance> {
        let idx = self.position(id)?;
        Ok(self.stages.remove(idx))
    }

    /// Move a stage so it ends up at `to_index` (clamped to the last slot).
    pub fn move_stage(&mut self, id: Uuid, to_index: usize) -> Result<()> {
        let from = self.position(id)?;
        let stage = self.stages.remove(from);
        let to = to_index.min(self.stages.len());
        self.stages.insert(to, stage);
        Ok(())
    }

    pub fn set_value(&mut self, id: Uuid, value: f64) -> Result<()> {
        let idx = self.position(id)?;
        self.stages[idx].value = value;
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Option<&StageInstance> {
        self.stages.iter().find(|s| s.id == id)
    }

    pub fn stages(&self) -> &[StageInstance] {
        &self.stages
    }

    /// Stage kinds in application order.
    pub fn order(&self) -> Vec<StageKind> {
        self.stages.iter().map(|s| s.kind).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    fn position(&self, id: Uuid) -> Result<usize> {
        self.stages
            .iter()
            .position(|s| s.id == id)
            .ok_or(CoreError::StageNotFound(id))
    }
}

// =============================================================================
// Composition
// =============================================================================

/// A pipeline folded into a single per-pixel function.
///
/// Each pixel is decoded to linear light once, passed through every resolved
/// stage in order, then encoded, clamped and rounded once.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedPipeline {
    stages: Vec<ResolvedStage>,
}

impl ComposedPipeline {
    pub fn apply_pixel(&self, px: Pixel) -> Pixel {
        let rgb = self
            .stages
            .iter()
            .fold(pixel_to_linear(px), |rgb, stage| stage.apply(rgb));
        linear_to_pixel(rgb)
    }

    /// Number of stages that survived identity elimination.
    pub fn active_stages(&self) -> usize {
        self.stages.len()
    }
}

impl PixelFn for ComposedPipeline {
    fn map_pixel(&self, px: Pixel) -> Pixel {
        self.apply_pixel(px)
    }

    // No active stages still round-trips through the transfer functions,
    // which is exact for 8-bit input.
    fn is_identity(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Build the per-pixel function for `pipeline`, resolving every stage once.
/// Stages whose value is neutral are skipped.
pub fn compose(pipeline: &Pipeline) -> ComposedPipeline {
    let stages = pipeline
        .stages()
        .iter()
        .filter(|s| !s.is_identity())
        .map(|s| {
            trace!(kind = s.kind.display_name(), value = s.value, "Resolving stage");
            ResolvedStage::resolve(s.kind, s.value)
        })
        .collect();
    ComposedPipeline { stages }
}

/// Run the full pipeline over a source buffer, returning a new buffer.
pub fn run_pipeline(src: &ImageBuffer, pipeline: &Pipeline) -> ImageBuffer {
    let composed = compose(pipeline);
    debug!(
        width = src.width(),
        height = src.height(),
        stages = pipeline.len(),
        active = composed.active_stages(),
        "Running adjustment pipeline"
    );
    apply_to_buffer(src, &composed)
}

// =============================================================================
// Tests
// =============================================================================
