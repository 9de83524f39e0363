use std::fs;
use std::path::Path;

use semver::Version;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::kernel::{ChannelSelector, Kernel};
use crate::pipeline::Pipeline;

/// Version written into every saved preset file.
pub const CURRENT_PRESET_VERSION: &str = "1.0.0";

/// Oldest preset file version this build can read.
pub const MIN_PRESET_VERSION: &str = "1.0.0";

/// Kernel-explorer state saved alongside a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorerSettings {
    pub kernel: Kernel,
    pub channel: ChannelSelector,
    /// Top-left corner of the sample patch.
    pub patch_x: u32,
    pub patch_y: u32,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            kernel: Kernel::sharpen(),
            channel: ChannelSelector::default(),
            patch_x: 0,
            patch_y: 0,
        }
    }
}

/// A named adjustment pipeline plus explorer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub pipeline: Pipeline,
    #[serde(default)]
    pub explorer: ExplorerSettings,
}

/// On-disk wrapper carrying the format version.
#[derive(Debug, Serialize, Deserialize)]
struct PresetFile {
    version: String,
    preset: Preset,
}

impl Preset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pipeline: Pipeline::new(),
            explorer: ExplorerSettings::default(),
        }
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn to_json(&self) -> Result<String> {
        let file = PresetFile {
            version: CURRENT_PRESET_VERSION.to_string(),
            preset: self.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_str(json)?;
        let got = raw
            .get("version")
            .and_then(|v| v.as_str())
            .ok_or_else(|| CoreError::InvalidPresetFile("missing version field".into()))?;
        check_version(got)?;
        let file: PresetFile = serde_json::from_value(raw)?;
        Ok(file.preset)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), name = %self.name, "Saving preset");
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading preset");
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

fn parse_version(s: &str) -> Result<Version> {
    Version::parse(s).map_err(|e| CoreError::InvalidPresetFile(format!("bad version {s:?}: {e}")))
}

fn check_version(got: &str) -> Result<()> {
    let version = parse_version(got)?;
    if version > parse_version(CURRENT_PRESET_VERSION)? {
        return Err(CoreError::VersionTooNew {
            got: got.to_string(),
            max: CURRENT_PRESET_VERSION.to_string(),
        });
    }
    if version < parse_version(MIN_PRESET_VERSION)? {
        return Err(CoreError::VersionTooOld {
            got: got.to_string(),
            min: MIN_PRESET_VERSION.to_string(),
        });
    }
    Ok(())
}
