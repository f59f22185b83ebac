//! Session configuration.
//!
//! Every section has a `Default` matching the tuned production values, so an empty JSON object is
//! a valid config file.

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{DrapeError, DrapeResult};

/// Garment size relative to the subject's shoulder span.
pub const MASTER_SCALE: f64 = 2.2;

/// Fraction of torso height the garment is raised above the shoulder line (collar position).
pub const COLLAR_OFFSET: f64 = 0.1;

/// Top-level configuration for a try-on session.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Placement tuning.
    pub solver: SolverParams,
    /// Pose engine initialization options.
    pub engine: PoseEngineConfig,
    /// Requested capture settings.
    pub video: VideoConfig,
    /// Compositor behavior.
    pub overlay: OverlayConfig,
}

impl SessionConfig {
    /// Read and validate a JSON config file.
    pub fn from_json_file(path: &Path) -> DrapeResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Parse and validate a JSON config string.
    pub fn from_json_str(text: &str) -> DrapeResult<Self> {
        let cfg: Self = serde_json::from_str(text)
            .map_err(|e| DrapeError::validation(format!("config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every section for values the pipeline cannot honor.
    pub fn validate(&self) -> DrapeResult<()> {
        self.solver.validate()?;
        self.engine.validate()?;
        self.video.validate()?;
        Ok(())
    }
}

/// Tunable constants of the placement solver.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SolverParams {
    /// Multiplier applied to the shoulder span to get the garment width.
    pub master_scale: f64,
    /// Fraction of torso height used as the collar offset.
    pub collar_offset: f64,
    /// Landmarks whose visibility is known and below this value count as absent.
    pub min_visibility: f32,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            master_scale: MASTER_SCALE,
            collar_offset: COLLAR_OFFSET,
            min_visibility: 0.0,
        }
    }
}

impl SolverParams {
    /// Reject non-finite or out-of-range tuning values.
    pub fn validate(&self) -> DrapeResult<()> {
        if !self.master_scale.is_finite() || self.master_scale <= 0.0 {
            return Err(DrapeError::validation(
                "solver.master_scale must be finite and > 0",
            ));
        }
        if !self.collar_offset.is_finite() {
            return Err(DrapeError::validation("solver.collar_offset must be finite"));
        }
        if !(0.0..=1.0).contains(&self.min_visibility) {
            return Err(DrapeError::validation(
                "solver.min_visibility must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Hardware delegate requested from the pose engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delegate {
    /// Run inference on the CPU.
    Cpu,
    /// Run inference on the GPU when available.
    #[default]
    Gpu,
}

/// How the pose engine is fed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunningMode {
    /// Independent still images.
    Image,
    /// Frames of one stream, with increasing timestamps.
    #[default]
    Video,
}

/// Options passed to [`crate::PoseEngine::initialize`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PoseEngineConfig {
    /// Model file the engine loads.
    pub model_asset_path: String,
    /// Hardware delegate.
    pub delegate: Delegate,
    /// Input mode.
    pub running_mode: RunningMode,
    /// Maximum number of poses per frame. Only single-subject tracking is supported.
    pub num_poses: u32,
}

impl Default for PoseEngineConfig {
    fn default() -> Self {
        Self {
            model_asset_path: "pose_landmarker_lite.task".to_string(),
            delegate: Delegate::Gpu,
            running_mode: RunningMode::Video,
            num_poses: 1,
        }
    }
}

impl PoseEngineConfig {
    /// Reject an empty model path or a pose count other than one.
    pub fn validate(&self) -> DrapeResult<()> {
        if self.num_poses != 1 {
            return Err(DrapeError::validation("engine.num_poses must be 1"));
        }
        if self.model_asset_path.trim().is_empty() {
            return Err(DrapeError::validation(
                "engine.model_asset_path must be non-empty",
            ));
        }
        Ok(())
    }
}

/// Capture request. Sources treat width/height as a preference, not a guarantee.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Preferred capture width in pixels.
    pub ideal_width: u32,
    /// Preferred capture height in pixels.
    pub ideal_height: u32,
    /// Frame rate used when a source has no native timestamps.
    pub fps: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            ideal_width: 640,
            ideal_height: 480,
            fps: 30,
        }
    }
}

impl VideoConfig {
    /// Reject zero dimensions or frame rate.
    pub fn validate(&self) -> DrapeResult<()> {
        if self.fps == 0 {
            return Err(DrapeError::validation("video.fps must be > 0"));
        }
        if self.ideal_width == 0 || self.ideal_height == 0 {
            return Err(DrapeError::validation(
                "video.ideal_width and video.ideal_height must be > 0",
            ));
        }
        Ok(())
    }
}

/// What to draw on ticks that see no new video frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPersistence {
    /// Draw the raw frame only until a strictly newer timestamp has been processed.
    #[default]
    DropOnSkip,
    /// Keep drawing the last placement on skipped ticks.
    HoldLast,
}

/// Compositor settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Overlay behavior on ticks without a new frame.
    pub persistence: OverlayPersistence,
    /// Straight-alpha RGBA8 color the surface is cleared to before each tick.
    pub clear_rgba: [u8; 4],
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            persistence: OverlayPersistence::DropOnSkip,
            clear_rgba: [0, 0, 0, 0],
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
