use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;

use crate::config::PoseEngineConfig;
use crate::foundation::core::FrameTime;
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::pose::landmark::PoseFrame;
use crate::pose::provider::{PoseEngine, PoseReply};
use crate::video::VideoFrame;

/// Recorded pose estimates, sorted by timestamp.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PoseTrack {
    frames: Vec<PoseFrame>,
}

impl PoseTrack {
    /// A track from frames in any order.
    pub fn new(mut frames: Vec<PoseFrame>) -> Self {
        frames.sort_by_key(|f| f.timestamp);
        Self { frames }
    }

    /// Read a JSON array of pose frames.
    pub fn from_json_file(path: &Path) -> DrapeResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read pose track '{}'", path.display()))?;
        let frames: Vec<PoseFrame> = serde_json::from_str(&text)
            .map_err(|e| DrapeError::validation(format!("pose track json: {e}")))?;
        Ok(Self::new(frames))
    }

    /// Number of recorded frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the track has no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The most recent recorded pose at or before `ts`.
    pub fn at(&self, ts: FrameTime) -> Option<&PoseFrame> {
        let idx = self.frames.partition_point(|f| f.timestamp <= ts);
        idx.checked_sub(1).map(|i| &self.frames[i])
    }
}

/// A [`PoseEngine`] that answers from a recorded [`PoseTrack`].
///
/// With `latency` set, each answer is delivered from a worker thread after the delay, which
/// exercises the same asynchronous path a real inference engine takes.
#[derive(Debug)]
pub struct ReplayEngine {
    track: Arc<PoseTrack>,
    latency: Option<Duration>,
    initialized: bool,
}

impl ReplayEngine {
    /// Answer synchronously from `track`.
    pub fn new(track: PoseTrack) -> Self {
        Self {
            track: Arc::new(track),
            latency: None,
            initialized: false,
        }
    }

    /// Deliver each answer from a worker thread after `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }
}

impl PoseEngine for ReplayEngine {
    fn initialize(&mut self, config: &PoseEngineConfig) -> DrapeResult<()> {
        if self.track.is_empty() {
            return Err(DrapeError::engine_init("pose track is empty"));
        }
        tracing::debug!(
            model = %config.model_asset_path,
            frames = self.track.len(),
            "replay engine initialized"
        );
        self.initialized = true;
        Ok(())
    }

    fn submit(&mut self, _frame: &VideoFrame, timestamp: FrameTime, reply: PoseReply) {
        if !self.initialized {
            reply.complete(None);
            return;
        }
        match self.latency {
            None => reply.complete(self.track.at(timestamp).cloned()),
            Some(latency) => {
                let track = Arc::clone(&self.track);
                std::thread::spawn(move || {
                    std::thread::sleep(latency);
                    reply.complete(track.at(timestamp).cloned());
                });
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pose/replay.rs"]
mod tests;
