use std::path::PathBuf;

use anyhow::Context as _;

use crate::foundation::core::{FrameRGBA, FrameTime};
use crate::foundation::error::DrapeResult;

/// Receives each finished surface, once per tick, in tick order.
pub trait FrameSink {
    /// Take one composed surface. Called once per tick, in timestamp order.
    fn present(&mut self, timestamp: FrameTime, frame: &FrameRGBA) -> DrapeResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    frames: Vec<(FrameTime, FrameRGBA)>,
}

impl InMemorySink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Presented frames in tick order.
    pub fn frames(&self) -> &[(FrameTime, FrameRGBA)] {
        &self.frames
    }
}

impl FrameSink for InMemorySink {
    fn present(&mut self, timestamp: FrameTime, frame: &FrameRGBA) -> DrapeResult<()> {
        self.frames.push((timestamp, frame.clone()));
        Ok(())
    }
}

/// Writes every presented surface as `frame_000000.png`, `frame_000001.png`, ...
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    written: u64,
}

impl PngSequenceSink {
    /// Write into `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> DrapeResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create output dir '{}'", dir.display()))?;
        Ok(Self { dir, written: 0 })
    }

    /// Number of files written.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn present(&mut self, _timestamp: FrameTime, frame: &FrameRGBA) -> DrapeResult<()> {
        let path = self.dir.join(format!("frame_{:06}.png", self.written));
        frame
            .to_rgba_image()?
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))?;
        self.written += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/sink.rs"]
mod tests;
