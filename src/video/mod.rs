//! Video frame sources.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::foundation::core::{Canvas, FrameRGBA, FrameTime};
use crate::foundation::error::{DrapeError, DrapeResult};

pub(crate) mod sequence;

pub use sequence::ImageSequenceSource;

/// One decoded video frame.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoFrame {
    /// Presentation timestamp.
    pub timestamp: FrameTime,
    /// Premultiplied pixels, shared with engines running on other threads.
    pub image: Arc<FrameRGBA>,
}

impl VideoFrame {
    /// Wrap a decoded image.
    pub fn new(timestamp: FrameTime, image: FrameRGBA) -> Self {
        Self {
            timestamp,
            image: Arc::new(image),
        }
    }

    /// Frame dimensions.
    pub fn canvas(&self) -> Canvas {
        self.image.canvas()
    }
}

/// Stream properties reported on open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VideoInfo {
    /// Frame dimensions.
    pub canvas: Canvas,
    /// Nominal frame rate when known.
    pub fps: Option<u32>,
}

/// Result of asking a source for its next frame.
#[derive(Clone, Debug, PartialEq)]
pub enum FramePoll {
    /// A frame, possibly repeating an earlier timestamp.
    Frame(VideoFrame),
    /// Nothing new yet; try again next tick.
    Pending,
    /// The stream is over or the source was closed.
    Ended,
}

/// A camera or any other producer of timestamped frames.
pub trait VideoSource {
    /// Acquire the device. Access problems are reported as [`DrapeError::CameraUnavailable`].
    fn open(&mut self) -> DrapeResult<VideoInfo>;

    /// Poll for the next frame without blocking.
    fn next_frame(&mut self) -> FramePoll;

    /// Release the device. Safe to call more than once.
    fn close(&mut self);
}

/// Frames held in memory, handed out in order. Used for tests and embedding.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    frames: VecDeque<Option<VideoFrame>>,
    denied: bool,
    open: bool,
    opens: u32,
}

impl MemorySource {
    /// A source playing `frames` in order.
    pub fn new(frames: impl IntoIterator<Item = VideoFrame>) -> Self {
        Self {
            frames: frames.into_iter().map(Some).collect(),
            ..Self::default()
        }
    }

    /// A source whose `open` always fails, like a camera with permission denied.
    pub fn denied() -> Self {
        Self {
            denied: true,
            ..Self::default()
        }
    }

    /// Queue one more frame.
    pub fn push(&mut self, frame: VideoFrame) {
        self.frames.push_back(Some(frame));
    }

    /// Queue one poll that reports [`FramePoll::Pending`].
    pub fn push_gap(&mut self) {
        self.frames.push_back(None);
    }

    /// Whether `open` succeeded and `close` has not been called.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// How many times `open` succeeded.
    pub fn opens(&self) -> u32 {
        self.opens
    }
}

impl VideoSource for MemorySource {
    fn open(&mut self) -> DrapeResult<VideoInfo> {
        if self.denied {
            return Err(DrapeError::camera_unavailable("permission denied"));
        }
        let canvas = self
            .frames
            .iter()
            .flatten()
            .next()
            .map(VideoFrame::canvas)
            .ok_or_else(|| DrapeError::camera_unavailable("no frames available"))?;
        self.open = true;
        self.opens += 1;
        Ok(VideoInfo { canvas, fps: None })
    }

    fn next_frame(&mut self) -> FramePoll {
        if !self.open {
            return FramePoll::Ended;
        }
        match self.frames.pop_front() {
            Some(Some(f)) => FramePoll::Frame(f),
            Some(None) => FramePoll::Pending,
            None => FramePoll::Ended,
        }
    }

    fn close(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/video/memory.rs"]
mod tests;
