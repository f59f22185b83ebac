use std::path::{Path, PathBuf};

use crate::foundation::core::{Canvas, FrameRGBA, FrameTime};
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::video::{FramePoll, VideoFrame, VideoInfo, VideoSource};

const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp"];

/// Plays a directory of still images as a video stream at a fixed frame rate.
///
/// Files are ordered by name; frame `i` gets timestamp `i / fps`.
#[derive(Debug)]
pub struct ImageSequenceSource {
    dir: PathBuf,
    fps: u32,
    files: Vec<PathBuf>,
    next: usize,
    open: bool,
}

impl ImageSequenceSource {
    /// Play images in `dir` at `fps`.
    pub fn new(dir: impl Into<PathBuf>, fps: u32) -> Self {
        Self {
            dir: dir.into(),
            fps,
            files: Vec::new(),
            next: 0,
            open: false,
        }
    }

    /// Number of frames found on open.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no frames were found.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn list_frames(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_frame = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        if is_frame && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn load_frame(path: &Path) -> DrapeResult<FrameRGBA> {
    let img = image::open(path)
        .map_err(|e| DrapeError::decode(format!("frame '{}': {e}", path.display())))?;
    Ok(FrameRGBA::from_rgba_image(img.to_rgba8()))
}

impl VideoSource for ImageSequenceSource {
    fn open(&mut self) -> DrapeResult<VideoInfo> {
        if self.fps == 0 {
            return Err(DrapeError::validation("image sequence fps must be > 0"));
        }
        let files = list_frames(&self.dir).map_err(|e| {
            DrapeError::camera_unavailable(format!("open '{}': {e}", self.dir.display()))
        })?;
        let first = files.first().ok_or_else(|| {
            DrapeError::camera_unavailable(format!("no frames in '{}'", self.dir.display()))
        })?;
        let (width, height) = image::image_dimensions(first)
            .map_err(|e| DrapeError::camera_unavailable(format!("probe '{}': {e}", first.display())))?;

        self.files = files;
        self.next = 0;
        self.open = true;
        tracing::debug!(dir = %self.dir.display(), frames = self.files.len(), "image sequence opened");
        Ok(VideoInfo {
            canvas: Canvas::new(width, height)?,
            fps: Some(self.fps),
        })
    }

    fn next_frame(&mut self) -> FramePoll {
        if !self.open {
            return FramePoll::Ended;
        }
        let Some(path) = self.files.get(self.next) else {
            return FramePoll::Ended;
        };
        let index = self.next as u64;
        self.next += 1;
        match load_frame(path) {
            Ok(image) => FramePoll::Frame(VideoFrame::new(
                FrameTime::for_frame(index, self.fps),
                image,
            )),
            Err(err) => {
                tracing::warn!(error = %err, "skipping undecodable frame");
                FramePoll::Pending
            }
        }
    }

    fn close(&mut self) {
        self.open = false;
        self.files.clear();
        self.next = 0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/video/sequence.rs"]
mod tests;
