use std::time::Duration;

use crate::foundation::error::{DrapeError, DrapeResult};
use crate::foundation::math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};

pub use kurbo::{Point, Rect, Size};

/// Presentation timestamp of a video frame, in whole microseconds.
///
/// Timestamps from a single video source are strictly increasing over time. Duplicate or older
/// values are how the scheduler recognizes that no new frame has arrived.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameTime(pub u64);

impl FrameTime {
    /// Timestamp at zero.
    pub const ZERO: Self = Self(0);

    /// Build from milliseconds.
    pub fn from_millis(ms: u64) -> Self {
        Self(ms.saturating_mul(1_000))
    }

    /// Build from fractional seconds, clamping negatives and NaN to zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        if !secs.is_finite() || secs <= 0.0 {
            return Self::ZERO;
        }
        Self((secs * 1_000_000.0).round() as u64)
    }

    /// Timestamp of frame `index` in a stream running at `fps`.
    pub fn for_frame(index: u64, fps: u32) -> Self {
        if fps == 0 {
            return Self::ZERO;
        }
        Self(index.saturating_mul(1_000_000) / u64::from(fps))
    }

    /// Value in seconds.
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Value in milliseconds (truncating).
    pub fn as_millis(self) -> u64 {
        self.0 / 1_000
    }

    /// Value as a [`Duration`].
    pub fn as_duration(self) -> Duration {
        Duration::from_micros(self.0)
    }
}

impl From<Duration> for FrameTime {
    fn from(d: Duration) -> Self {
        Self(u64::try_from(d.as_micros()).unwrap_or(u64::MAX))
    }
}

/// Drawable surface dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated non-empty canvas.
    pub fn new(width: u32, height: u32) -> DrapeResult<Self> {
        if width == 0 || height == 0 {
            return Err(DrapeError::validation("Canvas width and height must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// Return `true` when either side is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of bytes needed for tightly packed RGBA8 at this size.
    pub fn rgba_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }

    /// Size as floating-point `kurbo::Size`.
    pub fn size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

/// A frame as RGBA8 pixels.
///
/// Frames inside the pipeline are **premultiplied alpha**. The `premultiplied` flag is carried so
/// API boundaries (PNG export, external sinks) can convert explicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// A fully transparent premultiplied frame.
    pub fn blank(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0; canvas.rgba_len()],
            premultiplied: true,
        }
    }

    /// Wrap raw premultiplied RGBA8 bytes, checking the buffer length.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> DrapeResult<Self> {
        let canvas = Canvas { width, height };
        if data.len() != canvas.rgba_len() {
            return Err(DrapeError::validation(format!(
                "rgba buffer is {} bytes, expected {} for {width}x{height}",
                data.len(),
                canvas.rgba_len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            premultiplied: true,
        })
    }

    /// Convert a straight-alpha `image::RgbaImage` into a premultiplied frame.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let mut data = img.into_raw();
        premultiply_rgba8_in_place(&mut data);
        Self {
            width,
            height,
            data,
            premultiplied: true,
        }
    }

    /// Convert into a straight-alpha `image::RgbaImage`, e.g. for PNG export.
    pub fn to_rgba_image(&self) -> DrapeResult<image::RgbaImage> {
        let mut data = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut data);
        }
        image::RgbaImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| DrapeError::render("frame buffer does not match its dimensions"))
    }

    /// Surface dimensions of this frame.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Read one pixel, `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
