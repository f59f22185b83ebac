use std::sync::Arc;

use crate::assets::garment::GarmentAsset;
use crate::foundation::core::{Canvas, FrameRGBA};
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::foundation::math::{PremulRgba8, premultiply_rgba8_in_place};
use crate::render::surface::{blit_over, draw_full, fill};
use crate::solver::placement::Placement;

/// Largest side a garment is resampled to in one piece. Larger placements are sampled only
/// where they cover the surface.
const MAX_WHOLE_RESAMPLE_SIDE: i64 = 8192;

/// A garment to draw and where.
#[derive(Clone, Copy, Debug)]
pub struct Overlay<'a> {
    /// Decoded garment image.
    pub garment: &'a GarmentAsset,
    /// Where the garment goes, in surface pixels.
    pub placement: Placement,
}

/// Per-tick composition statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompositorStats {
    /// Ticks composed.
    pub frames_composed: u64,
    /// Overlays that reached the surface.
    pub overlays_drawn: u64,
    /// Garment resamples (cache misses).
    pub garment_resamples: u64,
}

/// Integer pixel rectangle; may extend far past the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Region {
    x: i64,
    y: i64,
    width: i64,
    height: i64,
}

impl Region {
    /// The part of `self` inside a `width`x`height` surface.
    fn clip(self, width: u32, height: u32) -> Option<Region> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.x.saturating_add(self.width).min(i64::from(width));
        let y1 = self.y.saturating_add(self.height).min(i64::from(height));
        (x0 < x1 && y0 < y1).then_some(Region {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

#[derive(Debug)]
struct ScaledGarment {
    reference: String,
    source_px: Arc<Vec<u8>>,
    target: Region,
    /// Sampled part of the target, relative to its top-left. `None` when resampled whole.
    window: Option<Region>,
    patch_width: u32,
    patch_height: u32,
    rgba8_premul: Vec<u8>,
}

/// Draws video frames and garment overlays into a double-buffered surface.
///
/// Each [`Compositor::compose`] call clears the back buffer, draws the frame at full size, draws
/// the overlay if any, then swaps. Readers only ever see the front buffer, so a partially drawn
/// tick is never visible.
#[derive(Debug)]
pub struct Compositor {
    clear: PremulRgba8,
    front: FrameRGBA,
    back: FrameRGBA,
    scaled: Option<ScaledGarment>,
    stats: CompositorStats,
}

impl Compositor {
    /// `clear_rgba` is straight alpha.
    pub fn new(clear_rgba: [u8; 4]) -> Self {
        let mut clear = clear_rgba;
        premultiply_rgba8_in_place(&mut clear);
        let empty = Canvas {
            width: 0,
            height: 0,
        };
        Self {
            clear,
            front: FrameRGBA::blank(empty),
            back: FrameRGBA::blank(empty),
            scaled: None,
            stats: CompositorStats::default(),
        }
    }

    /// The last fully composed surface.
    pub fn front(&self) -> &FrameRGBA {
        &self.front
    }

    /// Counters since construction.
    pub fn stats(&self) -> CompositorStats {
        self.stats
    }

    /// Compose one tick and return the new front buffer.
    ///
    /// The surface follows the frame's dimensions. The overlay is clipped to the surface, so
    /// placements of any size cost at most one surface worth of resampling. An overlay that
    /// rounds to an empty rectangle or lies entirely off the surface draws nothing.
    pub fn compose(
        &mut self,
        frame: &FrameRGBA,
        overlay: Option<Overlay<'_>>,
    ) -> DrapeResult<&FrameRGBA> {
        if frame.canvas().is_empty() {
            return Err(DrapeError::render("cannot compose an empty frame"));
        }
        if self.back.canvas() != frame.canvas() {
            self.back = FrameRGBA::blank(frame.canvas());
        }

        fill(&mut self.back, self.clear);
        draw_full(&mut self.back, frame)?;
        if let Some(ov) = overlay {
            self.draw_overlay(ov)?;
        }

        std::mem::swap(&mut self.front, &mut self.back);
        self.stats.frames_composed += 1;
        Ok(&self.front)
    }

    fn draw_overlay(&mut self, ov: Overlay<'_>) -> DrapeResult<()> {
        let p = ov.placement;
        if !(p.x.is_finite() && p.y.is_finite() && p.width.is_finite() && p.height.is_finite()) {
            return Ok(());
        }
        let w = p.width.round();
        let h = p.height.round();
        if w < 1.0 || h < 1.0 {
            tracing::debug!(width = p.width, height = p.height, "overlay rounds to nothing");
            return Ok(());
        }
        // `as` saturates, so absurd sizes stay representable.
        let target = Region {
            x: p.x.round() as i64,
            y: p.y.round() as i64,
            width: w as i64,
            height: h as i64,
        };
        let Some(visible) = target.clip(self.back.width, self.back.height) else {
            return Ok(());
        };

        let whole =
            target.width <= MAX_WHOLE_RESAMPLE_SIDE && target.height <= MAX_WHOLE_RESAMPLE_SIDE;
        let window = (!whole).then_some(Region {
            x: visible.x.saturating_sub(target.x),
            y: visible.y.saturating_sub(target.y),
            width: visible.width,
            height: visible.height,
        });
        self.ensure_scaled(ov.garment, target, window)?;
        let Some(scaled) = self.scaled.as_ref() else {
            return Ok(());
        };
        let (at_x, at_y) = match window {
            Some(_) => (visible.x, visible.y),
            None => (target.x, target.y),
        };
        blit_over(
            &mut self.back,
            &scaled.rgba8_premul,
            scaled.patch_width,
            scaled.patch_height,
            at_x,
            at_y,
        )?;
        self.stats.overlays_drawn += 1;
        Ok(())
    }

    fn ensure_scaled(
        &mut self,
        g: &GarmentAsset,
        target: Region,
        window: Option<Region>,
    ) -> DrapeResult<()> {
        let hit = self.scaled.as_ref().is_some_and(|s| {
            s.target.width == target.width
                && s.target.height == target.height
                && s.window == window
                && s.reference == g.reference()
                && s.source_px.as_slice().as_ptr() == g.rgba8_premul().as_ptr()
        });
        if hit {
            return Ok(());
        }

        let (patch_width, patch_height, rgba8_premul) = match window {
            None => {
                let (w, h) = (target.width as u32, target.height as u32);
                let src = image::RgbaImage::from_raw(
                    g.width(),
                    g.height(),
                    g.rgba8_premul().to_vec(),
                )
                .ok_or_else(|| DrapeError::render("garment buffer does not match its size"))?;
                // Resampling premultiplied pixels keeps transparent edges free of color fringes.
                let resized =
                    image::imageops::resize(&src, w, h, image::imageops::FilterType::Triangle);
                (w, h, resized.into_raw())
            }
            Some(win) => (
                win.width as u32,
                win.height as u32,
                sample_window(g, target, win),
            ),
        };
        self.scaled = Some(ScaledGarment {
            reference: g.reference().to_string(),
            source_px: g.shared_pixels(),
            target,
            window,
            patch_width,
            patch_height,
            rgba8_premul,
        });
        self.stats.garment_resamples += 1;
        Ok(())
    }
}

/// Bilinearly sample the `win` part of `g` stretched to `target`'s size.
///
/// Only ever called for upscales past [`MAX_WHOLE_RESAMPLE_SIDE`], where bilinear matches the
/// triangle filter.
fn sample_window(g: &GarmentAsset, target: Region, win: Region) -> Vec<u8> {
    let sw = g.width() as usize;
    let sh = g.height() as usize;
    let src = g.rgba8_premul();
    let scale_x = sw as f64 / target.width as f64;
    let scale_y = sh as f64 / target.height as f64;

    let cols: Vec<_> = (0..win.width)
        .map(|i| taps(win.x.saturating_add(i) as f64, scale_x, sw))
        .collect();
    let mut out = Vec::with_capacity(win.width as usize * win.height as usize * 4);
    for j in 0..win.height {
        let (y0, y1, fy) = taps(win.y.saturating_add(j) as f64, scale_y, sh);
        for &(x0, x1, fx) in &cols {
            for c in 0..4 {
                let at = |x: usize, y: usize| f64::from(src[(y * sw + x) * 4 + c]);
                let top = at(x0, y0) + (at(x1, y0) - at(x0, y0)) * fx;
                let bottom = at(x0, y1) + (at(x1, y1) - at(x0, y1)) * fx;
                out.push((top + (bottom - top) * fy).round().clamp(0.0, 255.0) as u8);
            }
        }
    }
    out
}

/// Neighbouring source texels and blend weight for destination pixel `d`, centers aligned.
fn taps(d: f64, scale: f64, len: usize) -> (usize, usize, f64) {
    let s = ((d + 0.5) * scale - 0.5).clamp(0.0, (len - 1) as f64);
    let i = s.floor() as usize;
    (i, (i + 1).min(len - 1), s - i as f64)
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
