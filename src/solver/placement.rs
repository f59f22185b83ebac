use crate::config::SolverParams;
use crate::foundation::core::{Canvas, Rect};
use crate::pose::landmark::{BodyLandmark, Landmark, PoseFrame};

/// Where a garment is drawn on one frame, in surface pixels.
///
/// The rectangle may extend past the surface edges; the compositor clips.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Placement {
    /// As a kurbo rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// Torso measurements in surface pixels, kept for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TorsoMetrics {
    /// Distance between the shoulders in pixels.
    pub shoulder_width_px: f64,
    /// Vertical distance from shoulder midpoint to hip midpoint in pixels.
    pub torso_height_px: f64,
    /// Horizontal shoulder midpoint in pixels.
    pub center_x: f64,
    /// Vertical shoulder midpoint in pixels.
    pub center_y: f64,
}

/// Compute torso metrics, or `None` when any torso landmark is missing or unusable.
pub fn torso_metrics(pose: &PoseFrame, canvas: Canvas, min_visibility: f32) -> Option<TorsoMetrics> {
    let pick = |which: BodyLandmark| -> Option<&Landmark> {
        pose.get(which).filter(|lm| lm.is_usable(min_visibility))
    };
    let ls = pick(BodyLandmark::LeftShoulder)?;
    let rs = pick(BodyLandmark::RightShoulder)?;
    let lh = pick(BodyLandmark::LeftHip)?;
    let rh = pick(BodyLandmark::RightHip)?;

    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);
    let shoulder_y = avg(ls.y, rs.y);
    let hip_y = avg(lh.y, rh.y);

    Some(TorsoMetrics {
        shoulder_width_px: f64::from((ls.x - rs.x).abs()) * w,
        torso_height_px: (shoulder_y - hip_y).abs() * h,
        center_x: avg(ls.x, rs.x) * w,
        center_y: shoulder_y * h,
    })
}

/// Map a pose onto a garment rectangle.
///
/// Width follows the shoulder span times `master_scale`; height always follows from the garment's
/// aspect ratio, so the image is never stretched. The garment is centered on the shoulder midpoint
/// and raised by `collar_offset` of the torso height.
///
/// Returns `None` when a torso landmark is absent or below `min_visibility`, or when
/// `aspect_ratio` is not a finite positive number.
pub fn solve_placement(
    pose: &PoseFrame,
    aspect_ratio: f64,
    canvas: Canvas,
    params: &SolverParams,
) -> Option<Placement> {
    if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 || canvas.is_empty() {
        return None;
    }
    let m = torso_metrics(pose, canvas, params.min_visibility)?;

    let width = m.shoulder_width_px * params.master_scale;
    let height = width / aspect_ratio;
    let vertical_offset = m.torso_height_px * params.collar_offset;

    Some(Placement {
        x: m.center_x - width / 2.0,
        y: m.center_y - vertical_offset,
        width,
        height,
    })
}

fn avg(a: f32, b: f32) -> f64 {
    (f64::from(a) + f64::from(b)) / 2.0
}

#[cfg(test)]
#[path = "../../tests/unit/solver/placement.rs"]
mod tests;
