use crate::foundation::core::FrameTime;
use crate::foundation::error::{DrapeError, DrapeResult};

/// Anatomical numbering of the 33 body landmarks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum BodyLandmark {
    /// Nose.
    Nose = 0,
    /// Left eye inner.
    LeftEyeInner = 1,
    /// Left eye.
    LeftEye = 2,
    /// Left eye outer.
    LeftEyeOuter = 3,
    /// Right eye inner.
    RightEyeInner = 4,
    /// Right eye.
    RightEye = 5,
    /// Right eye outer.
    RightEyeOuter = 6,
    /// Left ear.
    LeftEar = 7,
    /// Right ear.
    RightEar = 8,
    /// Mouth left.
    MouthLeft = 9,
    /// Mouth right.
    MouthRight = 10,
    /// Left shoulder.
    LeftShoulder = 11,
    /// Right shoulder.
    RightShoulder = 12,
    /// Left elbow.
    LeftElbow = 13,
    /// Right elbow.
    RightElbow = 14,
    /// Left wrist.
    LeftWrist = 15,
    /// Right wrist.
    RightWrist = 16,
    /// Left pinky.
    LeftPinky = 17,
    /// Right pinky.
    RightPinky = 18,
    /// Left index.
    LeftIndex = 19,
    /// Right index.
    RightIndex = 20,
    /// Left thumb.
    LeftThumb = 21,
    /// Right thumb.
    RightThumb = 22,
    /// Left hip.
    LeftHip = 23,
    /// Right hip.
    RightHip = 24,
    /// Left knee.
    LeftKnee = 25,
    /// Right knee.
    RightKnee = 26,
    /// Left ankle.
    LeftAnkle = 27,
    /// Right ankle.
    RightAnkle = 28,
    /// Left heel.
    LeftHeel = 29,
    /// Right heel.
    RightHeel = 30,
    /// Left foot index.
    LeftFootIndex = 31,
    /// Right foot index.
    RightFootIndex = 32,
}

impl BodyLandmark {
    /// Number of landmarks in a full body pose.
    pub const COUNT: usize = 33;

    /// The four landmarks that anchor a torso garment.
    pub const TORSO: [Self; 4] = [
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftHip,
        Self::RightHip,
    ];

    /// Slot of this landmark in a [`PoseFrame`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One estimated anatomical point.
///
/// `x` and `y` are normalized to the frame (`0.0..=1.0` inside the image, slightly outside when the
/// engine extrapolates an occluded point).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Landmark {
    /// Horizontal position, normalized to frame width.
    pub x: f32,
    /// Vertical position, normalized to frame height.
    pub y: f32,
    /// Depth relative to the hips; smaller is closer to the camera.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
    /// Likelihood the point is visible (not occluded).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
    /// Likelihood the point is inside the frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence: Option<f32>,
}

impl Landmark {
    /// A landmark at `(x, y)` with no depth or confidence.
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            z: None,
            visibility: None,
            presence: None,
        }
    }

    /// Attach a visibility score.
    pub fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// A landmark is usable when its coordinates are finite and its known confidences reach
    /// `min_confidence`. Unknown confidences never disqualify a point.
    pub fn is_usable(&self, min_confidence: f32) -> bool {
        if !self.x.is_finite() || !self.y.is_finite() {
            return false;
        }
        let ok = |c: Option<f32>| c.is_none_or(|v| v >= min_confidence);
        ok(self.visibility) && ok(self.presence)
    }
}

/// The full landmark set estimated for one video frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PoseFrame {
    /// Timestamp of the video frame this estimate belongs to.
    pub timestamp: FrameTime,
    #[serde(with = "landmark_slots")]
    landmarks: [Option<Landmark>; BodyLandmark::COUNT],
}

impl PoseFrame {
    /// A pose with every landmark absent.
    pub fn empty(timestamp: FrameTime) -> Self {
        Self {
            timestamp,
            landmarks: [None; BodyLandmark::COUNT],
        }
    }

    /// Build from an engine's dense output; the slice must hold exactly 33 entries.
    pub fn from_landmarks(timestamp: FrameTime, landmarks: &[Landmark]) -> DrapeResult<Self> {
        if landmarks.len() != BodyLandmark::COUNT {
            return Err(DrapeError::validation(format!(
                "pose must have {} landmarks, got {}",
                BodyLandmark::COUNT,
                landmarks.len()
            )));
        }
        let mut pose = Self::empty(timestamp);
        for (slot, lm) in pose.landmarks.iter_mut().zip(landmarks) {
            *slot = Some(*lm);
        }
        Ok(pose)
    }

    /// Builder form of [`Self::set`].
    pub fn with(mut self, which: BodyLandmark, lm: Landmark) -> Self {
        self.set(which, Some(lm));
        self
    }

    /// Fill or clear one slot.
    pub fn set(&mut self, which: BodyLandmark, lm: Option<Landmark>) {
        self.landmarks[which.index()] = lm;
    }

    /// The landmark in one slot, if detected.
    pub fn get(&self, which: BodyLandmark) -> Option<&Landmark> {
        self.landmarks[which.index()].as_ref()
    }

    /// Number of landmarks present.
    pub fn present_count(&self) -> usize {
        self.landmarks.iter().filter(|l| l.is_some()).count()
    }
}

/// Serializes the fixed array as a JSON list of `null | landmark`.
mod landmark_slots {
    use super::{BodyLandmark, Landmark};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub(super) fn serialize<S: Serializer>(
        slots: &[Option<Landmark>; BodyLandmark::COUNT],
        s: S,
    ) -> Result<S::Ok, S::Error> {
        slots.as_slice().serialize(s)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<[Option<Landmark>; BodyLandmark::COUNT], D::Error> {
        let v = Vec::<Option<Landmark>>::deserialize(d)?;
        let len = v.len();
        v.try_into().map_err(|_| {
            serde::de::Error::invalid_length(len, &"exactly 33 landmark slots")
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pose/landmark.rs"]
mod tests;
