use log::debug;

use crate::{Point3D, detection::DetectionResult, systems::offset::OffsetState};

/// Pose landmark indices for the two shoulder anchors, as per the
/// MediaPipe/BlazePose landmark layout
pub const LEFT_SHOULDER_INDEX: usize = 11;
pub const RIGHT_SHOULDER_INDEX: usize = 12;

/// Two (x,y,z) anchor triples appended after the face landmarks
pub const ANCHOR_FLOATS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionOutcome {
    /// The screen-space buffer was rewritten from this frame's landmarks
    Updated,
    /// No face in this frame; the buffer holds the previous frame's points
    Stale,
}

/// Converts one detection result plus the current pan offset into a flat
/// screen-space coordinate buffer. The buffer is allocated once (sized to
/// `face_count * 3 + 6`) and mutated in place frame-to-frame; it is only
/// reallocated if the detector's landmark count changes.
pub struct LandmarkProjector {
    points: Vec<f32>,
}

impl Default for LandmarkProjector {
    fn default() -> Self {
        LandmarkProjector::new()
    }
}

impl LandmarkProjector {
    pub fn new() -> Self {
        LandmarkProjector { points: Vec::new() }
    }

    pub fn project(
        &mut self,
        detection: &DetectionResult,
        offset: OffsetState,
        frame_width: f32,
        frame_height: f32,
    ) -> ProjectionOutcome {
        let face = match &detection.face_landmarks {
            Some(face) if !face.is_empty() => face,
            _ => return ProjectionOutcome::Stale,
        };

        let required = face.len() * 3 + ANCHOR_FLOATS;
        if self.points.len() != required {
            debug!(
                "(Re)allocating screen-space buffer for {} face landmarks",
                face.len()
            );
            self.points.resize(required, 0.);
        }

        for (i, landmark) in face.iter().enumerate() {
            let [x, y, z] = project_point(landmark, offset, frame_width, frame_height);
            self.points[i * 3] = x;
            self.points[i * 3 + 1] = y;
            self.points[i * 3 + 2] = z;
        }

        // Shoulder anchors follow the same formula but come from the pose
        // landmarks; if the body was not found this frame, the trailing
        // triples keep their previous values.
        if let Some(pose) = &detection.pose_landmarks {
            if pose.len() > RIGHT_SHOULDER_INDEX {
                let base = face.len() * 3;
                for (slot, index) in [LEFT_SHOULDER_INDEX, RIGHT_SHOULDER_INDEX]
                    .iter()
                    .enumerate()
                {
                    let [x, y, z] = project_point(&pose[*index], offset, frame_width, frame_height);
                    self.points[base + slot * 3] = x;
                    self.points[base + slot * 3 + 1] = y;
                    self.points[base + slot * 3 + 2] = z;
                }
            }
        }

        ProjectionOutcome::Updated
    }

    pub fn points(&self) -> &[f32] {
        &self.points
    }
}

/// Map one normalised landmark to screen space. The y axis is flipped (video
/// frames have y growing downwards); z is scaled by frame width but never
/// offset-shifted.
pub fn project_point(
    point: &Point3D,
    offset: OffsetState,
    frame_width: f32,
    frame_height: f32,
) -> [f32; 3] {
    let (x, y, z) = *point;
    [
        x * frame_width + offset.right as f32,
        -y * frame_height + frame_height + offset.up as f32,
        z * frame_width,
    ]
}
