use serde::{Deserialize, Serialize};

use crate::Point3D;

/// As per tether-mediapipe-holistic face/pose tracking: one message per analysed
/// video frame, with normalised ([0;1]-ish x,y and relative-depth z) landmarks.
///
/// Either sequence may be absent; a frame in which no face (or no body) was
/// found is a valid, non-error outcome.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub face_landmarks: Option<Vec<Point3D>>,
    pub pose_landmarks: Option<Vec<Point3D>>,
}

impl DetectionResult {
    pub fn has_face(&self) -> bool {
        self.face_landmarks
            .as_ref()
            .is_some_and(|landmarks| !landmarks.is_empty())
    }
}
