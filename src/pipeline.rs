use std::time::{Duration, SystemTime};

use anyhow::Result;
use log::{debug, error, warn};

use crate::{
    detection::DetectionResult,
    scene::PointCloudScene,
    systems::{
        offset::OffsetState,
        overlay_state::{LocalOverlay, RemoteOverlayStore},
        projection::{LandmarkProjector, ProjectionOutcome},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Running,
    Stopped,
    Disposed,
}

/// Orchestrates the render/synchronisation loop: one detection request in
/// flight at a time, one draw per completed detection, and an explicit
/// re-arm flag instead of a recursively self-scheduling callback, so
/// cancellation is a flag flip in stop().
pub struct RenderPipeline {
    state: PipelineState,
    projector: LandmarkProjector,
    frame_width: f32,
    frame_height: f32,
    detection_in_flight: bool,
    frame_scheduled: bool,
    missed_face_frames: u32,
}

impl RenderPipeline {
    pub fn new(frame_width: f32, frame_height: f32) -> Self {
        RenderPipeline {
            state: PipelineState::Idle,
            projector: LandmarkProjector::new(),
            frame_width,
            frame_height,
            detection_in_flight: false,
            frame_scheduled: false,
            missed_face_frames: 0,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Idle → Running. Surface acquisition is the only fatal failure; on
    /// error the pipeline never enters Running. The first detection request
    /// goes out on the next frame-clock tick.
    pub fn start(&mut self, scene: &mut PointCloudScene) -> Result<()> {
        match self.state {
            PipelineState::Idle => {}
            other => {
                warn!("start() ignored in {:?} state", other);
                return Ok(());
            }
        }
        scene.begin()?;
        self.state = PipelineState::Running;
        self.frame_scheduled = true;
        Ok(())
    }

    /// Called on every frame-clock tick. Hands out at most one detection
    /// request at a time: a request is only issued when one has been
    /// scheduled by the previous cycle and none is outstanding, so a slow
    /// detector simply delays the next draw rather than queueing requests.
    pub fn poll_detection_request(&mut self) -> bool {
        if self.state != PipelineState::Running
            || !self.frame_scheduled
            || self.detection_in_flight
        {
            return false;
        }
        self.frame_scheduled = false;
        self.detection_in_flight = true;
        true
    }

    /// The transport failed to carry the request; re-arm so the next tick retries
    pub fn detection_request_failed(&mut self) {
        self.detection_in_flight = false;
        self.frame_scheduled = true;
    }

    /// Detection-complete handler: project, update the local store, reconcile
    /// remote entries against scene clouds, issue exactly one draw, then
    /// schedule the next cycle. A result arriving after stop()/dispose() is
    /// detected here and ignored.
    pub fn on_detection(
        &mut self,
        detection: &DetectionResult,
        offset: OffsetState,
        local: &mut LocalOverlay,
        remotes: &RemoteOverlayStore,
        scene: &mut PointCloudScene,
    ) {
        if self.state != PipelineState::Running {
            debug!("Detection result ignored in {:?} state", self.state);
            return;
        }
        if !self.detection_in_flight {
            debug!("Unsolicited detection result; ignoring");
            return;
        }
        self.detection_in_flight = false;

        match self
            .projector
            .project(detection, offset, self.frame_width, self.frame_height)
        {
            ProjectionOutcome::Updated => {
                self.missed_face_frames = 0;
                local.set_points(self.projector.points());
            }
            ProjectionOutcome::Stale => {
                self.missed_face_frames += 1;
                if self.missed_face_frames == 1 {
                    warn!("No face found in frame; keeping previous overlay points");
                }
            }
        }

        if local.has_points() {
            scene.set_local(local.points(), local.colour());
        }
        for (peer_id, remote) in remotes.iter() {
            scene.upsert_remote(peer_id, &remote.points, &remote.colour);
        }
        // Clouds whose entry no longer exists are stale; drop them
        scene.retain_remotes(|peer_id| remotes.contains(peer_id));

        if let Err(e) = scene.draw() {
            error!("Draw call failed: {}", e);
        }

        if self.state == PipelineState::Running {
            self.frame_scheduled = true;
        }
    }

    /// Running (or Idle) → Stopped. Clears the pending scheduled cycle; an
    /// already-in-flight detection is not cancelled, its eventual result is
    /// simply ignored.
    pub fn stop(&mut self) {
        match self.state {
            PipelineState::Idle | PipelineState::Running => {
                self.state = PipelineState::Stopped;
                self.frame_scheduled = false;
                debug!("Render pipeline stopped");
            }
            PipelineState::Stopped | PipelineState::Disposed => {}
        }
    }

    /// Release scene resources and stop; valid from any state, idempotent
    pub fn dispose(&mut self, scene: &mut PointCloudScene) {
        if self.state == PipelineState::Disposed {
            return;
        }
        self.stop();
        scene.release();
        self.state = PipelineState::Disposed;
    }
}

/// The display's animation clock, as a plain elapsed-time check so the
/// cooperative main loop can poll it alongside everything else
pub struct FrameClock {
    interval: Duration,
    last_fired: SystemTime,
}

impl FrameClock {
    pub fn new(interval_ms: u64) -> Self {
        FrameClock {
            interval: Duration::from_millis(interval_ms),
            last_fired: SystemTime::now(),
        }
    }

    pub fn due(&mut self) -> bool {
        if self.last_fired.elapsed().unwrap_or_default() >= self.interval {
            self.last_fired = SystemTime::now();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection_with_face() -> DetectionResult {
        DetectionResult {
            face_landmarks: Some(vec![(0.5, 0.5, 0.)]),
            pose_landmarks: None,
        }
    }

    fn running_pipeline() -> (RenderPipeline, PointCloudScene) {
        let mut pipeline = RenderPipeline::new(640., 480.);
        let mut scene = PointCloudScene::new(640., 480.);
        pipeline.start(&mut scene).unwrap();
        (pipeline, scene)
    }

    #[test]
    fn test_start_fails_on_surface_acquisition() {
        let mut pipeline = RenderPipeline::new(0., 0.);
        let mut scene = PointCloudScene::new(0., 0.);

        assert!(pipeline.start(&mut scene).is_err());
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert!(!pipeline.poll_detection_request());
    }

    #[test]
    fn test_at_most_one_detection_in_flight() {
        let (mut pipeline, mut scene) = running_pipeline();

        assert!(pipeline.poll_detection_request());
        // A second tick before the result arrives must not issue another request
        assert!(!pipeline.poll_detection_request());
        assert!(!pipeline.poll_detection_request());

        let mut local = LocalOverlay::new(String::from("#ffff00"), true);
        let remotes = RemoteOverlayStore::new();
        pipeline.on_detection(
            &detection_with_face(),
            OffsetState::default(),
            &mut local,
            &remotes,
            &mut scene,
        );

        // Completion re-arms exactly one request
        assert!(pipeline.poll_detection_request());
        assert!(!pipeline.poll_detection_request());
    }

    #[test]
    fn test_each_detection_issues_one_draw() {
        let (mut pipeline, mut scene) = running_pipeline();
        let mut local = LocalOverlay::new(String::from("#ffff00"), true);
        let remotes = RemoteOverlayStore::new();

        assert!(pipeline.poll_detection_request());
        pipeline.on_detection(
            &detection_with_face(),
            OffsetState::default(),
            &mut local,
            &remotes,
            &mut scene,
        );
        assert_eq!(scene.frames_drawn(), 1);
        assert!(local.has_points());
    }

    #[test]
    fn test_result_after_stop_is_ignored() {
        let (mut pipeline, mut scene) = running_pipeline();
        let mut local = LocalOverlay::new(String::from("#ffff00"), true);
        let remotes = RemoteOverlayStore::new();

        assert!(pipeline.poll_detection_request());
        pipeline.stop();
        pipeline.on_detection(
            &detection_with_face(),
            OffsetState::default(),
            &mut local,
            &remotes,
            &mut scene,
        );

        assert_eq!(scene.frames_drawn(), 0);
        assert!(!local.has_points());
        assert!(!pipeline.poll_detection_request());
    }

    #[test]
    fn test_reconciliation_drops_stale_clouds() {
        let (mut pipeline, mut scene) = running_pipeline();
        let mut local = LocalOverlay::new(String::from("#ffff00"), true);
        let mut remotes = RemoteOverlayStore::new();
        remotes.upsert("peer-a", &[1., 2., 3.], "#00ffff");
        remotes.upsert("peer-b", &[4., 5., 6.], "#ff00ff");

        assert!(pipeline.poll_detection_request());
        pipeline.on_detection(
            &detection_with_face(),
            OffsetState::default(),
            &mut local,
            &remotes,
            &mut scene,
        );
        assert_eq!(scene.remote_ids().len(), 2);

        remotes.remove("peer-a");
        assert!(pipeline.poll_detection_request());
        pipeline.on_detection(
            &detection_with_face(),
            OffsetState::default(),
            &mut local,
            &remotes,
            &mut scene,
        );
        assert_eq!(scene.remote_ids(), vec![String::from("peer-b")]);
    }

    #[test]
    fn test_dispose_is_idempotent_and_terminal() {
        let (mut pipeline, mut scene) = running_pipeline();
        pipeline.dispose(&mut scene);
        assert_eq!(pipeline.state(), PipelineState::Disposed);

        pipeline.dispose(&mut scene);
        assert_eq!(pipeline.state(), PipelineState::Disposed);

        // start() after dispose must not resurrect the pipeline
        assert!(pipeline.start(&mut scene).is_ok());
        assert_eq!(pipeline.state(), PipelineState::Disposed);
    }

    #[test]
    fn test_end_to_end_projection_through_pipeline() {
        let mut pipeline = RenderPipeline::new(680., 480.);
        let mut scene = PointCloudScene::new(680., 480.);
        pipeline.start(&mut scene).unwrap();

        let mut pose = vec![(0., 0., 0.); 33];
        pose[11] = (0.2, 0.3, 0.);
        pose[12] = (0.8, 0.3, 0.);
        let detection = DetectionResult {
            face_landmarks: Some(vec![
                (0., 0., 0.),
                (1., 0., 0.),
                (0., 1., 0.),
                (1., 1., 0.),
            ]),
            pose_landmarks: Some(pose),
        };

        let mut local = LocalOverlay::new(String::from("#ffff00"), true);
        let remotes = RemoteOverlayStore::new();
        assert!(pipeline.poll_detection_request());
        pipeline.on_detection(
            &detection,
            OffsetState { right: 50, up: 100 },
            &mut local,
            &remotes,
            &mut scene,
        );

        let points = local.points();
        assert_eq!(points.len(), 18);
        assert_eq!(&points[0..3], &[50., 580., 0.]);
        assert_eq!(
            &points[15..18],
            &[0.8 * 680. + 50., -0.3 * 480. + 480. + 100., 0.]
        );
        assert_eq!(scene.local_cloud().unwrap().points, points);
    }

    #[test]
    fn test_failed_request_is_retried_next_tick() {
        let (mut pipeline, _scene) = running_pipeline();

        assert!(pipeline.poll_detection_request());
        pipeline.detection_request_failed();
        assert!(pipeline.poll_detection_request());
    }
}
