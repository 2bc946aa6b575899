use anyhow::{Result, anyhow};
use indexmap::IndexMap;
use log::debug;

/// One drawable point cloud, bound 1:1 to a participant's landmark buffer.
/// Geometry is updated in place frame-to-frame.
#[derive(Debug, Clone)]
pub struct CloudGeometry {
    pub points: Vec<f32>,
    pub colour: String,
}

/// CPU-side scene graph for the overlay: at most one cloud per participant
/// id, plus the local cloud. The rasterising backend (the frontend viewer, or
/// whatever consumes the published frames) is deliberately out of scope; this
/// owns only the data it must be fed and when.
pub struct PointCloudScene {
    frame_width: f32,
    frame_height: f32,
    context_ready: bool,
    local: Option<CloudGeometry>,
    remotes: IndexMap<String, CloudGeometry>,
    frames_drawn: u64,
}

impl PointCloudScene {
    pub fn new(frame_width: f32, frame_height: f32) -> Self {
        PointCloudScene {
            frame_width,
            frame_height,
            context_ready: false,
            local: None,
            remotes: IndexMap::new(),
            frames_drawn: 0,
        }
    }

    /// Acquire the drawing surface. This is the one fatal failure of the
    /// whole pipeline: if it fails, start() never enters Running.
    pub fn begin(&mut self) -> Result<()> {
        if self.frame_width <= 0. || self.frame_height <= 0. {
            return Err(anyhow!(
                "cannot acquire a {}x{} drawing surface",
                self.frame_width,
                self.frame_height
            ));
        }
        self.context_ready = true;
        Ok(())
    }

    pub fn set_local(&mut self, points: &[f32], colour: &str) {
        match &mut self.local {
            Some(cloud) => update_geometry(cloud, points, colour),
            None => {
                debug!("Creating local overlay cloud ({} floats)", points.len());
                self.local = Some(CloudGeometry {
                    points: points.to_vec(),
                    colour: String::from(colour),
                });
            }
        }
    }

    /// Create the peer's cloud lazily on first data, update in place after
    pub fn upsert_remote(&mut self, peer_id: &str, points: &[f32], colour: &str) {
        match self.remotes.get_mut(peer_id) {
            Some(cloud) => update_geometry(cloud, points, colour),
            None => {
                debug!("Creating overlay cloud for peer \"{}\"", peer_id);
                self.remotes.insert(
                    String::from(peer_id),
                    CloudGeometry {
                        points: points.to_vec(),
                        colour: String::from(colour),
                    },
                );
            }
        }
    }

    pub fn remove_remote(&mut self, peer_id: &str) {
        if self.remotes.shift_remove(peer_id).is_some() {
            debug!("Removed overlay cloud for peer \"{}\"", peer_id);
        }
    }

    /// Drop every remote cloud whose id fails the predicate; used by the
    /// pipeline to reconcile clouds against the remote store each draw.
    pub fn retain_remotes<F: Fn(&str) -> bool>(&mut self, keep: F) {
        self.remotes.retain(|id, _| keep(id));
    }

    pub fn remote_ids(&self) -> Vec<String> {
        self.remotes.keys().cloned().collect()
    }

    pub fn local_cloud(&self) -> Option<&CloudGeometry> {
        self.local.as_ref()
    }

    pub fn remote_cloud(&self, peer_id: &str) -> Option<&CloudGeometry> {
        self.remotes.get(peer_id)
    }

    pub fn draw(&mut self) -> Result<()> {
        if !self.context_ready {
            return Err(anyhow!("draw called without an acquired surface"));
        }
        self.frames_drawn += 1;
        Ok(())
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Release the surface and all clouds; safe to call repeatedly
    pub fn release(&mut self) {
        self.context_ready = false;
        self.local = None;
        self.remotes.clear();
    }
}

fn update_geometry(cloud: &mut CloudGeometry, points: &[f32], colour: &str) {
    if cloud.points.len() != points.len() {
        cloud.points.resize(points.len(), 0.);
    }
    cloud.points.copy_from_slice(points);
    if cloud.colour != colour {
        cloud.colour.clear();
        cloud.colour.push_str(colour);
    }
}
