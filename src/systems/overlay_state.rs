use indexmap::IndexMap;
use log::debug;

/// The most recent locally produced screen-space buffer, the local display
/// colour, and the tracking flag. When tracking is off, detections still
/// refresh the buffer (so the local preview stays live) but the publish
/// scheduler must not emit.
pub struct LocalOverlay {
    points: Vec<f32>,
    produced: bool,
    colour: String,
    tracking_enabled: bool,
}

impl LocalOverlay {
    pub fn new(colour: String, tracking_enabled: bool) -> Self {
        LocalOverlay {
            points: Vec::new(),
            produced: false,
            colour,
            tracking_enabled,
        }
    }

    /// Replace the buffer contents in place
    pub fn set_points(&mut self, points: &[f32]) {
        if self.points.len() != points.len() {
            self.points.resize(points.len(), 0.);
        }
        self.points.copy_from_slice(points);
        self.produced = true;
    }

    pub fn points(&self) -> &[f32] {
        &self.points
    }

    /// Whether a buffer has been produced at least once this session
    pub fn has_points(&self) -> bool {
        self.produced
    }

    pub fn colour(&self) -> &str {
        &self.colour
    }

    /// Replace the display colour without touching buffer contents
    pub fn set_colour(&mut self, colour: &str) {
        self.colour.clear();
        self.colour.push_str(colour);
    }

    pub fn tracking_enabled(&self) -> bool {
        self.tracking_enabled
    }

    pub fn set_tracking(&mut self, enabled: bool) {
        self.tracking_enabled = enabled;
    }

    pub fn toggle_tracking(&mut self) -> bool {
        self.tracking_enabled = !self.tracking_enabled;
        self.tracking_enabled
    }
}

/// One remote participant's landmark buffer and display colour. The store
/// exclusively owns the buffer; it is copied out of the wire payload, never
/// aliased with any other entry.
#[derive(Debug, Clone)]
pub struct RemoteOverlay {
    pub points: Vec<f32>,
    pub colour: String,
}

/// Keyed by peer id (the Tether topic id, stable for the session). Iteration
/// order is stable so the draw pass sees a consistent participant ordering.
pub struct RemoteOverlayStore {
    entries: IndexMap<String, RemoteOverlay>,
}

impl Default for RemoteOverlayStore {
    fn default() -> Self {
        RemoteOverlayStore::new()
    }
}

impl RemoteOverlayStore {
    pub fn new() -> Self {
        RemoteOverlayStore {
            entries: IndexMap::new(),
        }
    }

    /// Create an entry for a previously-unseen peer, or update the existing
    /// entry's buffer and colour in place.
    pub fn upsert(&mut self, peer_id: &str, points: &[f32], colour: &str) {
        match self.entries.get_mut(peer_id) {
            Some(entry) => {
                if entry.points.len() != points.len() {
                    entry.points.resize(points.len(), 0.);
                }
                entry.points.copy_from_slice(points);
                if entry.colour != colour {
                    entry.colour.clear();
                    entry.colour.push_str(colour);
                }
            }
            None => {
                debug!("First overlay frame from peer \"{}\"", peer_id);
                self.entries.insert(
                    String::from(peer_id),
                    RemoteOverlay {
                        points: points.to_vec(),
                        colour: String::from(colour),
                    },
                );
            }
        }
    }

    /// Remove a peer entry. Removal events and late updates can race over the
    /// network, so removing an unknown id is a no-op, not an error.
    pub fn remove(&mut self, peer_id: &str) -> bool {
        match self.entries.shift_remove(peer_id) {
            Some(_) => true,
            None => {
                debug!("Leave for unknown peer \"{}\"; ignoring", peer_id);
                false
            }
        }
    }

    pub fn contains(&self, peer_id: &str) -> bool {
        self.entries.contains_key(peer_id)
    }

    pub fn get(&self, peer_id: &str) -> Option<&RemoteOverlay> {
        self.entries.get(peer_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RemoteOverlay)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_unknown_peer_is_noop() {
        let mut store = RemoteOverlayStore::new();
        store.upsert("peer-a", &[1., 2., 3.], "#ff00ff");

        assert!(!store.remove("peer-b"));
        assert_eq!(store.len(), 1);
        assert!(store.contains("peer-a"));
    }

    #[test]
    fn test_upsert_twice_keeps_single_entry_with_latest_buffer() {
        let mut store = RemoteOverlayStore::new();
        store.upsert("peer-a", &[1., 2., 3.], "#ff00ff");
        store.upsert("peer-a", &[4., 5., 6., 7., 8., 9.], "#00ffff");

        assert_eq!(store.len(), 1);
        let entry = store.get("peer-a").unwrap();
        assert_eq!(entry.points, vec![4., 5., 6., 7., 8., 9.]);
        assert_eq!(entry.colour, "#00ffff");
    }

    #[test]
    fn test_local_tracking_flag_does_not_block_updates() {
        let mut local = LocalOverlay::new(String::from("#ffff00"), false);
        assert!(!local.has_points());

        local.set_points(&[1., 2., 3.]);
        assert!(local.has_points());
        assert!(!local.tracking_enabled());

        assert!(local.toggle_tracking());
        assert_eq!(local.points(), &[1., 2., 3.]);
    }

    #[test]
    fn test_local_colour_change_leaves_points_alone() {
        let mut local = LocalOverlay::new(String::from("#ffff00"), true);
        local.set_points(&[9., 8., 7.]);
        local.set_colour("#123456");

        assert_eq!(local.colour(), "#123456");
        assert_eq!(local.points(), &[9., 8., 7.]);
    }
}
