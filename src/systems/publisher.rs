use std::time::{Duration, SystemTime};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::overlay_state::LocalOverlay;

const FALLBACK_RATE_HZ: f32 = 15.;

/// One participant's overlay as carried on the wire: the flat screen-space
/// (x,y,z) buffer plus the display colour.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OverlayFrame {
    pub points: Vec<f32>,
    pub colour: String,
}

/// Independently-clocked publish loop, decoupled from detection/render
/// throughput so the outbound cadence is configuration-controlled. A tick
/// that has nothing valid to send is silently skipped.
pub struct PublishScheduler {
    enabled: bool,
    interval: Duration,
    last_published: SystemTime,
}

impl Default for PublishScheduler {
    fn default() -> Self {
        PublishScheduler::new()
    }
}

impl PublishScheduler {
    pub fn new() -> Self {
        PublishScheduler {
            enabled: false,
            interval: Duration::from_secs_f32(1. / FALLBACK_RATE_HZ),
            last_published: SystemTime::now(),
        }
    }

    /// Start (or re-start) publishing at the given rate. The previous period
    /// is replaced wholesale and the next tick is measured from now, so two
    /// periods can never overlap.
    pub fn enable(&mut self, rate_per_second: f32) {
        let rate = if rate_per_second.is_finite() && rate_per_second > 0. {
            rate_per_second
        } else {
            warn!(
                "Invalid publish rate {}; falling back to {} Hz",
                rate_per_second, FALLBACK_RATE_HZ
            );
            FALLBACK_RATE_HZ
        };
        self.interval = Duration::from_secs_f32(1. / rate);
        self.last_published = SystemTime::now();
        self.enabled = true;
        info!("Publishing enabled at {} Hz", rate);
    }

    pub fn disable(&mut self) {
        if self.enabled {
            info!("Publishing disabled");
        }
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_due(&self) -> bool {
        self.enabled && self.last_published.elapsed().unwrap_or_default() >= self.interval
    }

    /// One timer tick: returns the frame to publish, or None if the tick is
    /// skipped (disabled, tracking off, or no buffer produced yet).
    pub fn tick(&mut self, local: &LocalOverlay) -> Option<OverlayFrame> {
        self.last_published = SystemTime::now();
        if !self.enabled {
            return None;
        }
        if !local.tracking_enabled() {
            debug!("Tracking disabled; skipping publish tick");
            return None;
        }
        if !local.has_points() {
            debug!("No local overlay points produced yet; skipping publish tick");
            return None;
        }
        Some(OverlayFrame {
            points: local.points().to_vec(),
            colour: String::from(local.colour()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_with_points(tracking: bool) -> LocalOverlay {
        let mut local = LocalOverlay::new(String::from("#00ffff"), tracking);
        local.set_points(&[1., 2., 3.]);
        local
    }

    #[test]
    fn test_tracking_disabled_gates_every_tick() {
        let mut scheduler = PublishScheduler::new();
        scheduler.enable(30.);
        let mut local = local_with_points(false);

        for _ in 0..5 {
            assert!(scheduler.tick(&local).is_none());
        }

        // Re-enabling tracking resumes publishing without restarting the scheduler
        local.set_tracking(true);
        let frame = scheduler.tick(&local).expect("expected a publishable frame");
        assert_eq!(frame.points, vec![1., 2., 3.]);
        assert_eq!(frame.colour, "#00ffff");
    }

    #[test]
    fn test_no_buffer_yet_skips_tick() {
        let mut scheduler = PublishScheduler::new();
        scheduler.enable(30.);
        let local = LocalOverlay::new(String::from("#00ffff"), true);

        assert!(scheduler.tick(&local).is_none());
    }

    #[test]
    fn test_disabled_scheduler_never_due_or_emitting() {
        let mut scheduler = PublishScheduler::new();
        let local = local_with_points(true);

        assert!(!scheduler.is_due());
        assert!(scheduler.tick(&local).is_none());

        scheduler.enable(10.);
        scheduler.disable();
        assert!(!scheduler.is_due());
        assert!(scheduler.tick(&local).is_none());
    }

    #[test]
    fn test_invalid_rate_falls_back() {
        let mut scheduler = PublishScheduler::new();
        scheduler.enable(0.);
        assert!(scheduler.is_enabled());
        assert_eq!(
            scheduler.interval,
            Duration::from_secs_f32(1. / FALLBACK_RATE_HZ)
        );
    }
}
