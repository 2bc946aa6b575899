pub mod input;
pub mod offset;
pub mod overlay_state;
pub mod projection;
pub mod publisher;

use log::info;
use rand::Rng;

use crate::{
    overlay_config::OverlayConfig,
    palette::Palette,
    pipeline::{FrameClock, RenderPipeline},
};
use input::InputController;
use offset::OffsetController;
use overlay_state::{LocalOverlay, RemoteOverlayStore};
use publisher::PublishScheduler;

pub struct Systems {
    pub pipeline: RenderPipeline,
    pub frame_clock: FrameClock,
    pub offset_controller: OffsetController,
    pub input_controller: InputController,
    pub local_overlay: LocalOverlay,
    pub remote_store: RemoteOverlayStore,
    pub publisher: PublishScheduler,
    /// Rate used when a "join" control carries no explicit rate
    pub publish_rate_hz: f32,
}

impl Systems {
    pub fn new<R: Rng>(config: &OverlayConfig, rng: &mut R) -> Systems {
        let colour = match &config.colour {
            Some(colour) => colour.clone(),
            None => {
                let palette = Palette::new(&config.palette);
                let picked = palette.pick(rng);
                info!("No colour configured; picked \"{}\" from palette", picked);
                picked
            }
        };

        let mut publisher = PublishScheduler::new();
        if config.join_on_start {
            publisher.enable(config.publish_rate_hz);
        }

        Systems {
            pipeline: RenderPipeline::new(config.frame_width, config.frame_height),
            frame_clock: FrameClock::new(config.frame_interval),
            offset_controller: OffsetController::new(config.offset_step),
            input_controller: InputController::new(),
            local_overlay: LocalOverlay::new(colour, config.tracking_on_start),
            remote_store: RemoteOverlayStore::new(),
            publisher,
            publish_rate_hz: config.publish_rate_hz,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_configured_colour_wins_over_palette() {
        let config = OverlayConfig {
            colour: Some(String::from("#abcdef")),
            ..Default::default()
        };
        let systems = Systems::new(&config, &mut StdRng::seed_from_u64(1));
        assert_eq!(systems.local_overlay.colour(), "#abcdef");
    }

    #[test]
    fn test_palette_pick_is_deterministic_with_seeded_rng() {
        let config = OverlayConfig::default();
        let a = Systems::new(&config, &mut StdRng::seed_from_u64(9));
        let b = Systems::new(&config, &mut StdRng::seed_from_u64(9));
        assert_eq!(a.local_overlay.colour(), b.local_overlay.colour());
    }

    #[test]
    fn test_join_on_start_enables_publisher() {
        let config = OverlayConfig {
            join_on_start: false,
            ..Default::default()
        };
        let systems = Systems::new(&config, &mut StdRng::seed_from_u64(1));
        assert!(!systems.publisher.is_enabled());
    }
}
