use anyhow::{Result, anyhow};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OverlayConfig {
    /// Width of the local video frame, in pixels
    pub frame_width: f32,

    /// Height of the local video frame, in pixels
    pub frame_height: f32,

    /// How far (pixels) one pan step moves the overlay on its axis
    pub offset_step: i32,

    /// How often (ms) the frame clock fires; the next detection request can
    /// only go out on a tick
    pub frame_interval: u64,

    /// How many overlay frames to publish per second while joined
    pub publish_rate_hz: f32,

    /// Start publishing immediately, without waiting for a "join" control
    pub join_on_start: bool,

    /// Initial state of the tracking toggle
    pub tracking_on_start: bool,

    /// Explicit overlay colour (hex); when absent, one is picked at random
    /// from the palette
    pub colour: Option<String>,

    /// Colours (hex) to pick from when no explicit colour is set; empty means
    /// use the built-in palette
    pub palette: Vec<String>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        OverlayConfig {
            frame_width: 640.,
            frame_height: 480.,
            offset_step: 10,
            frame_interval: 16,
            publish_rate_hz: 15.,
            join_on_start: true,
            tracking_on_start: true,
            colour: None,
            palette: Vec::new(),
        }
    }
}

pub fn load_config_from_file(config_file_path: &str) -> Result<OverlayConfig> {
    match std::fs::read_to_string(config_file_path) {
        Err(e) => {
            if e.kind() == std::io::ErrorKind::NotFound {
                warn!(
                    "Overlay config file not found at \"{}\"; using defaults",
                    config_file_path
                );
                Ok(OverlayConfig::default())
            } else {
                Err(anyhow!(
                    "Failed to read overlay config from \"{}\": {}",
                    config_file_path,
                    e
                ))
            }
        }
        Ok(s) => {
            info!("Loaded overlay config OK from \"{}\"", config_file_path);
            match serde_json::from_str::<OverlayConfig>(&s) {
                Ok(loaded_config) => {
                    debug!("Config parsed data from file: {:?}", &loaded_config);
                    Ok(loaded_config)
                }
                Err(e) => Err(anyhow!("Failed to parse config data: {}", e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = OverlayConfig::default();
        assert!(config.frame_width > 0.);
        assert!(config.frame_height > 0.);
        assert!(config.publish_rate_hz > 0.);
        assert!(config.colour.is_none());
    }

    #[test]
    fn test_partial_json_fails_loud_not_silent() {
        // Unknown or missing fields should surface as a parse error rather
        // than silently half-applying
        let parsed = serde_json::from_str::<OverlayConfig>("{\"frameWidth\": 1280}");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_round_trip() {
        let config = OverlayConfig {
            colour: Some(String::from("#ff8800")),
            ..Default::default()
        };
        let text = serde_json::to_string(&config).unwrap();
        let back: OverlayConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back.colour.as_deref(), Some("#ff8800"));
        assert_eq!(back.frame_interval, config.frame_interval);
    }
}
