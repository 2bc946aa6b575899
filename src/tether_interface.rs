use anyhow::Result;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tether_agent::{
    ChannelDefinition, ChannelOptionsBuilder, TetherAgent,
    channels::tether_compliant_topic::TetherOrCustomTopic,
};

use crate::{
    detection::DetectionResult,
    scene::PointCloudScene,
    systems::{Systems, offset::StepDirection, publisher::OverlayFrame},
};

pub struct Outputs {
    pub detection_request_output: ChannelDefinition,
    pub overlay_output: ChannelDefinition,
    pub leave_output: ChannelDefinition,
}

impl Outputs {
    pub fn new(tether_agent: &mut TetherAgent) -> Outputs {
        let detection_request_output = ChannelOptionsBuilder::create_sender("requestDetection")
            .qos(Some(0))
            .build(tether_agent)
            .expect("failed to create Output Channel");

        let overlay_output = ChannelOptionsBuilder::create_sender("overlayPoints")
            .qos(Some(0))
            .build(tether_agent)
            .expect("failed to create Output Channel");

        // Leave messages must arrive even over a flaky link, so peers converge
        let leave_output = ChannelOptionsBuilder::create_sender("overlayLeave")
            .qos(Some(2))
            .build(tether_agent)
            .expect("failed to create Output Channel");

        Outputs {
            detection_request_output,
            overlay_output,
            leave_output,
        }
    }
}

pub struct Inputs {
    pub detection_input: ChannelDefinition,
    pub remote_overlay_input: ChannelDefinition,
    pub remote_leave_input: ChannelDefinition,
    pub control_input: ChannelDefinition,
}

impl Inputs {
    pub fn new(tether_agent: &mut TetherAgent) -> Inputs {
        let detection_input = ChannelOptionsBuilder::create_receiver("detectionFrames")
            .qos(Some(0))
            .build(tether_agent)
            .expect("failed to create Input Channel");
        let remote_overlay_input = ChannelOptionsBuilder::create_receiver("overlayPoints")
            .qos(Some(0))
            .build(tether_agent)
            .expect("failed to create Input Channel");
        let remote_leave_input = ChannelOptionsBuilder::create_receiver("overlayLeave")
            .qos(Some(2))
            .build(tether_agent)
            .expect("failed to create Input Channel");
        let control_input = ChannelOptionsBuilder::create_receiver("overlayControl")
            .qos(Some(2))
            .build(tether_agent)
            .expect("failed to create Input Channel");

        Inputs {
            detection_input,
            remote_overlay_input,
            remote_leave_input,
            control_input,
        }
    }
}

/// User controls consumed by the overlay core. `direction`, `colour` and
/// `rate` only apply to some command types.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ControlMessage {
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f32>,
}

/// Extract the sending agent's id from a Tether topic; peer identity on the
/// overlay channels comes from here, the same way lidar serials do
pub fn topic_agent_id(topic: &TetherOrCustomTopic) -> Option<String> {
    match topic {
        TetherOrCustomTopic::Tether(t) => t.id().map(String::from),
        TetherOrCustomTopic::Custom(s) => {
            warn!("Custom topic \"{}\" carries no agent id; ignoring", s);
            None
        }
    }
}

pub fn handle_detection_message(
    payload: &[u8],
    systems: &mut Systems,
    scene: &mut PointCloudScene,
) {
    match rmp_serde::from_slice::<DetectionResult>(payload) {
        Ok(detection) => {
            let offset = systems.offset_controller.state();
            systems.pipeline.on_detection(
                &detection,
                offset,
                &mut systems.local_overlay,
                &systems.remote_store,
                scene,
            );
        }
        Err(e) => warn!("Failed to decode detection result: {}", e),
    }
}

pub fn handle_remote_overlay_message(peer_id: &str, payload: &[u8], systems: &mut Systems) {
    match rmp_serde::from_slice::<OverlayFrame>(payload) {
        Ok(frame) => {
            if frame.points.len() % 3 != 0 {
                warn!(
                    "Overlay frame from \"{}\" has invalid stride ({} floats); ignoring",
                    peer_id,
                    frame.points.len()
                );
                return;
            }
            systems
                .remote_store
                .upsert(peer_id, &frame.points, &frame.colour);
        }
        Err(e) => warn!("Failed to decode overlay frame from \"{}\": {}", peer_id, e),
    }
}

pub fn handle_remote_leave_message(peer_id: &str, systems: &mut Systems) {
    if systems.remote_store.remove(peer_id) {
        info!("Peer \"{}\" left; removed their overlay", peer_id);
    }
}

pub fn handle_control_message(
    payload: &[u8],
    systems: &mut Systems,
    tether_agent: &TetherAgent,
    outputs: &Outputs,
) {
    let control = match rmp_serde::from_slice::<ControlMessage>(payload) {
        Ok(control) => control,
        Err(e) => {
            warn!("Failed to parse control message: {}", e);
            return;
        }
    };

    let command_type: &str = &control.r#type;
    match command_type {
        "panStart" => match parse_direction(&control) {
            Some(direction) => systems.input_controller.press(direction),
            None => warn!("panStart without a valid direction"),
        },
        "panStop" => match parse_direction(&control) {
            Some(direction) => systems.input_controller.release(direction),
            None => warn!("panStop without a valid direction"),
        },
        "tracking" => {
            let enabled = systems.local_overlay.toggle_tracking();
            info!("Tracking toggled {}", if enabled { "on" } else { "off" });
        }
        "colour" => match &control.colour {
            Some(colour) => {
                systems.local_overlay.set_colour(colour);
                info!("Overlay colour set to \"{}\"", colour);
            }
            None => warn!("colour command without a colour value"),
        },
        "join" => {
            let rate = control.rate.unwrap_or(systems.publish_rate_hz);
            systems.publisher.enable(rate);
        }
        "leave" => {
            systems.publisher.disable();
            if let Err(e) = publish_leave(tether_agent, outputs) {
                warn!("Failed to announce leave: {}", e);
            }
        }
        _ => {
            warn!("Unrecognised control type \"{}\"", command_type);
        }
    }
}

pub fn request_detection(tether_agent: &TetherAgent, outputs: &Outputs) -> Result<()> {
    tether_agent.send_raw(&outputs.detection_request_output, None)?;
    Ok(())
}

pub fn publish_overlay(
    frame: &OverlayFrame,
    tether_agent: &TetherAgent,
    outputs: &Outputs,
) -> Result<()> {
    let payload = rmp_serde::to_vec(frame)?;
    tether_agent.send_raw(&outputs.overlay_output, Some(&payload))?;
    Ok(())
}

pub fn publish_leave(tether_agent: &TetherAgent, outputs: &Outputs) -> Result<()> {
    debug!("Announcing leave to peers");
    tether_agent.send_raw(&outputs.leave_output, None)?;
    Ok(())
}

fn parse_direction(control: &ControlMessage) -> Option<StepDirection> {
    control
        .direction
        .as_deref()
        .and_then(StepDirection::from_name)
}
