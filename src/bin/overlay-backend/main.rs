use clap::Parser;

use env_logger::Env;
use log::{debug, error, info, warn};
use std::thread;
use std::time::Duration;
use tether_agent::TetherAgentOptionsBuilder;

use tether_face_overlay::overlay_config::load_config_from_file;
use tether_face_overlay::scene::PointCloudScene;
use tether_face_overlay::systems::Systems;
use tether_face_overlay::tether_interface::{
    Inputs, Outputs, handle_control_message, handle_detection_message,
    handle_remote_leave_message, handle_remote_overlay_message, publish_overlay,
    request_detection, topic_agent_id,
};

mod cli;
use cli::Cli;

fn main() {
    let cli = Cli::parse();

    // Initialize the logger from the environment

    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level))
        .filter_module("paho_mqtt", log::LevelFilter::Warn)
        .filter_module("tether_agent", log::LevelFilter::Warn)
        .init();

    debug!("Started; args: {:?}", cli);

    let mut tether_agent = TetherAgentOptionsBuilder::new(&cli.agent_role)
        .id(Some(&cli.agent_group))
        .host(Some(&cli.tether_host.to_string()))
        .build()
        .expect("failed to init and/or connect Tether Agent");

    let inputs = Inputs::new(&mut tether_agent);
    let outputs = Outputs::new(&mut tether_agent);

    let config = load_config_from_file(&cli.config_path).expect("failed to load overlay config");

    let mut systems = Systems::new(&config, &mut rand::thread_rng());
    let mut scene = PointCloudScene::new(config.frame_width, config.frame_height);

    systems
        .pipeline
        .start(&mut scene)
        .expect("failed to start render pipeline");

    info!(
        "Overlay pipeline running; frame {}x{}, publishing {}",
        config.frame_width,
        config.frame_height,
        if systems.publisher.is_enabled() {
            "enabled"
        } else {
            "disabled"
        }
    );

    loop {
        let mut work_done = false;

        if let Some((topic, message)) = tether_agent.check_messages() {
            work_done = true;

            if inputs.detection_input.matches(&topic) {
                handle_detection_message(&message, &mut systems, &mut scene);
            }

            if inputs.remote_overlay_input.matches(&topic) {
                if let Some(peer_id) = topic_agent_id(&topic) {
                    // Our own publishes echo back on the same channel
                    if peer_id != cli.agent_group {
                        handle_remote_overlay_message(&peer_id, &message, &mut systems);
                    }
                }
            }

            if inputs.remote_leave_input.matches(&topic) {
                if let Some(peer_id) = topic_agent_id(&topic) {
                    if peer_id != cli.agent_group {
                        handle_remote_leave_message(&peer_id, &mut systems);
                    }
                }
            }

            if inputs.control_input.matches(&topic) {
                handle_control_message(&message, &mut systems, &tether_agent, &outputs);
            }
        }

        if systems.frame_clock.due() {
            work_done = true;

            // Held pan directions apply once per display tick
            systems
                .input_controller
                .apply_active(&mut systems.offset_controller);

            if systems.pipeline.poll_detection_request() {
                if let Err(e) = request_detection(&tether_agent, &outputs) {
                    warn!("Failed to request detection; will retry: {}", e);
                    systems.pipeline.detection_request_failed();
                }
            }
        }

        if systems.publisher.is_due() {
            work_done = true;
            if let Some(frame) = systems.publisher.tick(&systems.local_overlay) {
                if let Err(e) = publish_overlay(&frame, &tether_agent, &outputs) {
                    error!("Failed to publish overlay points: {}", e);
                }
            }
        }

        if !work_done {
            thread::sleep(Duration::from_millis(1));
        }
    }
}
