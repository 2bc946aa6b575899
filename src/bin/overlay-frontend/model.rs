use clap::Parser;
use indexmap::IndexMap;
use log::{info, warn};
use tether_agent::{ChannelDefinition, ChannelOptionsBuilder, TetherAgent, TetherAgentOptionsBuilder};
use tether_face_overlay::systems::publisher::OverlayFrame;
use tether_face_overlay::tether_interface::topic_agent_id;

use crate::cli::Cli;
use crate::ui::render_ui;

pub struct OverlayCloud {
    pub points: Vec<f32>,
    pub colour: String,
}

pub struct Model {
    pub tether_agent: TetherAgent,
    pub overlay_input: ChannelDefinition,
    pub leave_input: ChannelDefinition,
    pub clouds: IndexMap<String, OverlayCloud>,
    pub point_size: f32,
}

impl Default for Model {
    fn default() -> Self {
        let cli = Cli::parse();

        let mut tether_agent = TetherAgentOptionsBuilder::new("overlayFrontend")
            .host(Some(&cli.tether_host.to_string()))
            .build()
            .expect("failed to init+connect Tether Agent");

        let overlay_input = ChannelOptionsBuilder::create_receiver("overlayPoints")
            .qos(Some(0))
            .build(&mut tether_agent)
            .expect("failed to create Input Channel");
        let leave_input = ChannelOptionsBuilder::create_receiver("overlayLeave")
            .qos(Some(2))
            .build(&mut tether_agent)
            .expect("failed to create Input Channel");

        info!("Overlay Frontend started OK");

        Model {
            tether_agent,
            overlay_input,
            leave_input,
            clouds: IndexMap::new(),
            point_size: cli.point_size,
        }
    }
}

impl eframe::App for Model {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Some((topic, message)) = self.tether_agent.check_messages() {
            if self.overlay_input.matches(&topic) {
                if let Some(peer_id) = topic_agent_id(&topic) {
                    match rmp_serde::from_slice::<OverlayFrame>(&message) {
                        Ok(frame) => {
                            let cloud = self.clouds.entry(peer_id).or_insert(OverlayCloud {
                                points: Vec::new(),
                                colour: String::from("#ffffff"),
                            });
                            cloud.points.clear();
                            cloud.points.extend_from_slice(&frame.points);
                            cloud.colour = frame.colour;
                        }
                        Err(e) => warn!("Failed to decode overlay frame: {}", e),
                    }
                }
            }

            if self.leave_input.matches(&topic) {
                if let Some(peer_id) = topic_agent_id(&topic) {
                    if self.clouds.shift_remove(&peer_id).is_some() {
                        info!("Participant \"{}\" left", peer_id);
                    }
                }
            }
        }

        render_ui(ctx, self);

        ctx.request_repaint();
    }
}
