use colorsys::Rgb;
use egui::{
    Color32, Slider,
    plot::{MarkerShape, Plot, PlotPoints, Points},
};

use crate::model::{Model, OverlayCloud};

pub const SPACING_AMOUNT: f32 = 16.0;

pub fn render_ui(ctx: &egui::Context, model: &mut Model) {
    egui::SidePanel::left("settings").show(ctx, |ui| {
        ui.add_space(SPACING_AMOUNT);
        ui.heading("Visualisation Settings");
        ui.horizontal(|ui| {
            ui.label("Point radius");
            ui.add(Slider::new(&mut model.point_size, 1.0..=20.0));
        });
        ui.separator();

        ui.heading("Participants");
        if model.clouds.is_empty() {
            ui.label("No overlay frames received (yet)");
        }
        for (id, cloud) in &model.clouds {
            ui.horizontal(|ui| {
                ui.label(id);
                ui.label(format!("{} points", cloud.points.len() / 3));
            });
        }
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Overlay");
        let overlay_plot = Plot::new("overlay")
            .data_aspect(1.0)
            .include_x(0.)
            .include_x(1280.)
            .include_y(0.)
            .include_y(960.);

        overlay_plot.show(ui, |plot_ui| {
            for cloud in model.clouds.values() {
                plot_ui.points(cloud_to_plot_points(cloud, model.point_size));
            }
        });
    });
}

pub fn cloud_to_plot_points(cloud: &OverlayCloud, size: f32) -> Points {
    let rgb: [u8; 3] = Rgb::from_hex_str(&cloud.colour)
        .unwrap_or_else(|_| Rgb::new(255., 255., 255., None))
        .into();
    let [r, g, b] = rgb;

    // The z component is depth only; the plot is a flat projection
    let plot_points = PlotPoints::new(
        cloud
            .points
            .chunks_exact(3)
            .map(|triple| [triple[0] as f64, triple[1] as f64])
            .collect(),
    );
    Points::new(plot_points)
        .filled(true)
        .radius(size)
        .shape(MarkerShape::Circle)
        .color(Color32::from_rgb(r, g, b))
}
