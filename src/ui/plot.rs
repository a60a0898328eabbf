use eframe::egui::{Color32, Ui};
use egui_plot::{Line, Plot, PlotPoints, Points, VLine};

use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Spectral plot (central panel)
// ---------------------------------------------------------------------------

/// Render the working spectrum with its masked regions.
pub fn spectral_plot(ui: &mut Ui, state: &ViewerState) {
    let snapshot = match &state.snapshot {
        Some(s) => s,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Waiting for the spectrum…");
            });
            return;
        }
    };
    let spectrum = &snapshot.spectrum;

    let xy = |ys: &[f64]| {
        spectrum
            .wavelength
            .iter()
            .zip(ys)
            .map(|(&x, &y)| [x, y])
            .collect::<PlotPoints>()
    };

    Plot::new("spectral_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label("Wavelength (Å)")
        .y_axis_label("Flux")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(xy(&spectrum.flux))
                    .name("flux")
                    .color(Color32::LIGHT_GRAY)
                    .width(1.5),
            );

            if state.show_points {
                plot_ui.points(
                    Points::new(xy(&spectrum.flux))
                        .name("samples")
                        .color(Color32::LIGHT_BLUE)
                        .radius(2.0),
                );
            }

            if state.show_errors {
                plot_ui.line(
                    Line::new(xy(&spectrum.flux_err))
                        .name("flux error")
                        .color(Color32::DARK_GRAY)
                        .width(1.0),
                );
            }

            for mask in &snapshot.masks {
                let color = state.colors.color_for(mask.id);
                let name = format!("mask {}", mask.id);
                for bound in [mask.region.low, mask.region.high] {
                    plot_ui.vline(VLine::new(bound).color(color).name(&name));
                }
            }
        });
}
