use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Right side panel – masked regions
// ---------------------------------------------------------------------------

/// List the masks currently in the ledger, coloured like their plot markers.
pub fn side_panel(ui: &mut Ui, state: &ViewerState) {
    ui.heading("Masked regions");
    ui.separator();

    let Some(snapshot) = &state.snapshot else {
        ui.label("No spectrum yet.");
        return;
    };

    if snapshot.masks.is_empty() {
        ui.label("None. Type 'mask' in the terminal.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for mask in &snapshot.masks {
                let text = format!("{}: {}", mask.id, mask.region);
                ui.label(RichText::new(text).color(state.colors.color_for(mask.id)));
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top status bar with the display toggles.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.strong(&state.source);
        ui.separator();

        if let Some(snapshot) = &state.snapshot {
            ui.label(format!(
                "{} samples, {} masked region(s), interpolation: {}",
                snapshot.spectrum.len(),
                snapshot.masks.len(),
                snapshot.kind
            ));
        } else {
            ui.label(RichText::new("waiting for session").color(Color32::YELLOW));
        }

        ui.separator();

        if ui.selectable_label(state.show_points, "Points").clicked() {
            state.show_points = !state.show_points;
        }
        if ui.selectable_label(state.show_errors, "Flux error").clicked() {
            state.show_errors = !state.show_errors;
        }

        ui.separator();
        ui.label(format!("updates: {}", state.updates));
    });
}
