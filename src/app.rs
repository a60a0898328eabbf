use std::sync::mpsc::Receiver;
use std::time::Duration;

use eframe::egui;

use crate::state::{ViewerEvent, ViewerState};
use crate::ui::{panels, plot};

/// How often the window polls the session channel.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct BpmViewerApp {
    pub state: ViewerState,
    events: Receiver<ViewerEvent>,
}

impl BpmViewerApp {
    pub fn new(source: impl Into<String>, events: Receiver<ViewerEvent>) -> Self {
        Self {
            state: ViewerState::new(source),
            events,
        }
    }
}

impl eframe::App for BpmViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Drain updates from the session thread ----
        let mut close = false;
        for event in self.events.try_iter() {
            close |= self.state.apply(event);
        }
        if close {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        // ---- Top panel: status bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Right side panel: masked regions ----
        egui::SidePanel::right("mask_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::spectral_plot(ui, &self.state);
        });

        ctx.request_repaint_after(POLL_INTERVAL);
    }
}
