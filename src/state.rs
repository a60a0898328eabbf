use std::sync::mpsc::Sender;

use crate::color::MaskColors;
use crate::masking::frontend::{PlotSnapshot, SpectrumView};

// ---------------------------------------------------------------------------
// Messages from the session thread to the plot window
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum ViewerEvent {
    /// The working spectrum or the ledger changed.
    Redraw(PlotSnapshot),
    /// The session is over; close the window.
    Close,
}

/// [`SpectrumView`] that forwards snapshots to the plot window.
///
/// Once the window is gone the session keeps running in the terminal and
/// further snapshots are dropped.
pub struct ChannelView {
    tx: Sender<ViewerEvent>,
    connected: bool,
}

impl ChannelView {
    pub fn new(tx: Sender<ViewerEvent>) -> Self {
        Self {
            tx,
            connected: true,
        }
    }

    pub fn close(&mut self) {
        if self.connected {
            // The window may already be closed.
            let _ = self.tx.send(ViewerEvent::Close);
            self.connected = false;
        }
    }
}

impl SpectrumView for ChannelView {
    fn redraw(&mut self, snapshot: PlotSnapshot) {
        if self.connected && self.tx.send(ViewerEvent::Redraw(snapshot)).is_err() {
            log::info!("Plot window closed; continuing in the terminal only");
            self.connected = false;
        }
    }
}

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// The full plot-window state, independent of rendering.
pub struct ViewerState {
    /// Name of the spectrum being edited, shown in the top bar.
    pub source: String,

    /// Latest snapshot from the session (None until the first redraw).
    pub snapshot: Option<PlotSnapshot>,

    /// Colour per mask id.
    pub colors: MaskColors,

    /// Draw the flux-error curve.
    pub show_errors: bool,

    /// Draw a marker on every sample.
    pub show_points: bool,

    /// Number of redraws received, shown in the status line.
    pub updates: usize,
}

impl ViewerState {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            snapshot: None,
            colors: MaskColors::default(),
            show_errors: true,
            show_points: true,
            updates: 0,
        }
    }

    /// Apply one event.  Returns `true` when the window should close.
    pub fn apply(&mut self, event: ViewerEvent) -> bool {
        match event {
            ViewerEvent::Redraw(snapshot) => {
                self.snapshot = Some(snapshot);
                self.updates += 1;
                false
            }
            ViewerEvent::Close => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Spectrum;
    use crate::masking::interpolate::InterpolationKind;
    use std::sync::mpsc;

    fn snapshot() -> PlotSnapshot {
        PlotSnapshot {
            spectrum: Spectrum {
                wavelength: vec![1.0, 2.0],
                flux: vec![3.0, 4.0],
                flux_err: vec![0.1, 0.1],
            },
            masks: Vec::new(),
            kind: InterpolationKind::Linear,
        }
    }

    #[test]
    fn test_channel_view_forwards_snapshots() {
        let (tx, rx) = mpsc::channel();
        let mut view = ChannelView::new(tx);
        view.redraw(snapshot());
        view.close();

        let mut state = ViewerState::new("qso.ascii");
        let mut closed = false;
        for event in rx.try_iter() {
            closed |= state.apply(event);
        }
        assert!(closed);
        assert_eq!(state.updates, 1);
        assert_eq!(state.snapshot.unwrap().spectrum.flux, vec![3.0, 4.0]);
    }

    #[test]
    fn test_channel_view_survives_closed_window() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut view = ChannelView::new(tx);
        view.redraw(snapshot());
        view.redraw(snapshot());
        view.close();
        assert!(!view.connected);
    }
}
