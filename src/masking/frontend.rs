use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use super::interpolate::InterpolationKind;
use super::ledger::MaskEntry;
use crate::data::model::Spectrum;
use crate::data::writer::write_spectrum;

// ---------------------------------------------------------------------------
// Collaborators the session talks to
// ---------------------------------------------------------------------------

/// Text input/output with the user.
pub trait Console {
    /// Show `prompt` and block until the user answers.  `None` once input is
    /// exhausted.
    fn ask(&mut self, prompt: &str) -> Option<String>;

    /// Show a message.
    fn say(&mut self, message: &str);
}

/// Receives a snapshot after every change to the working flux.
pub trait SpectrumView {
    fn redraw(&mut self, snapshot: PlotSnapshot);
}

/// Persists the working spectrum.  Returns where it went.
pub trait Exporter {
    fn export(&mut self, spectrum: &Spectrum) -> Result<PathBuf>;
}

/// Everything a view needs to draw the current state.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSnapshot {
    pub spectrum: Spectrum,
    pub masks: Vec<MaskEntry>,
    pub kind: InterpolationKind,
}

// ---------------------------------------------------------------------------
// Terminal implementations
// ---------------------------------------------------------------------------

/// Prompts on stdout, reads answers from stdin.
#[derive(Debug, Default)]
pub struct StdinConsole;

impl Console for StdinConsole {
    fn ask(&mut self, prompt: &str) -> Option<String> {
        print!("{prompt}");
        if let Err(e) = io::stdout().flush() {
            log::warn!("Failed to flush stdout: {e}");
        }
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                log::error!("Failed to read from stdin: {e}");
                None
            }
        }
    }

    fn say(&mut self, message: &str) {
        println!("{message}");
    }
}

/// View used with `--no-plot`: only logs what would be drawn.
#[derive(Debug, Default)]
pub struct LogView;

impl SpectrumView for LogView {
    fn redraw(&mut self, snapshot: PlotSnapshot) {
        log::info!(
            "Spectrum updated: {} samples, {} masked region(s), kind {}",
            snapshot.spectrum.len(),
            snapshot.masks.len(),
            snapshot.kind
        );
    }
}

/// Writes the spectrum to a fixed path.
#[derive(Debug, Clone)]
pub struct FileExporter {
    pub path: PathBuf,
}

impl Exporter for FileExporter {
    fn export(&mut self, spectrum: &Spectrum) -> Result<PathBuf> {
        write_spectrum(&self.path, spectrum)?;
        log::info!("Wrote {} samples to {}", spectrum.len(), self.path.display());
        Ok(self.path.clone())
    }
}
