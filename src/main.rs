mod app;
mod color;
mod data;
mod error;
mod masking;
mod state;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};
use app::BpmViewerApp;
use clap::Parser;
use eframe::egui;

use data::loader::load_file;
use data::writer::output_path;
use masking::frontend::{FileExporter, LogView, StdinConsole};
use masking::interpolate::InterpolationKind;
use masking::session::{Frontend, MaskingSession};
use state::ChannelView;

/// Interactively interpolate out bad pixels and cosmic rays in a 1-D spectrum.
///
/// The spectrum is plotted in a window while commands are typed in the
/// terminal.  `write` saves the current spectrum as <name>.bpm.<ext>.
#[derive(Parser)]
#[command(name = "bpm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Spectrum with three columns: wavelength, flux, flux_err
    spec: PathBuf,

    /// Redshift of the target; wavelengths are shifted to the rest frame
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    zem: f64,

    /// Interpolation kind: linear, nearest, zero, slinear, quadratic, cubic
    #[arg(short, long, default_value = "linear")]
    kind: InterpolationKind,

    /// Output file for `write` (default: <name>.bpm.<ext> next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not open the plot window
    #[arg(long)]
    no_plot: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("-----ERROR: {e:#}");
            eprintln!("-----...Exiting entire program");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut series =
        load_file(&cli.spec).with_context(|| format!("loading {}", cli.spec.display()))?;
    series.rescale(cli.zem)?;
    log::info!(
        "Loaded {} samples from {} (z = {}, kind = {})",
        series.len(),
        cli.spec.display(),
        cli.zem,
        cli.kind
    );

    let exporter = FileExporter {
        path: cli.output.unwrap_or_else(|| output_path(&cli.spec)),
    };
    let session = MaskingSession::new(series, cli.kind);

    if cli.no_plot {
        run_terminal(session, exporter);
        return Ok(());
    }

    let title = cli
        .spec
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| cli.spec.display().to_string());
    run_with_viewer(session, exporter, title)
}

fn run_terminal(mut session: MaskingSession, mut exporter: FileExporter) {
    let mut console = StdinConsole;
    let mut view = LogView;
    session.run(&mut Frontend {
        console: &mut console,
        view: &mut view,
        exporter: &mut exporter,
    });
    log_summary(session);
}

/// Run the session on a worker thread and the plot window on this one.
/// Closing the window leaves the terminal session running; quitting the
/// session closes the window.
fn run_with_viewer(
    mut session: MaskingSession,
    mut exporter: FileExporter,
    title: String,
) -> Result<()> {
    let (tx, rx) = mpsc::channel();

    let worker = thread::Builder::new()
        .name("masking-session".to_string())
        .spawn(move || {
            let mut console = StdinConsole;
            let mut view = ChannelView::new(tx);
            session.run(&mut Frontend {
                console: &mut console,
                view: &mut view,
                exporter: &mut exporter,
            });
            view.close();
            log_summary(session);
        })
        .context("starting session thread")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 700.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let window_title = format!("Bad Pixel Masker – {title}");
    if let Err(e) = eframe::run_native(
        &window_title,
        options,
        Box::new(move |_cc| Ok(Box::new(BpmViewerApp::new(title, rx)))),
    ) {
        log::warn!("Plot window unavailable ({e}); continuing in the terminal");
    }

    worker
        .join()
        .map_err(|_| anyhow::anyhow!("masking session panicked"))
}

fn log_summary(session: MaskingSession) {
    let series = session.into_series();
    let changed = series
        .working()
        .flux
        .iter()
        .zip(&series.original().flux)
        .filter(|(w, o)| w.to_bits() != o.to_bits())
        .count();
    log::info!("{changed} of {} samples differ from the input", series.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["bpm", "qso.ascii"]).unwrap();
        assert_eq!(cli.zem, 0.0);
        assert_eq!(cli.kind, InterpolationKind::Linear);
        assert!(cli.output.is_none());
        assert!(!cli.no_plot);
    }

    #[test]
    fn test_cli_options() {
        let cli = Cli::try_parse_from([
            "bpm", "qso.ascii", "--zem", "2.5", "-k", "cubic", "-o", "fixed.txt", "--no-plot",
        ])
        .unwrap();
        assert_eq!(cli.zem, 2.5);
        assert_eq!(cli.kind, InterpolationKind::Cubic);
        assert_eq!(cli.output, Some(PathBuf::from("fixed.txt")));
        assert!(cli.no_plot);
    }

    #[test]
    fn test_cli_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["bpm", "qso.ascii", "--kind", "spline"]).is_err());
    }
}
