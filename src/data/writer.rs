use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use super::model::Spectrum;

/// Marker inserted into exported file names (`bpm` = bad pixel masker).
pub const OUTPUT_MARKER: &str = "bpm";

/// Derive the export path from the input path by inserting
/// [`OUTPUT_MARKER`] before the final extension:
/// `qso.ascii` → `qso.bpm.ascii`, `qso` → `qso.bpm`.
pub fn output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}.{OUTPUT_MARKER}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{OUTPUT_MARKER}"),
    };
    input.with_file_name(name)
}

#[derive(Serialize)]
struct Row {
    wavelength: f64,
    flux: f64,
    flux_err: f64,
}

/// Write `spectrum` to `path`, one `wavelength flux flux_err` row per sample
/// in input order.
///
/// `.csv` targets get a comma-separated table with a header row; every other
/// extension is written as single-space separated columns with no header.
pub fn write_spectrum(path: &Path, spectrum: &Spectrum) -> Result<()> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let mut writer = csv::WriterBuilder::new()
        .delimiter(if is_csv { b',' } else { b' ' })
        .has_headers(is_csv)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    for (wavelength, flux, flux_err) in spectrum.rows() {
        writer
            .serialize(Row {
                wavelength,
                flux,
                flux_err,
            })
            .context("writing spectrum row")?;
    }
    writer.flush().context("flushing spectrum file")?;
    Ok(())
}
