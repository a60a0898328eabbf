use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::model::SampleSeries;
use crate::error::MaskError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a spectrum from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` – header row plus `wavelength,flux,flux_err` columns
/// * anything else – whitespace-separated ASCII table, three columns per line,
///   blank lines and `#` comments ignored
pub fn load_file(path: &Path) -> Result<SampleSeries> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "csv" => read_csv(path)?,
        _ => read_ascii(path)?,
    };
    log::debug!("Read {} rows from {}", rows.len(), path.display());

    Ok(SampleSeries::load(&rows)?)
}

// ---------------------------------------------------------------------------
// ASCII loader
// ---------------------------------------------------------------------------

/// Expected layout (one sample per line):
///
/// ```text
/// # wavelength  flux   flux_err
/// 4000.0        1.02   0.05
/// 4000.5        0.98   0.05
/// ```
fn read_ascii(path: &Path) -> Result<Vec<[f64; 3]>> {
    let text = std::fs::read_to_string(path).context("reading ASCII spectrum")?;
    Ok(parse_ascii(&text)?)
}

pub(crate) fn parse_ascii(text: &str) -> Result<Vec<[f64; 3]>, MaskError> {
    let mut rows = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let content = line.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }
        let fields: Vec<&str> = content.split_whitespace().collect();
        rows.push(parse_triple(&fields, line_no + 1)?);
    }
    Ok(rows)
}

fn parse_triple(fields: &[&str], row: usize) -> Result<[f64; 3], MaskError> {
    let shape_error = || MaskError::Shape {
        row,
        found: format!("{fields:?}"),
    };
    let [w, f, e] = fields else {
        return Err(shape_error());
    };
    let parse = |tok: &str| tok.parse::<f64>().map_err(|_| shape_error());
    Ok([parse(*w)?, parse(*f)?, parse(*e)?])
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// One CSV record.  Column names are matched after the header row; the
/// camel-case spelling used by some reduction pipelines is accepted too.
#[derive(Debug, Deserialize)]
struct CsvRow {
    wavelength: f64,
    flux: f64,
    #[serde(alias = "fluxError", alias = "flux_error")]
    flux_err: f64,
}

fn read_csv(path: &Path) -> Result<Vec<[f64; 3]>> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;
    parse_csv(reader)
}

fn parse_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<[f64; 3]>> {
    let headers = reader.headers().context("reading CSV headers")?.clone();
    if headers.len() != 3 {
        return Err(MaskError::Shape {
            row: 1,
            found: format!("header {:?}", headers.iter().collect::<Vec<_>>()),
        }
        .into());
    }

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        // Header is line 1.
        let row_no = i + 2;
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let shape_error = || MaskError::Shape {
            row: row_no,
            found: format!("{:?}", record.iter().collect::<Vec<_>>()),
        };
        if record.len() != 3 {
            return Err(shape_error().into());
        }
        let row: CsvRow = record
            .deserialize(Some(&headers))
            .map_err(|_| shape_error())?;
        rows.push([row.wavelength, row.flux, row.flux_err]);
    }
    Ok(rows)
}
