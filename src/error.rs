use thiserror::Error;

// ---------------------------------------------------------------------------
// MaskError – every failure the masking core can report
// ---------------------------------------------------------------------------

/// Failures raised by loading, region resolution, interpolation and the
/// ledger.
///
/// `Shape`, `EmptyDataset`, `Unsorted`, `NonFiniteWavelength` and
/// `InvalidRedshift` are fatal and stop the program before a session starts.
/// Everything else is scoped to a single user action: the session reports it
/// and returns to the prompt.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MaskError {
    #[error("row {row}: expected 3 numeric columns (wavelength, flux, flux_err), found {found}")]
    Shape { row: usize, found: String },

    #[error("dataset contains no samples")]
    EmptyDataset,

    #[error("row {row}: wavelength {wavelength} is smaller than the previous sample")]
    Unsorted { row: usize, wavelength: f64 },

    #[error("row {row}: wavelength {wavelength} is not a finite number")]
    NonFiniteWavelength { row: usize, wavelength: f64 },

    #[error("redshift must be greater than -1, got {0}")]
    InvalidRedshift(f64),

    #[error("no samples between {low} and {high}")]
    EmptyRegion { low: f64, high: f64 },

    #[error(
        "window of {radius} samples around indices {low}..={high} runs off the spectrum ({len} samples)"
    )]
    InsufficientNeighbors {
        low: usize,
        high: usize,
        radius: usize,
        len: usize,
    },

    #[error("window radius must be at least 1")]
    InvalidRadius,

    #[error("'{0}' is not an interpolation kind (linear, nearest, zero, slinear, quadratic, cubic)")]
    InvalidKind(String),

    #[error("cannot fit {kind} interpolant: {reason}")]
    DegenerateFit { kind: String, reason: String },

    #[error("wavelength {wavelength} lies outside the anchor span [{min}, {max}]")]
    Extrapolation { wavelength: f64, min: f64, max: f64 },

    #[error("expected {expected} replacement values, got {got}")]
    ReplacementLength { expected: usize, got: usize },

    #[error("no masked region with id {0}")]
    UnknownMask(u32),

    #[error("could not parse '{input}': {reason}")]
    Parse { input: String, reason: String },
}

impl MaskError {
    pub(crate) fn parse(input: &str, reason: impl Into<String>) -> Self {
        MaskError::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
