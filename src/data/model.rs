use std::fmt;
use std::ops::RangeInclusive;

use crate::error::MaskError;

// ---------------------------------------------------------------------------
// Spectrum – parallel wavelength / flux / flux_err columns
// ---------------------------------------------------------------------------

/// A one-dimensional spectrum stored column-wise.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// Spectral axis, non-decreasing.
    pub wavelength: Vec<f64>,
    /// Flux – same length as `wavelength`.
    pub flux: Vec<f64>,
    /// One-sigma flux uncertainty – same length as `wavelength`.
    pub flux_err: Vec<f64>,
}

impl Spectrum {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.wavelength.len()
    }

    /// Whether the spectrum is empty.
    pub fn is_empty(&self) -> bool {
        self.wavelength.is_empty()
    }

    /// Iterate `(wavelength, flux, flux_err)` triples in row order.
    pub fn rows(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.wavelength
            .iter()
            .zip(&self.flux)
            .zip(&self.flux_err)
            .map(|((&w, &f), &e)| (w, f, e))
    }
}

// ---------------------------------------------------------------------------
// IndexRange – inclusive run of sample indices
// ---------------------------------------------------------------------------

/// An inclusive, non-empty index range `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    pub low: usize,
    pub high: usize,
}

impl IndexRange {
    pub fn new(low: usize, high: usize) -> Self {
        debug_assert!(low <= high);
        Self { low, high }
    }

    pub fn len(&self) -> usize {
        self.high - self.low + 1
    }

    pub fn as_range(&self) -> RangeInclusive<usize> {
        self.low..=self.high
    }
}

impl fmt::Display for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.low, self.high)
    }
}

// ---------------------------------------------------------------------------
// SampleSeries – pristine snapshot plus the working copy being edited
// ---------------------------------------------------------------------------

/// The loaded dataset: an `original` that is never edited after load and a
/// `working` copy whose flux is replaced by masking.
///
/// Only `working.flux` is mutable through the public API, so the original is
/// always available to undo an edit.
#[derive(Debug, Clone)]
pub struct SampleSeries {
    original: Spectrum,
    working: Spectrum,
}

impl SampleSeries {
    /// Build a series from raw rows.  Every row must hold exactly three values
    /// and the wavelength axis must be non-decreasing.
    pub fn load<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, MaskError> {
        if rows.is_empty() {
            return Err(MaskError::EmptyDataset);
        }

        let mut wavelength = Vec::with_capacity(rows.len());
        let mut flux = Vec::with_capacity(rows.len());
        let mut flux_err = Vec::with_capacity(rows.len());

        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let [w, f, e] = row else {
                return Err(MaskError::Shape {
                    row: i + 1,
                    found: format!("{} values", row.len()),
                });
            };
            if !w.is_finite() {
                return Err(MaskError::NonFiniteWavelength {
                    row: i + 1,
                    wavelength: *w,
                });
            }
            if let Some(&prev) = wavelength.last() {
                if *w < prev {
                    return Err(MaskError::Unsorted {
                        row: i + 1,
                        wavelength: *w,
                    });
                }
            }
            wavelength.push(*w);
            flux.push(*f);
            flux_err.push(*e);
        }

        let original = Spectrum {
            wavelength,
            flux,
            flux_err,
        };
        Ok(Self {
            working: original.clone(),
            original,
        })
    }

    /// Shift to the rest frame: `wavelength /= 1 + z` on both copies.
    pub fn rescale(&mut self, z: f64) -> Result<(), MaskError> {
        if !(z > -1.0) || !z.is_finite() {
            return Err(MaskError::InvalidRedshift(z));
        }
        if z == 0.0 {
            return Ok(());
        }
        let factor = 1.0 + z;
        for w in self
            .original
            .wavelength
            .iter_mut()
            .chain(self.working.wavelength.iter_mut())
        {
            *w /= factor;
        }
        Ok(())
    }

    pub fn original(&self) -> &Spectrum {
        &self.original
    }

    pub fn working(&self) -> &Spectrum {
        &self.working
    }

    pub fn len(&self) -> usize {
        self.original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    /// Restore `working.flux` over `range` from the original.
    pub fn revert_range(&mut self, range: IndexRange) {
        let r = range.as_range();
        self.working.flux[r.clone()].copy_from_slice(&self.original.flux[r]);
    }

    /// Overwrite `working.flux` over `range` with `values`.
    pub fn apply_range(&mut self, range: IndexRange, values: &[f64]) -> Result<(), MaskError> {
        if values.len() != range.len() {
            return Err(MaskError::ReplacementLength {
                expected: range.len(),
                got: values.len(),
            });
        }
        self.working.flux[range.as_range()].copy_from_slice(values);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rows() -> Vec<[f64; 3]> {
        vec![
            [4000.0, 10.0, 0.1],
            [4001.0, 50.0, 0.1],
            [4002.0, 11.0, 0.1],
            [4003.0, 9.0, 0.1],
            [4004.0, 10.0, 0.1],
        ]
    }

    #[test]
    fn test_load_copies_original_into_working() {
        let series = SampleSeries::load(&rows()).unwrap();
        assert_eq!(series.len(), 5);
        assert_eq!(series.original(), series.working());
        assert_eq!(series.working().flux, vec![10.0, 50.0, 11.0, 9.0, 10.0]);
    }

    #[test]
    fn test_load_rejects_wrong_column_count() {
        let rows: Vec<Vec<f64>> = vec![vec![1.0, 2.0, 3.0], vec![2.0, 3.0]];
        let err = SampleSeries::load(&rows).unwrap_err();
        assert!(matches!(err, MaskError::Shape { row: 2, .. }));
    }

    #[test]
    fn test_load_rejects_decreasing_wavelength() {
        let rows = vec![[2.0, 1.0, 0.1], [1.0, 1.0, 0.1]];
        let err = SampleSeries::load(&rows).unwrap_err();
        assert!(matches!(err, MaskError::Unsorted { row: 2, .. }));
    }

    #[test]
    fn test_load_rejects_nan_wavelength() {
        let rows = vec![[4000.0, 1.0, 0.1], [f64::NAN, 1.0, 0.1], [3000.0, 1.0, 0.1]];
        let err = SampleSeries::load(&rows).unwrap_err();
        assert!(matches!(err, MaskError::NonFiniteWavelength { row: 2, .. }));
    }

    #[test]
    fn test_load_rejects_empty() {
        let rows: Vec<[f64; 3]> = Vec::new();
        assert_eq!(SampleSeries::load(&rows).unwrap_err(), MaskError::EmptyDataset);
    }

    #[test]
    fn test_rescale_divides_both_copies() {
        let mut series = SampleSeries::load(&rows()).unwrap();
        series.rescale(1.0).unwrap();
        assert_relative_eq!(series.original().wavelength[0], 2000.0);
        assert_relative_eq!(series.working().wavelength[4], 2002.0);
        assert_eq!(series.working().flux, series.original().flux);
    }

    #[test]
    fn test_rescale_zero_is_noop() {
        let mut series = SampleSeries::load(&rows()).unwrap();
        series.rescale(0.0).unwrap();
        assert_eq!(series.working().wavelength[1], 4001.0);
    }

    #[test]
    fn test_rescale_rejects_non_physical_redshift() {
        let mut series = SampleSeries::load(&rows()).unwrap();
        assert!(matches!(series.rescale(-1.0), Err(MaskError::InvalidRedshift(_))));
        assert!(matches!(series.rescale(f64::NAN), Err(MaskError::InvalidRedshift(_))));
    }

    #[test]
    fn test_apply_then_revert_restores_original() {
        let mut series = SampleSeries::load(&rows()).unwrap();
        let range = IndexRange::new(1, 2);
        series.apply_range(range, &[1.0, 2.0]).unwrap();
        assert_eq!(series.working().flux, vec![10.0, 1.0, 2.0, 9.0, 10.0]);
        assert_eq!(series.original().flux, vec![10.0, 50.0, 11.0, 9.0, 10.0]);

        series.revert_range(range);
        assert_eq!(series.working(), series.original());
    }

    #[test]
    fn test_apply_rejects_length_mismatch() {
        let mut series = SampleSeries::load(&rows()).unwrap();
        let err = series.apply_range(IndexRange::new(0, 2), &[1.0]).unwrap_err();
        assert_eq!(err, MaskError::ReplacementLength { expected: 3, got: 1 });
        assert_eq!(series.working(), series.original());
    }
}
