use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use nalgebra::{DMatrix, DVector};

use crate::data::model::{IndexRange, Spectrum};
use crate::error::MaskError;

// ---------------------------------------------------------------------------
// InterpolationKind – the closed set of supported interpolants
// ---------------------------------------------------------------------------

/// Interpolant used to bridge a masked range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationKind {
    /// Piecewise linear between the bracketing anchors.
    #[default]
    Linear,
    /// Value of the closest anchor (ties go to the lower one).
    Nearest,
    /// Degree-0 spline: the value of the anchor at or below the target.
    Zero,
    /// Degree-1 spline.
    Slinear,
    /// Degree-2 interpolating spline.
    Quadratic,
    /// Degree-3 not-a-knot interpolating spline.
    Cubic,
}

impl InterpolationKind {
    pub const ALL: [InterpolationKind; 6] = [
        InterpolationKind::Linear,
        InterpolationKind::Nearest,
        InterpolationKind::Zero,
        InterpolationKind::Slinear,
        InterpolationKind::Quadratic,
        InterpolationKind::Cubic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InterpolationKind::Linear => "linear",
            InterpolationKind::Nearest => "nearest",
            InterpolationKind::Zero => "zero",
            InterpolationKind::Slinear => "slinear",
            InterpolationKind::Quadratic => "quadratic",
            InterpolationKind::Cubic => "cubic",
        }
    }

    /// Smallest number of anchors the interpolant can be built from.
    pub fn min_points(self) -> usize {
        match self {
            InterpolationKind::Nearest | InterpolationKind::Zero => 1,
            InterpolationKind::Linear | InterpolationKind::Slinear => 2,
            InterpolationKind::Quadratic => 3,
            InterpolationKind::Cubic => 4,
        }
    }
}

impl fmt::Display for InterpolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterpolationKind {
    type Err = MaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| MaskError::InvalidKind(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Anchor windows
// ---------------------------------------------------------------------------

/// The interpolated values for one masked range, plus the anchor windows they
/// were computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    pub range: IndexRange,
    pub left: Range<usize>,
    pub right: Range<usize>,
    pub values: Vec<f64>,
}

/// Flanking anchor windows for `range`:
/// left = `[low - radius, low - 1)`, right = `[high + 1, high + radius)`.
///
/// The left window skips the sample directly below the masked range and the
/// right window stops one short of `high + radius`.  Callers that want `w`
/// anchors per side pass `radius = w + 1`.
pub fn anchor_windows(
    range: IndexRange,
    radius: usize,
    len: usize,
) -> Result<(Range<usize>, Range<usize>), MaskError> {
    if radius == 0 {
        return Err(MaskError::InvalidRadius);
    }
    let out_of_bounds = MaskError::InsufficientNeighbors {
        low: range.low,
        high: range.high,
        radius,
        len,
    };
    let Some(left_start) = range.low.checked_sub(radius) else {
        return Err(out_of_bounds);
    };
    let Some(right_end) = range.high.checked_add(radius).filter(|&end| end < len) else {
        return Err(out_of_bounds);
    };
    Ok((left_start..range.low - 1, range.high + 1..right_end))
}

/// Fit `kind` to the anchors around `range` and evaluate it at every
/// wavelength inside the range.  Nothing is mutated.
pub fn fit(
    spectrum: &Spectrum,
    range: IndexRange,
    radius: usize,
    kind: InterpolationKind,
) -> Result<Replacement, MaskError> {
    let (left, right) = anchor_windows(range, radius, spectrum.len())?;

    let x: Vec<f64> = spectrum.wavelength[left.clone()]
        .iter()
        .chain(&spectrum.wavelength[right.clone()])
        .copied()
        .collect();
    let y: Vec<f64> = spectrum.flux[left.clone()]
        .iter()
        .chain(&spectrum.flux[right.clone()])
        .copied()
        .collect();

    let interpolant = Interpolant::new(kind, x, y)?;
    let (min, max) = interpolant.span();

    let values = spectrum.wavelength[range.as_range()]
        .iter()
        .map(|&w| {
            if w < min || w > max {
                Err(MaskError::Extrapolation {
                    wavelength: w,
                    min,
                    max,
                })
            } else {
                Ok(interpolant.eval(w))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Replacement {
        range,
        left,
        right,
        values,
    })
}

// ---------------------------------------------------------------------------
// Interpolants
// ---------------------------------------------------------------------------

enum Interpolant {
    Linear { x: Vec<f64>, y: Vec<f64> },
    Nearest { x: Vec<f64>, y: Vec<f64> },
    Spline(BSpline),
}

impl Interpolant {
    fn new(kind: InterpolationKind, x: Vec<f64>, y: Vec<f64>) -> Result<Self, MaskError> {
        let degenerate = |reason: String| MaskError::DegenerateFit {
            kind: kind.to_string(),
            reason,
        };
        if x.len() < kind.min_points() {
            return Err(degenerate(format!(
                "needs at least {} anchors, got {}",
                kind.min_points(),
                x.len()
            )));
        }
        if x.windows(2).any(|w| w[1] <= w[0]) {
            return Err(degenerate(
                "anchor wavelengths must be strictly increasing".to_string(),
            ));
        }

        let degree = match kind {
            InterpolationKind::Linear => return Ok(Interpolant::Linear { x, y }),
            InterpolationKind::Nearest => return Ok(Interpolant::Nearest { x, y }),
            InterpolationKind::Zero => 0,
            InterpolationKind::Slinear => 1,
            InterpolationKind::Quadratic => 2,
            InterpolationKind::Cubic => 3,
        };
        BSpline::interpolating(x, &y, degree)
            .map(Interpolant::Spline)
            .map_err(degenerate)
    }

    /// Smallest and largest anchor wavelength.
    fn span(&self) -> (f64, f64) {
        let x = match self {
            Interpolant::Linear { x, .. } | Interpolant::Nearest { x, .. } => x,
            Interpolant::Spline(s) => &s.x,
        };
        (x[0], x[x.len() - 1])
    }

    fn eval(&self, t: f64) -> f64 {
        match self {
            Interpolant::Linear { x, y } => {
                // Index of the first anchor >= t, kept inside [1, n - 1].
                let hi = x.partition_point(|&v| v < t).clamp(1, x.len() - 1);
                let lo = hi - 1;
                let slope = (y[hi] - y[lo]) / (x[hi] - x[lo]);
                y[lo] + (t - x[lo]) * slope
            }
            Interpolant::Nearest { x, y } => {
                let idx = x
                    .windows(2)
                    .filter(|w| (w[0] + w[1]) / 2.0 < t)
                    .count();
                y[idx]
            }
            Interpolant::Spline(s) => s.eval(t),
        }
    }
}

// ---------------------------------------------------------------------------
// BSpline – interpolating B-spline of degree 0..=3
// ---------------------------------------------------------------------------

/// A B-spline `sum_i c_i B_{i,k}(t)` that passes through every anchor.
struct BSpline {
    /// Anchor wavelengths the spline interpolates.
    x: Vec<f64>,
    knots: Vec<f64>,
    coeffs: Vec<f64>,
    degree: usize,
}

impl BSpline {
    /// Build the interpolating spline through `(x, y)`.
    ///
    /// Knots: degree 0 and 1 put one knot on every anchor and use `y` as the
    /// coefficients directly.  Degree 2 places interior knots at anchor
    /// midpoints, omitting the second and second-to-last.  Degree 3 uses
    /// not-a-knot conditions (interior knots at `x[2..n-2]`).  Degree 2 and 3
    /// coefficients solve the collocation system.
    fn interpolating(x: Vec<f64>, y: &[f64], degree: usize) -> Result<Self, String> {
        let n = x.len();
        let first = x[0];
        let last = x[n - 1];

        let knots: Vec<f64> = match degree {
            0 => x.iter().copied().chain([last]).collect(),
            1 => [first]
                .into_iter()
                .chain(x.iter().copied())
                .chain([last])
                .collect(),
            2 => {
                let mids: Vec<f64> = x.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();
                let interior = if n > 3 { &mids[1..n - 2] } else { &[][..] };
                [first; 3]
                    .into_iter()
                    .chain(interior.iter().copied())
                    .chain([last; 3])
                    .collect()
            }
            3 => [first; 4]
                .into_iter()
                .chain(x[2..n - 2].iter().copied())
                .chain([last; 4])
                .collect(),
            other => return Err(format!("unsupported spline degree {other}")),
        };
        debug_assert_eq!(knots.len(), n + degree + 1);

        let mut spline = BSpline {
            x,
            knots,
            coeffs: y.to_vec(),
            degree,
        };
        if degree >= 2 {
            spline.coeffs = spline.solve_coefficients(y)?;
        }
        Ok(spline)
    }

    /// Knot span `l` in `[k, n - 1]` with `t[l] <= t < t[l + 1]`; the right
    /// end of the support maps to the last span.
    fn span(&self, t: f64) -> usize {
        let k = self.degree;
        let n = self.coeffs.len();
        k + self.knots[k + 1..n].partition_point(|&knot| knot <= t)
    }

    /// Values of the `k + 1` basis functions that are non-zero on `span`.
    fn basis(&self, span: usize, t: f64) -> Vec<f64> {
        let k = self.degree;
        let mut values = vec![0.0; k + 1];
        let mut left = vec![0.0; k + 1];
        let mut right = vec![0.0; k + 1];
        values[0] = 1.0;
        for j in 1..=k {
            left[j] = t - self.knots[span + 1 - j];
            right[j] = self.knots[span + j] - t;
            let mut saved = 0.0;
            for r in 0..j {
                let temp = values[r] / (right[r + 1] + left[j - r]);
                values[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            values[j] = saved;
        }
        values
    }

    fn eval(&self, t: f64) -> f64 {
        let span = self.span(t);
        let offset = span - self.degree;
        self.basis(span, t)
            .iter()
            .enumerate()
            .map(|(j, b)| b * self.coeffs[offset + j])
            .sum()
    }

    /// Coefficients whose spline passes through every anchor, from the
    /// collocation system `B c = y`.
    fn solve_coefficients(&self, y: &[f64]) -> Result<Vec<f64>, String> {
        let n = self.x.len();
        let mut collocation = DMatrix::<f64>::zeros(n, n);
        for (row, &t) in self.x.iter().enumerate() {
            let span = self.span(t);
            let offset = span - self.degree;
            for (j, b) in self.basis(span, t).into_iter().enumerate() {
                collocation[(row, offset + j)] = b;
            }
        }
        let rhs = DVector::<f64>::from_column_slice(y);
        collocation
            .lu()
            .solve(&rhs)
            .filter(|c| c.iter().all(|v| v.is_finite()))
            .map(|c| c.iter().copied().collect())
            .ok_or_else(|| "collocation matrix is singular".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Eleven samples, flux `10 + i`, with a spike at index 5.
    fn ramp_with_spike() -> Spectrum {
        let wavelength: Vec<f64> = (0..11).map(|i| 4000.0 + f64::from(i)).collect();
        let mut flux: Vec<f64> = (0..11).map(|i| 10.0 + f64::from(i)).collect();
        flux[5] = 500.0;
        Spectrum {
            wavelength,
            flux,
            flux_err: vec![0.1; 11],
        }
    }

    fn polynomial_spectrum(f: impl Fn(f64) -> f64) -> Spectrum {
        let wavelength: Vec<f64> = (0..12).map(|i: i32| f64::from(i)).collect();
        let flux = wavelength.iter().map(|&x| f(x)).collect();
        Spectrum {
            wavelength,
            flux,
            flux_err: vec![0.0; 12],
        }
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("cubic".parse::<InterpolationKind>().unwrap(), InterpolationKind::Cubic);
        assert_eq!(
            " nearest ".parse::<InterpolationKind>().unwrap(),
            InterpolationKind::Nearest
        );
        assert_eq!(
            "spline".parse::<InterpolationKind>().unwrap_err(),
            MaskError::InvalidKind("spline".to_string())
        );
        for kind in InterpolationKind::ALL {
            assert_eq!(kind.to_string().parse::<InterpolationKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_anchor_windows_skip_far_edges() {
        let (left, right) = anchor_windows(IndexRange::new(5, 6), 3, 20).unwrap();
        assert_eq!(left, 2..4);
        assert_eq!(right, 7..9);
    }

    #[test]
    fn test_anchor_windows_off_the_left_edge() {
        let err = anchor_windows(IndexRange::new(1, 1), 2, 5).unwrap_err();
        assert!(matches!(err, MaskError::InsufficientNeighbors { .. }));
    }

    #[test]
    fn test_anchor_windows_off_the_right_edge() {
        let err = anchor_windows(IndexRange::new(3, 3), 2, 5).unwrap_err();
        assert!(matches!(err, MaskError::InsufficientNeighbors { .. }));
        assert!(anchor_windows(IndexRange::new(2, 2), 2, 5).is_ok());
    }

    #[test]
    fn test_anchor_windows_huge_radius_is_out_of_bounds() {
        let err = anchor_windows(IndexRange::new(3, 3), usize::MAX, 10).unwrap_err();
        assert!(matches!(err, MaskError::InsufficientNeighbors { .. }));
    }

    #[test]
    fn test_zero_radius_is_rejected() {
        assert_eq!(
            anchor_windows(IndexRange::new(3, 3), 0, 10).unwrap_err(),
            MaskError::InvalidRadius
        );
    }

    #[test]
    fn test_linear_replaces_spike() {
        let spectrum = ramp_with_spike();
        let replacement = fit(&spectrum, IndexRange::new(5, 5), 3, InterpolationKind::Linear).unwrap();
        assert_eq!(replacement.left, 2..4);
        assert_eq!(replacement.right, 6..8);
        assert_abs_diff_eq!(replacement.values[0], 15.0, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_and_nearest_stay_within_anchor_range() {
        let mut spectrum = ramp_with_spike();
        spectrum.flux = vec![3.0, 7.0, 2.0, 9.0, 4.0, 99.0, 99.0, 1.0, 8.0, 5.0, 6.0];
        for kind in [InterpolationKind::Linear, InterpolationKind::Nearest] {
            let replacement = fit(&spectrum, IndexRange::new(5, 6), 4, kind).unwrap();
            let anchors: Vec<f64> = spectrum.flux[replacement.left.clone()]
                .iter()
                .chain(&spectrum.flux[replacement.right.clone()])
                .copied()
                .collect();
            let lo = anchors.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = anchors.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            for v in &replacement.values {
                assert!(*v >= lo && *v <= hi, "{kind}: {v} outside [{lo}, {hi}]");
            }
        }
    }

    #[test]
    fn test_nearest_tie_goes_to_lower_anchor() {
        // Anchors at 4003 (flux 13) and 4007 (flux 17); 4005 sits half way.
        let spectrum = ramp_with_spike();
        let replacement =
            fit(&spectrum, IndexRange::new(5, 6), 2, InterpolationKind::Nearest).unwrap();
        assert_eq!(replacement.left, 3..4);
        assert_eq!(replacement.right, 7..8);
        assert_eq!(replacement.values, vec![13.0, 17.0]);
    }

    #[test]
    fn test_zero_holds_previous_anchor() {
        let spectrum = ramp_with_spike();
        let replacement = fit(&spectrum, IndexRange::new(5, 6), 3, InterpolationKind::Zero).unwrap();
        // Anchors 4002, 4003 | 4007, 4008.
        assert_eq!(replacement.values, vec![13.0, 13.0]);
    }

    #[test]
    fn test_slinear_matches_linear() {
        let spectrum = ramp_with_spike();
        let range = IndexRange::new(4, 6);
        let linear = fit(&spectrum, range, 3, InterpolationKind::Linear).unwrap();
        let slinear = fit(&spectrum, range, 3, InterpolationKind::Slinear).unwrap();
        for (a, b) in linear.values.iter().zip(&slinear.values) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_quadratic_reproduces_parabola() {
        let spectrum = polynomial_spectrum(|x| 0.5 * x * x - 3.0 * x + 2.0);
        let replacement =
            fit(&spectrum, IndexRange::new(5, 6), 4, InterpolationKind::Quadratic).unwrap();
        assert_abs_diff_eq!(replacement.values[0], 0.5 * 25.0 - 15.0 + 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(replacement.values[1], 0.5 * 36.0 - 18.0 + 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cubic_reproduces_cubic_polynomial() {
        let spectrum = polynomial_spectrum(|x| x * x * x - 2.0 * x);
        let replacement =
            fit(&spectrum, IndexRange::new(5, 5), 4, InterpolationKind::Cubic).unwrap();
        assert_abs_diff_eq!(replacement.values[0], 125.0 - 10.0, epsilon = 1e-8);
    }

    #[test]
    fn test_cubic_needs_four_anchors() {
        let spectrum = ramp_with_spike();
        // radius 2 gives one anchor per side.
        let err = fit(&spectrum, IndexRange::new(5, 5), 2, InterpolationKind::Cubic).unwrap_err();
        assert!(matches!(err, MaskError::DegenerateFit { .. }));
    }

    #[test]
    fn test_radius_one_has_no_anchors() {
        let spectrum = ramp_with_spike();
        let err = fit(&spectrum, IndexRange::new(5, 5), 1, InterpolationKind::Linear).unwrap_err();
        assert!(matches!(err, MaskError::DegenerateFit { .. }));
    }

    #[test]
    fn test_duplicate_anchor_wavelengths_rejected() {
        let mut spectrum = ramp_with_spike();
        spectrum.wavelength[3] = spectrum.wavelength[2];
        let err = fit(&spectrum, IndexRange::new(5, 5), 3, InterpolationKind::Linear).unwrap_err();
        assert!(matches!(err, MaskError::DegenerateFit { .. }));
    }

    #[test]
    fn test_target_outside_anchor_span_is_flagged() {
        // An unsorted axis puts the masked sample left of every anchor.
        let mut spectrum = ramp_with_spike();
        spectrum.wavelength[5] = 3990.0;
        let err = fit(&spectrum, IndexRange::new(5, 5), 3, InterpolationKind::Linear).unwrap_err();
        assert!(matches!(err, MaskError::Extrapolation { wavelength, .. } if wavelength == 3990.0));
    }

    #[test]
    fn test_fit_does_not_mutate() {
        let spectrum = ramp_with_spike();
        let before = spectrum.clone();
        fit(&spectrum, IndexRange::new(5, 5), 3, InterpolationKind::Cubic).ok();
        assert_eq!(spectrum, before);
    }
}
