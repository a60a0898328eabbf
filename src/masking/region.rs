use std::fmt;
use std::str::FromStr;

use crate::data::model::{IndexRange, Spectrum};
use crate::error::MaskError;

/// A closed wavelength interval `[low, high]` chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub low: f64,
    pub high: f64,
}

impl Region {
    pub fn new(low: f64, high: f64) -> Result<Self, MaskError> {
        if !low.is_finite() || !high.is_finite() {
            return Err(MaskError::parse(
                &format!("{low},{high}"),
                "bounds must be finite",
            ));
        }
        if low > high {
            return Err(MaskError::parse(
                &format!("{low},{high}"),
                "lower bound exceeds upper bound",
            ));
        }
        Ok(Self { low, high })
    }

    /// Indices of the samples whose wavelength lies inside the region.
    ///
    /// Both bounds are inclusive.  The wavelength axis is sorted, so the
    /// matching samples form one contiguous run and only its first and last
    /// index are returned.
    pub fn resolve(&self, spectrum: &Spectrum) -> Result<IndexRange, MaskError> {
        let inside = |w: &f64| *w >= self.low && *w <= self.high;
        let first = spectrum.wavelength.iter().position(inside);
        let last = spectrum.wavelength.iter().rposition(inside);
        match (first, last) {
            (Some(low), Some(high)) => Ok(IndexRange::new(low, high)),
            _ => Err(MaskError::EmptyRegion {
                low: self.low,
                high: self.high,
            }),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}

/// Parses `"low,high"`; whitespace separation is accepted as well.
impl FromStr for Region {
    type Err = MaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect();
        let [low, high] = fields.as_slice() else {
            return Err(MaskError::parse(s, "expected two wavelengths, e.g. 4001,4003"));
        };
        let low = low
            .parse::<f64>()
            .map_err(|e| MaskError::parse(s, e.to_string()))?;
        let high = high
            .parse::<f64>()
            .map_err(|e| MaskError::parse(s, e.to_string()))?;
        Region::new(low, high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectrum() -> Spectrum {
        Spectrum {
            wavelength: vec![4000.0, 4001.0, 4002.0, 4003.0, 4004.0],
            flux: vec![10.0, 50.0, 11.0, 9.0, 10.0],
            flux_err: vec![0.1; 5],
        }
    }

    #[test]
    fn test_resolve_single_sample() {
        let region = Region::new(4001.0, 4001.0).unwrap();
        assert_eq!(region.resolve(&spectrum()).unwrap(), IndexRange::new(1, 1));
    }

    #[test]
    fn test_resolve_bounds_are_inclusive() {
        let region = Region::new(4001.0, 4003.0).unwrap();
        assert_eq!(region.resolve(&spectrum()).unwrap(), IndexRange::new(1, 3));
    }

    #[test]
    fn test_resolve_partial_overlap() {
        let region = Region::new(4002.5, 4100.0).unwrap();
        assert_eq!(region.resolve(&spectrum()).unwrap(), IndexRange::new(3, 4));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let region = Region::new(4000.5, 4002.5).unwrap();
        let s = spectrum();
        assert_eq!(region.resolve(&s).unwrap(), region.resolve(&s).unwrap());
    }

    #[test]
    fn test_resolve_empty_region_fails() {
        let region = Region::new(4001.2, 4001.8).unwrap();
        let err = region.resolve(&spectrum()).unwrap_err();
        assert!(matches!(err, MaskError::EmptyRegion { .. }));
    }

    #[test]
    fn test_parse_region() {
        let region: Region = "4001, 4003".parse().unwrap();
        assert_eq!(region, Region { low: 4001.0, high: 4003.0 });
        let region: Region = "4001 4003".parse().unwrap();
        assert_eq!(region.high, 4003.0);
    }

    #[test]
    fn test_parse_region_rejects_garbage() {
        assert!(matches!("4001".parse::<Region>(), Err(MaskError::Parse { .. })));
        assert!(matches!("a,b".parse::<Region>(), Err(MaskError::Parse { .. })));
        assert!(matches!("4003,4001".parse::<Region>(), Err(MaskError::Parse { .. })));
    }
}
