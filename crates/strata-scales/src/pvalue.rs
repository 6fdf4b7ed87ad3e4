//! P-value axis scale.

use serde::{Deserialize, Serialize};

use crate::ScaleError;

const MAX_BREAKS: usize = 7;

/// A p-value axis rendered as `-log10(p)`.
///
/// Small p-values map to large axis positions, so the most significant
/// observations sit at the top of a volcano plot. Breaks fall on decades.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PValueScale {
    /// Multiplicative range expansion applied by `expand_range`.
    pub expand: f64,
}

impl Default for PValueScale {
    fn default() -> Self {
        Self { expand: 0.05 }
    }
}

impl PValueScale {
    pub fn new() -> Self {
        Self::default()
    }

    /// P-value to axis position.
    pub fn transform(&self, p: f64) -> Result<f64, ScaleError> {
        if !p.is_finite() {
            return Err(ScaleError::NotFinite(p));
        }
        if p <= 0.0 || p > 1.0 {
            return Err(ScaleError::PValueOutOfRange(p));
        }
        Ok(-p.log10())
    }

    /// Axis position back to a p-value.
    pub fn inverse(&self, position: f64) -> Result<f64, ScaleError> {
        if !position.is_finite() {
            return Err(ScaleError::NotFinite(position));
        }
        Ok(10f64.powf(-position))
    }

    /// Decade breaks covering `range` (in transformed units), thinned to at
    /// most seven ticks.
    pub fn breaks(&self, range: (f64, f64)) -> Result<Vec<f64>, ScaleError> {
        let (lo, hi) = range;
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return Err(ScaleError::InvalidRange(lo, hi));
        }
        let start = lo.floor().max(0.0) as i64;
        let end = hi.ceil().max(start as f64) as i64;
        // Smallest step yielding at most MAX_BREAKS ticks.
        let step = (end - start) / MAX_BREAKS as i64 + 1;
        Ok((start..=end)
            .step_by(step as usize)
            .map(|b| b as f64)
            .collect())
    }

    /// Tick label for an axis position: the p-value it represents.
    pub fn label(&self, position: f64) -> String {
        if position == position.trunc() && (0.0..=3.0).contains(&position) {
            match position as i64 {
                0 => "1".to_string(),
                1 => "0.1".to_string(),
                2 => "0.01".to_string(),
                _ => "0.001".to_string(),
            }
        } else if position == position.trunc() {
            format!("1e-{}", position as i64)
        } else {
            format!("{:.3e}", 10f64.powf(-position))
        }
    }

    pub fn labels(&self, breaks: &[f64]) -> Vec<String> {
        breaks.iter().map(|&b| self.label(b)).collect()
    }

    /// Pad a transformed range multiplicatively on both sides.
    pub fn expand_range(&self, range: (f64, f64)) -> (f64, f64) {
        let pad = self.expand * (range.1 - range.0);
        (range.0 - pad, range.1 + pad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform() {
        let scale = PValueScale::new();
        assert!((scale.transform(0.01).unwrap() - 2.0).abs() < 1e-12);
        assert!((scale.transform(1.0).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_round_trips() {
        let scale = PValueScale::new();
        let pos = scale.transform(3e-4).unwrap();
        assert!((scale.inverse(pos).unwrap() - 3e-4).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let scale = PValueScale::new();
        assert!(matches!(
            scale.transform(0.0),
            Err(ScaleError::PValueOutOfRange(_))
        ));
        assert!(scale.transform(-0.5).is_err());
        assert!(scale.transform(1.5).is_err());
        assert!(matches!(
            scale.transform(f64::NAN),
            Err(ScaleError::NotFinite(_))
        ));
    }

    #[test]
    fn test_decade_breaks() {
        let scale = PValueScale::new();
        assert_eq!(
            scale.breaks((0.0, 3.2)).unwrap(),
            vec![0.0, 1.0, 2.0, 3.0, 4.0]
        );
    }

    #[test]
    fn test_breaks_thin_wide_ranges() {
        let scale = PValueScale::new();
        let breaks = scale.breaks((0.0, 20.0)).unwrap();
        assert!(breaks.len() <= 7);
        assert_eq!(breaks[0], 0.0);
        assert_eq!(breaks, vec![0.0, 3.0, 6.0, 9.0, 12.0, 15.0, 18.0]);
    }

    #[test]
    fn test_breaks_huge_range() {
        let scale = PValueScale::new();
        let breaks = scale.breaks((0.0, 1e15)).unwrap();
        assert!(breaks.len() <= 7);
        assert_eq!(breaks[0], 0.0);
    }

    #[test]
    fn test_labels() {
        let scale = PValueScale::new();
        assert_eq!(
            scale.labels(&[0.0, 1.0, 2.0, 3.0, 5.0]),
            vec![
                "1".to_string(),
                "0.1".to_string(),
                "0.01".to_string(),
                "0.001".to_string(),
                "1e-5".to_string()
            ]
        );
    }

    #[test]
    fn test_expand_range() {
        let scale = PValueScale::new();
        let (lo, hi) = scale.expand_range((0.0, 10.0));
        assert!((lo + 0.5).abs() < 1e-12);
        assert!((hi - 10.5).abs() < 1e-12);
    }
}
