//! Log fold-change axis scale.

use serde::{Deserialize, Serialize};

use crate::ScaleError;

/// Maximum number of breaks emitted before thinning.
const MAX_BREAKS: usize = 7;

/// How fold-change tick labels are written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FcNotation {
    /// Log-unit labels: "-2", "0", "2".
    #[default]
    Log,
    /// Fold labels: "1/4", "1", "4".
    Fold,
}

/// A fold-change axis in log units.
///
/// Positions are log-base-`base` fold changes; `transform`/`inverse` move
/// between fold space and axis space. Breaks are integer log units placed
/// symmetrically around zero so up- and down-regulation read the same.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogFcScale {
    pub base: f64,
    pub notation: FcNotation,
    /// Multiplicative range expansion applied by `expand_range`.
    pub expand: f64,
}

impl Default for LogFcScale {
    fn default() -> Self {
        Self {
            base: 2.0,
            notation: FcNotation::Log,
            expand: 0.05,
        }
    }
}

impl LogFcScale {
    pub fn new(base: f64) -> Result<Self, ScaleError> {
        if !base.is_finite() || base <= 1.0 {
            return Err(ScaleError::InvalidBase(base));
        }
        Ok(Self {
            base,
            ..Self::default()
        })
    }

    pub fn with_notation(mut self, notation: FcNotation) -> Self {
        self.notation = notation;
        self
    }

    /// Fold change to log units.
    pub fn transform(&self, fold: f64) -> Result<f64, ScaleError> {
        if !fold.is_finite() {
            return Err(ScaleError::NotFinite(fold));
        }
        if fold <= 0.0 {
            return Err(ScaleError::NonPositiveFoldChange(fold));
        }
        Ok(fold.ln() / self.base.ln())
    }

    /// Log units back to fold change.
    pub fn inverse(&self, log_units: f64) -> Result<f64, ScaleError> {
        if !log_units.is_finite() {
            return Err(ScaleError::NotFinite(log_units));
        }
        Ok(self.base.powf(log_units))
    }

    /// Integer breaks in log units, symmetric around zero and covering
    /// `range`, thinned to at most seven ticks.
    pub fn breaks(&self, range: (f64, f64)) -> Result<Vec<f64>, ScaleError> {
        let (lo, hi) = range;
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return Err(ScaleError::InvalidRange(lo, hi));
        }
        let limit = lo.abs().max(hi.abs()).ceil().max(1.0) as i64;
        let per_side = (MAX_BREAKS as i64 - 1) / 2;
        // Smallest step with at most per_side breaks each side of zero.
        let step = limit / (per_side + 1) + 1;
        let reach = (limit / step) * step;
        Ok((-reach..=reach)
            .step_by(step as usize)
            .map(|b| b as f64)
            .collect())
    }

    /// Tick label for a break position in log units.
    pub fn label(&self, log_units: f64) -> String {
        match self.notation {
            FcNotation::Log => {
                if log_units == log_units.trunc() {
                    format!("{}", log_units as i64)
                } else {
                    format!("{log_units}")
                }
            }
            FcNotation::Fold => {
                if log_units >= 0.0 && log_units == log_units.trunc() {
                    format!("{}", self.base.powf(log_units).round() as i64)
                } else if log_units == log_units.trunc() {
                    format!("1/{}", self.base.powf(-log_units).round() as i64)
                } else {
                    format!("{}", self.base.powf(log_units))
                }
            }
        }
    }

    pub fn labels(&self, breaks: &[f64]) -> Vec<String> {
        breaks.iter().map(|&b| self.label(b)).collect()
    }

    /// Pad a log-unit range multiplicatively on both sides.
    pub fn expand_range(&self, range: (f64, f64)) -> (f64, f64) {
        let pad = self.expand * (range.1 - range.0);
        (range.0 - pad, range.1 + pad)
    }
}
