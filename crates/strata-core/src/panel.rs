//! Panel context - the active coordinate ranges of one faceted subplot.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::frame::Frame;
use crate::npc::Npc;

/// Errors raised while constructing a panel context.
#[derive(Error, Debug)]
pub enum PanelError {
    /// Range endpoints must be finite and ordered
    #[error("Invalid {axis} range [{min}, {max}]")]
    InvalidRange { axis: &'static str, min: f64, max: f64 },

    /// Ranges cannot be derived from a frame with no finite points
    #[error("Frame has no finite values in column '{column}'")]
    NoFiniteValues { column: String },

    /// Required column missing or mistyped
    #[error(transparent)]
    Frame(#[from] crate::error::FrameError),
}

/// The data ranges of one panel, in data units.
///
/// This is the adapter-side view of the host framework's coordinate scales:
/// enough to place labels at panel extrema and convert npc fractions into
/// data positions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelContext {
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl PanelContext {
    /// Create a panel context from explicit ranges.
    pub fn new(x_range: (f64, f64), y_range: (f64, f64)) -> Result<Self, PanelError> {
        for (axis, (min, max)) in [("x", x_range), ("y", y_range)] {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(PanelError::InvalidRange { axis, min, max });
            }
        }
        Ok(Self { x_range, y_range })
    }

    /// Derive ranges from the finite extrema of a frame's `x`/`y` columns.
    pub fn from_frame(frame: &Frame) -> Result<Self, PanelError> {
        let x_range = finite_range(frame.float_column("x")?, "x")?;
        let y_range = finite_range(frame.float_column("y")?, "y")?;
        Self::new(x_range, y_range)
    }

    /// Convert an npc fraction into an x data position.
    pub fn npc_to_x(&self, npc: Npc) -> f64 {
        npc.to_data(self.x_range)
    }

    /// Convert an npc fraction into a y data position.
    pub fn npc_to_y(&self, npc: Npc) -> f64 {
        npc.to_data(self.y_range)
    }
}

fn finite_range(values: &[f64], column: &str) -> Result<(f64, f64), PanelError> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values.iter().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if min > max {
        return Err(PanelError::NoFiniteValues {
            column: column.to_string(),
        });
    }
    Ok((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Column;

    #[test]
    fn test_from_frame_ignores_non_finite() {
        let frame = Frame::new()
            .with_column("x", Column::Float(vec![1.0, f64::NAN, 5.0]))
            .unwrap()
            .with_column("y", Column::Float(vec![-2.0, 3.0, f64::INFINITY]))
            .unwrap();
        let panel = PanelContext::from_frame(&frame).unwrap();
        assert_eq!(panel.x_range, (1.0, 5.0));
        assert_eq!(panel.y_range, (-2.0, 3.0));
    }

    #[test]
    fn test_from_frame_all_nan_rejected() {
        let frame = Frame::new()
            .with_column("x", Column::Float(vec![f64::NAN]))
            .unwrap()
            .with_column("y", Column::Float(vec![1.0]))
            .unwrap();
        assert!(matches!(
            PanelContext::from_frame(&frame),
            Err(PanelError::NoFiniteValues { .. })
        ));
    }

    #[test]
    fn test_invalid_range_rejected() {
        assert!(PanelContext::new((2.0, 1.0), (0.0, 1.0)).is_err());
        assert!(PanelContext::new((0.0, f64::NAN), (0.0, 1.0)).is_err());
    }

    #[test]
    fn test_npc_conversion() {
        let panel = PanelContext::new((0.0, 10.0), (100.0, 200.0)).unwrap();
        assert_eq!(panel.npc_to_x(Npc::new(1.0).unwrap()), 10.0);
        assert_eq!(panel.npc_to_y(Npc::new(0.5).unwrap()), 150.0);
    }
}
