//! Normalized plot-area coordinates.
//!
//! An npc value is a position expressed as a fraction in `[0, 1]` of the
//! plotting area's width or height, independent of the data scale. Callers
//! supply either a bare number or a named anchor token (`"left"`, `"top"`,
//! ...); tokens resolve per axis, once per invocation, and the resolved value
//! is immutable thereafter.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while resolving npc positions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NpcError {
    /// Numeric value outside the unit interval
    #[error("npc value {0} is outside [0, 1]")]
    OutOfRange(f64),

    /// Numeric value is NaN or infinite
    #[error("npc value must be finite, got {0}")]
    NotFinite(f64),

    /// Unrecognized anchor token
    #[error("'{0}' is not a recognized anchor token")]
    UnknownToken(String),

    /// Token valid only on the other axis
    #[error("anchor '{token}' does not apply to the {axis} axis")]
    WrongAxis { token: String, axis: &'static str },
}

/// Which panel axis a value resolves against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    fn name(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }
}

/// A resolved normalized plot-area coordinate, guaranteed in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Npc(f64);

impl Npc {
    /// Validate a raw fraction into an npc value.
    pub fn new(value: f64) -> Result<Self, NpcError> {
        if !value.is_finite() {
            return Err(NpcError::NotFinite(value));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(NpcError::OutOfRange(value));
        }
        Ok(Npc(value))
    }

    /// The fraction in `[0, 1]`.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Map into data units by linear interpolation over a panel range.
    pub fn to_data(&self, range: (f64, f64)) -> f64 {
        range.0 + self.0 * (range.1 - range.0)
    }
}

/// A caller-supplied label position: either a numeric npc fraction or a
/// named anchor token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NpcValue {
    /// Explicit fraction in `[0, 1]` (validated on resolution).
    Numeric(f64),
    /// Named anchor (`left`/`right`/`centre`/`center`/`top`/`bottom`).
    Token(String),
}

impl NpcValue {
    /// Resolve to a concrete npc value for the given axis.
    ///
    /// `left`/`right` apply to the x axis only, `top`/`bottom` to the y axis
    /// only; `centre` (or `center`) applies to both.
    pub fn resolve(&self, axis: Axis) -> Result<Npc, NpcError> {
        match self {
            NpcValue::Numeric(v) => Npc::new(*v),
            NpcValue::Token(token) => {
                let fraction = match (token.as_str(), axis) {
                    ("left", Axis::X) => 0.0,
                    ("right", Axis::X) => 1.0,
                    ("bottom", Axis::Y) => 0.0,
                    ("top", Axis::Y) => 1.0,
                    ("centre" | "center", _) => 0.5,
                    ("left" | "right", Axis::Y) | ("top" | "bottom", Axis::X) => {
                        return Err(NpcError::WrongAxis {
                            token: token.clone(),
                            axis: axis.name(),
                        })
                    }
                    _ => return Err(NpcError::UnknownToken(token.clone())),
                };
                Ok(Npc(fraction))
            }
        }
    }
}

impl From<f64> for NpcValue {
    fn from(value: f64) -> Self {
        NpcValue::Numeric(value)
    }
}

impl From<&str> for NpcValue {
    fn from(token: &str) -> Self {
        NpcValue::Token(token.to_string())
    }
}
