//! Axis scales for differential-expression style plots.
//!
//! [`LogFcScale`] renders a fold-change axis in log units with labels in
//! either log or fold notation. [`PValueScale`] renders a p-value axis as
//! `-log10(p)` with decade breaks. Both expose `transform`/`inverse`,
//! break/label generation, and the 5% multiplicative expansion plotting
//! grammars expect, so a host renderer only has to draw what they hand back.

pub mod logfc;
pub mod pvalue;

pub use logfc::{FcNotation, LogFcScale};
pub use pvalue::PValueScale;

use thiserror::Error;

/// Errors raised by scale transforms.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScaleError {
    #[error("fold-change must be positive, got {0}")]
    NonPositiveFoldChange(f64),

    #[error("log base must be finite and greater than 1, got {0}")]
    InvalidBase(f64),

    #[error("p-value must be in (0, 1], got {0}")]
    PValueOutOfRange(f64),

    #[error("value is not finite: {0}")]
    NotFinite(f64),

    #[error("range is empty or not finite: [{0}, {1}]")]
    InvalidRange(f64, f64),
}
