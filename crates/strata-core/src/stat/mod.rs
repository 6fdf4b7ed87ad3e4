//! The stat transform protocol.
//!
//! Every adapter in the workspace implements [`StatTransform`]: a stateless
//! object that declares its metadata and parameter specs, names the input
//! columns it requires, maps its computed columns onto default aesthetics,
//! and produces a derived [`Frame`] from an observation table.
//!
//! # Key Components
//!
//! - [`StatTransform`]: the core trait all adapters implement
//! - [`StatMetadata`]: static metadata describing an adapter
//! - [`StatParams`]: runtime parameters for host-driven invocation
//! - [`StatRegistry`]: registry of available adapters
//!
//! All validation is synchronous and happens before any row is processed;
//! there is no partial-failure or recovery path.

pub mod params;
pub mod registry;

pub use params::{ParameterConstraints, ParameterSpec, ParameterType, ParameterValue, StatParams};
pub use registry::StatRegistry;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::FrameError;
use crate::frame::Frame;
use crate::npc::NpcError;
use crate::panel::{PanelContext, PanelError};

/// Error type for stat adapter invocations.
#[derive(Error, Debug)]
pub enum StatError {
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Parameter type mismatch for '{name}': expected {expected}")]
    TypeMismatch { name: String, expected: String },

    #[error("Too few usable points: {needed} required, {actual} present")]
    TooFewPoints { needed: usize, actual: usize },

    #[error("Transform returned {actual} values for {expected} input rows")]
    TransformOutputTooLong { expected: usize, actual: usize },

    #[error("Label anchor error: {0}")]
    Anchor(#[from] NpcError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Panel(#[from] PanelError),

    #[error("Computation failed: {0}")]
    ComputeFailed(String),
}

/// Coarse adapter family, mirroring how the derived table is consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatFamily {
    /// One summary row per quadrant/group (quadrant counts, fit summaries)
    Summary,
    /// Same row count in, transformed columns out (function application)
    Transform,
    /// A row subset or keep-flag over the input (density filter, peaks)
    Filter,
}

impl StatFamily {
    /// Human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            StatFamily::Summary => "Summary",
            StatFamily::Transform => "Transform",
            StatFamily::Filter => "Filter",
        }
    }
}

/// Static metadata describing a stat adapter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatMetadata {
    /// Unique identifier (e.g., "quadrant-counts")
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Adapter family
    pub family: StatFamily,

    /// Description of the derived table this adapter produces
    pub description: String,

    /// Parameter specifications
    pub parameters: Vec<ParameterSpec>,
}

/// Default mapping from a computed output column to a host aesthetic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AestheticMapping {
    /// Computed column name (e.g., "count")
    pub column: String,

    /// Aesthetic the host maps it to (e.g., "label")
    pub aesthetic: String,
}

impl AestheticMapping {
    pub fn new(column: impl Into<String>, aesthetic: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            aesthetic: aesthetic.into(),
        }
    }
}

/// The core trait all stat adapters implement.
///
/// Adapters are stateless per invocation: configuration arrives via
/// [`StatParams`], data via a read-only [`Frame`], and the active coordinate
/// scales via [`PanelContext`]. The result is a freshly built derived frame.
pub trait StatTransform: Send + Sync {
    /// Static metadata describing this adapter.
    fn metadata(&self) -> &StatMetadata;

    /// Input columns the adapter requires.
    fn required_columns(&self) -> &[&str];

    /// Default output-column-to-aesthetic mappings.
    fn default_aesthetics(&self) -> Vec<AestheticMapping>;

    /// Produce the derived table.
    fn compute(
        &self,
        frame: &Frame,
        params: &StatParams,
        panel: &PanelContext,
    ) -> Result<Frame, StatError>;

    /// Validate supplied parameters against this adapter's specs.
    fn validate_params(&self, params: &StatParams) -> Result<(), StatError> {
        params.validate(&self.metadata().parameters)
    }

    /// Check that the input frame carries every required column.
    fn check_columns(&self, frame: &Frame) -> Result<(), StatError> {
        for &name in self.required_columns() {
            if !frame.has_column(name) {
                return Err(StatError::Frame(FrameError::ColumnNotFound {
                    name: name.to_string(),
                }));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Column;

    struct RowCount {
        metadata: StatMetadata,
    }

    impl RowCount {
        fn new() -> Self {
            Self {
                metadata: StatMetadata {
                    id: "row-count".to_string(),
                    name: "Row Count".to_string(),
                    family: StatFamily::Summary,
                    description: "One row with the input row count".to_string(),
                    parameters: vec![],
                },
            }
        }
    }

    impl StatTransform for RowCount {
        fn metadata(&self) -> &StatMetadata {
            &self.metadata
        }

        fn required_columns(&self) -> &[&str] {
            &["x"]
        }

        fn default_aesthetics(&self) -> Vec<AestheticMapping> {
            vec![AestheticMapping::new("count", "label")]
        }

        fn compute(
            &self,
            frame: &Frame,
            _params: &StatParams,
            _panel: &PanelContext,
        ) -> Result<Frame, StatError> {
            self.check_columns(frame)?;
            Ok(Frame::new().with_column("count", Column::Int(vec![frame.len() as i64]))?)
        }
    }

    #[test]
    fn test_check_columns() {
        let stat = RowCount::new();
        let frame = Frame::new()
            .with_column("y", Column::Float(vec![1.0]))
            .unwrap();
        assert!(matches!(
            stat.check_columns(&frame),
            Err(StatError::Frame(FrameError::ColumnNotFound { .. }))
        ));
    }

    #[test]
    fn test_trait_object_compute() {
        let stat: Box<dyn StatTransform> = Box::new(RowCount::new());
        let frame = Frame::new()
            .with_column("x", Column::Float(vec![1.0, 2.0]))
            .unwrap();
        let panel = PanelContext::new((0.0, 1.0), (0.0, 1.0)).unwrap();
        let out = stat.compute(&frame, &StatParams::new(), &panel).unwrap();
        assert_eq!(out.column("count").unwrap().as_int().unwrap(), &[2]);
    }

    #[test]
    fn test_family_display_name() {
        assert_eq!(StatFamily::Filter.display_name(), "Filter");
    }
}
