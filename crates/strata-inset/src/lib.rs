//! Inset layers positioned in npc or data coordinates.
//!
//! An [`Inset`] wraps a payload (a summary table, a nested plot
//! specification, or an opaque graphic) together with where and how large it
//! should appear on a panel. Positions are either npc fractions of the panel
//! or data coordinates; sizes are always npc fractions. [`Inset::resolve`]
//! turns the descriptor into a data-unit rectangle a host renderer can draw
//! into.

pub mod payload;

pub use payload::{GraphicInset, PlotInset, TableInset};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use strata_core::npc::{Axis, NpcError, NpcValue};
use strata_core::PanelContext;

/// Errors raised while building or resolving an inset.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InsetError {
    #[error("inset {dimension} must be in (0, 1], got {value}")]
    SizeOutOfRange { dimension: &'static str, value: f64 },

    #[error("data position must be finite, got ({x}, {y})")]
    NonFinitePosition { x: f64, y: f64 },

    #[error("table row {row} has {actual} cells, expected {expected}")]
    RaggedTable {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Npc(#[from] NpcError),
}

/// Where an inset's anchor point sits on the panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsetPosition {
    /// Npc fractions of the panel, numeric or anchor tokens.
    Npc { x: NpcValue, y: NpcValue },
    /// Data coordinates on the panel's scales.
    Data { x: f64, y: f64 },
}

/// A resolved inset rectangle in data units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InsetPlacement {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl InsetPlacement {
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

/// An inset layer descriptor.
///
/// `hjust`/`vjust` say which fraction of the inset sits left of / below the
/// anchor point, so `("left", "top")` hangs the inset down-right from the
/// anchor the way plot legends do.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Inset<P> {
    pub payload: P,
    pub position: InsetPosition,
    /// Width as an npc fraction of the panel, in (0, 1].
    pub width: f64,
    /// Height as an npc fraction of the panel, in (0, 1].
    pub height: f64,
    pub hjust: NpcValue,
    pub vjust: NpcValue,
}

impl<P> Inset<P> {
    /// Build an inset at `position` with default size (40% x 30%) and
    /// centred justification.
    pub fn new(payload: P, position: InsetPosition) -> Result<Self, InsetError> {
        if let InsetPosition::Data { x, y } = position {
            if !x.is_finite() || !y.is_finite() {
                return Err(InsetError::NonFinitePosition { x, y });
            }
        }
        Ok(Self {
            payload,
            position,
            width: 0.4,
            height: 0.3,
            hjust: NpcValue::Numeric(0.5),
            vjust: NpcValue::Numeric(0.5),
        })
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Result<Self, InsetError> {
        if !width.is_finite() || width <= 0.0 || width > 1.0 {
            return Err(InsetError::SizeOutOfRange {
                dimension: "width",
                value: width,
            });
        }
        if !height.is_finite() || height <= 0.0 || height > 1.0 {
            return Err(InsetError::SizeOutOfRange {
                dimension: "height",
                value: height,
            });
        }
        self.width = width;
        self.height = height;
        Ok(self)
    }

    pub fn with_justification(
        mut self,
        hjust: impl Into<NpcValue>,
        vjust: impl Into<NpcValue>,
    ) -> Self {
        self.hjust = hjust.into();
        self.vjust = vjust.into();
        self
    }

    /// Compute the data-unit rectangle this inset occupies on `panel`.
    pub fn resolve(&self, panel: &PanelContext) -> Result<InsetPlacement, InsetError> {
        let (anchor_x, anchor_y) = match &self.position {
            InsetPosition::Npc { x, y } => (
                panel.npc_to_x(x.resolve(Axis::X)?),
                panel.npc_to_y(y.resolve(Axis::Y)?),
            ),
            InsetPosition::Data { x, y } => (*x, *y),
        };
        let width_data = self.width * (panel.x_range.1 - panel.x_range.0);
        let height_data = self.height * (panel.y_range.1 - panel.y_range.0);
        let hjust = self.hjust.resolve(Axis::X)?.value();
        let vjust = self.vjust.resolve(Axis::Y)?.value();
        let x_min = anchor_x - hjust * width_data;
        let y_min = anchor_y - vjust * height_data;
        Ok(InsetPlacement {
            x_min,
            x_max: x_min + width_data,
            y_min,
            y_max: y_min + height_data,
        })
    }
}
