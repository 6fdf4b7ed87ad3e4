//! Inset payload kinds.

use serde::{Deserialize, Serialize};

use crate::InsetError;

/// A small summary table rendered inside the panel.
///
/// Rows are pre-formatted strings so the caller controls number formatting;
/// every row must match the header width.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableInset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableInset {
    pub fn new(
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Result<Self, InsetError> {
        let expected = headers.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(InsetError::RaggedTable {
                    row: i,
                    expected,
                    actual: row.len(),
                });
            }
        }
        Ok(Self { headers, rows })
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.headers.len()
    }
}

/// A nested plot specification, carried opaquely for the host renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlotInset {
    pub spec: serde_json::Value,
}

impl PlotInset {
    pub fn new(spec: serde_json::Value) -> Self {
        Self { spec }
    }
}

/// An opaque pre-rendered graphic, typically SVG markup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphicInset {
    pub svg: String,
}

impl GraphicInset {
    pub fn new(svg: impl Into<String>) -> Self {
        Self { svg: svg.into() }
    }
}
