//! Columnar observation table.
//!
//! A [`Frame`] is an ordered sequence of rows, each with one value per named
//! column. Adapters receive frames read-only and return freshly built frames;
//! nothing here mutates a caller's table in place. Row insertion order is
//! preserved throughout (it matters for sequence-producing transforms such as
//! cumulative sums), and the float missing-value sentinel is `NaN`.

use serde::{Deserialize, Serialize};

use crate::error::FrameError;

/// Data types a column can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Float64,
    Int64,
    Bool,
    Str,
}

impl DataType {
    /// Human-readable type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataType::Float64 => "float",
            DataType::Int64 => "int",
            DataType::Bool => "bool",
            DataType::Str => "string",
        }
    }
}

/// A single typed column of values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Column {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Bool(Vec<bool>),
    Str(Vec<String>),
}

impl Column {
    /// Number of values in the column.
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Bool(v) => v.len(),
            Column::Str(v) => v.len(),
        }
    }

    /// Check if the column is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The column's data type.
    pub fn data_type(&self) -> DataType {
        match self {
            Column::Float(_) => DataType::Float64,
            Column::Int(_) => DataType::Int64,
            Column::Bool(_) => DataType::Bool,
            Column::Str(_) => DataType::Str,
        }
    }

    /// Borrow as a float slice, if this is a float column.
    pub fn as_float(&self) -> Option<&[f64]> {
        match self {
            Column::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow as an int slice, if this is an int column.
    pub fn as_int(&self) -> Option<&[i64]> {
        match self {
            Column::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow as a bool slice, if this is a bool column.
    pub fn as_bool(&self) -> Option<&[bool]> {
        match self {
            Column::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow as a string slice, if this is a string column.
    pub fn as_str(&self) -> Option<&[String]> {
        match self {
            Column::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Build a new column containing the values at `indices`, in order.
    fn take(&self, indices: &[usize]) -> Column {
        match self {
            Column::Float(v) => Column::Float(indices.iter().map(|&i| v[i]).collect()),
            Column::Int(v) => Column::Int(indices.iter().map(|&i| v[i]).collect()),
            Column::Bool(v) => Column::Bool(indices.iter().map(|&i| v[i]).collect()),
            Column::Str(v) => Column::Str(indices.iter().map(|&i| v[i].clone()).collect()),
        }
    }

    /// Append another column of the same type.
    fn extend_from(&mut self, other: &Column) -> Result<(), FrameError> {
        match (self, other) {
            (Column::Float(a), Column::Float(b)) => a.extend_from_slice(b),
            (Column::Int(a), Column::Int(b)) => a.extend_from_slice(b),
            (Column::Bool(a), Column::Bool(b)) => a.extend_from_slice(b),
            (Column::Str(a), Column::Str(b)) => a.extend_from_slice(b),
            (a, b) => {
                return Err(FrameError::SchemaMismatch {
                    message: format!(
                        "cannot append {} column to {} column",
                        b.data_type().type_name(),
                        a.data_type().type_name()
                    ),
                })
            }
        }
        Ok(())
    }
}

/// Ordered columnar table of observations.
///
/// Columns keep their insertion order so derived tables render with a stable
/// layout.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    columns: Vec<(String, Column)>,
}

impl Frame {
    /// Create an empty frame.
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map(|(_, c)| c.len()).unwrap_or(0)
    }

    /// Check if the frame has no rows (a frame with columns but zero rows is
    /// also empty).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Check whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// Get a float column by name, or a typed error.
    pub fn float_column(&self, name: &str) -> Result<&[f64], FrameError> {
        let col = self.column(name).ok_or_else(|| FrameError::ColumnNotFound {
            name: name.to_string(),
        })?;
        col.as_float().ok_or_else(|| FrameError::TypeMismatch {
            column: name.to_string(),
            expected: DataType::Float64.type_name().to_string(),
            actual: col.data_type().type_name().to_string(),
        })
    }

    /// Add a column, consuming and returning the frame for chaining.
    ///
    /// The first column fixes the row count; every later column must match it.
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        column: Column,
    ) -> Result<Self, FrameError> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(FrameError::DuplicateColumn { name });
        }
        if !self.columns.is_empty() && column.len() != self.len() {
            return Err(FrameError::LengthMismatch {
                column: name,
                expected: self.len(),
                actual: column.len(),
            });
        }
        self.columns.push((name, column));
        Ok(self)
    }

    /// Replace an existing column with new values of the same length.
    pub fn replace_column(&mut self, name: &str, column: Column) -> Result<(), FrameError> {
        if column.len() != self.len() {
            return Err(FrameError::LengthMismatch {
                column: name.to_string(),
                expected: self.len(),
                actual: column.len(),
            });
        }
        let slot = self
            .columns
            .iter_mut()
            .find(|(n, _)| n == name)
            .ok_or_else(|| FrameError::ColumnNotFound {
                name: name.to_string(),
            })?;
        slot.1 = column;
        Ok(())
    }

    /// Build a new frame containing the rows at `indices`, in order.
    pub fn take(&self, indices: &[usize]) -> Result<Frame, FrameError> {
        let rows = self.len();
        if let Some(&bad) = indices.iter().find(|&&i| i >= rows) {
            return Err(FrameError::RowOutOfBounds { index: bad, rows });
        }
        Ok(Frame {
            columns: self
                .columns
                .iter()
                .map(|(n, c)| (n.clone(), c.take(indices)))
                .collect(),
        })
    }

    /// Partition row indices by the values of a discrete grouping column.
    ///
    /// Groups appear in first-appearance order and indices within each group
    /// preserve row order. Int and string columns are valid keys; float and
    /// bool columns are not (floats are continuous, bools are better expressed
    /// as explicit keys by the caller).
    pub fn split_by(&self, name: &str) -> Result<Vec<(String, Vec<usize>)>, FrameError> {
        let col = self.column(name).ok_or_else(|| FrameError::ColumnNotFound {
            name: name.to_string(),
        })?;
        let keys: Vec<String> = match col {
            Column::Str(v) => v.clone(),
            Column::Int(v) => v.iter().map(|k| k.to_string()).collect(),
            other => {
                return Err(FrameError::InvalidGroupKey {
                    column: name.to_string(),
                    reason: format!(
                        "{} columns are not discrete keys",
                        other.data_type().type_name()
                    ),
                })
            }
        };

        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
        for (i, key) in keys.into_iter().enumerate() {
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, indices)) => indices.push(i),
                _missing => groups.push((key, vec![i])),
            }
        }
        Ok(groups)
    }

    /// Stack frames with identical schemas on top of each other.
    pub fn bind_rows<'a>(frames: impl IntoIterator<Item = &'a Frame>) -> Result<Frame, FrameError> {
        let mut iter = frames.into_iter();
        let first = match iter.next() {
            Some(f) => f,
            _none => return Ok(Frame::new()),
        };
        let mut out = first.clone();
        for frame in iter {
            if frame.n_columns() != out.n_columns()
                || !frame.names().zip(out.names()).all(|(a, b)| a == b)
            {
                return Err(FrameError::SchemaMismatch {
                    message: "frames must share column names and order".to_string(),
                });
            }
            for ((_, dst), (_, src)) in out.columns.iter_mut().zip(frame.columns.iter()) {
                dst.extend_from(src)?;
            }
        }
        Ok(out)
    }
}
