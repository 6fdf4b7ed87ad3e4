//! Per-group / per-panel function application.
//!
//! Replaces the `x` and/or `y` column of a group or panel with the output of
//! a caller-supplied vectorized function. The function is an opaque callable:
//! the adapter makes no purity guarantee about it, invokes it once per
//! group/panel, and never concurrently.
//!
//! A transform may return fewer values than it was given (a first difference,
//! say); the missing trailing entries are padded with `NaN` so every output
//! column keeps the input row count. Returning more values than the input is
//! a caller error.

use strata_core::stat::StatError;
use strata_core::{Column, Frame};

/// A caller-supplied vectorized transform over one column.
pub type TransformFn = Box<dyn Fn(&[f64]) -> Vec<f64> + Send + Sync>;

/// Whether the transform runs once per group partition or once per panel.
///
/// This is the only behavioral difference between the two entry points; the
/// apply-and-pad routine underneath is shared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ApplyScope {
    /// Apply independently within each grouping-key partition.
    #[default]
    Group,
    /// Apply once to the whole table, ignoring grouping keys.
    Panel,
}

/// Configuration for [`apply_transform`].
///
/// At least one of `fun_x`/`fun_y` must be supplied; supplying both applies
/// them independently per axis.
pub struct ApplyConfig {
    /// Transform for the `x` column.
    pub fun_x: Option<TransformFn>,
    /// Transform for the `y` column.
    pub fun_y: Option<TransformFn>,
    /// Group or panel scope.
    pub scope: ApplyScope,
    /// Name of the grouping-key column (ignored in panel scope; a frame
    /// without this column is treated as one group).
    pub group_column: String,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            fun_x: None,
            fun_y: None,
            scope: ApplyScope::Group,
            group_column: "group".to_string(),
        }
    }
}

/// Run one transform over a partition and scatter the (padded) result back
/// into the full-length output vector.
fn apply_and_pad(
    fun: &TransformFn,
    values: &[f64],
    indices: &[usize],
    out: &mut [f64],
) -> Result<(), StatError> {
    let input: Vec<f64> = indices.iter().map(|&i| values[i]).collect();
    let result = fun(&input);
    if result.len() > input.len() {
        return Err(StatError::TransformOutputTooLong {
            expected: input.len(),
            actual: result.len(),
        });
    }
    for (slot, &i) in indices.iter().enumerate() {
        out[i] = result.get(slot).copied().unwrap_or(f64::NAN);
    }
    Ok(())
}

/// Replace the targeted column(s) with the transform output.
///
/// The returned frame has the same row count and column layout as the input;
/// only the targeted columns change. Nothing is ever truncated to match a
/// short transform result.
pub fn apply_transform(frame: &Frame, config: &ApplyConfig) -> Result<Frame, StatError> {
    if config.fun_x.is_none() && config.fun_y.is_none() {
        return Err(StatError::MissingParameter(
            "at least one of fun_x/fun_y".to_string(),
        ));
    }

    // Partition rows up front; panel scope is a single all-rows partition.
    let partitions: Vec<Vec<usize>> = match config.scope {
        ApplyScope::Panel => vec![(0..frame.len()).collect()],
        ApplyScope::Group if frame.has_column(&config.group_column) => frame
            .split_by(&config.group_column)?
            .into_iter()
            .map(|(_, indices)| indices)
            .collect(),
        ApplyScope::Group => vec![(0..frame.len()).collect()],
    };

    let mut out = frame.clone();
    for (column, fun) in [("x", &config.fun_x), ("y", &config.fun_y)] {
        let fun = match fun {
            Some(f) => f,
            _skip => continue,
        };
        let values = frame.float_column(column)?;
        let mut replaced = values.to_vec();
        for indices in &partitions {
            apply_and_pad(fun, values, indices, &mut replaced)?;
        }
        out.replace_column(column, Column::Float(replaced))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_difference() -> TransformFn {
        Box::new(|v: &[f64]| v.windows(2).map(|w| w[1] - w[0]).collect())
    }

    fn cumsum() -> TransformFn {
        Box::new(|v: &[f64]| {
            v.iter()
                .scan(0.0, |acc, &x| {
                    *acc += x;
                    Some(*acc)
                })
                .collect()
        })
    }

    fn grouped_frame() -> Frame {
        Frame::new()
            .with_column("x", Column::Float(vec![1.0, 2.0, 3.0, 4.0]))
            .unwrap()
            .with_column("y", Column::Float(vec![1.0, 10.0, 2.0, 20.0]))
            .unwrap()
            .with_column(
                "group",
                Column::Str(
                    ["a", "b", "a", "b"].iter().map(|s| s.to_string()).collect(),
                ),
            )
            .unwrap()
    }

    #[test]
    fn test_short_output_padded_with_nan() {
        let frame = Frame::new()
            .with_column("x", Column::Float(vec![1.0, 2.0, 3.0, 4.0]))
            .unwrap()
            .with_column("y", Column::Float(vec![0.0; 4]))
            .unwrap();
        let config = ApplyConfig {
            fun_x: Some(first_difference()),
            scope: ApplyScope::Panel,
            ..ApplyConfig::default()
        };
        let out = apply_transform(&frame, &config).unwrap();
        let x = out.float_column("x").unwrap();
        assert_eq!(x.len(), 4);
        assert_eq!(&x[..3], &[1.0, 1.0, 1.0]);
        assert!(x[3].is_nan());
        // Untouched columns keep their full length and values.
        assert_eq!(out.float_column("y").unwrap(), &[0.0; 4]);
    }

    #[test]
    fn test_neither_function_rejected() {
        let frame = grouped_frame();
        let err = apply_transform(&frame, &ApplyConfig::default()).unwrap_err();
        assert!(matches!(err, StatError::MissingParameter(_)));
    }

    #[test]
    fn test_longer_output_rejected() {
        let frame = grouped_frame();
        let config = ApplyConfig {
            fun_y: Some(Box::new(|v: &[f64]| {
                let mut doubled = v.to_vec();
                doubled.extend_from_slice(v);
                doubled
            })),
            scope: ApplyScope::Panel,
            ..ApplyConfig::default()
        };
        assert!(matches!(
            apply_transform(&frame, &config),
            Err(StatError::TransformOutputTooLong {
                expected: 4,
                actual: 8
            })
        ));
    }

    #[test]
    fn test_group_scope_runs_per_partition() {
        let frame = grouped_frame();
        let config = ApplyConfig {
            fun_y: Some(cumsum()),
            ..ApplyConfig::default()
        };
        let out = apply_transform(&frame, &config).unwrap();
        // Group "a" holds rows 0 and 2, group "b" rows 1 and 3; each sequence
        // accumulates separately and results land back in row order.
        assert_eq!(out.float_column("y").unwrap(), &[1.0, 10.0, 3.0, 30.0]);
    }

    #[test]
    fn test_panel_scope_ignores_groups() {
        let frame = grouped_frame();
        let config = ApplyConfig {
            fun_y: Some(cumsum()),
            scope: ApplyScope::Panel,
            ..ApplyConfig::default()
        };
        let out = apply_transform(&frame, &config).unwrap();
        assert_eq!(out.float_column("y").unwrap(), &[1.0, 11.0, 13.0, 33.0]);
    }

    #[test]
    fn test_both_axes_apply_independently() {
        let frame = grouped_frame();
        let config = ApplyConfig {
            fun_x: Some(Box::new(|v: &[f64]| v.iter().map(|x| x * 2.0).collect())),
            fun_y: Some(Box::new(|v: &[f64]| v.iter().map(|y| -y).collect())),
            scope: ApplyScope::Panel,
            ..ApplyConfig::default()
        };
        let out = apply_transform(&frame, &config).unwrap();
        assert_eq!(out.float_column("x").unwrap(), &[2.0, 4.0, 6.0, 8.0]);
        assert_eq!(out.float_column("y").unwrap(), &[-1.0, -10.0, -2.0, -20.0]);
    }

    #[test]
    fn test_group_scope_without_group_column() {
        let frame = Frame::new()
            .with_column("x", Column::Float(vec![1.0, 2.0]))
            .unwrap()
            .with_column("y", Column::Float(vec![3.0, 4.0]))
            .unwrap();
        let config = ApplyConfig {
            fun_x: Some(cumsum()),
            ..ApplyConfig::default()
        };
        let out = apply_transform(&frame, &config).unwrap();
        assert_eq!(out.float_column("x").unwrap(), &[1.0, 3.0]);
    }

    #[test]
    fn test_per_group_padding_stays_within_group() {
        let frame = grouped_frame();
        let config = ApplyConfig {
            fun_x: Some(first_difference()),
            ..ApplyConfig::default()
        };
        let out = apply_transform(&frame, &config).unwrap();
        let x = out.float_column("x").unwrap();
        // Each two-row group yields one difference plus one NaN pad, placed
        // at that group's last row.
        assert_eq!(x[0], 2.0);
        assert_eq!(x[1], 2.0);
        assert!(x[2].is_nan());
        assert!(x[3].is_nan());
    }
}
