//! Per-group least-squares polynomial fit summaries.
//!
//! Fits `y ~ poly(x, degree)` by ordinary least squares (nalgebra SVD) within
//! each group partition (or once per panel) and emits one summary row per
//! fit: coefficients, r-squared, adjusted r-squared, the regression F
//! statistic with its upper-tail p-value, and npc label anchors so the host
//! can place an equation label.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use strata_core::npc::Axis;
use strata_core::stat::{
    AestheticMapping, ParameterConstraints, ParameterSpec, StatError, StatFamily, StatMetadata,
    StatParams, StatTransform,
};
use strata_core::{Column, Frame, Npc, NpcValue, PanelContext};

use crate::apply::ApplyScope;
use crate::dist::f_tail;

/// Vertical npc step between stacked per-group labels when no explicit
/// `label_y` is supplied.
const LABEL_STEP: f64 = 0.08;

/// Configuration for [`fit_summary`].
#[derive(Debug, Serialize, Deserialize)]
pub struct FitConfig {
    /// Polynomial degree (1 = straight line).
    pub degree: usize,
    /// Group or panel scope.
    #[serde(skip)]
    pub scope: ApplyScope,
    /// Name of the grouping-key column.
    pub group_column: String,
    /// Label-anchor override for the x axis (default: left edge).
    pub label_x: Option<NpcValue>,
    /// Label-anchor override for the y axis (default: top edge, stepping
    /// down per group so stacked labels do not overlap).
    pub label_y: Option<NpcValue>,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            degree: 1,
            scope: ApplyScope::Group,
            group_column: "group".to_string(),
            label_x: None,
            label_y: None,
        }
    }
}

/// One fitted polynomial with its inference summary.
struct GroupFit {
    coefficients: Vec<f64>,
    n: usize,
    r_squared: f64,
    adj_r_squared: f64,
    f_statistic: f64,
    p_value: f64,
}

fn fit_one(xs: &[f64], ys: &[f64], degree: usize) -> Result<GroupFit, StatError> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| (x, y))
        .collect();

    let n = pairs.len();
    let needed = (degree + 2).max(3);
    if n < needed {
        return Err(StatError::TooFewPoints { needed, actual: n });
    }

    let design = DMatrix::from_fn(n, degree + 1, |i, j| pairs[i].0.powi(j as i32));
    let response = DVector::from_fn(n, |i, _| pairs[i].1);

    let svd = design.svd(true, true);
    let solution = svd
        .solve(&response, 1.0e-12)
        .map_err(|e| StatError::ComputeFailed(e.to_string()))?;
    let coefficients: Vec<f64> = (0..=degree).map(|j| solution[j]).collect();

    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for &(x, y) in &pairs {
        let fitted: f64 = coefficients
            .iter()
            .enumerate()
            .map(|(j, &b)| b * x.powi(j as i32))
            .sum();
        ss_res += (y - fitted).powi(2);
        ss_tot += (y - mean_y).powi(2);
    }

    let k = degree as f64;
    let df_res = (n - degree - 1) as f64;
    let (r_squared, adj_r_squared, f_statistic, p_value) = if ss_tot <= 0.0 {
        // Constant response: the fit is exact but explains nothing.
        (f64::NAN, f64::NAN, f64::NAN, f64::NAN)
    } else if ss_res <= 0.0 {
        (1.0, 1.0, f64::INFINITY, 0.0)
    } else {
        let r2 = 1.0 - ss_res / ss_tot;
        let adj = 1.0 - (1.0 - r2) * (n as f64 - 1.0) / df_res;
        let f = ((ss_tot - ss_res) / k) / (ss_res / df_res);
        (r2, adj, f, f_tail(f, k, df_res))
    };

    Ok(GroupFit {
        coefficients,
        n,
        r_squared,
        adj_r_squared,
        f_statistic,
        p_value,
    })
}

/// Fit one polynomial per group (or per panel) and summarize each.
///
/// Output columns: `group`, `n`, `b0`..`b<degree>`, `r_squared`,
/// `adj_r_squared`, `f_statistic`, `p_value`, `npcx`, `npcy`, `x`, `y`.
pub fn fit_summary(
    frame: &Frame,
    config: &FitConfig,
    panel: &PanelContext,
) -> Result<Frame, StatError> {
    if config.degree == 0 {
        return Err(StatError::InvalidParameter {
            name: "degree".to_string(),
            reason: "degree must be at least 1".to_string(),
        });
    }

    let anchor_x = match &config.label_x {
        Some(v) => v.resolve(Axis::X)?,
        None => Npc::new(0.0)?,
    };
    let anchor_y = config
        .label_y
        .as_ref()
        .map(|v| v.resolve(Axis::Y))
        .transpose()?;

    let xs = frame.float_column("x")?;
    let ys = frame.float_column("y")?;

    let partitions: Vec<(String, Vec<usize>)> = match config.scope {
        ApplyScope::Panel => vec![("all".to_string(), (0..frame.len()).collect())],
        ApplyScope::Group if frame.has_column(&config.group_column) => {
            frame.split_by(&config.group_column)?
        }
        ApplyScope::Group => vec![("all".to_string(), (0..frame.len()).collect())],
    };

    let rows = partitions.len();
    let mut group_col = Vec::with_capacity(rows);
    let mut n_col = Vec::with_capacity(rows);
    let mut coef_cols: Vec<Vec<f64>> = vec![Vec::with_capacity(rows); config.degree + 1];
    let mut r2_col = Vec::with_capacity(rows);
    let mut adj_col = Vec::with_capacity(rows);
    let mut f_col = Vec::with_capacity(rows);
    let mut p_col = Vec::with_capacity(rows);
    let mut npcx_col = Vec::with_capacity(rows);
    let mut npcy_col = Vec::with_capacity(rows);
    let mut x_col = Vec::with_capacity(rows);
    let mut y_col = Vec::with_capacity(rows);

    for (index, (key, indices)) in partitions.iter().enumerate() {
        let gx: Vec<f64> = indices.iter().map(|&i| xs[i]).collect();
        let gy: Vec<f64> = indices.iter().map(|&i| ys[i]).collect();
        let fit = fit_one(&gx, &gy, config.degree)?;

        let npcy = match anchor_y {
            Some(npc) => npc,
            None => Npc::new((1.0 - LABEL_STEP * index as f64).max(0.0))?,
        };

        group_col.push(key.clone());
        n_col.push(fit.n as i64);
        for (j, col) in coef_cols.iter_mut().enumerate() {
            col.push(fit.coefficients[j]);
        }
        r2_col.push(fit.r_squared);
        adj_col.push(fit.adj_r_squared);
        f_col.push(fit.f_statistic);
        p_col.push(fit.p_value);
        npcx_col.push(anchor_x.value());
        npcy_col.push(npcy.value());
        x_col.push(panel.npc_to_x(anchor_x));
        y_col.push(panel.npc_to_y(npcy));
    }

    let mut out = Frame::new()
        .with_column("group", Column::Str(group_col))?
        .with_column("n", Column::Int(n_col))?;
    for (j, col) in coef_cols.into_iter().enumerate() {
        out = out.with_column(format!("b{}", j), Column::Float(col))?;
    }
    Ok(out
        .with_column("r_squared", Column::Float(r2_col))?
        .with_column("adj_r_squared", Column::Float(adj_col))?
        .with_column("f_statistic", Column::Float(f_col))?
        .with_column("p_value", Column::Float(p_col))?
        .with_column("npcx", Column::Float(npcx_col))?
        .with_column("npcy", Column::Float(npcy_col))?
        .with_column("x", Column::Float(x_col))?
        .with_column("y", Column::Float(y_col))?)
}

/// Protocol adapter for [`fit_summary`].
pub struct FitSummary {
    metadata: StatMetadata,
}

impl FitSummary {
    pub fn new() -> Self {
        Self {
            metadata: StatMetadata {
                id: "fit-summary".to_string(),
                name: "Fit Summary".to_string(),
                family: StatFamily::Summary,
                description: "Least-squares polynomial fit statistics per group".to_string(),
                parameters: vec![
                    ParameterSpec::int("degree", "Degree", 1)
                        .with_constraints(ParameterConstraints::range(1.0, 9.0))
                        .with_description("Polynomial degree"),
                    ParameterSpec::choice("scope", "Scope", &["group", "panel"], "group"),
                    ParameterSpec::string("group_column", "Group column", "group"),
                    ParameterSpec::string("label_x", "X anchor", "")
                        .with_description("Anchor token or npc fraction; empty = left edge"),
                    ParameterSpec::string("label_y", "Y anchor", "")
                        .with_description("Anchor token or npc fraction; empty = stacked from top"),
                ],
            },
        }
    }
}

impl Default for FitSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl StatTransform for FitSummary {
    fn metadata(&self) -> &StatMetadata {
        &self.metadata
    }

    fn required_columns(&self) -> &[&str] {
        &["x", "y"]
    }

    fn default_aesthetics(&self) -> Vec<AestheticMapping> {
        vec![
            AestheticMapping::new("r_squared", "label"),
            AestheticMapping::new("npcx", "npcx"),
            AestheticMapping::new("npcy", "npcy"),
        ]
    }

    fn compute(
        &self,
        frame: &Frame,
        params: &StatParams,
        panel: &PanelContext,
    ) -> Result<Frame, StatError> {
        self.validate_params(params)?;
        self.check_columns(frame)?;
        let mut filled = params.clone();
        filled.fill_defaults(&self.metadata.parameters);

        let parse_anchor = |name: &str| -> Option<NpcValue> {
            let raw = filled.get_string_or(name, "");
            if raw.is_empty() {
                return None;
            }
            match raw.parse::<f64>() {
                Ok(v) => Some(NpcValue::Numeric(v)),
                Err(_) => Some(NpcValue::Token(raw.to_string())),
            }
        };

        let config = FitConfig {
            degree: filled.get_int_or("degree", 1) as usize,
            scope: match filled.get_string_or("scope", "group") {
                "panel" => ApplyScope::Panel,
                _ => ApplyScope::Group,
            },
            group_column: filled.get_string_or("group_column", "group").to_string(),
            label_x: parse_anchor("label_x"),
            label_y: parse_anchor("label_y"),
        };
        fit_summary(frame, &config, panel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> PanelContext {
        PanelContext::new((0.0, 10.0), (0.0, 30.0)).unwrap()
    }

    fn line_frame() -> Frame {
        let xs: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 1.0).collect();
        Frame::new()
            .with_column("x", Column::Float(xs))
            .unwrap()
            .with_column("y", Column::Float(ys))
            .unwrap()
    }

    #[test]
    fn test_exact_line_recovered() {
        let out = fit_summary(&line_frame(), &FitConfig::default(), &panel()).unwrap();
        assert_eq!(out.len(), 1);
        assert!((out.float_column("b0").unwrap()[0] - 1.0).abs() < 1e-9);
        assert!((out.float_column("b1").unwrap()[0] - 2.0).abs() < 1e-9);
        assert!((out.float_column("r_squared").unwrap()[0] - 1.0).abs() < 1e-9);
        assert_eq!(out.float_column("p_value").unwrap()[0], 0.0);
        assert_eq!(out.column("n").unwrap().as_int().unwrap()[0], 10);
    }

    #[test]
    fn test_quadratic_fit() {
        let xs: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 0.5 * x * x - x + 3.0).collect();
        let frame = Frame::new()
            .with_column("x", Column::Float(xs))
            .unwrap()
            .with_column("y", Column::Float(ys))
            .unwrap();
        let config = FitConfig {
            degree: 2,
            ..FitConfig::default()
        };
        let out = fit_summary(&frame, &config, &panel()).unwrap();
        assert!((out.float_column("b2").unwrap()[0] - 0.5).abs() < 1e-8);
        assert!((out.float_column("b1").unwrap()[0] + 1.0).abs() < 1e-8);
        assert!((out.float_column("b0").unwrap()[0] - 3.0).abs() < 1e-8);
    }

    #[test]
    fn test_weak_relation_large_p() {
        let frame = Frame::new()
            .with_column("x", Column::Float(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]))
            .unwrap()
            .with_column("y", Column::Float(vec![2.0, 1.0, 2.0, 1.0, 2.0, 1.0]))
            .unwrap();
        let out = fit_summary(&frame, &FitConfig::default(), &panel()).unwrap();
        assert!(out.float_column("p_value").unwrap()[0] > 0.1);
        assert!(out.float_column("r_squared").unwrap()[0] < 0.5);
    }

    #[test]
    fn test_per_group_fits_and_label_stacking() {
        let frame = Frame::new()
            .with_column("x", Column::Float(vec![0.0, 1.0, 2.0, 3.0, 0.0, 1.0, 2.0, 3.0]))
            .unwrap()
            .with_column("y", Column::Float(vec![0.0, 1.0, 2.0, 3.0, 0.0, 2.0, 4.0, 6.0]))
            .unwrap()
            .with_column(
                "group",
                Column::Str(
                    ["a", "a", "a", "a", "b", "b", "b", "b"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                ),
            )
            .unwrap();
        let out = fit_summary(&frame, &FitConfig::default(), &panel()).unwrap();
        assert_eq!(out.len(), 2);
        let slopes = out.float_column("b1").unwrap();
        assert!((slopes[0] - 1.0).abs() < 1e-9);
        assert!((slopes[1] - 2.0).abs() < 1e-9);
        // Stacked default anchors step down from the top edge.
        let npcy = out.float_column("npcy").unwrap();
        assert_eq!(npcy[0], 1.0);
        assert!((npcy[1] - (1.0 - LABEL_STEP)).abs() < 1e-12);
    }

    #[test]
    fn test_constant_response_yields_nan_summary() {
        let frame = Frame::new()
            .with_column("x", Column::Float(vec![1.0, 2.0, 3.0, 4.0]))
            .unwrap()
            .with_column("y", Column::Float(vec![5.0; 4]))
            .unwrap();
        let out = fit_summary(&frame, &FitConfig::default(), &panel()).unwrap();
        assert!(out.float_column("r_squared").unwrap()[0].is_nan());
        assert!(out.float_column("p_value").unwrap()[0].is_nan());
    }

    #[test]
    fn test_validation_errors() {
        let frame = line_frame();
        let zero_degree = FitConfig {
            degree: 0,
            ..FitConfig::default()
        };
        assert!(fit_summary(&frame, &zero_degree, &panel()).is_err());

        let tiny = Frame::new()
            .with_column("x", Column::Float(vec![1.0, 2.0]))
            .unwrap()
            .with_column("y", Column::Float(vec![1.0, 2.0]))
            .unwrap();
        assert!(matches!(
            fit_summary(&tiny, &FitConfig::default(), &panel()),
            Err(StatError::TooFewPoints { .. })
        ));

        // Degree too high for the available points.
        let short = Frame::new()
            .with_column("x", Column::Float(vec![1.0, 2.0, 3.0, 4.0]))
            .unwrap()
            .with_column("y", Column::Float(vec![1.0, 4.0, 9.0, 16.0]))
            .unwrap();
        let high = FitConfig {
            degree: 3,
            ..FitConfig::default()
        };
        assert!(fit_summary(&short, &high, &panel()).is_err());
    }

    #[test]
    fn test_protocol_invocation() {
        let stat = FitSummary::new();
        let mut params = StatParams::new();
        params.set_int("degree", 1);
        params.set_string("label_x", "right");
        let out = stat.compute(&line_frame(), &params, &panel()).unwrap();
        assert_eq!(out.float_column("npcx").unwrap(), &[1.0]);
        assert_eq!(out.float_column("x").unwrap(), &[10.0]);
    }
}
