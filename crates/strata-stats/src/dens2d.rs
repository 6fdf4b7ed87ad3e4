//! Density-based point filtering and labelling.
//!
//! Scores every point by a 2D Gaussian product-kernel density estimate and
//! retains a target fraction, lowest-density ("sparse") points first by
//! default since those are the ones worth labelling on a crowded panel. Two
//! entry points share the scorer: [`density_filter`] returns only the kept
//! rows, [`density_label`] returns every row plus a boolean `keep` column.

use serde::{Deserialize, Serialize};

use strata_core::stat::{
    AestheticMapping, ParameterConstraints, ParameterSpec, StatError, StatFamily, StatMetadata,
    StatParams, StatTransform,
};
use strata_core::{Column, Frame, PanelContext};

/// Configuration for the density filter/label adapters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Dens2dConfig {
    /// Fraction of finite points to keep, in [0, 1].
    pub keep_fraction: f64,
    /// Absolute cap on the number of kept points.
    pub keep_number: Option<usize>,
    /// Keep the lowest-density points (true) or the highest-density ones.
    pub keep_sparse: bool,
    /// Flip the kept set after selection.
    pub invert: bool,
    /// Per-axis bandwidth override; `None` uses the normal reference rule
    /// `1.06 * sigma * n^(-1/5)`.
    pub bandwidth: Option<(f64, f64)>,
}

impl Default for Dens2dConfig {
    fn default() -> Self {
        Self {
            keep_fraction: 0.10,
            keep_number: None,
            keep_sparse: true,
            invert: false,
            bandwidth: None,
        }
    }
}

fn reference_bandwidth(values: &[f64], axis: &str) -> Result<f64, StatError> {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let sigma = variance.sqrt();
    if sigma <= 0.0 {
        return Err(StatError::InvalidParameter {
            name: "bandwidth".to_string(),
            reason: format!(
                "{} values have zero variance; supply an explicit bandwidth",
                axis
            ),
        });
    }
    Ok(1.06 * sigma * n.powf(-0.2))
}

/// Indices of rows to keep, in ascending row order.
fn kept_indices(frame: &Frame, config: &Dens2dConfig) -> Result<Vec<usize>, StatError> {
    if !(0.0..=1.0).contains(&config.keep_fraction) {
        return Err(StatError::InvalidParameter {
            name: "keep_fraction".to_string(),
            reason: format!("{} is outside [0, 1]", config.keep_fraction),
        });
    }
    if let Some((hx, hy)) = config.bandwidth {
        if hx <= 0.0 || hy <= 0.0 {
            return Err(StatError::InvalidParameter {
                name: "bandwidth".to_string(),
                reason: "bandwidths must be positive".to_string(),
            });
        }
    }

    let xs = frame.float_column("x")?;
    let ys = frame.float_column("y")?;
    let finite: Vec<usize> = (0..frame.len())
        .filter(|&i| xs[i].is_finite() && ys[i].is_finite())
        .collect();
    let m = finite.len();
    if m < 2 {
        return Err(StatError::TooFewPoints {
            needed: 2,
            actual: m,
        });
    }

    let (hx, hy) = match config.bandwidth {
        Some(h) => h,
        None => {
            let fx: Vec<f64> = finite.iter().map(|&i| xs[i]).collect();
            let fy: Vec<f64> = finite.iter().map(|&i| ys[i]).collect();
            (
                reference_bandwidth(&fx, "x")?,
                reference_bandwidth(&fy, "y")?,
            )
        }
    };

    // Product-kernel estimate at each observation; the normalizing constant
    // is shared, so ranking does not depend on it, but keeping it makes the
    // scores genuine densities.
    let norm = 1.0 / (m as f64 * hx * hy * 2.0 * std::f64::consts::PI);
    let densities: Vec<f64> = finite
        .iter()
        .map(|&i| {
            let sum: f64 = finite
                .iter()
                .map(|&j| {
                    let dx = (xs[i] - xs[j]) / hx;
                    let dy = (ys[i] - ys[j]) / hy;
                    (-0.5 * (dx * dx + dy * dy)).exp()
                })
                .sum();
            sum * norm
        })
        .collect();

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| {
        densities[a]
            .partial_cmp(&densities[b])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut k = (config.keep_fraction * m as f64).ceil() as usize;
    if let Some(cap) = config.keep_number {
        k = k.min(cap);
    }
    k = k.min(m);

    let chosen: &[usize] = if config.keep_sparse {
        &order[..k]
    } else {
        &order[m - k..]
    };
    let mut keep_flags = vec![false; m];
    for &pos in chosen {
        keep_flags[pos] = true;
    }
    if config.invert {
        for flag in &mut keep_flags {
            *flag = !*flag;
        }
    }

    Ok(finite
        .iter()
        .enumerate()
        .filter(|(pos, _)| keep_flags[*pos])
        .map(|(_, &row)| row)
        .collect())
}

/// Return only the rows whose density rank selects them.
///
/// Rows with non-finite `x` or `y` are never kept, including under
/// `invert`.
pub fn density_filter(frame: &Frame, config: &Dens2dConfig) -> Result<Frame, StatError> {
    let kept = kept_indices(frame, config)?;
    Ok(frame.take(&kept)?)
}

/// Return every row plus a boolean `keep` column.
pub fn density_label(frame: &Frame, config: &Dens2dConfig) -> Result<Frame, StatError> {
    let kept = kept_indices(frame, config)?;
    let mut flags = vec![false; frame.len()];
    for &i in &kept {
        flags[i] = true;
    }
    Ok(frame.clone().with_column("keep", Column::Bool(flags))?)
}

fn parameters() -> Vec<ParameterSpec> {
    vec![
        ParameterSpec::float("keep_fraction", "Keep fraction", 0.10)
            .with_constraints(ParameterConstraints::range(0.0, 1.0)),
        ParameterSpec::int("keep_number", "Keep number", -1)
            .with_description("Absolute cap on kept points; -1 = no cap"),
        ParameterSpec::bool("keep_sparse", "Keep sparse", true)
            .with_description("Keep lowest-density points rather than highest"),
        ParameterSpec::bool("invert", "Invert selection", false),
        ParameterSpec::float("h_x", "X bandwidth", 0.0)
            .with_description("Kernel bandwidth; 0 = normal reference rule"),
        ParameterSpec::float("h_y", "Y bandwidth", 0.0),
    ]
}

fn config_from_params(params: &StatParams) -> Dens2dConfig {
    let keep_number = params.get_int_or("keep_number", -1);
    let hx = params.get_float_or("h_x", 0.0);
    let hy = params.get_float_or("h_y", 0.0);
    Dens2dConfig {
        keep_fraction: params.get_float_or("keep_fraction", 0.10),
        keep_number: if keep_number < 0 {
            None
        } else {
            Some(keep_number as usize)
        },
        keep_sparse: params.get_bool_or("keep_sparse", true),
        invert: params.get_bool_or("invert", false),
        bandwidth: if hx > 0.0 && hy > 0.0 {
            Some((hx, hy))
        } else {
            None
        },
    }
}

/// Protocol adapter for [`density_filter`].
pub struct Dens2dFilter {
    metadata: StatMetadata,
}

impl Dens2dFilter {
    pub fn new() -> Self {
        Self {
            metadata: StatMetadata {
                id: "dens2d-filter".to_string(),
                name: "2D Density Filter".to_string(),
                family: StatFamily::Filter,
                description: "Keep a density-ranked fraction of points".to_string(),
                parameters: parameters(),
            },
        }
    }
}

impl Default for Dens2dFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl StatTransform for Dens2dFilter {
    fn metadata(&self) -> &StatMetadata {
        &self.metadata
    }

    fn required_columns(&self) -> &[&str] {
        &["x", "y"]
    }

    fn default_aesthetics(&self) -> Vec<AestheticMapping> {
        vec![
            AestheticMapping::new("x", "x"),
            AestheticMapping::new("y", "y"),
        ]
    }

    fn compute(
        &self,
        frame: &Frame,
        params: &StatParams,
        _panel: &PanelContext,
    ) -> Result<Frame, StatError> {
        self.validate_params(params)?;
        self.check_columns(frame)?;
        let mut filled = params.clone();
        filled.fill_defaults(&self.metadata.parameters);
        density_filter(frame, &config_from_params(&filled))
    }
}

/// Protocol adapter for [`density_label`].
pub struct Dens2dLabel {
    metadata: StatMetadata,
}

impl Dens2dLabel {
    pub fn new() -> Self {
        Self {
            metadata: StatMetadata {
                id: "dens2d-label".to_string(),
                name: "2D Density Label Flags".to_string(),
                family: StatFamily::Filter,
                description: "Flag a density-ranked fraction of points for labelling".to_string(),
                parameters: parameters(),
            },
        }
    }
}

impl Default for Dens2dLabel {
    fn default() -> Self {
        Self::new()
    }
}

impl StatTransform for Dens2dLabel {
    fn metadata(&self) -> &StatMetadata {
        &self.metadata
    }

    fn required_columns(&self) -> &[&str] {
        &["x", "y"]
    }

    fn default_aesthetics(&self) -> Vec<AestheticMapping> {
        vec![AestheticMapping::new("keep", "alpha")]
    }

    fn compute(
        &self,
        frame: &Frame,
        params: &StatParams,
        _panel: &PanelContext,
    ) -> Result<Frame, StatError> {
        self.validate_params(params)?;
        self.check_columns(frame)?;
        let mut filled = params.clone();
        filled.fill_defaults(&self.metadata.parameters);
        density_label(frame, &config_from_params(&filled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A tight 4x4 grid near the origin plus two far outliers.
    fn cluster_with_outliers() -> Frame {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for i in 0..4 {
            for j in 0..4 {
                xs.push(i as f64 * 0.1);
                ys.push(j as f64 * 0.1);
            }
        }
        xs.push(50.0);
        ys.push(50.0);
        xs.push(-50.0);
        ys.push(40.0);
        Frame::new()
            .with_column("x", Column::Float(xs))
            .unwrap()
            .with_column("y", Column::Float(ys))
            .unwrap()
    }

    #[test]
    fn test_sparse_points_kept_first() {
        let frame = cluster_with_outliers();
        let config = Dens2dConfig {
            keep_fraction: 2.0 / 18.0,
            ..Dens2dConfig::default()
        };
        let out = density_filter(&frame, &config).unwrap();
        assert_eq!(out.len(), 2);
        // Both kept rows are the outliers.
        for &x in out.float_column("x").unwrap() {
            assert!(x.abs() >= 50.0 - 1e-9);
        }
    }

    #[test]
    fn test_keep_dense_instead() {
        let frame = cluster_with_outliers();
        let config = Dens2dConfig {
            keep_fraction: 0.25,
            keep_sparse: false,
            ..Dens2dConfig::default()
        };
        let out = density_filter(&frame, &config).unwrap();
        for &x in out.float_column("x").unwrap() {
            assert!(x.abs() < 1.0);
        }
    }

    #[test]
    fn test_keep_count_is_ceil_of_fraction() {
        let frame = cluster_with_outliers(); // 18 points
        let config = Dens2dConfig {
            keep_fraction: 0.3, // ceil(5.4) = 6
            ..Dens2dConfig::default()
        };
        let out = density_filter(&frame, &config).unwrap();
        assert_eq!(out.len(), 6);
    }

    #[test]
    fn test_keep_number_caps_selection() {
        let frame = cluster_with_outliers();
        let config = Dens2dConfig {
            keep_fraction: 0.5,
            keep_number: Some(1),
            ..Dens2dConfig::default()
        };
        let out = density_filter(&frame, &config).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_invert_flips_selection() {
        let frame = cluster_with_outliers();
        let base = Dens2dConfig {
            keep_fraction: 2.0 / 18.0,
            ..Dens2dConfig::default()
        };
        let inverted = Dens2dConfig {
            invert: true,
            ..base.clone()
        };
        let kept = density_filter(&frame, &base).unwrap();
        let rest = density_filter(&frame, &inverted).unwrap();
        assert_eq!(kept.len() + rest.len(), frame.len());
        for &x in rest.float_column("x").unwrap() {
            assert!(x.abs() < 1.0);
        }
    }

    #[test]
    fn test_label_variant_flags_rows() {
        let frame = cluster_with_outliers();
        let config = Dens2dConfig {
            keep_fraction: 2.0 / 18.0,
            ..Dens2dConfig::default()
        };
        let out = density_label(&frame, &config).unwrap();
        assert_eq!(out.len(), frame.len());
        let flags = out.column("keep").unwrap().as_bool().unwrap();
        assert_eq!(flags.iter().filter(|&&f| f).count(), 2);
        // The outliers are the flagged rows.
        assert!(flags[16] && flags[17]);
    }

    #[test]
    fn test_non_finite_rows_never_kept() {
        let frame = Frame::new()
            .with_column("x", Column::Float(vec![0.0, 0.1, 0.2, f64::NAN, 5.0]))
            .unwrap()
            .with_column("y", Column::Float(vec![0.0, 0.1, 0.2, 1.0, 5.0]))
            .unwrap();
        let config = Dens2dConfig {
            keep_fraction: 1.0,
            invert: false,
            ..Dens2dConfig::default()
        };
        let out = density_label(&frame, &config).unwrap();
        let flags = out.column("keep").unwrap().as_bool().unwrap();
        assert!(!flags[3]);
        assert_eq!(flags.iter().filter(|&&f| f).count(), 4);
    }

    #[test]
    fn test_explicit_bandwidth_on_degenerate_axis() {
        // All x identical: the reference rule cannot produce a bandwidth,
        // but an explicit one can.
        let frame = Frame::new()
            .with_column("x", Column::Float(vec![1.0; 5]))
            .unwrap()
            .with_column("y", Column::Float(vec![0.0, 1.0, 2.0, 3.0, 10.0]))
            .unwrap();
        assert!(matches!(
            density_filter(&frame, &Dens2dConfig::default()),
            Err(StatError::InvalidParameter { .. })
        ));

        let config = Dens2dConfig {
            keep_fraction: 0.2,
            bandwidth: Some((1.0, 1.0)),
            ..Dens2dConfig::default()
        };
        let out = density_filter(&frame, &config).unwrap();
        assert_eq!(out.float_column("y").unwrap(), &[10.0]);
    }

    #[test]
    fn test_validation_errors() {
        let frame = cluster_with_outliers();
        let bad_fraction = Dens2dConfig {
            keep_fraction: 1.5,
            ..Dens2dConfig::default()
        };
        assert!(density_filter(&frame, &bad_fraction).is_err());

        let one_point = Frame::new()
            .with_column("x", Column::Float(vec![1.0]))
            .unwrap()
            .with_column("y", Column::Float(vec![1.0]))
            .unwrap();
        assert!(matches!(
            density_filter(&one_point, &Dens2dConfig::default()),
            Err(StatError::TooFewPoints { .. })
        ));
    }

    #[test]
    fn test_protocol_invocation() {
        let stat = Dens2dFilter::new();
        let frame = cluster_with_outliers();
        let panel = PanelContext::from_frame(&frame).unwrap();
        let mut params = StatParams::new();
        params.set_float("keep_fraction", 2.0 / 18.0);
        let out = stat.compute(&frame, &params, &panel).unwrap();
        assert_eq!(out.len(), 2);
    }
}
