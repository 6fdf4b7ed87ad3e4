//! Quadrant partition-and-count adapter.
//!
//! Partitions one panel's points into up to four quadrants around a
//! configurable origin, optionally pooling pairs of quadrants, and emits one
//! summary row per reported quadrant with a count and label-anchor
//! coordinates (both npc and data units).
//!
//! The boundary tie-break is load-bearing: a point with `x == xintercept`
//! counts as `x >= xintercept`, and likewise for y, so a point exactly at the
//! origin always lands in quadrant 1.

use serde::{Deserialize, Serialize};

use strata_core::npc::Axis;
use strata_core::stat::{
    AestheticMapping, ParameterConstraints, ParameterSpec, StatError, StatFamily, StatMetadata,
    StatParams, StatTransform,
};
use strata_core::{Column, Frame, Npc, NpcValue, PanelContext};

/// How quadrants are pooled before counting.
///
/// The labels are asymmetric on purpose: pool `"x"` emits {1, 2}, pool `"y"`
/// emits {1, 4}. Downstream callers key on these exact labels, so the
/// asymmetry is pinned by test rather than normalized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pooling {
    /// No pooling; quadrants 1-4 as assigned.
    #[default]
    None,
    /// Merge {1,4} into 1 and {2,3} into 2: only the y-sign distinction
    /// survives.
    X,
    /// Merge {1,2} into 1 and {3,4} into 4: only the x-sign distinction
    /// survives.
    Y,
}

impl Pooling {
    /// Parse one of the recognized tokens `"none"`, `"x"`, `"y"`.
    pub fn parse(token: &str) -> Result<Self, StatError> {
        match token {
            "none" => Ok(Pooling::None),
            "x" => Ok(Pooling::X),
            "y" => Ok(Pooling::Y),
            other => Err(StatError::InvalidParameter {
                name: "pool".to_string(),
                reason: format!("'{}' is not one of none/x/y", other),
            }),
        }
    }

    /// Collapse a raw quadrant label under this pooling mode.
    pub fn apply(&self, quadrant: u8) -> u8 {
        match self {
            Pooling::None => quadrant,
            Pooling::X => match quadrant {
                1 | 4 => 1,
                _ => 2,
            },
            Pooling::Y => match quadrant {
                1 | 2 => 1,
                _ => 4,
            },
        }
    }
}

/// Which quadrants the summary reports.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuadrantSelection {
    /// Derive the reported set from which half-planes the data occupies.
    #[default]
    Auto,
    /// One whole-panel row with the total observation count.
    Total,
    /// Exactly these quadrants (1..=4, at most four entries).
    Explicit(Vec<u8>),
}

/// Configuration for [`quadrant_counts`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuadrantConfig {
    /// x position of the vertical reference line.
    pub xintercept: f64,
    /// y position of the horizontal reference line.
    pub yintercept: f64,
    /// Pooling mode.
    pub pool: Pooling,
    /// Reported quadrant set.
    pub quadrants: QuadrantSelection,
    /// Label-anchor override for the x axis (token or npc fraction).
    pub label_x: Option<NpcValue>,
    /// Label-anchor override for the y axis.
    pub label_y: Option<NpcValue>,
}

impl Default for QuadrantConfig {
    fn default() -> Self {
        Self {
            xintercept: 0.0,
            yintercept: 0.0,
            pool: Pooling::None,
            quadrants: QuadrantSelection::Auto,
            label_x: None,
            label_y: None,
        }
    }
}

/// Assign a raw quadrant from the sign of `(x - xi, y - yi)`.
///
/// Ties at either intercept resolve to the non-negative branch.
fn raw_quadrant(x: f64, y: f64, xi: f64, yi: f64) -> u8 {
    match (x >= xi, y >= yi) {
        (true, true) => 1,
        (true, false) => 2,
        (false, false) => 3,
        (false, true) => 4,
    }
}

/// Default npc corner anchor for a (possibly pooled) quadrant label.
///
/// Labels sit in the outer visual corner of their quadrant; the whole-panel
/// total sits at the centre.
fn corner(quadrant: u8) -> (f64, f64) {
    match quadrant {
        1 => (1.0, 1.0),
        2 => (1.0, 0.0),
        3 => (0.0, 0.0),
        4 => (0.0, 1.0),
        _ => (0.5, 0.5),
    }
}

fn validate_explicit(set: &[u8]) -> Result<Vec<u8>, StatError> {
    if set.is_empty() {
        return Err(StatError::InvalidParameter {
            name: "quadrants".to_string(),
            reason: "explicit quadrant set is empty".to_string(),
        });
    }
    if set.len() > 4 {
        return Err(StatError::InvalidParameter {
            name: "quadrants".to_string(),
            reason: format!("{} entries supplied, at most four allowed", set.len()),
        });
    }
    if set.contains(&0) && set.len() > 1 {
        return Err(StatError::InvalidParameter {
            name: "quadrants".to_string(),
            reason: "0 (whole-panel total) cannot be combined with quadrants".to_string(),
        });
    }
    if let Some(&bad) = set.iter().find(|&&q| q > 4) {
        return Err(StatError::InvalidParameter {
            name: "quadrants".to_string(),
            reason: format!("{} is not a quadrant in 0..=4", bad),
        });
    }
    // Duplicates collapse silently; order is preserved.
    let mut unique = Vec::with_capacity(set.len());
    for &q in set {
        if !unique.contains(&q) {
            unique.push(q);
        }
    }
    Ok(unique)
}

/// Partition a panel's points into quadrants and count them.
///
/// The output has exactly one row per reported quadrant, zero-count rows
/// included, with columns `quadrant`, `count`, `npcx`, `npcy`, `x`, `y`.
/// Points with non-finite `x` or `y` are excluded from every count.
pub fn quadrant_counts(
    frame: &Frame,
    config: &QuadrantConfig,
    panel: &PanelContext,
) -> Result<Frame, StatError> {
    if !config.xintercept.is_finite() || !config.yintercept.is_finite() {
        return Err(StatError::InvalidParameter {
            name: "xintercept/yintercept".to_string(),
            reason: "intercepts must be finite".to_string(),
        });
    }

    // Resolve label anchors once, before touching any row.
    let anchor_x = config
        .label_x
        .as_ref()
        .map(|v| v.resolve(Axis::X))
        .transpose()?;
    let anchor_y = config
        .label_y
        .as_ref()
        .map(|v| v.resolve(Axis::Y))
        .transpose()?;
    let explicit = match &config.quadrants {
        QuadrantSelection::Explicit(set) => Some(validate_explicit(set)?),
        _ => None,
    };

    let xs = frame.float_column("x")?;
    let ys = frame.float_column("y")?;

    let pooled: Vec<u8> = xs
        .iter()
        .zip(ys)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| {
            config
                .pool
                .apply(raw_quadrant(x, y, config.xintercept, config.yintercept))
        })
        .collect();

    let reported: Vec<u8> = match (&config.quadrants, explicit) {
        (QuadrantSelection::Total, _) => vec![0],
        (QuadrantSelection::Explicit(_), Some(set)) => {
            if set == [0] {
                vec![0]
            } else {
                set
            }
        }
        _ => {
            let finite = xs
                .iter()
                .zip(ys)
                .filter(|(x, y)| x.is_finite() && y.is_finite());
            let mut x_sides = (false, false); // (>= xi, < xi)
            let mut y_sides = (false, false);
            for (&x, &y) in finite {
                if x >= config.xintercept {
                    x_sides.0 = true;
                } else {
                    x_sides.1 = true;
                }
                if y >= config.yintercept {
                    y_sides.0 = true;
                } else {
                    y_sides.1 = true;
                }
            }
            // Cartesian product of the occupied half-planes; no data at all
            // reports the full pooled set of zero counts.
            let mut raw: Vec<u8> = if x_sides == (false, false) {
                vec![1, 2, 3, 4]
            } else {
                [1u8, 2, 3, 4]
                    .into_iter()
                    .filter(|&q| {
                        let x_ok = if matches!(q, 1 | 2) { x_sides.0 } else { x_sides.1 };
                        let y_ok = if matches!(q, 1 | 4) { y_sides.0 } else { y_sides.1 };
                        x_ok && y_ok
                    })
                    .collect()
            };
            raw = raw.into_iter().map(|q| config.pool.apply(q)).collect();
            let mut unique: Vec<u8> = Vec::new();
            for q in raw {
                if !unique.contains(&q) {
                    unique.push(q);
                }
            }
            unique.sort_unstable();
            unique
        }
    };

    let mut quadrant_col = Vec::with_capacity(reported.len());
    let mut count_col = Vec::with_capacity(reported.len());
    let mut npcx_col = Vec::with_capacity(reported.len());
    let mut npcy_col = Vec::with_capacity(reported.len());
    let mut x_col = Vec::with_capacity(reported.len());
    let mut y_col = Vec::with_capacity(reported.len());

    for &q in &reported {
        let count = if q == 0 {
            pooled.len()
        } else {
            pooled.iter().filter(|&&p| p == q).count()
        };

        let (default_x, default_y) = corner(q);
        let npcx = match anchor_x {
            Some(npc) => npc,
            None => Npc::new(default_x)?,
        };
        let npcy = match anchor_y {
            Some(npc) => npc,
            None => Npc::new(default_y)?,
        };

        quadrant_col.push(q as i64);
        count_col.push(count as i64);
        npcx_col.push(npcx.value());
        npcy_col.push(npcy.value());
        x_col.push(panel.npc_to_x(npcx));
        y_col.push(panel.npc_to_y(npcy));
    }

    Ok(Frame::new()
        .with_column("quadrant", Column::Int(quadrant_col))?
        .with_column("count", Column::Int(count_col))?
        .with_column("npcx", Column::Float(npcx_col))?
        .with_column("npcy", Column::Float(npcy_col))?
        .with_column("x", Column::Float(x_col))?
        .with_column("y", Column::Float(y_col))?)
}

/// Protocol adapter for [`quadrant_counts`].
pub struct QuadrantCounts {
    metadata: StatMetadata,
}

impl QuadrantCounts {
    pub fn new() -> Self {
        Self {
            metadata: StatMetadata {
                id: "quadrant-counts".to_string(),
                name: "Quadrant Counts".to_string(),
                family: StatFamily::Summary,
                description: "Count observations per quadrant around an origin".to_string(),
                parameters: vec![
                    ParameterSpec::float("xintercept", "X intercept", 0.0)
                        .with_description("x position of the vertical reference line"),
                    ParameterSpec::float("yintercept", "Y intercept", 0.0)
                        .with_description("y position of the horizontal reference line"),
                    ParameterSpec::choice("pool", "Pooling mode", &["none", "x", "y"], "none")
                        .with_description("Collapse quadrant pairs before counting"),
                    ParameterSpec::vec("quadrants", "Quadrants", vec![])
                        .with_constraints(ParameterConstraints::none().max_len(4))
                        .with_description("Quadrants to report; empty = auto, [0] = panel total"),
                    ParameterSpec::string("label_x", "X anchor", "")
                        .with_description("Anchor token or npc fraction; empty = per-quadrant corner"),
                    ParameterSpec::string("label_y", "Y anchor", "")
                        .with_description("Anchor token or npc fraction; empty = per-quadrant corner"),
                ],
            },
        }
    }
}

impl Default for QuadrantCounts {
    fn default() -> Self {
        Self::new()
    }
}

/// Interpret an anchor parameter: a number parses as an npc fraction,
/// anything else is treated as a token; empty means "use the default".
fn parse_anchor(value: &str) -> Option<NpcValue> {
    if value.is_empty() {
        return None;
    }
    match value.parse::<f64>() {
        Ok(v) => Some(NpcValue::Numeric(v)),
        Err(_) => Some(NpcValue::Token(value.to_string())),
    }
}

impl QuadrantConfig {
    /// Build a config from host-supplied parameters (defaults already
    /// filled in).
    fn from_params(params: &StatParams) -> Result<Self, StatError> {
        let quadrants = match params.get_vec("quadrants").unwrap_or(&[]) {
            [] => QuadrantSelection::Auto,
            set => {
                let mut ids = Vec::with_capacity(set.len());
                for &v in set {
                    if !v.is_finite() || v.fract() != 0.0 || !(0.0..=4.0).contains(&v) {
                        return Err(StatError::InvalidParameter {
                            name: "quadrants".to_string(),
                            reason: format!("{} is not a quadrant in 0..=4", v),
                        });
                    }
                    ids.push(v as u8);
                }
                if ids == [0] {
                    QuadrantSelection::Total
                } else {
                    QuadrantSelection::Explicit(ids)
                }
            }
        };

        Ok(Self {
            xintercept: params.get_float_or("xintercept", 0.0),
            yintercept: params.get_float_or("yintercept", 0.0),
            pool: Pooling::parse(params.get_string_or("pool", "none"))?,
            quadrants,
            label_x: parse_anchor(params.get_string_or("label_x", "")),
            label_y: parse_anchor(params.get_string_or("label_y", "")),
        })
    }
}

impl StatTransform for QuadrantCounts {
    fn metadata(&self) -> &StatMetadata {
        &self.metadata
    }

    fn required_columns(&self) -> &[&str] {
        &["x", "y"]
    }

    fn default_aesthetics(&self) -> Vec<AestheticMapping> {
        vec![
            AestheticMapping::new("count", "label"),
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
        let config = QuadrantConfig::from_params(&filled)?;
        quadrant_counts(frame, &config, panel)
    }
}
