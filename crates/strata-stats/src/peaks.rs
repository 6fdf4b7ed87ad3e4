//! Local peak and valley detection.
//!
//! A row is a peak when its `y` is the strict maximum of a centred window of
//! odd width `span` (valleys: strict minimum), optionally filtered by a
//! relative height threshold against the panel's y range. The output is the
//! selected subset of input rows plus formatted `x_label`/`y_label` columns
//! for direct label rendering.

use serde::{Deserialize, Serialize};

use strata_core::stat::{
    AestheticMapping, ParameterConstraints, ParameterSpec, StatError, StatFamily, StatMetadata,
    StatParams, StatTransform,
};
use strata_core::{Column, Frame, PanelContext};

/// Which extremum the shared finder looks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Extremum {
    Peaks,
    Valleys,
}

/// Configuration for [`find_peaks`] / [`find_valleys`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PeaksConfig {
    /// Odd window width of at least 3, or `None` for the global extremum
    /// only.
    pub span: Option<usize>,
    /// Relative height cutoff in [0, 1] against the panel y range: peaks
    /// keep range-scaled heights at or above it, valleys at or below its
    /// mirror image `1 - ignore_threshold`.
    pub ignore_threshold: f64,
    /// Significant digits for the label columns.
    pub digits: usize,
}

impl Default for PeaksConfig {
    fn default() -> Self {
        Self {
            span: Some(5),
            ignore_threshold: 0.0,
            digits: 4,
        }
    }
}

impl PeaksConfig {
    fn validate(&self) -> Result<(), StatError> {
        if let Some(span) = self.span {
            if span < 3 || span % 2 == 0 {
                return Err(StatError::InvalidParameter {
                    name: "span".to_string(),
                    reason: format!("span must be an odd integer >= 3, got {}", span),
                });
            }
        }
        if !(0.0..=1.0).contains(&self.ignore_threshold) {
            return Err(StatError::InvalidParameter {
                name: "ignore_threshold".to_string(),
                reason: format!("{} is outside [0, 1]", self.ignore_threshold),
            });
        }
        if self.digits == 0 {
            return Err(StatError::InvalidParameter {
                name: "digits".to_string(),
                reason: "at least one significant digit required".to_string(),
            });
        }
        Ok(())
    }
}

/// Round to `digits` significant figures and format without exponent
/// notation.
fn format_signif(value: f64, digits: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = digits as i32 - 1 - magnitude;
    if decimals > 0 {
        format!("{:.*}", decimals as usize, value)
    } else {
        let scale = 10f64.powi(-decimals);
        format!("{}", (value / scale).round() * scale)
    }
}

fn find_extrema(
    frame: &Frame,
    config: &PeaksConfig,
    panel: &PanelContext,
    which: Extremum,
) -> Result<Frame, StatError> {
    config.validate()?;
    let xs = frame.float_column("x")?;
    let ys = frame.float_column("y")?;
    let n = ys.len();

    // Strict comparison in the selected direction; NaN neighbors never beat
    // a candidate, NaN candidates never qualify.
    let beats = |candidate: f64, other: f64| match which {
        Extremum::Peaks => candidate > other,
        Extremum::Valleys => candidate < other,
    };

    let (y_min, y_max) = panel.y_range;
    let y_span = y_max - y_min;
    let passes_threshold = |y: f64| {
        let scaled = if y_span > 0.0 {
            (y - y_min) / y_span
        } else {
            0.5
        };
        match which {
            Extremum::Peaks => scaled >= config.ignore_threshold,
            Extremum::Valleys => scaled <= 1.0 - config.ignore_threshold,
        }
    };

    let mut selected = Vec::new();
    for i in 0..n {
        if !ys[i].is_finite() || !passes_threshold(ys[i]) {
            continue;
        }
        let (lo, hi) = match config.span {
            Some(span) => {
                let half = span / 2;
                (i.saturating_sub(half), (i + half + 1).min(n))
            }
            None => (0, n),
        };
        // A candidate must beat at least one finite neighbor; a window of
        // NaNs proves nothing.
        let mut neighbors = (lo..hi).filter(|&j| j != i && ys[j].is_finite()).peekable();
        let is_extremum = neighbors.peek().is_some() && neighbors.all(|j| beats(ys[i], ys[j]));
        if is_extremum {
            selected.push(i);
        }
    }

    let x_labels: Vec<String> = selected
        .iter()
        .map(|&i| format_signif(xs[i], config.digits))
        .collect();
    let y_labels: Vec<String> = selected
        .iter()
        .map(|&i| format_signif(ys[i], config.digits))
        .collect();

    Ok(frame
        .take(&selected)?
        .with_column("x_label", Column::Str(x_labels))?
        .with_column("y_label", Column::Str(y_labels))?)
}

/// Select the rows that are local maxima of `y`.
pub fn find_peaks(
    frame: &Frame,
    config: &PeaksConfig,
    panel: &PanelContext,
) -> Result<Frame, StatError> {
    find_extrema(frame, config, panel, Extremum::Peaks)
}

/// Select the rows that are local minima of `y`.
pub fn find_valleys(
    frame: &Frame,
    config: &PeaksConfig,
    panel: &PanelContext,
) -> Result<Frame, StatError> {
    find_extrema(frame, config, panel, Extremum::Valleys)
}

fn metadata_for(which: Extremum) -> StatMetadata {
    let (id, name, description) = match which {
        Extremum::Peaks => (
            "peaks",
            "Peaks",
            "Select rows that are local maxima of y",
        ),
        Extremum::Valleys => (
            "valleys",
            "Valleys",
            "Select rows that are local minima of y",
        ),
    };
    StatMetadata {
        id: id.to_string(),
        name: name.to_string(),
        family: StatFamily::Filter,
        description: description.to_string(),
        parameters: vec![
            ParameterSpec::int("span", "Window span", 5)
                .with_constraints(ParameterConstraints::range(0.0, 1001.0))
                .with_description("Odd window width >= 3; 0 = global extremum only"),
            ParameterSpec::float("ignore_threshold", "Ignore threshold", 0.0)
                .with_constraints(ParameterConstraints::range(0.0, 1.0))
                .with_description("Relative height cutoff against the panel y range"),
            ParameterSpec::int("digits", "Label digits", 4)
                .with_constraints(ParameterConstraints::range(1.0, 15.0)),
        ],
    }
}

fn config_from_params(params: &StatParams) -> PeaksConfig {
    let span = params.get_int_or("span", 5);
    PeaksConfig {
        span: if span == 0 { None } else { Some(span as usize) },
        ignore_threshold: params.get_float_or("ignore_threshold", 0.0),
        digits: params.get_int_or("digits", 4) as usize,
    }
}

/// Protocol adapter for [`find_peaks`].
pub struct PeaksStat {
    metadata: StatMetadata,
}

impl PeaksStat {
    pub fn new() -> Self {
        Self {
            metadata: metadata_for(Extremum::Peaks),
        }
    }
}

impl Default for PeaksStat {
    fn default() -> Self {
        Self::new()
    }
}

impl StatTransform for PeaksStat {
    fn metadata(&self) -> &StatMetadata {
        &self.metadata
    }

    fn required_columns(&self) -> &[&str] {
        &["x", "y"]
    }

    fn default_aesthetics(&self) -> Vec<AestheticMapping> {
        vec![AestheticMapping::new("x_label", "label")]
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
        find_peaks(frame, &config_from_params(&filled), panel)
    }
}

/// Protocol adapter for [`find_valleys`].
pub struct ValleysStat {
    metadata: StatMetadata,
}

impl ValleysStat {
    pub fn new() -> Self {
        Self {
            metadata: metadata_for(Extremum::Valleys),
        }
    }
}

impl Default for ValleysStat {
    fn default() -> Self {
        Self::new()
    }
}

impl StatTransform for ValleysStat {
    fn metadata(&self) -> &StatMetadata {
        &self.metadata
    }

    fn required_columns(&self) -> &[&str] {
        &["x", "y"]
    }

    fn default_aesthetics(&self) -> Vec<AestheticMapping> {
        vec![AestheticMapping::new("x_label", "label")]
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
        find_valleys(frame, &config_from_params(&filled), panel)
    }
}
