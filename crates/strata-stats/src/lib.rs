//! strata-stats - Statistical transform adapters
//!
//! Each adapter takes a read-only observation table plus validated
//! parameters and returns a freshly built derived table for the host
//! plotting framework to render:
//!
//! - [`quadrant`]: partition points around an origin, one count row per quadrant
//! - [`apply`]: replace `x`/`y` columns with a caller-supplied transform's output
//! - [`dens2d`]: score points by 2D kernel density, keep or flag a target fraction
//! - [`peaks`]: locate local maxima/minima with windowed extremum detection
//! - [`fit`]: per-group least-squares polynomial fit summaries
//!
//! All adapters are synchronous pure functions with no state across
//! invocations. Each can be driven two ways: a typed config API, or the
//! [`StatTransform`](strata_core::StatTransform) protocol via [`registry`].

pub mod apply;
pub mod dens2d;
pub mod dist;
pub mod fit;
pub mod peaks;
pub mod quadrant;

pub use apply::{apply_transform, ApplyConfig, ApplyScope, TransformFn};
pub use dens2d::{density_filter, density_label, Dens2dConfig, Dens2dFilter, Dens2dLabel};
pub use fit::{fit_summary, FitConfig, FitSummary};
pub use peaks::{find_peaks, find_valleys, Extremum, PeaksConfig, PeaksStat, ValleysStat};
pub use quadrant::{
    quadrant_counts, Pooling, QuadrantConfig, QuadrantCounts, QuadrantSelection,
};

use strata_core::StatRegistry;

/// Build a registry holding every built-in adapter.
///
/// The function-application adapter is absent: it carries caller-supplied
/// closures and is constructed directly via [`apply::ApplyConfig`].
pub fn registry() -> StatRegistry {
    let mut registry = StatRegistry::new();
    registry.register(Box::new(quadrant::QuadrantCounts::new()));
    registry.register(Box::new(dens2d::Dens2dFilter::new()));
    registry.register(Box::new(dens2d::Dens2dLabel::new()));
    registry.register(Box::new(peaks::PeaksStat::new()));
    registry.register(Box::new(peaks::ValleysStat::new()));
    registry.register(Box::new(fit::FitSummary::new()));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::StatFamily;

    #[test]
    fn test_registry_builtins() {
        let registry = registry();
        assert_eq!(registry.len(), 6);
        assert!(registry.get("quadrant-counts").is_some());
        assert!(registry.get("dens2d-filter").is_some());
        assert!(registry.get("peaks").is_some());
    }

    #[test]
    fn test_registry_families() {
        let registry = registry();
        let filters = registry.list_by_family(StatFamily::Filter);
        assert_eq!(filters.len(), 4);
        let summaries = registry.list_by_family(StatFamily::Summary);
        assert_eq!(summaries.len(), 2);
    }

    #[test]
    fn test_registry_search() {
        let registry = registry();
        assert!(!registry.search("quadrant").is_empty());
        assert!(!registry.search("DENSITY").is_empty());
    }
}
