//! strata-core - Core types for strata plot-grammar extensions
//!
//! This crate provides the shared machinery the stat adapters build on:
//!
//! - [`Frame`]: a columnar observation table with grouping support
//! - [`Npc`]: normalized plot-area coordinates and anchor tokens
//! - [`PanelContext`]: the active panel's data ranges
//! - [`StatTransform`]: the protocol every stat adapter implements
//! - [`StatRegistry`]: runtime lookup of registered adapters
//!
//! # Design Philosophy
//!
//! Every adapter is a pure function of its inputs: it receives a read-only
//! view of an observation table plus validated parameters, and returns a
//! freshly built derived table. There is no shared mutable state and no
//! cross-invocation lifecycle, so adapters compose trivially across panels
//! and groups.

pub mod error;
pub mod frame;
pub mod npc;
pub mod panel;
pub mod stat;

pub use error::FrameError;
pub use frame::{Column, DataType, Frame};
pub use npc::{Axis, Npc, NpcError, NpcValue};
pub use panel::{PanelContext, PanelError};
pub use stat::params::{
    ParameterConstraints, ParameterSpec, ParameterType, ParameterValue, StatParams,
};
pub use stat::registry::StatRegistry;
pub use stat::{AestheticMapping, StatError, StatFamily, StatMetadata, StatTransform};
