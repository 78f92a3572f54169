//! Rollup views over shared-bicycle usage datasets.
//!
//! A daily and an hourly rental dataset are loaded into immutable
//! [`store::RecordStore`]s, restricted to a date range by [`filter`], and
//! reduced by the [`aggregators`] into derived tables for presentation.

pub mod aggregators;
pub mod config;
pub mod error;
pub mod filter;
pub mod output;
pub mod pipeline;
pub mod records;
pub mod store;

pub use error::{Result, RollupError};
pub use pipeline::{PipelineContext, RollupSettings, Rollups};
