//! Evidence aggregation and verdict scoring for building facts and
//! narrative claims about places.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod scoring;
pub mod text;

pub use config::PipelineConfig;
pub use error::{ProviderError, ProviderResult};
