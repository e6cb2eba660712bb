//! Domain layer: pure data models and the harness error taxonomy.

pub mod error;
pub mod models;

pub use error::{AnalysisError, ConfigError};
