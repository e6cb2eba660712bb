//! Infrastructure layer: configuration loading and input-file parsing.

pub mod config;
pub mod declarations;

pub use config::ConfigLoader;
