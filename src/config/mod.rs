//! Configuration module for article scraping
//!
//! Provides the `ScrapeConfig` struct and its fluent builder with validation
//! and sensible defaults.

pub mod builder;
pub mod getters;
pub mod types;

pub use builder::ScrapeConfigBuilder;
pub use types::ScrapeConfig;
