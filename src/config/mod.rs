//! Configuration: job parameters, runtime settings, LLM wiring.

pub mod builder;
pub mod types;

pub use builder::JobConfigBuilder;
pub use types::{JobConfig, LinkFilter, LlmConfig, LlmProvider, Settings};
