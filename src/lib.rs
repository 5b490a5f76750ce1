pub mod cache;
pub mod cli;
pub mod config;
pub mod draft;
pub mod error;
pub mod generator;
pub mod i18n;
pub mod llm;
pub mod memory;
pub mod research;
pub mod seo;
pub mod utils;

#[cfg(test)]
mod test_harness;

// Re-export commonly used types
pub use config::Config;
pub use error::{PipelineError, PipelineResult};
pub use generator::pipeline::{PipelineController, PipelineSession, Stage};
