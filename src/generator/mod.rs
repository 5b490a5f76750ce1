pub mod context;
pub mod outlet;
pub mod parse;
pub mod pipeline;
pub mod stage_generator;
pub mod stages;
pub mod types;
