//! 向导流水线：阶段状态机与会话编排

pub mod controller;
pub mod session;
pub mod stage;

pub use controller::{
    CANDIDATE_SCOPE, DraftEdit, GenerationApplied, GenerationTicket, PipelineController,
};
pub use session::PipelineSession;
pub use stage::{GenerationTarget, Stage, check_entry, check_exit, furthest_reachable};

#[cfg(test)]
mod tests;
