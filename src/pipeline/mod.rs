//! Proposal assembly — the background orchestration that turns a confirmed
//! session into delivered documents.

mod proposal;

pub use proposal::{PipelineConfig, ProposalPipeline};
