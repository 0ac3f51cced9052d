pub mod orchestration;

pub use orchestration::{Outcome, Pipeline, PipelineReport, DEFAULT_REMOTE};
