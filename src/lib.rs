pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod extractor;
pub mod git;
pub mod http;
pub mod rewriter;
pub mod synth;
pub mod telemetry;
pub mod tracker;
pub mod ui;

pub use error::{GitStoryError, Result};
