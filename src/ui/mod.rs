//! User interface module.
//!
//! The hook runs non-interactively inside `git push`, so there are no prompts;
//! `formatter` holds all console output.

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_boundary_warning, display_change_set, display_draft, display_error,
    display_pipeline_success, display_repush_instruction, display_skip, display_status,
    display_success,
};
