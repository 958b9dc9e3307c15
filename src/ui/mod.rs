//! User interface module - human readable status output.
//!
//! The rotator never prompts; everything here writes to stdout or stderr.
//! Formatting lives in `formatter` so it can be tested without a terminal.

pub mod formatter;

pub use formatter::{
    display_available_branches, display_error, display_preflight_warning, display_status,
    display_success,
};
