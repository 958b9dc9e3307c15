pub mod branches;
pub mod cancel;
pub mod config;
pub mod error;
pub mod git;
pub mod preflight;
pub mod process;
pub mod publish;
pub mod rotator;
pub mod ui;

pub use error::{Result, RotatorError};
pub use rotator::{RotationReport, Rotator};
