use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for branch-rotator operations
#[derive(Error, Debug)]
pub enum RotatorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Cannot enter checkout directory {}: {source}", .path.display())]
    Workdir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Branch switch to '{branch}' failed: {reason}")]
    Switch {
        branch: String,
        reason: String,
        code: Option<i32>,
    },

    #[error("Publish step '{command}' failed: {reason}")]
    Publish {
        command: String,
        reason: String,
        code: Option<i32>,
    },

    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Interrupted before the rotation completed")]
    Interrupted,

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in branch-rotator
pub type Result<T> = std::result::Result<T, RotatorError>;

impl RotatorError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        RotatorError::Config(msg.into())
    }

    /// Create a branch switch error
    pub fn switch(branch: impl Into<String>, reason: impl Into<String>, code: Option<i32>) -> Self {
        RotatorError::Switch {
            branch: branch.into(),
            reason: reason.into(),
            code,
        }
    }

    /// Create a publish error
    pub fn publish(command: impl Into<String>, reason: impl Into<String>, code: Option<i32>) -> Self {
        RotatorError::Publish {
            command: command.into(),
            reason: reason.into(),
            code,
        }
    }

    /// Process exit status to report for this error.
    ///
    /// Failures of external steps surface the status of the tool that failed;
    /// everything else maps to a fixed code.
    pub fn exit_code(&self) -> i32 {
        match self {
            RotatorError::Config(_) | RotatorError::ConfigParse(_) => 2,
            RotatorError::Switch { code, .. } | RotatorError::Publish { code, .. } => {
                code.filter(|c| *c != 0).unwrap_or(1)
            }
            RotatorError::Spawn { .. } => 127,
            RotatorError::Interrupted => 130,
            RotatorError::Workdir { .. } | RotatorError::Git(_) | RotatorError::Io(_) => 1,
        }
    }
}
