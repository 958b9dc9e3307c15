//! The publish step run after a branch switch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::cancel::CancelToken;
use crate::error::{Result, RotatorError};
use crate::process::{self, ChildGuard};

pub const ENV_BRANCH: &str = "BRANCH_ROTATOR_BRANCH";
pub const ENV_CHECKOUT: &str = "BRANCH_ROTATOR_CHECKOUT";

/// Runs whatever publishes the freshly switched checkout.
pub trait Publish {
    /// Runs the publish step after `branch` was checked out.
    ///
    /// # Returns
    /// * `Ok(code)` - The step exited successfully with `code`
    /// * `Err` - The step could not be launched or exited non-zero
    fn publish(&self, branch: &str) -> Result<i32>;
}

/// Publishes by running an external executable with no arguments.
pub struct ScriptPublisher {
    command: String,
    workdir: PathBuf,
    cancel: CancelToken,
}

impl ScriptPublisher {
    pub fn new(command: impl Into<String>, workdir: impl AsRef<Path>) -> Self {
        ScriptPublisher {
            command: command.into(),
            workdir: workdir.as_ref().to_path_buf(),
            cancel: CancelToken::new(),
        }
    }

    /// Lets a cancellation stop a running publish step.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Path that will be executed.
    ///
    /// A relative path containing a separator is taken relative to the
    /// checkout. A bare name is left for the OS to look up in `PATH`.
    pub fn program(&self) -> PathBuf {
        let command = Path::new(&self.command);
        if command.is_relative() && command.components().count() > 1 {
            self.workdir.join(command)
        } else {
            command.to_path_buf()
        }
    }

    /// Environment handed to the publish step.
    pub fn env_vars(&self, branch: &str) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert(ENV_BRANCH.to_string(), branch.to_string());
        env.insert(
            ENV_CHECKOUT.to_string(),
            self.workdir.to_string_lossy().into_owned(),
        );
        env
    }
}

impl Publish for ScriptPublisher {
    fn publish(&self, branch: &str) -> Result<i32> {
        let program = self.program();
        log::info!("running publish step {}", program.display());

        let mut cmd = Command::new(&program);
        cmd.current_dir(&self.workdir).envs(self.env_vars(branch));

        let mut guard = ChildGuard::spawn(&self.command, &mut cmd)?;
        let status = guard.wait(&self.cancel)?;

        if !status.success() {
            return Err(RotatorError::publish(
                &self.command,
                process::describe(status),
                process::exit_code(status),
            ));
        }

        Ok(status.code().unwrap_or(0))
    }
}

/// Publisher double that records when it ran.
#[derive(Debug, Clone, Default)]
pub struct MockPublisher {
    invocations: Arc<Mutex<Vec<(String, Instant)>>>,
    exit_code: i32,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every invocation exit with `code`
    pub fn exiting_with(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Branch and instant of every invocation, in order
    pub fn invocations(&self) -> Vec<(String, Instant)> {
        self.invocations
            .lock()
            .expect("mock publisher log poisoned")
            .clone()
    }
}

impl Publish for MockPublisher {
    fn publish(&self, branch: &str) -> Result<i32> {
        self.invocations
            .lock()
            .expect("mock publisher log poisoned")
            .push((branch.to_string(), Instant::now()));

        if self.exit_code != 0 {
            return Err(RotatorError::publish(
                "mock",
                format!("exited with status {}", self.exit_code),
                Some(self.exit_code),
            ));
        }
        Ok(0)
    }
}
