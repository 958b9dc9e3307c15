use std::path::{Path, PathBuf};
use std::process::Command;

use crate::cancel::CancelToken;
use crate::error::{Result, RotatorError};
use crate::git::Checkout;
use crate::process::{self, ChildGuard};

/// Switches branches by running the git client.
///
/// git's own output is passed through to the terminal, so its diagnostics
/// reach the user unchanged.
pub struct GitCli {
    program: String,
    workdir: PathBuf,
    cancel: CancelToken,
}

impl GitCli {
    pub fn new(program: impl Into<String>, workdir: impl AsRef<Path>) -> Self {
        GitCli {
            program: program.into(),
            workdir: workdir.as_ref().to_path_buf(),
            cancel: CancelToken::new(),
        }
    }

    /// Lets a cancellation stop a running git process.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// `--` pins `branch` to a revision; without it a name matching a tracked
    /// path would restore that file instead of switching.
    fn command(&self, branch: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(&self.workdir)
            .arg("checkout")
            .arg(branch)
            .arg("--");
        cmd
    }
}

impl Checkout for GitCli {
    fn switch_branch(&self, branch: &str) -> Result<()> {
        log::info!(
            "running {} checkout {} in {}",
            self.program,
            branch,
            self.workdir.display()
        );

        let mut guard = ChildGuard::spawn(&self.program, &mut self.command(branch))?;
        let status = guard.wait(&self.cancel)?;

        if !status.success() {
            return Err(RotatorError::switch(
                branch,
                format!("{} {}", self.program, process::describe(status)),
                process::exit_code(status),
            ));
        }

        Ok(())
    }
}
