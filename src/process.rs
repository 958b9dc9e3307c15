//! Child process supervision shared by the git and publish steps.

use std::process::{Child, Command, ExitStatus};
use std::thread;

use crate::cancel::{CancelToken, POLL_INTERVAL};
use crate::error::{Result, RotatorError};

/// Owns a spawned child until it has been reaped.
///
/// Dropping a guard whose child is still running kills and waits it, so an
/// early return or a panic never leaves an orphan behind.
pub struct ChildGuard {
    program: String,
    child: Option<Child>,
}

impl ChildGuard {
    /// Spawns `cmd`, labelling errors with `program`.
    pub fn spawn(program: impl Into<String>, cmd: &mut Command) -> Result<Self> {
        let program = program.into();
        let child = cmd.spawn().map_err(|source| RotatorError::Spawn {
            program: program.clone(),
            source,
        })?;
        log::debug!("spawned '{}' (pid {})", program, child.id());

        Ok(ChildGuard {
            program,
            child: Some(child),
        })
    }

    /// Waits for the child to exit.
    ///
    /// If `cancel` fires first the child is killed and reaped and
    /// `Interrupted` is returned.
    pub fn wait(&mut self, cancel: &CancelToken) -> Result<ExitStatus> {
        let Some(child) = self.child.as_mut() else {
            return Err(RotatorError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("'{}' was already reaped", self.program),
            )));
        };

        loop {
            if let Some(status) = child.try_wait()? {
                self.child = None;
                log::debug!("'{}' exited with {}", self.program, status);
                return Ok(status);
            }

            if cancel.is_cancelled() {
                log::info!("stopping '{}' after cancellation", self.program);
                self.reap();
                return Err(RotatorError::Interrupted);
            }

            thread::sleep(POLL_INTERVAL);
        }
    }

    fn reap(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.reap();
    }
}

/// Exit code of a finished child.
///
/// On Unix a child killed by a signal reports `128 + signal`, the same
/// convention shells use.
pub fn exit_code(status: ExitStatus) -> Option<i32> {
    if let Some(code) = status.code() {
        return Some(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Some(128 + signal);
        }
    }

    None
}

/// Human readable description of a non-successful status.
pub fn describe(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exited with status {}", code),
        None => match exit_code(status) {
            Some(code) => format!("terminated by signal {}", code - 128),
            None => "terminated abnormally".to_string(),
        },
    }
}
