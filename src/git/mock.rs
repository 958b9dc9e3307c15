use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::error::{Result, RotatorError};
use crate::git::Checkout;

/// A recorded call to [MockCheckout::switch_branch].
#[derive(Debug, Clone)]
pub struct SwitchCall {
    pub branch: String,
    pub at: Instant,
}

/// Mock checkout for testing without touching a repository.
///
/// Clones share their call log, so a test can hand one clone to the rotator
/// and inspect the other afterwards.
#[derive(Debug, Clone, Default)]
pub struct MockCheckout {
    branches: Arc<Mutex<HashSet<String>>>,
    calls: Arc<Mutex<Vec<SwitchCall>>>,
    exit_code: Option<i32>,
}

impl MockCheckout {
    /// Create a mock that knows the given branches
    pub fn with_branches<I, S>(branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mock = MockCheckout::default();
        mock.branches
            .lock()
            .expect("mock branch set poisoned")
            .extend(branches.into_iter().map(Into::into));
        mock
    }

    /// Make every switch fail as git does, with the given exit code
    pub fn failing_with(mut self, exit_code: i32) -> Self {
        self.exit_code = Some(exit_code);
        self
    }

    /// Every switch attempted so far, in order
    pub fn calls(&self) -> Vec<SwitchCall> {
        self.calls.lock().expect("mock call log poisoned").clone()
    }
}

impl Checkout for MockCheckout {
    fn switch_branch(&self, branch: &str) -> Result<()> {
        self.calls
            .lock()
            .expect("mock call log poisoned")
            .push(SwitchCall {
                branch: branch.to_string(),
                at: Instant::now(),
            });

        if let Some(code) = self.exit_code {
            return Err(RotatorError::switch(
                branch,
                format!("mock git exited with status {}", code),
                Some(code),
            ));
        }

        let known = self
            .branches
            .lock()
            .expect("mock branch set poisoned")
            .contains(branch);
        if !known {
            return Err(RotatorError::switch(
                branch,
                format!("pathspec '{}' did not match any file(s) known to git", branch),
                Some(1),
            ));
        }

        Ok(())
    }
}
