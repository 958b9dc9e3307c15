//! Branch switching over a checkout
//!
//! The [Checkout] trait is the seam the rotator switches branches through.
//! Implementations:
//!
//! - [cli::GitCli]: spawns the git client (`git checkout <branch>`)
//! - [repository::Git2Repository]: checks out in-process with the `git2` crate,
//!   and answers the read-only questions preflight asks
//! - [mock::MockCheckout]: records calls for tests

pub mod cli;
pub mod mock;
pub mod repository;

pub use cli::GitCli;
pub use mock::MockCheckout;
pub use repository::Git2Repository;

use std::path::Path;

use crate::cancel::CancelToken;
use crate::config::{GitBackend, GitConfig};
use crate::error::Result;

/// Switches a checkout to a named branch.
pub trait Checkout {
    /// Updates the working tree and HEAD to `branch`.
    ///
    /// # Returns
    /// * `Ok(())` - The checkout now reflects `branch`
    /// * `Err` - The branch is missing, the path is not a repository, or
    ///   local changes conflict with the switch
    fn switch_branch(&self, branch: &str) -> Result<()>;
}

/// Builds the backend selected in `config` for the checkout at `workdir`.
pub fn backend_for(config: &GitConfig, workdir: &Path, cancel: &CancelToken) -> Box<dyn Checkout> {
    match config.backend {
        GitBackend::Cli => {
            Box::new(GitCli::new(config.program.as_str(), workdir).with_cancel(cancel.clone()))
        }
        GitBackend::Libgit2 => Box::new(Git2Repository::new(workdir)),
    }
}
