//! Real Git repository implementation using the git2 crate

use std::path::{Path, PathBuf};

use git2::{build::CheckoutBuilder, BranchType, ErrorCode, Repository, StatusOptions};

use crate::error::{Result, RotatorError};
use crate::git::Checkout;

/// Remote consulted when a branch only exists as a remote-tracking ref.
const DEFAULT_REMOTE: &str = "origin";

/// Checkout backed by libgit2.
///
/// The repository is opened per call so that a checkout path created after
/// construction is still picked up.
pub struct Git2Repository {
    path: PathBuf,
}

impl Git2Repository {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Git2Repository {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn open(&self) -> Result<Repository> {
        Ok(Repository::open(&self.path)?)
    }

    /// Returns true if `path` is the root of a git working tree.
    pub fn is_repository(&self) -> bool {
        self.open().is_ok()
    }

    /// Returns true if `branch` exists locally or on `origin`.
    pub fn branch_exists(&self, branch: &str) -> Result<bool> {
        let repo = self.open()?;
        if repo.find_branch(branch, BranchType::Local).is_ok() {
            return Ok(true);
        }
        let remote_name = format!("{}/{}", DEFAULT_REMOTE, branch);
        let found = repo.find_branch(&remote_name, BranchType::Remote).is_ok();
        Ok(found)
    }

    /// Name of the branch HEAD points at, or `None` when detached or unborn.
    pub fn current_branch(&self) -> Result<Option<String>> {
        let repo = self.open()?;
        let head = match repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if !head.is_branch() {
            return Ok(None);
        }
        Ok(head.shorthand().map(|s| s.to_string()))
    }

    /// Returns true if tracked files have uncommitted modifications.
    ///
    /// Untracked files are ignored; they do not block a branch switch unless
    /// the target branch tracks the same path.
    pub fn is_dirty(&self) -> Result<bool> {
        let repo = self.open()?;
        let mut options = StatusOptions::new();
        options.include_untracked(false).include_ignored(false);
        let statuses = repo.statuses(Some(&mut options))?;
        Ok(!statuses.is_empty())
    }

    /// Creates a local branch from `origin/<branch>` with upstream tracking.
    fn create_tracking_branch<'r>(
        &self,
        repo: &'r Repository,
        branch: &str,
    ) -> Result<git2::Branch<'r>> {
        let remote_name = format!("{}/{}", DEFAULT_REMOTE, branch);
        let remote = repo
            .find_branch(&remote_name, BranchType::Remote)
            .map_err(|_| {
                RotatorError::switch(
                    branch,
                    format!("no branch named '{}' in {}", branch, self.path.display()),
                    None,
                )
            })?;

        let commit = remote.get().peel_to_commit()?;
        let mut local = repo.branch(branch, &commit, false)?;
        if let Err(e) = local.set_upstream(Some(&remote_name)) {
            log::warn!("could not set upstream of '{}': {}", branch, e.message());
        }
        log::info!("created local branch '{}' tracking '{}'", branch, remote_name);
        Ok(local)
    }
}

impl Checkout for Git2Repository {
    fn switch_branch(&self, branch: &str) -> Result<()> {
        let repo = self.open()?;

        let local = match repo.find_branch(branch, BranchType::Local) {
            Ok(local) => local,
            Err(_) => self.create_tracking_branch(&repo, branch)?,
        };

        let refname = local
            .get()
            .name()
            .ok_or_else(|| RotatorError::switch(branch, "branch name is not valid UTF-8", None))?
            .to_string();
        let commit = local.get().peel_to_commit()?;

        // Safe mode refuses to overwrite local modifications.
        let mut checkout = CheckoutBuilder::new();
        checkout.safe();
        repo.checkout_tree(commit.as_object(), Some(&mut checkout))
            .map_err(|e| RotatorError::switch(branch, e.message().to_string(), None))?;
        repo.set_head(&refname)?;

        log::info!("checked out '{}' at {}", branch, commit.id());
        Ok(())
    }
}
