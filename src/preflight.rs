use std::fmt;
use std::path::{Path, PathBuf};

use crate::git::Git2Repository;
use crate::publish::ScriptPublisher;

/// Problems likely to make a rotation fail, found without changing anything.
/// These are non-fatal; the switch and publish steps still decide the outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum PreflightWarning {
    /// The checkout directory does not exist
    CheckoutMissing { path: PathBuf },
    /// The checkout exists but is not a git working tree
    NotARepository { path: PathBuf },
    /// Neither a local nor an `origin` branch has this name
    BranchMissing { branch: String },
    /// Tracked files have local modifications
    DirtyWorktree { path: PathBuf },
    /// HEAD already points at the selected branch
    AlreadyOnBranch { branch: String },
    /// The publish executable is not where it will be looked for
    PublishCommandMissing { program: PathBuf },
}

impl fmt::Display for PreflightWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreflightWarning::CheckoutMissing { path } => {
                write!(f, "Checkout directory '{}' does not exist", path.display())
            }
            PreflightWarning::NotARepository { path } => {
                write!(f, "'{}' is not a git repository", path.display())
            }
            PreflightWarning::BranchMissing { branch } => {
                write!(f, "Branch '{}' does not exist locally or on origin", branch)
            }
            PreflightWarning::DirtyWorktree { path } => {
                write!(
                    f,
                    "Checkout '{}' has uncommitted changes that may block the switch",
                    path.display()
                )
            }
            PreflightWarning::AlreadyOnBranch { branch } => {
                write!(f, "Checkout is already on branch '{}'", branch)
            }
            PreflightWarning::PublishCommandMissing { program } => {
                write!(f, "Publish command '{}' not found", program.display())
            }
        }
    }
}

/// Inspects `workdir` for the switch to `branch` and the publish that follows.
pub fn check(workdir: &Path, branch: &str, publisher: &ScriptPublisher) -> Vec<PreflightWarning> {
    let mut warnings = Vec::new();

    if !workdir.is_dir() {
        warnings.push(PreflightWarning::CheckoutMissing {
            path: workdir.to_path_buf(),
        });
        return warnings;
    }

    let repo = Git2Repository::new(workdir);
    if !repo.is_repository() {
        warnings.push(PreflightWarning::NotARepository {
            path: workdir.to_path_buf(),
        });
    } else {
        if !repo.branch_exists(branch).unwrap_or(false) {
            warnings.push(PreflightWarning::BranchMissing {
                branch: branch.to_string(),
            });
        }

        if repo.is_dirty().unwrap_or(false) {
            warnings.push(PreflightWarning::DirtyWorktree {
                path: workdir.to_path_buf(),
            });
        }

        if let Ok(Some(current)) = repo.current_branch() {
            if current == branch {
                warnings.push(PreflightWarning::AlreadyOnBranch {
                    branch: branch.to_string(),
                });
            }
        }
    }

    // Bare names are resolved through PATH at spawn time, so only paths are checked.
    let program = publisher.program();
    if program.components().count() > 1 && !program.is_file() {
        warnings.push(PreflightWarning::PublishCommandMissing { program });
    }

    warnings
}
