use rand::Rng;

use crate::error::{Result, RotatorError};

/// Branches rotated through when the configuration does not list its own.
pub const DEFAULT_BRANCHES: &[&str] = &[
    "rust",
    "go",
    "python",
    "typescript",
    "kotlin",
    "elixir",
    "main",
];

/// Returns the default branch list as owned strings.
pub fn default_branches() -> Vec<String> {
    DEFAULT_BRANCHES.iter().map(|b| b.to_string()).collect()
}

/// A non-empty, ordered list of branch names to rotate through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchList {
    names: Vec<String>,
}

impl BranchList {
    /// Builds a list, rejecting an empty sequence or blank names.
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(RotatorError::config("branch list is empty"));
        }

        if let Some(pos) = names.iter().position(|n| n.trim().is_empty()) {
            return Err(RotatorError::config(format!(
                "branch name at position {} is blank",
                pos + 1
            )));
        }

        Ok(BranchList { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Never true for a list built through `new`.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Picks one branch uniformly at random.
    ///
    /// `gen_range` samples the bounded range directly, so short lists do not
    /// pick up modulo bias.
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        let index = rng.gen_range(0..self.names.len());
        &self.names[index]
    }
}
