//! The rotation workflow: pick a branch, switch to it, settle, publish.
//!
//! A run is strictly sequential and all-or-nothing. The first failing step
//! aborts the run and its error carries the failing tool's exit status.
//! Nothing is retried.
//!
//! Two rotators working on the same checkout at once will race on it; running
//! more than one instance at a time is unsupported.

use std::env;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rand::Rng;

use crate::branches::BranchList;
use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::{Result, RotatorError};
use crate::git::{self, Checkout};
use crate::publish::{Publish, ScriptPublisher};
use crate::ui;

/// Outcome of a successful rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationReport {
    /// The branch that was checked out and published
    pub branch: String,

    /// Time actually spent between the switch and the publish step
    pub settle: Duration,

    /// Exit code of the publish step
    pub publish_code: i32,
}

pub struct Rotator {
    branches: BranchList,
    workdir: PathBuf,
    settle_delay: Duration,
    checkout: Box<dyn Checkout>,
    publisher: Box<dyn Publish>,
    cancel: CancelToken,
}

impl Rotator {
    pub fn new(
        branches: BranchList,
        workdir: impl AsRef<Path>,
        checkout: Box<dyn Checkout>,
        publisher: Box<dyn Publish>,
    ) -> Self {
        Rotator {
            branches,
            workdir: workdir.as_ref().to_path_buf(),
            settle_delay: Duration::from_millis(crate::config::DEFAULT_SETTLE_DELAY_MS),
            checkout,
            publisher,
            cancel: CancelToken::new(),
        }
    }

    /// Builds the rotator described by `config`.
    ///
    /// Fails with a configuration error before anything touches the disk.
    pub fn from_config(config: &Config, cancel: CancelToken) -> Result<Self> {
        config.validate()?;
        let branches = config.branch_list()?;
        let workdir = config.resolved_checkout_path()?;

        let checkout = git::backend_for(&config.git, &workdir, &cancel);
        let publisher =
            ScriptPublisher::new(config.publish.command.as_str(), &workdir).with_cancel(cancel.clone());

        Ok(Rotator::new(branches, workdir, checkout, Box::new(publisher))
            .with_settle_delay(config.settle_delay())
            .with_cancel(cancel))
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn branches(&self) -> &BranchList {
        &self.branches
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Runs one rotation with the thread-local RNG.
    pub fn run(&self) -> Result<RotationReport> {
        self.run_with_rng(&mut rand::thread_rng())
    }

    /// Runs one rotation, drawing the branch from `rng`.
    pub fn run_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RotationReport> {
        ui::display_status("Branch rotation started");

        let branch = self.branches.select(rng).to_string();
        log::debug!(
            "selected '{}' out of {} branches",
            branch,
            self.branches.len()
        );

        self.cancel.check()?;
        env::set_current_dir(&self.workdir).map_err(|source| RotatorError::Workdir {
            path: self.workdir.clone(),
            source,
        })?;

        ui::display_status(&format!("Switching to branch: {}", branch));
        self.checkout.switch_branch(&branch)?;
        let switched_at = Instant::now();

        self.cancel.sleep(self.settle_delay)?;
        let settle = switched_at.elapsed();

        let publish_code = self.publisher.publish(&branch)?;
        log::info!("published '{}' after settling {:?}", branch, settle);

        Ok(RotationReport {
            branch,
            settle,
            publish_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockCheckout;
    use crate::publish::MockPublisher;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serial_test::serial;
    use tempfile::TempDir;

    /// Restores the process working directory when dropped.
    struct CwdGuard(PathBuf);

    impl CwdGuard {
        fn new() -> Self {
            CwdGuard(env::current_dir().unwrap())
        }
    }

    impl Drop for CwdGuard {
        fn drop(&mut self) {
            let _ = env::set_current_dir(&self.0);
        }
    }

    fn list(names: &[&str]) -> BranchList {
        BranchList::new(names.iter().map(|n| n.to_string()).collect()).unwrap()
    }

    fn rotator(
        names: &[&str],
        workdir: &Path,
        checkout: &MockCheckout,
        publisher: &MockPublisher,
    ) -> Rotator {
        Rotator::new(
            list(names),
            workdir,
            Box::new(checkout.clone()),
            Box::new(publisher.clone()),
        )
    }

    #[test]
    #[serial]
    fn test_successful_rotation() {
        let dir = TempDir::new().unwrap();
        let _cwd = CwdGuard::new();
        let checkout = MockCheckout::with_branches(["rust", "go", "main"]);
        let publisher = MockPublisher::new();

        let report = rotator(&["rust", "go", "main"], dir.path(), &checkout, &publisher)
            .run_with_rng(&mut StdRng::seed_from_u64(1))
            .unwrap();

        assert!(["rust", "go", "main"].contains(&report.branch.as_str()));
        assert_eq!(report.publish_code, 0);

        let calls = checkout.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].branch, report.branch);
        assert_eq!(publisher.invocations().len(), 1);
        assert_eq!(publisher.invocations()[0].0, report.branch);

        assert_eq!(
            env::current_dir().unwrap().canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    #[serial]
    fn test_settle_delay_elapses_before_publish() {
        let dir = TempDir::new().unwrap();
        let _cwd = CwdGuard::new();
        let checkout = MockCheckout::with_branches(["main"]);
        let publisher = MockPublisher::new();
        let delay = Duration::from_millis(120);

        let report = rotator(&["main"], dir.path(), &checkout, &publisher)
            .with_settle_delay(delay)
            .run()
            .unwrap();

        let switched = checkout.calls()[0].at;
        let published = publisher.invocations()[0].1;
        assert!(published.duration_since(switched) >= delay);
        assert!(report.settle >= delay);
    }

    #[test]
    #[serial]
    fn test_missing_branch_never_publishes() {
        let dir = TempDir::new().unwrap();
        let _cwd = CwdGuard::new();
        let checkout = MockCheckout::with_branches(["main"]);
        let publisher = MockPublisher::new();

        let err = rotator(&["cobol"], dir.path(), &checkout, &publisher)
            .run()
            .unwrap_err();

        assert!(matches!(err, RotatorError::Switch { .. }));
        assert_eq!(checkout.calls().len(), 1);
        assert!(publisher.invocations().is_empty());
    }

    #[test]
    #[serial]
    fn test_missing_checkout_dir_skips_switch_and_publish() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        let _cwd = CwdGuard::new();
        let checkout = MockCheckout::with_branches(["main"]);
        let publisher = MockPublisher::new();

        let err = rotator(&["main"], &missing, &checkout, &publisher)
            .run()
            .unwrap_err();

        assert!(matches!(err, RotatorError::Workdir { .. }));
        assert!(checkout.calls().is_empty());
        assert!(publisher.invocations().is_empty());
    }

    #[test]
    #[serial]
    fn test_publish_failure_is_surfaced() {
        let dir = TempDir::new().unwrap();
        let _cwd = CwdGuard::new();
        let checkout = MockCheckout::with_branches(["main"]);
        let publisher = MockPublisher::new().exiting_with(9);

        let err = rotator(&["main"], dir.path(), &checkout, &publisher)
            .with_settle_delay(Duration::ZERO)
            .run()
            .unwrap_err();

        assert_eq!(err.exit_code(), 9);
        assert_eq!(publisher.invocations().len(), 1);
    }

    #[test]
    #[serial]
    fn test_cancelled_run_does_nothing_after_selection() {
        let dir = TempDir::new().unwrap();
        let _cwd = CwdGuard::new();
        let checkout = MockCheckout::with_branches(["main"]);
        let publisher = MockPublisher::new();
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = rotator(&["main"], dir.path(), &checkout, &publisher)
            .with_cancel(cancel)
            .run()
            .unwrap_err();

        assert!(matches!(err, RotatorError::Interrupted));
        assert!(checkout.calls().is_empty());
        assert!(publisher.invocations().is_empty());
    }

    #[test]
    fn test_from_config_rejects_empty_branch_list() {
        let config = Config::from_toml("checkout_path = \"/srv\"\nbranches = []").unwrap();
        let err = Rotator::from_config(&config, CancelToken::new()).err().unwrap();
        assert!(matches!(err, RotatorError::Config(_)));
    }

    #[test]
    #[serial]
    fn test_from_config_makes_workdir_absolute() {
        let config = Config::from_toml("checkout_path = \"site\"").unwrap();
        let rotator = Rotator::from_config(&config, CancelToken::new()).unwrap();
        assert!(rotator.workdir().is_absolute());
        assert!(rotator.workdir().ends_with("site"));
        assert_eq!(rotator.branches().len(), crate::branches::DEFAULT_BRANCHES.len());
    }
}
