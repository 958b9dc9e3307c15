//! Ctrl+C cancellation handling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Result, RotatorError};

static HANDLER_SET: OnceLock<()> = OnceLock::new();

/// Granularity of interruptible sleeps and child polling.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Shared flag flipped when the run should stop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Returns `Interrupted` if the token has been cancelled.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(RotatorError::Interrupted)
        } else {
            Ok(())
        }
    }

    /// Sleeps for `duration`, waking early with `Interrupted` on cancellation.
    pub fn sleep(&self, duration: Duration) -> Result<()> {
        let deadline = Instant::now() + duration;
        loop {
            self.check()?;
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }
}

/// Routes Ctrl+C into `token`. Only the first call installs a handler.
pub fn install_ctrlc_handler(token: CancelToken) -> anyhow::Result<()> {
    if HANDLER_SET.get().is_some() {
        return Ok(());
    }

    ctrlc::set_handler(move || {
        token.cancel();
        log::info!("Cancellation requested (Ctrl+C).");
    })?;

    let _ = HANDLER_SET.set(());
    Ok(())
}
