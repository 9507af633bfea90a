//! Waiting between download attempts, and operator interrupts.
//!
//! SIGINT is listened for once per process through [`Interrupts::listen`].
//! An interrupt that arrives while a cool-down is running only wakes that
//! cool-down; any other interrupt aborts the run.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Pause inserted before a retry.
#[async_trait]
pub trait CoolDown: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// What an operator interrupt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptOutcome {
    /// A running cool-down was cut short.
    WokeCoolDown,
    /// No cool-down was running; the run must stop.
    Abort,
}

/// Shared interrupt state between the signal listener, cool-downs and the
/// run loop.
#[derive(Debug, Default)]
pub struct Interrupts {
    wake: Notify,
    abort: Notify,
    cooling: AtomicUsize,
    aborted: AtomicBool,
}

impl Interrupts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers one operator interrupt.
    pub fn interrupt(&self) -> InterruptOutcome {
        if self.cooling.load(Ordering::SeqCst) > 0 {
            self.wake.notify_waiters();
            return InterruptOutcome::WokeCoolDown;
        }
        self.aborted.store(true, Ordering::SeqCst);
        self.abort.notify_waiters();
        InterruptOutcome::Abort
    }

    #[must_use]
    pub fn is_cooling(&self) -> bool {
        self.cooling.load(Ordering::SeqCst) > 0
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Resolves once an interrupt has aborted the run.
    pub async fn aborted(&self) {
        loop {
            let notified = self.abort.notified();
            if self.is_aborted() {
                return;
            }
            notified.await;
        }
    }

    /// Installs the process SIGINT handler and forwards every signal to
    /// [`Interrupts::interrupt`]. The listener stops after an abort.
    ///
    /// # Errors
    ///
    /// Returns the error from registering the signal handler.
    pub fn listen(self: &Arc<Self>) -> io::Result<JoinHandle<()>> {
        forward_sigint(Arc::clone(self))
    }

    fn on_signal(&self) -> InterruptOutcome {
        let outcome = self.interrupt();
        match outcome {
            InterruptOutcome::WokeCoolDown => info!("interrupt received during cool-down"),
            InterruptOutcome::Abort => warn!("interrupt received; aborting the run"),
        }
        outcome
    }

    fn begin_cool_down(&self) -> CoolingGuard<'_> {
        self.cooling.fetch_add(1, Ordering::SeqCst);
        CoolingGuard(&self.cooling)
    }
}

#[cfg(unix)]
fn forward_sigint(interrupts: Arc<Interrupts>) -> io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{SignalKind, signal};

    // Registered before spawning so no signal slips through before the task
    // is first polled.
    let mut sigint = signal(SignalKind::interrupt())?;
    Ok(tokio::spawn(async move {
        while sigint.recv().await.is_some() {
            if interrupts.on_signal() == InterruptOutcome::Abort {
                return;
            }
        }
    }))
}

#[cfg(not(unix))]
fn forward_sigint(interrupts: Arc<Interrupts>) -> io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if interrupts.on_signal() == InterruptOutcome::Abort {
                return;
            }
        }
    }))
}

struct CoolingGuard<'a>(&'a AtomicUsize);

impl Drop for CoolingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Sleeps for the full duration unless an interrupt wakes it first.
#[derive(Debug, Clone, Default)]
pub struct InterruptibleSleep {
    interrupts: Arc<Interrupts>,
}

impl InterruptibleSleep {
    #[must_use]
    pub fn new(interrupts: Arc<Interrupts>) -> Self {
        Self { interrupts }
    }
}

#[async_trait]
impl CoolDown for InterruptibleSleep {
    async fn wait(&self, duration: Duration) {
        // Registered before the cool-down becomes visible to `interrupt`.
        let woken = self.interrupts.wake.notified();
        let _cooling = self.interrupts.begin_cool_down();
        tokio::select! {
            () = tokio::time::sleep(duration) => {}
            () = woken => warn!(
                cool_down_secs = duration.as_secs(),
                "cool-down interrupted; retrying now"
            ),
        }
    }
}
