//! Asynchronous reaping of background children.
//!
//! A [`Reaper`] owns a thread running a single-threaded tokio runtime that listens
//! for `SIGCHLD`. Background children are moved into it over a channel, after which
//! the interpreter never touches them again. Each time a notification or a new child
//! arrives, every adopted child is polled once with a non-blocking wait and the
//! terminated ones are dropped.
//!
//! `SIGCHLD` delivery coalesces: several children may exit while only one
//! notification is observed. The exhaustive pass makes that harmless. Because the
//! reaper only waits on children it owns, it never consumes the exit status of a
//! foreground child that the interpreter is waiting for.

use crate::error::ShellError;
use std::io;
use std::process::Child;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::thread;
use tokio::signal::unix::{Signal, SignalKind, signal};
use tokio::sync::mpsc;

#[derive(Debug, Default)]
struct ReapStats {
    adopted: AtomicUsize,
    reaped: AtomicUsize,
}

/// Handle to a running reaper thread. Cloning shares the same thread.
#[derive(Debug, Clone)]
pub struct Reaper {
    handoff: mpsc::UnboundedSender<Child>,
    stats: Arc<ReapStats>,
}

impl Reaper {
    /// Starts a new reaper thread with its own `SIGCHLD` subscription.
    ///
    /// Most callers want [`Reaper::global`] instead.
    pub fn install() -> Result<Self, ShellError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ShellError::SignalRegistrationFailed)?;
        let notifications = {
            let _guard = runtime.enter();
            signal(SignalKind::child()).map_err(ShellError::SignalRegistrationFailed)?
        };

        let (handoff, adoptions) = mpsc::unbounded_channel();
        let stats = Arc::new(ReapStats::default());
        let worker_stats = Arc::clone(&stats);
        thread::Builder::new()
            .name("reaper".into())
            .spawn(move || runtime.block_on(reap_loop(notifications, adoptions, worker_stats)))
            .map_err(ShellError::SignalRegistrationFailed)?;

        tracing::debug!("child reaper installed");
        Ok(Self { handoff, stats })
    }

    /// The process-wide reaper, installed on first use.
    ///
    /// Later calls return the same instance and never register a second
    /// `SIGCHLD` listener.
    pub fn global() -> Result<&'static Reaper, ShellError> {
        static REAPER: OnceLock<Reaper> = OnceLock::new();
        static INSTALL: Mutex<()> = Mutex::new(());

        if let Some(reaper) = REAPER.get() {
            return Ok(reaper);
        }
        let _guard = INSTALL.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(reaper) = REAPER.get() {
            return Ok(reaper);
        }
        let reaper = Reaper::install()?;
        Ok(REAPER.get_or_init(|| reaper))
    }

    /// Transfers ownership of a background child to the reaper.
    pub fn adopt(&self, child: Child) -> Result<(), ShellError> {
        self.stats.adopted.fetch_add(1, Ordering::SeqCst);
        self.handoff.send(child).map_err(|_| {
            self.stats.adopted.fetch_sub(1, Ordering::SeqCst);
            ShellError::SignalRegistrationFailed(io::Error::other("reaper thread has stopped"))
        })
    }

    /// Number of children handed over so far.
    pub fn adopted(&self) -> usize {
        self.stats.adopted.load(Ordering::SeqCst)
    }

    /// Number of adopted children whose exit status has been collected.
    pub fn reaped(&self) -> usize {
        self.stats.reaped.load(Ordering::SeqCst)
    }

    /// Adopted children that are still running or not yet collected.
    pub fn outstanding(&self) -> usize {
        self.adopted().saturating_sub(self.reaped())
    }

    /// Test helper: polls until every adopted child has been reaped or `timeout`
    /// elapses. Returns `true` when nothing is outstanding.
    #[cfg(test)]
    pub(crate) fn settle(&self, timeout: std::time::Duration) -> bool {
        use std::time::{Duration, Instant};

        let deadline = Instant::now() + timeout;
        while self.outstanding() > 0 {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
        true
    }
}

async fn reap_loop(
    mut notifications: Signal,
    mut adoptions: mpsc::UnboundedReceiver<Child>,
    stats: Arc<ReapStats>,
) {
    let mut children: Vec<Child> = Vec::new();
    let mut open = true;

    loop {
        tokio::select! {
            adopted = adoptions.recv(), if open => match adopted {
                Some(child) => children.push(child),
                None => open = false,
            },
            notified = notifications.recv() => {
                if notified.is_none() {
                    break;
                }
            }
        }

        drain(&mut children, &stats);

        if !open && children.is_empty() {
            break;
        }
    }
    tracing::debug!(remaining = children.len(), "child reaper stopped");
}

/// Collects every terminated child without blocking.
fn drain(children: &mut Vec<Child>, stats: &ReapStats) {
    children.retain_mut(|child| match child.try_wait() {
        Ok(Some(status)) => {
            stats.reaped.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(pid = child.id(), status = %status, "reaped background child");
            false
        }
        Ok(None) => true,
        Err(e) => {
            tracing::warn!(pid = child.id(), error = %e, "dropping unwaitable background child");
            false
        }
    });
}
