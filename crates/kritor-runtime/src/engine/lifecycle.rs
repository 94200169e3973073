//! Joining execution units at shutdown.

use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// A named long-running task owned by the engine.
pub(crate) struct Unit {
    pub(crate) name: String,
    pub(crate) handle: JoinHandle<()>,
}

impl Unit {
    pub(crate) fn spawn<F>(name: impl Into<String>, future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            name: name.into(),
            handle: tokio::spawn(future),
        }
    }
}

/// What happened to each execution unit during `stop`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Units that exited within their join timeout.
    pub stopped: Vec<String>,
    /// Units still running when their join timeout elapsed.
    pub timed_out: Vec<String>,
}

impl ShutdownReport {
    /// Returns `true` if every unit exited in time.
    pub fn is_clean(&self) -> bool {
        self.timed_out.is_empty()
    }
}

/// Waits for every unit, each bounded by its own `timeout`.
///
/// A unit that outlives its timeout is left running and reported; it is
/// not aborted.
pub(crate) async fn join_units(units: Vec<Unit>, timeout: Duration) -> ShutdownReport {
    let joins = units.into_iter().map(|mut unit| async move {
        match tokio::time::timeout(timeout, &mut unit.handle).await {
            Ok(Ok(())) => {
                debug!(unit = %unit.name, "Execution unit stopped");
                (unit.name, true)
            }
            Ok(Err(e)) => {
                error!(unit = %unit.name, error = %e, "Execution unit terminated abnormally");
                (unit.name, true)
            }
            Err(_) => {
                warn!(
                    unit = %unit.name,
                    timeout_ms = timeout.as_millis() as u64,
                    "Execution unit did not stop within its join timeout"
                );
                (unit.name, false)
            }
        }
    });

    let mut report = ShutdownReport::default();
    for (name, joined) in join_all(joins).await {
        if joined {
            report.stopped.push(name);
        } else {
            report.timed_out.push(name);
        }
    }
    report
}
