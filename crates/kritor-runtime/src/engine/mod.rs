//! The dispatch engine and its lifecycle.
//!
//! An [`Engine`] owns a set of execution units and moves through
//! [`EngineState`]. What the units are depends on the [`Topology`]:
//!
//! - **Passive**: one unit per [`Category`], each subscribing to the remote
//!   event service and dispatching what it pulls.
//! - **Active**: one unit serving a push endpoint; the collaborator's worker
//!   pool bounds how many pushed streams are handled at once.
//!
//! Within a unit, events are handled one at a time in delivery order. Units
//! run concurrently, so a slow handler only throttles its own category.

mod active;
mod lifecycle;
mod passive;
mod pipeline;
mod state;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use kritor_core::Category;
use kritor_framework::{Dispatcher, HandlerRegistry};
use kritor_protocol::{EventService, PushServer};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use lifecycle::ShutdownReport;
pub use state::EngineState;

use crate::config::{EngineConfig, Mode};
use crate::error::{RuntimeError, RuntimeResult};
use lifecycle::{Unit, join_units};

/// Timing knobs for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Per-unit bound on how long `stop` waits.
    pub join_timeout: Duration,
    /// Pause before re-opening a terminated subscription (passive only).
    pub resubscribe_delay: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for EngineOptions {
    fn from(config: &EngineConfig) -> Self {
        Self {
            join_timeout: config.join_timeout(),
            resubscribe_delay: config.resubscribe_delay(),
        }
    }
}

/// Where events come from.
#[derive(Clone)]
pub enum Topology {
    /// A remote peer pushes events into a server we expose.
    Active {
        server: Arc<dyn PushServer>,
        addr: String,
        max_workers: usize,
    },
    /// We subscribe to the remote peer's event service.
    Passive {
        events: Arc<dyn EventService>,
        endpoint: String,
    },
}

impl Topology {
    pub fn mode(&self) -> Mode {
        match self {
            Self::Active { .. } => Mode::Active,
            Self::Passive { .. } => Mode::Passive,
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active {
                addr, max_workers, ..
            } => write!(
                f,
                "active mode, listening on {addr} with {max_workers} workers"
            ),
            Self::Passive { endpoint, .. } => {
                write!(f, "passive mode, subscribing to {endpoint}")
            }
        }
    }
}

impl fmt::Debug for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Topology({self})")
    }
}

#[derive(Default)]
struct Inner {
    state: EngineState,
    token: Option<CancellationToken>,
    units: Vec<Unit>,
}

/// Dispatch engine.
pub struct Engine {
    topology: Topology,
    dispatcher: Dispatcher,
    options: EngineOptions,
    inner: Mutex<Inner>,
}

impl Engine {
    pub fn new(topology: Topology, registry: Arc<HandlerRegistry>, options: EngineOptions) -> Self {
        Self {
            topology,
            dispatcher: Dispatcher::new(registry),
            options,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn state(&self) -> EngineState {
        self.inner.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == EngineState::Running
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Spawns the execution units.
    ///
    /// Fails with [`RuntimeError::AlreadyRunning`] unless the engine is
    /// stopped.
    pub async fn start(&self) -> RuntimeResult<()> {
        let mut inner = self.inner.lock();
        if inner.state != EngineState::Stopped {
            warn!(state = %inner.state, "Engine start requested while not stopped");
            return Err(RuntimeError::AlreadyRunning);
        }
        inner.state = EngineState::Starting;

        let token = CancellationToken::new();
        let units = self.spawn_units(&token);
        info!(units = units.len(), "Engine started: {}", self.topology);

        inner.token = Some(token);
        inner.units = units;
        inner.state = EngineState::Running;
        Ok(())
    }

    /// Cancels every unit and waits for each, bounded by the join timeout.
    ///
    /// A no-op on an engine that is not running.
    pub async fn stop(&self) -> ShutdownReport {
        let (token, units) = {
            let mut inner = self.inner.lock();
            if inner.state != EngineState::Running {
                debug!(state = %inner.state, "Engine stop requested while not running");
                return ShutdownReport::default();
            }
            inner.state = EngineState::Stopping;
            (inner.token.take(), std::mem::take(&mut inner.units))
        };

        info!(units = units.len(), "Stopping engine");
        if let Some(token) = token {
            token.cancel();
        }

        let report = join_units(units, self.options.join_timeout).await;
        self.inner.lock().state = EngineState::Stopped;

        if report.is_clean() {
            info!(stopped = report.stopped.len(), "Engine stopped");
        } else {
            warn!(
                stopped = report.stopped.len(),
                timed_out = ?report.timed_out,
                "Engine stopped with units still running"
            );
        }
        report
    }

    fn spawn_units(&self, token: &CancellationToken) -> Vec<Unit> {
        match &self.topology {
            Topology::Passive { events, .. } => Category::ALL
                .iter()
                .map(|&category| {
                    Unit::spawn(
                        format!("subscription:{category}"),
                        passive::run_subscription(
                            category,
                            events.clone(),
                            self.dispatcher.clone(),
                            token.clone(),
                            self.options.resubscribe_delay,
                        ),
                    )
                })
                .collect(),
            Topology::Active {
                server,
                addr,
                max_workers,
            } => vec![Unit::spawn(
                "push-server",
                active::run_server(
                    server.clone(),
                    addr.clone(),
                    *max_workers,
                    self.dispatcher.clone(),
                    token.clone(),
                ),
            )],
        }
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("topology", &self.topology)
            .field("state", &self.state())
            .field("options", &self.options)
            .finish()
    }
}
