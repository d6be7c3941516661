//! Charge pump / routing pin synchronizer
//!
//! The `MICSUPP` pin on the sound card's routing graph has to mirror the
//! charge pump: forced on while the pump runs regulated, disabled when it is
//! off or bypassed. The update touches the routing graph, which may need a
//! card-wide lock, so it never runs inside a control operation. Control
//! operations only [`schedule`](ChargePumpSync::schedule) a pass; the worker
//! future ([`ChargePumpSync::run`]) performs it later.
//!
//! ```text
//! enable/disable/set_bypass ──► schedule() ──► Signal ──► run(): pass()
//!                                                           │
//!                 read MIC_CHARGE_PUMP_1 ◄──────────────────┤
//!                 force/disable MICSUPP (under card lock?) ◄┤
//!                 synchronize()                            ◄┘
//! ```
//!
//! Requests coalesce: any number of schedules before the worker wakes
//! produce one pass, and that pass reads the register fresh.
//!
//! # Lifecycle
//!
//! The worker borrows the synchronizer, so it cannot outlive the instance
//! that owns it. [`shutdown`](ChargePumpSync::shutdown) stops it: a pass
//! that is already pending when shutdown starts is still carried out, and
//! no pass runs after shutdown returns.
//!
//! Dropping the worker future (a lost `select`, a cancelled task) puts the
//! synchronizer back to idle with any pending pass kept, so another worker
//! can pick it up. If a shutdown was already waiting, it completes instead.
//! Any number of callers may await `shutdown` at once.

use core::cell::RefCell;

use codec_platform::{AudioRouting, RegisterMap};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use crate::desc::ROUTING_PIN;
use crate::registers::{CPMIC_BYPASS, CPMIC_ENA, MIC_CHARGE_PUMP_1};

/// Routing pin state last applied by the synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinState {
    /// Charge pump enabled and regulating: pin forced on
    ForcedOn,
    /// Charge pump off or bypassed: pin disabled
    Disabled,
}

impl PinState {
    /// Pin state implied by a MIC_CHARGE_PUMP_1 value.
    #[must_use]
    pub const fn from_status(status: u32) -> Self {
        if status & (CPMIC_ENA | CPMIC_BYPASS) == CPMIC_ENA {
            Self::ForcedOn
        } else {
            Self::Disabled
        }
    }
}

/// Synchronizer counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncStats {
    /// Schedule requests
    pub scheduled: u32,
    /// Passes that read the charge pump state
    pub completed: u32,
    /// Passes that failed to read the state or update the graph
    pub failed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Worker {
    Idle,
    Running,
    Stopped,
}

struct Binding<'a, G> {
    graph: &'a G,
    explicit_lock: bool,
}

impl<G> Clone for Binding<'_, G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G> Copy for Binding<'_, G> {}

/// Releases the worker slot however `run` ends.
struct WorkerGuard<'s, 'a, M: RawMutex, G> {
    sync: &'s ChargePumpSync<'a, M, G>,
}

impl<M: RawMutex, G> Drop for WorkerGuard<'_, '_, M, G> {
    fn drop(&mut self) {
        let stopped = self.sync.state.lock(|cell| {
            let mut s = cell.borrow_mut();
            if s.stop {
                s.worker = Worker::Stopped;
                s.pending = false;
                true
            } else {
                s.worker = Worker::Idle;
                false
            }
        });
        if stopped {
            debug!("Charge pump worker stopped");
        } else {
            warn!("Charge pump worker dropped before shutdown");
        }
        self.sync.done.signal(());
    }
}

struct State<'a, G> {
    pending: bool,
    stop: bool,
    worker: Worker,
    routing: Option<Binding<'a, G>>,
    pin: Option<PinState>,
    stats: SyncStats,
}

/// Deferred charge pump to routing pin synchronizer.
pub struct ChargePumpSync<'a, M: RawMutex, G> {
    state: Mutex<M, RefCell<State<'a, G>>>,
    wake: Signal<M, ()>,
    done: Signal<M, ()>,
}

impl<'a, M: RawMutex, G: AudioRouting> ChargePumpSync<'a, M, G> {
    /// Idle synchronizer with no routing graph bound.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(State {
                pending: false,
                stop: false,
                worker: Worker::Idle,
                routing: None,
                pin: None,
                stats: SyncStats {
                    scheduled: 0,
                    completed: 0,
                    failed: 0,
                },
            })),
            wake: Signal::new(),
            done: Signal::new(),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut State<'a, G>) -> T) -> T {
        self.state.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Request a pass. Never blocks and never touches the routing graph.
    ///
    /// Ignored once the synchronizer has been shut down.
    pub fn schedule(&self) {
        let accepted = self.with_state(|s| {
            if s.worker == Worker::Stopped || s.stop {
                return false;
            }
            s.pending = true;
            s.stats.scheduled = s.stats.scheduled.saturating_add(1);
            true
        });
        if accepted {
            self.wake.signal(());
        }
    }

    /// Bind the routing graph. The graph's locking convention is read once,
    /// here.
    pub fn bind(&self, graph: &'a G) {
        let explicit_lock = graph.requires_explicit_lock();
        debug!("Routing graph bound, explicit lock: {}", explicit_lock);
        self.with_state(|s| {
            s.routing = Some(Binding { graph, explicit_lock });
        });
    }

    /// Drop the routing graph binding. Later passes only read the register.
    pub fn unbind(&self) {
        self.with_state(|s| s.routing = None);
    }

    /// Whether a routing graph is bound.
    pub fn is_bound(&self) -> bool {
        self.with_state(|s| s.routing.is_some())
    }

    /// Pin state applied by the last successful pass.
    pub fn pin_state(&self) -> Option<PinState> {
        self.with_state(|s| s.pin)
    }

    /// Counter snapshot.
    pub fn stats(&self) -> SyncStats {
        self.with_state(|s| s.stats)
    }

    /// Whether a pass is waiting for the worker.
    pub fn is_pending(&self) -> bool {
        self.with_state(|s| s.pending)
    }

    /// Worker loop. Returns once [`shutdown`](Self::shutdown) is called.
    ///
    /// Only one worker may run per synchronizer; a second concurrent call
    /// returns immediately, as does a call after shutdown.
    pub async fn run<R: RegisterMap + ?Sized>(&self, regmap: &R) {
        let start = self.with_state(|s| match s.worker {
            Worker::Idle => {
                s.worker = Worker::Running;
                true
            }
            Worker::Running => {
                warn!("Charge pump worker already running");
                false
            }
            Worker::Stopped => false,
        });
        if !start {
            return;
        }
        self.done.reset();
        let _guard = WorkerGuard { sync: self };
        debug!("Charge pump worker started");

        // A pass left pending by a dropped worker is taken up before waiting
        loop {
            let (pending, stop) = self.with_state(|s| (core::mem::take(&mut s.pending), s.stop));
            if pending {
                self.pass(regmap);
            }
            if stop {
                break;
            }
            self.wake.wait().await;
        }
    }

    /// Stop the worker, waiting for it to drain a pending pass.
    ///
    /// If no worker is running, a pending pass is discarded. Concurrent
    /// callers all return once the worker has stopped.
    pub async fn shutdown(&self) {
        let wait = self.with_state(|s| {
            s.stop = true;
            match s.worker {
                Worker::Running => true,
                Worker::Idle | Worker::Stopped => {
                    s.worker = Worker::Stopped;
                    s.pending = false;
                    false
                }
            }
        });
        if !wait {
            return;
        }
        self.wake.signal(());
        while self.with_state(|s| s.worker != Worker::Stopped) {
            self.done.wait().await;
        }
        // `done` holds one waiter; pass the wakeup on to other shutdowns
        self.done.signal(());
    }

    /// One synchronization pass.
    ///
    /// Reads the charge pump state, and with a routing graph bound, forces or
    /// disables `MICSUPP` accordingly and resynchronizes the graph. A failed
    /// read leaves the pin untouched.
    fn pass<R: RegisterMap + ?Sized>(&self, regmap: &R) {
        let status = match regmap.read(MIC_CHARGE_PUMP_1) {
            Ok(v) => v,
            Err(_) => {
                error!("Failed to read CP state");
                self.with_state(|s| s.stats.failed = s.stats.failed.saturating_add(1));
                return;
            }
        };

        let Some(binding) = self.with_state(|s| s.routing) else {
            self.with_state(|s| s.stats.completed = s.stats.completed.saturating_add(1));
            return;
        };

        let target = PinState::from_status(status);
        let apply = |graph: &G| match target {
            PinState::ForcedOn => graph.force_pin_enabled(ROUTING_PIN),
            PinState::Disabled => graph.disable_pin(ROUTING_PIN),
        };
        let applied = if binding.explicit_lock {
            binding.graph.with_lock(apply)
        } else {
            apply(binding.graph)
        };
        let applied = applied.is_ok();
        if !applied {
            warn!("Failed to update {} pin", ROUTING_PIN);
        }

        if binding.graph.synchronize().is_err() {
            warn!("Failed to sync routing graph");
        }

        self.with_state(|s| {
            if applied {
                s.pin = Some(target);
                s.stats.completed = s.stats.completed.saturating_add(1);
            } else {
                s.stats.failed = s.stats.failed.saturating_add(1);
            }
        });
    }
}

impl<M: RawMutex, G: AudioRouting> Default for ChargePumpSync<'_, M, G> {
    fn default() -> Self {
        Self::new()
    }
}
