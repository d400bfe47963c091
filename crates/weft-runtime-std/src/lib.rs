//! Standard scheduling services backed by Rust's `std` library.
//!
//! This crate provides concrete implementations of the platform
//! abstraction traits defined in `weft-core`. Hosts construct a
//! [`StdIdleScheduler`] plus an [`IdleLoop`] and use them to drive a
//! [`weft_core::Renderer`] with wall-clock time slices.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use weft_core::{IdleDeadline, IdleScheduler, Renderer, Surface, SurfaceError, WorkStatus};

/// One wall-clock time slice measured from construction.
pub struct SliceDeadline {
    start: Instant,
    budget: Duration,
}

impl SliceDeadline {
    pub fn new(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }
}

impl IdleDeadline for SliceDeadline {
    fn time_remaining(&self) -> Duration {
        self.budget.saturating_sub(self.start.elapsed())
    }
}

/// Idle scheduler that records requests in an atomic flag and notifies an
/// optional waker, so an external event loop can sleep until render work
/// arrives.
pub struct StdIdleScheduler {
    idle_requested: AtomicBool,
    waker: RwLock<Option<Arc<dyn Fn() + Send + Sync + 'static>>>,
}

impl StdIdleScheduler {
    pub fn new() -> Self {
        Self {
            idle_requested: AtomicBool::new(false),
            waker: RwLock::new(None),
        }
    }

    /// Returns whether an idle turn has been requested since the last call.
    pub fn take_idle_request(&self) -> bool {
        self.idle_requested.swap(false, Ordering::SeqCst)
    }

    /// Registers a waker invoked whenever a new idle turn is requested.
    pub fn set_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        *self.waker.write().unwrap() = Some(Arc::new(waker));
    }

    /// Clears any registered waker.
    pub fn clear_waker(&self) {
        *self.waker.write().unwrap() = None;
    }

    fn wake(&self) {
        let waker = self.waker.read().unwrap().clone();
        if let Some(waker) = waker {
            waker();
        }
    }
}

impl Default for StdIdleScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdIdleScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdIdleScheduler")
            .field(
                "idle_requested",
                &self.idle_requested.load(Ordering::SeqCst),
            )
            .finish()
    }
}

impl IdleScheduler for StdIdleScheduler {
    fn request_idle(&self) {
        self.idle_requested.store(true, Ordering::SeqCst);
        self.wake();
    }
}

/// Turn driver granting a fixed wall-clock budget per turn.
pub struct IdleLoop {
    scheduler: Rc<StdIdleScheduler>,
    budget: Duration,
}

impl IdleLoop {
    /// Default slice budget, roughly what browser idle callbacks grant.
    pub const DEFAULT_BUDGET: Duration = Duration::from_millis(4);

    pub fn new(budget: Duration) -> Self {
        Self {
            scheduler: Rc::new(StdIdleScheduler::new()),
            budget,
        }
    }

    pub fn scheduler(&self) -> Rc<StdIdleScheduler> {
        Rc::clone(&self.scheduler)
    }

    /// Grants the renderer one time slice.
    pub fn turn<S: Surface>(&self, renderer: &mut Renderer<S>) -> Result<WorkStatus, SurfaceError> {
        self.scheduler.take_idle_request();
        renderer.work(&SliceDeadline::new(self.budget))
    }

    /// Grants slices until the renderer reports nothing left to do.
    pub fn run_until_idle<S: Surface>(
        &self,
        renderer: &mut Renderer<S>,
    ) -> Result<(), SurfaceError> {
        while renderer.has_pending_work() {
            self.turn(renderer)?;
        }
        self.scheduler.take_idle_request();
        Ok(())
    }
}

impl Default for IdleLoop {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BUDGET)
    }
}
