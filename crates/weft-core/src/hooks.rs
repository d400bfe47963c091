//! The hook store: per-fiber ordered records addressed purely by call
//! order. State records persist values across renders through shared
//! cells; effect records gate side effects on dependency changes.
//!
//! Components must make the same hook calls in the same order on every
//! render. That discipline is documented, not enforced; a slot whose
//! record kind or value type changes between renders panics with a
//! diagnostic instead of silently corrupting a neighbouring slot.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::renderer::RenderHandle;

/// Teardown closure returned by an effect body, invoked before the effect
/// re-runs with changed dependencies.
pub type Cleanup = Box<dyn FnOnce()>;

#[derive(Clone)]
pub(crate) enum Hook {
    State(Rc<dyn Any>),
    Effect(EffectRecord),
}

#[derive(Clone)]
pub(crate) struct EffectRecord {
    deps: Rc<dyn Any>,
    deps_eq: fn(&dyn Any, &dyn Any) -> bool,
    /// Shared between generations when the effect is skipped, so a
    /// discarded work-in-progress pass can never strand a pending cleanup.
    cleanup: Rc<RefCell<Option<Cleanup>>>,
}

enum StateUpdate<T> {
    Replace(T),
    Apply(Box<dyn Fn(&T) -> T>),
}

/// Storage slot behind one `use_state` call site: the value captured at
/// render time plus the queue of updates enqueued since. The queue is read
/// without draining during re-render; updates are only dropped when the
/// generation that owns them is retired, which keeps a discarded
/// work-in-progress pass from losing them.
pub(crate) struct StateCell<T> {
    value: T,
    pending: RefCell<Vec<StateUpdate<T>>>,
}

/// Write half of a state hook. Cloneable and `'static`, so it can move
/// into event handlers; setting a value enqueues the update and requests a
/// fresh render pass from the renderer that issued it.
pub struct StateSetter<T> {
    cell: Rc<StateCell<T>>,
    handle: RenderHandle,
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
            handle: self.handle.clone(),
        }
    }
}

impl<T: 'static> StateSetter<T> {
    /// Enqueues a direct replacement value.
    pub fn set(&self, value: T) {
        self.cell
            .pending
            .borrow_mut()
            .push(StateUpdate::Replace(value));
        self.handle.request_render();
    }

    /// Enqueues an updater applied to the value preceding it in the queue.
    pub fn update(&self, f: impl Fn(&T) -> T + 'static) {
        self.cell
            .pending
            .borrow_mut()
            .push(StateUpdate::Apply(Box::new(f)));
        self.handle.request_render();
    }
}

/// Hook context handed to a component for the duration of one invocation.
/// The cursor starts at zero and advances once per hook call; the previous
/// generation's records are read by the same index.
pub struct Hooks<'a> {
    prev: &'a [Hook],
    next: &'a mut Vec<Hook>,
    cursor: usize,
    handle: &'a RenderHandle,
}

impl<'a> Hooks<'a> {
    pub(crate) fn new(prev: &'a [Hook], next: &'a mut Vec<Hook>, handle: &'a RenderHandle) -> Self {
        Self {
            prev,
            next,
            cursor: 0,
            handle,
        }
    }

    /// A persistent state slot. `init` is evaluated only on the first
    /// render of this call site. Updates queued since the previous render
    /// are folded in enqueue order before the current value is returned.
    pub fn use_state<T: Clone + 'static>(
        &mut self,
        init: impl FnOnce() -> T,
    ) -> (T, StateSetter<T>) {
        let slot = self.cursor;
        let state = match self.prev.get(slot) {
            Some(Hook::State(cell)) => {
                let cell = Rc::clone(cell)
                    .downcast::<StateCell<T>>()
                    .unwrap_or_else(|_| {
                        panic!("state hook at slot {slot} changed value type between renders")
                    });
                let mut value = cell.value.clone();
                for update in cell.pending.borrow().iter() {
                    value = match update {
                        StateUpdate::Replace(next) => next.clone(),
                        StateUpdate::Apply(f) => f(&value),
                    };
                }
                value
            }
            Some(Hook::Effect(_)) => {
                panic!("hook at slot {slot} changed kind between renders (effect -> state)")
            }
            None => init(),
        };

        let cell = Rc::new(StateCell {
            value: state.clone(),
            pending: RefCell::new(Vec::new()),
        });
        self.next.push(Hook::State(cell.clone()));
        self.cursor += 1;

        let setter = StateSetter {
            cell,
            handle: self.handle.clone(),
        };
        (state, setter)
    }

    /// A lifecycle effect gated on `deps`. When `deps` compares equal to
    /// the previous render's value the record carries over untouched and
    /// `body` does not run; otherwise any pending cleanup from the previous
    /// record runs first, then `body`, whose returned cleanup is stored for
    /// the next comparison. Runs synchronously inside the hook call.
    pub fn use_effect<D: PartialEq + 'static>(
        &mut self,
        deps: D,
        body: impl FnOnce() -> Option<Cleanup>,
    ) {
        let slot = self.cursor;
        let prev = match self.prev.get(slot) {
            Some(Hook::Effect(record)) => Some(record),
            Some(Hook::State(_)) => {
                panic!("hook at slot {slot} changed kind between renders (state -> effect)")
            }
            None => None,
        };

        let skip = prev
            .map(|record| (record.deps_eq)(record.deps.as_ref(), &deps))
            .unwrap_or(false);

        let record = if skip {
            prev.cloned().unwrap_or_else(|| unreachable!())
        } else {
            if let Some(record) = prev {
                if let Some(cleanup) = record.cleanup.borrow_mut().take() {
                    cleanup();
                }
            }
            EffectRecord {
                deps: Rc::new(deps),
                deps_eq: deps_eq::<D>,
                cleanup: Rc::new(RefCell::new(body())),
            }
        };

        self.next.push(Hook::Effect(record));
        self.cursor += 1;
    }
}

fn deps_eq<D: PartialEq + 'static>(old: &dyn Any, new: &dyn Any) -> bool {
    match (old.downcast_ref::<D>(), new.downcast_ref::<D>()) {
        (Some(old), Some(new)) => old == new,
        _ => false,
    }
}
