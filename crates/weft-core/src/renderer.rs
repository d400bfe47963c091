//! The work scheduler: owns the fiber arena, the surface, and the
//! in-flight render state, and drives reconciliation one fiber at a time
//! across cooperative time slices.
//!
//! All mutable scheduling state (next unit of work, pending root, current
//! root, deletion list) lives behind `&mut self`, so re-entrant rendering
//! is unrepresentable; the only cross-cutting cell is the shared
//! render-request flag that state setters flip from event handlers.

use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::commit;
use crate::fiber::{Fiber, FiberArena, FiberId, FiberKind};
use crate::hooks::Hooks;
use crate::platform::{IdleDeadline, IdleScheduler};
use crate::reconcile;
use crate::surface::{Surface, SurfaceError, SurfaceId};
use crate::{Element, Props};

/// Slack below which the work loop yields back to the host.
const YIELD_SLACK: Duration = Duration::from_millis(1);

/// Outcome of one scheduling turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkStatus {
    /// Everything reconciled and committed; nothing left to do.
    Idle,
    /// The time slice ran out with work remaining; another turn was
    /// requested from the idle scheduler.
    Pending,
}

struct SharedInner {
    render_requested: Cell<bool>,
    scheduler: Rc<dyn IdleScheduler>,
}

/// Weak handle to the renderer's shared state, captured by state setters.
/// Requesting a render marks the flag and pings the host scheduler; the
/// renderer consumes the flag at unit-of-work granularity.
#[derive(Clone)]
pub struct RenderHandle(Weak<SharedInner>);

impl RenderHandle {
    pub(crate) fn request_render(&self) {
        if let Some(inner) = self.0.upgrade() {
            inner.render_requested.set(true);
            inner.scheduler.request_idle();
        }
    }
}

/// The reconciler runtime for one container. Generic over the surface it
/// mutates; tests and demos run it against [`MemorySurface`](crate::MemorySurface).
pub struct Renderer<S: Surface> {
    surface: S,
    arena: FiberArena,
    shared: Rc<SharedInner>,
    next_unit: Option<FiberId>,
    wip_root: Option<FiberId>,
    current_root: Option<FiberId>,
    deletions: Vec<FiberId>,
}

impl<S: Surface> Renderer<S> {
    pub fn new(surface: S, scheduler: Rc<dyn IdleScheduler>) -> Self {
        Self {
            surface,
            arena: FiberArena::new(),
            shared: Rc::new(SharedInner {
                render_requested: Cell::new(false),
                scheduler,
            }),
            next_unit: None,
            wip_root: None,
            current_root: None,
            deletions: Vec::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn handle(&self) -> RenderHandle {
        RenderHandle(Rc::downgrade(&self.shared))
    }

    /// Whether a turn of [`work`](Self::work) would do anything.
    pub fn has_pending_work(&self) -> bool {
        self.next_unit.is_some()
            || self.wip_root.is_some()
            || self.shared.render_requested.get()
    }

    /// Begins a full-tree reconciliation of `element` against `container`.
    /// The first call installs the tree; subsequent calls diff against the
    /// committed one. Any in-flight pass is discarded.
    pub fn render(&mut self, element: Element, container: SurfaceId) {
        self.discard_wip();
        let props = Props::new().child(element);
        let root = self
            .arena
            .alloc(Fiber::root(Some(container), props, self.current_root));
        self.wip_root = Some(root);
        self.next_unit = Some(root);
        log::debug!("render pass scheduled against container {container}");
        self.shared.scheduler.request_idle();
    }

    /// Runs reconciliation until the deadline runs dry or the tree is
    /// done, committing in the latter case. Commit is never split across
    /// turns. A surface error aborts the pass partway and leaves the
    /// renderer in an unspecified state; there is no retry path.
    pub fn work(&mut self, deadline: &dyn IdleDeadline) -> Result<WorkStatus, SurfaceError> {
        loop {
            if self.shared.render_requested.replace(false) {
                self.begin_state_render();
            }
            let Some(unit) = self.next_unit else {
                break;
            };
            if deadline.time_remaining() < YIELD_SLACK {
                self.shared.scheduler.request_idle();
                return Ok(WorkStatus::Pending);
            }
            self.next_unit = self.perform_unit(unit)?;
        }

        if let Some(root) = self.wip_root {
            commit::commit_pass(&mut self.surface, &self.arena, &self.deletions, root)?;
            log::debug!(
                "committed render pass ({} deletions)",
                self.deletions.len()
            );
            self.current_root = Some(root);
            self.wip_root = None;
            self.retire_previous_generation(root);
        }
        Ok(WorkStatus::Idle)
    }

    /// Processes one fiber and returns the next one to visit: its child if
    /// it has one, otherwise the nearest ancestor's unvisited sibling.
    fn perform_unit(&mut self, id: FiberId) -> Result<Option<FiberId>, SurfaceError> {
        match self.arena.get(id).kind {
            FiberKind::Component(_) => self.update_component(id),
            FiberKind::Root | FiberKind::Host(_) | FiberKind::Text => self.update_host(id)?,
        }

        if let Some(child) = self.arena.get(id).child {
            return Ok(Some(child));
        }
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let fiber = self.arena.get(current);
            if let Some(sibling) = fiber.sibling {
                return Ok(Some(sibling));
            }
            cursor = fiber.parent;
        }
        Ok(None)
    }

    /// Invokes the component with a fresh hook cursor and reconciles its
    /// returned descriptor as the sole child. The alternate's hook records
    /// are read through cheap clones, never consumed, so discarding this
    /// pass cannot lose queued state updates.
    fn update_component(&mut self, id: FiberId) {
        let (f, props, prev_hooks) = {
            let fiber = self.arena.get(id);
            let f = match fiber.kind {
                FiberKind::Component(f) => f,
                _ => unreachable!("update_component on a host fiber"),
            };
            let prev_hooks = fiber
                .alternate
                .map(|alt| self.arena.get(alt).hooks.clone())
                .unwrap_or_default();
            (f, fiber.props.clone(), prev_hooks)
        };

        let handle = self.handle();
        let mut next_hooks = Vec::new();
        let child = {
            let mut hooks = Hooks::new(&prev_hooks, &mut next_hooks, &handle);
            f(&mut hooks, &props)
        };
        self.arena.get_mut(id).hooks = next_hooks;

        reconcile::reconcile_children(&mut self.arena, id, vec![child], &mut self.deletions);
    }

    /// Ensures the fiber owns a surface node (creating it and applying the
    /// full initial props on first visit), then reconciles its stored
    /// children.
    fn update_host(&mut self, id: FiberId) -> Result<(), SurfaceError> {
        if self.arena.get(id).surface.is_none() {
            let handle = match &self.arena.get(id).kind {
                FiberKind::Host(tag) => {
                    let tag = tag.clone();
                    self.surface.create_element(&tag)
                }
                FiberKind::Text => self.surface.create_text(),
                FiberKind::Root => unreachable!("root fiber without a container handle"),
                FiberKind::Component(_) => unreachable!("update_host on a component fiber"),
            };
            let props = self.arena.get(id).props.clone();
            commit::apply_props(&mut self.surface, handle, &Props::default(), &props)?;
            self.arena.get_mut(id).surface = Some(handle);
        }

        let children = self.arena.get(id).props.child_elements().to_vec();
        reconcile::reconcile_children(&mut self.arena, id, children, &mut self.deletions);
        Ok(())
    }

    /// Starts the state-driven re-render requested by a setter: a fresh
    /// work-in-progress root linked to the committed root and reusing its
    /// root-level props. Whatever pass was in flight is discarded.
    fn begin_state_render(&mut self) {
        let (surface, props, alternate) = match self.current_root {
            Some(current) => {
                let fiber = self.arena.get(current);
                (fiber.surface, fiber.props.clone(), Some(current))
            }
            // A state update landed before the first commit: restart the
            // in-flight pass from its own root props. Hook state of the
            // discarded pass is unreachable and re-initializes.
            None => match self.wip_root {
                Some(wip) => {
                    let fiber = self.arena.get(wip);
                    log::warn!("state update before first commit; restarting initial render");
                    (fiber.surface, fiber.props.clone(), None)
                }
                None => return,
            },
        };

        self.discard_wip();
        let root = self.arena.alloc(Fiber::root(surface, props, alternate));
        self.wip_root = Some(root);
        self.next_unit = Some(root);
        log::trace!("state update: render pass restarted");
    }

    /// Drops an in-flight work-in-progress tree: its fibers are freed (the
    /// committed tree is reachable only through alternate links, which the
    /// free never follows) and the pass's deletion list is abandoned
    /// without freeing its members, which still belong to the current
    /// tree.
    fn discard_wip(&mut self) {
        if let Some(root) = self.wip_root.take() {
            log::trace!("discarding in-flight render pass");
            self.arena.free_subtree(root);
        }
        for id in self.deletions.drain(..) {
            self.arena.get_mut(id).effect = None;
        }
        self.next_unit = None;
    }

    /// Post-commit arena reclamation: deleted subtrees go first, then the
    /// generation the committed tree diffed against (each committed
    /// fiber's alternate), whose records nothing can reach any more.
    fn retire_previous_generation(&mut self, root: FiberId) {
        for id in std::mem::take(&mut self.deletions) {
            self.arena.free_subtree(id);
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let fiber = self.arena.get_mut(id);
            let alternate = fiber.alternate.take();
            let child = fiber.child;
            let sibling = fiber.sibling;
            if let Some(alternate) = alternate {
                self.arena.free(alternate);
            }
            if let Some(child) = child {
                stack.push(child);
            }
            if let Some(sibling) = sibling {
                stack.push(sibling);
            }
        }
    }
}

#[cfg(test)]
impl<S: Surface> Renderer<S> {
    pub(crate) fn arena(&self) -> &FiberArena {
        &self.arena
    }

    pub(crate) fn current_root(&self) -> Option<FiberId> {
        self.current_root
    }
}
