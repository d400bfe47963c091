//! Testing utilities and harness for Weft.
//!
//! Deterministic stand-ins for the platform traits (deadlines measured in
//! fiber units rather than wall-clock time, a scheduler that counts
//! re-arm requests) plus a [`TestHarness`] bundling a renderer with the
//! in-memory surface.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use weft_core::{
    Element, Event, IdleDeadline, IdleScheduler, MemorySurface, Renderer, Surface, SurfaceId,
    WorkStatus,
};

/// A deadline that never expires; a single turn runs the tree to
/// completion.
pub struct UnboundedDeadline;

impl IdleDeadline for UnboundedDeadline {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}

/// Grants budget for a fixed number of fiber units, then reports an
/// exhausted slice. The work loop polls once per unit, so `new(1)` yields
/// after exactly one fiber.
pub struct UnitDeadline {
    units: Cell<u32>,
}

impl UnitDeadline {
    pub fn new(units: u32) -> Self {
        Self {
            units: Cell::new(units),
        }
    }
}

impl IdleDeadline for UnitDeadline {
    fn time_remaining(&self) -> Duration {
        let left = self.units.get();
        if left == 0 {
            Duration::ZERO
        } else {
            self.units.set(left - 1);
            Duration::from_millis(10)
        }
    }
}

/// Counts idle requests so tests can assert the work loop re-arms itself.
#[derive(Default)]
pub struct RecordingScheduler {
    requests: Cell<usize>,
}

impl RecordingScheduler {
    pub fn request_count(&self) -> usize {
        self.requests.get()
    }
}

impl IdleScheduler for RecordingScheduler {
    fn request_idle(&self) {
        self.requests.set(self.requests.get() + 1);
    }
}

/// A renderer wired to a [`MemorySurface`] and a [`RecordingScheduler`],
/// with a pre-created container node.
pub struct TestHarness {
    renderer: Renderer<MemorySurface>,
    scheduler: Rc<RecordingScheduler>,
    container: SurfaceId,
}

impl TestHarness {
    pub fn new() -> Self {
        let mut surface = MemorySurface::new();
        let container = surface.create_element("root");
        let scheduler = Rc::new(RecordingScheduler::default());
        let renderer = Renderer::new(surface, scheduler.clone());
        Self {
            renderer,
            scheduler,
            container,
        }
    }

    pub fn container(&self) -> SurfaceId {
        self.container
    }

    pub fn scheduler(&self) -> &RecordingScheduler {
        &self.scheduler
    }

    pub fn renderer(&mut self) -> &mut Renderer<MemorySurface> {
        &mut self.renderer
    }

    pub fn surface(&self) -> &MemorySurface {
        self.renderer.surface()
    }

    pub fn surface_mut(&mut self) -> &mut MemorySurface {
        self.renderer.surface_mut()
    }

    /// Schedules a render of `element` into the harness container.
    pub fn mount(&mut self, element: Element) {
        let container = self.container;
        self.renderer.render(element, container);
    }

    /// Drives turns with an unbounded deadline until nothing is pending,
    /// including re-renders requested along the way.
    pub fn settle(&mut self) {
        while self.renderer.has_pending_work() {
            self.renderer
                .work(&UnboundedDeadline)
                .expect("surface mutation failed");
        }
    }

    /// Grants one turn with budget for `units` fibers.
    pub fn step(&mut self, units: u32) -> WorkStatus {
        self.renderer
            .work(&UnitDeadline::new(units))
            .expect("surface mutation failed")
    }

    /// Fires the listener for `event` registered on `target`.
    pub fn dispatch(&mut self, target: SurfaceId, event: &Event) {
        self.renderer
            .surface()
            .dispatch(target, event)
            .expect("dispatch target missing");
    }

    /// Positional child list of a surface node.
    pub fn children_of(&self, id: SurfaceId) -> Vec<SurfaceId> {
        self.surface()
            .node(id)
            .expect("surface node missing")
            .child_ids()
            .to_vec()
    }

    pub fn dump(&self) -> String {
        self.surface().dump_tree(Some(self.container))
    }

    /// Depth-first search for the first node with the given tag.
    pub fn find_by_tag(&self, tag: &str) -> Option<SurfaceId> {
        self.find_by_tag_from(self.container, tag)
    }

    fn find_by_tag_from(&self, root: SurfaceId, tag: &str) -> Option<SurfaceId> {
        let node = self.surface().node(root).ok()?;
        if node.tag() == Some(tag) {
            return Some(root);
        }
        for child in node.child_ids() {
            if let Some(found) = self.find_by_tag_from(*child, tag) {
                return Some(found);
            }
        }
        None
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
