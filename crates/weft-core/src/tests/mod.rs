use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::fiber::EffectTag;
use crate::platform::{IdleDeadline, IdleScheduler};
use crate::surface::{MemorySurface, Surface, SurfaceId};
use crate::{Element, Event, Renderer, WorkStatus};

mod scheduler_tests;
mod surface_tests;

/// Deadline that never expires.
struct Unbounded;

impl IdleDeadline for Unbounded {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}

/// Deadline granting budget for a fixed number of fiber units.
struct UnitBudget {
    units: Cell<u32>,
}

impl UnitBudget {
    fn new(units: u32) -> Self {
        Self {
            units: Cell::new(units),
        }
    }
}

impl IdleDeadline for UnitBudget {
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

#[derive(Default)]
struct CountingScheduler {
    requests: Cell<usize>,
}

impl IdleScheduler for CountingScheduler {
    fn request_idle(&self) {
        self.requests.set(self.requests.get() + 1);
    }
}

struct Fixture {
    renderer: Renderer<MemorySurface>,
    scheduler: Rc<CountingScheduler>,
    container: SurfaceId,
}

impl Fixture {
    fn new() -> Self {
        let mut surface = MemorySurface::new();
        let container = surface.create_element("root");
        let scheduler = Rc::new(CountingScheduler::default());
        let renderer = Renderer::new(surface, scheduler.clone());
        Self {
            renderer,
            scheduler,
            container,
        }
    }

    fn mount(&mut self, element: Element) {
        let container = self.container;
        self.renderer.render(element, container);
    }

    fn settle(&mut self) {
        while self.renderer.has_pending_work() {
            self.renderer.work(&Unbounded).unwrap();
        }
    }

    fn step(&mut self, units: u32) -> WorkStatus {
        self.renderer.work(&UnitBudget::new(units)).unwrap()
    }

    fn dispatch(&self, target: SurfaceId, event: &Event) {
        self.renderer.surface().dispatch(target, event).unwrap();
    }

    fn children_of(&self, id: SurfaceId) -> Vec<SurfaceId> {
        self.renderer
            .surface()
            .node(id)
            .unwrap()
            .child_ids()
            .to_vec()
    }

    fn container_children(&self) -> Vec<SurfaceId> {
        self.children_of(self.container)
    }

    fn text_content(&self, id: SurfaceId) -> String {
        self.renderer
            .surface()
            .node(id)
            .unwrap()
            .text_content()
            .unwrap_or_default()
            .to_owned()
    }

    fn dump(&self) -> String {
        self.renderer.surface().dump_tree(Some(self.container))
    }

    /// Effect tags of every fiber in the committed tree, excluding the
    /// root, in depth-first order.
    fn committed_effects(&self) -> Vec<Option<EffectTag>> {
        let mut effects = Vec::new();
        let arena = self.renderer.arena();
        let Some(root) = self.renderer.current_root() else {
            return effects;
        };
        let mut stack: Vec<usize> = arena.get(root).child.into_iter().collect();
        while let Some(id) = stack.pop() {
            let fiber = arena.get(id);
            effects.push(fiber.effect);
            if let Some(sibling) = fiber.sibling {
                stack.push(sibling);
            }
            if let Some(child) = fiber.child {
                stack.push(child);
            }
        }
        effects
    }

    fn live_fibers(&self) -> usize {
        self.renderer.arena().live_count()
    }
}
