//! The fiber tree: one mutable work record per rendered node, stored in an
//! arena and linked by indices instead of references. Index links keep the
//! parent/child/sibling/alternate web free of ownership cycles while
//! preserving O(1) navigation.

use crate::hooks::Hook;
use crate::surface::SurfaceId;
use crate::{ComponentFn, ElementKind, Props};

pub(crate) type FiberId = usize;

/// Mutation a committed fiber requires on the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EffectTag {
    Placement,
    Update,
    Deletion,
}

#[derive(Clone)]
pub(crate) enum FiberKind {
    /// The container fiber at the top of every pass; owns the host-provided
    /// surface handle and is never diffed as a child.
    Root,
    Host(String),
    Text,
    Component(ComponentFn),
}

impl FiberKind {
    pub(crate) fn from_element(kind: &ElementKind) -> Self {
        match kind {
            ElementKind::Host(tag) => Self::Host(tag.clone()),
            ElementKind::Text => Self::Text,
            ElementKind::Component(f) => Self::Component(*f),
        }
    }

    /// Type equality against a descriptor, the reuse criterion of the diff.
    pub(crate) fn matches(&self, kind: &ElementKind) -> bool {
        match (self, kind) {
            (Self::Host(a), ElementKind::Host(b)) => a == b,
            (Self::Text, ElementKind::Text) => true,
            (Self::Component(a), ElementKind::Component(b)) => std::ptr::fn_addr_eq(*a, *b),
            _ => false,
        }
    }
}

pub(crate) struct Fiber {
    pub(crate) kind: FiberKind,
    pub(crate) props: Props,
    pub(crate) surface: Option<SurfaceId>,
    pub(crate) parent: Option<FiberId>,
    pub(crate) child: Option<FiberId>,
    pub(crate) sibling: Option<FiberId>,
    /// Same tree position in the previous committed generation.
    pub(crate) alternate: Option<FiberId>,
    pub(crate) effect: Option<EffectTag>,
    /// Logical position in the parent's child chain.
    pub(crate) index: usize,
    pub(crate) hooks: Vec<Hook>,
}

impl Fiber {
    pub(crate) fn new(kind: FiberKind, props: Props) -> Self {
        Self {
            kind,
            props,
            surface: None,
            parent: None,
            child: None,
            sibling: None,
            alternate: None,
            effect: None,
            index: 0,
            hooks: Vec::new(),
        }
    }

    pub(crate) fn root(
        surface: Option<SurfaceId>,
        props: Props,
        alternate: Option<FiberId>,
    ) -> Self {
        Self {
            surface,
            alternate,
            ..Self::new(FiberKind::Root, props)
        }
    }
}

/// Slab of fiber slots with a free list. Freed ids are recycled, so the
/// arena footprint tracks the live tree rather than total render count.
#[derive(Default)]
pub(crate) struct FiberArena {
    slots: Vec<Option<Fiber>>,
    free: Vec<FiberId>,
}

impl FiberArena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn alloc(&mut self, fiber: Fiber) -> FiberId {
        match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(fiber);
                id
            }
            None => {
                self.slots.push(Some(fiber));
                self.slots.len() - 1
            }
        }
    }

    #[track_caller]
    pub(crate) fn get(&self, id: FiberId) -> &Fiber {
        self.slots
            .get(id)
            .and_then(Option::as_ref)
            .unwrap_or_else(|| panic!("fiber {id} vacated while still linked"))
    }

    #[track_caller]
    pub(crate) fn get_mut(&mut self, id: FiberId) -> &mut Fiber {
        self.slots
            .get_mut(id)
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("fiber {id} vacated while still linked"))
    }

    pub(crate) fn free(&mut self, id: FiberId) {
        if self
            .slots
            .get_mut(id)
            .and_then(Option::take)
            .is_some()
        {
            self.free.push(id);
        }
    }

    /// Frees a fiber and every descendant reachable through child/sibling
    /// chains. Alternate links are never followed.
    pub(crate) fn free_subtree(&mut self, id: FiberId) {
        let child = match self.slots.get_mut(id).and_then(Option::take) {
            Some(fiber) => {
                self.free.push(id);
                fiber.child
            }
            None => return,
        };
        let mut cursor = child;
        while let Some(next) = cursor {
            let sibling = self.slots.get(next).and_then(Option::as_ref).and_then(|fiber| fiber.sibling);
            self.free_subtree(next);
            cursor = sibling;
        }
    }

    /// Live fiber count; used by reclamation tests.
    pub(crate) fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}
