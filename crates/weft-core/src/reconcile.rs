//! The diff: an ordered sequence of child descriptors against the previous
//! generation's child chain, producing the new chain with effect tags.

use std::collections::VecDeque;

use crate::collections::map::HashMap;
use crate::fiber::{EffectTag, Fiber, FiberArena, FiberId, FiberKind};
use crate::{Element, Key};

/// Reconciles `elements` against the previous children of `wip` (reached
/// through its alternate). New fibers are tagged `Placement` or `Update`
/// and linked into the wip chain in descriptor order; displaced previous
/// fibers are tagged `Deletion` and pushed onto `deletions`.
///
/// Previous children carrying a key match by key lookup; the rest match
/// strictly by position (FIFO). Inserting or removing an unkeyed child
/// therefore shifts the identity of every unkeyed child after it — the
/// documented cost of omitting keys.
pub(crate) fn reconcile_children(
    arena: &mut FiberArena,
    wip: FiberId,
    elements: Vec<Element>,
    deletions: &mut Vec<FiberId>,
) {
    let mut keyed: HashMap<Key, FiberId> = HashMap::new();
    let mut unkeyed: VecDeque<FiberId> = VecDeque::new();

    let mut cursor = arena.get(wip).alternate.and_then(|alt| arena.get(alt).child);
    while let Some(id) = cursor {
        let fiber = arena.get(id);
        match fiber.props.reorder_key() {
            Some(key) => {
                keyed.insert(key, id);
            }
            None => unkeyed.push_back(id),
        }
        cursor = fiber.sibling;
    }

    let mut elements = elements.into_iter().fuse();
    let mut prev_sibling: Option<FiberId> = None;
    let mut index = 0;

    loop {
        let element = elements.next();
        if element.is_none() && keyed.is_empty() && unkeyed.is_empty() {
            break;
        }

        let old = match &element {
            Some(element) => match element.props().reorder_key() {
                Some(key) => keyed.remove(&key),
                None => unkeyed.pop_front(),
            },
            // Descriptors exhausted: drain leftovers into deletions.
            None => unkeyed.pop_front().or_else(|| {
                let key = keyed.keys().next().copied();
                key.and_then(|key| keyed.remove(&key))
            }),
        };

        let same_type = match (&element, old) {
            (Some(element), Some(old)) => arena.get(old).kind.matches(element.kind()),
            _ => false,
        };

        let new_fiber = match element {
            Some(element) if same_type => {
                let old = old.expect("matched fiber");
                let (kind, props) = element.into_parts();
                let fiber = Fiber {
                    surface: arena.get(old).surface,
                    parent: Some(wip),
                    alternate: Some(old),
                    effect: Some(EffectTag::Update),
                    index,
                    ..Fiber::new(FiberKind::from_element(&kind), props)
                };
                Some(arena.alloc(fiber))
            }
            Some(element) => {
                let (kind, props) = element.into_parts();
                let fiber = Fiber {
                    parent: Some(wip),
                    effect: Some(EffectTag::Placement),
                    index,
                    ..Fiber::new(FiberKind::from_element(&kind), props)
                };
                Some(arena.alloc(fiber))
            }
            None => None,
        };

        if let Some(old) = old {
            if !same_type {
                arena.get_mut(old).effect = Some(EffectTag::Deletion);
                deletions.push(old);
            }
        }

        if let Some(id) = new_fiber {
            match prev_sibling {
                None => arena.get_mut(wip).child = Some(id),
                Some(prev) => arena.get_mut(prev).sibling = Some(id),
            }
            prev_sibling = Some(id);
        }

        index += 1;
    }
}
