//! The commit phase: one uninterrupted walk applying every tagged mutation
//! to the surface. Surface failures propagate immediately and abort the
//! walk partway; the surface API is assumed well formed (a fiber that
//! should own a handle and does not is a fatal invariant violation
//! upstream of this module, not something commit recovers from).

use crate::fiber::{EffectTag, FiberArena, FiberId};
use crate::surface::{Surface, SurfaceError, SurfaceId};
use crate::{PropValue, Props};

/// Applies a completed pass: the deletion list first, then a depth-first
/// walk of the work-in-progress tree from `root`.
pub(crate) fn commit_pass<S: Surface>(
    surface: &mut S,
    arena: &FiberArena,
    deletions: &[FiberId],
    root: FiberId,
) -> Result<(), SurfaceError> {
    for &deleted in deletions {
        commit_deletion(surface, arena, deleted)?;
    }
    if let Some(child) = arena.get(root).child {
        commit_work(surface, arena, child)?;
    }
    Ok(())
}

fn commit_work<S: Surface>(
    surface: &mut S,
    arena: &FiberArena,
    id: FiberId,
) -> Result<(), SurfaceError> {
    let fiber = arena.get(id);

    match fiber.effect {
        Some(EffectTag::Placement) => {
            if let Some(handle) = fiber.surface {
                let parent = nearest_surface_ancestor(arena, id);
                surface.append_child(parent, handle)?;
            }
        }
        Some(EffectTag::Update) => {
            if let Some(handle) = fiber.surface {
                let prev = fiber
                    .alternate
                    .map(|alt| &arena.get(alt).props);
                let empty = Props::default();
                apply_props(surface, handle, prev.unwrap_or(&empty), &fiber.props)?;

                // Reposition when the handle's place among the parent's
                // surface children disagrees with the fiber's logical
                // index. Only meaningful when the direct parent owns the
                // surface node the chain renders into.
                let parent_handle = fiber
                    .parent
                    .and_then(|parent| arena.get(parent).surface);
                if let Some(parent_handle) = parent_handle {
                    let siblings = surface.children(parent_handle)?;
                    if siblings.get(fiber.index) != Some(&handle) {
                        let reference = siblings.get(fiber.index).copied();
                        surface.insert_before(parent_handle, handle, reference)?;
                    }
                }
            }
        }
        // Deletions are applied from the deletion list before the tree
        // walk begins; a tagged fiber reached here would be one linked
        // into the new chain by mistake, so there is nothing to do.
        Some(EffectTag::Deletion) => {}
        None => {}
    }

    if let Some(child) = fiber.child {
        commit_work(surface, arena, child)?;
    }
    if let Some(sibling) = fiber.sibling {
        commit_work(surface, arena, sibling)?;
    }
    Ok(())
}

/// Removes the surface node owned by `id`, or by its nearest descendant
/// chain when `id` is a component fiber, from the nearest ancestor handle.
fn commit_deletion<S: Surface>(
    surface: &mut S,
    arena: &FiberArena,
    id: FiberId,
) -> Result<(), SurfaceError> {
    let parent = nearest_surface_ancestor(arena, id);
    let mut cursor = Some(id);
    while let Some(current) = cursor {
        let fiber = arena.get(current);
        if let Some(handle) = fiber.surface {
            return surface.remove_child(parent, handle);
        }
        cursor = fiber.child;
    }
    Ok(())
}

fn nearest_surface_ancestor(arena: &FiberArena, id: FiberId) -> SurfaceId {
    let mut cursor = arena.get(id).parent;
    while let Some(current) = cursor {
        let fiber = arena.get(current);
        if let Some(handle) = fiber.surface {
            return handle;
        }
        cursor = fiber.parent;
    }
    panic!("fiber {id} has no surface-owning ancestor");
}

/// The property/listener diff. Partitions entries by the handler prefix
/// and applies transitions in a fixed order: stale handlers off, stale
/// attributes off, new handlers on, new/changed attributes on. No handler
/// can observe a stale attribute and no attribute ever holds two values.
pub(crate) fn apply_props<S: Surface>(
    surface: &mut S,
    handle: SurfaceId,
    prev: &Props,
    next: &Props,
) -> Result<(), SurfaceError> {
    // Handlers removed or replaced since the previous render.
    for (name, value) in prev.attrs() {
        if !Props::is_event(name) {
            continue;
        }
        let stale = match next.get(name) {
            Some(new) => new != value,
            None => true,
        };
        if stale {
            surface.remove_listener(handle, Props::event_name(name))?;
        }
    }

    // Plain entries gone in the next props: reset native properties to the
    // empty value, drop everything else through the attribute path.
    for (name, value) in prev.attrs() {
        if Props::is_event(name) || value.is_handler() || next.get(name).is_some() {
            continue;
        }
        if surface.has_property(handle, name) {
            surface.set_property(handle, name, &PropValue::Text(String::new()))?;
        } else {
            surface.remove_property(handle, name)?;
        }
    }

    // New or replaced handlers.
    for (name, value) in next.attrs() {
        let PropValue::Handler(handler) = value else {
            continue;
        };
        if !Props::is_event(name) {
            continue;
        }
        if prev.get(name) != Some(value) {
            surface.add_listener(handle, Props::event_name(name), handler.clone())?;
        }
    }

    // New or changed plain entries.
    for (name, value) in next.attrs() {
        if Props::is_event(name) || value.is_handler() {
            continue;
        }
        if prev.get(name) != Some(value) {
            surface.set_property(handle, name, value)?;
        }
    }

    Ok(())
}
