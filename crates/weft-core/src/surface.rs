//! The rendering-surface seam and its in-memory double.

use indexmap::IndexMap;

use crate::{Event, EventHandler, PropValue, TEXT_PROP};

pub type SurfaceId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    Missing { id: SurfaceId },
    NotAChild { parent: SurfaceId, child: SurfaceId },
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceError::Missing { id } => write!(f, "surface node {id} missing"),
            SurfaceError::NotAChild { parent, child } => {
                write!(f, "surface node {child} is not a child of {parent}")
            }
        }
    }
}

impl std::error::Error for SurfaceError {}

/// Primitive mutations the host rendering environment exposes. The commit
/// phase is written against this trait only; any node store that can
/// create, attribute, and reparent nodes can host a Weft tree.
pub trait Surface {
    fn create_element(&mut self, tag: &str) -> SurfaceId;
    fn create_text(&mut self) -> SurfaceId;

    fn set_property(
        &mut self,
        id: SurfaceId,
        name: &str,
        value: &PropValue,
    ) -> Result<(), SurfaceError>;
    fn remove_property(&mut self, id: SurfaceId, name: &str) -> Result<(), SurfaceError>;
    /// Whether `name` is a native property of the node, i.e. whether a
    /// removal should reset it to the empty value instead of deleting the
    /// attribute entry.
    fn has_property(&self, id: SurfaceId, name: &str) -> bool;

    fn add_listener(
        &mut self,
        id: SurfaceId,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), SurfaceError>;
    fn remove_listener(&mut self, id: SurfaceId, event: &str) -> Result<(), SurfaceError>;

    fn append_child(&mut self, parent: SurfaceId, child: SurfaceId) -> Result<(), SurfaceError>;
    fn insert_before(
        &mut self,
        parent: SurfaceId,
        child: SurfaceId,
        reference: Option<SurfaceId>,
    ) -> Result<(), SurfaceError>;
    fn remove_child(&mut self, parent: SurfaceId, child: SurfaceId) -> Result<(), SurfaceError>;

    /// Current positional child list of a node.
    fn children(&self, parent: SurfaceId) -> Result<Vec<SurfaceId>, SurfaceError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum MemoryNodeKind {
    Element(String),
    Text,
}

/// Node record held by [`MemorySurface`].
#[derive(Debug)]
pub struct MemoryNode {
    kind: MemoryNodeKind,
    attrs: IndexMap<String, PropValue>,
    listeners: IndexMap<String, EventHandler>,
    children: Vec<SurfaceId>,
}

impl MemoryNode {
    fn element(tag: &str) -> Self {
        Self {
            kind: MemoryNodeKind::Element(tag.to_owned()),
            attrs: IndexMap::new(),
            listeners: IndexMap::new(),
            children: Vec::new(),
        }
    }

    fn text() -> Self {
        Self {
            kind: MemoryNodeKind::Text,
            attrs: IndexMap::new(),
            listeners: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            MemoryNodeKind::Element(tag) => Some(tag),
            MemoryNodeKind::Text => None,
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == MemoryNodeKind::Text
    }

    pub fn attr(&self, name: &str) -> Option<&PropValue> {
        self.attrs.get(name)
    }

    pub fn text_content(&self) -> Option<&str> {
        self.attrs.get(TEXT_PROP).and_then(PropValue::as_text)
    }

    pub fn child_ids(&self) -> &[SurfaceId] {
        &self.children
    }

    pub fn has_listener(&self, event: &str) -> bool {
        self.listeners.contains_key(event)
    }
}

/// In-memory [`Surface`] used by tests, benches, and headless demos.
///
/// Nodes live in a slab of optional slots; removal vacates the slot. A
/// journal records the name of every mutating call so tests can assert on
/// operation ordering.
#[derive(Default)]
pub struct MemorySurface {
    nodes: Vec<Option<MemoryNode>>,
    journal: Vec<String>,
}

/// Names the in-memory surface treats as native node properties; removal
/// of these resets to the empty value rather than deleting the entry.
const NATIVE_PROPS: &[&str] = &[TEXT_PROP, "value", "title"];

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: SurfaceId) -> Result<&MemoryNode, SurfaceError> {
        self.nodes
            .get(id)
            .and_then(Option::as_ref)
            .ok_or(SurfaceError::Missing { id })
    }

    fn node_mut(&mut self, id: SurfaceId) -> Result<&mut MemoryNode, SurfaceError> {
        self.nodes
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(SurfaceError::Missing { id })
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fires the listener registered for `event.name` on `id`, if any.
    pub fn dispatch(&self, id: SurfaceId, event: &Event) -> Result<(), SurfaceError> {
        let handler = self.node(id)?.listeners.get(event.name.as_str()).cloned();
        if let Some(handler) = handler {
            handler.invoke(event);
        }
        Ok(())
    }

    /// Drains the mutation journal accumulated since the last call.
    pub fn take_journal(&mut self) -> Vec<String> {
        std::mem::take(&mut self.journal)
    }

    fn record(&mut self, op: String) {
        self.journal.push(op);
    }

    pub fn dump_tree(&self, root: Option<SurfaceId>) -> String {
        let mut output = String::new();
        if let Some(root_id) = root {
            self.dump_node(&mut output, root_id, 0);
        } else {
            output.push_str("(no root)\n");
        }
        output
    }

    fn dump_node(&self, output: &mut String, id: SurfaceId, depth: usize) {
        let indent = "  ".repeat(depth);
        match self.node(id) {
            Ok(node) => {
                match &node.kind {
                    MemoryNodeKind::Element(tag) => {
                        output.push_str(&format!("{indent}[{id}] <{tag}>"));
                        for (name, value) in &node.attrs {
                            if let PropValue::Text(text) = value {
                                output.push_str(&format!(" {name}={text:?}"));
                            }
                        }
                        output.push('\n');
                    }
                    MemoryNodeKind::Text => {
                        let content = node.text_content().unwrap_or_default();
                        output.push_str(&format!("{indent}[{id}] {content:?}\n"));
                    }
                }
                for child in &node.children {
                    self.dump_node(output, *child, depth + 1);
                }
            }
            Err(_) => output.push_str(&format!("{indent}[{id}] (missing)\n")),
        }
    }
}

impl Surface for MemorySurface {
    fn create_element(&mut self, tag: &str) -> SurfaceId {
        let id = self.nodes.len();
        self.nodes.push(Some(MemoryNode::element(tag)));
        self.record(format!("create_element {tag} -> {id}"));
        id
    }

    fn create_text(&mut self) -> SurfaceId {
        let id = self.nodes.len();
        self.nodes.push(Some(MemoryNode::text()));
        self.record(format!("create_text -> {id}"));
        id
    }

    fn set_property(
        &mut self,
        id: SurfaceId,
        name: &str,
        value: &PropValue,
    ) -> Result<(), SurfaceError> {
        self.node_mut(id)?
            .attrs
            .insert(name.to_owned(), value.clone());
        self.record(format!("set_property {id} {name}"));
        Ok(())
    }

    fn remove_property(&mut self, id: SurfaceId, name: &str) -> Result<(), SurfaceError> {
        self.node_mut(id)?.attrs.shift_remove(name);
        self.record(format!("remove_property {id} {name}"));
        Ok(())
    }

    fn has_property(&self, id: SurfaceId, name: &str) -> bool {
        self.node(id).is_ok() && NATIVE_PROPS.contains(&name)
    }

    fn add_listener(
        &mut self,
        id: SurfaceId,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), SurfaceError> {
        self.node_mut(id)?
            .listeners
            .insert(event.to_owned(), handler);
        self.record(format!("add_listener {id} {event}"));
        Ok(())
    }

    fn remove_listener(&mut self, id: SurfaceId, event: &str) -> Result<(), SurfaceError> {
        self.node_mut(id)?.listeners.shift_remove(event);
        self.record(format!("remove_listener {id} {event}"));
        Ok(())
    }

    fn append_child(&mut self, parent: SurfaceId, child: SurfaceId) -> Result<(), SurfaceError> {
        self.node(child)?;
        self.node_mut(parent)?.children.push(child);
        self.record(format!("append_child {parent} <- {child}"));
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: SurfaceId,
        child: SurfaceId,
        reference: Option<SurfaceId>,
    ) -> Result<(), SurfaceError> {
        self.node(child)?;
        let node = self.node_mut(parent)?;
        node.children.retain(|existing| *existing != child);
        match reference {
            Some(reference) => {
                let position = node
                    .children
                    .iter()
                    .position(|existing| *existing == reference)
                    .ok_or(SurfaceError::NotAChild {
                        parent,
                        child: reference,
                    })?;
                node.children.insert(position, child);
            }
            None => node.children.push(child),
        }
        self.record(format!("insert_before {parent} <- {child}"));
        Ok(())
    }

    fn remove_child(&mut self, parent: SurfaceId, child: SurfaceId) -> Result<(), SurfaceError> {
        let node = self.node_mut(parent)?;
        let position = node
            .children
            .iter()
            .position(|existing| *existing == child)
            .ok_or(SurfaceError::NotAChild { parent, child })?;
        node.children.remove(position);
        self.record(format!("remove_child {parent} -x {child}"));
        // The detached subtree is unreachable from any root; vacate its slots.
        self.release(child);
        Ok(())
    }

    fn children(&self, parent: SurfaceId) -> Result<Vec<SurfaceId>, SurfaceError> {
        Ok(self.node(parent)?.children.clone())
    }
}

impl MemorySurface {
    fn release(&mut self, id: SurfaceId) {
        let children = match self.nodes.get_mut(id).and_then(Option::take) {
            Some(node) => node.children,
            None => return,
        };
        for child in children {
            self.release(child);
        }
    }
}
