#![doc = r"Core reconciler runtime for the Weft incremental UI toolkit."]

pub mod collections;
pub mod hash;
pub mod platform;
pub mod surface;

mod commit;
mod fiber;
mod hooks;
mod reconcile;
mod renderer;

pub use hooks::{Cleanup, Hooks, StateSetter};
pub use platform::{IdleDeadline, IdleScheduler};
pub use renderer::{RenderHandle, Renderer, WorkStatus};
pub use surface::{MemoryNode, MemorySurface, Surface, SurfaceError, SurfaceId};

#[cfg(test)]
mod tests;

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

pub type Key = u64;

/// A function component: invoked with its hook context and props, returns
/// the descriptor subtree it renders to. Plain `fn` pointers keep component
/// identity comparable across renders.
pub type ComponentFn = fn(&mut Hooks<'_>, &Props) -> Element;

/// Attribute key prefix that marks an entry as an event handler.
pub(crate) const EVENT_PREFIX: &str = "on";

/// Property name a text descriptor stores its content under.
pub const TEXT_PROP: &str = "text";

#[derive(Clone)]
pub enum ElementKind {
    Host(String),
    Text,
    Component(ComponentFn),
}

impl PartialEq for ElementKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Host(a), Self::Host(b)) => a == b,
            (Self::Text, Self::Text) => true,
            (Self::Component(a), Self::Component(b)) => std::ptr::fn_addr_eq(*a, *b),
            _ => false,
        }
    }
}

impl fmt::Debug for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host(tag) => write!(f, "Host({tag})"),
            Self::Text => write!(f, "Text"),
            Self::Component(_) => write!(f, "Component"),
        }
    }
}

/// Immutable description of one node in the desired tree.
#[derive(Clone, Debug)]
pub struct Element {
    kind: ElementKind,
    props: Props,
}

impl Element {
    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub(crate) fn into_parts(self) -> (ElementKind, Props) {
        (self.kind, self.props)
    }
}

/// Builds a host-element descriptor.
pub fn host(tag: impl Into<String>, props: Props) -> Element {
    Element {
        kind: ElementKind::Host(tag.into()),
        props,
    }
}

/// Builds a text descriptor; the content travels as the `text` property so
/// the ordinary property diff covers content updates.
pub fn text(value: impl ToString) -> Element {
    Element {
        kind: ElementKind::Text,
        props: Props::new().attr(TEXT_PROP, value.to_string()),
    }
}

/// Builds a component descriptor.
pub fn component(f: ComponentFn, props: Props) -> Element {
    Element {
        kind: ElementKind::Component(f),
        props,
    }
}

impl From<&str> for Element {
    fn from(value: &str) -> Self {
        text(value)
    }
}

impl From<String> for Element {
    fn from(value: String) -> Self {
        text(value)
    }
}

impl From<i64> for Element {
    fn from(value: i64) -> Self {
        text(value)
    }
}

/// Event delivered to a registered handler.
#[derive(Clone, Debug, Default)]
pub struct Event {
    pub name: String,
    pub detail: Option<String>,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: None,
        }
    }

    pub fn with_detail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: Some(detail.into()),
        }
    }
}

/// Shared, cheaply clonable event callback. Equality is pointer identity,
/// which is what the property diff uses to decide re-registration.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);

impl EventHandler {
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn invoke(&self, event: &Event) {
        (self.0)(event);
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventHandler")
    }
}

#[derive(Clone, Debug)]
pub enum PropValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Handler(EventHandler),
}

impl PropValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn is_handler(&self) -> bool {
        matches!(self, Self::Handler(_))
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Handler(a), Self::Handler(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<EventHandler> for PropValue {
    fn from(value: EventHandler) -> Self {
        Self::Handler(value)
    }
}

/// Property mapping of a descriptor: ordered attribute/handler entries plus
/// the child list and an optional reorder key. Children and key are struct
/// fields rather than map entries, so they can never leak into the surface
/// through the property diff.
#[derive(Clone, Debug, Default)]
pub struct Props {
    attrs: IndexMap<String, PropValue>,
    children: Vec<Element>,
    key: Option<Key>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Registers an event handler under its `on`-prefixed attribute key.
    pub fn on(mut self, event: impl AsRef<str>, f: impl Fn(&Event) + 'static) -> Self {
        let name = format!("{EVENT_PREFIX}{}", event.as_ref());
        self.attrs
            .insert(name, PropValue::Handler(EventHandler::new(f)));
        self
    }

    pub fn handler(mut self, event: impl AsRef<str>, handler: EventHandler) -> Self {
        let name = format!("{EVENT_PREFIX}{}", event.as_ref());
        self.attrs.insert(name, PropValue::Handler(handler));
        self
    }

    /// Assigns the stable reorder key; arbitrary hashable values are folded
    /// through the project hasher.
    pub fn key(mut self, key: impl std::hash::Hash) -> Self {
        self.key = Some(hash::hash_one(&key));
        self
    }

    pub fn child(mut self, child: impl Into<Element>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Appends a sequence of children; nested sequences arrive already flat
    /// because extension happens one element at a time.
    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Element>,
    {
        self.children
            .extend(children.into_iter().map(Into::into));
        self
    }

    pub fn attrs(&self) -> &IndexMap<String, PropValue> {
        &self.attrs
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.attrs.get(name)
    }

    pub fn child_elements(&self) -> &[Element] {
        &self.children
    }

    pub fn reorder_key(&self) -> Option<Key> {
        self.key
    }

    pub(crate) fn is_event(name: &str) -> bool {
        name.starts_with(EVENT_PREFIX)
    }

    pub(crate) fn event_name(name: &str) -> &str {
        &name[EVENT_PREFIX.len()..]
    }
}
