use super::*;
use crate::surface::{Surface, SurfaceError};
use crate::{EventHandler, PropValue};

#[test]
fn insert_before_moves_an_existing_child() {
    let mut surface = MemorySurface::new();
    let parent = surface.create_element("ul");
    let a = surface.create_element("li");
    let b = surface.create_element("li");
    let c = surface.create_element("li");
    surface.append_child(parent, a).unwrap();
    surface.append_child(parent, b).unwrap();
    surface.append_child(parent, c).unwrap();

    surface.insert_before(parent, c, Some(a)).unwrap();
    assert_eq!(surface.children(parent).unwrap(), vec![c, a, b]);

    surface.insert_before(parent, a, None).unwrap();
    assert_eq!(surface.children(parent).unwrap(), vec![c, b, a]);
}

#[test]
fn insert_before_unknown_reference_errors() {
    let mut surface = MemorySurface::new();
    let parent = surface.create_element("ul");
    let child = surface.create_element("li");
    let stranger = surface.create_element("li");

    let err = surface.insert_before(parent, child, Some(stranger));
    assert_eq!(
        err,
        Err(SurfaceError::NotAChild {
            parent,
            child: stranger
        })
    );
}

#[test]
fn remove_child_releases_the_subtree() {
    let mut surface = MemorySurface::new();
    let parent = surface.create_element("div");
    let child = surface.create_element("p");
    let grandchild = surface.create_text();
    surface.append_child(parent, child).unwrap();
    surface.append_child(child, grandchild).unwrap();
    assert_eq!(surface.len(), 3);

    surface.remove_child(parent, child).unwrap();
    assert_eq!(surface.len(), 1);
    assert!(surface.node(child).is_err());
    assert!(surface.node(grandchild).is_err());
}

#[test]
fn missing_nodes_report_errors() {
    let mut surface = MemorySurface::new();
    assert_eq!(
        surface.set_property(42, "x", &PropValue::Bool(true)),
        Err(SurfaceError::Missing { id: 42 })
    );
    assert_eq!(surface.children(42), Err(SurfaceError::Missing { id: 42 }));
}

#[test]
fn dispatch_fires_the_registered_listener() {
    let fired = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let log = fired.clone();

    let mut surface = MemorySurface::new();
    let button = surface.create_element("button");
    surface
        .add_listener(
            button,
            "click",
            EventHandler::new(move |event| log.borrow_mut().push(event.name.clone())),
        )
        .unwrap();

    surface.dispatch(button, &Event::new("click")).unwrap();
    surface.dispatch(button, &Event::new("hover")).unwrap();
    assert_eq!(*fired.borrow(), vec!["click".to_owned()]);
}

#[test]
fn dump_tree_renders_tags_and_text() {
    let mut surface = MemorySurface::new();
    let root = surface.create_element("div");
    let label = surface.create_text();
    surface
        .set_property(label, crate::TEXT_PROP, &PropValue::Text("hi".into()))
        .unwrap();
    surface.append_child(root, label).unwrap();

    let dump = surface.dump_tree(Some(root));
    assert!(dump.contains("<div>"), "{dump}");
    assert!(dump.contains("\"hi\""), "{dump}");
}
