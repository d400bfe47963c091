//! Headless counter demo: a component tree with state, effects, and a
//! keyed list, rendered into the in-memory surface and driven by scripted
//! events. Prints the surface tree after each interaction.

use weft_core::{
    component, host, text, Element, Event, Hooks, MemorySurface, Props, PropValue, Renderer,
    Surface, SurfaceId,
};
use weft_runtime_std::IdleLoop;

fn item_row(item: &(u64, &str)) -> Element {
    let (id, label) = item;
    host("li", Props::new().key(id).child(text(label)))
}

fn counter(hooks: &mut Hooks<'_>, props: &Props) -> Element {
    let (count, set_count) = hooks.use_state(|| 1i64);
    let (title, set_title) = hooks.use_state(|| "Hello World".to_owned());
    let (items, set_items) = hooks.use_state(|| {
        vec![
            (1u64, "List item 1"),
            (2u64, "List item 2"),
            (3u64, "List item 3"),
        ]
    });

    let effect_title = title.clone();
    hooks.use_effect(title.clone(), move || {
        log::info!("document title is now {effect_title:?}");
        let cleared = effect_title.clone();
        Some(Box::new(move || {
            log::info!("cleanup ran for {cleared:?}");
        }) as weft_core::Cleanup)
    });

    let bump = set_count.clone();
    let flip = set_items.clone();
    let retitle = set_title.clone();

    host(
        "div",
        Props::new()
            .attr("style", "font-family: sans-serif;")
            .child(host(
                "h1",
                Props::new()
                    .attr("cool-attrib", if count % 2 == 0 { "hey" } else { "" })
                    .child(text(format!("{title}, the counter is {count}"))),
            ))
            .child(host(
                "button",
                Props::new()
                    .attr("id", "increment")
                    .on("click", move |_| bump.update(|c| c + 1))
                    .child(text("Click me")),
            ))
            .child(host(
                "button",
                Props::new()
                    .attr("id", "flip")
                    .on("click", move |_| {
                        flip.update(|items| items.iter().rev().cloned().collect())
                    })
                    .child(text("Flip array")),
            ))
            .child(host(
                "input",
                Props::new()
                    .attr("value", title.clone())
                    .on("input", move |event| {
                        if let Some(value) = &event.detail {
                            retitle.set(value.clone());
                        }
                    }),
            ))
            .child(host(
                "div",
                Props::new()
                    .attr("id", "children")
                    .children(props.child_elements().iter().cloned()),
            ))
            .child(host(
                "ul",
                Props::new()
                    .children(items.iter().map(item_row))
                    .child(host("li", Props::new().child(text("Hmm..."))))
                    .children(items.iter().map(|(id, label)| {
                        host(
                            "li",
                            Props::new()
                                .key(format!("{id}-again"))
                                .child(text(format!("{label} again"))),
                        )
                    })),
            )),
    )
}

fn find_by_attr(surface: &MemorySurface, root: SurfaceId, name: &str, value: &str) -> Option<SurfaceId> {
    let node = surface.node(root).ok()?;
    if node.attr(name).map(PropValue::as_text) == Some(Some(value)) {
        return Some(root);
    }
    for child in node.child_ids() {
        if let Some(found) = find_by_attr(surface, *child, name, value) {
            return Some(found);
        }
    }
    None
}

fn main() {
    env_logger::init();

    let mut surface = MemorySurface::new();
    let container = surface.create_element("root");

    let idle = IdleLoop::default();
    let mut renderer = Renderer::new(surface, idle.scheduler());

    let app = component(
        counter,
        Props::new()
            .child(host("div", Props::new().child(text("Hi"))))
            .child(host(
                "p",
                Props::new().child(text("These children are in an array and that's ok")),
            )),
    );
    renderer.render(app, container);
    idle.run_until_idle(&mut renderer).expect("initial render failed");

    println!("after initial render:\n{}", renderer.surface().dump_tree(Some(container)));

    let increment = find_by_attr(renderer.surface(), container, "id", "increment")
        .expect("increment button missing");
    renderer
        .surface()
        .dispatch(increment, &Event::new("click"))
        .expect("dispatch failed");
    renderer
        .surface()
        .dispatch(increment, &Event::new("click"))
        .expect("dispatch failed");
    idle.run_until_idle(&mut renderer).expect("re-render failed");

    println!("after two clicks:\n{}", renderer.surface().dump_tree(Some(container)));

    let flip = find_by_attr(renderer.surface(), container, "id", "flip")
        .expect("flip button missing");
    renderer
        .surface()
        .dispatch(flip, &Event::new("click"))
        .expect("dispatch failed");
    idle.run_until_idle(&mut renderer).expect("re-render failed");

    println!("after flipping the list:\n{}", renderer.surface().dump_tree(Some(container)));

    let input = find_by_attr(renderer.surface(), container, "value", "Hello World")
        .expect("input missing");
    renderer
        .surface()
        .dispatch(input, &Event::with_detail("input", "Goodbye"))
        .expect("dispatch failed");
    idle.run_until_idle(&mut renderer).expect("re-render failed");

    println!("after editing the input:\n{}", renderer.surface().dump_tree(Some(container)));
}
