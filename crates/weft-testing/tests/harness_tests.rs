use weft_core::{component, host, text, Element, Event, Hooks, Props, WorkStatus};
use weft_testing::TestHarness;

fn counter_app(hooks: &mut Hooks<'_>, _props: &Props) -> Element {
    let (count, set_count) = hooks.use_state(|| 0i32);
    let (items, set_items) = hooks.use_state(|| vec!["one", "two", "three"]);

    let bump = set_count.clone();
    let flip = set_items.clone();
    host(
        "div",
        Props::new()
            .child(host(
                "button",
                Props::new()
                    .attr("id", "bump")
                    .on("click", move |_| bump.update(|c| c + 1))
                    .child(text(format!("count is {count}"))),
            ))
            .child(host(
                "button",
                Props::new()
                    .attr("id", "flip")
                    .on("click", move |_| {
                        flip.update(|items| items.iter().rev().cloned().collect())
                    })
                    .child(text("flip")),
            ))
            .child(host(
                "ul",
                Props::new().children(items.iter().map(|item| {
                    host("li", Props::new().key(item).child(text(item)))
                })),
            )),
    )
}

fn find_button(harness: &TestHarness, id: &str) -> usize {
    let div = harness.children_of(harness.container())[0];
    harness
        .children_of(div)
        .into_iter()
        .find(|candidate| {
            harness
                .surface()
                .node(*candidate)
                .ok()
                .and_then(|node| node.attr("id"))
                .and_then(|value| value.as_text())
                == Some(id)
        })
        .expect("button not found")
}

#[test]
fn counter_flow_end_to_end() {
    let mut harness = TestHarness::new();
    harness.mount(component(counter_app, Props::new()));
    harness.settle();

    let bump = find_button(&harness, "bump");
    let label = harness.children_of(bump)[0];
    assert_eq!(
        harness.surface().node(label).unwrap().text_content(),
        Some("count is 0")
    );

    harness.dispatch(bump, &Event::new("click"));
    harness.dispatch(bump, &Event::new("click"));
    harness.settle();

    let label = harness.children_of(bump)[0];
    assert_eq!(
        harness.surface().node(label).unwrap().text_content(),
        Some("count is 2")
    );
}

#[test]
fn keyed_flip_preserves_handles() {
    let mut harness = TestHarness::new();
    harness.mount(component(counter_app, Props::new()));
    harness.settle();

    let ul = harness.find_by_tag("ul").expect("list missing");
    let before = harness.children_of(ul);
    assert_eq!(before.len(), 3);

    let flip = find_button(&harness, "flip");
    harness.dispatch(flip, &Event::new("click"));
    harness.settle();

    let after = harness.children_of(ul);
    let reversed: Vec<_> = before.iter().rev().copied().collect();
    assert_eq!(after, reversed);
}

#[test]
fn unit_deadline_spreads_work_over_turns() {
    let mut harness = TestHarness::new();
    harness.mount(host("div", Props::new().child(host("p", Props::new()))));

    assert_eq!(harness.step(1), WorkStatus::Pending);
    assert!(harness.children_of(harness.container()).is_empty());

    let mut guard = 0;
    while harness.step(1) == WorkStatus::Pending {
        guard += 1;
        assert!(guard < 16);
    }
    assert_eq!(harness.children_of(harness.container()).len(), 1);
}

#[test]
fn recording_scheduler_counts_rearms() {
    let mut harness = TestHarness::new();
    harness.mount(host("div", Props::new()));
    let after_mount = harness.scheduler().request_count();
    assert!(after_mount > 0);

    harness.settle();
    assert!(!harness.renderer().has_pending_work());
}

#[test]
fn dump_shows_committed_tree() {
    let mut harness = TestHarness::new();
    harness.mount(host(
        "section",
        Props::new().attr("id", "hero").child(text("welcome")),
    ));
    harness.settle();

    let dump = harness.dump();
    assert!(dump.contains("<section>"), "{dump}");
    assert!(dump.contains("\"welcome\""), "{dump}");
}
