use super::*;
use crate::{host, text, Props};

/// root + div + (p + text) + (p + text) = six units of work.
fn six_fiber_tree() -> Element {
    host(
        "div",
        Props::new()
            .child(host("p", Props::new().child(text("one"))))
            .child(host("p", Props::new().child(text("two")))),
    )
}

#[test]
fn work_is_spread_across_single_unit_turns() {
    let mut fx = Fixture::new();
    fx.mount(six_fiber_tree());

    let mut turns = 0;
    loop {
        let status = fx.step(1);
        turns += 1;
        if status == WorkStatus::Idle {
            break;
        }
        assert!(
            fx.container_children().is_empty(),
            "nothing may attach before commit (turn {turns})"
        );
        assert!(turns < 32, "render never completed");
    }

    assert_eq!(turns, 6);
    assert_eq!(fx.container_children().len(), 1);
}

#[test]
fn yielding_rearms_the_scheduler() {
    let mut fx = Fixture::new();
    fx.mount(six_fiber_tree());
    let after_mount = fx.scheduler.requests.get();
    assert!(after_mount > 0, "render() must request a first turn");

    assert_eq!(fx.step(1), WorkStatus::Pending);
    assert!(
        fx.scheduler.requests.get() > after_mount,
        "an exhausted slice must request another turn"
    );
}

#[test]
fn zero_budget_turn_performs_nothing() {
    let mut fx = Fixture::new();
    fx.mount(six_fiber_tree());
    let live_before = fx.live_fibers();

    assert_eq!(fx.step(0), WorkStatus::Pending);
    assert_eq!(fx.live_fibers(), live_before);
    assert!(fx.container_children().is_empty());
}

#[test]
fn work_without_pending_is_a_noop() {
    let mut fx = Fixture::new();
    assert_eq!(fx.step(8), WorkStatus::Idle);
    assert!(!fx.renderer.has_pending_work());
}

#[test]
fn commit_is_not_split_across_turns() {
    let mut fx = Fixture::new();
    fx.mount(six_fiber_tree());

    // Drive to the final turn: five single-unit turns leave one unit.
    for _ in 0..5 {
        assert_eq!(fx.step(1), WorkStatus::Pending);
    }
    assert!(fx.container_children().is_empty());

    // The closing turn performs the last unit and the entire commit.
    assert_eq!(fx.step(1), WorkStatus::Idle);
    let div = fx.container_children()[0];
    assert_eq!(fx.children_of(div).len(), 2);
}

#[test]
fn small_tree_finishes_in_one_generous_turn() {
    let mut fx = Fixture::new();
    fx.mount(six_fiber_tree());
    assert_eq!(fx.step(100), WorkStatus::Idle);
    assert_eq!(fx.container_children().len(), 1);
}
