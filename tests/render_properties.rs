//! Reconciliation properties: idempotence, key stability, value fallbacks,
//! exit cascades and ordering.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use proptest::prelude::*;
use spark_signals::signal;

use spark_render::animate::{Timeline, ease};
use spark_render::engine::Scene;
use spark_render::host::Scene as _;
use spark_render::{
    BindingFlags, Easing, ElementDescriptor, Forest, NodeId, StateValues, Value, forest, render,
};

fn setup() -> (Scene, Timeline) {
    (Scene::new("svg"), Timeline::new().with_default_ease(Easing::new(ease::linear)))
}

fn keyed(keys: &[String]) -> Forest {
    forest(keys.iter().map(|k| ElementDescriptor::new("rect").key(k.clone()).attr("id", k.as_str())))
}

fn ids(scene: &Scene, parent: NodeId) -> Vec<String> {
    scene
        .children(parent)
        .into_iter()
        .filter_map(|node| scene.attribute(node, "id"))
        .collect()
}

fn strings(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn test_render_is_idempotent() {
    let (mut scene, mut timeline) = setup();
    let data = forest(vec![
        ElementDescriptor::new("g")
            .key("axis")
            .attr("transform", "translate(0, 10)")
            .children(vec![
                ElementDescriptor::new("line").attr("x2", 100),
                ElementDescriptor::new("text").text("0").attr("dy", 4),
            ]),
        ElementDescriptor::new("rect")
            .attr("width", StateValues::new().enter(50).exit(0))
            .style("fill", "steelblue")
            .duration(100),
    ]);

    let first = render(&mut scene, &mut timeline, "svg", &data);
    timeline.settle(&mut scene);
    let markup = scene.markup(scene.root());
    let count = scene.len();

    let second = render(&mut scene, &mut timeline, "svg", &data);
    timeline.settle(&mut scene);

    assert_eq!(first, second);
    assert_eq!(scene.len(), count);
    assert_eq!(scene.markup(scene.root()), markup);
}

// =============================================================================
// Key stability
// =============================================================================

const KEYS: &[&str] = &["a", "b", "c", "d", "e", "f", "g", "h"];

fn key_lists() -> impl Strategy<Value = Vec<String>> {
    proptest::sample::subsequence(KEYS, 0..=KEYS.len())
        .prop_shuffle()
        .prop_map(|keys| keys.into_iter().map(String::from).collect())
}

proptest! {
    #[test]
    fn test_key_stability(first in key_lists(), second in key_lists()) {
        let (mut scene, mut timeline) = setup();
        let root = scene.root();

        let before: HashMap<String, NodeId> = first
            .iter()
            .cloned()
            .zip(render(&mut scene, &mut timeline, root, &keyed(&first)).iter())
            .collect();
        let after = render(&mut scene, &mut timeline, root, &keyed(&second));

        for (key, node) in second.iter().zip(after.iter()) {
            match before.get(key) {
                Some(old) => {
                    prop_assert_eq!(*old, node);
                }
                None => {
                    prop_assert!(!before.values().any(|old| *old == node));
                }
            }
        }

        timeline.settle(&mut scene);
        prop_assert_eq!(ids(&scene, root), second);
    }
}

#[test]
fn test_changed_key_exits_and_enters() {
    let (mut scene, mut timeline) = setup();
    let root = scene.root();

    let old = render(&mut scene, &mut timeline, root, &keyed(&strings(&["a"]))).first().unwrap();
    let new = render(&mut scene, &mut timeline, root, &keyed(&strings(&["b"]))).first().unwrap();

    assert_ne!(old, new);
    assert!(scene.binding(old).unwrap().flags.contains(BindingFlags::EXITING));
    timeline.settle(&mut scene);
    assert!(!scene.contains(old));
    assert_eq!(ids(&scene, root), strings(&["b"]));
}

#[test]
fn test_reorder_moves_nodes() {
    let (mut scene, mut timeline) = setup();
    let root = scene.root();

    let first = render(&mut scene, &mut timeline, root, &keyed(&strings(&["a", "b", "c", "d"])));
    let second = render(&mut scene, &mut timeline, root, &keyed(&strings(&["d", "b", "a", "c"])));

    assert_eq!(ids(&scene, root), strings(&["d", "b", "a", "c"]));
    assert_eq!(second.nodes(), &[first.nodes()[3], first.nodes()[1], first.nodes()[0], first.nodes()[2]]);
}

#[test]
fn test_positional_keys_update_in_place() {
    let (mut scene, mut timeline) = setup();
    let root = scene.root();
    let bars = |values: &[i32]| forest(values.iter().map(|v| ElementDescriptor::new("rect").attr("height", *v)));

    let first = render(&mut scene, &mut timeline, root, &bars(&[1, 2, 3]));
    let second = render(&mut scene, &mut timeline, root, &bars(&[3, 1]));
    timeline.settle(&mut scene);

    assert_eq!(second.nodes(), &first.nodes()[..2]);
    assert_eq!(scene.attribute(first.nodes()[0], "height").as_deref(), Some("3"));
    assert!(!scene.contains(first.nodes()[2]));
}

// =============================================================================
// Fallbacks
// =============================================================================

#[test]
fn test_update_falls_back_to_enter() {
    let (mut scene, mut timeline) = setup();
    let data = forest(vec![ElementDescriptor::new("rect").attr("width", StateValues::new().enter(100).exit(0))]);

    let rect = render(&mut scene, &mut timeline, "svg", &data).first().unwrap();
    scene.set_attribute(rect, "width", Some("7")).unwrap();

    render(&mut scene, &mut timeline, "svg", &data);
    assert_eq!(scene.attribute(rect, "width").as_deref(), Some("100"));
}

#[test]
fn test_enter_only_value_untouched_on_exit() {
    let (mut scene, mut timeline) = setup();
    let data = forest(vec![
        ElementDescriptor::new("rect")
            .attr("opacity", StateValues::new().enter(1))
            .duration(100),
    ]);

    let rect = render(&mut scene, &mut timeline, "svg", &data).first().unwrap();
    assert!(scene.attribute(rect, "opacity").is_none());
    timeline.settle(&mut scene);
    assert_eq!(scene.attribute(rect, "opacity").as_deref(), Some("1"));

    render(&mut scene, &mut timeline, "svg", &forest(Vec::new()));
    timeline.advance(&mut scene, Duration::from_millis(50));
    assert_eq!(scene.attribute(rect, "opacity").as_deref(), Some("1"));
}

// =============================================================================
// Exit cascades
// =============================================================================

#[test]
fn test_exit_cascades_through_descendants() {
    let (mut scene, mut timeline) = setup();
    let data = forest(vec![
        ElementDescriptor::new("g").duration(100).children(vec![
            ElementDescriptor::new("circle")
                .attr("r", StateValues::new().enter(10).exit(0))
                .duration(100),
            ElementDescriptor::new("g").duration(100).children(vec![
                ElementDescriptor::new("rect")
                    .attr("width", StateValues::new().enter(20).exit(0))
                    .duration(100),
            ]),
        ]),
    ]);

    render(&mut scene, &mut timeline, "svg", &data);
    timeline.settle(&mut scene);
    let subtree: Vec<NodeId> = scene.descendants(scene.root());
    assert_eq!(subtree.len(), 4);

    render(&mut scene, &mut timeline, "svg", &forest(Vec::new()));
    for node in &subtree {
        assert!(scene.binding(*node).unwrap().is_exiting());
        assert!(timeline.is_animating(*node));
    }

    timeline.advance(&mut scene, Duration::from_millis(50));
    let circle = scene.find_all("circle")[0];
    let rect = scene.find_all("rect")[0];
    assert_eq!(scene.attribute(circle, "r").as_deref(), Some("5"));
    assert_eq!(scene.attribute(rect, "width").as_deref(), Some("10"));

    timeline.settle(&mut scene);
    for node in &subtree {
        assert!(!scene.contains(*node));
    }
}

#[test]
fn test_exit_cascade_skips_unbound_nodes() {
    let (mut scene, mut timeline) = setup();
    let data = forest(vec![ElementDescriptor::new("g").duration(10).call(|scene, node| {
        let tick = scene.create_element(spark_render::Namespace::Svg, "line").unwrap();
        scene.append_child(node, tick).unwrap();
    })]);

    render(&mut scene, &mut timeline, "svg", &data);
    let line = scene.find_all("line")[0];
    render(&mut scene, &mut timeline, "svg", &forest(Vec::new()));

    assert!(!timeline.is_animating(line));
    timeline.settle(&mut scene);
    assert!(!scene.contains(line));
}

#[test]
fn test_reappearing_key_cancels_exit() {
    let (mut scene, mut timeline) = setup();
    let root = scene.root();
    let data = forest(vec![
        ElementDescriptor::new("rect")
            .key("a")
            .attr("width", StateValues::new().enter(10).exit(0))
            .duration(100)
            .child(ElementDescriptor::new("title").text("a").duration(100)),
    ]);

    render(&mut scene, &mut timeline, root, &data);
    timeline.settle(&mut scene);

    render(&mut scene, &mut timeline, root, &forest(Vec::new()));
    timeline.advance(&mut scene, Duration::from_millis(30));
    assert_eq!(scene.len(), 3);

    let fresh = render(&mut scene, &mut timeline, root, &data).first().unwrap();

    assert_eq!(scene.children(root), vec![fresh]);
    assert_eq!(scene.len(), 3);
    assert_eq!(scene.find_all("title").len(), 1);
    assert!(!scene.binding(fresh).unwrap().is_exiting());
    assert_eq!(scene.attribute(fresh, "width").as_deref(), Some("0"));

    timeline.settle(&mut scene);
    assert_eq!(scene.children(root), vec![fresh]);
    assert_eq!(scene.len(), 3);
    assert_eq!(scene.attribute(fresh, "width").as_deref(), Some("10"));
}

// =============================================================================
// Call hooks and signals
// =============================================================================

#[test]
fn test_call_runs_once_per_entering_node() {
    let (mut scene, mut timeline) = setup();
    let calls = Rc::new(Cell::new(0));
    let calls_clone = calls.clone();
    let data = forest(vec![ElementDescriptor::new("g").call(move |_, _| calls_clone.set(calls_clone.get() + 1))]);

    for _ in 0..3 {
        render(&mut scene, &mut timeline, "svg", &data);
    }
    assert_eq!(calls.get(), 1);

    render(&mut scene, &mut timeline, "svg", &forest(Vec::new()));
    timeline.settle(&mut scene);
    render(&mut scene, &mut timeline, "svg", &data);
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_signal_read_on_each_render() {
    let (mut scene, mut timeline) = setup();
    let width = signal(Value::from(10));
    let data = forest(vec![ElementDescriptor::new("rect").attr("width", width.clone())]);

    let rect = render(&mut scene, &mut timeline, "svg", &data).first().unwrap();
    assert_eq!(scene.attribute(rect, "width").as_deref(), Some("10"));

    width.set(Value::from(25));
    assert_eq!(scene.attribute(rect, "width").as_deref(), Some("10"));

    render(&mut scene, &mut timeline, "svg", &data);
    assert_eq!(scene.attribute(rect, "width").as_deref(), Some("25"));
}

#[test]
fn test_children_none_keeps_existing() {
    let (mut scene, mut timeline) = setup();
    let with_children =
        forest(vec![ElementDescriptor::new("g").key("g").child(ElementDescriptor::new("circle"))]);
    let without_children = forest(vec![ElementDescriptor::new("g").key("g")]);
    let emptied = forest(vec![ElementDescriptor::new("g").key("g").children(Vec::new())]);

    let g = render(&mut scene, &mut timeline, "svg", &with_children).first().unwrap();
    render(&mut scene, &mut timeline, "svg", &without_children);
    timeline.settle(&mut scene);
    assert_eq!(scene.children(g).len(), 1);

    render(&mut scene, &mut timeline, "svg", &emptied);
    timeline.settle(&mut scene);
    assert!(scene.children(g).is_empty());
}
