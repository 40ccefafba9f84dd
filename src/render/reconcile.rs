//! Tree reconciliation - keyed matching of a descriptor forest against the
//! bound direct children of a parent node.
//!
//! One frame of reconciliation:
//! 1. Filter `None` entries out of the forest.
//! 2. Build the matching pool from the parent's children that carry a
//!    [`Binding`] (nodes a `call` hook appended are left alone).
//! 3. Match each descriptor by [`MatchKey`]: unmatched descriptors enter,
//!    matched ones update, unmatched pool nodes exit.
//! 4. Put entering and updating nodes in forest order.
//!
//! Entering and updating nodes recurse into their descriptor's `children`.
//! Exiting nodes cascade exit transitions through their bound descendants
//! before their own exit is scheduled.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::descriptor::{ElementDescriptor, Forest};
use crate::host::{Binding, MatchKey, Scene, Scheduler};
use crate::types::{BindingFlags, LifecycleState, NodeId};

use super::RenderConfig;
use super::apply::apply;
use super::events;
use super::namespace::namespace_for;
use super::transition::transition;

// =============================================================================
// Reconciler
// =============================================================================

/// Drives one render pass against a scene and scheduler.
pub struct Reconciler<'a> {
    scene: &'a mut dyn Scene,
    scheduler: &'a mut dyn Scheduler,
    config: &'a RenderConfig,
}

/// Reconcile `forest` against the bound children of `parent`.
///
/// Returns the entering and updating nodes in forest order. `None` leaves
/// the children untouched and returns nothing.
pub fn reconcile(
    scene: &mut dyn Scene,
    scheduler: &mut dyn Scheduler,
    config: &RenderConfig,
    parent: NodeId,
    forest: Option<&Forest>,
) -> Vec<NodeId> {
    Reconciler::new(scene, scheduler, config).reconcile(parent, forest)
}

impl<'a> Reconciler<'a> {
    pub fn new(
        scene: &'a mut dyn Scene,
        scheduler: &'a mut dyn Scheduler,
        config: &'a RenderConfig,
    ) -> Self {
        Self {
            scene,
            scheduler,
            config,
        }
    }

    /// One reconciliation frame, recursing into matched children.
    pub fn reconcile(&mut self, parent: NodeId, forest: Option<&Forest>) -> Vec<NodeId> {
        let Some(forest) = forest else {
            return Vec::new();
        };
        let data: Vec<Rc<ElementDescriptor>> = forest.iter().flatten().cloned().collect();

        let mut pool = self.matching_pool(parent);
        let mut seen = HashSet::new();
        let mut placed = Vec::with_capacity(data.len());
        let (mut entered, mut updated) = (0usize, 0usize);

        for (index, datum) in data.iter().enumerate() {
            let key = MatchKey::for_descriptor(datum, index);
            let existing = if seen.insert(key.clone()) {
                pool.remove(&key)
            } else {
                tracing::warn!(%parent, %key, "duplicate key in forest; entering as a new node");
                None
            };

            let node = match existing {
                Some((node, binding)) if !binding.is_exiting() => {
                    self.update(node, &binding, datum, index);
                    updated += 1;
                    Some(node)
                }
                Some((node, _)) => {
                    self.cancel_exit(node);
                    entered += 1;
                    self.enter(parent, datum, index)
                }
                None => {
                    entered += 1;
                    self.enter(parent, datum, index)
                }
            };
            placed.extend(node);
        }

        let positions = self.positions(parent);
        let mut leaving: Vec<(NodeId, Binding)> = pool.into_values().collect();
        leaving.sort_by_key(|(node, _)| positions.get(node).copied().unwrap_or(usize::MAX));
        let mut exited = 0usize;
        for (node, binding) in leaving {
            if binding.is_exiting() {
                continue;
            }
            self.exit(node, binding);
            exited += 1;
        }

        if self.config.order_children {
            self.order(parent, &placed);
        }

        tracing::debug!(%parent, entered, updated, exited, "reconciled children");
        placed
    }

    // =========================================================================
    // Matching
    // =========================================================================

    /// Bound children of `parent`, keyed by match key.
    ///
    /// Later nodes with an already seen key are not matchable. Active ones
    /// exit right away; ones already exiting are left to finish.
    fn matching_pool(&mut self, parent: NodeId) -> HashMap<MatchKey, (NodeId, Binding)> {
        let mut pool = HashMap::new();
        let mut duplicates = Vec::new();

        for child in self.scene.children(parent) {
            let Some(binding) = self.scene.binding(child) else {
                continue;
            };
            if pool.contains_key(&binding.key) {
                tracing::warn!(%parent, key = %binding.key, node = %child, "duplicate key among children");
                duplicates.push((child, binding));
                continue;
            }
            pool.insert(binding.key.clone(), (child, binding));
        }

        for (node, binding) in duplicates {
            if !binding.is_exiting() {
                self.exit(node, binding);
            }
        }
        pool
    }

    // =========================================================================
    // Enter / Update / Exit
    // =========================================================================

    fn enter(&mut self, parent: NodeId, datum: &Rc<ElementDescriptor>, index: usize) -> Option<NodeId> {
        let namespace = namespace_for(&datum.tag, self.config.default_namespace);
        let node = match self.scene.create_element(namespace, &datum.tag) {
            Ok(node) => node,
            Err(err) => {
                tracing::warn!(%parent, tag = %datum.tag, error = %err, "descriptor skipped");
                return None;
            }
        };
        if let Err(err) = self.scene.append_child(parent, node) {
            tracing::warn!(%parent, %node, error = %err, "entering node not attached");
            if let Err(err) = self.scene.remove(node) {
                tracing::warn!(%node, error = %err, "unattached node not released");
            }
            return None;
        }
        let binding = Binding::new(datum.clone(), index);
        tracing::trace!(%parent, %node, tag = %datum.tag, key = %binding.key, "enter");
        self.store(node, binding);

        if let Some(call) = &datum.call {
            call(&mut *self.scene, node);
        }
        let config = self.config;
        let prefix = config.event_prefix.as_str();
        apply(&mut *self.scene, node, datum, index, LifecycleState::Start, prefix);
        let listening = events::bind(&mut *self.scene, node, datum, index, None, prefix);
        self.set_listening(node, listening);
        transition(
            &mut *self.scene,
            &mut *self.scheduler,
            node,
            datum,
            index,
            LifecycleState::Enter,
            prefix,
        );

        self.reconcile(node, datum.children.as_ref());
        Some(node)
    }

    fn update(&mut self, node: NodeId, previous: &Binding, datum: &Rc<ElementDescriptor>, index: usize) {
        tracing::trace!(%node, tag = %datum.tag, key = %previous.key, "update");
        let mut binding = Binding::new(datum.clone(), index);
        binding.flags = previous.flags;
        self.store(node, binding);

        let config = self.config;
        let prefix = config.event_prefix.as_str();
        // Only a node that had listeners can hold stale ones
        let stale = previous
            .flags
            .contains(BindingFlags::LISTENING)
            .then_some(previous.descriptor.as_ref());
        let listening = events::bind(&mut *self.scene, node, datum, index, stale, prefix);
        self.set_listening(node, listening);
        transition(
            &mut *self.scene,
            &mut *self.scheduler,
            node,
            datum,
            index,
            LifecycleState::Update,
            prefix,
        );

        self.reconcile(node, datum.children.as_ref());
    }

    /// Exit `node` and every bound descendant, descendants first.
    fn exit(&mut self, node: NodeId, binding: Binding) {
        tracing::trace!(%node, key = %binding.key, "exit");
        self.mark_exiting(node, binding.clone());

        let config = self.config;
        let prefix = config.event_prefix.as_str();
        for descendant in self.scene.descendants(node) {
            let Some(inner) = self.scene.binding(descendant) else {
                continue;
            };
            if inner.is_exiting() {
                continue;
            }
            self.mark_exiting(descendant, inner.clone());
            transition(
                &mut *self.scene,
                &mut *self.scheduler,
                descendant,
                &inner.descriptor,
                inner.index,
                LifecycleState::Exit,
                prefix,
            );
        }

        transition(
            &mut *self.scene,
            &mut *self.scheduler,
            node,
            &binding.descriptor,
            binding.index,
            LifecycleState::Exit,
            prefix,
        );
    }

    /// Stop an exit in flight and detach the node right away.
    fn cancel_exit(&mut self, node: NodeId) {
        tracing::trace!(%node, "exit cancelled by reappearing key");
        self.scheduler.interrupt(node);
        for descendant in self.scene.descendants(node) {
            self.scheduler.interrupt(descendant);
        }
        if let Err(err) = self.scene.remove(node) {
            tracing::warn!(%node, error = %err, "exiting node not detached");
        }
    }

    // =========================================================================
    // Bindings
    // =========================================================================

    fn store(&mut self, node: NodeId, binding: Binding) {
        if let Err(err) = self.scene.set_binding(node, Some(binding)) {
            tracing::warn!(%node, error = %err, "binding not stored");
        }
    }

    fn mark_exiting(&mut self, node: NodeId, mut binding: Binding) {
        binding.flags.insert(BindingFlags::EXITING);
        self.store(node, binding);
    }

    fn set_listening(&mut self, node: NodeId, listening: bool) {
        let Some(mut binding) = self.scene.binding(node) else {
            return;
        };
        binding.flags.set(BindingFlags::LISTENING, listening);
        self.store(node, binding);
    }

    // =========================================================================
    // Ordering
    // =========================================================================

    /// Move `nodes` into document order among the children of `parent`.
    ///
    /// Walks backwards so every node only has to precede its successor.
    /// Nodes not in `nodes` keep their relative positions.
    fn order(&mut self, parent: NodeId, nodes: &[NodeId]) {
        let mut positions = self.positions(parent);
        let mut next: Option<NodeId> = None;

        for &node in nodes.iter().rev() {
            if let Some(successor) = next {
                let in_order = matches!(
                    (positions.get(&node), positions.get(&successor)),
                    (Some(a), Some(b)) if a < b
                );
                if !in_order {
                    match self.scene.insert_before(parent, node, Some(successor)) {
                        Ok(()) => {
                            tracing::trace!(%parent, %node, before = %successor, "reordered");
                            positions = self.positions(parent);
                        }
                        Err(err) => tracing::warn!(%parent, %node, error = %err, "node not reordered"),
                    }
                }
            }
            next = Some(node);
        }
    }

    fn positions(&self, parent: NodeId) -> HashMap<NodeId, usize> {
        self.scene
            .children(parent)
            .into_iter()
            .enumerate()
            .map(|(i, node)| (node, i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animate::Timeline;
    use crate::descriptor::{StateValues, forest};
    use crate::engine::Scene as MemoryScene;
    use std::cell::Cell;

    fn setup() -> (MemoryScene, Timeline, RenderConfig) {
        (MemoryScene::new("svg"), Timeline::new(), RenderConfig::default())
    }

    fn keyed(keys: &[&str]) -> Forest {
        forest(keys.iter().map(|k| ElementDescriptor::new("rect").key(*k).attr("id", *k)))
    }

    fn ids(scene: &MemoryScene, parent: NodeId) -> Vec<String> {
        scene
            .children(parent)
            .into_iter()
            .filter_map(|n| scene.attribute(n, "id"))
            .collect()
    }

    #[test]
    fn test_none_forest_is_noop() {
        let (mut scene, mut timeline, config) = setup();
        let root = scene.root();
        reconcile(&mut scene, &mut timeline, &config, root, Some(&keyed(&["a"])));

        let placed = reconcile(&mut scene, &mut timeline, &config, root, None);
        assert!(placed.is_empty());
        assert_eq!(scene.children(root).len(), 1);
    }

    #[test]
    fn test_holes_are_filtered_before_indexing() {
        let (mut scene, mut timeline, config) = setup();
        let root = scene.root();
        let forest = crate::descriptor::sparse_forest(vec![
            None,
            Some(ElementDescriptor::new("circle")),
            None,
        ]);

        let placed = reconcile(&mut scene, &mut timeline, &config, root, Some(&forest));

        assert_eq!(placed.len(), 1);
        assert_eq!(scene.binding(placed[0]).map(|b| b.key), Some(MatchKey::Index(0)));
    }

    #[test]
    fn test_matching_reuses_nodes() {
        let (mut scene, mut timeline, config) = setup();
        let root = scene.root();

        let first = reconcile(&mut scene, &mut timeline, &config, root, Some(&keyed(&["a", "b"])));
        let second = reconcile(&mut scene, &mut timeline, &config, root, Some(&keyed(&["a", "b"])));

        assert_eq!(first, second);
        assert_eq!(scene.children(root).len(), 2);
    }

    #[test]
    fn test_reorder_follows_forest() {
        let (mut scene, mut timeline, config) = setup();
        let root = scene.root();

        reconcile(&mut scene, &mut timeline, &config, root, Some(&keyed(&["a", "b", "c"])));
        reconcile(&mut scene, &mut timeline, &config, root, Some(&keyed(&["c", "a", "b"])));

        assert_eq!(ids(&scene, root), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_unordered_config_keeps_positions() {
        let (mut scene, mut timeline, _) = setup();
        let config = RenderConfig::default().order_children(false);
        let root = scene.root();

        reconcile(&mut scene, &mut timeline, &config, root, Some(&keyed(&["a", "b"])));
        reconcile(&mut scene, &mut timeline, &config, root, Some(&keyed(&["b", "a"])));

        assert_eq!(ids(&scene, root), vec!["a", "b"]);
    }

    #[test]
    fn test_unbound_children_are_ignored() {
        let (mut scene, mut timeline, config) = setup();
        let root = scene.root();
        let foreign = scene.create_element(crate::types::Namespace::Svg, "line").unwrap();
        scene.append_child(root, foreign).unwrap();

        reconcile(&mut scene, &mut timeline, &config, root, Some(&Vec::new()));
        timeline.settle(&mut scene);

        assert!(scene.contains(foreign));
    }

    #[test]
    fn test_duplicate_forest_keys_enter_separately() {
        let (mut scene, mut timeline, config) = setup();
        let root = scene.root();

        let placed = reconcile(&mut scene, &mut timeline, &config, root, Some(&keyed(&["a", "a"])));
        assert_eq!(placed.len(), 2);
        assert_ne!(placed[0], placed[1]);

        let again = reconcile(&mut scene, &mut timeline, &config, root, Some(&keyed(&["a"])));
        timeline.settle(&mut scene);
        assert_eq!(again, vec![placed[0]]);
        assert_eq!(scene.children(root), vec![placed[0]]);
    }

    #[test]
    fn test_empty_tag_is_skipped() {
        let (mut scene, mut timeline, config) = setup();
        let root = scene.root();
        let forest = forest(vec![ElementDescriptor::new(""), ElementDescriptor::new("rect")]);

        let placed = reconcile(&mut scene, &mut timeline, &config, root, Some(&forest));

        assert_eq!(placed.len(), 1);
        assert_eq!(scene.tag(placed[0]).as_deref(), Some("rect"));
    }

    #[test]
    fn test_start_values_precede_enter() {
        let (mut scene, mut timeline, config) = setup();
        let root = scene.root();
        let forest = forest(vec![
            ElementDescriptor::new("rect")
                .attr("width", StateValues::new().enter(100).exit(0))
                .duration(200),
        ]);

        let placed = reconcile(&mut scene, &mut timeline, &config, root, Some(&forest));
        assert_eq!(scene.attribute(placed[0], "width").as_deref(), Some("0"));

        timeline.settle(&mut scene);
        assert_eq!(scene.attribute(placed[0], "width").as_deref(), Some("100"));
    }

    #[test]
    fn test_call_hook_runs_before_start_values() {
        let (mut scene, mut timeline, config) = setup();
        let root = scene.root();
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        let forest = forest(vec![ElementDescriptor::new("g").attr("x", 1).call(move |scene, node| {
            calls_clone.set(calls_clone.get() + 1);
            assert!(scene.attribute(node, "x").is_none());
            scene.set_attribute(node, "x", Some("99")).unwrap();
        })]);

        let placed = reconcile(&mut scene, &mut timeline, &config, root, Some(&forest));
        reconcile(&mut scene, &mut timeline, &config, root, Some(&forest));

        assert_eq!(calls.get(), 1);
        assert_eq!(scene.attribute(placed[0], "x").as_deref(), Some("1"));
    }

    #[test]
    fn test_update_rebinds_descriptor() {
        let (mut scene, mut timeline, config) = setup();
        let root = scene.root();
        let placed = reconcile(&mut scene, &mut timeline, &config, root, Some(&keyed(&["a"])));

        let next = forest(vec![ElementDescriptor::new("rect").key("a").attr("id", "renamed")]);
        reconcile(&mut scene, &mut timeline, &config, root, Some(&next));

        let binding = scene.binding(placed[0]).unwrap();
        assert_eq!(binding.descriptor.tag, "rect");
        assert_eq!(scene.attribute(placed[0], "id").as_deref(), Some("renamed"));
        assert!(!binding.is_exiting());
    }

    #[test]
    fn test_listening_flag_tracks_handlers() {
        let (mut scene, mut timeline, config) = setup();
        let root = scene.root();
        let with_handler = forest(vec![ElementDescriptor::new("rect").key("a").on("onClick", |_, _, _| {})]);
        let without_handler = forest(vec![ElementDescriptor::new("rect").key("a")]);

        let placed = reconcile(&mut scene, &mut timeline, &config, root, Some(&with_handler));
        let rect = placed[0];
        assert!(scene.binding(rect).unwrap().flags.contains(BindingFlags::LISTENING));
        assert_eq!(scene.listener_count(rect), 1);

        reconcile(&mut scene, &mut timeline, &config, root, Some(&without_handler));
        assert!(!scene.binding(rect).unwrap().flags.contains(BindingFlags::LISTENING));
        assert_eq!(scene.listener_count(rect), 0);

        reconcile(&mut scene, &mut timeline, &config, root, Some(&with_handler));
        assert!(scene.binding(rect).unwrap().flags.contains(BindingFlags::LISTENING));
        assert_eq!(scene.listener_count(rect), 1);
    }

    #[test]
    fn test_unattachable_node_is_released() {
        let (mut scene, mut timeline, config) = setup();
        let missing = NodeId(99);

        let placed = reconcile(&mut scene, &mut timeline, &config, missing, Some(&keyed(&["a", "b"])));

        assert!(placed.is_empty());
        assert_eq!(scene.len(), 1);
        assert!(scene.find_all("rect").is_empty());
    }

    #[test]
    fn test_exit_marks_before_detach() {
        let (mut scene, mut timeline, config) = setup();
        let root = scene.root();
        let node_forest = forest(vec![ElementDescriptor::new("rect").duration(100)]);
        let placed = reconcile(&mut scene, &mut timeline, &config, root, Some(&node_forest));
        timeline.settle(&mut scene);

        reconcile(&mut scene, &mut timeline, &config, root, Some(&Vec::new()));

        assert!(scene.contains(placed[0]));
        assert!(scene.binding(placed[0]).unwrap().is_exiting());
        timeline.settle(&mut scene);
        assert!(!scene.contains(placed[0]));
    }
}
