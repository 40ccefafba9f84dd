//! Render - the declarative entry point.
//!
//! `render` resolves an [`Anchor`] to parent nodes and reconciles a
//! descriptor forest under each of them:
//!
//! ```ignore
//! use spark_render::{render, forest, ElementDescriptor, StateValues};
//! use spark_render::{engine::Scene, animate::Timeline};
//!
//! let mut scene = Scene::new("svg");
//! let mut timeline = Timeline::new();
//!
//! let bars = forest((0..3).map(|i| {
//!     ElementDescriptor::new("rect")
//!         .key(format!("bar-{i}"))
//!         .attr("x", i * 20)
//!         .attr("height", StateValues::new().enter(40).exit(0))
//!         .duration(300)
//! }));
//!
//! let selection = render(&mut scene, &mut timeline, "svg", &bars);
//! assert_eq!(selection.len(), 3);
//! ```
//!
//! Module layout:
//! - `resolve` - per-state value resolution
//! - `apply` - attribute, style and content application
//! - `events` - `on<Name>` listener binding
//! - `transition` - timing and scheduler hand-off
//! - `namespace` - tag → namespace table
//! - `reconcile` - keyed matching and recursion

pub mod apply;
pub mod events;
pub mod namespace;
pub mod reconcile;
pub mod resolve;
pub mod transition;

pub use reconcile::{Reconciler, reconcile};

use crate::descriptor::Forest;
use crate::host::{Scene, Scheduler};
use crate::types::{Namespace, NodeId, Value};

// =============================================================================
// Configuration
// =============================================================================

/// Options shared by every reconciliation frame of a render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Field-name prefix marking event handlers (`on` → `onClick`).
    pub event_prefix: String,
    /// Namespace for tags not listed in the HTML table.
    pub default_namespace: Namespace,
    /// Move entering and updating nodes into forest order.
    pub order_children: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            event_prefix: "on".to_string(),
            default_namespace: Namespace::Svg,
            order_children: true,
        }
    }
}

impl RenderConfig {
    pub fn event_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.event_prefix = prefix.into();
        self
    }

    pub fn default_namespace(mut self, namespace: Namespace) -> Self {
        self.default_namespace = namespace;
        self
    }

    pub fn order_children(mut self, order: bool) -> Self {
        self.order_children = order;
        self
    }
}

// =============================================================================
// Anchor
// =============================================================================

/// Where a forest is rendered: a selector or explicit nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Anchor {
    /// Resolved with [`Scene::select`] (first match only).
    Selector(String),
    /// Explicit parent nodes.
    Nodes(Vec<NodeId>),
}

impl Anchor {
    /// Parent nodes this anchor refers to right now.
    pub fn resolve(&self, scene: &dyn Scene) -> Vec<NodeId> {
        match self {
            Anchor::Selector(selector) => scene.select(selector).into_iter().collect(),
            Anchor::Nodes(nodes) => nodes.iter().copied().filter(|n| scene.contains(*n)).collect(),
        }
    }
}

impl From<&str> for Anchor {
    fn from(selector: &str) -> Self {
        Anchor::Selector(selector.to_string())
    }
}

impl From<String> for Anchor {
    fn from(selector: String) -> Self {
        Anchor::Selector(selector)
    }
}

impl From<NodeId> for Anchor {
    fn from(node: NodeId) -> Self {
        Anchor::Nodes(vec![node])
    }
}

impl From<Vec<NodeId>> for Anchor {
    fn from(nodes: Vec<NodeId>) -> Self {
        Anchor::Nodes(nodes)
    }
}

impl From<&Selection> for Anchor {
    fn from(selection: &Selection) -> Self {
        Anchor::Nodes(selection.nodes.clone())
    }
}

// =============================================================================
// Selection
// =============================================================================

/// Nodes produced by a render: top-level entering and updating nodes in
/// forest order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    nodes: Vec<NodeId>,
}

impl Selection {
    pub fn new(nodes: Vec<NodeId>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn first(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    /// Set an attribute on every node, bypassing the descriptor.
    pub fn attr(&self, scene: &mut dyn Scene, name: &str, value: impl Into<Value>) -> &Self {
        let value = value.into().to_string();
        for node in self.iter() {
            if let Err(err) = scene.set_attribute(node, name, Some(&value)) {
                tracing::warn!(%node, attribute = name, error = %err, "selection attribute not set");
            }
        }
        self
    }

    /// Set an inline style on every node.
    pub fn style(&self, scene: &mut dyn Scene, name: &str, value: impl Into<Value>) -> &Self {
        let value = value.into().to_string();
        for node in self.iter() {
            if let Err(err) = scene.set_style(node, name, Some(&value)) {
                tracing::warn!(%node, style = name, error = %err, "selection style not set");
            }
        }
        self
    }

    /// Replace the text content of every node.
    pub fn text(&self, scene: &mut dyn Scene, text: &str) -> &Self {
        for node in self.iter() {
            if let Err(err) = scene.set_text(node, text) {
                tracing::warn!(%node, error = %err, "selection text not set");
            }
        }
        self
    }
}

impl<'s> IntoIterator for &'s Selection {
    type Item = NodeId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'s, NodeId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter().copied()
    }
}

// =============================================================================
// Renderer
// =============================================================================

/// Renders descriptor forests with a fixed [`RenderConfig`].
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Reconcile `forest` under every node of `anchor`.
    ///
    /// `None` leaves the scene untouched. An anchor matching nothing yields
    /// an empty selection.
    pub fn render<'f>(
        &self,
        scene: &mut dyn Scene,
        scheduler: &mut dyn Scheduler,
        anchor: impl Into<Anchor>,
        forest: impl Into<Option<&'f Forest>>,
    ) -> Selection {
        let anchor = anchor.into();
        let Some(forest) = forest.into() else {
            return Selection::default();
        };

        let parents = anchor.resolve(&*scene);
        if parents.is_empty() {
            tracing::debug!(?anchor, "anchor matched no nodes");
            return Selection::default();
        }

        let mut reconciler = Reconciler::new(scene, scheduler, &self.config);
        let nodes = parents
            .into_iter()
            .flat_map(|parent| reconciler.reconcile(parent, Some(forest)))
            .collect();
        Selection::new(nodes)
    }
}

/// Render with the default configuration.
pub fn render<'f>(
    scene: &mut dyn Scene,
    scheduler: &mut dyn Scheduler,
    anchor: impl Into<Anchor>,
    forest: impl Into<Option<&'f Forest>>,
) -> Selection {
    Renderer::default().render(scene, scheduler, anchor, forest)
}
