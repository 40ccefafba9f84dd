//! In-memory scene graph.
//!
//! Nodes live in a [`Registry`] arena and link to each other by [`NodeId`].
//! Text and inner markup are stored beside the element children rather than
//! replacing them, so a node can carry both a label and nested elements.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::error::{HostError, HostResult};
use crate::host::{Binding, Listener, Scene as SceneHost};
use crate::render::namespace::namespace_for;
use crate::types::{Event, Namespace, NodeId};

use super::registry::Registry;
use super::selector::Selector;

// =============================================================================
// Node Data
// =============================================================================

#[derive(Default)]
struct NodeData {
    tag: String,
    namespace: Namespace,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: Vec<(String, String)>,
    styles: Vec<(String, String)>,
    text: Option<String>,
    html: Option<String>,
    listeners: HashMap<String, Listener>,
    binding: Option<Binding>,
}

impl NodeData {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

fn set_entry(entries: &mut Vec<(String, String)>, name: &str, value: Option<&str>) {
    let position = entries.iter().position(|(n, _)| n == name);
    match (position, value) {
        (Some(i), Some(value)) => entries[i].1 = value.to_string(),
        (None, Some(value)) => entries.push((name.to_string(), value.to_string())),
        (Some(i), None) => {
            entries.remove(i);
        }
        (None, None) => {}
    }
}

fn check_name(name: &str) -> HostResult<()> {
    if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c == '<' || c == '>') {
        return Err(HostError::InvalidName(name.to_string()));
    }
    Ok(())
}

// =============================================================================
// Scene
// =============================================================================

/// Headless scene graph with a single root.
pub struct Scene {
    nodes: Registry<NodeData>,
    root: NodeId,
}

impl Scene {
    /// Create a scene whose root element is `root_tag` (e.g. `svg` or `body`).
    pub fn new(root_tag: &str) -> Self {
        let mut nodes = Registry::new();
        let root = NodeId(nodes.allocate(NodeData {
            tag: root_tag.to_string(),
            namespace: namespace_for(root_tag, Namespace::Svg),
            ..Default::default()
        }));
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, node: NodeId) -> HostResult<&NodeData> {
        self.nodes.get(node.index()).ok_or(HostError::UnknownNode(node))
    }

    fn node_mut(&mut self, node: NodeId) -> HostResult<&mut NodeData> {
        self.nodes
            .get_mut(node.index())
            .ok_or(HostError::UnknownNode(node))
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.nodes.get(node.index()).map(|n| n.tag.clone())
    }

    pub fn namespace(&self, node: NodeId) -> Option<Namespace> {
        self.nodes.get(node.index()).map(|n| n.namespace)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.index())?.parent
    }

    pub fn text(&self, node: NodeId) -> Option<String> {
        self.nodes.get(node.index())?.text.clone()
    }

    pub fn html(&self, node: NodeId) -> Option<String> {
        self.nodes.get(node.index())?.html.clone()
    }

    /// Attributes in the order they were first set.
    pub fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        self.nodes
            .get(node.index())
            .map(|n| n.attributes.clone())
            .unwrap_or_default()
    }

    /// Inline styles serialized like a `style` attribute:
    /// `"stroke: black; fill-opacity: 0.5;"`.
    pub fn style_text(&self, node: NodeId) -> Option<String> {
        let data = self.nodes.get(node.index())?;
        if data.styles.is_empty() {
            return None;
        }
        let parts: Vec<String> = data
            .styles
            .iter()
            .map(|(name, value)| format!("{}: {};", name, value))
            .collect();
        Some(parts.join(" "))
    }

    pub fn listener_count(&self, node: NodeId) -> usize {
        self.nodes
            .get(node.index())
            .map_or(0, |n| n.listeners.len())
    }

    /// Number of live nodes, attached or not (the root included).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `node` is reachable from the root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.root {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Every attached node with tag `tag`, in document order.
    pub fn find_all(&self, tag: &str) -> Vec<NodeId> {
        self.attached()
            .into_iter()
            .filter(|n| self.nodes.get(n.index()).is_some_and(|d| d.tag == tag))
            .collect()
    }

    /// Every attached node matching `selector`, in document order.
    pub fn select_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(selector) = Selector::parse(selector) else {
            tracing::debug!(selector, "unsupported selector");
            return Vec::new();
        };
        self.attached()
            .into_iter()
            .filter(|n| self.matches(*n, &selector))
            .collect()
    }

    fn attached(&self) -> Vec<NodeId> {
        let mut nodes = vec![self.root];
        nodes.extend(self.descendants(self.root));
        nodes
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        match self.nodes.get(node.index()) {
            Some(data) => selector.matches(&data.tag, |name| data.attribute(name)),
            None => false,
        }
    }

    /// Markup for `node` and its subtree.
    ///
    /// Attributes keep insertion order; inline styles are emitted as a
    /// `style` attribute; text precedes child elements.
    pub fn markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(node, &mut out);
        out
    }

    fn write_markup(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(node.index()) else {
            return;
        };
        let _ = write!(out, "<{}", data.tag);
        for (name, value) in &data.attributes {
            let _ = write!(out, " {}=\"{}\"", name, value.replace('"', "&quot;"));
        }
        if let Some(style) = self.style_text(node) {
            let _ = write!(out, " style=\"{}\"", style);
        }
        out.push('>');
        if let Some(text) = &data.text {
            out.push_str(text);
        }
        if let Some(html) = &data.html {
            out.push_str(html);
        }
        for child in &data.children {
            self.write_markup(*child, out);
        }
        let _ = write!(out, "</{}>", data.tag);
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Deliver `event` to the listener registered for `event.name` on
    /// `event.target`. Returns whether a listener ran.
    pub fn dispatch(&self, event: &Event) -> bool {
        let listener = self
            .nodes
            .get(event.target.index())
            .and_then(|n| n.listeners.get(&event.name))
            .cloned();
        match listener {
            Some(listener) => {
                tracing::trace!(node = %event.target, event = %event.name, "dispatch");
                listener(event);
                true
            }
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // Tree edits
    // -------------------------------------------------------------------------

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        if let Some(data) = self.nodes.get_mut(parent.index()) {
            data.children.retain(|c| *c != node);
        }
        if let Some(data) = self.nodes.get_mut(node.index()) {
            data.parent = None;
        }
    }

    fn release(&mut self, node: NodeId) {
        if let Some(data) = self.nodes.release(node.index()) {
            for child in data.children {
                self.release(child);
            }
        }
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }
}

impl SceneHost for Scene {
    fn select(&self, selector: &str) -> Option<NodeId> {
        self.select_all(selector).into_iter().next()
    }

    fn create_element(&mut self, namespace: Namespace, tag: &str) -> HostResult<NodeId> {
        check_name(tag)?;
        let node = NodeId(self.nodes.allocate(NodeData {
            tag: tag.to_string(),
            namespace,
            ..Default::default()
        }));
        Ok(node)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> HostResult<()> {
        self.insert_before(parent, child, None)
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> HostResult<()> {
        self.node(parent)?;
        self.node(child)?;
        if child == self.root || self.is_ancestor(child, parent) {
            return Err(HostError::HierarchyRequest { parent, child });
        }
        if let Some(before) = before {
            if self.node(before)?.parent != Some(parent) {
                return Err(HostError::Detached(before));
            }
            if before == child {
                return Ok(());
            }
        }

        self.detach(child);
        let data = self.node_mut(parent)?;
        let position = before
            .and_then(|b| data.children.iter().position(|c| *c == b))
            .unwrap_or(data.children.len());
        data.children.insert(position, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn children(&self, parent: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(parent.index())
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = &self.nodes.get(parent.index())?.children;
        let position = siblings.iter().position(|c| *c == node)?;
        siblings.get(position + 1).copied()
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes.is_allocated(node.index())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes
            .get(node.index())?
            .attribute(name)
            .map(str::to_string)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: Option<&str>) -> HostResult<()> {
        check_name(name)?;
        set_entry(&mut self.node_mut(node)?.attributes, name, value);
        Ok(())
    }

    fn style(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes
            .get(node.index())?
            .styles
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn set_style(&mut self, node: NodeId, name: &str, value: Option<&str>) -> HostResult<()> {
        check_name(name)?;
        set_entry(&mut self.node_mut(node)?.styles, name, value);
        Ok(())
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> HostResult<()> {
        self.node_mut(node)?.text = Some(text.to_string());
        Ok(())
    }

    fn set_html(&mut self, node: NodeId, html: &str) -> HostResult<()> {
        self.node_mut(node)?.html = Some(html.to_string());
        Ok(())
    }

    fn set_listener(
        &mut self,
        node: NodeId,
        event: &str,
        listener: Option<Listener>,
    ) -> HostResult<()> {
        check_name(event)?;
        let listeners = &mut self.node_mut(node)?.listeners;
        match listener {
            Some(listener) => {
                listeners.insert(event.to_string(), listener);
            }
            None => {
                listeners.remove(event);
            }
        }
        Ok(())
    }

    fn remove(&mut self, node: NodeId) -> HostResult<()> {
        self.node(node)?;
        if node == self.root {
            return Err(HostError::HierarchyRequest {
                parent: node,
                child: node,
            });
        }
        self.detach(node);
        self.release(node);
        Ok(())
    }

    fn binding(&self, node: NodeId) -> Option<Binding> {
        self.nodes.get(node.index())?.binding.clone()
    }

    fn set_binding(&mut self, node: NodeId, binding: Option<Binding>) -> HostResult<()> {
        self.node_mut(node)?.binding = binding;
        Ok(())
    }
}
