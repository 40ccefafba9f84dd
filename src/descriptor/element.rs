//! ElementDescriptor - the declarative unit.
//!
//! A descriptor names a tag, an optional identity key, content, inline
//! styles, timing, event handlers and attributes, plus nested children.
//!
//! ```ignore
//! use spark_render::{ElementDescriptor, StateValues};
//!
//! let bar = ElementDescriptor::new("rect")
//!     .key("bar-1")
//!     .attr("x", 10)
//!     .attr("height", StateValues::new().enter(40).exit(0))
//!     .style("fillOpacity", 0.5)
//!     .duration(300)
//!     .on("onClick", |_event, datum, index| println!("{} #{}", datum.tag, index));
//! ```

use std::fmt;
use std::rc::Rc;

use super::types::{CallHook, EaseValue, EventHandler, FieldValue};
use crate::host::Scene;
use crate::types::{Event, NodeId};

/// Field names with structural meaning. They are never applied as attributes.
///
/// `append` is accepted as an alias of `tag`.
pub const STRUCTURAL_FIELDS: [&str; 11] = [
    "tag", "append", "key", "children", "call", "text", "html", "style", "duration", "delay",
    "ease",
];

/// Whether `name` is one of [`STRUCTURAL_FIELDS`].
pub fn is_structural(name: &str) -> bool {
    STRUCTURAL_FIELDS.contains(&name)
}

/// A sparse list of descriptors. `None` entries are skipped by the reconciler.
pub type Forest = Vec<Option<Rc<ElementDescriptor>>>;

/// Build a forest from descriptors.
pub fn forest<I>(items: I) -> Forest
where
    I: IntoIterator<Item = ElementDescriptor>,
{
    items.into_iter().map(|d| Some(Rc::new(d))).collect()
}

/// Build a forest that may contain holes.
pub fn sparse_forest<I>(items: I) -> Forest
where
    I: IntoIterator<Item = Option<ElementDescriptor>>,
{
    items.into_iter().map(|d| d.map(Rc::new)).collect()
}

/// Declarative description of one desired element and its children.
#[derive(Clone, Default)]
pub struct ElementDescriptor {
    /// Element name to create.
    pub tag: String,
    /// Stable identity; the position in the filtered forest is used when absent.
    pub key: Option<String>,
    /// Nested descriptors. `None` leaves existing children alone.
    pub children: Option<Forest>,
    /// Text content (not animatable).
    pub text: Option<String>,
    /// Raw inner markup, set once when the node enters.
    pub html: Option<String>,
    /// Inline style declarations, in insertion order.
    pub style: Vec<(String, FieldValue)>,
    /// Invoked once per entering node.
    pub call: Option<CallHook>,
    /// Transition duration in milliseconds.
    pub duration: Option<FieldValue>,
    /// Transition delay in milliseconds.
    pub delay: Option<FieldValue>,
    /// Transition easing.
    pub ease: Option<EaseValue>,
    /// `on<Name>` handlers, keyed by field name.
    pub events: Vec<(String, EventHandler)>,
    /// All remaining fields.
    pub attributes: Vec<(String, FieldValue)>,
}

impl ElementDescriptor {
    /// Create a descriptor for `tag`.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Set the identity key.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add an attribute field.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Add an inline style field.
    pub fn style(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.style.push((name.into(), value.into()));
        self
    }

    /// Set text content.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set raw inner markup.
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Append one child.
    pub fn child(mut self, child: ElementDescriptor) -> Self {
        self.children
            .get_or_insert_with(Vec::new)
            .push(Some(Rc::new(child)));
        self
    }

    /// Replace the children with `children`.
    ///
    /// An empty iterator still sets `Some(vec![])`, which removes all existing
    /// children on the next render.
    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = ElementDescriptor>,
    {
        self.children = Some(forest(children));
        self
    }

    /// Replace the children with a forest that may contain holes.
    pub fn sparse_children(mut self, children: Forest) -> Self {
        self.children = Some(children);
        self
    }

    /// Set the escape-hatch hook run when the node enters.
    pub fn call(mut self, hook: impl Fn(&mut dyn Scene, NodeId) + 'static) -> Self {
        self.call = Some(Rc::new(hook));
        self
    }

    /// Set the transition duration (milliseconds).
    pub fn duration(mut self, duration: impl Into<FieldValue>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    /// Set the transition delay (milliseconds).
    pub fn delay(mut self, delay: impl Into<FieldValue>) -> Self {
        self.delay = Some(delay.into());
        self
    }

    /// Set the transition easing.
    pub fn ease(mut self, ease: impl Into<EaseValue>) -> Self {
        self.ease = Some(ease.into());
        self
    }

    /// Add an event handler under an `on<Name>` field name, e.g. `onClick`.
    ///
    /// The field must start with the renderer's event prefix (`on` unless
    /// configured otherwise); handlers under other names are skipped with a
    /// warning when the node is bound.
    pub fn on(
        mut self,
        field: impl Into<String>,
        handler: impl Fn(&Event, &ElementDescriptor, usize) + 'static,
    ) -> Self {
        let field = field.into();
        let handler: EventHandler = Rc::new(handler);
        match self.events.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = handler,
            None => self.events.push((field, handler)),
        }
        self
    }

    /// Look up an attribute field by name (last one wins, like repeated keys).
    pub fn attribute(&self, name: &str) -> Option<&FieldValue> {
        self.attributes
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

impl fmt::Debug for ElementDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementDescriptor")
            .field("tag", &self.tag)
            .field("key", &self.key)
            .field("attributes", &self.attributes)
            .field("style", &self.style)
            .field("text", &self.text)
            .field("html", &self.html)
            .field("events", &self.events.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .field("children", &self.children.as_ref().map(Vec::len))
            .finish_non_exhaustive()
    }
}
