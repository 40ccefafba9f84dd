//! Event binding for `on<Name>` fields.
//!
//! `onClick` becomes a `click` listener, `onMouseOver` a `mouseover`
//! listener. Hosts keep one listener per event name, so binding the same
//! field again replaces the old listener instead of stacking a second one.

use std::collections::HashSet;
use std::rc::Rc;

use crate::descriptor::ElementDescriptor;
use crate::host::{Listener, Scene};
use crate::types::{Event, NodeId};

/// Event name for an event field: prefix stripped, remainder lower-cased.
///
/// Returns `None` for fields without the prefix or with nothing after it.
pub fn event_name(field: &str, prefix: &str) -> Option<String> {
    let rest = field.strip_prefix(prefix)?;
    if rest.is_empty() {
        return None;
    }
    Some(rest.to_lowercase())
}

/// Attach the event fields of `datum` as listeners on `node`.
///
/// Each listener calls `handler(event, datum, index)`. Listeners bound for
/// `previous` whose field no longer exists are cleared. Returns whether any
/// listener is now attached.
pub fn bind(
    scene: &mut dyn Scene,
    node: NodeId,
    datum: &Rc<ElementDescriptor>,
    index: usize,
    previous: Option<&ElementDescriptor>,
    prefix: &str,
) -> bool {
    let mut bound = HashSet::new();

    for (field, handler) in &datum.events {
        let Some(name) = event_name(field, prefix) else {
            tracing::warn!(%node, %field, %prefix, "handler field lacks the event prefix; not bound");
            continue;
        };

        let handler = handler.clone();
        let datum_for_listener = datum.clone();
        let listener: Listener = Rc::new(move |event: &Event| {
            handler(event, &datum_for_listener, index);
        });

        match scene.set_listener(node, &name, Some(listener)) {
            Ok(()) => {
                tracing::trace!(%node, event = %name, "listener bound");
                bound.insert(name);
            }
            Err(err) => {
                tracing::warn!(%node, event = %name, error = %err, "listener not bound");
            }
        }
    }

    if let Some(previous) = previous {
        for (field, _) in &previous.events {
            let Some(name) = event_name(field, prefix) else {
                continue;
            };
            if bound.contains(&name) {
                continue;
            }
            if let Err(err) = scene.set_listener(node, &name, None) {
                tracing::warn!(%node, event = %name, error = %err, "stale listener not cleared");
            }
        }
    }

    !bound.is_empty()
}
