//! Synchronous in-process publish/subscribe bus.
//!
//! SYSTEM CONTEXT
//! ==============
//! Decouples components that are not in a parent/child relationship. Each
//! event is a typed payload (see `events::AppEvent`) whose `kind()` selects
//! the subscription list.
//!
//! DISPATCH
//! ========
//! `publish` runs every handler registered for the kind, in subscription
//! order, before returning. The handler list is snapshotted first, so a
//! handler may subscribe, unsubscribe, or publish again while dispatch is in
//! progress. A same-kind publish from inside a handler recurses; there is no
//! cycle detection.
//!
//! ERROR HANDLING
//! ==============
//! A handler returning `Err` is logged and skipped; later handlers still run.
//! Panics are not caught.

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;

pub mod events;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

pub use events::{AppEvent, AppEventKind};

/// A payload that can travel over an [`EventBus`].
pub trait BusEvent {
    /// Subscription key, one per event name.
    type Kind: Copy + Eq + Hash + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

/// Failure reported by a subscriber.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct HandlerError(String);

impl HandlerError {
    pub fn new(message: impl fmt::Display) -> Self {
        Self(message.to_string())
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self(message.to_owned())
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

/// Subscriber callback. Identity is the `Rc` allocation: unsubscribing
/// removes every entry that shares it.
pub type Handler<E> = Rc<dyn Fn(&E) -> Result<(), HandlerError>>;

/// Wrap a closure as a [`Handler`].
pub fn handler<E, F>(f: F) -> Handler<E>
where
    F: Fn(&E) -> Result<(), HandlerError> + 'static,
{
    Rc::new(f)
}

/// Outcome of one [`EventBus::publish`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Handlers that returned `Ok`.
    pub delivered: usize,
    /// Handlers that returned `Err`.
    pub failed: usize,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Single-threaded subscription registry keyed by event kind.
pub struct EventBus<E: BusEvent> {
    topics: RefCell<HashMap<E::Kind, Vec<Handler<E>>>>,
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self { topics: RefCell::new(HashMap::new()) }
    }
}

impl<E: BusEvent> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topics = self.topics.borrow();
        let mut map = f.debug_map();
        for (kind, handlers) in topics.iter() {
            map.entry(kind, &handlers.len());
        }
        map.finish()
    }
}

impl<E: BusEvent> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind`. Registering the same handler twice
    /// makes it fire twice.
    pub fn subscribe(&self, kind: E::Kind, handler: Handler<E>) {
        self.topics.borrow_mut().entry(kind).or_default().push(handler);
    }

    /// Remove every registration of `handler` under `kind`. Unknown kinds and
    /// handlers are ignored; the kind's entry remains with an empty list.
    pub fn unsubscribe(&self, kind: E::Kind, handler: &Handler<E>) {
        if let Some(handlers) = self.topics.borrow_mut().get_mut(&kind) {
            handlers.retain(|h| !Rc::ptr_eq(h, handler));
        }
    }

    /// Deliver `event` to every handler registered for its kind.
    pub fn publish(&self, event: &E) -> DispatchReport {
        let kind = event.kind();
        let handlers = match self.topics.borrow().get(&kind) {
            Some(handlers) if !handlers.is_empty() => handlers.clone(),
            _ => return DispatchReport::default(),
        };

        let mut report = DispatchReport::default();
        for (index, handler) in handlers.iter().enumerate() {
            match handler(event) {
                Ok(()) => report.delivered += 1,
                Err(error) => {
                    tracing::warn!(?kind, index, %error, "event handler failed");
                    report.failed += 1;
                }
            }
        }
        tracing::trace!(?kind, delivered = report.delivered, failed = report.failed, "event published");
        report
    }

    /// Number of handlers currently registered under `kind`.
    pub fn subscriber_count(&self, kind: E::Kind) -> usize {
        self.topics.borrow().get(&kind).map_or(0, Vec::len)
    }

    /// Whether `kind` has ever been subscribed to.
    pub fn has_topic(&self, kind: E::Kind) -> bool {
        self.topics.borrow().contains_key(&kind)
    }
}
