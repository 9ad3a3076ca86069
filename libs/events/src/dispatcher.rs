//! Routing of validated events to type-specific handlers.
//!
//! A dispatcher validates each inbound value, then picks exactly one handler:
//!
//! 1. a handler registered under the exact event type (`"Order:2"`)
//! 2. a handler registered under the base type (`"Order"`)
//! 3. the default handler
//!
//! An event that resolves to none of these is dropped without any report.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use crate::envelope::{base_type, Event};
use crate::error::{DispatchError, EventError, ValidationError};

/// Registry key that designates the default handler in string-keyed registries.
pub const DEFAULT_HANDLER_KEY: &str = "__default__";

/// Receives errors detected by the dispatcher or reported by handlers.
pub type ErrorCallback = Arc<dyn Fn(DispatchError) + Send + Sync>;

/// Handles one event. Receives the dispatcher's error callback for reporting
/// its own failures.
pub type EventHandler = Arc<dyn Fn(&ErrorCallback, &Event) + Send + Sync>;

/// Observes events that no handler accepted.
pub type UnmatchedHook = Arc<dyn Fn(&Event) + Send + Sync>;

/// Which registry tier a handler was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Registered under the full event type, version suffix included.
    Exact,
    /// Registered under the base type.
    Base,
    /// The default handler.
    Default,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Exact => write!(f, "exact"),
            Route::Base => write!(f, "base"),
            Route::Default => write!(f, "default"),
        }
    }
}

/// A handler together with the tier it was found in.
pub struct Resolved<'a> {
    pub route: Route,
    pub handler: &'a EventHandler,
}

/// Result of routing a single inbound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The value failed validation; the error callback was invoked.
    Rejected(ValidationError),
    /// The value passed validation but could not be decoded; the error
    /// callback was invoked.
    Undecodable,
    /// The event was valid but no handler applied.
    Dropped,
    /// A handler was invoked.
    Handled(Route),
}

/// The handler registry.
///
/// Holds type-specific handlers and an optional default handler separately,
/// so the fallback slot is never looked up as an event type.
#[derive(Clone, Default)]
pub struct EventHandlers {
    specific: HashMap<String, EventHandler>,
    default: Option<EventHandler>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for an exact type (`"Order:2"`) or a base type (`"Order"`).
    pub fn on<F>(mut self, event_type: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ErrorCallback, &Event) + Send + Sync + 'static,
    {
        self.specific.insert(event_type.into(), Arc::new(handler));
        self
    }

    /// Registers the default handler.
    pub fn on_default<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ErrorCallback, &Event) + Send + Sync + 'static,
    {
        self.default = Some(Arc::new(handler));
        self
    }

    /// Registers a shared handler under a string key.
    ///
    /// The key [`DEFAULT_HANDLER_KEY`] sets the default handler. Returns the
    /// handler previously registered under the same key, if any.
    pub fn insert(&mut self, key: impl Into<String>, handler: EventHandler) -> Option<EventHandler> {
        let key = key.into();
        if key == DEFAULT_HANDLER_KEY {
            self.default.replace(handler)
        } else {
            self.specific.insert(key, handler)
        }
    }

    /// Returns the handler registered for exactly `event_type`, without fallback.
    pub fn get(&self, event_type: &str) -> Option<&EventHandler> {
        self.specific.get(event_type)
    }

    /// Returns the default handler.
    pub fn default_handler(&self) -> Option<&EventHandler> {
        self.default.as_ref()
    }

    /// Resolves `event_type` to a handler: exact type, then base type, then default.
    pub fn resolve(&self, event_type: &str) -> Option<Resolved<'_>> {
        if let Some(handler) = self.specific.get(event_type) {
            return Some(Resolved {
                route: Route::Exact,
                handler,
            });
        }

        if let Some(handler) = self.specific.get(base_type(event_type)) {
            return Some(Resolved {
                route: Route::Base,
                handler,
            });
        }

        self.default.as_ref().map(|handler| Resolved {
            route: Route::Default,
            handler,
        })
    }

    /// Registered type keys, excluding the default slot. Order is unspecified.
    pub fn event_types(&self) -> impl Iterator<Item = &str> {
        self.specific.keys().map(String::as_str)
    }

    /// Number of registered handlers, the default handler included.
    pub fn len(&self) -> usize {
        self.specific.len() + usize::from(self.default.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Into<String>> FromIterator<(K, EventHandler)> for EventHandlers {
    fn from_iter<I: IntoIterator<Item = (K, EventHandler)>>(iter: I) -> Self {
        let mut handlers = EventHandlers::new();
        for (key, handler) in iter {
            handlers.insert(key, handler);
        }
        handlers
    }
}

impl fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.event_types().collect();
        types.sort_unstable();
        f.debug_struct("EventHandlers")
            .field("types", &types)
            .field("default", &self.default.is_some())
            .finish()
    }
}

/// Validates inbound events and routes them to handlers.
///
/// Cheap to clone and safe to share between threads. The registry and the
/// callbacks are fixed at construction.
#[derive(Clone)]
pub struct EventDispatcher {
    error_callback: ErrorCallback,
    handlers: Arc<EventHandlers>,
    unmatched: Option<UnmatchedHook>,
}

impl EventDispatcher {
    pub fn new<F>(error_callback: F, handlers: EventHandlers) -> Self
    where
        F: Fn(DispatchError) + Send + Sync + 'static,
    {
        Self {
            error_callback: Arc::new(error_callback),
            handlers: Arc::new(handlers),
            unmatched: None,
        }
    }

    /// Installs an observer for events that resolve to no handler.
    ///
    /// Without a hook such events are dropped silently.
    pub fn with_unmatched_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.unmatched = Some(Arc::new(hook));
        self
    }

    pub fn handlers(&self) -> &EventHandlers {
        &self.handlers
    }

    /// Validates `value` and invokes at most one handler.
    ///
    /// An invalid value is reported once through the error callback as a
    /// `SchemaMismatchError`. Handler panics propagate to the caller.
    pub fn dispatch(&self, value: &Value) {
        self.route(value);
    }

    /// Dispatches an already typed event through the same validation path.
    pub fn dispatch_event(&self, event: &Event) {
        match serde_json::to_value(event) {
            Ok(value) => self.dispatch(&value),
            Err(err) => {
                debug!(error = %err, "event could not be serialized for dispatch");
                (self.error_callback)(DispatchError::schema_mismatch());
            }
        }
    }

    /// Like [`dispatch`](Self::dispatch), but reports what happened.
    ///
    /// Handlers receive the event as sent: unrecognized fields are kept in
    /// `extra` and identifiers keep their letter case.
    pub fn route(&self, value: &Value) -> DispatchOutcome {
        let event = match Event::try_from(value) {
            Ok(event) => event,
            Err(err) => return self.reject(err),
        };

        match self.handlers.resolve(&event.event_type) {
            Some(Resolved { route, handler }) => {
                trace!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    route = %route,
                    "dispatching event"
                );
                handler(&self.error_callback, &event);
                DispatchOutcome::Handled(route)
            }
            None => {
                if let Some(hook) = &self.unmatched {
                    hook(&event);
                }
                DispatchOutcome::Dropped
            }
        }
    }

    fn reject(&self, err: EventError) -> DispatchOutcome {
        let outcome = match err {
            EventError::InvalidEvent(reason) => {
                debug!(
                    reason = %reason,
                    field = reason.field().unwrap_or("<root>"),
                    "event does not match event schema"
                );
                DispatchOutcome::Rejected(reason)
            }
            other => {
                debug!(error = %other, "validated event failed to decode");
                DispatchOutcome::Undecodable
            }
        };
        (self.error_callback)(DispatchError::schema_mismatch());
        outcome
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers)
            .field("unmatched_hook", &self.unmatched.is_some())
            .finish()
    }
}

/// Binds an error callback and a handler registry into a dispatcher.
///
/// # Example
///
/// ```
/// use superschema_events::{get_event_dispatcher, EventHandlers};
///
/// let dispatcher = get_event_dispatcher(
///     |err| eprintln!("{err}"),
///     EventHandlers::new()
///         .on("PurchaseOrderReceived", |_err, event| println!("v1: {}", event.id))
///         .on("PurchaseOrderReceived:2", |_err, event| println!("v2: {}", event.id))
///         .on_default(|_err, event| println!("unhandled: {}", event.event_type)),
/// );
///
/// dispatcher.dispatch(&serde_json::json!({ "type": "PurchaseOrderReceived" }));
/// ```
pub fn get_event_dispatcher<F>(error_callback: F, handlers: EventHandlers) -> EventDispatcher
where
    F: Fn(DispatchError) + Send + Sync + 'static,
{
    EventDispatcher::new(error_callback, handlers)
}
