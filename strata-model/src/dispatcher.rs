//! Synchronous named-event publish/subscribe.

use serde_json::Value;
use std::fmt;

/// Listener name that receives every dispatch regardless of its name.
pub const ANY_EVENT: &str = "*";

/// Callback invoked with the dispatched name and payload.
pub type Listener = Box<dyn FnMut(&str, &Value) + Send>;

/// Handle returned by [`Dispatcher::add_listener`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    name: String,
    callback: Listener,
}

/// Registry of named listeners.
///
/// Delivery is synchronous: `dispatch` returns only after every matching
/// listener has run, in registration order.
#[derive(Default)]
pub struct Dispatcher {
    listeners: Vec<Registration>,
    next_id: u64,
}

impl Dispatcher {
    /// Creates an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for dispatches named `name` (or [`ANY_EVENT`]).
    pub fn add_listener<F>(&mut self, name: impl Into<String>, callback: F) -> ListenerId
    where
        F: FnMut(&str, &Value) + Send + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Registration {
            id,
            name: name.into(),
            callback: Box::new(callback),
        });
        id
    }

    /// Unregisters a listener. Returns false if it was already gone.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|r| r.id != id);
        self.listeners.len() != before
    }

    /// Delivers `payload` to every listener registered for `name`.
    /// Returns the number of listeners invoked.
    pub fn dispatch(&mut self, name: &str, payload: &Value) -> usize {
        let mut delivered = 0;
        for registration in &mut self.listeners {
            if registration.name == name || registration.name == ANY_EVENT {
                (registration.callback)(name, payload);
                delivered += 1;
            }
        }
        delivered
    }

    /// Number of listeners registered under exactly `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.iter().filter(|r| r.name == name).count()
    }

    /// Removes every listener.
    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
