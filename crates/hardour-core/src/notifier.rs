//! Callback subscription primitive.
//!
//! A [`Notifier`] is the seam through which collaborators publish events
//! (diagnostic messages, engine halts, UI actions). Handlers run synchronously
//! on the emitting thread, so they must be short and must not block.

use std::sync::{Arc, RwLock, Weak};

type Handler<A> = Arc<dyn Fn(&A) + Send + Sync>;

struct Slots<A> {
    next_id: u64,
    handlers: Vec<(u64, Handler<A>)>,
}

/// Thread-safe list of handlers for events of type `A`.
pub struct Notifier<A> {
    slots: Arc<RwLock<Slots<A>>>,
}

impl<A: 'static> Notifier<A> {
    /// Create a notifier with no subscribers.
    pub fn new() -> Self {
        Self {
            slots: Arc::new(RwLock::new(Slots {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }

    /// Subscribe `handler`. It stays connected until the returned
    /// [`Connection`] is dropped or disconnected.
    pub fn connect<F>(&self, handler: F) -> Connection
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        let id = slots.next_id;
        slots.next_id += 1;
        slots.handlers.push((id, Arc::new(handler)));

        let weak: Weak<RwLock<Slots<A>>> = Arc::downgrade(&self.slots);
        Connection {
            disconnect: Some(Box::new(move || {
                if let Some(slots) = weak.upgrade() {
                    let mut slots = slots.write().unwrap_or_else(|e| e.into_inner());
                    slots.handlers.retain(|(slot_id, _)| *slot_id != id);
                }
            })),
        }
    }

    /// Call every connected handler with `event`.
    pub fn emit(&self, event: &A) {
        // Snapshot so handlers may connect or disconnect without deadlocking.
        let handlers: Vec<Handler<A>> = {
            let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
            slots.handlers.iter().map(|(_, h)| Arc::clone(h)).collect()
        };
        for handler in handlers {
            handler(event);
        }
    }

    /// Number of connected handlers.
    pub fn handler_count(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .handlers
            .len()
    }
}

impl<A: 'static> Default for Notifier<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for Notifier<A> {
    /// Clones share the same handler list.
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<A> std::fmt::Debug for Notifier<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier").finish_non_exhaustive()
    }
}

/// A live subscription. Dropping it disconnects the handler.
#[must_use = "dropping a Connection disconnects the handler immediately"]
pub struct Connection {
    disconnect: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Connection {
    /// Disconnect now.
    pub fn disconnect(mut self) {
        self.run_disconnect();
    }

    fn run_disconnect(&mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            disconnect();
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.run_disconnect();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("connected", &self.disconnect.is_some())
            .finish()
    }
}

/// Group of connections dropped together.
#[derive(Debug, Default)]
pub struct ConnectionList {
    connections: Vec<Connection>,
}

impl ConnectionList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `connection`.
    pub fn add(&mut self, connection: Connection) {
        self.connections.push(connection);
    }

    /// Move every connection of `other` into this list.
    pub fn append(&mut self, mut other: ConnectionList) {
        self.connections.append(&mut other.connections);
    }

    /// Number of held connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether the list holds no connections.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Disconnect everything.
    pub fn drop_connections(&mut self) {
        self.connections.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_emit_reaches_handler() {
        let notifier: Notifier<u32> = Notifier::new();
        let total = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&total);
        let _conn = notifier.connect(move |v| {
            seen.fetch_add(*v as usize, Ordering::SeqCst);
        });

        notifier.emit(&3);
        notifier.emit(&4);
        assert_eq!(total.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn test_drop_disconnects() {
        let notifier: Notifier<()> = Notifier::new();
        let conn = notifier.connect(|_| {});
        assert_eq!(notifier.handler_count(), 1);
        drop(conn);
        assert_eq!(notifier.handler_count(), 0);
    }

    #[test]
    fn test_connection_outlives_notifier() {
        let notifier: Notifier<()> = Notifier::new();
        let conn = notifier.connect(|_| {});
        drop(notifier);
        conn.disconnect();
    }

    #[test]
    fn test_connection_list() {
        let notifier: Notifier<String> = Notifier::new();
        let mut list = ConnectionList::new();
        list.add(notifier.connect(|_| {}));
        list.add(notifier.connect(|_| {}));
        assert_eq!(list.len(), 2);
        assert_eq!(notifier.handler_count(), 2);

        list.drop_connections();
        assert!(list.is_empty());
        assert_eq!(notifier.handler_count(), 0);
    }

    #[test]
    fn test_append_keeps_connections_alive() {
        let notifier: Notifier<()> = Notifier::new();
        let mut outer = ConnectionList::new();
        let mut inner = ConnectionList::new();
        inner.add(notifier.connect(|_| {}));
        inner.add(notifier.connect(|_| {}));

        outer.append(inner);
        assert_eq!(outer.len(), 2);
        assert_eq!(notifier.handler_count(), 2);
    }

    #[test]
    fn test_emit_from_other_thread() {
        let notifier: Notifier<u8> = Notifier::new();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let _conn = notifier.connect(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let remote = notifier.clone();
        std::thread::spawn(move || remote.emit(&1)).join().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
