#![forbid(unsafe_code)]

//! Keyed command registry with change observers.
//!
//! Features contribute commands under a key; the host feeds
//! [`CommandRegistry::all`] into the palette whenever an observer fires.
//! The registry is an ordinary value owned by the host's composition root.
//!
//! # Example
//!
//! ```
//! use cmdpal_widgets::command_palette::{Command, CommandRegistry};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let mut registry = CommandRegistry::new();
//! let seen = Rc::new(Cell::new(0));
//! let sink = Rc::clone(&seen);
//! registry.subscribe(move |r| sink.set(r.all().len()));
//!
//! registry.register("files", vec![Command::new("open", "Open File")]);
//! assert_eq!(seen.get(), 1);
//! ```

use std::fmt;

use super::command::Command;

/// Handle returned by [`CommandRegistry::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&CommandRegistry)>;

/// Ordered map from contributor key to commands.
#[derive(Default)]
pub struct CommandRegistry {
    entries: Vec<(String, Vec<Command>)>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_id: u64,
}

impl CommandRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the commands under `key`.
    ///
    /// A new key goes last; an existing key keeps its position.
    pub fn register(&mut self, key: impl Into<String>, commands: Vec<Command>) {
        let key = key.into();
        tracing::debug!(key = %key, count = commands.len(), "commands registered");
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = commands,
            None => self.entries.push((key, commands)),
        }
        self.notify();
    }

    /// Remove the commands under `key`. Unknown keys are ignored silently.
    pub fn unregister(&mut self, key: &str) {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| k != key);
        if self.entries.len() != before {
            tracing::debug!(key, "commands unregistered");
            self.notify();
        }
    }

    /// Every registered command, in registration order.
    pub fn all(&self) -> Vec<Command> {
        self.entries
            .iter()
            .flat_map(|(_, commands)| commands.iter().cloned())
            .collect()
    }

    /// Registered keys, in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Call `observer` after every change.
    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&CommandRegistry) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Stop notifying `id`. Returns whether it was subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    fn notify(&mut self) {
        let mut observers = std::mem::take(&mut self.observers);
        for (_, observer) in &mut observers {
            observer(self);
        }
        self.observers = observers;
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ids(commands: &[Command]) -> Vec<String> {
        commands.iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn all_concatenates_in_registration_order() {
        let mut registry = CommandRegistry::new();
        registry.register("a", vec![Command::new("a1", "A1"), Command::new("a2", "A2")]);
        registry.register("b", vec![Command::new("b1", "B1")]);
        assert_eq!(ids(&registry.all()), vec!["a1", "a2", "b1"]);
    }

    #[test]
    fn reregister_keeps_position() {
        let mut registry = CommandRegistry::new();
        registry.register("a", vec![Command::new("a1", "A1")]);
        registry.register("b", vec![Command::new("b1", "B1")]);
        registry.register("a", vec![Command::new("a9", "A9")]);
        assert_eq!(ids(&registry.all()), vec!["a9", "b1"]);
    }

    #[test]
    fn observers_see_each_change() {
        let mut registry = CommandRegistry::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        registry.subscribe(move |r| sink.borrow_mut().push(r.all().len()));

        registry.register("a", vec![Command::new("a1", "A1")]);
        registry.register("b", vec![Command::new("b1", "B1")]);
        registry.unregister("a");
        registry.unregister("missing");
        assert_eq!(*log.borrow(), vec![1, 2, 1]);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut registry = CommandRegistry::new();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = registry.subscribe(move |_| *sink.borrow_mut() += 1);
        registry.register("a", Vec::new());
        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        registry.register("b", Vec::new());
        assert_eq!(*count.borrow(), 1);
    }
}
