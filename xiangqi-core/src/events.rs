//! Per-board event channel
//!
//! The board is the only producer. Subscribers are plain callbacks and their
//! behaviour never feeds back into the engine.

use std::fmt;

use crate::history::Move;
use crate::pieces::{Piece, Side};
use crate::snapshot::DumpedBoard;

/// Something that happened on a board
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A piece moved; `eaten` is the piece it captured
    Move { piece: Piece, eaten: Option<Piece> },
    /// A piece was captured
    Eat(Piece),
    Undo(Move),
    Redo(Move),
    /// The board went back to the opening layout
    Reset(DumpedBoard),
    /// The side to move changed
    Switch(Side),
}

/// Handle returned by `subscribe`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&Event) + Send>;

#[derive(Default)]
pub struct EventChannel {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback)>,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Event) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn emit(&mut self, event: &Event) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(event);
        }
    }

    pub fn has_subscribers(&self) -> bool {
        !self.subscribers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut channel = EventChannel::new();

        let sink = Arc::clone(&seen);
        let id = channel.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        assert_eq!(channel.len(), 1);

        channel.emit(&Event::Switch(Side::Black));
        assert!(channel.unsubscribe(id));
        assert!(!channel.unsubscribe(id));
        channel.emit(&Event::Switch(Side::Red));

        assert_eq!(*seen.lock().unwrap(), vec![Event::Switch(Side::Black)]);
        assert!(channel.is_empty());
    }
}
