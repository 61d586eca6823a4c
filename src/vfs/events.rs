//! Change Notification Bus
//!
//! Observers are rebuilt-from-scratch renderers: every event carries the full
//! listing and the active name, never a delta. Delivery is synchronous; the
//! publishing call returns only after every observer ran.

use std::fmt;

use super::types::EntryView;

/// Identifies a subscription for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Non-blocking, user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Saving to the durable store failed; in-memory work is kept.
    SaveFailed { reason: String },
    /// A create/remove/activate request was refused.
    Rejected { message: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SaveFailed { reason } => write!(f, "Save failed: {}", reason),
            Self::Rejected { message } => write!(f, "{}", message),
        }
    }
}

/// What changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    EntriesChanged,
    ActiveChanged,
    Notice(Notice),
}

/// Full view of the VFS at the moment of a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub entries: Vec<EntryView>,
    pub active: Option<String>,
}

impl ChangeEvent {
    pub fn is_notice(&self) -> bool {
        matches!(self.kind, ChangeKind::Notice(_))
    }
}

/// Receives change events.
pub trait Observer: Send {
    fn on_change(&mut self, event: &ChangeEvent);
}

impl<F> Observer for F
where
    F: FnMut(&ChangeEvent) + Send,
{
    fn on_change(&mut self, event: &ChangeEvent) {
        self(event)
    }
}

/// Registry of observers, notified in subscription order.
#[derive(Default)]
pub struct NotificationBus {
    observers: Vec<(SubscriptionId, Box<dyn Observer>)>,
    next_id: u64,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn Observer>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Returns false if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn publish(&mut self, event: &ChangeEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer.on_change(event);
        }
    }
}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationBus")
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn event(kind: ChangeKind) -> ChangeEvent {
        ChangeEvent { kind, entries: Vec::new(), active: None }
    }

    #[test]
    fn test_publish_reaches_all_observers_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus = NotificationBus::new();
        for tag in ["first", "second"] {
            let log = log.clone();
            bus.subscribe(Box::new(move |_: &ChangeEvent| log.lock().unwrap().push(tag)));
        }
        bus.publish(&event(ChangeKind::EntriesChanged));
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_unsubscribe() {
        let count = Arc::new(Mutex::new(0));
        let mut bus = NotificationBus::new();
        let c = count.clone();
        let id = bus.subscribe(Box::new(move |_: &ChangeEvent| *c.lock().unwrap() += 1));
        bus.publish(&event(ChangeKind::ActiveChanged));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&event(ChangeKind::ActiveChanged));
        assert_eq!(*count.lock().unwrap(), 1);
        assert!(bus.is_empty());
    }

    #[test]
    fn test_notice_display() {
        let notice = Notice::SaveFailed { reason: "quota".to_string() };
        assert_eq!(notice.to_string(), "Save failed: quota");
        assert!(event(ChangeKind::Notice(notice)).is_notice());
    }
}
