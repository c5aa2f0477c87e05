//! Change notifications and accessibility announcements.
//!
//! Every committed mutation of the window manager produces exactly one
//! [`Notification`] per affected topic, delivered synchronously before the
//! mutating call returns. Each notification carries a [`DesktopView`] so
//! observers can re-derive focus and visibility without querying back.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::window::WindowId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Registry,
    ZOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Opened(WindowId),
    Updated(WindowId),
    CloseRequested(WindowId),
    Closed(WindowId),
    Restacked,
}

/// Derived views, computed from the registry and the z-order at the moment
/// of the change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesktopView {
    /// Back to front.
    pub z_order: Vec<WindowId>,
    pub focused: Option<WindowId>,
    /// Windows that are neither minimized nor closing, back to front.
    pub visible: Vec<WindowId>,
    pub minimized: Vec<WindowId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub topic: Topic,
    pub change: Change,
    pub view: DesktopView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

pub type Observer = Box<dyn FnMut(&Notification)>;

#[derive(Default)]
pub struct Observers {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Topic, Observer)>,
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Observers {
    pub fn subscribe(&mut self, topic: Topic, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.subscribers.push((id, topic, observer));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _, _)| *existing != id);
        before != self.subscribers.len()
    }

    /// Deliver to subscribers of the notification's topic in subscription
    /// order.
    pub fn notify(&mut self, notification: &Notification) {
        for (_, topic, observer) in &mut self.subscribers {
            if *topic == notification.topic {
                observer(notification);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

/// Sink for human-readable transition descriptions ("Notepad window
/// minimized"), consumed by a live-announcement region.
pub trait Announcer {
    fn announce(&mut self, message: &str);
}

impl<A: Announcer + ?Sized> Announcer for Rc<RefCell<A>> {
    fn announce(&mut self, message: &str) {
        self.borrow_mut().announce(message);
    }
}

/// Bounded in-memory announcement history.
#[derive(Debug, Clone)]
pub struct AnnouncementLog {
    messages: VecDeque<String>,
    max_messages: usize,
}

impl Default for AnnouncementLog {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl AnnouncementLog {
    pub fn with_capacity(max_messages: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            max_messages: max_messages.max(1),
        }
    }

    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn latest(&self) -> Option<&str> {
        self.messages.back().map(String::as_str)
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl Announcer for AnnouncementLog {
    fn announce(&mut self, message: &str) {
        while self.messages.len() >= self.max_messages {
            self.messages.pop_front();
        }
        self.messages.push_back(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(topic: Topic) -> Notification {
        Notification {
            topic,
            change: Change::Restacked,
            view: DesktopView::default(),
        }
    }

    #[test]
    fn observers_receive_only_their_topic() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::default();
        let sink = Rc::clone(&seen);
        observers.subscribe(
            Topic::ZOrder,
            Box::new(move |n| sink.borrow_mut().push(n.topic)),
        );
        observers.notify(&notification(Topic::Registry));
        observers.notify(&notification(Topic::ZOrder));
        assert_eq!(*seen.borrow(), vec![Topic::ZOrder]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Rc::new(RefCell::new(0));
        let mut observers = Observers::default();
        let sink = Rc::clone(&count);
        let id = observers.subscribe(Topic::Registry, Box::new(move |_| *sink.borrow_mut() += 1));
        observers.notify(&notification(Topic::Registry));
        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        observers.notify(&notification(Topic::Registry));
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn announcement_log_is_bounded() {
        let mut log = AnnouncementLog::with_capacity(2);
        log.announce("one");
        log.announce("two");
        log.announce("three");
        assert_eq!(log.messages().collect::<Vec<_>>(), vec!["two", "three"]);
        assert_eq!(log.latest(), Some("three"));
    }

    #[test]
    fn shared_log_implements_announcer() {
        let log = AnnouncementLog::shared();
        let mut announcer = Rc::clone(&log);
        announcer.announce("Notepad window opened");
        assert_eq!(log.borrow().latest(), Some("Notepad window opened"));
    }
}
