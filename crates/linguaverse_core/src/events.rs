//! crates/linguaverse_core/src/events.rs
//!
//! Notifications from the remote service reach the controller as `AppEvent`s on a
//! single channel. Each document/collection listener is tagged with a `ListenerId`
//! so the controller can drop events that were queued by a listener it has
//! since detached.

use crate::domain::AuthUser;
use crate::ports::{AuthStateListener, Document, Listener, ListenerRegistration, PortResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug)]
pub enum AppEvent {
    AuthStateChanged(Option<AuthUser>),
    ProfileSnapshot {
        listener: ListenerId,
        result: PortResult<Option<Document>>,
    },
    StoriesSnapshot {
        listener: ListenerId,
        result: PortResult<Vec<Document>>,
    },
    PagesSnapshot {
        listener: ListenerId,
        result: PortResult<Vec<Document>>,
    },
}

/// Producer side of the event channel, cloned into every listener callback.
#[derive(Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<AppEvent>,
    next_id: Arc<AtomicU64>,
}

impl EventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Self {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
        };
        (sink, rx)
    }

    fn send(tx: &mpsc::UnboundedSender<AppEvent>, event: AppEvent) {
        if tx.send(event).is_err() {
            tracing::debug!("Dropping notification: controller has shut down.");
        }
    }

    pub fn auth_listener(&self) -> AuthStateListener {
        let tx = self.tx.clone();
        Arc::new(move |user| Self::send(&tx, AppEvent::AuthStateChanged(user)))
    }

    /// Creates a fresh listener id and a callback that wraps each snapshot with it.
    pub fn listener<T: 'static>(
        &self,
        wrap: fn(ListenerId, PortResult<T>) -> AppEvent,
    ) -> (ListenerId, Listener<T>) {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let tx = self.tx.clone();
        let callback: Listener<T> = Arc::new(move |result| Self::send(&tx, wrap(id, result)));
        (id, callback)
    }
}

/// An attached listener together with the id its events are tagged with.
#[derive(Debug)]
pub struct Subscription {
    pub id: ListenerId,
    registration: ListenerRegistration,
}

impl Subscription {
    pub fn new(id: ListenerId, registration: ListenerRegistration) -> Self {
        Self { id, registration }
    }

    pub fn detach(self) {
        self.registration.detach();
    }
}

/// True when `listener` is the id of the live subscription in `slot`.
pub fn is_current(slot: &Option<Subscription>, listener: ListenerId) -> bool {
    slot.as_ref().is_some_and(|s| s.id == listener)
}

pub(crate) fn profile_event(
    listener: ListenerId,
    result: PortResult<Option<Document>>,
) -> AppEvent {
    AppEvent::ProfileSnapshot { listener, result }
}

pub(crate) fn stories_event(listener: ListenerId, result: PortResult<Vec<Document>>) -> AppEvent {
    AppEvent::StoriesSnapshot { listener, result }
}

pub(crate) fn pages_event(listener: ListenerId, result: PortResult<Vec<Document>>) -> AppEvent {
    AppEvent::PagesSnapshot { listener, result }
}
