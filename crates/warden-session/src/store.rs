// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The observable holder of the current session.
//!
//! Readers take an `Arc<Session>` snapshot and never see a half-built session.
//! Writes are serialized and, once the new session is in place, every listener
//! is called synchronously in registration order. A listener must not publish
//! while it is being notified; such writes are rejected with
//! [`StoreError::ReentrantWrite`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;

use warden_core::Session;

use crate::error::StoreError;

// =============================================================================
// Listeners
// =============================================================================

/// Receives every session change.
pub trait SessionListener: Send + Sync {
    /// Called after the new session has been installed.
    fn on_session_changed(&self, session: &Arc<Session>);
}

impl<F> SessionListener for F
where
    F: Fn(&Arc<Session>) + Send + Sync,
{
    fn on_session_changed(&self, session: &Arc<Session>) {
        self(session)
    }
}

/// Handle returned by [`SessionStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

// =============================================================================
// SessionStore
// =============================================================================

/// Holds the current [`Session`] and notifies listeners when it changes.
pub struct SessionStore {
    current: RwLock<Arc<Session>>,
    listeners: RwLock<Vec<(ListenerId, Arc<dyn SessionListener>)>>,
    next_id: AtomicU64,
    write_lock: Mutex<()>,
    notifying: Mutex<Option<ThreadId>>,
    watch_tx: watch::Sender<Arc<Session>>,
}

impl SessionStore {
    /// Creates a store holding `initial`.
    pub fn new(initial: Session) -> Self {
        let initial = Arc::new(initial);
        let (watch_tx, _) = watch::channel(initial.clone());
        Self {
            current: RwLock::new(initial),
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            write_lock: Mutex::new(()),
            notifying: Mutex::new(None),
            watch_tx,
        }
    }

    /// Snapshot of the current session.
    pub fn current(&self) -> Arc<Session> {
        self.current.read().clone()
    }

    /// Registers a listener. It is not called for the current session.
    pub fn subscribe(&self, listener: Arc<dyn SessionListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, listener));
        id
    }

    /// Registers a closure as a listener.
    pub fn subscribe_fn<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&Arc<Session>) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(f))
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// A receiver for async consumers. It always holds the latest session.
    pub fn watch(&self) -> watch::Receiver<Arc<Session>> {
        self.watch_tx.subscribe()
    }

    /// Installs a new session and notifies listeners.
    pub(crate) fn publish(&self, session: Session) -> Result<Arc<Session>, StoreError> {
        let me = thread::current().id();
        if *self.notifying.lock() == Some(me) {
            tracing::warn!("Rejected session write from inside a listener");
            return Err(StoreError::ReentrantWrite);
        }

        let _write = self.write_lock.lock();
        let session = Arc::new(session);
        *self.current.write() = session.clone();
        self.watch_tx.send_replace(session.clone());

        let listeners: Vec<_> = self
            .listeners
            .read()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();

        let _notifying = NotifyingGuard::enter(&self.notifying, me);
        for listener in listeners {
            listener.on_session_changed(&session);
        }

        Ok(session)
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("session_id", &self.current.read().id)
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Marks the current thread as notifying until dropped, including on panic.
struct NotifyingGuard<'a> {
    slot: &'a Mutex<Option<ThreadId>>,
}

impl<'a> NotifyingGuard<'a> {
    fn enter(slot: &'a Mutex<Option<ThreadId>>, thread: ThreadId) -> Self {
        *slot.lock() = Some(thread);
        Self { slot }
    }
}

impl Drop for NotifyingGuard<'_> {
    fn drop(&mut self) {
        *self.slot.lock() = None;
    }
}

// =============================================================================
// Tests
// =============================================================================
