// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-session timeline notifications.
//!
//! Each preview session owns its own notifier, so closing a session drops its
//! subscribers with it.

use crate::drag::DragTarget;
use indexmap::IndexMap;
use uuid::Uuid;

/// Something observable happened on the timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelineEvent {
    /// Exit time was edited
    ExitTimeChanged {
        /// New normalized exit time
        exit_time: f32,
    },
    /// Transition duration changed, either derived or typed in
    TransitionDurationChanged {
        /// New duration in seconds
        duration: f32,
    },
    /// Playhead was moved by scrubbing
    Scrubbed {
        /// Playhead time in seconds
        time: f32,
    },
    /// A drag session started
    DragStarted(DragTarget),
    /// A drag session ended
    DragEnded(DragTarget),
    /// Playback wrapped around
    PlaybackLooped,
    /// Playback reached the end and stopped
    PlaybackFinished,
}

/// Subscription handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub Uuid);

impl SubscriptionId {
    /// Create a new random subscription ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

type Callback = Box<dyn FnMut(&TimelineEvent)>;

/// Callback registry plus a queue of events not yet taken
#[derive(Default)]
pub struct TimelineNotifier {
    subscribers: IndexMap<SubscriptionId, Callback>,
    pending: Vec<TimelineEvent>,
}

impl TimelineNotifier {
    /// Create an empty notifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback; it runs for every event in registration order
    pub fn subscribe(&mut self, callback: impl FnMut(&TimelineEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.subscribers.insert(id, Box::new(callback));
        id
    }

    /// Remove a callback
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.shift_remove(&id).is_some()
    }

    /// Remove every callback
    pub fn clear_subscriptions(&mut self) {
        self.subscribers.clear();
    }

    /// Number of registered callbacks
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver an event to subscribers and queue it
    pub fn emit(&mut self, event: TimelineEvent) {
        for callback in self.subscribers.values_mut() {
            callback(&event);
        }
        self.pending.push(event);
    }

    /// Deliver several events in order
    pub fn emit_all(&mut self, events: impl IntoIterator<Item = TimelineEvent>) {
        for event in events {
            self.emit(event);
        }
    }

    /// Get pending events and clear them
    pub fn take_events(&mut self) -> Vec<TimelineEvent> {
        std::mem::take(&mut self.pending)
    }
}

impl std::fmt::Debug for TimelineNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineNotifier")
            .field("subscribers", &self.subscribers.len())
            .field("pending", &self.pending)
            .finish()
    }
}
