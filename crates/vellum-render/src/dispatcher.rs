// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Outbound post-process notifications.

use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicU64, Ordering};
use vellum_core::ResourceId;

/// Outcome reported for a tracked resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    /// The GPU finished the work.
    Completed,
    /// The work was lost, typically because the context was destroyed.
    Failed,
}

/// A completion record sent back to the logic thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostProcessEvent {
    /// The resource the event is about.
    pub resource: ResourceId,
    /// What happened to it.
    pub status: CompletionStatus,
}

impl PostProcessEvent {
    /// A successful completion of `resource`.
    pub fn completed(resource: ResourceId) -> Self {
        Self {
            resource,
            status: CompletionStatus::Completed,
        }
    }
}

/// Non-blocking sender of [`PostProcessEvent`]s.
///
/// With a capacity the queue is bounded and events are dropped when it is
/// full. Without one it grows as needed.
#[derive(Debug)]
pub struct PostProcessDispatcher {
    sender: Sender<PostProcessEvent>,
    capacity: Option<usize>,
    dropped: AtomicU64,
}

impl PostProcessDispatcher {
    /// Creates a dispatcher and the receiver the logic thread reads from.
    ///
    /// ## Arguments
    /// * `capacity` - Queue bound, or `None` for an unbounded queue. A bound
    ///   of zero is raised to one: a rendezvous queue could never accept a
    ///   non-blocking send.
    pub fn new(capacity: Option<usize>) -> (Self, Receiver<PostProcessEvent>) {
        if capacity == Some(0) {
            log::warn!("[PostProcessDispatcher] Capacity 0 cannot hold events, using 1");
        }
        let capacity = capacity.map(|n| n.max(1));
        let (sender, receiver) = match capacity {
            Some(n) => crossbeam_channel::bounded(n),
            None => crossbeam_channel::unbounded(),
        };
        let dispatcher = Self {
            sender,
            capacity,
            dropped: AtomicU64::new(0),
        };
        (dispatcher, receiver)
    }

    /// Queue bound, if any.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Number of events dropped because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Sends an event without blocking. Returns `true` if it was queued.
    pub fn dispatch(&self, event: PostProcessEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                log::warn!(
                    "[PostProcessDispatcher] Queue full, dropping event for {}",
                    event.resource
                );
                false
            }
            Err(TrySendError::Disconnected(event)) => {
                log::debug!(
                    "[PostProcessDispatcher] No listener, discarding event for {}",
                    event.resource
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_queue_drops_newest_when_full() {
        let (dispatcher, receiver) = PostProcessDispatcher::new(Some(1));
        assert!(dispatcher.dispatch(PostProcessEvent::completed(ResourceId(1))));
        assert!(!dispatcher.dispatch(PostProcessEvent::completed(ResourceId(2))));

        assert_eq!(dispatcher.dropped(), 1);
        assert_eq!(receiver.try_recv().unwrap().resource, ResourceId(1));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn zero_capacity_still_delivers_events() {
        let (dispatcher, receiver) = PostProcessDispatcher::new(Some(0));
        assert_eq!(dispatcher.capacity(), Some(1));
        assert!(dispatcher.dispatch(PostProcessEvent::completed(ResourceId(1))));
        assert_eq!(dispatcher.dropped(), 0);
        assert_eq!(receiver.try_recv().unwrap().resource, ResourceId(1));
    }

    #[test]
    fn unbounded_queue_never_drops() {
        let (dispatcher, receiver) = PostProcessDispatcher::new(None);
        for i in 0..1000 {
            assert!(dispatcher.dispatch(PostProcessEvent::completed(ResourceId(i))));
        }
        assert_eq!(receiver.len(), 1000);
        assert_eq!(dispatcher.dropped(), 0);
    }

    #[test]
    fn disconnected_listener_is_not_counted_as_a_drop() {
        let (dispatcher, receiver) = PostProcessDispatcher::new(Some(4));
        drop(receiver);
        assert!(!dispatcher.dispatch(PostProcessEvent::completed(ResourceId(1))));
        assert_eq!(dispatcher.dropped(), 0);
    }
}
