// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Fixed-capacity queues with a non-blocking publish.
//!
//! The feed handler must never wait on a slow consumer, so publishing is always a
//! `try_publish` that reports what happened to the value. Overflow is resolved by an
//! explicit [`OverflowPolicy`] rather than by blocking or timing out.

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use tokio::sync::Notify;

/// What happens to a value published into a full queue.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Keep the queued values and discard the new one.
    #[default]
    DropNewest,
    /// Evict the oldest queued value to make room for the new one.
    DropOldest,
}

/// Result of a [`QueuePublisher::try_publish`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The value was queued with room to spare.
    Accepted,
    /// The value was queued after evicting the oldest one.
    Replaced,
    /// The value was discarded.
    Dropped,
}

impl PublishOutcome {
    /// Returns whether the published value is now in the queue.
    #[must_use]
    pub const fn is_queued(self) -> bool {
        matches!(self, Self::Accepted | Self::Replaced)
    }
}

#[derive(Debug)]
struct Shared<T> {
    buffer: Mutex<VecDeque<T>>,
    capacity: usize,
    policy: OverflowPolicy,
    notify: Notify,
    closed: AtomicBool,
}

impl<T> Shared<T> {
    fn buffer(&self) -> MutexGuard<'_, VecDeque<T>> {
        // Pushes and pops cannot leave the deque half-updated
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Creates a bounded queue returning its single publisher and single subscriber.
///
/// A `capacity` of zero is raised to one.
#[must_use]
pub fn bounded_queue<T>(
    capacity: usize,
    policy: OverflowPolicy,
) -> (QueuePublisher<T>, QueueSubscriber<T>) {
    let capacity = capacity.max(1);
    let shared = Arc::new(Shared {
        buffer: Mutex::new(VecDeque::with_capacity(capacity)),
        capacity,
        policy,
        notify: Notify::new(),
        closed: AtomicBool::new(false),
    });

    (
        QueuePublisher {
            shared: shared.clone(),
        },
        QueueSubscriber { shared },
    )
}

/// Producer half of a bounded queue. Dropping it closes the queue.
#[derive(Debug)]
pub struct QueuePublisher<T> {
    shared: Arc<Shared<T>>,
}

impl<T> QueuePublisher<T> {
    /// Publishes `value` without blocking.
    pub fn try_publish(&self, value: T) -> PublishOutcome {
        let outcome = {
            let mut buffer = self.shared.buffer();
            if buffer.len() < self.shared.capacity {
                buffer.push_back(value);
                PublishOutcome::Accepted
            } else {
                match self.shared.policy {
                    OverflowPolicy::DropNewest => PublishOutcome::Dropped,
                    OverflowPolicy::DropOldest => {
                        buffer.pop_front();
                        buffer.push_back(value);
                        PublishOutcome::Replaced
                    }
                }
            }
        };

        if outcome.is_queued() {
            self.shared.notify.notify_one();
        }
        outcome
    }

    /// Returns the queue capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Returns the overflow policy.
    #[must_use]
    pub fn policy(&self) -> OverflowPolicy {
        self.shared.policy
    }
}

impl<T> Drop for QueuePublisher<T> {
    fn drop(&mut self) {
        self.shared.closed.store(true, Ordering::Release);
        self.shared.notify.notify_one();
    }
}

/// Consumer half of a bounded queue.
#[derive(Debug)]
pub struct QueueSubscriber<T> {
    shared: Arc<Shared<T>>,
}

impl<T> QueueSubscriber<T> {
    /// Receives the next value, waiting until one is published.
    ///
    /// Returns `None` once the publisher is dropped and the queue is drained.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            let next = self.shared.buffer().pop_front();
            if next.is_some() {
                return next;
            }
            if self.shared.closed.load(Ordering::Acquire) {
                // Values published right before the close are still delivered
                return self.shared.buffer().pop_front();
            }
            self.shared.notify.notified().await;
        }
    }

    /// Takes the next value if one is queued.
    pub fn try_recv(&mut self) -> Option<T> {
        self.shared.buffer().pop_front()
    }

    /// Takes every queued value, oldest first.
    pub fn drain(&mut self) -> Vec<T> {
        self.shared.buffer().drain(..).collect()
    }

    /// Returns the number of queued values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.buffer().len()
    }

    /// Returns whether no values are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns whether the publisher has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }
}
