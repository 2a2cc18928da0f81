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

//! Request id and nonce generation for authenticated calls.

use std::{
    fmt::Debug,
    sync::atomic::{AtomicU64, Ordering},
};

use chrono::Utc;

/// Source of request ids and nonces, consumed once each per authenticated call.
pub trait CallSequencer: Debug + Send + Sync {
    /// Returns a request id unique for the lifetime of the client.
    fn next_id(&self) -> u64;

    /// Returns a nonce strictly greater than every previously returned nonce.
    fn next_nonce(&self) -> u64;
}

/// Default sequencer: ids count up from one, nonces track wall-clock microseconds.
///
/// Nonces never repeat or go backwards, even when the clock does.
#[derive(Debug)]
pub struct MonotonicSequencer {
    next_id: AtomicU64,
    last_nonce: AtomicU64,
}

impl MonotonicSequencer {
    /// Creates a new [`MonotonicSequencer`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            last_nonce: AtomicU64::new(0),
        }
    }

    fn now_micros() -> u64 {
        u64::try_from(Utc::now().timestamp_micros()).unwrap_or_default()
    }
}

impl Default for MonotonicSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl CallSequencer for MonotonicSequencer {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn next_nonce(&self) -> u64 {
        let now = Self::now_micros();
        let previous = self
            .last_nonce
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_default();
        now.max(previous + 1)
    }
}

/// Deterministic sequencer yielding `start, start + 1, ...` for both ids and nonces.
#[derive(Debug)]
pub struct FixedStepSequencer {
    next_id: AtomicU64,
    next_nonce: AtomicU64,
}

impl FixedStepSequencer {
    /// Creates a new [`FixedStepSequencer`].
    #[must_use]
    pub const fn new(first_id: u64, first_nonce: u64) -> Self {
        Self {
            next_id: AtomicU64::new(first_id),
            next_nonce: AtomicU64::new(first_nonce),
        }
    }
}

impl CallSequencer for FixedStepSequencer {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn next_nonce(&self) -> u64 {
        self.next_nonce.fetch_add(1, Ordering::Relaxed)
    }
}
