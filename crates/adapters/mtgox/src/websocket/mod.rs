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

//! WebSocket client for the Mt. Gox streaming API.
//!
//! This module provides a two-layer client:
//! - Outer client: owns the queues, signs calls and serializes writes
//! - Inner handler: the read loop, running in a dedicated Tokio task
//!
//! Inbound frames are classified by their `private` discriminator and decoded into typed
//! records, which are published without blocking into bounded queues.

pub mod auth;
pub mod client;
pub mod error;
pub mod handler;
pub mod messages;
pub mod parse;
pub mod transport;

pub use client::MtGoxWebSocketClient;
pub use error::{MtGoxWsError, MtGoxWsResult};
pub use handler::{DispatchExit, MtGoxStreams};
pub use messages::MtGoxWsMessage;
pub use transport::{Frame, FrameReader, FrameWriter, TungsteniteTransport};
