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

//! Core constants for the Mt. Gox adapter.

// Streaming hosts
pub const MTGOX_WS_URL: &str = "ws://websocket.mtgox.com:80";
pub const MTGOX_WS_SECURE_URL: &str = "wss://websocket.mtgox.com:443";
pub const MTGOX_WS_PATH: &str = "/mtgox";

/// Origin header expected by the streaming endpoint.
pub const MTGOX_ORIGIN_URL: &str = "http://websocket.mtgox.com";

/// Context string embedded in every authenticated call envelope.
pub const MTGOX_CALL_CONTEXT: &str = "mtgox.com";

/// Default traded item for authenticated calls.
pub const MTGOX_DEFAULT_ITEM: &str = "BTC";

/// Default quote currency subscribed on connect.
pub const MTGOX_DEFAULT_CURRENCY: &str = "USD";

/// Integer scaling of BTC amounts (`value_int` units per coin).
pub const BITCOIN_DIVISION: f64 = 1e8;

/// Wire layout of [`SimpleTime`](crate::common::parse::SimpleTime) values.
pub const SIMPLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Queue sizing
pub const DEFAULT_EVENT_CAPACITY: usize = 1;
pub const DEFAULT_ERROR_CAPACITY: usize = 10;
