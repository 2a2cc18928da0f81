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

//! Mt. Gox adapter configuration structures.

use crate::{
    common::{
        consts::{
            DEFAULT_ERROR_CAPACITY, DEFAULT_EVENT_CAPACITY, MTGOX_DEFAULT_CURRENCY,
            MTGOX_DEFAULT_ITEM,
        },
        credential::{Credential, MTGOX_API_KEY_ENV, MTGOX_API_SECRET_ENV},
        queue::OverflowPolicy,
        urls::{format_ws_url, get_ws_url},
    },
    websocket::error::MtGoxWsResult,
};

/// Configuration for the Mt. Gox WebSocket client.
#[derive(Clone, Debug)]
pub struct MtGoxWsConfig {
    /// API key (hex, `-` separators allowed) for authenticated calls.
    pub api_key: Option<String>,
    /// API secret (standard base64) for call signing.
    pub api_secret: Option<String>,
    /// Quote currencies to stream.
    pub currencies: Vec<String>,
    /// Use the TLS endpoint.
    pub use_secure: bool,
    /// Optional base URL override for WebSocket.
    pub base_url_ws: Option<String>,
    /// Item traded by authenticated calls.
    pub item: String,
    /// Capacity of each event queue.
    pub event_capacity: usize,
    /// Capacity of the error queue.
    pub error_capacity: usize,
    /// Overflow policy of the event queues.
    pub event_overflow: OverflowPolicy,
}

impl Default for MtGoxWsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            currencies: vec![MTGOX_DEFAULT_CURRENCY.to_string()],
            use_secure: false,
            base_url_ws: None,
            item: MTGOX_DEFAULT_ITEM.to_string(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            error_capacity: DEFAULT_ERROR_CAPACITY,
            event_overflow: OverflowPolicy::DropOldest,
        }
    }
}

impl MtGoxWsConfig {
    /// Returns the streaming URL, honouring the base URL override.
    #[must_use]
    pub fn ws_url(&self) -> String {
        match &self.base_url_ws {
            Some(base_url) => format_ws_url(base_url, &self.currencies),
            None => get_ws_url(self.use_secure, &self.currencies),
        }
    }

    /// Returns whether both API credential values are present and non-empty.
    #[must_use]
    pub fn has_api_credentials(&self) -> bool {
        let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
        present(&self.api_key) && present(&self.api_secret)
    }

    /// Fills missing credentials from the `MTGOX_API_KEY` and `MTGOX_API_SECRET` environment
    /// variables.
    #[must_use]
    pub fn with_env_credentials(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = std::env::var(MTGOX_API_KEY_ENV).ok();
        }
        if self.api_secret.is_none() {
            self.api_secret = std::env::var(MTGOX_API_SECRET_ENV).ok();
        }
        self
    }

    /// Decodes the configured credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured value is malformed.
    pub fn credential(&self) -> MtGoxWsResult<Option<Credential>> {
        Credential::resolve(self.api_key.as_deref(), self.api_secret.as_deref())
    }
}
