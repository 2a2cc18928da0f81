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

//! URL helpers for the Mt. Gox streaming endpoint.

use super::consts::{MTGOX_WS_PATH, MTGOX_WS_SECURE_URL, MTGOX_WS_URL};

/// Returns the WebSocket host URL.
#[must_use]
pub const fn get_ws_base_url(use_secure: bool) -> &'static str {
    if use_secure {
        MTGOX_WS_SECURE_URL
    } else {
        MTGOX_WS_URL
    }
}

/// Returns the full streaming URL subscribing to the given currencies.
///
/// The endpoint takes currencies as a single comma-joined `Currency` query parameter.
#[must_use]
pub fn get_ws_url(use_secure: bool, currencies: &[String]) -> String {
    format_ws_url(get_ws_base_url(use_secure), currencies)
}

/// Appends the streaming path and currency query to `base_url`.
#[must_use]
pub fn format_ws_url(base_url: &str, currencies: &[String]) -> String {
    let base_url = base_url.trim_end_matches('/');
    format!(
        "{base_url}{MTGOX_WS_PATH}?Currency={}",
        currencies.join(",")
    )
}
