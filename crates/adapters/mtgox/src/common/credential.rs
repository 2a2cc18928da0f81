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

//! Mt. Gox API credential handling and call signing.

#![allow(unused_assignments)] // Fields are used in methods; false positive on some toolchains

use std::fmt::Debug;

use base64::{Engine, engine::general_purpose::STANDARD};
use ring::hmac;
use zeroize::ZeroizeOnDrop;

use crate::websocket::error::MtGoxWsError;

/// Environment variable holding the API key.
pub const MTGOX_API_KEY_ENV: &str = "MTGOX_API_KEY";

/// Environment variable holding the API secret.
pub const MTGOX_API_SECRET_ENV: &str = "MTGOX_API_SECRET";

/// Mt. Gox API credentials for signing authenticated calls.
///
/// Both halves are held decoded, as raw bytes: the key arrives hex-encoded (UUID style, with
/// `-` separators) and the secret base64-encoded. Signatures are HMAC SHA512 keyed by the
/// secret. Key material is zeroized on drop.
#[derive(Clone, ZeroizeOnDrop)]
pub struct Credential {
    api_key: Box<[u8]>,
    api_secret: Box<[u8]>,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(Credential))
            .field("api_key", &self.api_key_hex())
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl Credential {
    /// Creates a new [`Credential`] from already decoded key material.
    #[must_use]
    pub fn new(api_key: Vec<u8>, api_secret: Vec<u8>) -> Self {
        Self {
            api_key: api_key.into_boxed_slice(),
            api_secret: api_secret.into_boxed_slice(),
        }
    }

    /// Decodes credentials from their wire encodings.
    ///
    /// Returns `Ok(None)` when either value is empty once decoded; such a client can stream
    /// but every authenticated call fails.
    ///
    /// # Errors
    ///
    /// Returns [`MtGoxWsError::Configuration`] if the key is not valid hex (after removing
    /// `-` separators) or the secret is not valid standard base64.
    pub fn from_encoded(api_key: &str, api_secret: &str) -> Result<Option<Self>, MtGoxWsError> {
        let key = hex::decode(api_key.replace('-', ""))
            .map_err(|e| MtGoxWsError::Configuration(format!("Invalid API key encoding: {e}")))?;
        let secret = STANDARD.decode(api_secret.trim()).map_err(|e| {
            MtGoxWsError::Configuration(format!("Invalid API secret encoding: {e}"))
        })?;

        if key.is_empty() || secret.is_empty() {
            return Ok(None);
        }

        Ok(Some(Self::new(key, secret)))
    }

    /// Resolves credentials from optional encoded values.
    ///
    /// Every provided value is decoded; an absent value counts as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if a provided value is malformed, even when the other is absent.
    pub fn resolve(
        api_key: Option<&str>,
        api_secret: Option<&str>,
    ) -> Result<Option<Self>, MtGoxWsError> {
        Self::from_encoded(api_key.unwrap_or_default(), api_secret.unwrap_or_default())
    }

    /// Returns the raw API key bytes.
    #[must_use]
    pub fn api_key(&self) -> &[u8] {
        &self.api_key
    }

    /// Returns the API key as lowercase hex without separators.
    #[must_use]
    pub fn api_key_hex(&self) -> String {
        hex::encode(&self.api_key)
    }

    /// Returns a masked hex key for logging.
    #[must_use]
    pub fn api_key_masked(&self) -> String {
        let key = self.api_key_hex();
        if key.len() <= 8 {
            return "*".repeat(key.len());
        }
        format!("{}...{}", &key[..4], &key[key.len() - 4..])
    }

    /// Signs `body` with HMAC SHA512 and returns the raw 64-byte tag.
    ///
    /// The tag covers `body` exactly as given; callers must embed the same bytes.
    #[must_use]
    pub fn sign(&self, body: &[u8]) -> Vec<u8> {
        let key = hmac::Key::new(hmac::HMAC_SHA512, &self.api_secret);
        hmac::sign(&key, body).as_ref().to_vec()
    }

    /// Verifies a tag produced by [`Credential::sign`].
    #[must_use]
    pub fn verify(&self, body: &[u8], signature: &[u8]) -> bool {
        let key = hmac::Key::new(hmac::HMAC_SHA512, &self.api_secret);
        hmac::verify(&key, body, signature).is_ok()
    }
}
