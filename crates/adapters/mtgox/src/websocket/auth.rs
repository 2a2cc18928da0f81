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

//! Signing of authenticated Mt. Gox calls.
//!
//! A call body is serialized once; the HMAC SHA512 signature covers those exact bytes and the
//! envelope embeds them verbatim as `base64(api_key || signature || body)`.

use base64::{Engine, engine::general_purpose::STANDARD};

use super::{
    error::{MtGoxWsError, MtGoxWsResult},
    messages::{MtGoxCallEnvelope, MtGoxCallRequest},
};
use crate::common::{consts::MTGOX_CALL_CONTEXT, credential::Credential};

/// Length of an HMAC SHA512 tag in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// Signs `request` and wraps it in a transport envelope.
///
/// # Errors
///
/// Returns [`MtGoxWsError::Signing`] if the request body cannot be serialized.
pub fn sign_call(
    credential: &Credential,
    request: &MtGoxCallRequest,
) -> MtGoxWsResult<MtGoxCallEnvelope> {
    let body = serde_json::to_vec(request)
        .map_err(|e| MtGoxWsError::Signing(format!("Failed to serialize call body: {e}")))?;
    let signature = credential.sign(&body);

    let api_key = credential.api_key();
    let mut payload = Vec::with_capacity(api_key.len() + signature.len() + body.len());
    payload.extend_from_slice(api_key);
    payload.extend_from_slice(&signature);
    payload.extend_from_slice(&body);

    Ok(MtGoxCallEnvelope {
        op: "call".to_string(),
        id: request.id,
        call: STANDARD.encode(payload),
        context: MTGOX_CALL_CONTEXT.to_string(),
    })
}

/// The decoded parts of a signed call payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCallParts {
    pub api_key: Vec<u8>,
    pub signature: Vec<u8>,
    pub body: Vec<u8>,
}

/// Splits the `call` field of an envelope back into key, signature and body.
///
/// `key_len` is the length of the decoded API key (16 bytes for a UUID key).
///
/// # Errors
///
/// Returns [`MtGoxWsError::Signing`] if the payload is not valid base64 or is too short.
pub fn split_call_payload(call: &str, key_len: usize) -> MtGoxWsResult<SignedCallParts> {
    let mut payload = STANDARD
        .decode(call)
        .map_err(|e| MtGoxWsError::Signing(format!("Invalid call payload encoding: {e}")))?;

    if payload.len() < key_len + SIGNATURE_LEN {
        return Err(MtGoxWsError::Signing(format!(
            "Call payload too short: {} bytes",
            payload.len()
        )));
    }

    let body = payload.split_off(key_len + SIGNATURE_LEN);
    let signature = payload.split_off(key_len);

    Ok(SignedCallParts {
        api_key: payload,
        signature,
        body,
    })
}
