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

//! Mt. Gox WebSocket client error types.

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Error types for the Mt. Gox WebSocket client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MtGoxWsError {
    /// Missing or invalid credentials, or a misused client lifecycle.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// A payload did not match the shape of its category.
    #[error("Failed to decode {category} message: {message}")]
    Decode {
        /// The discriminator the message was routed by.
        category: String,
        /// What went wrong.
        message: String,
    },
    /// Transport-level read or write failure.
    #[error("Transport error: {0}")]
    Transport(String),
    /// A frame other than text was received.
    #[error("Unexpected frame: {0}")]
    UnexpectedFrame(String),
    /// Building or signing an authenticated call failed.
    #[error("Signing error: {0}")]
    Signing(String),
    /// JSON serialization error for an outbound message.
    #[error("JSON error: {0}")]
    Json(String),
    /// Client is not connected.
    #[error("Not connected")]
    NotConnected,
    /// Client has been closed.
    #[error("Client closed")]
    Closed,
}

impl MtGoxWsError {
    /// Creates a decode error for the given category.
    pub fn decode(category: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            category: category.into(),
            message: message.to_string(),
        }
    }

    /// Returns whether this error ends the feed handler's read loop.
    #[must_use]
    pub const fn is_fatal_to_feed(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<tungstenite::Error> for MtGoxWsError {
    fn from(error: tungstenite::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

impl From<serde_json::Error> for MtGoxWsError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}

/// Result type alias for Mt. Gox WebSocket operations.
pub type MtGoxWsResult<T> = Result<T, MtGoxWsError>;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_decode_error_display() {
        let err = MtGoxWsError::decode("trade", "bad integer");
        assert_eq!(
            err.to_string(),
            "Failed to decode trade message: bad integer"
        );
        assert!(!err.is_fatal_to_feed());
    }

    #[rstest]
    fn test_transport_is_fatal() {
        assert!(MtGoxWsError::Transport("reset".into()).is_fatal_to_feed());
        assert!(!MtGoxWsError::UnexpectedFrame("binary".into()).is_fatal_to_feed());
    }

    #[rstest]
    fn test_from_serde_json() {
        let err: MtGoxWsError = serde_json::from_str::<u8>("x").unwrap_err().into();
        assert!(matches!(err, MtGoxWsError::Json(_)));
    }
}
