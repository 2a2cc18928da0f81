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

//! Enumerations for Mt. Gox stream discriminators and order fields.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The `private` discriminator carried by every pushed message.
///
/// Known categories each map to exactly one decoder. Anything else, including an
/// absent or empty discriminator, lands in [`MtGoxPrivateKind::Unknown`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum MtGoxPrivateKind {
    /// Server debug output.
    Debug,
    /// Ticker snapshot.
    Ticker,
    /// Executed trade.
    Trade,
    /// Order book depth change.
    Depth,
    /// Response to an authenticated call.
    Result,
    /// Private order update for the authenticated account.
    UserOrder,
    /// Unrecognized discriminator, carried verbatim.
    #[strum(default)]
    Unknown(String),
}

impl MtGoxPrivateKind {
    /// Classifies a raw discriminator value.
    #[must_use]
    pub fn parse(private: &str) -> Self {
        // The `default` variant makes this infallible
        Self::from_str(private).unwrap_or_else(|_| Self::Unknown(private.to_string()))
    }

    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Debug => "debug",
            Self::Ticker => "ticker",
            Self::Trade => "trade",
            Self::Depth => "depth",
            Self::Result => "result",
            Self::UserOrder => "user_order",
            Self::Unknown(private) => private,
        }
    }

    /// Returns whether this discriminator has a dedicated decoder.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl std::fmt::Display for MtGoxPrivateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Order side as used by Mt. Gox (`bid` buys, `ask` sells).
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MtGoxOrderSide {
    Bid,
    Ask,
}

/// Public channel types accepted by `mtgox.subscribe`.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MtGoxSubscriptionType {
    Ticker,
    Depth,
    Trades,
    Lag,
}
