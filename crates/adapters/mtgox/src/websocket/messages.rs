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

//! Data structures for Mt. Gox WebSocket push messages and authenticated calls.

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Map, Value};
use ustr::Ustr;

use crate::common::{
    enums::{MtGoxOrderSide, MtGoxPrivateKind, MtGoxSubscriptionType},
    parse::{
        FieldKind, FieldRule, SimpleTime, apply_field_rules, deserialize_lenient_string,
        deserialize_optional_id, deserialize_string_to_f64, deserialize_string_to_i64,
        deserialize_string_to_u64, epoch_micros_to_datetime, epoch_secs_to_datetime,
    },
};

/// Header fields shared by every pushed message.
///
/// Decoded with the same leniency as the routing sniff: a field of the wrong JSON kind
/// reads as empty rather than failing the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamHeader {
    /// Channel id (UUID).
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub channel: String,
    /// Human-readable channel name (e.g. `trade.BTC`).
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub channel_name: String,
    /// Operation (`private`, `result`, `remark`, ...).
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub op: String,
    /// Origin (`broadcast` for public channels).
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub origin: String,
    /// Routing discriminator.
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub private: String,
}

impl StreamHeader {
    /// Returns the routing category of this message.
    #[must_use]
    pub fn kind(&self) -> MtGoxPrivateKind {
        MtGoxPrivateKind::parse(&self.private)
    }
}

/// Monetary amount as pushed by Mt. Gox.
///
/// `value_int` is exact, scaled by the instrument precision; `value` is a float rendering
/// of the same quantity and may be rounded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MtGoxValue {
    /// Float rendering (string-encoded on the wire).
    #[serde(deserialize_with = "deserialize_string_to_f64")]
    pub value: f64,
    /// Exact scaled integer (string-encoded on the wire).
    #[serde(deserialize_with = "deserialize_string_to_i64")]
    pub value_int: i64,
    /// Display string, e.g. `"$94.50000"`.
    #[serde(default)]
    pub display: String,
    /// Short display string, e.g. `"$94.50"`.
    #[serde(default)]
    pub display_short: String,
    /// Currency code.
    pub currency: Ustr,
}

impl MtGoxValue {
    /// Returns `value_int` divided by `division` (e.g. `BITCOIN_DIVISION`).
    #[must_use]
    pub fn as_units(&self, division: f64) -> f64 {
        self.value_int as f64 / division
    }
}

/// Executed trade from the `trade` channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MtGoxTrade {
    /// Record type (always `trade`).
    pub msg_type: String,
    /// Trade id.
    pub tid: String,
    /// Amount in `value_int` units.
    pub amount: i64,
    /// Price in `value_int` units of the quote currency.
    pub price: i64,
    /// Traded item (e.g. `BTC`).
    pub instrument: Ustr,
    /// Price currency (e.g. `USD`).
    pub currency: Ustr,
    /// Aggressor side (`bid` or `ask`).
    pub trade_type: String,
    /// `Y` when the trade happened in this currency's primary book.
    pub primary: String,
    /// Trade properties (e.g. `limit`, `market`).
    pub properties: String,
    /// Execution time, whole seconds.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Expectation table for the untyped `trade` object.
pub const TRADE_FIELD_RULES: &[FieldRule<MtGoxTrade>] = &[
    FieldRule::new("type", FieldKind::Text, |t, v| t.msg_type = v.into_text()),
    FieldRule::new("tid", FieldKind::Text, |t, v| t.tid = v.into_text()),
    FieldRule::new("item", FieldKind::Text, |t, v| {
        t.instrument = Ustr::from(v.into_text().as_str());
    }),
    FieldRule::new("price_currency", FieldKind::Text, |t, v| {
        t.currency = Ustr::from(v.into_text().as_str());
    }),
    FieldRule::new("trade_type", FieldKind::Text, |t, v| {
        t.trade_type = v.into_text();
    }),
    FieldRule::new("primary", FieldKind::Text, |t, v| t.primary = v.into_text()),
    FieldRule::new("properties", FieldKind::Text, |t, v| {
        t.properties = v.into_text();
    }),
    FieldRule::new("amount_int", FieldKind::IntegerText, |t, v| {
        t.amount = v.as_integer();
    }),
    FieldRule::new("price_int", FieldKind::IntegerText, |t, v| {
        t.price = v.as_integer();
    }),
    FieldRule::new("date", FieldKind::EpochSeconds, |t, v| {
        t.timestamp = v.as_timestamp();
    }),
];

impl<'de> Deserialize<'de> for MtGoxTrade {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        apply_field_rules(&object, TRADE_FIELD_RULES).map_err(de::Error::custom)
    }
}

/// Pushed trade message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MtGoxTradeMsg {
    #[serde(flatten)]
    pub header: StreamHeader,
    pub trade: MtGoxTrade,
}

/// Ticker snapshot from the `ticker` channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MtGoxTicker {
    pub high: MtGoxValue,
    pub low: MtGoxValue,
    pub avg: MtGoxValue,
    pub vwap: MtGoxValue,
    pub vol: MtGoxValue,
    #[serde(default)]
    pub last_local: Option<MtGoxValue>,
    #[serde(default)]
    pub last_orig: Option<MtGoxValue>,
    #[serde(default)]
    pub last_all: Option<MtGoxValue>,
    pub last: MtGoxValue,
    pub buy: MtGoxValue,
    pub sell: MtGoxValue,
    pub item: Ustr,
    /// Server time in epoch microseconds.
    #[serde(deserialize_with = "deserialize_string_to_u64")]
    pub now: u64,
}

impl MtGoxTicker {
    /// Returns the server time of this snapshot.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        epoch_micros_to_datetime(self.now)
    }
}

/// Pushed ticker message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MtGoxTickerMsg {
    #[serde(flatten)]
    pub header: StreamHeader,
    pub ticker: MtGoxTicker,
}

/// Order book change from the `depth` channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MtGoxDepth {
    #[serde(deserialize_with = "deserialize_string_to_f64")]
    pub price: f64,
    /// Numeric side code (1 = ask, 2 = bid).
    #[serde(rename = "type")]
    pub type_code: u8,
    #[serde(rename = "type_str")]
    pub side: MtGoxOrderSide,
    #[serde(deserialize_with = "deserialize_string_to_f64")]
    pub volume: f64,
    #[serde(deserialize_with = "deserialize_string_to_i64")]
    pub price_int: i64,
    /// Volume change at this price, in `value_int` units (negative when removed).
    #[serde(deserialize_with = "deserialize_string_to_i64")]
    pub volume_int: i64,
    /// Resulting total volume at this price.
    #[serde(deserialize_with = "deserialize_string_to_i64")]
    pub total_volume_int: i64,
    pub item: Ustr,
    pub currency: Ustr,
    /// Server time in epoch microseconds.
    #[serde(deserialize_with = "deserialize_string_to_u64")]
    pub now: u64,
}

impl MtGoxDepth {
    /// Returns the server time of this change.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        epoch_micros_to_datetime(self.now)
    }
}

/// Pushed depth message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MtGoxDepthMsg {
    #[serde(flatten)]
    pub header: StreamHeader,
    pub depth: MtGoxDepth,
}

/// Per-currency wallet within an account snapshot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MtGoxWallet {
    #[serde(rename = "Balance")]
    pub balance: MtGoxValue,
    #[serde(rename = "Daily_Withdraw_Limit", default)]
    pub daily_withdraw_limit: Option<MtGoxValue>,
    #[serde(rename = "Max_Withdraw", default)]
    pub max_withdraw: Option<MtGoxValue>,
    #[serde(rename = "Monthly_Withdraw_Limit", default)]
    pub monthly_withdraw_limit: Option<MtGoxValue>,
    #[serde(rename = "Open_Orders", default)]
    pub open_orders: Option<MtGoxValue>,
    #[serde(rename = "Operations", default)]
    pub operations: i64,
}

/// Account snapshot returned by `private/info`.
///
/// Each snapshot stands alone; consumers should not merge it with earlier ones.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MtGoxInfo {
    #[serde(rename = "Created")]
    pub created: SimpleTime,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Index", default)]
    pub index: String,
    #[serde(rename = "Language", default)]
    pub language: String,
    #[serde(rename = "Last_Login", default)]
    pub last_login: Option<SimpleTime>,
    #[serde(rename = "Link", default)]
    pub link: String,
    #[serde(rename = "Login")]
    pub login: String,
    #[serde(rename = "Monthly_Volume", default)]
    pub monthly_volume: Option<MtGoxValue>,
    /// Trade fee in percent.
    #[serde(rename = "Trade_Fee", default)]
    pub trade_fee: f64,
    #[serde(rename = "Rights", default)]
    pub rights: Vec<String>,
    #[serde(rename = "Wallets")]
    pub wallets: AHashMap<String, MtGoxWallet>,
}

/// Open order, from `private/orders` results or `user_order` pushes.
///
/// A `user_order` push carrying only `oid` signals the order was removed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MtGoxOrder {
    pub oid: String,
    #[serde(default)]
    pub currency: Option<Ustr>,
    #[serde(default)]
    pub item: Option<Ustr>,
    #[serde(rename = "type", default)]
    pub side: Option<MtGoxOrderSide>,
    #[serde(default)]
    pub amount: Option<MtGoxValue>,
    #[serde(default)]
    pub effective_amount: Option<MtGoxValue>,
    #[serde(default)]
    pub price: Option<MtGoxValue>,
    #[serde(default)]
    pub status: Option<String>,
    /// Creation time in epoch seconds.
    #[serde(default)]
    pub date: Option<u64>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub actions: Vec<String>,
}

impl MtGoxOrder {
    /// Returns whether this update only carries the id of a removed order.
    #[must_use]
    pub fn is_removal(&self) -> bool {
        self.status.is_none() && self.amount.is_none() && self.price.is_none()
    }

    /// Returns the creation time.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.date.and_then(|secs| epoch_secs_to_datetime(secs as f64))
    }
}

/// Pushed `user_order` message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MtGoxUserOrderMsg {
    #[serde(flatten)]
    pub header: StreamHeader,
    pub user_order: MtGoxOrder,
}

/// Raw response to an authenticated call, before its result shape is inspected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MtGoxResultMsg {
    #[serde(flatten)]
    pub header: StreamHeader,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub result: Value,
}

/// Call result whose shape has no dedicated record (e.g. the oid from `order/add`).
#[derive(Debug, Clone, PartialEq)]
pub struct MtGoxCallResult {
    /// Echoed request id.
    pub id: Option<String>,
    pub result: Value,
}

/// Pushed `debug` message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MtGoxDebugMsg {
    #[serde(flatten)]
    pub header: StreamHeader,
    #[serde(default)]
    pub debug: Value,
}

/// Diagnostic output which carries no typed market or account data.
#[derive(Debug, Clone, PartialEq)]
pub enum MtGoxDiagnostic {
    /// Server debug message.
    Debug(MtGoxDebugMsg),
    /// Message with an unrecognized discriminator, pretty-printed.
    Unroutable { private: String, dump: String },
}

/// A fully decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum MtGoxWsMessage {
    Ticker(Box<MtGoxTickerMsg>),
    Trade(MtGoxTradeMsg),
    Depth(MtGoxDepthMsg),
    Info(Box<MtGoxInfo>),
    Orders(Vec<MtGoxOrder>),
    CallResult(MtGoxCallResult),
    Diagnostic(MtGoxDiagnostic),
}

impl MtGoxWsMessage {
    /// Returns whether this message carries typed data rather than a diagnostic.
    #[must_use]
    pub const fn is_typed_event(&self) -> bool {
        !matches!(self, Self::Diagnostic(_))
    }
}

/// Body of an authenticated call. This is the exact structure that gets signed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MtGoxCallRequest {
    /// Endpoint path, e.g. `private/info`.
    pub call: String,
    pub item: String,
    pub params: Map<String, Value>,
    pub id: u64,
    pub nonce: u64,
}

impl MtGoxCallRequest {
    /// Creates a new [`MtGoxCallRequest`].
    #[must_use]
    pub fn new(
        call: impl Into<String>,
        item: impl Into<String>,
        params: Map<String, Value>,
        id: u64,
        nonce: u64,
    ) -> Self {
        Self {
            call: call.into(),
            item: item.into(),
            params,
            id,
            nonce,
        }
    }
}

/// Transport envelope wrapping a signed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MtGoxCallEnvelope {
    /// Always `call`.
    pub op: String,
    pub id: u64,
    /// Base64 of `api_key || signature || body`.
    pub call: String,
    pub context: String,
}

/// Subscribe request for a public channel type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MtGoxSubscribeRequest {
    pub op: &'static str,
    #[serde(rename = "type")]
    pub subscription_type: MtGoxSubscriptionType,
}

impl MtGoxSubscribeRequest {
    #[must_use]
    pub const fn new(subscription_type: MtGoxSubscriptionType) -> Self {
        Self {
            op: "mtgox.subscribe",
            subscription_type,
        }
    }
}

/// Unsubscribe request for a channel id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MtGoxUnsubscribeRequest {
    pub op: &'static str,
    pub channel: String,
}

impl MtGoxUnsubscribeRequest {
    #[must_use]
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            op: "unsubscribe",
            channel: channel.into(),
        }
    }
}
