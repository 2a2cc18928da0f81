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

//! Header sniffing and per-category payload decoding for Mt. Gox push messages.
//!
//! Decoding is two-phase: [`sniff_header`] extracts the routing discriminator without caring
//! about the payload, then exactly one decoder turns the raw text into a typed record.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{
    error::{MtGoxWsError, MtGoxWsResult},
    messages::{
        MtGoxCallResult, MtGoxDebugMsg, MtGoxDepthMsg, MtGoxDiagnostic, MtGoxInfo, MtGoxOrder,
        MtGoxResultMsg, MtGoxTickerMsg, MtGoxTradeMsg, MtGoxUserOrderMsg, MtGoxWsMessage,
        StreamHeader,
    },
};
use crate::common::enums::MtGoxPrivateKind;

/// Extracts the stream header from a raw message.
///
/// Best effort: malformed JSON yields an empty header, and a header field holding anything
/// other than a string is left empty. Failures surface later, from the payload decoder.
#[must_use]
pub fn sniff_header(text: &str) -> StreamHeader {
    let Ok(Value::Object(object)) = serde_json::from_str::<Value>(text) else {
        return StreamHeader::default();
    };

    let field = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    StreamHeader {
        channel: field("channel"),
        channel_name: field("channel_name"),
        op: field("op"),
        origin: field("origin"),
        private: field("private"),
    }
}

fn decode_as<T: DeserializeOwned>(kind: &MtGoxPrivateKind, text: &str) -> MtGoxWsResult<T> {
    serde_json::from_str(text).map_err(|e| MtGoxWsError::decode(kind.as_str(), e))
}

/// Decodes a `trade` message.
///
/// # Errors
///
/// Returns [`MtGoxWsError::Decode`] if the `trade` object is missing, a field has the wrong
/// JSON kind, or an integer field is not a base-10 `i64`.
pub fn parse_trade_msg(text: &str) -> MtGoxWsResult<MtGoxTradeMsg> {
    decode_as(&MtGoxPrivateKind::Trade, text)
}

/// Decodes a `ticker` message.
///
/// # Errors
///
/// Returns [`MtGoxWsError::Decode`] if the payload does not match the ticker shape.
pub fn parse_ticker_msg(text: &str) -> MtGoxWsResult<MtGoxTickerMsg> {
    decode_as(&MtGoxPrivateKind::Ticker, text)
}

/// Decodes a `depth` message.
///
/// # Errors
///
/// Returns [`MtGoxWsError::Decode`] if the payload does not match the depth shape.
pub fn parse_depth_msg(text: &str) -> MtGoxWsResult<MtGoxDepthMsg> {
    decode_as(&MtGoxPrivateKind::Depth, text)
}

/// Decodes a `debug` message.
///
/// # Errors
///
/// Returns [`MtGoxWsError::Decode`] if the text is not a JSON object.
pub fn parse_debug_msg(text: &str) -> MtGoxWsResult<MtGoxDebugMsg> {
    decode_as(&MtGoxPrivateKind::Debug, text)
}

/// Decodes a `user_order` message.
///
/// # Errors
///
/// Returns [`MtGoxWsError::Decode`] if the payload does not match the order shape.
pub fn parse_user_order_msg(text: &str) -> MtGoxWsResult<MtGoxUserOrderMsg> {
    decode_as(&MtGoxPrivateKind::UserOrder, text)
}

/// Decodes a `result` message, selecting the record by the shape of its `result` value.
///
/// - An object carrying `Wallets` or `Login` is an account snapshot.
/// - An array is an order list.
/// - Anything else is passed through untyped.
///
/// # Errors
///
/// Returns [`MtGoxWsError::Decode`] if the envelope or the selected record fails to decode.
pub fn parse_result_msg(text: &str) -> MtGoxWsResult<MtGoxWsMessage> {
    let kind = MtGoxPrivateKind::Result;
    let msg: MtGoxResultMsg = decode_as(&kind, text)?;

    match msg.result {
        Value::Object(ref object)
            if object.contains_key("Wallets") || object.contains_key("Login") =>
        {
            let info: MtGoxInfo = serde_json::from_value(msg.result)
                .map_err(|e| MtGoxWsError::decode(kind.as_str(), e))?;
            Ok(MtGoxWsMessage::Info(Box::new(info)))
        }
        Value::Array(_) => {
            let orders: Vec<MtGoxOrder> = serde_json::from_value(msg.result)
                .map_err(|e| MtGoxWsError::decode(kind.as_str(), e))?;
            Ok(MtGoxWsMessage::Orders(orders))
        }
        result => Ok(MtGoxWsMessage::CallResult(MtGoxCallResult { id: msg.id, result })),
    }
}

/// Produces the diagnostic dump for a message with an unrecognized discriminator.
///
/// # Errors
///
/// Returns [`MtGoxWsError::Decode`] if the text is not JSON at all.
pub fn parse_unroutable(private: &str, text: &str) -> MtGoxWsResult<MtGoxDiagnostic> {
    let category = if private.is_empty() {
        "unknown"
    } else {
        private
    };
    let value: Value =
        serde_json::from_str(text).map_err(|e| MtGoxWsError::decode(category, e))?;
    let dump = serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string());

    Ok(MtGoxDiagnostic::Unroutable {
        private: private.to_string(),
        dump,
    })
}

/// Classifies and decodes a raw text frame.
///
/// # Errors
///
/// Returns [`MtGoxWsError::Decode`] if the decoder selected by the discriminator fails.
pub fn decode_message(text: &str) -> MtGoxWsResult<MtGoxWsMessage> {
    let header = sniff_header(text);

    match header.kind() {
        MtGoxPrivateKind::Debug => parse_debug_msg(text)
            .map(|msg| MtGoxWsMessage::Diagnostic(MtGoxDiagnostic::Debug(msg))),
        MtGoxPrivateKind::Ticker => {
            parse_ticker_msg(text).map(|msg| MtGoxWsMessage::Ticker(Box::new(msg)))
        }
        MtGoxPrivateKind::Trade => parse_trade_msg(text).map(MtGoxWsMessage::Trade),
        MtGoxPrivateKind::Depth => parse_depth_msg(text).map(MtGoxWsMessage::Depth),
        MtGoxPrivateKind::Result => parse_result_msg(text),
        MtGoxPrivateKind::UserOrder => {
            parse_user_order_msg(text).map(|msg| MtGoxWsMessage::Orders(vec![msg.user_order]))
        }
        MtGoxPrivateKind::Unknown(private) => {
            parse_unroutable(&private, text).map(MtGoxWsMessage::Diagnostic)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::common::enums::MtGoxOrderSide;

    const TRADE_JSON: &str = include_str!("../../test_data/ws_trade.json");
    const TICKER_JSON: &str = include_str!("../../test_data/ws_ticker.json");
    const DEPTH_JSON: &str = include_str!("../../test_data/ws_depth.json");
    const INFO_JSON: &str = include_str!("../../test_data/ws_result_info.json");
    const ORDERS_JSON: &str = include_str!("../../test_data/ws_result_orders.json");
    const USER_ORDER_JSON: &str = include_str!("../../test_data/ws_user_order.json");
    const DEBUG_JSON: &str = include_str!("../../test_data/ws_debug.json");
    const REMARK_JSON: &str = include_str!("../../test_data/ws_remark.json");

    #[rstest]
    fn test_sniff_header_reads_routing_fields() {
        let header = sniff_header(TRADE_JSON);
        assert_eq!(header.private, "trade");
        assert_eq!(header.channel_name, "trade.BTC");
        assert_eq!(header.origin, "broadcast");
        assert_eq!(header.kind(), MtGoxPrivateKind::Trade);
    }

    #[rstest]
    #[case("")]
    #[case("{not json")]
    #[case("[1, 2, 3]")]
    #[case(r#"{"private": 5}"#)]
    fn test_sniff_header_is_best_effort(#[case] text: &str) {
        let header = sniff_header(text);
        assert!(header.private.is_empty());
        assert_eq!(header.kind(), MtGoxPrivateKind::Unknown(String::new()));
    }

    #[rstest]
    fn test_sniff_header_ignores_payload_shape() {
        let header = sniff_header(r#"{"private":"trade","channel":7,"trade":"garbage"}"#);
        assert_eq!(header.private, "trade");
        assert!(header.channel.is_empty());
    }

    #[rstest]
    fn test_decode_trade_scenario() {
        let text = r#"{"private":"trade","trade":{"type":"trade","tid":"123","amount_int":"500000000","price_int":"4200000000","item":"BTC","price_currency":"USD","trade_type":"ask","date":1700000000}}"#;

        let msg = parse_trade_msg(text).unwrap();
        let trade = msg.trade;

        assert_eq!(trade.msg_type, "trade");
        assert_eq!(trade.tid, "123");
        assert_eq!(trade.amount, 500_000_000);
        assert_eq!(trade.price, 4_200_000_000);
        assert_eq!(trade.instrument.as_str(), "BTC");
        assert_eq!(trade.currency.as_str(), "USD");
        assert_eq!(trade.trade_type, "ask");
        assert_eq!(
            trade.timestamp,
            Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap())
        );
        assert_eq!(msg.header.private, "trade");
    }

    #[rstest]
    fn test_decode_trade_tolerates_mistyped_header_fields() {
        let text = r#"{"private":"trade","channel":7,"origin":null,"trade":{"tid":"9","amount_int":"1","price_int":"2"}}"#;

        let MtGoxWsMessage::Trade(msg) = decode_message(text).unwrap() else {
            panic!("expected trade");
        };

        assert_eq!(msg.trade.tid, "9");
        assert_eq!(msg.header.private, "trade");
        assert!(msg.header.channel.is_empty());
        assert!(msg.header.origin.is_empty());
    }

    #[rstest]
    #[case("0")]
    #[case("1")]
    #[case("-1")]
    #[case("500000000")]
    #[case("9223372036854775807")]
    #[case("-9223372036854775808")]
    fn test_trade_integer_fields_round_trip_exactly(#[case] raw: &str) {
        let text = json!({
            "private": "trade",
            "trade": {"amount_int": raw, "price_int": raw}
        })
        .to_string();

        let trade = parse_trade_msg(&text).unwrap().trade;
        assert_eq!(trade.amount.to_string(), raw);
        assert_eq!(trade.price.to_string(), raw);
    }

    #[rstest]
    #[case(json!({"amount_int": "5.0"}))]
    #[case(json!({"price_int": "9223372036854775808"}))]
    #[case(json!({"price_int": ""}))]
    #[case(json!({"amount_int": 500}))]
    #[case(json!({"date": "1700000000"}))]
    #[case(json!({"tid": 123}))]
    fn test_trade_decode_failures(#[case] trade: Value) {
        let text = json!({"private": "trade", "trade": trade}).to_string();
        let err = parse_trade_msg(&text).unwrap_err();
        assert!(
            matches!(err, MtGoxWsError::Decode { ref category, .. } if category == "trade"),
            "unexpected error {err:?}"
        );
    }

    #[rstest]
    fn test_trade_missing_payload_fails() {
        assert!(parse_trade_msg(r#"{"private":"trade"}"#).is_err());
    }

    #[rstest]
    fn test_decode_trade_fixture() {
        let MtGoxWsMessage::Trade(msg) = decode_message(TRADE_JSON).unwrap() else {
            panic!("expected trade");
        };
        assert_eq!(msg.trade.amount, 500_000_000);
        assert_eq!(msg.trade.price, 4_200_000);
        assert_eq!(msg.trade.primary, "Y");
        assert_eq!(msg.trade.properties, "limit");
        assert_eq!(msg.header.channel, "dbf1dee9-4f2e-4a08-8cb7-748919a71b21");
    }

    #[rstest]
    fn test_decode_ticker_fixture() {
        let MtGoxWsMessage::Ticker(msg) = decode_message(TICKER_JSON).unwrap() else {
            panic!("expected ticker");
        };
        let ticker = &msg.ticker;
        assert_eq!(ticker.last.value_int, 9_450_000);
        assert_eq!(ticker.buy.value_int, 9_440_000);
        assert_eq!(ticker.sell.value_int, 9_460_000);
        assert_eq!(ticker.vol.currency.as_str(), "BTC");
        assert_eq!(ticker.item.as_str(), "BTC");
        assert_eq!(ticker.timestamp().unwrap().timestamp(), 1_364_689_759);
        assert!(ticker.last_all.is_some());
    }

    #[rstest]
    fn test_decode_ticker_missing_value_fails() {
        let text = json!({"private": "ticker", "ticker": {"item": "BTC", "now": "1"}}).to_string();
        let err = decode_message(&text).unwrap_err();
        assert!(matches!(err, MtGoxWsError::Decode { ref category, .. } if category == "ticker"));
    }

    #[rstest]
    fn test_decode_depth_fixture() {
        let MtGoxWsMessage::Depth(msg) = decode_message(DEPTH_JSON).unwrap() else {
            panic!("expected depth");
        };
        let depth = &msg.depth;
        assert_eq!(depth.side, MtGoxOrderSide::Bid);
        assert_eq!(depth.type_code, 2);
        assert_eq!(depth.price_int, 9_463_000);
        assert_eq!(depth.volume_int, -25_000_000);
        assert_eq!(depth.total_volume_int, 85_000_000);
        assert_eq!(depth.currency.as_str(), "USD");
    }

    #[rstest]
    fn test_decode_result_info_fixture() {
        let MtGoxWsMessage::Info(info) = decode_message(INFO_JSON).unwrap() else {
            panic!("expected info");
        };
        assert_eq!(info.login, "satoshi");
        assert_eq!(
            info.created.0,
            NaiveDate::from_ymd_opt(2011, 6, 10)
                .unwrap()
                .and_hms_opt(9, 16, 43)
                .unwrap()
        );
        assert!(info.last_login.is_some());
        assert_eq!(info.rights, vec!["get_info", "trade"]);
        assert!((info.trade_fee - 0.6).abs() < f64::EPSILON);

        let btc = &info.wallets["BTC"];
        assert_eq!(btc.balance.value_int, 150_000_000);
        assert_eq!(btc.operations, 42);
        assert!(btc.monthly_withdraw_limit.is_none());
        assert_eq!(btc.open_orders.as_ref().unwrap().value_int, 25_000_000);

        let usd = &info.wallets["USD"];
        assert_eq!(usd.balance.value_int, 25_000_000);
        assert!(usd.max_withdraw.is_none());
    }

    #[rstest]
    fn test_decode_result_info_with_bad_time_fails() {
        let mut value: Value = serde_json::from_str(INFO_JSON).unwrap();
        value["result"]["Created"] = json!("2011/06/10");
        let err = decode_message(&value.to_string()).unwrap_err();
        assert!(matches!(err, MtGoxWsError::Decode { ref category, .. } if category == "result"));
    }

    #[rstest]
    fn test_decode_result_orders_fixture() {
        let MtGoxWsMessage::Orders(orders) = decode_message(ORDERS_JSON).unwrap() else {
            panic!("expected orders");
        };
        assert_eq!(orders.len(), 1);
        let order = &orders[0];
        assert_eq!(order.side, Some(MtGoxOrderSide::Bid));
        assert_eq!(order.price.as_ref().unwrap().value_int, 9_000_000);
        assert_eq!(order.status.as_deref(), Some("open"));
        assert_eq!(order.timestamp().unwrap().timestamp(), 1_366_307_011);
        assert!(!order.is_removal());
    }

    #[rstest]
    fn test_decode_result_passthrough() {
        let text = r#"{"op":"result","private":"result","id":3,"result":"6f9f0b5a-oid"}"#;
        let MtGoxWsMessage::CallResult(result) = decode_message(text).unwrap() else {
            panic!("expected call result");
        };
        assert_eq!(result.id.as_deref(), Some("3"));
        assert_eq!(result.result, json!("6f9f0b5a-oid"));
    }

    #[rstest]
    fn test_decode_user_order_fixture() {
        let MtGoxWsMessage::Orders(orders) = decode_message(USER_ORDER_JSON).unwrap() else {
            panic!("expected orders");
        };
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].side, Some(MtGoxOrderSide::Ask));
        assert_eq!(orders[0].actions, vec!["placed"]);
    }

    #[rstest]
    fn test_decode_debug_fixture() {
        let msg = decode_message(DEBUG_JSON).unwrap();
        assert!(!msg.is_typed_event());
        let MtGoxWsMessage::Diagnostic(MtGoxDiagnostic::Debug(debug)) = msg else {
            panic!("expected debug diagnostic");
        };
        assert_eq!(debug.debug["message"], "Subscribed to channel");
    }

    #[rstest]
    fn test_decode_unknown_discriminator_is_diagnostic() {
        let msg = decode_message(REMARK_JSON).unwrap();
        assert!(!msg.is_typed_event());
        let MtGoxWsMessage::Diagnostic(MtGoxDiagnostic::Unroutable { private, dump }) = msg else {
            panic!("expected unroutable diagnostic");
        };
        assert!(private.is_empty());
        assert!(dump.contains("\"message\": \"Invalid call\""));
        assert!(dump.contains('\n'));
    }

    #[rstest]
    fn test_decode_unrecognized_private_value() {
        let text = r#"{"private":"wallet","wallet":{"op":"in"}}"#;
        let MtGoxWsMessage::Diagnostic(MtGoxDiagnostic::Unroutable { private, .. }) =
            decode_message(text).unwrap()
        else {
            panic!("expected unroutable diagnostic");
        };
        assert_eq!(private, "wallet");
    }

    #[rstest]
    fn test_decode_malformed_json_fails() {
        let err = decode_message("{\"private\": \"trade\"").unwrap_err();
        assert!(matches!(err, MtGoxWsError::Decode { ref category, .. } if category == "unknown"));
    }
}
