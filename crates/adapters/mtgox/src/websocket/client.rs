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

//! Mt. Gox WebSocket client facade.
//!
//! The client owns the output queues, the call signer and the write half of the transport.
//! A single feed handler task drains the read half and publishes into the queues; any number
//! of tasks may issue calls concurrently through a shared reference.

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use serde_json::{Map, Value, json};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{
    auth::sign_call,
    error::{MtGoxWsError, MtGoxWsResult},
    handler::{DispatchExit, FeedPublishers, MtGoxStreams, MtGoxWsFeedHandler, feed_queues},
    messages::{MtGoxCallRequest, MtGoxSubscribeRequest, MtGoxUnsubscribeRequest},
    transport::{FrameReader, FrameWriter, TungsteniteTransport},
};
use crate::{
    common::{
        consts::MTGOX_ORIGIN_URL,
        credential::Credential,
        enums::{MtGoxOrderSide, MtGoxSubscriptionType},
        sequencer::{CallSequencer, MonotonicSequencer},
    },
    config::MtGoxWsConfig,
};

type SharedWriter = Arc<tokio::sync::Mutex<Option<Box<dyn FrameWriter>>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Streaming client for the Mt. Gox push API.
pub struct MtGoxWebSocketClient {
    config: MtGoxWsConfig,
    credential: Option<Credential>,
    sequencer: Arc<dyn CallSequencer>,
    cancel: CancellationToken,
    writer: SharedWriter,
    publishers: Mutex<Option<FeedPublishers>>,
    streams: Mutex<Option<MtGoxStreams>>,
    task_handle: Mutex<Option<JoinHandle<DispatchExit>>>,
    closed: AtomicBool,
}

impl std::fmt::Debug for MtGoxWebSocketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(MtGoxWebSocketClient))
            .field("url", &self.config.ws_url())
            .field("credential", &self.credential)
            .field("sequencer", &self.sequencer)
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl MtGoxWebSocketClient {
    /// Creates a new [`MtGoxWebSocketClient`] with the default call sequencer.
    ///
    /// # Errors
    ///
    /// Returns [`MtGoxWsError::Configuration`] if configured credentials are malformed.
    pub fn new(config: MtGoxWsConfig) -> MtGoxWsResult<Self> {
        Self::new_with_sequencer(config, Arc::new(MonotonicSequencer::new()))
    }

    /// Creates a new [`MtGoxWebSocketClient`] drawing ids and nonces from `sequencer`.
    ///
    /// # Errors
    ///
    /// Returns [`MtGoxWsError::Configuration`] if configured credentials are malformed.
    pub fn new_with_sequencer(
        config: MtGoxWsConfig,
        sequencer: Arc<dyn CallSequencer>,
    ) -> MtGoxWsResult<Self> {
        let credential = config.credential()?;
        match &credential {
            Some(credential) => tracing::debug!(
                "Mt. Gox client configured with API key {}",
                credential.api_key_masked()
            ),
            None => tracing::debug!("Mt. Gox client configured without credentials"),
        }

        let (publishers, streams) = feed_queues(
            config.event_capacity,
            config.event_overflow,
            config.error_capacity,
        );

        Ok(Self {
            config,
            credential,
            sequencer,
            cancel: CancellationToken::new(),
            writer: Arc::new(tokio::sync::Mutex::new(None)),
            publishers: Mutex::new(Some(publishers)),
            streams: Mutex::new(Some(streams)),
            task_handle: Mutex::new(None),
            closed: AtomicBool::new(false),
        })
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &MtGoxWsConfig {
        &self.config
    }

    /// Returns whether authenticated calls can be signed.
    #[must_use]
    pub const fn has_credentials(&self) -> bool {
        self.credential.is_some()
    }

    /// Returns whether the feed handler is running and the client is open.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.is_closed()
            && lock(&self.task_handle)
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }

    /// Returns whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Returns the output queues. Only the first call yields them.
    pub fn take_streams(&self) -> Option<MtGoxStreams> {
        lock(&self.streams).take()
    }

    /// Connects to the configured endpoint and starts the feed handler.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is closed or already started, or the handshake fails.
    pub async fn connect(&self) -> MtGoxWsResult<()> {
        self.ensure_startable()?;

        let url = self.config.ws_url();
        tracing::debug!("Connecting to {url}");
        let (reader, writer) = TungsteniteTransport::connect(&url, MTGOX_ORIGIN_URL).await?;

        self.start_with_transport(Box::new(reader), Box::new(writer))
            .await
    }

    /// Starts the feed handler over an already connected transport.
    ///
    /// # Errors
    ///
    /// Returns [`MtGoxWsError::Closed`] after [`close`](Self::close), or
    /// [`MtGoxWsError::Configuration`] if the client was already started.
    pub async fn start_with_transport(
        &self,
        reader: Box<dyn FrameReader>,
        writer: Box<dyn FrameWriter>,
    ) -> MtGoxWsResult<()> {
        self.ensure_startable()?;
        let Some(publishers) = lock(&self.publishers).take() else {
            return Err(MtGoxWsError::Configuration(
                "client already started".to_string(),
            ));
        };

        *self.writer.lock().await = Some(writer);

        let handler = MtGoxWsFeedHandler::new(self.cancel.clone(), reader, publishers);
        let handle = tokio::spawn(handler.run());
        *lock(&self.task_handle) = Some(handle);

        tracing::debug!("Started Mt. Gox feed handler");
        Ok(())
    }

    fn ensure_startable(&self) -> MtGoxWsResult<()> {
        if self.is_closed() {
            return Err(MtGoxWsError::Closed);
        }
        if lock(&self.publishers).is_none() {
            return Err(MtGoxWsError::Configuration(
                "client already started".to_string(),
            ));
        }
        Ok(())
    }

    /// Performs an authenticated call and returns its request id.
    ///
    /// The response arrives asynchronously on the queue matching its shape.
    ///
    /// # Errors
    ///
    /// Returns [`MtGoxWsError::Configuration`] without credentials (before any id is drawn),
    /// [`MtGoxWsError::Closed`] after close, [`MtGoxWsError::NotConnected`] before start, or a
    /// signing or transport error.
    pub async fn call(
        &self,
        endpoint: &str,
        params: Option<Map<String, Value>>,
    ) -> MtGoxWsResult<u64> {
        let Some(credential) = &self.credential else {
            return Err(MtGoxWsError::Configuration(
                "API credentials required for authenticated calls".to_string(),
            ));
        };
        if self.is_closed() {
            return Err(MtGoxWsError::Closed);
        }

        // Held from drawing the nonce until the write so nonces reach the wire in order
        let mut slot = self.writer.lock().await;
        let writer = self.open_writer(&mut slot)?;

        let id = self.sequencer.next_id();
        let nonce = self.sequencer.next_nonce();
        let request = MtGoxCallRequest::new(
            endpoint,
            self.config.item.as_str(),
            params.unwrap_or_default(),
            id,
            nonce,
        );
        let envelope = sign_call(credential, &request)?;
        let text = serde_json::to_string(&envelope)?;

        tracing::debug!("Sending call {endpoint} (id={id})");
        write_frame(writer, text).await?;
        Ok(id)
    }

    /// Requests an account snapshot (`private/info`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn request_info(&self) -> MtGoxWsResult<u64> {
        self.call("private/info", None).await
    }

    /// Requests the open order list (`private/orders`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn request_orders(&self) -> MtGoxWsResult<u64> {
        self.call("private/orders", None).await
    }

    /// Places an order (`order/add`). Omitting `price_int` places a market order.
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn submit_order(
        &self,
        side: MtGoxOrderSide,
        amount_int: i64,
        price_int: Option<i64>,
    ) -> MtGoxWsResult<u64> {
        let mut params = Map::new();
        params.insert("type".to_string(), json!(side.as_ref()));
        params.insert("amount_int".to_string(), json!(amount_int));
        if let Some(price_int) = price_int {
            params.insert("price_int".to_string(), json!(price_int));
        }
        self.call("order/add", Some(params)).await
    }

    /// Cancels an order by id (`order/cancel`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn cancel_order(&self, oid: &str) -> MtGoxWsResult<u64> {
        let mut params = Map::new();
        params.insert("oid".to_string(), json!(oid));
        self.call("order/cancel", Some(params)).await
    }

    /// Subscribes to a public channel type.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is closed or not started, or the write fails.
    pub async fn subscribe_type(
        &self,
        subscription_type: MtGoxSubscriptionType,
    ) -> MtGoxWsResult<()> {
        let text = serde_json::to_string(&MtGoxSubscribeRequest::new(subscription_type))?;
        tracing::debug!("Subscribing to {subscription_type}");
        self.send_text(text).await
    }

    /// Unsubscribes from a channel by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is closed or not started, or the write fails.
    pub async fn unsubscribe(&self, channel: &str) -> MtGoxWsResult<()> {
        let text = serde_json::to_string(&MtGoxUnsubscribeRequest::new(channel))?;
        tracing::debug!("Unsubscribing from channel {channel}");
        self.send_text(text).await
    }

    async fn send_text(&self, text: String) -> MtGoxWsResult<()> {
        let mut slot = self.writer.lock().await;
        let writer = self.open_writer(&mut slot)?;
        write_frame(writer, text).await
    }

    fn open_writer<'a>(
        &self,
        slot: &'a mut Option<Box<dyn FrameWriter>>,
    ) -> MtGoxWsResult<&'a mut Box<dyn FrameWriter>> {
        if self.is_closed() {
            return Err(MtGoxWsError::Closed);
        }
        slot.as_mut().ok_or(MtGoxWsError::NotConnected)
    }

    /// Shuts the client down.
    ///
    /// Signals the feed handler (interrupting a pending read) and closes the transport.
    ///
    /// # Errors
    ///
    /// Returns [`MtGoxWsError::Closed`] if already closed, or a transport error from the close
    /// handshake.
    pub async fn close(&self) -> MtGoxWsResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(MtGoxWsError::Closed);
        }

        tracing::info!("Closing Mt. Gox WebSocket connection");
        self.cancel.cancel();

        let writer = self.writer.lock().await.take();
        match writer {
            Some(mut writer) => writer.close().await,
            None => Ok(()),
        }
    }

    /// Waits for the feed handler to stop and returns why it stopped.
    ///
    /// # Errors
    ///
    /// Returns [`MtGoxWsError::NotConnected`] if the handler was never started (or was already
    /// awaited), or [`MtGoxWsError::Transport`] if the task panicked.
    pub async fn wait_for_exit(&self) -> MtGoxWsResult<DispatchExit> {
        let Some(handle) = lock(&self.task_handle).take() else {
            return Err(MtGoxWsError::NotConnected);
        };

        handle
            .await
            .map_err(|e| MtGoxWsError::Transport(format!("Feed handler task failed: {e}")))
    }
}

async fn write_frame(writer: &mut Box<dyn FrameWriter>, text: String) -> MtGoxWsResult<()> {
    writer.write_text(text).await.inspect_err(|e| {
        tracing::error!("WebSocket write failed: {e}");
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::rstest;

    use super::*;
    use crate::{
        common::{queue::OverflowPolicy, sequencer::FixedStepSequencer},
        testing::{MockFeed, RecordingWriter, mock_reader, text_frame, wait_until_async},
        websocket::{
            auth::split_call_payload,
            messages::MtGoxCallEnvelope,
            transport::Frame,
        },
    };

    const KEY: &str = "0123abcd-4567-89ef-0123-456789abcdef";
    const SECRET: &str = "c2VjcmV0LWJ5dGVz";
    const TRADE_JSON: &str = include_str!("../../test_data/ws_trade.json");

    fn config(key: Option<&str>, secret: Option<&str>) -> MtGoxWsConfig {
        MtGoxWsConfig {
            api_key: key.map(str::to_string),
            api_secret: secret.map(str::to_string),
            ..Default::default()
        }
    }

    async fn started_client(
        config: MtGoxWsConfig,
        sequencer: Arc<FixedStepSequencer>,
    ) -> (MtGoxWebSocketClient, MockFeed, RecordingWriter) {
        let client = MtGoxWebSocketClient::new_with_sequencer(config, sequencer).unwrap();
        let (feed, reader) = mock_reader();
        let writer = RecordingWriter::default();
        client
            .start_with_transport(Box::new(reader), Box::new(writer.clone()))
            .await
            .unwrap();
        (client, feed, writer)
    }

    fn envelope(text: &str) -> MtGoxCallEnvelope {
        serde_json::from_str(text).unwrap()
    }

    fn call_body(text: &str) -> Value {
        let parts = split_call_payload(&envelope(text).call, 16).unwrap();
        serde_json::from_slice(&parts.body).unwrap()
    }

    #[rstest]
    #[case(Some("zz"), Some(SECRET))]
    #[case(Some("zz-not-hex"), None)]
    #[case(None, Some("not base64!"))]
    fn test_malformed_credentials_fail_construction(
        #[case] key: Option<&str>,
        #[case] secret: Option<&str>,
    ) {
        let result = MtGoxWebSocketClient::new(config(key, secret));
        assert!(matches!(result, Err(MtGoxWsError::Configuration(_))));
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), Some(""))]
    #[case(Some(KEY), Some(""))]
    #[case(Some(""), Some(SECRET))]
    #[tokio::test]
    async fn test_calls_without_credentials_fail_before_transport(
        #[case] key: Option<&str>,
        #[case] secret: Option<&str>,
    ) {
        let sequencer = Arc::new(FixedStepSequencer::new(1, 100));
        let (client, _feed, writer) = started_client(config(key, secret), sequencer.clone()).await;
        assert!(!client.has_credentials());

        assert!(matches!(
            client.request_info().await,
            Err(MtGoxWsError::Configuration(_))
        ));
        assert!(matches!(
            client.submit_order(MtGoxOrderSide::Bid, 100, Some(200)).await,
            Err(MtGoxWsError::Configuration(_))
        ));
        assert!(matches!(
            client.cancel_order("abc").await,
            Err(MtGoxWsError::Configuration(_))
        ));

        assert!(writer.texts().is_empty());
        assert_eq!(sequencer.next_id(), 1);
        assert_eq!(sequencer.next_nonce(), 100);
    }

    #[tokio::test]
    async fn test_call_writes_signed_envelope() {
        let sequencer = Arc::new(FixedStepSequencer::new(1, 1_700_000_000_000_000));
        let (client, _feed, writer) =
            started_client(config(Some(KEY), Some(SECRET)), sequencer).await;

        let id = client.request_info().await.unwrap();
        assert_eq!(id, 1);

        let texts = writer.texts();
        assert_eq!(texts.len(), 1);
        let envelope = envelope(&texts[0]);
        assert_eq!(envelope.op, "call");
        assert_eq!(envelope.id, 1);
        assert_eq!(envelope.context, "mtgox.com");

        let credential = Credential::from_encoded(KEY, SECRET).unwrap().unwrap();
        let parts = split_call_payload(&envelope.call, 16).unwrap();
        assert_eq!(parts.api_key, credential.api_key());
        assert!(credential.verify(&parts.body, &parts.signature));
        assert_eq!(
            String::from_utf8(parts.body).unwrap(),
            r#"{"call":"private/info","item":"BTC","params":{},"id":1,"nonce":1700000000000000}"#
        );
    }

    #[tokio::test]
    async fn test_each_call_consumes_one_id_and_nonce() {
        let sequencer = Arc::new(FixedStepSequencer::new(10, 500));
        let (client, _feed, writer) =
            started_client(config(Some(KEY), Some(SECRET)), sequencer).await;

        assert_eq!(client.request_info().await.unwrap(), 10);
        assert_eq!(client.request_orders().await.unwrap(), 11);
        assert_eq!(client.cancel_order("oid-1").await.unwrap(), 12);

        let bodies: Vec<Value> = writer.texts().iter().map(|t| call_body(t)).collect();
        let nonces: Vec<u64> = bodies.iter().map(|b| b["nonce"].as_u64().unwrap()).collect();
        assert_eq!(nonces, vec![500, 501, 502]);
        assert_eq!(bodies[1]["call"], "private/orders");
        assert_eq!(bodies[2]["call"], "order/cancel");
        assert_eq!(bodies[2]["params"]["oid"], "oid-1");
    }

    #[rstest]
    #[case(Some(9_000_000), true)]
    #[case(None, false)]
    #[tokio::test]
    async fn test_submit_order_params(#[case] price_int: Option<i64>, #[case] has_price: bool) {
        let sequencer = Arc::new(FixedStepSequencer::new(1, 1));
        let (client, _feed, writer) =
            started_client(config(Some(KEY), Some(SECRET)), sequencer).await;

        client
            .submit_order(MtGoxOrderSide::Ask, 50_000_000, price_int)
            .await
            .unwrap();

        let body = call_body(&writer.texts()[0]);
        assert_eq!(body["call"], "order/add");
        assert_eq!(body["params"]["type"], "ask");
        assert_eq!(body["params"]["amount_int"], 50_000_000);
        assert_eq!(body["params"].get("price_int").is_some(), has_price);
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_serialized() {
        let sequencer = Arc::new(FixedStepSequencer::new(1, 1));
        let (client, _feed, writer) =
            started_client(config(Some(KEY), Some(SECRET)), sequencer).await;
        let client = Arc::new(client);

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let client = client.clone();
                tokio::spawn(async move { client.request_info().await })
            })
            .collect();

        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap().unwrap());
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=16).collect::<Vec<_>>());

        let mut written: Vec<u64> = writer.texts().iter().map(|t| envelope(t).id).collect();
        written.sort_unstable();
        assert_eq!(written, ids);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_write_nonces_in_order() {
        let sequencer = Arc::new(FixedStepSequencer::new(1, 1_000));
        let (client, _feed, writer) =
            started_client(config(Some(KEY), Some(SECRET)), sequencer).await;
        let client = Arc::new(client);

        let tasks: Vec<_> = (0..64)
            .map(|i| {
                let client = client.clone();
                tokio::spawn(async move {
                    if i % 2 == 0 {
                        client.request_info().await
                    } else {
                        client.cancel_order("oid").await
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let texts = writer.texts();
        assert_eq!(texts.len(), 64);
        let nonces: Vec<u64> = texts
            .iter()
            .map(|t| call_body(t)["nonce"].as_u64().unwrap())
            .collect();
        let ids: Vec<u64> = texts.iter().map(|t| envelope(t).id).collect();
        assert!(nonces.windows(2).all(|w| w[0] < w[1]), "{nonces:?}");
        assert!(ids.windows(2).all(|w| w[0] < w[1]), "{ids:?}");
    }

    #[tokio::test]
    async fn test_call_before_start_is_not_connected() {
        let sequencer = Arc::new(FixedStepSequencer::new(1, 100));
        let client = MtGoxWebSocketClient::new_with_sequencer(
            config(Some(KEY), Some(SECRET)),
            sequencer.clone(),
        )
        .unwrap();
        assert!(matches!(
            client.request_info().await,
            Err(MtGoxWsError::NotConnected)
        ));
        assert!(!client.is_active());
        assert_eq!(sequencer.next_nonce(), 100);
    }

    #[tokio::test]
    async fn test_subscribe_and_unsubscribe_need_no_credentials() {
        let sequencer = Arc::new(FixedStepSequencer::new(1, 1));
        let (client, _feed, writer) = started_client(config(None, None), sequencer).await;

        client
            .subscribe_type(MtGoxSubscriptionType::Ticker)
            .await
            .unwrap();
        client
            .unsubscribe("dbf1dee9-4f2e-4a08-8cb7-748919a71b21")
            .await
            .unwrap();

        assert_eq!(
            writer.texts(),
            vec![
                r#"{"op":"mtgox.subscribe","type":"ticker"}"#.to_string(),
                r#"{"op":"unsubscribe","channel":"dbf1dee9-4f2e-4a08-8cb7-748919a71b21"}"#
                    .to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_start_only_once() {
        let sequencer = Arc::new(FixedStepSequencer::new(1, 1));
        let (client, _feed, _writer) = started_client(config(None, None), sequencer).await;

        let (_feed2, reader) = mock_reader();
        let result = client
            .start_with_transport(Box::new(reader), Box::new(RecordingWriter::default()))
            .await;
        assert!(matches!(result, Err(MtGoxWsError::Configuration(_))));
        assert!(matches!(
            client.connect().await,
            Err(MtGoxWsError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_streams_taken_once_and_receive_events() {
        let sequencer = Arc::new(FixedStepSequencer::new(1, 1));
        let (client, feed, _writer) = started_client(config(None, None), sequencer).await;

        let mut streams = client.take_streams().unwrap();
        assert!(client.take_streams().is_none());

        feed.send(text_frame(TRADE_JSON)).unwrap();
        let trade = tokio::time::timeout(Duration::from_secs(1), streams.trades.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(trade.trade.amount, 500_000_000);
        assert!(client.is_active());
    }

    #[tokio::test]
    async fn test_close_is_one_shot() {
        let sequencer = Arc::new(FixedStepSequencer::new(1, 1));
        let (client, _feed, writer) =
            started_client(config(Some(KEY), Some(SECRET)), sequencer).await;

        client.close().await.unwrap();
        assert!(writer.is_closed());
        assert!(client.is_closed());
        assert!(!client.is_active());

        assert_eq!(client.wait_for_exit().await.unwrap(), DispatchExit::Shutdown);
        assert!(matches!(client.close().await, Err(MtGoxWsError::Closed)));
        assert!(matches!(
            client.request_info().await,
            Err(MtGoxWsError::Closed)
        ));
        assert!(matches!(
            client.subscribe_type(MtGoxSubscriptionType::Depth).await,
            Err(MtGoxWsError::Closed)
        ));
        assert!(matches!(client.connect().await, Err(MtGoxWsError::Closed)));
    }

    #[tokio::test]
    async fn test_peer_close_ends_feed() {
        let sequencer = Arc::new(FixedStepSequencer::new(1, 1));
        let (client, feed, _writer) = started_client(config(None, None), sequencer).await;
        let streams = client.take_streams().unwrap();

        feed.send(Ok(Frame::Binary(vec![0xff]))).unwrap();
        drop(feed);

        let client_ref = &client;
        wait_until_async(
            move || async move { !client_ref.is_active() },
            Duration::from_secs(1),
        )
        .await;
        assert_eq!(client.wait_for_exit().await.unwrap(), DispatchExit::Closed);
        assert_eq!(streams.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_custom_queue_sizing() {
        let config = MtGoxWsConfig {
            event_capacity: 4,
            event_overflow: OverflowPolicy::DropNewest,
            ..Default::default()
        };
        let sequencer = Arc::new(FixedStepSequencer::new(1, 1));
        let (client, feed, _writer) = started_client(config, sequencer).await;
        let mut streams = client.take_streams().unwrap();

        for _ in 0..6 {
            feed.send(text_frame(TRADE_JSON)).unwrap();
        }
        drop(feed);
        assert_eq!(client.wait_for_exit().await.unwrap(), DispatchExit::Closed);

        assert_eq!(streams.trades.drain().len(), 4);
    }
}
