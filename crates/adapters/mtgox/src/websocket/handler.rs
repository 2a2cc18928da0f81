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

//! Feed handler which drains the transport, decodes each frame and publishes typed events.

use tokio_util::sync::CancellationToken;

use super::{
    error::MtGoxWsError,
    messages::{
        MtGoxCallResult, MtGoxDepthMsg, MtGoxDiagnostic, MtGoxInfo, MtGoxOrder, MtGoxTickerMsg,
        MtGoxTradeMsg, MtGoxWsMessage,
    },
    parse::decode_message,
    transport::{Frame, FrameReader},
};
use crate::common::queue::{
    OverflowPolicy, PublishOutcome, QueuePublisher, QueueSubscriber, bounded_queue,
};

/// Why the feed handler stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchExit {
    /// The peer closed the stream.
    Closed,
    /// A transport read failed; the error was also offered to the error queue.
    TransportFailed(MtGoxWsError),
    /// Shutdown was signalled locally.
    Shutdown,
}

/// Producer halves of every output queue, owned by the feed handler.
#[derive(Debug)]
pub struct FeedPublishers {
    pub ticker: QueuePublisher<MtGoxTickerMsg>,
    pub trades: QueuePublisher<MtGoxTradeMsg>,
    pub depth: QueuePublisher<MtGoxDepthMsg>,
    pub info: QueuePublisher<MtGoxInfo>,
    pub orders: QueuePublisher<Vec<MtGoxOrder>>,
    pub results: QueuePublisher<MtGoxCallResult>,
    pub diagnostics: QueuePublisher<MtGoxDiagnostic>,
    pub errors: QueuePublisher<MtGoxWsError>,
}

/// Consumer halves of every output queue.
///
/// The error queue is lossy: once full, further errors are discarded.
#[derive(Debug)]
pub struct MtGoxStreams {
    pub ticker: QueueSubscriber<MtGoxTickerMsg>,
    pub trades: QueueSubscriber<MtGoxTradeMsg>,
    pub depth: QueueSubscriber<MtGoxDepthMsg>,
    pub info: QueueSubscriber<MtGoxInfo>,
    pub orders: QueueSubscriber<Vec<MtGoxOrder>>,
    pub results: QueueSubscriber<MtGoxCallResult>,
    pub diagnostics: QueueSubscriber<MtGoxDiagnostic>,
    pub errors: QueueSubscriber<MtGoxWsError>,
}

/// Builds every output queue.
///
/// Event queues share `event_capacity` and `event_policy`; the error queue keeps its first
/// `error_capacity` entries.
#[must_use]
pub fn feed_queues(
    event_capacity: usize,
    event_policy: OverflowPolicy,
    error_capacity: usize,
) -> (FeedPublishers, MtGoxStreams) {
    let (ticker_tx, ticker_rx) = bounded_queue(event_capacity, event_policy);
    let (trades_tx, trades_rx) = bounded_queue(event_capacity, event_policy);
    let (depth_tx, depth_rx) = bounded_queue(event_capacity, event_policy);
    let (info_tx, info_rx) = bounded_queue(event_capacity, event_policy);
    let (orders_tx, orders_rx) = bounded_queue(event_capacity, event_policy);
    let (results_tx, results_rx) = bounded_queue(event_capacity, event_policy);
    let (diagnostics_tx, diagnostics_rx) = bounded_queue(event_capacity, event_policy);
    let (errors_tx, errors_rx) = bounded_queue(error_capacity, OverflowPolicy::DropNewest);

    (
        FeedPublishers {
            ticker: ticker_tx,
            trades: trades_tx,
            depth: depth_tx,
            info: info_tx,
            orders: orders_tx,
            results: results_tx,
            diagnostics: diagnostics_tx,
            errors: errors_tx,
        },
        MtGoxStreams {
            ticker: ticker_rx,
            trades: trades_rx,
            depth: depth_rx,
            info: info_rx,
            orders: orders_rx,
            results: results_rx,
            diagnostics: diagnostics_rx,
            errors: errors_rx,
        },
    )
}

fn offer<T>(queue: &'static str, publisher: &QueuePublisher<T>, value: T) {
    match publisher.try_publish(value) {
        PublishOutcome::Accepted => {}
        PublishOutcome::Replaced => tracing::trace!("Replaced oldest {queue} event, queue full"),
        PublishOutcome::Dropped => tracing::trace!("Dropped {queue} event, queue full"),
    }
}

/// Single-task read loop for one Mt. Gox WebSocket connection.
pub struct MtGoxWsFeedHandler {
    cancel: CancellationToken,
    reader: Box<dyn FrameReader>,
    publishers: FeedPublishers,
}

impl std::fmt::Debug for MtGoxWsFeedHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(MtGoxWsFeedHandler))
            .field("cancelled", &self.cancel.is_cancelled())
            .field("publishers", &self.publishers)
            .finish_non_exhaustive()
    }
}

impl MtGoxWsFeedHandler {
    /// Creates a new [`MtGoxWsFeedHandler`] instance.
    #[must_use]
    pub fn new(
        cancel: CancellationToken,
        reader: Box<dyn FrameReader>,
        publishers: FeedPublishers,
    ) -> Self {
        Self {
            cancel,
            reader,
            publishers,
        }
    }

    /// Runs the read loop until the peer closes, the transport fails, or shutdown is signalled.
    ///
    /// Publishing never blocks. Once `cancel` fires nothing further is published.
    pub async fn run(mut self) -> DispatchExit {
        loop {
            let read = tokio::select! {
                biased;
                () = self.cancel.cancelled() => None,
                read = self.reader.read_frame() => Some(read),
            };

            let Some(read) = read.filter(|_| !self.cancel.is_cancelled()) else {
                tracing::debug!("Feed handler received shutdown signal");
                return DispatchExit::Shutdown;
            };

            match read {
                Ok(Some(Frame::Text(text))) => self.handle_text(&text),
                Ok(Some(Frame::Binary(data))) => {
                    let error = MtGoxWsError::UnexpectedFrame(format!(
                        "binary frame of {} bytes",
                        data.len()
                    ));
                    tracing::warn!("{error}");
                    offer("error", &self.publishers.errors, error);
                }
                Ok(None) => {
                    tracing::info!("WebSocket stream closed by peer");
                    return DispatchExit::Closed;
                }
                Err(e) if !e.is_fatal_to_feed() => {
                    tracing::warn!("{e}");
                    offer("error", &self.publishers.errors, e);
                }
                Err(e) => {
                    tracing::error!("WebSocket read failed: {e}");
                    offer("error", &self.publishers.errors, e.clone());
                    return DispatchExit::TransportFailed(e);
                }
            }
        }
    }

    fn handle_text(&self, text: &str) {
        tracing::trace!("Received WebSocket message: {text}");

        match decode_message(text) {
            Ok(msg) => self.publish(msg),
            Err(e) => {
                tracing::warn!("{e}");
                offer("error", &self.publishers.errors, e);
            }
        }
    }

    fn publish(&self, msg: MtGoxWsMessage) {
        let publishers = &self.publishers;

        match msg {
            MtGoxWsMessage::Ticker(msg) => offer("ticker", &publishers.ticker, *msg),
            MtGoxWsMessage::Trade(msg) => offer("trade", &publishers.trades, msg),
            MtGoxWsMessage::Depth(msg) => offer("depth", &publishers.depth, msg),
            MtGoxWsMessage::Info(info) => offer("info", &publishers.info, *info),
            MtGoxWsMessage::Orders(orders) => offer("orders", &publishers.orders, orders),
            MtGoxWsMessage::CallResult(result) => offer("result", &publishers.results, result),
            MtGoxWsMessage::Diagnostic(diagnostic) => {
                if let MtGoxDiagnostic::Unroutable { private, dump } = &diagnostic {
                    tracing::debug!("Unroutable message (private='{private}'):\n{dump}");
                }
                offer("diagnostic", &publishers.diagnostics, diagnostic);
            }
        }
    }
}
