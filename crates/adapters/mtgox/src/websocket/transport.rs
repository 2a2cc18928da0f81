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

//! Frame transport seam for the Mt. Gox WebSocket feed.
//!
//! The feed handler only sees [`Frame`]s through [`FrameReader`]; control frames never reach
//! it. [`TungsteniteTransport`] is the production implementation.

use async_trait::async_trait;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{
        Message,
        client::IntoClientRequest,
        http::{HeaderValue, header::ORIGIN},
    },
};

use super::error::{MtGoxWsError, MtGoxWsResult};

type MtGoxStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A data frame received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

/// Read half of a frame transport.
#[async_trait]
pub trait FrameReader: Send {
    /// Reads the next data frame.
    ///
    /// Returns `Ok(None)` once the peer has closed the stream.
    ///
    /// # Errors
    ///
    /// Returns [`MtGoxWsError::Transport`] if the underlying read fails.
    async fn read_frame(&mut self) -> MtGoxWsResult<Option<Frame>>;
}

/// Write half of a frame transport.
#[async_trait]
pub trait FrameWriter: Send {
    /// Writes a single text frame.
    ///
    /// # Errors
    ///
    /// Returns [`MtGoxWsError::Transport`] if the underlying write fails.
    async fn write_text(&mut self, text: String) -> MtGoxWsResult<()>;

    /// Sends a close frame and flushes the transport.
    ///
    /// # Errors
    ///
    /// Returns [`MtGoxWsError::Transport`] if the close handshake cannot be sent.
    async fn close(&mut self) -> MtGoxWsResult<()>;
}

/// WebSocket transport backed by `tokio-tungstenite`.
#[derive(Debug)]
pub struct TungsteniteTransport;

impl TungsteniteTransport {
    /// Opens a WebSocket connection to `url` with the given `Origin` header.
    ///
    /// # Errors
    ///
    /// Returns [`MtGoxWsError::Configuration`] if the URL or origin is invalid, or
    /// [`MtGoxWsError::Transport`] if the handshake fails.
    pub async fn connect(
        url: &str,
        origin: &str,
    ) -> MtGoxWsResult<(TungsteniteReader, TungsteniteWriter)> {
        let mut request = url
            .into_client_request()
            .map_err(|e| MtGoxWsError::Configuration(format!("Invalid URL '{url}': {e}")))?;
        let origin = HeaderValue::from_str(origin)
            .map_err(|e| MtGoxWsError::Configuration(format!("Invalid origin '{origin}': {e}")))?;
        request.headers_mut().insert(ORIGIN, origin);

        let (stream, response) = connect_async(request).await?;
        tracing::debug!("WebSocket handshake with {url} completed: {}", response.status());

        let (sink, stream) = stream.split();
        Ok((TungsteniteReader { stream }, TungsteniteWriter { sink }))
    }
}

/// Read half of a [`TungsteniteTransport`] connection.
pub struct TungsteniteReader {
    stream: SplitStream<MtGoxStream>,
}

impl std::fmt::Debug for TungsteniteReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(TungsteniteReader)).finish()
    }
}

#[async_trait]
impl FrameReader for TungsteniteReader {
    async fn read_frame(&mut self) -> MtGoxWsResult<Option<Frame>> {
        loop {
            let Some(message) = self.stream.next().await else {
                return Ok(None);
            };

            match message? {
                Message::Text(text) => return Ok(Some(Frame::Text(text.as_str().to_owned()))),
                Message::Binary(data) => return Ok(Some(Frame::Binary(data.to_vec()))),
                Message::Ping(payload) => {
                    tracing::trace!("Received ping frame ({} bytes)", payload.len());
                }
                Message::Pong(payload) => {
                    tracing::trace!("Received pong frame ({} bytes)", payload.len());
                }
                Message::Close(frame) => {
                    tracing::debug!("Received close frame: {frame:?}");
                    return Ok(None);
                }
                Message::Frame(_) => {}
            }
        }
    }
}

/// Write half of a [`TungsteniteTransport`] connection.
pub struct TungsteniteWriter {
    sink: SplitSink<MtGoxStream, Message>,
}

impl std::fmt::Debug for TungsteniteWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(TungsteniteWriter)).finish()
    }
}

#[async_trait]
impl FrameWriter for TungsteniteWriter {
    async fn write_text(&mut self, text: String) -> MtGoxWsResult<()> {
        self.sink.send(Message::Text(text.into())).await?;
        Ok(())
    }

    async fn close(&mut self) -> MtGoxWsResult<()> {
        self.sink.close().await?;
        Ok(())
    }
}
