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

//! In-memory transport and polling helpers for tests.

use std::{
    future::Future,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::websocket::{
    error::{MtGoxWsError, MtGoxWsResult},
    transport::{Frame, FrameReader, FrameWriter},
};

/// Sender used by tests to feed frames (or read errors) to a [`MockFrameReader`].
pub(crate) type MockFeed = mpsc::UnboundedSender<MtGoxWsResult<Frame>>;

/// Frame reader driven by a channel. Dropping every [`MockFeed`] ends the stream.
#[derive(Debug)]
pub(crate) struct MockFrameReader {
    rx: mpsc::UnboundedReceiver<MtGoxWsResult<Frame>>,
}

pub(crate) fn mock_reader() -> (MockFeed, MockFrameReader) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, MockFrameReader { rx })
}

#[async_trait]
impl FrameReader for MockFrameReader {
    async fn read_frame(&mut self) -> MtGoxWsResult<Option<Frame>> {
        match self.rx.recv().await {
            Some(Ok(frame)) => Ok(Some(frame)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Default)]
struct RecordedWrites {
    texts: Vec<String>,
    closed: bool,
}

/// Frame writer recording every text frame. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingWriter {
    inner: Arc<Mutex<RecordedWrites>>,
}

impl RecordingWriter {
    pub(crate) fn texts(&self) -> Vec<String> {
        self.inner.lock().unwrap().texts.clone()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }
}

#[async_trait]
impl FrameWriter for RecordingWriter {
    async fn write_text(&mut self, text: String) -> MtGoxWsResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return Err(MtGoxWsError::Transport("writer closed".to_string()));
        }
        inner.texts.push(text);
        Ok(())
    }

    async fn close(&mut self) -> MtGoxWsResult<()> {
        self.inner.lock().unwrap().closed = true;
        Ok(())
    }
}

pub(crate) fn text_frame(text: &str) -> MtGoxWsResult<Frame> {
    Ok(Frame::Text(text.to_string()))
}

/// Polls `condition` until it holds, panicking once `timeout` elapses.
pub(crate) async fn wait_until_async<F, Fut>(mut condition: F, timeout: Duration)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    tokio::time::timeout(timeout, async {
        while !condition().await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not met before timeout");
}
