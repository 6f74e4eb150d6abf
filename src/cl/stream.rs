// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! TCPCL-style framed stream convergence layer: each bundle goes out as a
//! 4-byte big-endian length prefix followed by its bytes. Connections are
//! owned by a [`StreamManager`]; a connection that wants to be dropped only
//! *requests* removal over a channel, the manager's own loop is what
//! actually removes it, so a connection never races its own teardown.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use dashmap::DashMap;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tracing::info;

use crate::cl::source::{BoxFuture, Source};
use crate::error::ConvergenceLayerError;

const LENGTH_PREFIX_BYTES: usize = 4;

pub async fn write_frame(stream: &mut TcpStream, bytes: &[u8]) -> Result<(), ConvergenceLayerError> {
    let len = bytes.len() as u32;
    stream.write_all(&len.to_be_bytes()).await?;
    stream.write_all(bytes).await?;
    Ok(())
}

pub async fn read_frame(stream: &mut TcpStream) -> Result<Bytes, ConvergenceLayerError> {
    let mut len_buf = [0u8; LENGTH_PREFIX_BYTES];
    stream.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf) as usize;
    let mut data = BytesMut::zeroed(len);
    stream.read_exact(&mut data).await?;
    Ok(data.freeze())
}

/// One TCPCL connection. Implements [`Source`] for the sending side.
pub struct StreamConnection {
    pub id: u64,
    pub peer: SocketAddr,
    stream: Mutex<TcpStream>,
    ready: AtomicBool,
    removal_tx: mpsc::UnboundedSender<u64>,
}

impl StreamConnection {
    pub fn new(
        id: u64,
        peer: SocketAddr,
        stream: TcpStream,
        removal_tx: mpsc::UnboundedSender<u64>,
    ) -> Self {
        Self {
            id,
            peer,
            stream: Mutex::new(stream),
            ready: AtomicBool::new(true),
            removal_tx,
        }
    }

    /// Requests that the owning manager remove this connection. Never
    /// removes itself directly.
    pub fn request_removal(&self) {
        self.ready.store(false, Ordering::Release);
        let _ = self.removal_tx.send(self.id);
    }
}

impl Source for StreamConnection {
    fn connect(&self) -> BoxFuture<'_, Result<(), ConvergenceLayerError>> {
        Box::pin(async move { Ok(()) })
    }

    fn ready_to_forward(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn forward<'a>(&'a self, bytes: &'a [u8]) -> BoxFuture<'a, Result<(), ConvergenceLayerError>> {
        Box::pin(async move {
            if !self.ready_to_forward() {
                return Err(ConvergenceLayerError::NotReady);
            }
            let mut stream = self.stream.lock().await;
            if let Err(e) = write_frame(&mut stream, bytes).await {
                drop(stream);
                self.request_removal();
                return Err(e);
            }
            Ok(())
        })
    }

    fn stop(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.request_removal();
        })
    }
}

/// Owns the set of live connections for one TCPCL outduct/induct and drains
/// removal requests on its own loop.
pub struct StreamManager {
    connections: DashMap<u64, Arc<StreamConnection>>,
    next_id: AtomicU64,
    removal_tx: mpsc::UnboundedSender<u64>,
    removal_rx: Mutex<mpsc::UnboundedReceiver<u64>>,
}

impl StreamManager {
    pub fn new() -> Self {
        let (removal_tx, removal_rx) = mpsc::unbounded_channel();
        Self {
            connections: DashMap::new(),
            next_id: AtomicU64::new(0),
            removal_tx,
            removal_rx: Mutex::new(removal_rx),
        }
    }

    pub fn add(&self, stream: TcpStream, peer: SocketAddr) -> Arc<StreamConnection> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let conn = Arc::new(StreamConnection::new(id, peer, stream, self.removal_tx.clone()));
        self.connections.insert(id, conn.clone());
        conn
    }

    pub fn get(&self, id: u64) -> Option<Arc<StreamConnection>> {
        self.connections.get(&id).map(|e| e.clone())
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Drains every pending removal request, actually removing each
    /// connection from the table. Run by the manager's own task loop, never
    /// called from inside a connection's send path.
    pub async fn drain_removals(&self) {
        let mut rx = self.removal_rx.lock().await;
        while let Ok(id) = rx.try_recv() {
            if self.connections.remove(&id).is_some() {
                info!(connection_id = id, "removed tcpcl connection");
            }
        }
    }
}

impl Default for StreamManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn frame_round_trip_over_a_loopback_socketpair() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            write_frame(&mut stream, b"hello tcpcl").await.unwrap();
        });
        let (mut server_stream, _) = listener.accept().await.unwrap();
        let frame = read_frame(&mut server_stream).await.unwrap();
        client.await.unwrap();
        assert_eq!(&frame[..], b"hello tcpcl");
    }

    #[tokio::test]
    async fn manager_removal_is_deferred_to_its_own_drain() {
        let manager = StreamManager::new();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _client = TcpStream::connect(addr).await.unwrap();
        let (server_stream, peer) = listener.accept().await.unwrap();
        let conn = manager.add(server_stream, peer);
        assert_eq!(manager.len(), 1);

        conn.request_removal();
        // Not removed yet: only a request was queued.
        assert_eq!(manager.len(), 1);

        manager.drain_removals().await;
        assert_eq!(manager.len(), 0);
    }
}
