// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! UDP convergence layer: a datagram source (outduct) that forwards whole
//! bundles as single datagrams, and a receive ring on the sink
//! (induct) side that drops the oldest undelivered datagram on overrun
//! rather than blocking the socket read loop.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tracing::warn;

use crate::cl::source::{BoxFuture, Source};
use crate::error::ConvergenceLayerError;

/// A bounded FIFO of received datagrams. Once full, pushing drops the
/// oldest entry and increments the overrun counter instead of growing.
#[derive(Debug)]
pub struct DatagramReceiveRing {
    capacity: usize,
    ring: VecDeque<Bytes>,
    overrun_count: u64,
}

impl DatagramReceiveRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ring: VecDeque::with_capacity(capacity),
            overrun_count: 0,
        }
    }

    pub fn push(&mut self, datagram: Bytes) {
        if self.ring.len() >= self.capacity {
            self.ring.pop_front();
            self.overrun_count += 1;
            warn!(overrun_count = self.overrun_count, "datagram receive ring overrun");
        }
        self.ring.push_back(datagram);
    }

    pub fn pop(&mut self) -> Option<Bytes> {
        self.ring.pop_front()
    }

    pub fn overrun_count(&self) -> u64 {
        self.overrun_count
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

/// A UDP outduct: sends whole bundles as single datagrams to one peer.
pub struct DatagramSource {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
    ready: AtomicBool,
}

impl DatagramSource {
    pub fn new(socket: Arc<UdpSocket>, peer: SocketAddr) -> Self {
        Self {
            socket,
            peer,
            ready: AtomicBool::new(true),
        }
    }
}

impl Source for DatagramSource {
    fn connect(&self) -> BoxFuture<'_, Result<(), ConvergenceLayerError>> {
        Box::pin(async move {
            self.ready.store(true, Ordering::Release);
            Ok(())
        })
    }

    fn ready_to_forward(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn forward<'a>(&'a self, bytes: &'a [u8]) -> BoxFuture<'a, Result<(), ConvergenceLayerError>> {
        Box::pin(async move {
            if !self.ready_to_forward() {
                return Err(ConvergenceLayerError::NotReady);
            }
            self.socket.send_to(bytes, self.peer).await?;
            Ok(())
        })
    }

    fn stop(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.ready.store(false, Ordering::Release);
        })
    }
}

/// A UDP induct: reads datagrams into a bounded ring for the orchestration
/// layer to drain at its own pace.
pub struct DatagramSink {
    socket: Arc<UdpSocket>,
    ring: Mutex<DatagramReceiveRing>,
}

impl DatagramSink {
    pub fn new(socket: Arc<UdpSocket>, ring_capacity: usize) -> Self {
        Self {
            socket,
            ring: Mutex::new(DatagramReceiveRing::new(ring_capacity)),
        }
    }

    /// Reads one datagram off the socket and pushes it into the ring.
    pub async fn recv_once(&self, buf: &mut [u8]) -> Result<(), ConvergenceLayerError> {
        let (len, _addr) = self.socket.recv_from(buf).await?;
        self.ring.lock().await.push(Bytes::copy_from_slice(&buf[..len]));
        Ok(())
    }

    pub async fn pop(&self) -> Option<Bytes> {
        self.ring.lock().await.pop()
    }

    pub async fn overrun_count(&self) -> u64 {
        self.ring.lock().await.overrun_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_drops_oldest_on_overrun() {
        let mut ring = DatagramReceiveRing::new(2);
        ring.push(Bytes::from_static(&[1]));
        ring.push(Bytes::from_static(&[2]));
        ring.push(Bytes::from_static(&[3]));
        assert_eq!(ring.overrun_count(), 1);
        assert_eq!(ring.pop(), Some(Bytes::from_static(&[2])));
        assert_eq!(ring.pop(), Some(Bytes::from_static(&[3])));
        assert!(ring.is_empty());
    }

    #[test]
    fn ring_under_capacity_never_overruns() {
        let mut ring = DatagramReceiveRing::new(5);
        for i in 0..5 {
            ring.push(Bytes::copy_from_slice(&[i]));
        }
        assert_eq!(ring.overrun_count(), 0);
        assert_eq!(ring.len(), 5);
    }
}
