// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Rate-limited egress engine: a FIFO of bundles awaiting transmission, a
//! token bucket gating how many bytes may go out per refresh tick, and a
//! ring of outstanding expected byte counts so send completions can be
//! matched back to the send that produced them in order.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::egress::token_bucket::TokenBucket;
use crate::error::EgressError;

/// Slack added on top of `max_unacked` before admission is refused, giving
/// a little headroom for the completion side to drain.
const RING_SLACK: usize = 10;

pub struct EgressEngine {
    bucket: TokenBucket,
    queue: VecDeque<Vec<u8>>,
    outstanding: VecDeque<usize>,
    max_unacked: usize,
}

impl EgressEngine {
    pub fn new(rate_limit_bytes_per_tick: i64, max_unacked: usize) -> Self {
        Self {
            bucket: TokenBucket::new(rate_limit_bytes_per_tick),
            queue: VecDeque::new(),
            outstanding: VecDeque::new(),
            max_unacked,
        }
    }

    /// Admits a bundle for eventual transmission. Rejected once the ring of
    /// outstanding sends is saturated, so a stalled convergence layer can't
    /// grow the queue without bound.
    pub fn enqueue(&mut self, bundle_bytes: Vec<u8>) -> Result<(), EgressError> {
        if self.queue.len() + self.outstanding.len() >= self.max_unacked + RING_SLACK {
            return Err(EgressError::RingFull);
        }
        self.queue.push_back(bundle_bytes);
        Ok(())
    }

    /// Pops the next bundle if the token bucket can afford its byte count,
    /// recording it as outstanding. Returns `None` if the queue is empty or
    /// the bucket can't afford the head of line yet.
    pub fn try_forward(&mut self) -> Option<Vec<u8>> {
        let cost = self.queue.front()?.len() as i64;
        if !self.bucket.take_tokens(cost) {
            return None;
        }
        let bytes = self.queue.pop_front().expect("front checked above");
        self.outstanding.push_back(bytes.len());
        Some(bytes)
    }

    /// Matches a completed send against the oldest outstanding expectation.
    pub fn on_send_completion(&mut self, actual_bytes: usize) -> Result<(), EgressError> {
        let expected = self
            .outstanding
            .pop_front()
            .ok_or(EgressError::ByteCountMismatch {
                expected: 0,
                actual: actual_bytes,
            })?;
        if expected != actual_bytes {
            return Err(EgressError::ByteCountMismatch {
                expected,
                actual: actual_bytes,
            });
        }
        Ok(())
    }

    pub fn on_refresh_timer(&mut self, elapsed_ticks: i64) {
        self.bucket.add_time(elapsed_ticks);
    }

    pub fn update_rate(&mut self, new_limit_bytes_per_tick: i64) {
        self.bucket.update_rate(new_limit_bytes_per_tick);
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    pub fn outstanding_len(&self) -> usize {
        self.outstanding.len()
    }
}

/// Drives one [`EgressEngine`] to completion: bundles arrive on `inbound`,
/// bytes to transmit are pushed to `outbound`, and a refresh timer ticks the
/// token bucket. Exits cleanly when `cancel` fires or `inbound` closes.
pub async fn run_loop(
    mut engine: EgressEngine,
    mut inbound: mpsc::Receiver<Vec<u8>>,
    outbound: mpsc::Sender<Vec<u8>>,
    refresh_interval: Duration,
    ticks_per_refresh: i64,
    cancel: CancellationToken,
) {
    let mut refresh = tokio::time::interval(refresh_interval);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("egress engine shutting down");
                break;
            }
            maybe_bundle = inbound.recv() => {
                match maybe_bundle {
                    Some(bytes) => {
                        if engine.enqueue(bytes).is_err() {
                            warn!("egress ring full, dropping admission");
                        }
                    }
                    None => break,
                }
            }
            _ = refresh.tick() => {
                engine.on_refresh_timer(ticks_per_refresh);
                while let Some(bytes) = engine.try_forward() {
                    if outbound.send(bytes).await.is_err() {
                        return;
                    }
                }
            }
        }
    }
}
