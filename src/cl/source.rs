// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The contract every convergence-layer sender (outduct) implements,
//! regardless of transport: connect, report readiness, forward one
//! datagram or frame, and stop.

use std::future::Future;
use std::pin::Pin;

use crate::error::ConvergenceLayerError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait Source: Send + Sync {
    /// Begins connection setup (DNS resolution, TCP connect, UDP bind).
    /// Non-blocking: returns as soon as setup has started.
    fn connect(&self) -> BoxFuture<'_, Result<(), ConvergenceLayerError>>;

    /// Whether `forward` would currently succeed. Never blocks.
    fn ready_to_forward(&self) -> bool;

    /// Sends one bundle's worth of bytes. Fails with
    /// [`ConvergenceLayerError::NotReady`] rather than blocking if
    /// `ready_to_forward()` is false.
    fn forward<'a>(&'a self, bytes: &'a [u8]) -> BoxFuture<'a, Result<(), ConvergenceLayerError>>;

    /// Tears down the connection.
    fn stop(&self) -> BoxFuture<'_, ()>;
}
