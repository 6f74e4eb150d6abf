// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Bundle Protocol v6 / CBHE core for a delay-tolerant-networking
//! store-and-forward node: wire codec, custody/ACS bookkeeping, a
//! rate-limited egress engine, convergence-layer sink/source contracts, and
//! a contact-plan scheduler.

pub mod cfg;
pub mod cl;
pub mod codec;
pub mod custody;
pub mod egress;
pub mod error;
pub mod orchestration;
pub mod scheduler;
