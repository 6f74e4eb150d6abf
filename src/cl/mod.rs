// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

pub mod datagram;
pub mod source;
pub mod stream;

pub use source::Source;
