// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Accumulates custody IDs to acknowledge and coalesces them into aggregate
//! custody signals, splitting into multiple signals when the accumulated
//! fill set would exceed a configured body-size bound.

use std::collections::HashMap;

use crate::codec::canonical::admin::acs::AggregateCustodySignal;
use crate::codec::fragment_set::{FragmentSet, Interval};

/// `(succeeded, reason)` — signals for different outcomes are never merged
/// into the same fill set.
type SignalKey = (bool, u8);

pub struct AcsGenerator {
    max_body_len: usize,
    pending: HashMap<SignalKey, FragmentSet>,
}

impl AcsGenerator {
    pub fn new(max_body_len: usize) -> Self {
        Self {
            max_body_len,
            pending: HashMap::new(),
        }
    }

    /// Adds one custody ID to the pending fill set for `(succeeded,
    /// reason)`, merging it with any contiguous neighbour already pending.
    pub fn add_contiguous(&mut self, succeeded: bool, reason: u8, custody_id: u64) {
        self.pending
            .entry((succeeded, reason))
            .or_default()
            .insert(Interval::new(custody_id, custody_id));
    }

    /// Drains every pending fill set into aggregate custody signals, each no
    /// larger than `max_body_len` bytes once encoded, and clears the
    /// pending state.
    pub fn flush_all(&mut self) -> Vec<AggregateCustodySignal> {
        let mut out = Vec::new();
        for ((succeeded, reason), set) in self.pending.drain() {
            out.extend(Self::split(succeeded, reason, set, self.max_body_len));
        }
        out
    }

    fn split(
        succeeded: bool,
        reason: u8,
        set: FragmentSet,
        max_body_len: usize,
    ) -> Vec<AggregateCustodySignal> {
        let mut signals = Vec::new();
        let mut current_fills: Vec<(u64, u64)> = Vec::new();

        for interval in set.iter() {
            current_fills.push((interval.begin, interval.end - interval.begin + 1));
            let candidate = AggregateCustodySignal {
                succeeded,
                reason,
                fills: current_fills.clone(),
            };
            if Self::encoded_len(&candidate) > max_body_len && current_fills.len() > 1 {
                // Back out the run that pushed us over; it starts the next
                // signal instead.
                let overflowing = current_fills.pop().expect("just pushed");
                signals.push(AggregateCustodySignal {
                    succeeded,
                    reason,
                    fills: current_fills.clone(),
                });
                current_fills = vec![overflowing];
            }
        }
        if !current_fills.is_empty() {
            signals.push(AggregateCustodySignal {
                succeeded,
                reason,
                fills: current_fills,
            });
        }
        signals
    }

    fn encoded_len(signal: &AggregateCustodySignal) -> usize {
        let mut buf = Vec::new();
        signal.encode_body(&mut buf);
        buf.len()
    }
}
