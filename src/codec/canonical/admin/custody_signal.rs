// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Per-bundle custody acceptance/refusal signal.

use std::fmt;

use crate::codec::canonical::admin::reason;
use crate::codec::eid::Eid;
use crate::codec::sdnv;
use crate::codec::timestamp::CreationTimestamp;
use crate::error::CanonicalBlockError;

#[derive(Clone, PartialEq, Eq)]
pub struct CustodySignal {
    pub succeeded: bool,
    /// 7-bit reason code; custody-acceptance reason codes when `succeeded`,
    /// refusal reason codes otherwise.
    pub reason: u8,
    pub fragment_offset: Option<u64>,
    pub fragment_length: Option<u64>,
    pub signal_time_secs: u64,
    pub signal_time_nanos: u64,
    pub bundle_source: Eid,
    pub bundle_creation_timestamp: CreationTimestamp,
}

impl CustodySignal {
    pub fn is_fragment(&self) -> bool {
        self.fragment_offset.is_some()
    }

    pub fn encode_body(&self, out: &mut Vec<u8>) {
        let succeeded_bit = if self.succeeded { 0x80 } else { 0 };
        out.push(succeeded_bit | (self.reason & 0x7f));
        if let (Some(offset), Some(length)) = (self.fragment_offset, self.fragment_length) {
            out.extend_from_slice(&sdnv::encode_to_vec(offset));
            out.extend_from_slice(&sdnv::encode_to_vec(length));
        }
        out.extend_from_slice(&sdnv::encode_to_vec(self.signal_time_secs));
        out.extend_from_slice(&sdnv::encode_to_vec(self.signal_time_nanos));
        self.bundle_source.encode(out);
        self.bundle_creation_timestamp.encode(out);
    }

    pub fn decode_body(data: &[u8], is_fragment: bool) -> Result<Self, CanonicalBlockError> {
        let status_byte = *data.first().ok_or(CanonicalBlockError::BufferTooShort)?;
        let succeeded = status_byte & 0x80 != 0;
        let reason = status_byte & 0x7f;
        let mut pos = 1usize;

        let (fragment_offset, fragment_length) = if is_fragment {
            let (offset, n) = sdnv::decode(&data[pos..])?;
            pos += n;
            let (length, n) = sdnv::decode(&data[pos..])?;
            pos += n;
            (Some(offset), Some(length))
        } else {
            (None, None)
        };

        let (signal_time_secs, n) = sdnv::decode(&data[pos..])?;
        pos += n;
        let (signal_time_nanos, n) = sdnv::decode(&data[pos..])?;
        pos += n;
        let (bundle_source, n) = Eid::decode(&data[pos..])?;
        pos += n;
        let (bundle_creation_timestamp, n) = CreationTimestamp::decode(&data[pos..])?;
        pos += n;
        let _ = pos;

        Ok(Self {
            succeeded,
            reason,
            fragment_offset,
            fragment_length,
            signal_time_secs,
            signal_time_nanos,
            bundle_source,
            bundle_creation_timestamp,
        })
    }
}

impl fmt::Debug for CustodySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustodySignal")
            .field("succeeded", &self.succeeded)
            .field("reason", &self.reason)
            .field("reason_description", &reason::describe_or_unassigned(self.reason))
            .field("fragment_offset", &self.fragment_offset)
            .field("fragment_length", &self.fragment_length)
            .field("signal_time_secs", &self.signal_time_secs)
            .field("signal_time_nanos", &self.signal_time_nanos)
            .field("bundle_source", &self.bundle_source)
            .field("bundle_creation_timestamp", &self.bundle_creation_timestamp)
            .finish()
    }
}
