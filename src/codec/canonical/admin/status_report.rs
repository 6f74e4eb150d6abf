// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Bundle status report: records which processing milestones (reception,
//! custody acceptance, forwarding, delivery, deletion) a bundle reached,
//! each with an optional DTN timestamp of when it happened.

use std::fmt;

use bitflags::bitflags;

use crate::codec::canonical::admin::reason;
use crate::codec::eid::Eid;
use crate::codec::sdnv;
use crate::codec::timestamp::CreationTimestamp;
use crate::error::CanonicalBlockError;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StatusFlags: u8 {
        const RECEIVED          = 1 << 0;
        const CUSTODY_ACCEPTED  = 1 << 1;
        const FORWARDED         = 1 << 2;
        const DELIVERED         = 1 << 3;
        const DELETED           = 1 << 4;
    }
}

/// A DTN timestamp pair, present once per asserted status flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DtnTime {
    pub secs: u64,
    pub nanos: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusTimes {
    pub received: Option<DtnTime>,
    pub custody_accepted: Option<DtnTime>,
    pub forwarded: Option<DtnTime>,
    pub delivered: Option<DtnTime>,
    pub deleted: Option<DtnTime>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub flags: StatusFlags,
    pub reason: u8,
    pub fragment_offset: Option<u64>,
    pub fragment_length: Option<u64>,
    pub times: StatusTimes,
    pub bundle_source: Eid,
    pub bundle_creation_timestamp: CreationTimestamp,
}

impl StatusReport {
    pub fn is_fragment(&self) -> bool {
        self.fragment_offset.is_some()
    }

    pub fn encode_body(&self, out: &mut Vec<u8>) {
        out.push(self.flags.bits());
        out.push(self.reason);
        if let (Some(offset), Some(length)) = (self.fragment_offset, self.fragment_length) {
            out.extend_from_slice(&sdnv::encode_to_vec(offset));
            out.extend_from_slice(&sdnv::encode_to_vec(length));
        }
        for (flag, time) in [
            (StatusFlags::RECEIVED, self.times.received),
            (StatusFlags::CUSTODY_ACCEPTED, self.times.custody_accepted),
            (StatusFlags::FORWARDED, self.times.forwarded),
            (StatusFlags::DELIVERED, self.times.delivered),
            (StatusFlags::DELETED, self.times.deleted),
        ] {
            if self.flags.contains(flag) {
                let t = time.unwrap_or(DtnTime { secs: 0, nanos: 0 });
                out.extend_from_slice(&sdnv::encode_to_vec(t.secs));
                out.extend_from_slice(&sdnv::encode_to_vec(t.nanos));
            }
        }
        self.bundle_source.encode(out);
        self.bundle_creation_timestamp.encode(out);
    }

    pub fn decode_body(data: &[u8], is_fragment: bool) -> Result<Self, CanonicalBlockError> {
        let flags_byte = *data.first().ok_or(CanonicalBlockError::BufferTooShort)?;
        let flags = StatusFlags::from_bits_truncate(flags_byte);
        let reason = *data.get(1).ok_or(CanonicalBlockError::BufferTooShort)?;
        let mut pos = 2usize;

        let (fragment_offset, fragment_length) = if is_fragment {
            let (offset, n) = sdnv::decode(&data[pos..])?;
            pos += n;
            let (length, n) = sdnv::decode(&data[pos..])?;
            pos += n;
            (Some(offset), Some(length))
        } else {
            (None, None)
        };

        let mut times = StatusTimes::default();
        for flag in [
            StatusFlags::RECEIVED,
            StatusFlags::CUSTODY_ACCEPTED,
            StatusFlags::FORWARDED,
            StatusFlags::DELIVERED,
            StatusFlags::DELETED,
        ] {
            if flags.contains(flag) {
                let (secs, n) = sdnv::decode(&data[pos..])?;
                pos += n;
                let (nanos, n) = sdnv::decode(&data[pos..])?;
                pos += n;
                let t = Some(DtnTime { secs, nanos });
                match flag {
                    StatusFlags::RECEIVED => times.received = t,
                    StatusFlags::CUSTODY_ACCEPTED => times.custody_accepted = t,
                    StatusFlags::FORWARDED => times.forwarded = t,
                    StatusFlags::DELIVERED => times.delivered = t,
                    StatusFlags::DELETED => times.deleted = t,
                    _ => unreachable!(),
                }
            }
        }

        let (bundle_source, n) = Eid::decode(&data[pos..])?;
        pos += n;
        let (bundle_creation_timestamp, n) = CreationTimestamp::decode(&data[pos..])?;
        pos += n;
        let _ = pos;

        Ok(Self {
            flags,
            reason,
            fragment_offset,
            fragment_length,
            times,
            bundle_source,
            bundle_creation_timestamp,
        })
    }
}

impl fmt::Debug for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusReport")
            .field("flags", &self.flags)
            .field("reason", &self.reason)
            .field("reason_description", &reason::describe_or_unassigned(self.reason))
            .field("fragment_offset", &self.fragment_offset)
            .field("fragment_length", &self.fragment_length)
            .field("times", &self.times)
            .field("bundle_source", &self.bundle_source)
            .field("bundle_creation_timestamp", &self.bundle_creation_timestamp)
            .finish()
    }
}
