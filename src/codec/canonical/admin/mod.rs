// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Administrative records: the payload of a bundle whose primary block
//! carries the admin-record flag. The first byte packs a 4-bit record type
//! into the high nibble and per-type flag bits into the low nibble.

pub mod acs;
pub mod custody_signal;
pub mod reason;
pub mod status_report;

use enum_dispatch::enum_dispatch;

use crate::codec::canonical::admin::acs::AggregateCustodySignal;
use crate::codec::canonical::admin::custody_signal::CustodySignal;
use crate::codec::canonical::admin::status_report::StatusReport;
use crate::error::CanonicalBlockError;

pub mod record_type {
    pub const STATUS_REPORT: u8 = 1;
    pub const CUSTODY_SIGNAL: u8 = 2;
    pub const AGGREGATE_CUSTODY_SIGNAL: u8 = 4;
}

/// Low nibble of the admin record header: whether the bundle being
/// reported on is itself a fragment, in which case offset/length fields
/// follow.
pub const ADMIN_FLAG_IS_FRAGMENT: u8 = 1 << 0;

/// Common shape every admin record variant exposes, so the enum can dispatch
/// to whichever one it holds without a manual match at every call site.
#[enum_dispatch]
pub trait AdminRecordBody {
    fn record_type(&self) -> u8;
    fn is_fragment(&self) -> bool;
    fn encode_body(&self, out: &mut Vec<u8>);
}

impl AdminRecordBody for StatusReport {
    fn record_type(&self) -> u8 {
        record_type::STATUS_REPORT
    }

    fn is_fragment(&self) -> bool {
        StatusReport::is_fragment(self)
    }

    fn encode_body(&self, out: &mut Vec<u8>) {
        StatusReport::encode_body(self, out)
    }
}

impl AdminRecordBody for CustodySignal {
    fn record_type(&self) -> u8 {
        record_type::CUSTODY_SIGNAL
    }

    fn is_fragment(&self) -> bool {
        CustodySignal::is_fragment(self)
    }

    fn encode_body(&self, out: &mut Vec<u8>) {
        CustodySignal::encode_body(self, out)
    }
}

impl AdminRecordBody for AggregateCustodySignal {
    fn record_type(&self) -> u8 {
        record_type::AGGREGATE_CUSTODY_SIGNAL
    }

    fn is_fragment(&self) -> bool {
        false
    }

    fn encode_body(&self, out: &mut Vec<u8>) {
        AggregateCustodySignal::encode_body(self, out)
    }
}

#[enum_dispatch(AdminRecordBody)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminRecord {
    StatusReport(StatusReport),
    CustodySignal(CustodySignal),
    AggregateCustodySignal(AggregateCustodySignal),
}

impl AdminRecord {
    pub fn encode(&self) -> Vec<u8> {
        let flags = if self.is_fragment() { ADMIN_FLAG_IS_FRAGMENT } else { 0 };
        let mut out = vec![(self.record_type() << 4) | flags];
        self.encode_body(&mut out);
        out
    }

    pub fn decode(data: &[u8]) -> Result<Self, CanonicalBlockError> {
        let header = *data
            .first()
            .ok_or(CanonicalBlockError::BufferTooShort)?;
        let record_type = header >> 4;
        let is_fragment = header & ADMIN_FLAG_IS_FRAGMENT != 0;
        let body = &data[1..];
        match record_type {
            record_type::STATUS_REPORT => {
                Ok(AdminRecord::StatusReport(StatusReport::decode_body(body, is_fragment)?))
            },
            record_type::CUSTODY_SIGNAL => {
                Ok(AdminRecord::CustodySignal(CustodySignal::decode_body(body, is_fragment)?))
            },
            record_type::AGGREGATE_CUSTODY_SIGNAL => Ok(AdminRecord::AggregateCustodySignal(
                AggregateCustodySignal::decode_body(body)?,
            )),
            other => Err(CanonicalBlockError::UnknownAdminType(other)),
        }
    }
}
