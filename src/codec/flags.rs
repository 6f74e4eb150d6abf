// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Primary-block processing flags and canonical-block processing flags,
//! both carried on the wire as SDNVs but manipulated as bit sets.

use bitflags::bitflags;

bitflags! {
    /// Primary block processing control flags (bundle-wide).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PrimaryFlags: u64 {
        const IS_FRAGMENT          = 1 << 0;
        const IS_ADMIN_RECORD       = 1 << 1;
        const DO_NOT_FRAGMENT       = 1 << 2;
        const CUSTODY_TRANSFER_REQUESTED = 1 << 3;
        const DESTINATION_IS_SINGLETON = 1 << 4;
        const ACK_BY_APP_REQUESTED  = 1 << 5;

        const PRIORITY_BULK         = 0;
        const PRIORITY_NORMAL       = 1 << 7;
        const PRIORITY_EXPEDITED    = 1 << 8;

        const CLASS_OF_SERVICE_MASK = Self::PRIORITY_NORMAL.bits() | Self::PRIORITY_EXPEDITED.bits();

        const REPORT_RECEPTION      = 1 << 14;
        const REPORT_CUSTODY_ACCEPTANCE = 1 << 15;
        const REPORT_FORWARDING     = 1 << 16;
        const REPORT_DELIVERY       = 1 << 17;
        const REPORT_DELETION       = 1 << 18;
    }
}

bitflags! {
    /// Canonical block processing control flags (per-block).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CanonicalFlags: u64 {
        const REPLICATE_IN_EVERY_FRAGMENT       = 1 << 0;
        const REPORT_STATUS_IF_UNPROCESSABLE    = 1 << 1;
        const DELETE_BUNDLE_IF_UNPROCESSABLE    = 1 << 2;
        const IS_LAST_BLOCK                     = 1 << 3;
        const DISCARD_IF_UNPROCESSABLE          = 1 << 4;
        const BLOCK_WAS_FORWARDED_WITHOUT_PROCESSING = 1 << 5;
        const BLOCK_CONTAINS_EID_REFERENCES     = 1 << 6;
    }
}
