// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use dtn_bundle_core::codec::canonical::admin::custody_signal::CustodySignal;
use dtn_bundle_core::codec::canonical::admin::{AdminRecord, ADMIN_FLAG_IS_FRAGMENT};
use dtn_bundle_core::codec::eid::Eid;
use dtn_bundle_core::codec::timestamp::CreationTimestamp;

#[test]
fn succeeded_fragment_signal_matches_the_expected_framing() {
    let signal = CustodySignal {
        succeeded: true,
        reason: 0,
        fragment_offset: Some(100),
        fragment_length: Some(200),
        signal_time_secs: 10,
        signal_time_nanos: 0,
        bundle_source: Eid::new(4, 2),
        bundle_creation_timestamp: CreationTimestamp::new(1, 2),
    };
    let record = AdminRecord::CustodySignal(signal.clone());
    let bytes = record.encode();

    assert_eq!(bytes[0] & ADMIN_FLAG_IS_FRAGMENT, ADMIN_FLAG_IS_FRAGMENT);
    assert_eq!(bytes[1], 0x80);

    let decoded = AdminRecord::decode(&bytes).unwrap();
    assert_eq!(decoded, AdminRecord::CustodySignal(signal));
}
