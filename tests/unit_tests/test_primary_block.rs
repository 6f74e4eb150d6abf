// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use dtn_bundle_core::codec::eid::Eid;
use dtn_bundle_core::codec::flags::PrimaryFlags;
use dtn_bundle_core::codec::primary::{PrimaryBlock, BUNDLE_PROTOCOL_VERSION};
use dtn_bundle_core::codec::timestamp::CreationTimestamp;

fn sample() -> PrimaryBlock {
    PrimaryBlock {
        flags: PrimaryFlags::DESTINATION_IS_SINGLETON | PrimaryFlags::CUSTODY_TRANSFER_REQUESTED,
        destination: Eid::new(2, 1),
        source: Eid::new(1, 1),
        report_to: Eid::new(1, 1),
        custodian: Eid::new(1, 1),
        creation_timestamp: CreationTimestamp::new(0, 0),
        lifetime: 1000,
        fragment_offset: None,
        total_application_data_unit_length: None,
    }
}

#[test]
fn singleton_and_custody_requested_round_trips() {
    let pb = sample();
    let bytes = pb.encode_to_vec().unwrap();

    assert_eq!(bytes[0], BUNDLE_PROTOCOL_VERSION);

    let (decoded, consumed) = PrimaryBlock::decode(&bytes).unwrap();
    assert_eq!(decoded, pb);
    assert_eq!(consumed, bytes.len());
    assert!(decoded.flags.contains(PrimaryFlags::DESTINATION_IS_SINGLETON));
    assert!(decoded.flags.contains(PrimaryFlags::CUSTODY_TRANSFER_REQUESTED));
    assert!(!decoded.is_fragment());
}

#[test]
fn fragment_offset_and_total_survive_the_wire() {
    let mut pb = sample();
    pb.flags |= PrimaryFlags::IS_FRAGMENT;
    pb.fragment_offset = Some(512);
    pb.total_application_data_unit_length = Some(4096);

    let bytes = pb.encode_to_vec().unwrap();
    let (decoded, _) = PrimaryBlock::decode(&bytes).unwrap();
    assert_eq!(decoded.fragment_offset, Some(512));
    assert_eq!(decoded.total_application_data_unit_length, Some(4096));
}
