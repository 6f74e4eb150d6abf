// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use dtn_bundle_core::codec::canonical::admin::acs::AggregateCustodySignal;
use dtn_bundle_core::codec::sdnv;

#[test]
fn three_runs_encode_as_deltas_from_the_previous_runs_end() {
    let ids = vec![5, 7, 8, 9, 20];
    let acs = AggregateCustodySignal::from_custody_ids(true, 0, ids);
    assert_eq!(acs.fills, vec![(5, 1), (7, 3), (20, 1)]);

    let mut expected = Vec::new();
    for v in [5u64, 0, 1, 2, 10, 0] {
        expected.extend_from_slice(&sdnv::encode_to_vec(v));
    }

    // The encoded body is a status byte, a fill-count SDNV, then the fill
    // deltas/lengths; skip the fixed prefix and compare the rest.
    let mut body = Vec::new();
    acs.encode_body(&mut body);
    assert!(body.ends_with(&expected));

    let decoded = AggregateCustodySignal::decode_body(&body).unwrap();
    assert_eq!(decoded, acs);
}
