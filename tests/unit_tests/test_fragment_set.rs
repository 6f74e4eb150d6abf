// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use dtn_bundle_core::codec::fragment_set::{FragmentSet, Interval};

fn as_pairs(fs: &FragmentSet) -> Vec<(u64, u64)> {
    fs.iter().map(|iv| (iv.begin, iv.end)).collect()
}

#[test]
fn insert_merges_across_a_filled_gap_then_remove_splits_it_back_open() {
    let mut fs = FragmentSet::new();
    fs.insert(Interval::new(10, 20));
    fs.insert(Interval::new(30, 40));
    fs.insert(Interval::new(20, 30));
    assert_eq!(as_pairs(&fs), vec![(10, 40)]);

    fs.remove(Interval::new(15, 35));
    assert_eq!(as_pairs(&fs), vec![(10, 14), (36, 40)]);
}
