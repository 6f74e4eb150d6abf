// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::time::Duration;

use dtn_bundle_core::egress::EgressEngine;
use serial_test::serial;

#[tokio::test(start_paused = true)]
#[serial]
async fn ten_thousand_byte_per_second_limiter_drains_ten_payloads_in_one_second() {
    // rate = 10 000 bytes/s, refreshed every 100 ms => 1000 bytes/tick,
    // which is also the bucket's capacity.
    let mut engine = EgressEngine::new(1000, 32);
    for _ in 0..10 {
        engine.enqueue(vec![0u8; 1000]).unwrap();
    }

    let mut sent = 0;
    // The bucket starts full, so the first payload fits immediately.
    while engine.try_forward().is_some() {
        sent += 1;
    }
    assert_eq!(sent, 1);
    assert_eq!(engine.queued_len(), 9);

    for _ in 0..9 {
        tokio::time::advance(Duration::from_millis(100)).await;
        engine.on_refresh_timer(1000);
        while engine.try_forward().is_some() {
            sent += 1;
        }
    }

    assert_eq!(sent, 10);
    assert_eq!(engine.queued_len(), 0);
}
