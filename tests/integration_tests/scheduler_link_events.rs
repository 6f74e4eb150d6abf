// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use dtn_bundle_core::codec::eid::Eid;
use dtn_bundle_core::scheduler::{Contact, LinkEvent, Scheduler};
use serial_test::serial;
use tokio_util::sync::CancellationToken;

#[tokio::test(start_paused = true)]
#[serial]
async fn two_overlapping_contacts_produce_up_up_down_down_in_order() {
    let dest = Eid::new(3, 1);
    let contacts = vec![
        Contact::new(2, 4, dest).unwrap(),
        Contact::new(3, 5, dest).unwrap(),
    ];
    let scheduler = Scheduler::new(contacts);
    let mut rx = scheduler.subscribe();
    let cancel = CancellationToken::new();
    let epoch = tokio::time::Instant::now();

    let run_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
        scheduler.run(epoch, run_cancel).await;
    });

    let mut seen = Vec::new();
    for _ in 0..4 {
        seen.push(rx.recv().await.unwrap());
    }

    assert_eq!(seen, vec![
        LinkEvent::LinkUp(dest),
        LinkEvent::LinkUp(dest),
        LinkEvent::LinkDown(dest),
        LinkEvent::LinkDown(dest),
    ]);

    cancel.cancel();
    handle.await.unwrap();
}
