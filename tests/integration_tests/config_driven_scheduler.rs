// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use dtn_bundle_core::codec::eid::Eid;
use dtn_bundle_core::scheduler::{Contact, LinkEvent, Scheduler};
use serial_test::serial;
use tokio_util::sync::CancellationToken;

use crate::integration_tests::common;

#[tokio::test(start_paused = true)]
#[serial]
async fn scheduler_built_from_a_loaded_contact_plan_publishes_the_expected_events() {
    let config = common::load_config().unwrap();
    assert_eq!(config.node.my_node_id, 1);
    assert_eq!(config.outducts[0].rate_limit_bytes_per_tick, 10_000);

    let plan = common::load_contact_plan().unwrap();
    let contacts: Vec<Contact> = plan
        .contacts
        .iter()
        .map(|entry| Contact::new(entry.start, entry.end, Eid::new(entry.dest, 1)).unwrap())
        .collect();
    assert_eq!(contacts.len(), 2);

    let dest = Eid::new(3, 1);
    let scheduler = Scheduler::new(contacts);
    let mut rx = scheduler.subscribe();
    let cancel = CancellationToken::new();
    let epoch = tokio::time::Instant::now();

    let run_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
        scheduler.run(epoch, run_cancel).await;
    });

    let first = rx.recv().await.unwrap();
    let second = rx.recv().await.unwrap();
    assert_eq!(first, LinkEvent::LinkUp(dest));
    assert_eq!(second, LinkEvent::LinkUp(dest));

    cancel.cancel();
    handle.await.unwrap();
}
