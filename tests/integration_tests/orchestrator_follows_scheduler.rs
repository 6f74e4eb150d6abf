// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use dtn_bundle_core::codec::canonical::{block_type, CanonicalBlock};
use dtn_bundle_core::codec::eid::Eid;
use dtn_bundle_core::codec::flags::{CanonicalFlags, PrimaryFlags};
use dtn_bundle_core::codec::primary::PrimaryBlock;
use dtn_bundle_core::codec::timestamp::CreationTimestamp;
use dtn_bundle_core::codec::bundle::Bundle;
use dtn_bundle_core::custody::CustodyManager;
use dtn_bundle_core::egress::EgressEngine;
use dtn_bundle_core::orchestration::{DispatchOutcome, Orchestrator};
use dtn_bundle_core::scheduler::{Contact, Scheduler};
use serial_test::serial;
use tokio_util::sync::CancellationToken;

fn custody_requesting_bundle(destination: Eid) -> Bundle {
    let primary = PrimaryBlock {
        flags: PrimaryFlags::DESTINATION_IS_SINGLETON | PrimaryFlags::CUSTODY_TRANSFER_REQUESTED,
        destination,
        source: Eid::new(1, 0),
        report_to: Eid::new(1, 0),
        custodian: Eid::new(1, 0),
        creation_timestamp: CreationTimestamp::new(1, 0),
        lifetime: 3600,
        fragment_offset: None,
        total_application_data_unit_length: None,
    };
    let payload = CanonicalBlock::new(block_type::PAYLOAD, CanonicalFlags::empty(), b"hello".to_vec());
    Bundle::new(primary, vec![payload])
}

#[tokio::test(start_paused = true)]
#[serial]
async fn bundle_is_deferred_until_the_scheduled_contact_comes_up() {
    let dest = Eid::new(3, 1);
    let scheduler = Scheduler::new(vec![Contact::new(2, 10, dest).unwrap()]);
    let orchestrator = Orchestrator::new();
    let custody = CustodyManager::new();
    let mut egress = EgressEngine::new(1_000_000, 16);

    let mut rx = scheduler.subscribe();
    let cancel = CancellationToken::new();
    let epoch = tokio::time::Instant::now();
    let run_cancel = cancel.clone();
    let scheduler_handle = tokio::spawn(async move {
        scheduler.run(epoch, run_cancel).await;
    });

    let bundle = custody_requesting_bundle(dest);
    let outcome = orchestrator.try_dispatch(&bundle, &custody, &mut egress).unwrap();
    assert_eq!(outcome, DispatchOutcome::Deferred);

    let event = rx.recv().await.unwrap();
    orchestrator.on_link_event(event);
    assert!(orchestrator.is_link_up(&dest));

    let outcome = orchestrator.try_dispatch(&bundle, &custody, &mut egress).unwrap();
    assert!(matches!(outcome, DispatchOutcome::Forwarded { custody_id: Some(_) }));
    assert_eq!(custody.outstanding_count(), 1);

    cancel.cancel();
    scheduler_handle.await.unwrap();
}
