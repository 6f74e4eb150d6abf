// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Forwarding orchestration: ties the scheduler's link state, the custody
//! table, the ACS generator, and the egress engine together. A bundle is
//! admitted for egress only once its destination's link is up; custody is
//! accepted first, so a bundle that later fails to forward still has a
//! custodian of record. Custody acceptances accumulate in an
//! [`AcsGenerator`] until drained into outgoing aggregate custody signals;
//! inbound aggregate custody signals release the outstanding custody
//! records they cover.

use std::sync::Mutex;

use dashmap::DashMap;
use tracing::debug;

use crate::codec::bundle::Bundle;
use crate::codec::canonical::admin::acs::AggregateCustodySignal;
use crate::codec::canonical::admin::AdminRecord;
use crate::codec::canonical::{block_type, CanonicalBlock, CanonicalContent};
use crate::codec::eid::Eid;
use crate::codec::flags::{CanonicalFlags, PrimaryFlags};
use crate::codec::primary::PrimaryBlock;
use crate::custody::acs_gen::AcsGenerator;
use crate::custody::manager::CustodyManager;
use crate::egress::engine::EgressEngine;
use crate::error::{BundleError, CustodyError, EgressError};
use crate::scheduler::LinkEvent;

/// Default per-signal body-size bound passed to [`AcsGenerator`], chosen to
/// match `AcsGenerator`'s own default usage in tests: generous enough that a
/// typical batch of acknowledgements coalesces into one signal.
const DEFAULT_ACS_MAX_BODY_LEN: usize = 4096;

/// Reason code for a successful custody acceptance, matching
/// `record_type::CUSTODY_SIGNAL`'s own "no additional information" default.
const REASON_NO_ADDITIONAL_INFORMATION: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handed to the egress engine; carries the allocated custody ID if
    /// custody transfer was requested.
    Forwarded { custody_id: Option<u64> },
    /// The destination's link is not currently up; the bundle was not
    /// admitted and the caller should retry later.
    Deferred,
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    #[error(transparent)]
    Bundle(#[from] BundleError),
    #[error(transparent)]
    Egress(#[from] EgressError),
    #[error(transparent)]
    Custody(#[from] CustodyError),
}

pub struct Orchestrator {
    link_up: DashMap<Eid, bool>,
    acs_generator: Mutex<AcsGenerator>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::with_acs_max_body_len(DEFAULT_ACS_MAX_BODY_LEN)
    }

    pub fn with_acs_max_body_len(max_body_len: usize) -> Self {
        Self {
            link_up: DashMap::new(),
            acs_generator: Mutex::new(AcsGenerator::new(max_body_len)),
        }
    }

    pub fn on_link_event(&self, event: LinkEvent) {
        match event {
            LinkEvent::LinkUp(dest) => {
                self.link_up.insert(dest, true);
            },
            LinkEvent::LinkDown(dest) => {
                self.link_up.insert(dest, false);
            },
        }
    }

    pub fn is_link_up(&self, destination: &Eid) -> bool {
        self.link_up.get(destination).map(|v| *v).unwrap_or(false)
    }

    /// Attempts to admit `bundle` for transmission toward its destination.
    /// On success, accepts custody (if requested by the bundle), attaches a
    /// CTEB recording the allocated custody ID, records the acceptance for
    /// later ACS aggregation, and enqueues the serialized bundle onto
    /// `egress`.
    pub fn try_dispatch(
        &self,
        bundle: &Bundle,
        custody: &CustodyManager,
        egress: &mut EgressEngine,
    ) -> Result<DispatchOutcome, OrchestrationError> {
        if !self.is_link_up(&bundle.primary.destination) {
            debug!(destination = %bundle.primary.destination, "link down, deferring bundle");
            return Ok(DispatchOutcome::Deferred);
        }

        let requested = bundle
            .primary
            .flags
            .contains(PrimaryFlags::CUSTODY_TRANSFER_REQUESTED);

        let (custody_id, to_encode) = if requested {
            let id = custody.accept(bundle.primary.source, bundle.primary.lifetime)?;
            self.acs_generator
                .lock()
                .expect("acs generator lock poisoned")
                .add_contiguous(true, REASON_NO_ADDITIONAL_INFORMATION, id);

            let mut blocks = bundle.canonical_blocks.clone();
            let cteb = CanonicalContent::CustodyTransferEnhancement(bundle.primary.custodian.to_string())
                .encode(CanonicalFlags::empty());
            blocks.push(cteb);
            (Some(id), Bundle::new(bundle.primary.clone(), blocks))
        } else {
            (None, bundle.clone())
        };

        let bytes = to_encode.encode()?;
        egress.enqueue(bytes)?;
        Ok(DispatchOutcome::Forwarded { custody_id })
    }

    /// Drains every pending acknowledgement into aggregate custody signals,
    /// wraps each in an admin-record bundle addressed to `report_to`, and
    /// enqueues it onto `egress`. Returns the number of signals sent.
    pub fn flush_custody_acknowledgements(
        &self,
        custodian: Eid,
        report_to: Eid,
        egress: &mut EgressEngine,
    ) -> Result<usize, OrchestrationError> {
        let signals = self
            .acs_generator
            .lock()
            .expect("acs generator lock poisoned")
            .flush_all();
        let count = signals.len();
        for signal in signals {
            let bundle = acs_signal_bundle(custodian, report_to, signal);
            egress.enqueue(bundle.encode()?)?;
        }
        Ok(count)
    }

    /// Applies every aggregate custody signal carried by an inbound
    /// `bundle`, releasing each custody ID it covers from `custody`'s
    /// outstanding table. IDs this node never accepted custody of are
    /// ignored rather than treated as an error, since an ACS commonly
    /// acknowledges a batch this node only partially contributed to.
    /// Returns the number of custody records actually released.
    pub fn apply_inbound_acs(
        &self,
        bundle: &Bundle,
        custody: &CustodyManager,
    ) -> Result<usize, OrchestrationError> {
        let mut released = 0;
        for content in bundle.decode_typed_blocks()? {
            if let CanonicalContent::AdminRecord(AdminRecord::AggregateCustodySignal(signal)) = content {
                for id in signal.to_custody_ids() {
                    if custody.release(id).is_ok() {
                        released += 1;
                    }
                }
            }
        }
        Ok(released)
    }
}

/// Wraps one aggregate custody signal in a minimal admin-record bundle: a
/// single payload-coded canonical block carrying the encoded `AdminRecord`,
/// addressed from `custodian` to `report_to`.
fn acs_signal_bundle(custodian: Eid, report_to: Eid, signal: AggregateCustodySignal) -> Bundle {
    let primary = PrimaryBlock {
        flags: PrimaryFlags::IS_ADMIN_RECORD | PrimaryFlags::DESTINATION_IS_SINGLETON,
        destination: report_to,
        source: custodian,
        report_to,
        custodian,
        creation_timestamp: crate::codec::timestamp::CreationTimestamp::new(0, 0),
        lifetime: 3600,
        fragment_offset: None,
        total_application_data_unit_length: None,
    };
    let block = CanonicalBlock::new(
        block_type::PAYLOAD,
        CanonicalFlags::empty(),
        AdminRecord::AggregateCustodySignal(signal).encode(),
    );
    Bundle::new(primary, vec![block])
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}
