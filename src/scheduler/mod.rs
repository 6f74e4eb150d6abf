// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Contact-plan scheduler: turns a list of `(start, end, destination)`
//! contacts into timer-driven `LinkUp`/`LinkDown` events published to every
//! subscriber. A cancelled timer is dropped silently — it never publishes
//! and is never treated as an error — matching the reference scheduler's
//! `operation_aborted` handling.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::codec::eid::Eid;
use crate::error::SchedulerError;

/// One entry in a contact plan: link `destination` is up for
/// `[start_secs, end_secs)` relative to the scheduler's start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub start_secs: u64,
    pub end_secs: u64,
    pub destination: Eid,
}

impl Contact {
    pub fn new(start_secs: u64, end_secs: u64, destination: Eid) -> Result<Self, SchedulerError> {
        if start_secs > end_secs {
            return Err(SchedulerError::InvalidContact {
                start: start_secs,
                end: end_secs,
            });
        }
        Ok(Self {
            start_secs,
            end_secs,
            destination,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    LinkUp(Eid),
    LinkDown(Eid),
}

/// Schedules one process's worth of contacts and publishes link state
/// transitions on a broadcast channel every subscriber can listen to.
pub struct Scheduler {
    contacts: Vec<Contact>,
    events_tx: broadcast::Sender<LinkEvent>,
}

impl Scheduler {
    pub fn new(contacts: Vec<Contact>) -> Self {
        let (events_tx, _rx) = broadcast::channel(256);
        Self {
            contacts,
            events_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LinkEvent> {
        self.events_tx.subscribe()
    }

    /// Spawns one timer task per contact boundary (`start`, `end + 1`) and
    /// runs until `cancel` fires. Contacts to the same destination are not
    /// deduplicated: an overlapping pair produces two independent
    /// `LinkUp`/`LinkDown` pairs, same as the reference scheduler.
    pub async fn run(&self, epoch: Instant, cancel: CancellationToken) {
        let mut tasks = tokio::task::JoinSet::new();
        for contact in &self.contacts {
            let tx = self.events_tx.clone();
            let dest = contact.destination;
            let up_at = epoch + Duration::from_secs(contact.start_secs);
            let down_at = epoch + Duration::from_secs(contact.end_secs + 1);
            let cancel_up = cancel.clone();
            tasks.spawn(async move {
                tokio::select! {
                    _ = cancel_up.cancelled() => {
                        debug!(?dest, "link-up timer cancelled");
                    }
                    _ = tokio::time::sleep_until(up_at) => {
                        let _ = tx.send(LinkEvent::LinkUp(dest));
                    }
                }
            });
            let tx = self.events_tx.clone();
            let cancel_down = cancel.clone();
            tasks.spawn(async move {
                tokio::select! {
                    _ = cancel_down.cancelled() => {
                        debug!(?dest, "link-down timer cancelled");
                    }
                    _ = tokio::time::sleep_until(down_at) => {
                        let _ = tx.send(LinkEvent::LinkDown(dest));
                    }
                }
            });
        }
        while tasks.join_next().await.is_some() {}
    }
}
