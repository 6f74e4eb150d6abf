// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dtn_bundle_core::cfg::cli::{resolve_config_path, Cli};
use dtn_bundle_core::cfg::config::{Config, ContactPlan};
use dtn_bundle_core::cfg::logger::init_logger;
use dtn_bundle_core::codec::eid::Eid;
use dtn_bundle_core::custody::manager::CustodyManager;
use dtn_bundle_core::egress::engine::EgressEngine;
use dtn_bundle_core::orchestration::Orchestrator;
use dtn_bundle_core::scheduler::{Contact, Scheduler};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _init_logger = init_logger("config/logger.json")?;

    let hdtn_config_path = resolve_config_path(&cli.hdtn_config_file)
        .context("failed to resolve hdtn config path")?;
    let cfg = Config::load_from_file(&hdtn_config_path).context("failed to load hdtn config")?;
    info!(node_id = cfg.node.my_node_id, "loaded node configuration");

    let contact_plan_path = resolve_config_path(&cli.contact_plan_file)
        .context("failed to resolve contact plan path")?;
    let plan = ContactPlan::load_from_file(&contact_plan_path)
        .context("failed to load contact plan")?;

    let contacts = plan
        .contacts
        .iter()
        .map(|entry| Contact::new(entry.start, entry.end, Eid::new(entry.dest, 0)))
        .collect::<Result<Vec<_>, _>>()
        .context("contact plan contains an invalid contact")?;
    info!(count = contacts.len(), "loaded contact plan");

    let scheduler = Arc::new(Scheduler::new(contacts));
    let orchestrator = Arc::new(Orchestrator::new());
    let custody = Arc::new(CustodyManager::new());

    let egress_engines: Vec<EgressEngine> = cfg
        .outducts
        .iter()
        .map(|o| EgressEngine::new(o.rate_limit_bytes_per_tick, o.max_unacked))
        .collect();

    let cancel = CancellationToken::new();

    let scheduler_handle = {
        let scheduler = scheduler.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            scheduler.run(tokio::time::Instant::now(), cancel).await;
        })
    };

    let link_event_handle = {
        let orchestrator = orchestrator.clone();
        let mut rx = scheduler.subscribe();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    event = rx.recv() => {
                        match event {
                            Ok(event) => orchestrator.on_link_event(event),
                            Err(_) => break,
                        }
                    }
                }
            }
        })
    };

    info!(
        cut_through_only_test = cli.cut_through_only_test,
        egress_engines = egress_engines.len(),
        "node started"
    );

    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    info!("shutdown requested");
    cancel.cancel();

    let _ = tokio::time::timeout(Duration::from_secs(5), scheduler_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), link_event_handle).await;
    info!(
        outstanding_custody = custody.outstanding_count(),
        egress_engines = egress_engines.len(),
        "shutdown complete"
    );

    Ok(())
}
