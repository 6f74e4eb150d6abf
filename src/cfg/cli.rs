// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "dtn-bundle-core", about = "Bundle Protocol v6 / CBHE core node")]
pub struct Cli {
    /// Path to the node configuration file.
    #[arg(long = "hdtn-config-file", default_value = "hdtn.json")]
    pub hdtn_config_file: PathBuf,

    /// Path to the contact plan file.
    #[arg(long = "contact-plan-file", default_value = "contactPlan.json")]
    pub contact_plan_file: PathBuf,

    /// Optional path to a file of scripted link-up/link-down events to
    /// replay instead of (or in addition to) the contact plan.
    #[arg(long = "events-file")]
    pub events_file: Option<PathBuf>,

    /// Run bundles straight from ingress to egress without accepting
    /// custody, for latency testing.
    #[arg(long = "cut-through-only-test", default_value_t = false)]
    pub cut_through_only_test: bool,
}

pub fn resolve_config_path(rel: impl AsRef<Path>) -> Result<PathBuf> {
    let p = rel.as_ref();

    let abs = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()
            .context("cannot get current working dir")?
            .join(p)
    };

    abs.canonicalize()
        .with_context(|| format!("failed to canonicalize path {abs:?}"))
}
