// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::{Context, Result};
use dtn_bundle_core::cfg::config::{Config, ContactPlan};

pub fn load_config() -> Result<Config> {
    Config::load_from_file("tests/fixtures/hdtn.json").context("failed to load test hdtn.json")
}

pub fn load_contact_plan() -> Result<ContactPlan> {
    ContactPlan::load_from_file("tests/fixtures/contactPlan.json")
        .context("failed to load test contactPlan.json")
}
