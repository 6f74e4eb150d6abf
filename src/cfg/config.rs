// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level node configuration (`hdtn.json` equivalent): this node's
/// identity plus every outduct (egress convergence-layer endpoint) and
/// induct (ingress convergence-layer endpoint) it runs.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    pub node: NodeConfig,
    #[serde(default)]
    pub outducts: Vec<OutductConfig>,
    #[serde(default)]
    pub inducts: Vec<InductConfig>,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct NodeConfig {
    #[serde(rename = "myNodeId")]
    pub my_node_id: u64,
    #[serde(rename = "endpointIdStr")]
    pub endpoint_id_str: String,
    #[serde(rename = "bundlePipelineLimit", default = "default_bundle_pipeline_limit")]
    pub bundle_pipeline_limit: u32,
}

fn default_bundle_pipeline_limit() -> u32 {
    50
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConvergenceLayerKind {
    Udp,
    Tcpcl,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutductConfig {
    pub name: String,
    #[serde(rename = "convergenceLayer")]
    pub convergence_layer: ConvergenceLayerKind,
    #[serde(rename = "remoteHostname")]
    pub remote_hostname: String,
    #[serde(rename = "remotePort")]
    pub remote_port: u16,
    #[serde(rename = "rateLimitBytesPerTick", default = "default_rate_limit")]
    pub rate_limit_bytes_per_tick: i64,
    #[serde(rename = "maxUnacked", default = "default_max_unacked")]
    pub max_unacked: usize,
}

fn default_rate_limit() -> i64 {
    1_000_000
}

fn default_max_unacked() -> usize {
    16
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct InductConfig {
    pub name: String,
    #[serde(rename = "convergenceLayer")]
    pub convergence_layer: ConvergenceLayerKind,
    #[serde(rename = "bindAddress")]
    pub bind_address: String,
    #[serde(rename = "bindPort")]
    pub bind_port: u16,
    #[serde(rename = "ringCapacity", default = "default_ring_capacity")]
    pub ring_capacity: usize,
}

fn default_ring_capacity() -> usize {
    256
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RuntimeConfig {
    #[serde(rename = "refreshIntervalMillis", default = "default_refresh_interval_millis")]
    pub refresh_interval_millis: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            refresh_interval_millis: default_refresh_interval_millis(),
        }
    }
}

fn default_refresh_interval_millis() -> u64 {
    1000
}

impl Config {
    /// Loads the node configuration from JSON, validates it, and returns the
    /// ready-to-use value.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        let mut cfg: Config = serde_json::from_str(&s).context("failed to parse config JSON")?;
        cfg.validate_and_normalize()?;
        Ok(cfg)
    }

    /// Validates invariants across the whole config.
    pub fn validate_and_normalize(&mut self) -> Result<()> {
        ensure!(
            !self.node.endpoint_id_str.is_empty(),
            "endpointIdStr must not be empty"
        );
        ensure!(
            self.node.bundle_pipeline_limit >= 1,
            "bundlePipelineLimit must be >= 1"
        );
        for outduct in &self.outducts {
            ensure!(
                outduct.rate_limit_bytes_per_tick >= 0,
                "outduct {} has a negative rate limit",
                outduct.name
            );
        }
        Ok(())
    }
}

/// One entry in a contact plan: a scheduled window during which `source`
/// has connectivity to `dest`.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactPlanEntry {
    pub contact: u64,
    pub source: u64,
    pub dest: u64,
    pub start: u64,
    pub end: u64,
    #[serde(default)]
    pub rate: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ContactPlan {
    pub contacts: Vec<ContactPlanEntry>,
}

impl ContactPlan {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        let plan: ContactPlan =
            serde_json::from_str(&s).context("failed to parse contact plan JSON")?;
        plan.validate()?;
        Ok(plan)
    }

    fn validate(&self) -> Result<()> {
        for entry in &self.contacts {
            ensure!(
                entry.start <= entry.end,
                "contact {} has start {} after end {}",
                entry.contact,
                entry.start,
                entry.end
            );
            ensure!(entry.rate >= 0, "contact {} has a negative rate", entry.contact);
        }
        Ok(())
    }
}
