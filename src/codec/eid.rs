// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Compressed Bundle Header Encoding endpoint identifiers.
//!
//! Under CBHE every endpoint identifier collapses to a `(node_id,
//! service_id)` pair of `u64`s, each carried on the wire as a pair of SDNVs.
//! The dictionary byte-string form of BPv6 is never produced; the dictionary
//! length field is always zero.

use std::fmt;
use std::str::FromStr;

use crate::codec::sdnv;
use crate::error::EidError;

/// An `ipn` endpoint identifier: `ipn:<node_id>.<service_id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Eid {
    pub node_id: u64,
    pub service_id: u64,
}

impl Eid {
    pub const fn new(node_id: u64, service_id: u64) -> Self {
        Self {
            node_id,
            service_id,
        }
    }

    /// The `ipn:0.0` null endpoint identifier.
    pub const fn none() -> Self {
        Self::new(0, 0)
    }

    pub fn is_none(&self) -> bool {
        self.node_id == 0 && self.service_id == 0
    }

    /// Writes `self` as two consecutive SDNVs, returning bytes written.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&sdnv::encode_to_vec(self.node_id));
        buf.extend_from_slice(&sdnv::encode_to_vec(self.service_id));
    }

    /// Reads an `Eid` from the start of `buf`; returns `(eid, bytes_consumed)`.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), EidError> {
        let (node_id, n1) = sdnv::decode(buf)?;
        let (service_id, n2) = sdnv::decode(&buf[n1..])?;
        Ok((Self::new(node_id, service_id), n1 + n2))
    }
}

impl fmt::Display for Eid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ipn:{}.{}", self.node_id, self.service_id)
    }
}

impl FromStr for Eid {
    type Err = EidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("ipn:")
            .ok_or_else(|| EidError::MalformedUri(s.to_string()))?;
        let (node_str, service_str) = rest
            .split_once('.')
            .ok_or_else(|| EidError::MalformedUri(s.to_string()))?;
        let node_id: u64 = node_str
            .parse()
            .map_err(|_| EidError::MalformedUri(s.to_string()))?;
        let service_id: u64 = service_str
            .parse()
            .map_err(|_| EidError::MalformedUri(s.to_string()))?;
        Ok(Self::new(node_id, service_id))
    }
}
