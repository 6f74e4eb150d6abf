// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Error taxonomy for the bundle protocol core.
//!
//! Parse and resource-exhaustion errors are always local: decoding a
//! malformed bundle drops that bundle and returns an error to the caller, it
//! never aborts the process.

use thiserror::Error;

/// Failures from the SDNV codec (`codec::sdnv`).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SdnvError {
    /// The buffer ended before a terminating (high-bit-clear) byte was seen.
    #[error("truncated SDNV: ran out of input before a terminator byte")]
    Truncated,
    /// A tenth byte was read and still had the continuation bit set; the
    /// value would not fit in a `u64`.
    #[error("SDNV overflow: value exceeds u64 range")]
    Overflow,
}

/// Failures parsing an Endpoint Identifier or `ipn:N.S` URI string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EidError {
    #[error("sdnv error decoding EID: {0}")]
    Sdnv(#[from] SdnvError),
    #[error("malformed ipn URI: {0:?}")]
    MalformedUri(String),
}

/// Failures decoding/encoding a primary block.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrimaryBlockError {
    #[error("unsupported bundle protocol version {0}, expected 6")]
    UnsupportedVersion(u8),
    #[error("sdnv error in primary block: {0}")]
    Sdnv(#[from] SdnvError),
    #[error("eid error in primary block: {0}")]
    Eid(#[from] EidError),
    #[error("dictionary length must be zero under CBHE, got {0}")]
    NonZeroDictionary(u64),
    #[error("primary block serialization exceeds the single-byte SDNV length limit (127): {0}")]
    TooLarge(usize),
    #[error("buffer too short to hold primary block")]
    BufferTooShort,
}

/// Failures decoding/encoding a canonical block or one of its typed variants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CanonicalBlockError {
    #[error("sdnv error in canonical block: {0}")]
    Sdnv(#[from] SdnvError),
    #[error("canonical block data length {declared} exceeds remaining buffer {remaining}")]
    DataOutOfBounds { declared: usize, remaining: usize },
    #[error("extension data failed to parse for block type {0}")]
    ExtensionParse(u8),
    #[error("buffer too short to hold canonical block header")]
    BufferTooShort,
    #[error("unknown administrative record type {0}")]
    UnknownAdminType(u8),
}

/// Failures assembling or disassembling a whole [`crate::codec::bundle::Bundle`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BundleError {
    #[error(transparent)]
    Primary(#[from] PrimaryBlockError),
    #[error(transparent)]
    Canonical(#[from] CanonicalBlockError),
    #[error("bundle has no block carrying the is-last-block flag")]
    MissingLastBlock,
    #[error("more than one block carries the is-last-block flag")]
    DuplicateLastBlock,
}

/// Custody/ACS subsystem failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CustodyError {
    #[error("no custody IDs remain (exhausted the monotonic allocator)")]
    IdsExhausted,
    #[error("custody ID {0} is not outstanding")]
    UnknownCustodyId(u64),
    #[error("sdnv error in custody signal: {0}")]
    Sdnv(#[from] SdnvError),
    #[error("fill set overflowed while accumulating a running sum")]
    FillOverflow,
}

/// Rate-limited egress engine failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EgressError {
    #[error("send ring is full, caller must retry admission later")]
    RingFull,
    #[error("send-completion byte count mismatch: expected {expected}, got {actual}")]
    ByteCountMismatch { expected: usize, actual: usize },
}

/// Convergence-layer sink/source failures.
#[derive(Debug, Error)]
pub enum ConvergenceLayerError {
    #[error("receive ring overrun, oldest undelivered packet dropped")]
    RingOverrun,
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
    #[error("source not ready to forward (DNS/bind incomplete)")]
    NotReady,
}

/// Contact-plan scheduler failures.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid contact: start {start} > end {end}")]
    InvalidContact { start: u64, end: u64 },
}

/// Configuration load/validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Umbrella error type for call sites that need to unify every subsystem
/// (orchestration, CLI) behind one `Result` type.
#[derive(Debug, Error)]
pub enum DtnError {
    #[error(transparent)]
    Sdnv(#[from] SdnvError),
    #[error(transparent)]
    Eid(#[from] EidError),
    #[error(transparent)]
    PrimaryBlock(#[from] PrimaryBlockError),
    #[error(transparent)]
    CanonicalBlock(#[from] CanonicalBlockError),
    #[error(transparent)]
    Bundle(#[from] BundleError),
    #[error(transparent)]
    Custody(#[from] CustodyError),
    #[error(transparent)]
    Egress(#[from] EgressError),
    #[error(transparent)]
    ConvergenceLayer(#[from] ConvergenceLayerError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type DtnResult<T> = Result<T, DtnError>;
