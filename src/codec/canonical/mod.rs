// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Canonical (extension) blocks.
//!
//! Every block after the primary block shares one header shape: a type
//! code, processing flags, a data length, and opaque data. This module
//! provides that generic shape plus typed views over the data for the
//! block types this node understands; anything else round-trips as opaque
//! bytes via [`CanonicalBlock`] alone.

pub mod admin;

use crate::codec::canonical::admin::AdminRecord;
use crate::codec::flags::CanonicalFlags;
use crate::codec::sdnv;
use crate::error::CanonicalBlockError;

/// Well-known canonical block type codes.
pub mod block_type {
    pub const PAYLOAD: u8 = 1;
    pub const PREVIOUS_HOP_INSERTION: u8 = 5;
    pub const METADATA_EXTENSION: u8 = 8;
    pub const CUSTODY_TRANSFER_ENHANCEMENT: u8 = 10;
    pub const BUNDLE_AGE: u8 = 20;
}

/// The untyped shape every canonical block shares on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalBlock {
    pub block_type: u8,
    pub flags: CanonicalFlags,
    pub data: Vec<u8>,
}

impl CanonicalBlock {
    pub fn new(block_type: u8, flags: CanonicalFlags, data: Vec<u8>) -> Self {
        Self {
            block_type,
            flags,
            data,
        }
    }

    pub fn is_admin_payload(&self) -> bool {
        self.block_type == block_type::PAYLOAD
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.block_type);
        out.extend_from_slice(&sdnv::encode_to_vec(self.flags.bits()));
        out.extend_from_slice(&sdnv::encode_to_vec(self.data.len() as u64));
        out.extend_from_slice(&self.data);
    }

    /// Decodes one canonical block from the start of `buf`, returning
    /// `(block, bytes_consumed)`.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), CanonicalBlockError> {
        let block_type = *buf.first().ok_or(CanonicalBlockError::BufferTooShort)?;
        let mut pos = 1usize;

        let (flags_bits, n) = sdnv::decode(&buf[pos..])?;
        pos += n;
        let flags = CanonicalFlags::from_bits_truncate(flags_bits);

        let (data_len, n) = sdnv::decode(&buf[pos..])?;
        pos += n;
        let data_len = data_len as usize;

        let remaining = buf.len() - pos;
        if data_len > remaining {
            return Err(CanonicalBlockError::DataOutOfBounds {
                declared: data_len,
                remaining,
            });
        }
        let data = buf[pos..pos + data_len].to_vec();
        pos += data_len;

        Ok((
            Self {
                block_type,
                flags,
                data,
            },
            pos,
        ))
    }
}

/// The polymorphic interpretation of a [`CanonicalBlock`]'s data, resolved
/// from the block-type code and whether the enclosing bundle carries the
/// admin-record flag. A code-20 bundle-age block and a code-1 payload block
/// under an admin-record bundle both decode to something other than raw
/// bytes; everything else this node doesn't have a typed view for stays
/// [`CanonicalContent::Generic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalContent {
    Payload(Vec<u8>),
    AdminRecord(AdminRecord),
    PreviousHop(String),
    Metadata(MetadataContent),
    CustodyTransferEnhancement(String),
    BundleAge(u64),
    Generic(CanonicalBlock),
}

impl CanonicalContent {
    /// Dispatches on `block.block_type`, consulting `is_admin_record_bundle`
    /// only for the payload code (type 1), per the canonical-block dispatch
    /// table: a type-1 block is an administrative record when the enclosing
    /// bundle's admin-record flag is set, a plain payload otherwise.
    pub fn decode(
        block: &CanonicalBlock,
        is_admin_record_bundle: bool,
    ) -> Result<Self, CanonicalBlockError> {
        match block.block_type {
            block_type::PAYLOAD if is_admin_record_bundle => {
                Ok(Self::AdminRecord(AdminRecord::decode(&block.data)?))
            },
            block_type::PAYLOAD => Ok(Self::Payload(block.data.clone())),
            block_type::PREVIOUS_HOP_INSERTION => {
                Ok(Self::PreviousHop(decode_previous_hop(&block.data)?))
            },
            block_type::METADATA_EXTENSION => Ok(Self::Metadata(decode_metadata(&block.data)?)),
            block_type::CUSTODY_TRANSFER_ENHANCEMENT => {
                Ok(Self::CustodyTransferEnhancement(decode_cteb(&block.data)?))
            },
            block_type::BUNDLE_AGE => Ok(Self::BundleAge(decode_bundle_age(&block.data)?)),
            _ => Ok(Self::Generic(block.clone())),
        }
    }

    /// Builds the wire-shape [`CanonicalBlock`] this content encodes to.
    /// `flags` carries only the caller's intended processing flags; the
    /// is-last-block flag is set separately by [`crate::codec::bundle::Bundle::new`].
    pub fn encode(&self, flags: CanonicalFlags) -> CanonicalBlock {
        match self {
            Self::Payload(bytes) => CanonicalBlock::new(block_type::PAYLOAD, flags, bytes.clone()),
            Self::AdminRecord(record) => {
                CanonicalBlock::new(block_type::PAYLOAD, flags, record.encode())
            },
            Self::PreviousHop(eid_str) => {
                CanonicalBlock::new(block_type::PREVIOUS_HOP_INSERTION, flags, encode_previous_hop(eid_str))
            },
            Self::Metadata(content) => {
                CanonicalBlock::new(block_type::METADATA_EXTENSION, flags, encode_metadata(content))
            },
            Self::CustodyTransferEnhancement(eid_str) => CanonicalBlock::new(
                block_type::CUSTODY_TRANSFER_ENHANCEMENT,
                flags,
                encode_cteb(eid_str),
            ),
            Self::BundleAge(age) => {
                CanonicalBlock::new(block_type::BUNDLE_AGE, flags, encode_bundle_age(*age))
            },
            Self::Generic(block) => block.clone(),
        }
    }
}

/// A previous-hop insertion block's data is the sending node's EID as
/// NUL-terminated ASCII (matching the on-the-wire convention used by
/// deployed previous-hop extension blocks rather than an SDNV-length EID).
pub fn encode_previous_hop(eid_str: &str) -> Vec<u8> {
    let mut v = eid_str.as_bytes().to_vec();
    v.push(0);
    v
}

pub fn decode_previous_hop(data: &[u8]) -> Result<String, CanonicalBlockError> {
    let end = data
        .iter()
        .position(|&b| b == 0)
        .ok_or(CanonicalBlockError::ExtensionParse(block_type::PREVIOUS_HOP_INSERTION))?;
    String::from_utf8(data[..end].to_vec())
        .map_err(|_| CanonicalBlockError::ExtensionParse(block_type::PREVIOUS_HOP_INSERTION))
}

/// A bundle-age block's data is a single SDNV: microseconds (or
/// implementation-defined unit) since the bundle was created, used in place
/// of wall-clock creation time when no accurate clock is available.
pub fn encode_bundle_age(age: u64) -> Vec<u8> {
    sdnv::encode_to_vec(age)
}

pub fn decode_bundle_age(data: &[u8]) -> Result<u64, CanonicalBlockError> {
    let (age, consumed) = sdnv::decode(data)?;
    if consumed != data.len() {
        return Err(CanonicalBlockError::ExtensionParse(block_type::BUNDLE_AGE));
    }
    Ok(age)
}

/// A custody-transfer enhancement block carries the custodian's EID as a
/// NUL-terminated ASCII string, mirroring the previous-hop block's wire
/// form.
pub fn encode_cteb(custodian_eid_str: &str) -> Vec<u8> {
    encode_previous_hop(custodian_eid_str)
}

pub fn decode_cteb(data: &[u8]) -> Result<String, CanonicalBlockError> {
    decode_previous_hop(data).map_err(|_| {
        CanonicalBlockError::ExtensionParse(block_type::CUSTODY_TRANSFER_ENHANCEMENT)
    })
}

/// Metadata extension block content: either a list of URIs or an opaque
/// type-tagged byte string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataContent {
    UriList(Vec<String>),
    Opaque(Vec<u8>),
}

const METADATA_TYPE_URI_LIST: u8 = 1;
const METADATA_TYPE_OPAQUE: u8 = 255;

pub fn encode_metadata(content: &MetadataContent) -> Vec<u8> {
    let mut out = Vec::new();
    match content {
        MetadataContent::UriList(uris) => {
            out.push(METADATA_TYPE_URI_LIST);
            out.extend_from_slice(&sdnv::encode_to_vec(uris.len() as u64));
            for uri in uris {
                out.extend_from_slice(&sdnv::encode_to_vec(uri.len() as u64));
                out.extend_from_slice(uri.as_bytes());
            }
        },
        MetadataContent::Opaque(bytes) => {
            out.push(METADATA_TYPE_OPAQUE);
            out.extend_from_slice(bytes);
        },
    }
    out
}

pub fn decode_metadata(data: &[u8]) -> Result<MetadataContent, CanonicalBlockError> {
    let tag = *data
        .first()
        .ok_or(CanonicalBlockError::ExtensionParse(block_type::METADATA_EXTENSION))?;
    let rest = &data[1..];
    match tag {
        METADATA_TYPE_URI_LIST => {
            let (count, mut pos) = sdnv::decode(rest)
                .map_err(|_| CanonicalBlockError::ExtensionParse(block_type::METADATA_EXTENSION))?;
            let mut uris = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let (len, n) = sdnv::decode(&rest[pos..]).map_err(|_| {
                    CanonicalBlockError::ExtensionParse(block_type::METADATA_EXTENSION)
                })?;
                pos += n;
                let len = len as usize;
                let bytes = rest.get(pos..pos + len).ok_or(
                    CanonicalBlockError::ExtensionParse(block_type::METADATA_EXTENSION),
                )?;
                pos += len;
                let uri = String::from_utf8(bytes.to_vec()).map_err(|_| {
                    CanonicalBlockError::ExtensionParse(block_type::METADATA_EXTENSION)
                })?;
                uris.push(uri);
            }
            Ok(MetadataContent::UriList(uris))
        },
        _ => Ok(MetadataContent::Opaque(rest.to_vec())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_block_round_trip() {
        let block = CanonicalBlock::new(
            block_type::PAYLOAD,
            CanonicalFlags::IS_LAST_BLOCK,
            b"hello world".to_vec(),
        );
        let mut buf = Vec::new();
        block.encode(&mut buf);
        let (decoded, consumed) = CanonicalBlock::decode(&buf).unwrap();
        assert_eq!(decoded, block);
        assert_eq!(consumed, buf.len());
    }

    #[test]
    fn previous_hop_round_trip() {
        let data = encode_previous_hop("ipn:5.0");
        assert_eq!(decode_previous_hop(&data).unwrap(), "ipn:5.0");
    }

    #[test]
    fn bundle_age_round_trip() {
        let data = encode_bundle_age(123_456);
        assert_eq!(decode_bundle_age(&data).unwrap(), 123_456);
    }

    #[test]
    fn cteb_round_trip() {
        let data = encode_cteb("ipn:9.0");
        assert_eq!(decode_cteb(&data).unwrap(), "ipn:9.0");
    }

    #[test]
    fn metadata_uri_list_round_trip() {
        let content = MetadataContent::UriList(vec!["a".into(), "bb".into()]);
        let data = encode_metadata(&content);
        assert_eq!(decode_metadata(&data).unwrap(), content);
    }

    #[test]
    fn metadata_opaque_round_trip() {
        let content = MetadataContent::Opaque(vec![1, 2, 3]);
        let data = encode_metadata(&content);
        assert_eq!(decode_metadata(&data).unwrap(), content);
    }

    #[test]
    fn data_out_of_bounds_is_an_error() {
        let mut buf = vec![block_type::PAYLOAD];
        buf.extend_from_slice(&sdnv::encode_to_vec(0));
        buf.extend_from_slice(&sdnv::encode_to_vec(50));
        assert!(matches!(
            CanonicalBlock::decode(&buf),
            Err(CanonicalBlockError::DataOutOfBounds { .. })
        ));
    }

    #[test]
    fn bundle_age_dispatches_on_type_code_20_regardless_of_admin_flag() {
        let block = CanonicalContent::BundleAge(42).encode(CanonicalFlags::empty());
        assert_eq!(block.block_type, block_type::BUNDLE_AGE);
        assert_eq!(
            CanonicalContent::decode(&block, false).unwrap(),
            CanonicalContent::BundleAge(42)
        );
        assert_eq!(
            CanonicalContent::decode(&block, true).unwrap(),
            CanonicalContent::BundleAge(42)
        );
    }

    #[test]
    fn type_1_dispatches_to_payload_or_admin_record_depending_on_the_flag() {
        let block = CanonicalContent::Payload(b"hello".to_vec()).encode(CanonicalFlags::empty());
        assert_eq!(
            CanonicalContent::decode(&block, false).unwrap(),
            CanonicalContent::Payload(b"hello".to_vec())
        );

        let signal = admin::custody_signal::CustodySignal {
            succeeded: true,
            reason: 0,
            fragment_offset: None,
            fragment_length: None,
            signal_time_secs: 1,
            signal_time_nanos: 0,
            bundle_source: crate::codec::eid::Eid::new(1, 0),
            bundle_creation_timestamp: crate::codec::timestamp::CreationTimestamp::new(1, 0),
        };
        let record = AdminRecord::CustodySignal(signal);
        let admin_block = CanonicalContent::AdminRecord(record.clone()).encode(CanonicalFlags::empty());
        assert_eq!(admin_block.block_type, block_type::PAYLOAD);
        assert_eq!(
            CanonicalContent::decode(&admin_block, true).unwrap(),
            CanonicalContent::AdminRecord(record)
        );
    }

    #[test]
    fn cteb_dispatches_the_same_regardless_of_admin_flag() {
        let block = CanonicalContent::CustodyTransferEnhancement("ipn:9.0".to_string())
            .encode(CanonicalFlags::empty());
        assert_eq!(
            CanonicalContent::decode(&block, false).unwrap(),
            CanonicalContent::CustodyTransferEnhancement("ipn:9.0".to_string())
        );
    }
}
