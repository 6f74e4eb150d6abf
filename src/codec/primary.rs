// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The bundle primary block.
//!
//! Layout (CBHE, dictionary always absent): version byte, processing flags
//! SDNV, block-length SDNV, four `(scheme_offset, ssp_offset)` EID pairs
//! (destination, source, report-to, custodian) each collapsed to
//! `(node_id, service_id)`, creation timestamp, lifetime, a dictionary
//! length that is always zero, and — only when `IS_FRAGMENT` is set — a
//! fragment offset and total application data unit length.

use crate::codec::eid::Eid;
use crate::codec::flags::PrimaryFlags;
use crate::codec::sdnv;
use crate::codec::timestamp::CreationTimestamp;
use crate::error::PrimaryBlockError;

pub const BUNDLE_PROTOCOL_VERSION: u8 = 6;

/// A single-byte SDNV tops out at 127; a primary block whose body needs a
/// longer length encoding is rejected rather than silently widened, keeping
/// the block-length field fixed at one byte on the wire.
pub const MAX_PRIMARY_BODY_LEN: usize = 127;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryBlock {
    pub flags: PrimaryFlags,
    pub destination: Eid,
    pub source: Eid,
    pub report_to: Eid,
    pub custodian: Eid,
    pub creation_timestamp: CreationTimestamp,
    pub lifetime: u64,
    pub fragment_offset: Option<u64>,
    pub total_application_data_unit_length: Option<u64>,
}

impl PrimaryBlock {
    pub fn is_fragment(&self) -> bool {
        self.flags.contains(PrimaryFlags::IS_FRAGMENT)
    }

    /// Serializes `self`, appending to `out`. The block-length field is
    /// back-patched after the body is built so its value is known.
    pub fn encode(&self, out: &mut Vec<u8>) -> Result<(), PrimaryBlockError> {
        out.push(BUNDLE_PROTOCOL_VERSION);
        out.extend_from_slice(&sdnv::encode_to_vec(self.flags.bits()));

        let mut body = Vec::new();
        self.destination.encode(&mut body);
        self.source.encode(&mut body);
        self.report_to.encode(&mut body);
        self.custodian.encode(&mut body);
        self.creation_timestamp.encode(&mut body);
        body.extend_from_slice(&sdnv::encode_to_vec(self.lifetime));
        // Dictionary length is always zero under CBHE.
        body.extend_from_slice(&sdnv::encode_to_vec(0));
        if self.is_fragment() {
            let offset = self.fragment_offset.unwrap_or(0);
            let total = self.total_application_data_unit_length.unwrap_or(0);
            body.extend_from_slice(&sdnv::encode_to_vec(offset));
            body.extend_from_slice(&sdnv::encode_to_vec(total));
        }

        if body.len() > MAX_PRIMARY_BODY_LEN {
            return Err(PrimaryBlockError::TooLarge(body.len()));
        }
        out.extend_from_slice(&sdnv::encode_to_vec(body.len() as u64));
        out.extend_from_slice(&body);
        Ok(())
    }

    pub fn encode_to_vec(&self) -> Result<Vec<u8>, PrimaryBlockError> {
        let mut out = Vec::new();
        self.encode(&mut out)?;
        Ok(out)
    }

    /// Decodes a primary block from the start of `buf`, returning
    /// `(block, bytes_consumed)`.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), PrimaryBlockError> {
        let version = *buf.first().ok_or(PrimaryBlockError::BufferTooShort)?;
        if version != BUNDLE_PROTOCOL_VERSION {
            return Err(PrimaryBlockError::UnsupportedVersion(version));
        }
        let mut pos = 1usize;

        let (flags_bits, n) = sdnv::decode(&buf[pos..])?;
        pos += n;
        let flags = PrimaryFlags::from_bits_truncate(flags_bits);

        let (body_len, n) = sdnv::decode(&buf[pos..])?;
        pos += n;
        let body_len = body_len as usize;

        let body = buf
            .get(pos..pos + body_len)
            .ok_or(PrimaryBlockError::BufferTooShort)?;
        let consumed_header = pos + body_len;

        let mut bp = 0usize;
        let (destination, n) = Eid::decode(&body[bp..])?;
        bp += n;
        let (source, n) = Eid::decode(&body[bp..])?;
        bp += n;
        let (report_to, n) = Eid::decode(&body[bp..])?;
        bp += n;
        let (custodian, n) = Eid::decode(&body[bp..])?;
        bp += n;
        let (creation_timestamp, n) = CreationTimestamp::decode(&body[bp..])?;
        bp += n;
        let (lifetime, n) = sdnv::decode(&body[bp..])?;
        bp += n;
        let (dictionary_len, n) = sdnv::decode(&body[bp..])?;
        bp += n;
        if dictionary_len != 0 {
            return Err(PrimaryBlockError::NonZeroDictionary(dictionary_len));
        }

        let (fragment_offset, total_application_data_unit_length) =
            if flags.contains(PrimaryFlags::IS_FRAGMENT) {
                let (offset, n) = sdnv::decode(&body[bp..])?;
                bp += n;
                let (total, n) = sdnv::decode(&body[bp..])?;
                bp += n;
                (Some(offset), Some(total))
            } else {
                (None, None)
            };
        let _ = bp;

        Ok((
            Self {
                flags,
                destination,
                source,
                report_to,
                custodian,
                creation_timestamp,
                lifetime,
                fragment_offset,
                total_application_data_unit_length,
            },
            consumed_header,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PrimaryBlock {
        PrimaryBlock {
            flags: PrimaryFlags::DESTINATION_IS_SINGLETON
                | PrimaryFlags::CUSTODY_TRANSFER_REQUESTED,
            destination: Eid::new(2, 1),
            source: Eid::new(1, 0),
            report_to: Eid::new(1, 0),
            custodian: Eid::new(1, 0),
            creation_timestamp: CreationTimestamp::new(1000, 0),
            lifetime: 86400,
            fragment_offset: None,
            total_application_data_unit_length: None,
        }
    }

    #[test]
    fn round_trip_non_fragment() {
        let pb = sample();
        let bytes = pb.encode_to_vec().unwrap();
        assert_eq!(bytes[0], BUNDLE_PROTOCOL_VERSION);
        let (decoded, consumed) = PrimaryBlock::decode(&bytes).unwrap();
        assert_eq!(decoded, pb);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn round_trip_fragment() {
        let mut pb = sample();
        pb.flags |= PrimaryFlags::IS_FRAGMENT;
        pb.fragment_offset = Some(512);
        pb.total_application_data_unit_length = Some(4096);
        let bytes = pb.encode_to_vec().unwrap();
        let (decoded, _) = PrimaryBlock::decode(&bytes).unwrap();
        assert_eq!(decoded, pb);
    }

    #[test]
    fn rejects_wrong_version() {
        let pb = sample();
        let mut bytes = pb.encode_to_vec().unwrap();
        bytes[0] = 7;
        assert_eq!(
            PrimaryBlock::decode(&bytes),
            Err(PrimaryBlockError::UnsupportedVersion(7))
        );
    }

    #[test]
    fn rejects_nonzero_dictionary_length() {
        let pb = sample();
        let bytes = pb.encode_to_vec().unwrap();
        // Corrupt the dictionary-length SDNV (last byte before fragment
        // fields, here the body's trailing byte since no fragment fields
        // are present) to a nonzero single-byte SDNV value.
        let mut bytes = bytes;
        let last = bytes.len() - 1;
        bytes[last] = 1;
        assert_eq!(
            PrimaryBlock::decode(&bytes),
            Err(PrimaryBlockError::NonZeroDictionary(1))
        );
    }

    #[test]
    fn truncated_buffer_is_an_error() {
        let pb = sample();
        let bytes = pb.encode_to_vec().unwrap();
        assert!(PrimaryBlock::decode(&bytes[..bytes.len() - 3]).is_err());
    }
}
