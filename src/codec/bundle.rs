// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! A complete bundle: one primary block followed by an ordered sequence of
//! canonical blocks, exactly one of which carries the is-last-block flag,
//! and it must be the final block in the sequence.

use crate::codec::canonical::{CanonicalBlock, CanonicalContent};
use crate::codec::flags::{CanonicalFlags, PrimaryFlags};
use crate::codec::primary::PrimaryBlock;
use crate::error::BundleError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub primary: PrimaryBlock,
    pub canonical_blocks: Vec<CanonicalBlock>,
}

impl Bundle {
    /// Constructs a bundle, setting the is-last-block flag on the final
    /// block in `canonical_blocks` and clearing it everywhere else.
    pub fn new(primary: PrimaryBlock, mut canonical_blocks: Vec<CanonicalBlock>) -> Self {
        let last = canonical_blocks.len().saturating_sub(1);
        for (i, block) in canonical_blocks.iter_mut().enumerate() {
            if i == last {
                block.flags.insert(CanonicalFlags::IS_LAST_BLOCK);
            } else {
                block.flags.remove(CanonicalFlags::IS_LAST_BLOCK);
            }
        }
        Self {
            primary,
            canonical_blocks,
        }
    }

    /// Builds a bundle from typed block content instead of raw
    /// [`CanonicalBlock`]s, encoding each via the canonical-block dispatch
    /// table (`CanonicalContent::encode`) before setting the is-last-block
    /// flag the same way [`Bundle::new`] does.
    pub fn from_typed_blocks(primary: PrimaryBlock, contents: Vec<CanonicalContent>) -> Self {
        let blocks = contents
            .into_iter()
            .map(|content| content.encode(CanonicalFlags::empty()))
            .collect();
        Self::new(primary, blocks)
    }

    /// Resolves every canonical block in this bundle to its typed content,
    /// per the canonical-block dispatch table keyed on block-type code and
    /// this bundle's admin-record flag.
    pub fn decode_typed_blocks(&self) -> Result<Vec<CanonicalContent>, BundleError> {
        let is_admin_record = self.primary.flags.contains(PrimaryFlags::IS_ADMIN_RECORD);
        self.canonical_blocks
            .iter()
            .map(|block| CanonicalContent::decode(block, is_admin_record).map_err(BundleError::from))
            .collect()
    }

    pub fn encode(&self) -> Result<Vec<u8>, BundleError> {
        self.validate()?;
        let mut out = Vec::new();
        self.primary.encode(&mut out)?;
        for block in &self.canonical_blocks {
            block.encode(&mut out);
        }
        Ok(out)
    }

    pub fn decode(buf: &[u8]) -> Result<Self, BundleError> {
        let (primary, mut pos) = PrimaryBlock::decode(buf)?;
        let mut canonical_blocks = Vec::new();
        loop {
            let (block, consumed) = CanonicalBlock::decode(&buf[pos..])?;
            pos += consumed;
            let is_last = block.flags.contains(CanonicalFlags::IS_LAST_BLOCK);
            canonical_blocks.push(block);
            if is_last || pos >= buf.len() {
                break;
            }
        }
        let bundle = Self {
            primary,
            canonical_blocks,
        };
        bundle.validate()?;
        Ok(bundle)
    }

    fn validate(&self) -> Result<(), BundleError> {
        let last_flags: Vec<usize> = self
            .canonical_blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.flags.contains(CanonicalFlags::IS_LAST_BLOCK))
            .map(|(i, _)| i)
            .collect();
        match last_flags.as_slice() {
            [] => Err(BundleError::MissingLastBlock),
            [only] if *only == self.canonical_blocks.len() - 1 => Ok(()),
            [_only] => Err(BundleError::DuplicateLastBlock),
            _ => Err(BundleError::DuplicateLastBlock),
        }
    }
}
