//! Context hash table written in stripped mode.
//!
//! Layout (big-endian):
//!
//! ```text
//! u16 bucket_count
//! u16 buckets[bucket_count]   // pool offset / 2, 0 = empty bucket
//! u8  pool[..]                // u16 0, then per bucket: (u8 len, bytes)* u8 0 [pad]
//! ```
//!
//! A bucket's chain starts at `2 * buckets[h]` in the pool and ends at a zero
//! length byte. The empty context cannot be stored that way and is always
//! considered present.

use std::collections::BTreeSet;

use super::error::QmError;
use super::format::BlockTag;
use super::hash::elf_hash;
use crate::diagnostics::Diagnostics;

/// Largest pool the table may reference.
pub const MAX_POOL_SIZE: usize = 128 * 1024;

/// Longest context stored; longer ones are cut.
const MAX_CONTEXT_LEN: usize = 255;

/// Bucket count for `context_count` distinct contexts.
#[must_use]
pub const fn table_size(context_count: usize) -> usize {
    match context_count {
        0..60 => 151,
        60..200 => 503,
        200..750 => 1511,
        750..2500 => 5003,
        2500..10000 => 15013,
        _ => context_count * 3 / 2,
    }
}

/// Part of `context` that is hashed and stored.
fn stored_key(context: &[u8]) -> &[u8] {
    context.get(..MAX_CONTEXT_LEN).unwrap_or(context)
}

/// Bucket `context` starts probing from.
fn bucket_of(context: &[u8], bucket_count: usize) -> usize {
    usize::try_from(elf_hash(context)).unwrap_or_default() % bucket_count
}

/// Serializes the table for a set of distinct contexts.
///
/// Returns an empty block, with a diagnostic, when the pool would grow past
/// [`MAX_POOL_SIZE`] or the table would not fit 16-bit offsets.
#[must_use]
pub fn build(contexts: &BTreeSet<Vec<u8>>, diagnostics: &mut Diagnostics) -> Vec<u8> {
    let bucket_count = table_size(contexts.len());
    let Ok(bucket_count_u16) = u16::try_from(bucket_count) else {
        diagnostics.append_error(format!(
            "Too many contexts ({}): the context table was dropped.",
            contexts.len()
        ));
        return Vec::new();
    };

    let mut chains: Vec<(usize, &[u8])> = contexts
        .iter()
        .filter(|context| !context.is_empty())
        .map(|context| (bucket_of(stored_key(context), bucket_count), stored_key(context)))
        .collect();
    chains.sort_unstable();

    let mut buckets = vec![0_u16; bucket_count];
    // offset 0 is reserved for "no entry"
    let mut pool: Vec<u8> = vec![0, 0];
    let mut chains = chains.iter().peekable();
    while let Some(&&(bucket, _)) = chains.peek() {
        let Ok(offset) = u16::try_from(pool.len() >> 1) else {
            break;
        };
        if let Some(slot) = buckets.get_mut(bucket) {
            *slot = offset;
        }
        while let Some((_, context)) = chains.next_if(|(b, _)| *b == bucket) {
            pool.push(u8::try_from(context.len()).unwrap_or(u8::MAX));
            pool.extend_from_slice(context);
        }
        pool.push(0);
        if pool.len() % 2 == 1 {
            pool.push(0);
        }
    }

    if pool.len() > MAX_POOL_SIZE || chains.peek().is_some() {
        tracing::warn!(pool = pool.len(), contexts = contexts.len(), "Dropping context table");
        diagnostics.append_error(format!(
            "Too many contexts ({}): the context pool needs {} bytes, more than {MAX_POOL_SIZE}. \
             The context table was dropped.",
            contexts.len(),
            pool.len()
        ));
        return Vec::new();
    }

    let mut block = Vec::with_capacity(2 + 2 * bucket_count + pool.len());
    block.extend_from_slice(&bucket_count_u16.to_be_bytes());
    for offset in buckets {
        block.extend_from_slice(&offset.to_be_bytes());
    }
    block.extend_from_slice(&pool);
    block
}

/// A decoded context table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextTable {
    /// Pool offset per bucket, halved; 0 for an empty bucket.
    buckets: Vec<u16>,
    /// Length-prefixed contexts, one zero-terminated chain per bucket.
    pool: Vec<u8>,
}

impl ContextTable {
    /// Decodes a Contexts block.
    ///
    /// # Errors
    /// Fails when the block is shorter than its bucket array.
    pub fn parse(block: &[u8]) -> Result<Self, QmError> {
        let truncated = |declared: usize| QmError::TruncatedBlock {
            tag: BlockTag::Contexts as u8,
            declared,
            remaining: block.len(),
        };
        let [high, low, rest @ ..] = block else {
            return Err(truncated(2));
        };
        let bucket_count = usize::from(u16::from_be_bytes([*high, *low]));
        let table_len = 2 * bucket_count;
        let (table, pool) =
            rest.split_at_checked(table_len).ok_or_else(|| truncated(2 + table_len))?;
        let buckets = table
            .chunks_exact(2)
            .filter_map(|pair| <[u8; 2]>::try_from(pair).ok())
            .map(u16::from_be_bytes)
            .collect();
        Ok(Self { buckets, pool: pool.to_vec() })
    }

    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Whether `context` is covered by the catalog.
    #[must_use]
    pub fn contains(&self, context: &[u8]) -> bool {
        let key = stored_key(context);
        if key.is_empty() {
            return true;
        }
        if self.buckets.is_empty() {
            return false;
        }
        let Some(&offset) = self.buckets.get(bucket_of(key, self.buckets.len())) else {
            return false;
        };
        if offset == 0 {
            return false;
        }

        let mut position = usize::from(offset) * 2;
        loop {
            let Some(&len) = self.pool.get(position) else {
                return false;
            };
            if len == 0 {
                return false;
            }
            let start = position + 1;
            let end = start + usize::from(len);
            let Some(stored) = self.pool.get(start..end) else {
                return false;
            };
            if stored == key {
                return true;
            }
            position = end;
        }
    }
}
