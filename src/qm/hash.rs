/// 28-bit ELF hash used to bucket catalog records.
///
/// Never returns 0: lookup structures reserve it for empty slots.
#[must_use]
pub fn elf_hash(bytes: &[u8]) -> u32 {
    let mut h: u32 = 0;
    for &byte in bytes {
        h = (h << 4).wrapping_add(u32::from(byte));
        let g = h & 0xf000_0000;
        if g != 0 {
            h ^= g >> 24;
        }
        h &= !g;
    }
    if h == 0 { 1 } else { h }
}

/// Hash of a record key: source text followed by comment.
#[must_use]
pub fn record_hash(source_text: &[u8], comment: &[u8]) -> u32 {
    let mut key = Vec::with_capacity(source_text.len() + comment.len());
    key.extend_from_slice(source_text);
    key.extend_from_slice(comment);
    elf_hash(&key)
}
