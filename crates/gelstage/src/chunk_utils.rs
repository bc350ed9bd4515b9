use alloc::vec::Vec;

/// Split `payload` into approximately equal-sized chunks.
///
/// # Panics
///
/// Panics if `parts` is zero.
#[must_use]
pub fn produce_chunks(payload: &[u8], parts: usize) -> Vec<&[u8]> {
    assert!(parts > 0);
    if payload.is_empty() {
        return Vec::new();
    }
    payload.chunks(payload.len().div_ceil(parts)).collect()
}

/// Split `payload` at the cut points derived from `splits`.
///
/// Each split value picks the size of the next chunk modulo what is left, so
/// any sequence of numbers yields a valid partition. Whatever remains once
/// `splits` runs out becomes the last chunk.
#[must_use]
pub fn split_at_seeds<'a>(payload: &'a [u8], splits: &[usize]) -> Vec<&'a [u8]> {
    let mut chunks = Vec::with_capacity(splits.len() + 1);
    let mut rest = payload;
    for &s in splits {
        if rest.is_empty() {
            break;
        }
        let (chunk, tail) = rest.split_at(1 + s % rest.len());
        chunks.push(chunk);
        rest = tail;
    }
    if !rest.is_empty() {
        chunks.push(rest);
    }
    chunks
}
