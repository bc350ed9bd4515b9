#![no_main]
use std::cell::RefCell;
use std::io::Read;

use arbitrary::Unstructured;
use gelstage::{LiterateOptions, LiterateReader, Scanner};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

const HEADER: usize = 5; // 1 scratch capacity + 4-byte seed

thread_local! {
    static RNG: RefCell<SmallRng> =
        RefCell::new(SmallRng::from_os_rng());
}

/// Fragments the scanner and the literate filter treat specially.
static TOKENS: &[&[u8]] = &[
    b"{",
    b"}",
    b"[",
    b"]",
    b"\"",
    b"#",
    b"\\",
    b"\\*",
    b";",
    b" ",
    b"\t",
    b"\n",
    b"\r\n",
    b">",
    b"\n>",
    b"puts",
    b"set x",
    b"\xff",
];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if max_size <= HEADER {
        return fuzzer_mutate(data, size, max_size);
    }
    if size < HEADER || seed.is_multiple_of(10) {
        data[0] = with_rng(|rng| rng.random());
        data[1..HEADER].copy_from_slice(&with_rng(|rng| rng.next_u32().to_le_bytes()));

        let target = size.clamp(HEADER + 1, max_size);
        let mut len = HEADER;
        while len < target {
            len += append_token(&mut data[len..target], target - len);
        }
        len
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

/// Appends one token, cut short if it would pass `limit`. Never writes zero
/// bytes while `limit > 0`.
fn append_token(buf: &mut [u8], limit: usize) -> usize {
    let entropy: [u8; 4] = with_rng(|rng| rng.random());
    let token = Unstructured::new(&entropy)
        .choose(TOKENS)
        .copied()
        .unwrap_or(&b"a"[..]);
    let len = token.len().min(limit);
    buf[..len].copy_from_slice(&token[..len]);
    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

fn staged(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }

    let capacity = usize::from(data[0]);
    let split_seed = u32::from_le_bytes(data[1..HEADER].try_into().unwrap()) as usize;
    let body = &data[HEADER..];

    // Scanner: chunking must not change anything observable.
    let mut whole = Scanner::new();
    whole.feed(body);
    let mut chunked = Scanner::new();
    for chunk in split_into_chunks(body, split_seed) {
        chunked.feed(chunk);
    }
    assert_eq!(chunked.completed(), whole.completed());
    assert_eq!(chunked.pending(), whole.pending());
    assert_eq!(chunked.state(), whole.state());
    assert_eq!(chunked.depth(), whole.depth());
    assert_eq!(chunked.is_complete(), whole.is_complete());
    assert_eq!(chunked.finish(), whole.finish());

    // Literate filter: pull sizes and scratch capacity must not matter.
    let mut expected = Vec::new();
    LiterateReader::new(body).read_to_end(&mut expected).unwrap();

    let mut reader = LiterateReader::with_options(
        body,
        LiterateOptions {
            scratch_capacity: capacity,
            ..Default::default()
        },
    );
    let mut pulled = Vec::new();
    let mut seed = split_seed;
    loop {
        let max_len = seed % 64 + 1;
        let pull = reader.pull(max_len);
        assert!(pull.bytes.len() <= max_len);
        pulled.extend_from_slice(&pull.bytes);
        if !pull.more {
            break;
        }
        seed = seed.rotate_right(5) ^ pull.bytes.len();
    }
    assert_eq!(pulled, expected);
}

fuzz_target!(|data: &[u8]| staged(data));

/// Splits `data` into chunks of at least one byte whose sizes are derived
/// from `split_seed`.
fn split_into_chunks(data: &[u8], split_seed: usize) -> Vec<&[u8]> {
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < data.len() {
        let remaining = data.len() - start;
        let size = split_seed % remaining + 1;
        chunks.push(&data[start..start + size]);
        start += size;
    }

    chunks
}
