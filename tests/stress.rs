//! Randomized stress test: interleave alloc/realloc/free driven by an
//! RNG, track a checksum per live block, and verify no live block ever
//! gets corrupted by another block's operations.

mod common;

use pagealloc::Allocator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const NBLOCKS: usize = 8;
const NBYTES: usize = 128;
const NBYTES_REALLOC: usize = 138;

struct TrackedBlock {
    addr: *mut u8,
    size: usize,
    valid: bool,
    checksum: u32,
}

fn checksum_of(ptr: *mut u8, len: usize) -> u32 {
    unsafe { crc32fast::hash(std::slice::from_raw_parts(ptr, len)) }
}

fn fill_random(ptr: *mut u8, len: usize, rng: &mut StdRng) {
    for i in 0..len {
        unsafe { *ptr.add(i) = rng.gen() };
    }
}

#[test]
fn rand_test_interleaved_alloc_realloc_free() {
    common::init_logger();
    let mut a = Allocator::new();
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let mut blocks: Vec<TrackedBlock> = (0..NBLOCKS)
        .map(|_| TrackedBlock { addr: std::ptr::null_mut(), size: 0, valid: false, checksum: 0 })
        .collect();

    // Allocate every block, fill with random bytes, checksum it.
    for b in blocks.iter_mut() {
        let p = a.alloc(NBYTES);
        if !p.is_null() {
            fill_random(p, NBYTES, &mut rng);
            b.addr = p;
            b.size = NBYTES;
            b.valid = true;
            b.checksum = checksum_of(p, NBYTES);
        }
    }
    assert!(blocks.iter().any(|b| b.valid), "at least one block must have allocated");

    // Free a random subset (at least one, at most all valid blocks).
    let mut valid_indices: Vec<usize> = (0..NBLOCKS).filter(|&i| blocks[i].valid).collect();
    let to_free = rng.gen_range(1..=valid_indices.len());
    for _ in 0..to_free {
        let pick = rng.gen_range(0..valid_indices.len());
        let idx = valid_indices.remove(pick);
        a.free(blocks[idx].addr);
        blocks[idx].valid = false;
    }

    // Reallocate the survivors, verifying the old checksum still matches
    // before growing, then recompute it over the new payload.
    for idx in 0..NBLOCKS {
        if !blocks[idx].valid {
            continue;
        }
        let before = checksum_of(blocks[idx].addr, blocks[idx].size);
        assert_eq!(before, blocks[idx].checksum, "block {} was corrupted before realloc", idx);

        let new_addr = a.realloc(blocks[idx].addr, NBYTES_REALLOC);
        if new_addr.is_null() {
            continue;
        }
        let after = checksum_of(new_addr, blocks[idx].size);
        assert_eq!(after, blocks[idx].checksum, "realloc must preserve the old payload prefix");

        blocks[idx].addr = new_addr;
        blocks[idx].size = NBYTES_REALLOC;
        blocks[idx].checksum = checksum_of(new_addr, blocks[idx].size);
    }

    for b in blocks.iter() {
        if b.valid {
            a.free(b.addr);
        }
    }
}
