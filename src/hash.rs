// Copyright (c) 2026 The bloomer developers
//
// Licensed under the MIT license.

//! Value hashing and fingerprint derivation.
//!
//! A value is hashed once with 64-bit FNV-1. The `k` bit positions are then
//! drawn from a recurrence seeded by that single hash:
//!
//! a<sub>0</sub> = b<sub>0</sub> = h,
//! a<sub>i+1</sub> = a<sub>i</sub> + i·b<sub>i</sub>,
//! b<sub>i+1</sub> = a<sub>i+1</sub>,
//! position<sub>i</sub> = a<sub>i+1</sub> mod m
//!
//! with all arithmetic wrapping at 2<sup>64</sup>. Files written by other
//! tools using the same scheme remain readable and checkable.
use std::hash::Hasher;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1 hasher (multiply, then xor).
#[derive(Clone, Copy, Debug)]
pub struct Fnv64(u64);

impl Default for Fnv64 {
    fn default() -> Self {
        Self(FNV_OFFSET_BASIS)
    }
}

impl Hasher for Fnv64 {
    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 = self.0.wrapping_mul(FNV_PRIME);
            self.0 ^= u64::from(*byte);
        }
    }

    fn finish(&self) -> u64 {
        self.0
    }
}

/// Hash a byte string with [`Fnv64`].
pub fn fnv64(value: &[u8]) -> u64 {
    let mut hasher = Fnv64::default();
    hasher.write(value);
    hasher.finish()
}

/// Iterator over the bit positions of a value, see the module documentation.
#[derive(Clone, Debug)]
pub struct Positions {
    a: u64,
    b: u64,
    round: u64,
    rounds: u64,
    nbits: u64,
}

impl Iterator for Positions {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.round >= self.rounds || self.nbits == 0 {
            return None;
        }
        self.a = self.a.wrapping_add(self.round.wrapping_mul(self.b));
        self.b = self.a;
        self.round += 1;

        Some(self.a % self.nbits)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.nbits == 0 {
            0
        } else {
            usize::try_from(self.rounds - self.round).unwrap_or(usize::MAX)
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Positions {}

/// Return the `k` bit positions of `value` in a filter of `m` bits.
///
/// Yields nothing when `m` is zero, since no position exists.
pub fn positions(value: &[u8], k: u64, m: u64) -> Positions {
    let h = fnv64(value);

    Positions {
        a: h,
        b: h,
        round: 0,
        rounds: k,
        nbits: m,
    }
}

/// Like [`positions`], but collects into `out`, replacing its contents.
pub fn fingerprint_into(value: &[u8], k: u64, m: u64, out: &mut Vec<u64>) {
    out.clear();
    out.extend(positions(value, k, m));
}
