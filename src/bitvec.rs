// Copyright (c) 2026 The bloomer developers
//
// Licensed under the MIT license.

//! Bit vector functionality.
use std::fmt::Debug;

/// A bit vector packed into little-endian ordered 64-bit words.
///
/// Bit `i` lives in word `i / 64` at position `i % 64`. The number of words
/// is always `ceil(len / 64)`.
#[derive(Clone, PartialEq, Eq)]
pub struct BitVec {
    words: Vec<u64>,
    nbits: u64,
}

impl BitVec {
    /// Create a new, zeroed bit vector of the given length, in bits.
    pub fn new(nbits: u64) -> Self {
        Self {
            words: vec![0; word_count(nbits) as usize],
            nbits,
        }
    }

    /// Build a bit vector of `nbits` bits from its storage words.
    ///
    /// Returns `None` if the number of words doesn't match `ceil(nbits / 64)`.
    pub fn from_words(nbits: u64, words: Vec<u64>) -> Option<Self> {
        if words.len() as u64 != word_count(nbits) {
            return None;
        }
        Some(Self { words, nbits })
    }

    /// Get the length in bits of the vector.
    pub fn len(&self) -> u64 {
        self.nbits
    }

    /// Check whether this vector is empty, ie. has a length of zero.
    pub fn is_empty(&self) -> bool {
        self.nbits == 0
    }

    /// Number of 64-bit storage words.
    pub fn word_len(&self) -> usize {
        self.words.len()
    }

    /// Set all bits to zero.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Set a single bit to `1`. Returns `true` if the bit was previously `0`.
    pub fn set(&mut self, index: u64) -> bool {
        self.check_bounds(index);

        let word = &mut self.words[(index / 64) as usize];
        let mask = 1u64 << (index % 64);
        let fresh = *word & mask == 0;

        *word |= mask;
        fresh
    }

    /// Check whether a bit is set.
    pub fn is_set(&self, index: u64) -> bool {
        self.check_bounds(index);

        let mask = 1u64 << (index % 64);
        self.words[(index / 64) as usize] & mask == mask
    }

    /// Count the number of `1` bits.
    pub fn count_ones(&self) -> u64 {
        self.words.iter().map(|w| w.count_ones() as u64).sum()
    }

    /// Count the number of `0` bits.
    pub fn count_zeros(&self) -> u64 {
        self.len() - self.count_ones()
    }

    /// Bitwise `OR` the other vector into this one.
    pub fn union_with(&mut self, other: &Self) {
        if self.nbits != other.nbits {
            panic!(
                "unable to union bitvecs with different lengths: {} and {}",
                self.nbits, other.nbits
            );
        }
        for (word, other) in self.words.iter_mut().zip(other.words.iter()) {
            *word |= *other;
        }
    }

    /// Return the underlying word storage.
    pub fn as_words(&self) -> &[u64] {
        &self.words
    }

    fn check_bounds(&self, index: u64) {
        if index >= self.nbits {
            panic!(
                "index out of bounds: the len is {} but the index is {}",
                self.nbits, index,
            )
        }
    }
}

/// Number of 64-bit words needed to hold `nbits` bits.
pub fn word_count(nbits: u64) -> u64 {
    nbits.div_ceil(64)
}

impl Debug for BitVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BitVec {{ len: {}, ones: {} }}",
            self.nbits,
            self.count_ones()
        )
    }
}
