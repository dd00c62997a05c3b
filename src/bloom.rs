// Copyright (c) 2026 The bloomer developers
//
// Licensed under the MIT license.

//! A Bloom filter over byte strings with a heuristic element counter.

use std::f64;

use log::{debug, warn};

use crate::bitvec::{self, BitVec};
use crate::error::{Error, Result};
use crate::hash;

/// The default false positive probability value, 1%.
pub const DEFAULT_FALSE_POSITIVE_RATE: f64 = 0.01;

/// `ln` squared.
const LN_SQR: f64 = f64::consts::LN_2 * f64::consts::LN_2;

/// A Bloom filter over byte strings.
///
/// Besides the bit array, a filter carries the parameters it was built with,
/// an approximate count of the distinct values inserted, and an opaque blob of
/// attached data that is persisted along with it.
///
/// Cloning a filter deep-copies its bits and attached data.
#[derive(Clone, Debug, PartialEq)]
pub struct BloomFilter {
    pub(crate) capacity: u64,
    pub(crate) fp_rate: f64,
    pub(crate) nhashes: u64,
    pub(crate) bits: BitVec,
    pub(crate) count: u64,
    pub(crate) data: Vec<u8>,
}

impl BloomFilter {
    /// Return a new, empty Bloom filter sized for `capacity` elements at the
    /// given false positive rate.
    ///
    /// The inputs aren't validated: a zero capacity or a rate outside `(0, 1)`
    /// produce a degenerate filter, and a rate of zero asks for an unbounded
    /// number of bits.
    pub fn new(capacity: u64, fp_rate: f64) -> BloomFilter {
        let nbits = optimal_bits(capacity, fp_rate);
        let nhashes = optimal_hashes(nbits, capacity);

        debug!(
            "new filter: capacity={} fp_rate={} bits={} hashes={}",
            capacity, fp_rate, nbits, nhashes
        );

        BloomFilter {
            capacity,
            fp_rate,
            nhashes,
            bits: BitVec::new(nbits),
            count: 0,
            data: Vec::new(),
        }
    }

    /// Return a new Bloom filter with a given approximate item capacity.
    /// The false positive probability is [`DEFAULT_FALSE_POSITIVE_RATE`].
    pub fn with_capacity(capacity: u64) -> BloomFilter {
        BloomFilter::new(capacity, DEFAULT_FALSE_POSITIVE_RATE)
    }

    /// Insert a value. Returns `true` if at least one of its bits was newly
    /// set, in which case the element count was incremented.
    pub fn insert(&mut self, value: impl AsRef<[u8]>) -> bool {
        let mut fresh = false;

        for index in hash::positions(value.as_ref(), self.nhashes, self.bits()) {
            fresh |= self.bits.set(index);
        }
        if fresh {
            self.count = self.count.saturating_add(1);
        }
        fresh
    }

    /// Return whether a value is possibly in the filter. A value that was
    /// inserted is always reported, other values are reported with a
    /// probability close to [`current_false_positive_rate`](Self::current_false_positive_rate).
    pub fn contains(&self, value: impl AsRef<[u8]>) -> bool {
        hash::positions(value.as_ref(), self.nhashes, self.bits()).all(|i| self.bits.is_set(i))
    }

    /// Return the bit positions a value maps to.
    pub fn fingerprint(&self, value: impl AsRef<[u8]>) -> Vec<u64> {
        let mut fingerprint = Vec::new();
        self.fingerprint_into(value, &mut fingerprint);
        fingerprint
    }

    /// Like [`fingerprint`](Self::fingerprint), reusing the given buffer.
    pub fn fingerprint_into(&self, value: impl AsRef<[u8]>, fingerprint: &mut Vec<u64>) {
        hash::fingerprint_into(value.as_ref(), self.nhashes, self.bits(), fingerprint);
    }

    /// Return whether every position of a fingerprint is set.
    ///
    /// # Panics
    ///
    /// Panics if a position is not smaller than [`bits`](Self::bits), which
    /// cannot happen for fingerprints computed by a filter of the same size.
    pub fn contains_fingerprint(&self, fingerprint: &[u64]) -> bool {
        fingerprint.iter().all(|&i| self.bits.is_set(i))
    }

    /// Set all bits to zero and reset the element count.
    pub fn clear(&mut self) {
        self.bits.clear();
        self.count = 0;
    }

    /// Check whether two filters have identical dimensions and can be joined.
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.check_compatible(other).is_ok()
    }

    /// Merge another filter into this one.
    ///
    /// The filters must have identical capacity, false positive rate, number
    /// of hashes and number of bits, otherwise [`Error::DimensionMismatch`] is
    /// returned and this filter is left as it was.
    ///
    /// The element counts are added, which is only exact if the two filters
    /// hold disjoint sets. If the sum overflows, [`Error::CountOverflow`] is
    /// returned *after* the bits have been merged: membership then reflects
    /// both filters while the element count is left unchanged.
    pub fn join(&mut self, other: &Self) -> Result<()> {
        if let Err(err) = self.check_compatible(other) {
            warn!("rejecting join: {}", err);
            return Err(err);
        }
        self.bits.union_with(&other.bits);

        self.count = self
            .count
            .checked_add(other.count)
            .ok_or(Error::CountOverflow {
                ours: self.count,
                theirs: other.count,
            })?;

        Ok(())
    }

    /// Return the item capacity this filter was sized for (`n`).
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Return the target false positive probability (`p`).
    pub fn false_positive_rate(&self) -> f64 {
        self.fp_rate
    }

    /// Number of hashes used (`k` parameter).
    pub fn hashes(&self) -> u64 {
        self.nhashes
    }

    /// Return the number of bits in this filter (`m`).
    pub fn bits(&self) -> u64 {
        self.bits.len()
    }

    /// Return the number of 64-bit words backing the filter.
    pub fn words(&self) -> u64 {
        self.bits.word_len() as u64
    }

    /// Approximate number of distinct values inserted.
    ///
    /// The count only grows when an insertion sets at least one new bit, so
    /// values colliding with earlier ones are not counted. After a join it is
    /// the sum of both counts, an upper bound when the sets overlap.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Expected false positive probability given the current element count,
    /// `(1 - e^(-kN/m))^k`.
    pub fn current_false_positive_rate(&self) -> f64 {
        if self.count == 0 || self.bits() == 0 {
            return 0.0;
        }
        let k = self.nhashes as f64;
        let n = self.count as f64;
        let m = self.bits() as f64;

        (1. - (-k * n / m).exp()).powf(k)
    }

    /// Return the attached data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Replace the attached data.
    pub fn set_data(&mut self, data: impl Into<Vec<u8>>) {
        self.data = data.into();
    }

    /// Return the underlying bit storage, one `u64` per 64 bits.
    pub fn as_words(&self) -> &[u64] {
        self.bits.as_words()
    }

    fn check_compatible(&self, other: &Self) -> Result<()> {
        if self.capacity != other.capacity {
            return Err(Error::mismatch("capacity", self.capacity, other.capacity));
        }
        if self.fp_rate.to_bits() != other.fp_rate.to_bits() {
            return Err(Error::mismatch(
                "false positive rate",
                self.fp_rate,
                other.fp_rate,
            ));
        }
        if self.nhashes != other.nhashes {
            return Err(Error::mismatch("hashes", self.nhashes, other.nhashes));
        }
        if self.bits() != other.bits() {
            return Err(Error::mismatch("bits", self.bits(), other.bits()));
        }
        if self.words() != other.words() {
            return Err(Error::mismatch("words", self.words(), other.words()));
        }
        Ok(())
    }
}

/// Return the bit vector size for a Bloom filter given an approximate
/// size and a desired false positive rate: `|ceil(n ln(p) / ln(2)^2)|`.
pub fn optimal_bits(capacity: u64, fp_rate: f64) -> u64 {
    ((capacity as f64) * fp_rate.ln() / LN_SQR).ceil().abs() as u64
}

/// Return the optimal number of hash functions for a Bloom filter given a
/// bit vector size and an approximate set size.
///
/// Also called `k`.
pub fn optimal_hashes(nbits: u64, capacity: u64) -> u64 {
    (f64::consts::LN_2 * nbits as f64 / capacity as f64).ceil() as u64
}

/// Return the number of 64-bit words needed for `nbits` bits.
pub fn optimal_words(nbits: u64) -> u64 {
    bitvec::word_count(nbits)
}
