//! A persistent Bloom filter over byte strings.
//!
//! # Bloom Filters
//!
//! A Bloom filter is a space-efficient probabilistic data structure that is
//! used to test whether an element is a member of a set. It allows for queries
//! to return: "possibly in set" or "definitely not in set". Elements can be
//! added to the set, but not removed; the more elements that are added to the
//! set, the larger the probability of false positives.
//!
//! A filter is sized from a capacity `n` and a false positive probability `p`:
//! it uses `m = |ceil(n ln(p) / ln(2)^2)|` bits and `k = ceil(ln(2) m / n)`
//! bit positions per value.
//!
//! # Fingerprints
//!
//! Each value is hashed once with 64-bit FNV-1 and the `k` positions are drawn
//! from an accumulator recurrence seeded by that hash (see [`hash`]).
//! A fingerprint can be computed once and checked with
//! [`BloomFilter::contains_fingerprint`].
//!
//! # Persistence
//!
//! Filters are stored in a compact little-endian format (see [`codec`])
//! followed by an arbitrary blob of attached data. Two filters of identical
//! dimensions can be merged with [`BloomFilter::join`].
//!
//! # Example
//!
//! ```
//! use bloomer::BloomFilter;
//!
//! let mut filter = BloomFilter::new(10000, 0.001);
//!
//! filter.insert("foo");
//! filter.insert("bar");
//!
//! assert!(filter.contains("foo"));
//! assert!(filter.contains("bar"));
//! assert!(!filter.contains("baz"));
//!
//! assert_eq!(filter.count(), 2);
//!
//! let bytes = filter.to_bytes();
//! let restored = BloomFilter::from_bytes(&bytes).unwrap();
//! assert_eq!(filter, restored);
//! ```
#![warn(missing_docs)]

pub mod bitvec;
pub mod bloom;
pub mod codec;
pub mod error;
pub mod hash;
pub mod io;

pub use bloom::{BloomFilter, DEFAULT_FALSE_POSITIVE_RATE};
pub use error::{Error, Result};
