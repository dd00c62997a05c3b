// Copyright (c) 2026 The bloomer developers
//
// Licensed under the MIT license.

//! Binary representation of a filter.
//!
//! All integers are little-endian.
//!
//! ```text
//! offset  size  field
//!      0     8  version word, low byte = 1
//!      8     8  capacity (n)
//!     16     8  false positive rate (p), IEEE-754 bits
//!     24     8  hashes (k)
//!     32     8  bits (m)
//!     40     8  element count (N)
//!     48  8*M   bit array, M = ceil(m / 64)
//!   48+8M  ...  attached data, up to end of input
//! ```
//!
//! The word count `M` is never stored, it's recomputed from `m`.

use std::io::{self, Read, Write};

use log::debug;

use crate::bitvec::{self, BitVec};
use crate::bloom::BloomFilter;
use crate::error::{Error, Result};

/// The only format version understood.
pub const FORMAT_VERSION: u8 = 1;

/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 48;

/// Upper bound on words preallocated before any of them has been read.
const MAX_PREALLOC_WORDS: u64 = 1 << 20;

impl BloomFilter {
    /// Serialize the filter into a writer.
    ///
    /// Output isn't rolled back on failure: the writer may hold a partial
    /// filter afterwards.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        let mut header = [0u8; HEADER_LEN];
        header[0] = FORMAT_VERSION;
        header[8..16].copy_from_slice(&self.capacity.to_le_bytes());
        header[16..24].copy_from_slice(&self.fp_rate.to_bits().to_le_bytes());
        header[24..32].copy_from_slice(&self.nhashes.to_le_bytes());
        header[32..40].copy_from_slice(&self.bits().to_le_bytes());
        header[40..48].copy_from_slice(&self.count.to_le_bytes());
        writer.write_all(&header)?;

        for word in self.bits.as_words() {
            writer.write_all(&word.to_le_bytes())?;
        }
        writer.write_all(&self.data)?;
        writer.flush()?;

        debug!(
            "wrote filter: bits={} count={} data={}B",
            self.bits(),
            self.count,
            self.data.len()
        );
        Ok(())
    }

    /// Deserialize a filter from a reader, consuming it to the end.
    ///
    /// A short header, a short bit array, an unknown version or more hashes
    /// than bits yield [`Error::Format`]; other read failures yield
    /// [`Error::Io`].
    pub fn read_from<R: Read>(mut reader: R) -> Result<BloomFilter> {
        let mut header = [0u8; HEADER_LEN];
        read_exact(&mut reader, &mut header, "header")?;

        let version = header[0];
        if version != FORMAT_VERSION {
            return Err(Error::Format(format!(
                "unsupported version: expected {}, got {}",
                FORMAT_VERSION, version
            )));
        }
        let capacity = le_u64(&header[8..16]);
        let fp_rate = f64::from_bits(le_u64(&header[16..24]));
        let nhashes = le_u64(&header[24..32]);
        let nbits = le_u64(&header[32..40]);
        let count = le_u64(&header[40..48]);
        // A filter built from any capacity has at most one hash per bit.
        if nhashes > nbits {
            return Err(Error::Format(if nbits == 0 {
                format!("{} hashes without bits", nhashes)
            } else {
                format!("more hashes than bits: {} > {}", nhashes, nbits)
            }));
        }

        let nwords = bitvec::word_count(nbits);
        let mut words = Vec::with_capacity(nwords.min(MAX_PREALLOC_WORDS) as usize);
        let mut buf = [0u8; 8];
        for _ in 0..nwords {
            read_exact(&mut reader, &mut buf, "bit array")?;
            words.push(u64::from_le_bytes(buf));
        }
        let bits = BitVec::from_words(nbits, words)
            .ok_or_else(|| Error::Format("bit array length mismatch".to_owned()))?;

        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;

        debug!(
            "read filter: capacity={} fp_rate={} hashes={} bits={} count={} data={}B",
            capacity,
            fp_rate,
            nhashes,
            nbits,
            count,
            data.len()
        );

        Ok(BloomFilter {
            capacity,
            fp_rate,
            nhashes,
            bits,
            count,
            data,
        })
    }

    /// Serialize the filter into a new byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let len = HEADER_LEN + self.bits.word_len() * 8 + self.data.len();
        let mut bytes = Vec::with_capacity(len);
        // Writing into a vector cannot fail.
        self.write_to(&mut bytes).ok();
        bytes
    }

    /// Deserialize a filter from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<BloomFilter> {
        BloomFilter::read_from(bytes)
    }
}

impl TryFrom<&[u8]> for BloomFilter {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        BloomFilter::from_bytes(bytes)
    }
}

impl From<&BloomFilter> for Vec<u8> {
    fn from(filter: &BloomFilter) -> Vec<u8> {
        filter.to_bytes()
    }
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], field: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|err| match err.kind() {
        io::ErrorKind::UnexpectedEof => Error::truncated(field),
        _ => Error::Io(err),
    })
}

fn le_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}
