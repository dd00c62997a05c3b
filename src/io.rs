// Copyright (c) 2026 The bloomer developers
//
// Licensed under the MIT license.

//! Loading and storing filters on disk.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;

use crate::bloom::BloomFilter;
use crate::error::Result;

/// Read a filter from the file at `path`.
pub fn load_filter(path: impl AsRef<Path>) -> Result<BloomFilter> {
    let path = path.as_ref();
    debug!("loading filter from {}", path.display());

    let file = File::open(path)?;
    BloomFilter::read_from(BufReader::new(file))
}

/// Write a filter to the file at `path`, replacing its contents.
///
/// The file is truncated before writing, so a failure may leave it holding a
/// partial filter. Write to a temporary path and rename it when that matters.
pub fn write_filter(filter: &BloomFilter, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    debug!("writing filter to {}", path.display());

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    filter.write_to(&mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;

    Ok(())
}
