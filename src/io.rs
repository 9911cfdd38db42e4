//! I/O operations with buffers.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

// Suggested capacity of internal buffers for readers and writers.
const BUFFER_SIZE: usize = 65_536;

/// Reads the entire contents of the file at `path`.
pub fn read_file<P>(path: P) -> Result<Vec<u8>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let to_error = |e| Error::io(&path.display().to_string(), e);
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, File::open(path).map_err(to_error)?);
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(to_error)?;
    Ok(bytes)
}

/// Writes `bytes` to the file at `path`, replacing its contents, and returns the
/// number of bytes written.
pub fn write_file<P>(path: P, bytes: &[u8]) -> Result<usize>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let to_error = |e| Error::io(&path.display().to_string(), e);
    let mut writer = BufWriter::with_capacity(BUFFER_SIZE, File::create(path).map_err(to_error)?);
    writer.write_all(bytes).map_err(to_error)?;
    writer.flush().map_err(to_error)?;
    Ok(bytes.len())
}
