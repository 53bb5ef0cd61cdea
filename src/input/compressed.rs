use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::input::InputError;

pub fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Reads a whole upload into memory, inflating `.gz` files on the way. At most
/// `max_bytes` of (decompressed) content is accepted.
pub fn read_upload(path: &Path, max_bytes: u64) -> Result<Vec<u8>, InputError> {
    let file = File::open(path)?;
    let on_disk = file.metadata()?.len();
    if !is_gzip(path) && on_disk > max_bytes {
        return Err(InputError::TooLarge {
            unit: "bytes",
            actual: on_disk,
            limit: max_bytes,
        });
    }

    let reader: Box<dyn Read> = if is_gzip(path) {
        Box::new(MultiGzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    read_limited(reader, max_bytes)
}

pub fn read_limited<R: Read>(reader: R, max_bytes: u64) -> Result<Vec<u8>, InputError> {
    let mut buf = Vec::new();
    reader.take(max_bytes.saturating_add(1)).read_to_end(&mut buf)?;
    if buf.len() as u64 > max_bytes {
        return Err(InputError::TooLarge {
            unit: "bytes",
            actual: buf.len() as u64,
            limit: max_bytes,
        });
    }
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/compressed.rs"]
mod tests;
