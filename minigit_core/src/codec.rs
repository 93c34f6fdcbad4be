//! zlib compression of framed objects.

use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use std::io::{self, Write};

/// Compress framed object bytes into a zlib stream.
pub fn encode(framed: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(framed)?;
    encoder.finish()
}

/// Decompress a zlib stream back into framed object bytes.
///
/// Corrupted or truncated input surfaces as an `io::Error`; callers attach
/// the object path.
pub fn decode(compressed: &[u8]) -> io::Result<Vec<u8>> {
    let mut inflater = Decompress::new(true);
    let mut framed = Vec::with_capacity(compressed.len().saturating_mul(2).max(64));

    loop {
        let consumed = inflater.total_in() as usize;
        let produced = framed.len();
        let status = inflater
            .decompress_vec(&compressed[consumed..], &mut framed, FlushDecompress::None)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        if status == Status::StreamEnd {
            return Ok(framed);
        }
        if framed.len() == framed.capacity() {
            framed.reserve(framed.capacity());
            continue;
        }
        if inflater.total_in() as usize == consumed && framed.len() == produced {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "zlib stream ended before its final block",
            ));
        }
    }
}
