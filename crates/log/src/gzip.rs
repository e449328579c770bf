use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::error::LogError;

/// Leading bytes of every gzip stream.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

/// Decompress a gzip stream.
pub fn gunzip(bytes: &[u8]) -> Result<Vec<u8>, LogError> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(LogError::Decompression)?;
    Ok(out)
}

/// Compress bytes into a gzip stream.
pub fn gzip(bytes: &[u8]) -> Result<Vec<u8>, LogError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn magic_detection() {
        assert!(is_gzip(&[0x1F, 0x8B, 0x08]));
        assert!(!is_gzip(b"MAP 1 1 1\n"));
        assert!(!is_gzip(&[0x1F]));
    }

    #[test]
    fn compress_then_decompress() {
        let text = b"MAP 1 1 1\nAMz\nENDMAP\n";
        let packed = gzip(text).unwrap();
        assert!(is_gzip(&packed));
        assert_eq!(gunzip(&packed).unwrap(), text);
    }

    #[test]
    fn corrupt_stream_is_decompression_error() {
        // Valid magic, but compression method 0 instead of deflate.
        let bogus = [0x1F, 0x8B, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x41];
        let err = gunzip(&bogus).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decompression);
    }
}
