use crate::error::DecodeError;
use alloc::vec::Vec;

/// Inflates a complete zlib stream (RFC 1950 wrapper around RFC 1951 data).
pub(crate) fn inflate_zlib(compressed: &[u8]) -> Result<Vec<u8>, DecodeError> {
    miniz_oxide::inflate::decompress_to_vec_zlib(compressed).map_err(DecodeError::Decompress)
}
