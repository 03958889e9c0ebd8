use crate::{crc::chunk_crc, error::DecodeError};
use core::fmt;

/// Largest chunk length the format allows (2^31 - 1).
pub const MAX_CHUNK_LENGTH: u32 = 0x7FFF_FFFF;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChunkType {
    ImageHeader,
    Palette,
    ImageData,
    ImageEnd,

    Chromaticities,
    Gamma,
    IccProfile,
    SignificantBits,
    Srgb,

    Transparency,
    Background,
    Histogram,
    PhysicalDimensions,
    SuggestedPalette,

    Time,
    Text,
    CompressedText,
    InternationalText,
    Exif,

    Unknown([u8; 4]),
}

impl ChunkType {
    pub fn from_bytes(bytes: &[u8; 4]) -> Self {
        match bytes {
            b"IHDR" => ChunkType::ImageHeader,
            b"PLTE" => ChunkType::Palette,
            b"IDAT" => ChunkType::ImageData,
            b"IEND" => ChunkType::ImageEnd,
            b"cHRM" => ChunkType::Chromaticities,
            b"gAMA" => ChunkType::Gamma,
            b"iCCP" => ChunkType::IccProfile,
            b"sBIT" => ChunkType::SignificantBits,
            b"sRGB" => ChunkType::Srgb,
            b"tRNS" => ChunkType::Transparency,
            b"bKGD" => ChunkType::Background,
            b"hIST" => ChunkType::Histogram,
            b"pHYs" => ChunkType::PhysicalDimensions,
            b"sPLT" => ChunkType::SuggestedPalette,
            b"tIME" => ChunkType::Time,
            b"tEXt" => ChunkType::Text,
            b"zTXt" => ChunkType::CompressedText,
            b"iTXt" => ChunkType::InternationalText,
            b"eXIf" => ChunkType::Exif,
            unknown_chunk_type => ChunkType::Unknown(*unknown_chunk_type),
        }
    }

    pub fn to_bytes(self) -> [u8; 4] {
        match self {
            ChunkType::ImageHeader => *b"IHDR",
            ChunkType::Palette => *b"PLTE",
            ChunkType::ImageData => *b"IDAT",
            ChunkType::ImageEnd => *b"IEND",
            ChunkType::Chromaticities => *b"cHRM",
            ChunkType::Gamma => *b"gAMA",
            ChunkType::IccProfile => *b"iCCP",
            ChunkType::SignificantBits => *b"sBIT",
            ChunkType::Srgb => *b"sRGB",
            ChunkType::Transparency => *b"tRNS",
            ChunkType::Background => *b"bKGD",
            ChunkType::Histogram => *b"hIST",
            ChunkType::PhysicalDimensions => *b"pHYs",
            ChunkType::SuggestedPalette => *b"sPLT",
            ChunkType::Time => *b"tIME",
            ChunkType::Text => *b"tEXt",
            ChunkType::CompressedText => *b"zTXt",
            ChunkType::InternationalText => *b"iTXt",
            ChunkType::Exif => *b"eXIf",
            ChunkType::Unknown(bytes) => bytes,
        }
    }

    /// Critical chunks have an uppercase first letter (bit 5 clear).
    pub fn is_critical(self) -> bool {
        self.to_bytes()[0] & 0x20 == 0
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.to_bytes().iter() {
            if byte.is_ascii_graphic() {
                write!(f, "{}", *byte as char)?;
            } else {
                write!(f, "\\x{:02x}", byte)?;
            }
        }

        Ok(())
    }
}

#[derive(Debug)]
pub struct Chunk<'a> {
    pub chunk_type: ChunkType,
    pub data: &'a [u8],
    pub crc: u32,
}

impl<'a> Chunk<'a> {
    pub fn byte_size(&self) -> usize {
        // length bytes + chunk type bytes + data bytes + crc bytes
        4 + 4 + self.data.len() + 4
    }
}

pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}

pub(crate) fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([bytes[offset], bytes[offset + 1]])
}

/// Reads one framed chunk from the front of `bytes` and verifies its CRC.
pub fn read_chunk(bytes: &[u8]) -> Result<Chunk, DecodeError> {
    if bytes.len() < 8 {
        return Err(DecodeError::MissingBytes);
    }

    let length = read_u32(bytes, 0);
    if length > MAX_CHUNK_LENGTH {
        return Err(DecodeError::ChunkTooLong(length));
    }

    let length = length as usize;
    let bytes = &bytes[4..];

    if bytes.len() < (4 + length + 4) {
        return Err(DecodeError::MissingBytes);
    }

    let type_bytes = [bytes[0], bytes[1], bytes[2], bytes[3]];
    let chunk_type = ChunkType::from_bytes(&type_bytes);

    let crc_offset = 4 + length;
    let crc = read_u32(bytes, crc_offset);
    let data = &bytes[4..crc_offset];

    let computed = chunk_crc(&type_bytes, data);
    if crc != computed {
        return Err(DecodeError::IncorrectChunkCrc { chunk_type, expected: crc, computed });
    }

    Ok(Chunk { chunk_type, data, crc })
}

/// Iterates over the chunks following the signature. Stops after the first
/// error.
pub struct Chunks<'a> {
    bytes: &'a [u8],
    failed: bool,
}

impl<'a> Chunks<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, failed: false }
    }

    /// Bytes not yet consumed by the iterator.
    pub fn remaining(&self) -> &'a [u8] {
        self.bytes
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Result<Chunk<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.bytes.is_empty() {
            return None;
        }

        match read_chunk(self.bytes) {
            Ok(chunk) => {
                self.bytes = &self.bytes[chunk.byte_size()..];
                Some(Ok(chunk))
            },
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_chunk;
    use alloc::vec::Vec;

    #[test]
    fn reads_a_framed_chunk() {
        let mut bytes = Vec::new();
        write_chunk(&mut bytes, b"gAMA", &35000u32.to_be_bytes());

        let chunk = read_chunk(&bytes).unwrap();
        assert_eq!(chunk.chunk_type, ChunkType::Gamma);
        assert_eq!(chunk.data, &35000u32.to_be_bytes());
        assert_eq!(chunk.byte_size(), bytes.len());
    }

    #[test]
    fn rejects_a_corrupted_crc() {
        let mut bytes = Vec::new();
        write_chunk(&mut bytes, b"IEND", &[]);
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;

        match read_chunk(&bytes) {
            Err(DecodeError::IncorrectChunkCrc { chunk_type, computed, .. }) => {
                assert_eq!(chunk_type, ChunkType::ImageEnd);
                assert_eq!(computed, 0xAE42_6082);
            },
            other => panic!("expected a CRC error, got {:?}", other),
        }
    }

    #[test]
    fn rejects_oversized_lengths() {
        let mut bytes = 0x8000_0000u32.to_be_bytes().to_vec();
        bytes.extend_from_slice(b"IDAT");

        assert_eq!(read_chunk(&bytes).unwrap_err(), DecodeError::ChunkTooLong(0x8000_0000));
    }

    #[test]
    fn rejects_truncated_chunks() {
        let mut bytes = Vec::new();
        write_chunk(&mut bytes, b"tEXt", b"Title\0hello");

        for len in 0..bytes.len() {
            assert_eq!(read_chunk(&bytes[..len]).unwrap_err(), DecodeError::MissingBytes);
        }
    }

    #[test]
    fn unknown_types_round_trip_their_tag() {
        let chunk_type = ChunkType::from_bytes(b"prVt");
        assert_eq!(chunk_type, ChunkType::Unknown(*b"prVt"));
        assert!(!chunk_type.is_critical());
        assert_eq!(alloc::format!("{}", chunk_type), "prVt");

        assert!(ChunkType::from_bytes(b"ABCD").is_critical());
        assert_eq!(ChunkType::Exif.to_bytes(), *b"eXIf");
    }

    #[test]
    fn iterates_until_the_first_error() {
        let mut bytes = Vec::new();
        write_chunk(&mut bytes, b"tIME", &[7, 226, 1, 2, 3, 4, 5]);
        write_chunk(&mut bytes, b"IEND", &[]);
        bytes.push(0);

        let mut chunks = Chunks::new(&bytes);
        assert_eq!(chunks.next().unwrap().unwrap().chunk_type, ChunkType::Time);
        assert_eq!(chunks.next().unwrap().unwrap().chunk_type, ChunkType::ImageEnd);
        assert_eq!(chunks.remaining(), &[0]);
        assert_eq!(chunks.next().unwrap().unwrap_err(), DecodeError::MissingBytes);
        assert!(chunks.next().is_none());
    }
}
