use crate::{
    chunk::ChunkType,
    header::{BitDepth, ColorType},
};
use core::fmt;
use miniz_oxide::inflate::TINFLStatus;

#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    InvalidMagicBytes,

    MissingBytes,
    ChunkTooLong(u32),

    IncorrectChunkCrc {
        chunk_type: ChunkType,
        expected: u32,
        computed: u32,
    },

    HeaderChunkNotFirst,
    DuplicateChunk(ChunkType),
    ChunkOutOfOrder(ChunkType),
    MissingEndChunk,

    InvalidHeaderLength(usize),
    InvalidDimensions {
        width: u32,
        height: u32,
    },
    InvalidBitDepth(u8),
    InvalidColorType(u8),
    InvalidColorTypeBitDepthCombination {
        color_type: ColorType,
        bit_depth: BitDepth,
    },
    InvalidCompressionMethod(u8),
    InvalidFilterMethod(u8),
    InvalidInterlaceMethod(u8),

    // The width/height specified in the image contains too many
    // bytes to address with a usize on this platform.
    IntegerOverflow,

    InvalidPaletteLength(usize),
    TooManyPaletteEntries {
        entries: usize,
        max: usize,
    },
    UnexpectedPalette(ColorType),
    /// The palette is required by the given chunk (or by an indexed-color
    /// image when the chunk is `IDAT`/`IEND`) but was never seen.
    MissingPalette(ChunkType),
    TooManyTransparencyEntries {
        entries: usize,
        palette_len: usize,
    },

    InvalidChunkLength {
        chunk_type: ChunkType,
        length: usize,
    },
    InvalidChunkValue(ChunkType),
    UnexpectedTransparency(ColorType),
    ConflictingColorProfiles,
    InvalidKeyword(ChunkType),

    MissingImageData,

    Decompress(TINFLStatus),
    ImageDataTooShort {
        expected: usize,
        found: usize,
    },

    InvalidFilterType(u8),

    MissingPaletteEntry(usize),
}

/// Coarse classification of a [`DecodeError`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Format,
    ChunkFraming,
    ChunkOrder,
    Checksum,
    Header,
    Palette,
    Ancillary,
    MissingImageData,
    CompressedStream,
    Filter,
    MissingPaletteEntry,
}

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        use DecodeError::*;

        match self {
            InvalidMagicBytes => ErrorKind::Format,
            MissingBytes | ChunkTooLong(_) => ErrorKind::ChunkFraming,
            IncorrectChunkCrc { .. } => ErrorKind::Checksum,
            HeaderChunkNotFirst | DuplicateChunk(_) | ChunkOutOfOrder(_) | MissingEndChunk => {
                ErrorKind::ChunkOrder
            },
            InvalidHeaderLength(_)
            | InvalidDimensions { .. }
            | InvalidBitDepth(_)
            | InvalidColorType(_)
            | InvalidColorTypeBitDepthCombination { .. }
            | InvalidCompressionMethod(_)
            | InvalidFilterMethod(_)
            | InvalidInterlaceMethod(_)
            | IntegerOverflow => ErrorKind::Header,
            InvalidPaletteLength(_)
            | TooManyPaletteEntries { .. }
            | UnexpectedPalette(_)
            | MissingPalette(_)
            | TooManyTransparencyEntries { .. } => ErrorKind::Palette,
            InvalidChunkLength { .. }
            | InvalidChunkValue(_)
            | UnexpectedTransparency(_)
            | ConflictingColorProfiles
            | InvalidKeyword(_) => ErrorKind::Ancillary,
            MissingImageData => ErrorKind::MissingImageData,
            Decompress(_) | ImageDataTooShort { .. } => ErrorKind::CompressedStream,
            InvalidFilterType(_) => ErrorKind::Filter,
            MissingPaletteEntry(_) => ErrorKind::MissingPaletteEntry,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use DecodeError::*;

        match self {
            InvalidMagicBytes => write!(f, "not a PNG stream: signature mismatch"),
            MissingBytes => write!(f, "unexpected end of stream inside a chunk"),
            ChunkTooLong(length) => write!(f, "chunk length {} exceeds 2^31 - 1", length),
            IncorrectChunkCrc { chunk_type, expected, computed } => write!(
                f,
                "{} chunk CRC mismatch: stored 0x{:08x}, computed 0x{:08x}",
                chunk_type, expected, computed
            ),
            HeaderChunkNotFirst => write!(f, "first chunk is not IHDR"),
            DuplicateChunk(chunk_type) => write!(f, "{} chunk appears more than once", chunk_type),
            ChunkOutOfOrder(chunk_type) => write!(f, "{} chunk is out of order", chunk_type),
            MissingEndChunk => write!(f, "stream ended without an IEND chunk"),
            InvalidHeaderLength(length) => write!(f, "IHDR payload is {} bytes, expected 13", length),
            InvalidDimensions { width, height } => {
                write!(f, "invalid image dimensions {}x{}", width, height)
            },
            InvalidBitDepth(depth) => write!(f, "invalid bit depth {}", depth),
            InvalidColorType(color_type) => write!(f, "invalid color type {}", color_type),
            InvalidColorTypeBitDepthCombination { color_type, bit_depth } => write!(
                f,
                "bit depth {} is not allowed for color type {:?}",
                *bit_depth as u8, color_type
            ),
            InvalidCompressionMethod(method) => write!(f, "invalid compression method {}", method),
            InvalidFilterMethod(method) => write!(f, "invalid filter method {}", method),
            InvalidInterlaceMethod(method) => write!(f, "invalid interlace method {}", method),
            IntegerOverflow => write!(f, "image dimensions overflow the address space"),
            InvalidPaletteLength(length) => {
                write!(f, "PLTE payload length {} is not a positive multiple of 3", length)
            },
            TooManyPaletteEntries { entries, max } => {
                write!(f, "palette has {} entries, at most {} allowed", entries, max)
            },
            UnexpectedPalette(color_type) => {
                write!(f, "PLTE chunk is not allowed for color type {:?}", color_type)
            },
            MissingPalette(chunk_type) => write!(f, "{} requires a PLTE chunk", chunk_type),
            TooManyTransparencyEntries { entries, palette_len } => write!(
                f,
                "tRNS has {} entries but the palette only has {}",
                entries, palette_len
            ),
            InvalidChunkLength { chunk_type, length } => {
                write!(f, "{} chunk has invalid payload length {}", chunk_type, length)
            },
            InvalidChunkValue(chunk_type) => write!(f, "{} chunk contains an invalid value", chunk_type),
            UnexpectedTransparency(color_type) => {
                write!(f, "tRNS chunk is not allowed for color type {:?}", color_type)
            },
            ConflictingColorProfiles => write!(f, "both sRGB and iCCP chunks are present"),
            InvalidKeyword(chunk_type) => write!(f, "{} chunk has an invalid keyword", chunk_type),
            MissingImageData => write!(f, "no IDAT chunks found"),
            Decompress(status) => write!(f, "zlib stream is corrupt: {:?}", status),
            ImageDataTooShort { expected, found } => write!(
                f,
                "decompressed image data is {} bytes, expected at least {}",
                found, expected
            ),
            InvalidFilterType(filter_type) => write!(f, "invalid scanline filter type {}", filter_type),
            MissingPaletteEntry(index) => write!(f, "palette index {} is out of range", index),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}
