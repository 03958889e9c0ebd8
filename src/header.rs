use crate::{
    chunk::{read_u32, Chunk, ChunkType},
    error::DecodeError,
};
use core::convert::{TryFrom, TryInto};
use num_enum::TryFromPrimitive;

/// Largest width or height the format allows (2^31 - 1).
pub const MAX_DIMENSION: u32 = 0x7FFF_FFFF;

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive)]
pub enum BitDepth {
    One = 1,
    Two = 2,
    Four = 4,
    Eight = 8,
    Sixteen = 16,
}

impl BitDepth {
    pub fn bits(self) -> usize {
        self as usize
    }

    /// Multiplier that stretches a sample of this depth onto `0..=255`.
    /// Only meaningful for depths of 8 bits or less.
    pub fn scale_multiplier(self) -> u8 {
        match self {
            BitDepth::One => 255,
            BitDepth::Two => 85,
            BitDepth::Four => 17,
            BitDepth::Eight | BitDepth::Sixteen => 1,
        }
    }

    /// Maps a raw sample of this depth to 8 bits: sub-byte depths are scaled
    /// up, 16-bit samples keep their most significant byte.
    #[inline(always)]
    pub fn sample_to_u8(self, sample: u16) -> u8 {
        match self {
            BitDepth::Sixteen => (sample >> 8) as u8,
            BitDepth::Eight => sample as u8,
            _ => (sample as u8).wrapping_mul(self.scale_multiplier()),
        }
    }

    /// Maps a raw metadata value (background or color key) to 8 bits:
    /// sub-byte depths are scaled up, 16-bit values are divided by 257 with
    /// rounding.
    pub fn value_to_u8(self, value: u16) -> u8 {
        match self {
            BitDepth::Sixteen => ((value as u32 + 128) / 257) as u8,
            BitDepth::Eight => value as u8,
            _ => {
                let max = (1u16 << self.bits()) - 1;
                (value.min(max) as u8) * self.scale_multiplier()
            },
        }
    }
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive)]
pub enum ColorType {
    Grayscale = 0,
    Rgb = 2,
    Palette = 3,
    GrayscaleAlpha = 4,
    RgbAlpha = 6,
}

impl ColorType {
    pub fn sample_multiplier(&self) -> usize {
        match self {
            ColorType::Grayscale => 1,
            ColorType::Rgb => 3,
            ColorType::Palette => 1,
            ColorType::GrayscaleAlpha => 2,
            ColorType::RgbAlpha => 4,
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self, ColorType::GrayscaleAlpha | ColorType::RgbAlpha)
    }

    pub fn allows_bit_depth(&self, bit_depth: BitDepth) -> bool {
        match self {
            ColorType::Grayscale => true,
            ColorType::Palette => bit_depth != BitDepth::Sixteen,
            ColorType::Rgb | ColorType::GrayscaleAlpha | ColorType::RgbAlpha => {
                matches!(bit_depth, BitDepth::Eight | BitDepth::Sixteen)
            },
        }
    }
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive)]
pub enum CompressionMethod {
    Deflate = 0,
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive)]
pub enum FilterMethod {
    Adaptive = 0,
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive)]
pub enum InterlaceMethod {
    None = 0,
    Adam7 = 1,
}

/// Image descriptor from the IHDR chunk. Only constructible through
/// [`PngHeader::new`] or from a chunk, so every value is a valid combination.
#[derive(Debug, Clone, PartialEq)]
pub struct PngHeader {
    width: u32,
    height: u32,
    bit_depth: BitDepth,
    color_type: ColorType,
    compression_method: CompressionMethod,
    filter_method: FilterMethod,
    interlace_method: InterlaceMethod,
}

impl PngHeader {
    pub fn new(
        width: u32,
        height: u32,
        bit_depth: BitDepth,
        color_type: ColorType,
        interlace_method: InterlaceMethod,
    ) -> Result<Self, DecodeError> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(DecodeError::InvalidDimensions { width, height });
        }

        if !color_type.allows_bit_depth(bit_depth) {
            return Err(DecodeError::InvalidColorTypeBitDepthCombination { color_type, bit_depth });
        }

        Ok(PngHeader {
            width,
            height,
            bit_depth,
            color_type,
            compression_method: CompressionMethod::Deflate,
            filter_method: FilterMethod::Adaptive,
            interlace_method,
        })
    }

    pub(crate) fn from_chunk(chunk: &Chunk) -> Result<Self, DecodeError> {
        if chunk.chunk_type != ChunkType::ImageHeader {
            return Err(DecodeError::HeaderChunkNotFirst);
        }

        if chunk.data.len() != 13 {
            return Err(DecodeError::InvalidHeaderLength(chunk.data.len()));
        }

        let width = read_u32(chunk.data, 0);
        let height = read_u32(chunk.data, 4);
        let bit_depth = chunk.data[8];
        let color_type = chunk.data[9];
        let compression_method = chunk.data[10];
        let filter_method = chunk.data[11];
        let interlace_method = chunk.data[12];

        let bit_depth =
            BitDepth::try_from(bit_depth).map_err(|_| DecodeError::InvalidBitDepth(bit_depth))?;
        let color_type = ColorType::try_from(color_type)
            .map_err(|_| DecodeError::InvalidColorType(color_type))?;
        CompressionMethod::try_from(compression_method)
            .map_err(|_| DecodeError::InvalidCompressionMethod(compression_method))?;
        FilterMethod::try_from(filter_method)
            .map_err(|_| DecodeError::InvalidFilterMethod(filter_method))?;
        let interlace_method = InterlaceMethod::try_from(interlace_method)
            .map_err(|_| DecodeError::InvalidInterlaceMethod(interlace_method))?;

        Self::new(width, height, bit_depth, color_type, interlace_method)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    pub fn color_type(&self) -> ColorType {
        self.color_type
    }

    pub fn compression_method(&self) -> CompressionMethod {
        self.compression_method
    }

    pub fn filter_method(&self) -> FilterMethod {
        self.filter_method
    }

    pub fn interlace_method(&self) -> InterlaceMethod {
        self.interlace_method
    }

    pub fn channels(&self) -> usize {
        self.color_type.sample_multiplier()
    }

    pub fn bits_per_pixel(&self) -> usize {
        self.bit_depth.bits() * self.channels()
    }

    /// Filter lookback distance: whole bytes per pixel, never less than one.
    pub fn bytes_per_pixel(&self) -> usize {
        ((self.bits_per_pixel() + 7) / 8).max(1)
    }

    /// Bytes of packed sample data in a row `width` pixels wide, excluding
    /// the leading filter-type byte.
    pub fn row_bytes(&self, width: u32) -> Result<usize, DecodeError> {
        let bytes = ((width as u64 * self.bits_per_pixel() as u64) + 7) / 8;
        bytes.try_into().map_err(|_| DecodeError::IntegerOverflow)
    }

    /// Length in bytes of the RGBA8 output bitmap.
    pub fn rgba_len(&self) -> Result<usize, DecodeError> {
        (self.width as u64)
            .checked_mul(self.height as u64)
            .and_then(|pixels| pixels.checked_mul(4))
            .and_then(|len| usize::try_from(len).ok())
            .ok_or(DecodeError::IntegerOverflow)
    }
}
