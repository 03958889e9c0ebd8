//! Ancillary chunk payloads.
//!
//! Each `parse_*` function validates one chunk's payload in isolation. The
//! scanner is responsible for ordering and uniqueness.

use crate::{
    chunk::{read_u16, read_u32, ChunkType},
    error::DecodeError,
    header::{BitDepth, ColorType, PngHeader},
    inflate::inflate_zlib,
    palette::PaletteBuilder,
    text::{split_keyword, TextEntry},
};
use alloc::{string::String, vec::Vec};
use core::convert::TryFrom;
use num_enum::TryFromPrimitive;

/// Fixed-point scale used by gAMA and cHRM.
const FIXED_POINT_SCALE: f64 = 100_000.0;

/// Everything decoded from ancillary chunks. Fields are populated
/// independently, in whatever order the chunks appeared.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Metadata {
    pub chromaticities: Option<Chromaticities>,
    pub gamma: Option<f64>,
    pub icc_profile: Option<IccProfile>,
    pub srgb: Option<RenderingIntent>,
    pub significant_bits: Option<SignificantBits>,
    /// Color key for grayscale and truecolor images. Indexed images fold
    /// their tRNS values into the palette instead.
    pub transparency: Option<ColorKey>,
    pub background: Option<Background>,
    pub histogram: Option<Vec<u16>>,
    pub physical_dimensions: Option<PhysicalDimensions>,
    pub suggested_palettes: Vec<SuggestedPalette>,
    pub last_modified: Option<Timestamp>,
    pub text: Vec<TextEntry>,
    pub exif: Option<Vec<u8>>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Chromaticities {
    pub white_point: (f64, f64),
    pub red: (f64, f64),
    pub green: (f64, f64),
    pub blue: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IccProfile {
    pub name: String,
    pub profile: Vec<u8>,
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive)]
pub enum RenderingIntent {
    Perceptual = 0,
    RelativeColorimetric = 1,
    Saturation = 2,
    AbsoluteColorimetric = 3,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SignificantBits {
    Grayscale(u8),
    Rgb(u8, u8, u8),
    GrayscaleAlpha(u8, u8),
    RgbAlpha(u8, u8, u8, u8),
}

/// A single transparent color for images without an alpha channel, stored at
/// the image's full sample precision.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorKey {
    Grayscale(u16),
    Rgb(u16, u16, u16),
}

impl ColorKey {
    /// The key normalized to 8 bits per channel.
    pub fn to_rgb8(&self, bit_depth: BitDepth) -> [u8; 3] {
        match *self {
            ColorKey::Grayscale(gray) => {
                let gray = bit_depth.value_to_u8(gray);
                [gray, gray, gray]
            },
            ColorKey::Rgb(r, g, b) => {
                [bit_depth.value_to_u8(r), bit_depth.value_to_u8(g), bit_depth.value_to_u8(b)]
            },
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BackgroundColor {
    Grayscale(u16),
    Rgb(u16, u16, u16),
    PaletteIndex(u8),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Background {
    /// The value as stored in the chunk.
    pub color: BackgroundColor,
    /// The same color normalized to RGBA8.
    pub rgba: [u8; 4],
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive)]
pub enum Unit {
    Unknown = 0,
    Meter = 1,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PhysicalDimensions {
    pub pixels_per_unit_x: u32,
    pub pixels_per_unit_y: u32,
    pub unit: Unit,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SuggestedPaletteEntry {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
    pub alpha: u16,
    pub frequency: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedPalette {
    pub name: String,
    /// 8 or 16.
    pub sample_depth: u8,
    pub entries: Vec<SuggestedPaletteEntry>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Timestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

fn expect_length(chunk_type: ChunkType, data: &[u8], length: usize) -> Result<(), DecodeError> {
    if data.len() != length {
        return Err(DecodeError::InvalidChunkLength { chunk_type, length: data.len() });
    }

    Ok(())
}

fn fixed_point(data: &[u8], offset: usize) -> f64 {
    read_u32(data, offset) as f64 / FIXED_POINT_SCALE
}

pub(crate) fn parse_chromaticities(data: &[u8]) -> Result<Chromaticities, DecodeError> {
    expect_length(ChunkType::Chromaticities, data, 32)?;

    Ok(Chromaticities {
        white_point: (fixed_point(data, 0), fixed_point(data, 4)),
        red: (fixed_point(data, 8), fixed_point(data, 12)),
        green: (fixed_point(data, 16), fixed_point(data, 20)),
        blue: (fixed_point(data, 24), fixed_point(data, 28)),
    })
}

pub(crate) fn parse_gamma(data: &[u8]) -> Result<f64, DecodeError> {
    expect_length(ChunkType::Gamma, data, 4)?;

    let gamma = read_u32(data, 0);
    if gamma == 0 {
        return Err(DecodeError::InvalidChunkValue(ChunkType::Gamma));
    }

    Ok(gamma as f64 / FIXED_POINT_SCALE)
}

pub(crate) fn parse_icc_profile(data: &[u8]) -> Result<IccProfile, DecodeError> {
    let (name, rest) = split_keyword(ChunkType::IccProfile, data)?;

    let (&compression_method, compressed) = rest.split_first().ok_or(
        DecodeError::InvalidChunkLength { chunk_type: ChunkType::IccProfile, length: data.len() },
    )?;
    if compression_method != 0 {
        return Err(DecodeError::InvalidChunkValue(ChunkType::IccProfile));
    }

    Ok(IccProfile { name, profile: inflate_zlib(compressed)? })
}

pub(crate) fn parse_srgb(data: &[u8]) -> Result<RenderingIntent, DecodeError> {
    expect_length(ChunkType::Srgb, data, 1)?;

    RenderingIntent::try_from(data[0]).map_err(|_| DecodeError::InvalidChunkValue(ChunkType::Srgb))
}

pub(crate) fn parse_significant_bits(
    data: &[u8],
    header: &PngHeader,
) -> Result<SignificantBits, DecodeError> {
    let chunk_type = ChunkType::SignificantBits;
    let expected_len = match header.color_type() {
        ColorType::Palette => 3,
        color_type => color_type.sample_multiplier(),
    };
    expect_length(chunk_type, data, expected_len)?;

    let max = match header.color_type() {
        ColorType::Palette => 8,
        _ => header.bit_depth().bits() as u8,
    };
    if data.iter().any(|&bits| bits == 0 || bits > max) {
        return Err(DecodeError::InvalidChunkValue(chunk_type));
    }

    Ok(match header.color_type() {
        ColorType::Grayscale => SignificantBits::Grayscale(data[0]),
        ColorType::Rgb | ColorType::Palette => SignificantBits::Rgb(data[0], data[1], data[2]),
        ColorType::GrayscaleAlpha => SignificantBits::GrayscaleAlpha(data[0], data[1]),
        ColorType::RgbAlpha => SignificantBits::RgbAlpha(data[0], data[1], data[2], data[3]),
    })
}

/// Parses a tRNS chunk for grayscale and truecolor images. Indexed images
/// hand their payload to [`PaletteBuilder::set_alphas`] instead.
pub(crate) fn parse_color_key(data: &[u8], header: &PngHeader) -> Result<ColorKey, DecodeError> {
    let chunk_type = ChunkType::Transparency;

    if header.color_type().has_alpha() {
        return Err(DecodeError::UnexpectedTransparency(header.color_type()));
    }

    match header.color_type() {
        ColorType::Grayscale => {
            expect_length(chunk_type, data, 2)?;
            Ok(ColorKey::Grayscale(read_u16(data, 0)))
        },
        ColorType::Rgb => {
            expect_length(chunk_type, data, 6)?;
            Ok(ColorKey::Rgb(read_u16(data, 0), read_u16(data, 2), read_u16(data, 4)))
        },
        color_type => Err(DecodeError::UnexpectedTransparency(color_type)),
    }
}

pub(crate) fn parse_background(
    data: &[u8],
    header: &PngHeader,
    palette: Option<&PaletteBuilder>,
) -> Result<Background, DecodeError> {
    let chunk_type = ChunkType::Background;
    let bit_depth = header.bit_depth();

    match header.color_type() {
        ColorType::Grayscale | ColorType::GrayscaleAlpha => {
            expect_length(chunk_type, data, 2)?;
            let gray = read_u16(data, 0);
            let value = bit_depth.value_to_u8(gray);

            Ok(Background { color: BackgroundColor::Grayscale(gray), rgba: [value, value, value, 255] })
        },
        ColorType::Rgb | ColorType::RgbAlpha => {
            expect_length(chunk_type, data, 6)?;
            let (r, g, b) = (read_u16(data, 0), read_u16(data, 2), read_u16(data, 4));

            Ok(Background {
                color: BackgroundColor::Rgb(r, g, b),
                rgba: [
                    bit_depth.value_to_u8(r),
                    bit_depth.value_to_u8(g),
                    bit_depth.value_to_u8(b),
                    255,
                ],
            })
        },
        ColorType::Palette => {
            expect_length(chunk_type, data, 1)?;
            let palette = palette.ok_or(DecodeError::MissingPalette(chunk_type))?;
            let index = data[0];
            let [r, g, b] = palette
                .color(index as usize)
                .ok_or(DecodeError::MissingPaletteEntry(index as usize))?;

            Ok(Background { color: BackgroundColor::PaletteIndex(index), rgba: [r, g, b, 255] })
        },
    }
}

pub(crate) fn parse_histogram(
    data: &[u8],
    palette: Option<&PaletteBuilder>,
) -> Result<Vec<u16>, DecodeError> {
    let chunk_type = ChunkType::Histogram;
    let palette = palette.ok_or(DecodeError::MissingPalette(chunk_type))?;
    expect_length(chunk_type, data, palette.len() * 2)?;

    Ok(data.chunks_exact(2).map(|pair| u16::from_be_bytes([pair[0], pair[1]])).collect())
}

pub(crate) fn parse_physical_dimensions(data: &[u8]) -> Result<PhysicalDimensions, DecodeError> {
    let chunk_type = ChunkType::PhysicalDimensions;
    expect_length(chunk_type, data, 9)?;

    Ok(PhysicalDimensions {
        pixels_per_unit_x: read_u32(data, 0),
        pixels_per_unit_y: read_u32(data, 4),
        unit: Unit::try_from(data[8]).map_err(|_| DecodeError::InvalidChunkValue(chunk_type))?,
    })
}

pub(crate) fn parse_suggested_palette(data: &[u8]) -> Result<SuggestedPalette, DecodeError> {
    let chunk_type = ChunkType::SuggestedPalette;
    let (name, rest) = split_keyword(chunk_type, data)?;

    let (&sample_depth, entry_bytes) = rest
        .split_first()
        .ok_or(DecodeError::InvalidChunkLength { chunk_type, length: data.len() })?;

    let entry_len = match sample_depth {
        8 => 6,
        16 => 10,
        _ => return Err(DecodeError::InvalidChunkValue(chunk_type)),
    };

    if entry_bytes.len() % entry_len != 0 {
        return Err(DecodeError::InvalidChunkLength { chunk_type, length: data.len() });
    }

    let entries = entry_bytes
        .chunks_exact(entry_len)
        .map(|entry| match sample_depth {
            8 => SuggestedPaletteEntry {
                red: entry[0] as u16,
                green: entry[1] as u16,
                blue: entry[2] as u16,
                alpha: entry[3] as u16,
                frequency: read_u16(entry, 4),
            },
            _ => SuggestedPaletteEntry {
                red: read_u16(entry, 0),
                green: read_u16(entry, 2),
                blue: read_u16(entry, 4),
                alpha: read_u16(entry, 6),
                frequency: read_u16(entry, 8),
            },
        })
        .collect();

    Ok(SuggestedPalette { name, sample_depth, entries })
}

pub(crate) fn parse_time(data: &[u8]) -> Result<Timestamp, DecodeError> {
    let chunk_type = ChunkType::Time;
    expect_length(chunk_type, data, 7)?;

    let timestamp = Timestamp {
        year: read_u16(data, 0),
        month: data[2],
        day: data[3],
        hour: data[4],
        minute: data[5],
        second: data[6],
    };

    let valid = (1..=12).contains(&timestamp.month)
        && (1..=31).contains(&timestamp.day)
        && timestamp.hour <= 23
        && timestamp.minute <= 59
        // Leap seconds are allowed.
        && timestamp.second <= 60;

    if !valid {
        return Err(DecodeError::InvalidChunkValue(chunk_type));
    }

    Ok(timestamp)
}
