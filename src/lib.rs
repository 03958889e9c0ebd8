//! A `no_std` PNG decoder producing top-down, row-major RGBA8 bitmaps along
//! with the image header and ancillary metadata.
//!
//! ```no_run
//! let bytes = std::fs::read("image.png").unwrap();
//! let png = png_rgba_decoder::decode(&bytes).unwrap();
//! assert_eq!(png.pixels().len(), png.width() as usize * png.height() as usize * 4);
//! ```

#![no_std]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod chunk;
mod color;
mod crc;
mod error;
mod filter;
mod header;
mod image_data;
mod inflate;
mod interlace;
mod metadata;
mod palette;
mod samples;
mod scanner;
mod text;

#[cfg(test)]
mod test_support;

pub use crate::{
    chunk::{read_chunk, Chunk, ChunkType, Chunks, MAX_CHUNK_LENGTH},
    crc::crc32,
    error::{DecodeError, ErrorKind},
    filter::FilterType,
    header::{
        BitDepth, ColorType, CompressionMethod, FilterMethod, InterlaceMethod, PngHeader,
        MAX_DIMENSION,
    },
    interlace::{PassGeometry, ADAM7_PASSES},
    metadata::{
        Background, BackgroundColor, Chromaticities, ColorKey, IccProfile, Metadata,
        PhysicalDimensions, RenderingIntent, SignificantBits, SuggestedPalette,
        SuggestedPaletteEntry, Timestamp, Unit,
    },
    palette::Palette,
    text::{TextEntry, TextKind},
};

use alloc::vec::Vec;

/// Decoder settings.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    /// Skip every ancillary chunk without parsing it. tRNS is still applied
    /// to indexed-color images, since it changes their pixels.
    pub skip_ancillary_chunks: bool,
}

impl DecodeOptions {
    pub fn skip_ancillary_chunks(mut self, skip: bool) -> Self {
        self.skip_ancillary_chunks = skip;
        self
    }
}

/// A fully decoded image.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPng {
    header: PngHeader,
    pixels: Vec<u8>,
    palette: Option<Palette>,
    metadata: Metadata,
}

impl DecodedPng {
    pub fn header(&self) -> &PngHeader {
        &self.header
    }

    pub fn width(&self) -> u32 {
        self.header.width()
    }

    pub fn height(&self) -> u32 {
        self.header.height()
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.header.bit_depth()
    }

    pub fn color_type(&self) -> ColorType {
        self.header.color_type()
    }

    pub fn compression_method(&self) -> CompressionMethod {
        self.header.compression_method()
    }

    pub fn filter_method(&self) -> FilterMethod {
        self.header.filter_method()
    }

    pub fn interlace_method(&self) -> InterlaceMethod {
        self.header.interlace_method()
    }

    /// RGBA8 pixels, `width * height * 4` bytes, top row first.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// The PLTE entries with tRNS alphas folded in. Only present when the
    /// stream carried a PLTE chunk.
    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// Decodes a complete PNG file held in memory.
pub fn decode(bytes: &[u8]) -> Result<DecodedPng, DecodeError> {
    decode_with_options(bytes, &DecodeOptions::default())
}

pub fn decode_with_options(
    bytes: &[u8],
    options: &DecodeOptions,
) -> Result<DecodedPng, DecodeError> {
    let scanned = scanner::scan(bytes, options)?;

    let compressed_data = scanned.image_data.concat();
    log::trace!(
        "{} bytes of compressed image data in {} IDAT chunks",
        compressed_data.len(),
        scanned.image_data.len()
    );

    let pixels = image_data::decode_image_data(
        &scanned.header,
        &compressed_data,
        scanned.palette.as_ref(),
        scanned.metadata.transparency,
    )?;

    Ok(DecodedPng {
        header: scanned.header,
        pixels,
        palette: scanned.palette,
        metadata: scanned.metadata,
    })
}
