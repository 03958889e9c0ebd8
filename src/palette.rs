use crate::{
    error::DecodeError,
    header::{ColorType, PngHeader},
};
use alloc::vec::Vec;

/// Finalized RGBA8 palette. Alpha values from a tRNS chunk are already
/// applied; entries without one are opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<[u8; 4]>,
}

impl Palette {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline(always)]
    pub fn get(&self, index: usize) -> Option<[u8; 4]> {
        self.entries.get(index).copied()
    }

    pub fn entries(&self) -> &[[u8; 4]] {
        &self.entries
    }
}

/// PLTE colors and tRNS alphas, held apart until scanning is done so the
/// order in which the two chunks were seen never matters.
#[derive(Debug, Clone)]
pub(crate) struct PaletteBuilder {
    colors: Vec<[u8; 3]>,
    alphas: Option<Vec<u8>>,
}

impl PaletteBuilder {
    pub(crate) fn from_chunk(data: &[u8], header: &PngHeader) -> Result<Self, DecodeError> {
        if matches!(header.color_type(), ColorType::Grayscale | ColorType::GrayscaleAlpha) {
            return Err(DecodeError::UnexpectedPalette(header.color_type()));
        }

        if data.is_empty() || data.len() % 3 != 0 {
            return Err(DecodeError::InvalidPaletteLength(data.len()));
        }

        let max = match header.color_type() {
            ColorType::Palette => 1usize << header.bit_depth().bits(),
            _ => 256,
        };

        let entries = data.len() / 3;
        if entries > max.min(256) {
            return Err(DecodeError::TooManyPaletteEntries { entries, max: max.min(256) });
        }

        let colors = data.chunks_exact(3).map(|rgb| [rgb[0], rgb[1], rgb[2]]).collect();

        Ok(PaletteBuilder { colors, alphas: None })
    }

    pub(crate) fn len(&self) -> usize {
        self.colors.len()
    }

    pub(crate) fn color(&self, index: usize) -> Option<[u8; 3]> {
        self.colors.get(index).copied()
    }

    /// Records per-index alpha overrides from a tRNS chunk.
    pub(crate) fn set_alphas(&mut self, alphas: &[u8]) -> Result<(), DecodeError> {
        if alphas.len() > self.colors.len() {
            return Err(DecodeError::TooManyTransparencyEntries {
                entries: alphas.len(),
                palette_len: self.colors.len(),
            });
        }

        self.alphas = Some(alphas.to_vec());
        Ok(())
    }

    pub(crate) fn build(self) -> Palette {
        let alphas = self.alphas.unwrap_or_default();

        let entries = self
            .colors
            .iter()
            .enumerate()
            .map(|(idx, [r, g, b])| [*r, *g, *b, alphas.get(idx).copied().unwrap_or(255)])
            .collect();

        Palette { entries }
    }
}
