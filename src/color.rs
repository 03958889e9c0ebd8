use crate::{
    error::DecodeError,
    header::{BitDepth, ColorType, PngHeader},
    metadata::ColorKey,
    palette::Palette,
};

/// Converts unpacked samples into RGBA8 pixels.
pub(crate) struct ColorResolver<'a> {
    color_type: ColorType,
    bit_depth: BitDepth,
    palette: Option<&'a Palette>,
    color_key: Option<ColorKey>,
}

impl<'a> ColorResolver<'a> {
    pub(crate) fn new(
        header: &PngHeader,
        palette: Option<&'a Palette>,
        color_key: Option<ColorKey>,
    ) -> Self {
        Self { color_type: header.color_type(), bit_depth: header.bit_depth(), palette, color_key }
    }

    /// Resolves one row: `samples` holds `channels` values per pixel and
    /// `output_rgba` four bytes per pixel.
    pub(crate) fn resolve_row(
        &self,
        samples: &[u16],
        output_rgba: &mut [u8],
    ) -> Result<(), DecodeError> {
        let channels = self.color_type.sample_multiplier();
        let pixels = output_rgba.chunks_exact_mut(4).zip(samples.chunks_exact(channels));
        let depth = self.bit_depth;

        match self.color_type {
            ColorType::Grayscale => {
                for (out, sample) in pixels {
                    let gray = depth.sample_to_u8(sample[0]);
                    let alpha = match self.color_key {
                        Some(ColorKey::Grayscale(key)) if key == sample[0] => 0,
                        _ => 255,
                    };

                    out.copy_from_slice(&[gray, gray, gray, alpha]);
                }
            },
            ColorType::Rgb => {
                for (out, sample) in pixels {
                    let alpha = match self.color_key {
                        Some(ColorKey::Rgb(r, g, b))
                            if r == sample[0] && g == sample[1] && b == sample[2] =>
                        {
                            0
                        },
                        _ => 255,
                    };

                    out.copy_from_slice(&[
                        depth.sample_to_u8(sample[0]),
                        depth.sample_to_u8(sample[1]),
                        depth.sample_to_u8(sample[2]),
                        alpha,
                    ]);
                }
            },
            ColorType::Palette => {
                for (out, sample) in pixels {
                    let index = sample[0] as usize;
                    let entry = self
                        .palette
                        .and_then(|palette| palette.get(index))
                        .ok_or(DecodeError::MissingPaletteEntry(index))?;

                    out.copy_from_slice(&entry);
                }
            },
            ColorType::GrayscaleAlpha => {
                for (out, sample) in pixels {
                    let gray = depth.sample_to_u8(sample[0]);
                    out.copy_from_slice(&[gray, gray, gray, depth.sample_to_u8(sample[1])]);
                }
            },
            ColorType::RgbAlpha => {
                for (out, sample) in pixels {
                    out.copy_from_slice(&[
                        depth.sample_to_u8(sample[0]),
                        depth.sample_to_u8(sample[1]),
                        depth.sample_to_u8(sample[2]),
                        depth.sample_to_u8(sample[3]),
                    ]);
                }
            },
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{header::InterlaceMethod, palette::PaletteBuilder};

    fn header(color_type: ColorType, bit_depth: BitDepth) -> PngHeader {
        PngHeader::new(1, 1, bit_depth, color_type, InterlaceMethod::None).unwrap()
    }

    #[test]
    fn grayscale_is_scaled_and_keyed() {
        let gray2 = header(ColorType::Grayscale, BitDepth::Two);
        let resolver = ColorResolver::new(&gray2, None, Some(ColorKey::Grayscale(1)));

        let mut out = [0u8; 16];
        resolver.resolve_row(&[0, 1, 2, 3], &mut out).unwrap();
        assert_eq!(out, [0, 0, 0, 255, 85, 85, 85, 0, 170, 170, 170, 255, 255, 255, 255, 255]);
    }

    #[test]
    fn sixteen_bit_keys_compare_at_full_precision() {
        let gray16 = header(ColorType::Grayscale, BitDepth::Sixteen);
        let resolver = ColorResolver::new(&gray16, None, Some(ColorKey::Grayscale(0x1234)));

        let mut out = [0u8; 8];
        resolver.resolve_row(&[0x1234, 0x1235], &mut out).unwrap();
        // Both pixels share a high byte, only the exact match is transparent.
        assert_eq!(out, [0x12, 0x12, 0x12, 0, 0x12, 0x12, 0x12, 255]);
    }

    #[test]
    fn truecolor_key() {
        let rgb = header(ColorType::Rgb, BitDepth::Eight);
        let resolver = ColorResolver::new(&rgb, None, Some(ColorKey::Rgb(1, 2, 3)));

        let mut out = [0u8; 8];
        resolver.resolve_row(&[1, 2, 3, 1, 2, 4], &mut out).unwrap();
        assert_eq!(out, [1, 2, 3, 0, 1, 2, 4, 255]);
    }

    #[test]
    fn palette_lookup() {
        let indexed = header(ColorType::Palette, BitDepth::Eight);
        let mut builder = PaletteBuilder::from_chunk(&[9, 8, 7, 6, 5, 4], &indexed).unwrap();
        builder.set_alphas(&[128]).unwrap();
        let palette = builder.build();
        let resolver = ColorResolver::new(&indexed, Some(&palette), None);

        let mut out = [0u8; 8];
        resolver.resolve_row(&[1, 0], &mut out).unwrap();
        assert_eq!(out, [6, 5, 4, 255, 9, 8, 7, 128]);

        assert_eq!(
            resolver.resolve_row(&[0, 2], &mut out).unwrap_err(),
            DecodeError::MissingPaletteEntry(2)
        );
    }

    #[test]
    fn alpha_types_copy_through() {
        let gray_alpha = header(ColorType::GrayscaleAlpha, BitDepth::Sixteen);
        let resolver = ColorResolver::new(&gray_alpha, None, None);
        let mut out = [0u8; 4];
        resolver.resolve_row(&[0xabcd, 0x7fff], &mut out).unwrap();
        assert_eq!(out, [0xab, 0xab, 0xab, 0x7f]);

        let rgba = header(ColorType::RgbAlpha, BitDepth::Eight);
        let resolver = ColorResolver::new(&rgba, None, None);
        resolver.resolve_row(&[1, 2, 3, 4], &mut out).unwrap();
        assert_eq!(out, [1, 2, 3, 4]);
    }
}
