use crate::error::DecodeError;
use core::convert::TryFrom;
use num_enum::TryFromPrimitive;

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive)]
pub enum FilterType {
    None = 0,
    Sub = 1,
    Up = 2,
    Average = 3,
    Paeth = 4,
}

impl FilterType {
    pub(crate) fn from_byte(byte: u8) -> Result<Self, DecodeError> {
        FilterType::try_from(byte).map_err(|_| DecodeError::InvalidFilterType(byte))
    }
}

/// Reverses `filter_type` on `current_scanline` in place. `last_scanline` is
/// the previous reconstructed row of the same pass, all zeroes for the first
/// row, and must be the same length.
pub(crate) fn reconstruct_scanline(
    filter_type: FilterType,
    bytes_per_pixel: usize,
    current_scanline: &mut [u8],
    last_scanline: &[u8],
) {
    debug_assert_eq!(current_scanline.len(), last_scanline.len());

    match bytes_per_pixel {
        1 => defilter::<1>(filter_type, current_scanline, last_scanline),
        2 => defilter::<2>(filter_type, current_scanline, last_scanline),
        3 => defilter::<3>(filter_type, current_scanline, last_scanline),
        4 => defilter::<4>(filter_type, current_scanline, last_scanline),
        6 => defilter::<6>(filter_type, current_scanline, last_scanline),
        8 => defilter::<8>(filter_type, current_scanline, last_scanline),
        _ => debug_assert!(false, "unsupported bytes per pixel: {}", bytes_per_pixel),
    }
}

// BPP = Bytes Per Pixel
fn defilter<const BPP: usize>(
    filter_type: FilterType,
    current_scanline: &mut [u8],
    last_scanline: &[u8],
) {
    // Rows are whole pixels long, except for sub-byte depths where BPP is 1.
    if current_scanline.len() < BPP {
        return;
    }

    match filter_type {
        FilterType::None => {},
        FilterType::Sub => {
            let (mut left_chunk, rest) = current_scanline.split_at_mut(BPP);

            for current_chunk in rest.chunks_exact_mut(BPP) {
                for (current_byte, left_byte) in current_chunk.iter_mut().zip(left_chunk.iter()) {
                    *current_byte = current_byte.wrapping_add(*left_byte);
                }

                left_chunk = current_chunk;
            }
        },
        FilterType::Up => {
            for (current, above) in current_scanline.iter_mut().zip(last_scanline) {
                *current = current.wrapping_add(*above);
            }
        },
        FilterType::Average => {
            for x in 0..BPP {
                current_scanline[x] = current_scanline[x].wrapping_add(last_scanline[x] / 2);
            }

            let (mut left_chunk, rest) = current_scanline.split_at_mut(BPP);
            let upper_iter = last_scanline[BPP..].chunks_exact(BPP);

            for (current_chunk, upper_chunk) in rest.chunks_exact_mut(BPP).zip(upper_iter) {
                for ((current_byte, left_byte), upper_byte) in
                    current_chunk.iter_mut().zip(left_chunk.iter()).zip(upper_chunk)
                {
                    *current_byte = current_byte
                        .wrapping_add(((*left_byte as u16 + *upper_byte as u16) / 2) as u8);
                }

                left_chunk = current_chunk;
            }
        },
        FilterType::Paeth => {
            for x in 0..BPP {
                let predictor = paeth_predictor(0, last_scanline[x] as i16, 0);
                current_scanline[x] = current_scanline[x].wrapping_add(predictor);
            }

            let (mut left_chunk, rest) = current_scanline.split_at_mut(BPP);
            let upper_left_iter = last_scanline.chunks_exact(BPP);
            let upper_iter = last_scanline[BPP..].chunks_exact(BPP);

            for ((current_chunk, upper_left_chunk), upper_chunk) in
                rest.chunks_exact_mut(BPP).zip(upper_left_iter).zip(upper_iter)
            {
                for (((current_byte, left_byte), upper_left_byte), upper_byte) in current_chunk
                    .iter_mut()
                    .zip(left_chunk.iter())
                    .zip(upper_left_chunk)
                    .zip(upper_chunk)
                {
                    let predictor = paeth_predictor(
                        *left_byte as i16,
                        *upper_byte as i16,
                        *upper_left_byte as i16,
                    );
                    *current_byte = current_byte.wrapping_add(predictor);
                }

                left_chunk = current_chunk;
            }
        },
    }
}

#[inline(always)]
fn paeth_predictor(a: i16, b: i16, c: i16) -> u8 {
    // a = left pixel
    // b = above pixel
    // c = upper left
    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();

    // The tie-breaking order is part of the format.
    if pa <= pb && pa <= pc {
        a as u8
    } else if pb <= pc {
        b as u8
    } else {
        c as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::filter_scanline;
    use alloc::vec::Vec;

    const FILTERS: [FilterType; 5] = [
        FilterType::None,
        FilterType::Sub,
        FilterType::Up,
        FilterType::Average,
        FilterType::Paeth,
    ];

    fn pseudo_random_row(len: usize, seed: u32) -> Vec<u8> {
        let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            })
            .collect()
    }

    #[test]
    fn filter_bytes() {
        assert_eq!(FilterType::from_byte(4).unwrap(), FilterType::Paeth);
        assert_eq!(FilterType::from_byte(5).unwrap_err(), DecodeError::InvalidFilterType(5));
    }

    #[test]
    fn hand_computed_rows() {
        let previous = [10u8, 20, 30, 40, 250, 250];

        let mut sub = [1u8, 2, 3, 4, 255, 255];
        reconstruct_scanline(FilterType::Sub, 2, &mut sub, &previous);
        assert_eq!(sub, [1, 2, 4, 6, 3, 5]);

        let mut up = [1u8, 2, 3, 4, 10, 10];
        reconstruct_scanline(FilterType::Up, 2, &mut up, &previous);
        assert_eq!(up, [11, 22, 33, 44, 4, 4]);

        // Left + above is summed without wrapping before halving.
        let mut average = [0u8, 0, 0, 0, 0, 0];
        reconstruct_scanline(FilterType::Average, 2, &mut average, &previous);
        assert_eq!(average, [5, 10, 17, 25, 133, 137]);

        let mut paeth = [0u8, 0, 0, 0, 0, 0];
        reconstruct_scanline(FilterType::Paeth, 2, &mut paeth, &previous);
        assert_eq!(paeth, [10, 20, 30, 40, 250, 250]);
    }

    #[test]
    fn paeth_tie_breaking() {
        // pa == pb == pc: a wins.
        assert_eq!(paeth_predictor(7, 7, 7), 7);
        // p = 5 + 10 - 0 = 15, pa = 10, pb = 5, pc = 15: b wins.
        assert_eq!(paeth_predictor(5, 10, 0), 10);
        // p = 100 + 20 - 90 = 30, pa = 70, pb = 10, pc = 60: b wins.
        assert_eq!(paeth_predictor(100, 20, 90), 20);
        // p = 10 + 10 - 200 = -180, pa = 190, pb = 190, pc = 380: a wins.
        assert_eq!(paeth_predictor(10, 10, 200), 10);
        // p = 50 + 100 - 80 = 70, pa = 20, pb = 30, pc = 10: c wins.
        assert_eq!(paeth_predictor(50, 100, 80), 80);
    }

    #[test]
    fn paeth_on_a_first_row_matches_sub() {
        let zero_row = [0u8; 24];

        for bpp in [1usize, 2, 3, 4, 6, 8].iter() {
            let filtered = pseudo_random_row(24, *bpp as u32);

            let mut via_paeth = filtered.clone();
            reconstruct_scanline(FilterType::Paeth, *bpp, &mut via_paeth, &zero_row);

            let mut via_sub = filtered.clone();
            reconstruct_scanline(FilterType::Sub, *bpp, &mut via_sub, &zero_row);

            assert_eq!(via_paeth, via_sub, "bpp {}", bpp);
        }
    }

    #[test]
    fn reverses_every_forward_filter() {
        for bpp in [1usize, 2, 3, 4, 6, 8].iter() {
            let len = bpp * 5;
            let previous = pseudo_random_row(len, 7);
            let original = pseudo_random_row(len, 11 + *bpp as u32);

            for filter_type in FILTERS.iter() {
                let mut row = filter_scanline(*filter_type as u8, *bpp, &original, &previous);
                reconstruct_scanline(*filter_type, *bpp, &mut row, &previous);
                assert_eq!(row, original, "filter {:?} bpp {}", filter_type, bpp);
            }
        }
    }

    #[test]
    fn every_valid_header_has_a_supported_pixel_size() {
        use crate::header::{BitDepth, ColorType, InterlaceMethod, PngHeader};

        let color_types = [
            ColorType::Grayscale,
            ColorType::Rgb,
            ColorType::Palette,
            ColorType::GrayscaleAlpha,
            ColorType::RgbAlpha,
        ];
        let depths =
            [BitDepth::One, BitDepth::Two, BitDepth::Four, BitDepth::Eight, BitDepth::Sixteen];

        for color_type in color_types.iter() {
            for bit_depth in depths.iter() {
                let header =
                    match PngHeader::new(3, 1, *bit_depth, *color_type, InterlaceMethod::None) {
                        Ok(header) => header,
                        Err(_) => continue,
                    };

                let bpp = header.bytes_per_pixel();
                assert!([1, 2, 3, 4, 6, 8].contains(&bpp), "{:?} {:?}", color_type, bit_depth);

                let len = header.row_bytes(3).unwrap();
                let previous = pseudo_random_row(len, 3);
                let original = pseudo_random_row(len, 5);
                let mut row = filter_scanline(FilterType::Paeth as u8, bpp, &original, &previous);
                reconstruct_scanline(FilterType::Paeth, bpp, &mut row, &previous);
                assert_eq!(row, original, "{:?} {:?}", color_type, bit_depth);
            }
        }
    }
}
