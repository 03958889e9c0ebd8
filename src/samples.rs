use crate::header::BitDepth;

/// Unpacks a reconstructed scanline into one value per sample, filling all of
/// `samples`. Sub-byte samples are read most significant bits first and left
/// unscaled; 16-bit samples are read big-endian at full precision.
pub(crate) fn unpack_samples(bit_depth: BitDepth, scanline: &[u8], samples: &mut [u16]) {
    match bit_depth {
        BitDepth::Eight => {
            for (sample, byte) in samples.iter_mut().zip(scanline) {
                *sample = *byte as u16;
            }
        },
        BitDepth::Sixteen => {
            for (sample, pair) in samples.iter_mut().zip(scanline.chunks_exact(2)) {
                *sample = u16::from_be_bytes([pair[0], pair[1]]);
            }
        },
        BitDepth::One | BitDepth::Two | BitDepth::Four => {
            let bits = bit_depth.bits();
            let samples_per_byte = 8 / bits;
            let mask = (1u8 << bits) - 1;

            for (idx, sample) in samples.iter_mut().enumerate() {
                let byte = scanline[idx / samples_per_byte];
                let bit_offset = 8 - bits * (idx % samples_per_byte + 1);
                *sample = ((byte >> bit_offset) & mask) as u16;
            }
        },
    }
}
