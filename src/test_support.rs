//! In-memory PNG construction for tests: chunk framing, forward filters and
//! Adam7 splitting, written independently of the decoding side.

use alloc::vec::Vec;
use miniz_oxide::deflate::compress_to_vec_zlib;

pub(crate) const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

// Adam7 as starting row/column and increments per pass.
const STARTING_ROW: [u32; 7] = [0, 0, 4, 0, 2, 0, 1];
const STARTING_COL: [u32; 7] = [0, 4, 0, 2, 0, 1, 0];
const ROW_INCREMENT: [u32; 7] = [8, 8, 8, 4, 4, 2, 2];
const COL_INCREMENT: [u32; 7] = [8, 8, 4, 4, 2, 2, 1];

pub(crate) fn write_chunk(out: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    let mut crc_input = chunk_type.to_vec();
    crc_input.extend_from_slice(data);

    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);
    out.extend_from_slice(&crc32fast::hash(&crc_input).to_be_bytes());
}

pub(crate) fn ihdr(
    width: u32,
    height: u32,
    bit_depth: u8,
    color_type: u8,
    interlace_method: u8,
) -> [u8; 13] {
    let mut data = [0u8; 13];
    data[0..4].copy_from_slice(&width.to_be_bytes());
    data[4..8].copy_from_slice(&height.to_be_bytes());
    data[8] = bit_depth;
    data[9] = color_type;
    data[12] = interlace_method;
    data
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let (a_, b_, c_) = (a as i32, b as i32, c as i32);
    let p = a_ + b_ - c_;
    let (pa, pb, pc) = ((p - a_).abs(), (p - b_).abs(), (p - c_).abs());

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/// Applies forward filter `filter_type` to `current`.
pub(crate) fn filter_scanline(
    filter_type: u8,
    bpp: usize,
    current: &[u8],
    previous: &[u8],
) -> Vec<u8> {
    (0..current.len())
        .map(|i| {
            let a = if i >= bpp { current[i - bpp] } else { 0 };
            let b = previous[i];
            let c = if i >= bpp { previous[i - bpp] } else { 0 };

            let predictor = match filter_type {
                0 => 0,
                1 => a,
                2 => b,
                3 => ((a as u16 + b as u16) / 2) as u8,
                4 => paeth(a, b, c),
                other => panic!("no such filter {}", other),
            };

            current[i].wrapping_sub(predictor)
        })
        .collect()
}

/// Raw, unfiltered image: `channels` samples per pixel, row-major.
#[derive(Debug, Clone)]
pub(crate) struct RawImage {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: u8,
    pub samples: Vec<u16>,
}

impl RawImage {
    pub fn new<F>(width: u32, height: u32, bit_depth: u8, color_type: u8, sample: F) -> Self
    where
        F: Fn(u32, u32, usize) -> u16,
    {
        let channels = channels(color_type);
        let mut samples = Vec::with_capacity((width * height) as usize * channels);

        for y in 0..height {
            for x in 0..width {
                for channel in 0..channels {
                    samples.push(sample(x, y, channel));
                }
            }
        }

        RawImage { width, height, bit_depth, color_type, samples }
    }

    pub fn channels(&self) -> usize {
        channels(self.color_type)
    }

    pub fn sample(&self, x: u32, y: u32, channel: usize) -> u16 {
        self.samples[(y * self.width + x) as usize * self.channels() + channel]
    }

    fn bytes_per_pixel(&self) -> usize {
        ((self.bit_depth as usize * self.channels() + 7) / 8).max(1)
    }

    fn pack_row(&self, xs: &[u32], y: u32) -> Vec<u8> {
        let mut row = Vec::new();
        let mut bit_buffer = 0u8;
        let mut bits_used = 0;

        for &x in xs {
            for channel in 0..self.channels() {
                let sample = self.sample(x, y, channel);

                match self.bit_depth {
                    16 => row.extend_from_slice(&sample.to_be_bytes()),
                    8 => row.push(sample as u8),
                    depth => {
                        bit_buffer |= (sample as u8) << (8 - depth - bits_used);
                        bits_used += depth;
                        if bits_used == 8 {
                            row.push(bit_buffer);
                            bit_buffer = 0;
                            bits_used = 0;
                        }
                    },
                }
            }
        }

        if bits_used > 0 {
            row.push(bit_buffer);
        }

        row
    }

    /// Filtered scanline data, as it appears once IDAT is inflated. Rows
    /// cycle through all five filter types.
    pub fn scanlines(&self, interlaced: bool) -> Vec<u8> {
        let mut passes: Vec<(Vec<u32>, Vec<u32>)> = Vec::new();

        if interlaced {
            for pass in 0..7 {
                let xs = (STARTING_COL[pass]..self.width).step_by(COL_INCREMENT[pass] as usize);
                let ys = (STARTING_ROW[pass]..self.height).step_by(ROW_INCREMENT[pass] as usize);
                passes.push((xs.collect(), ys.collect()));
            }
        } else {
            passes.push(((0..self.width).collect(), (0..self.height).collect()));
        }

        let bpp = self.bytes_per_pixel();
        let mut out = Vec::new();
        let mut row_index = 0u32;

        for (xs, ys) in passes.iter() {
            if xs.is_empty() || ys.is_empty() {
                continue;
            }

            let mut previous = alloc::vec![0u8; self.pack_row(xs, ys[0]).len()];
            for &y in ys {
                let row = self.pack_row(xs, y);
                let filter_type = (row_index % 5) as u8;
                row_index += 1;

                out.push(filter_type);
                out.extend_from_slice(&filter_scanline(filter_type, bpp, &row, &previous));
                previous = row;
            }
        }

        out
    }
}

fn channels(color_type: u8) -> usize {
    match color_type {
        0 | 3 => 1,
        2 => 3,
        4 => 2,
        6 => 4,
        other => panic!("no such color type {}", other),
    }
}

pub(crate) struct PngBuilder {
    bytes: Vec<u8>,
}

impl PngBuilder {
    pub fn new() -> Self {
        PngBuilder { bytes: SIGNATURE.to_vec() }
    }

    pub fn chunk(mut self, chunk_type: &[u8; 4], data: &[u8]) -> Self {
        write_chunk(&mut self.bytes, chunk_type, data);
        self
    }

    pub fn header_for(self, raw: &RawImage, interlaced: bool) -> Self {
        let data = ihdr(raw.width, raw.height, raw.bit_depth, raw.color_type, interlaced as u8);
        self.chunk(b"IHDR", &data)
    }

    /// Compresses the image and splits it over two IDAT chunks.
    pub fn image_data(self, raw: &RawImage, interlaced: bool) -> Self {
        let compressed = compress_to_vec_zlib(&raw.scanlines(interlaced), 6);
        let (first, second) = compressed.split_at(compressed.len() / 2);

        self.chunk(b"IDAT", first).chunk(b"IDAT", second)
    }

    pub fn end(self) -> Vec<u8> {
        self.chunk(b"IEND", &[]).bytes
    }

    pub fn without_end(self) -> Vec<u8> {
        self.bytes
    }
}

/// A complete PNG for `raw`, with an optional PLTE payload.
pub(crate) fn encode(raw: &RawImage, interlaced: bool, palette: Option<&[u8]>) -> Vec<u8> {
    let mut builder = PngBuilder::new().header_for(raw, interlaced);

    if let Some(palette) = palette {
        builder = builder.chunk(b"PLTE", palette);
    }

    builder.image_data(raw, interlaced).end()
}
