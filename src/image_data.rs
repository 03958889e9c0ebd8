use crate::{
    color::ColorResolver,
    error::DecodeError,
    filter::{reconstruct_scanline, FilterType},
    header::{InterlaceMethod, PngHeader},
    inflate::inflate_zlib,
    interlace::{PassGeometry, ADAM7_PASSES},
    metadata::ColorKey,
    palette::Palette,
    samples::unpack_samples,
};
use alloc::{vec, vec::Vec};

fn passes(header: &PngHeader) -> &'static [PassGeometry] {
    match header.interlace_method() {
        InterlaceMethod::None => core::slice::from_ref(&PassGeometry::FULL),
        InterlaceMethod::Adam7 => &ADAM7_PASSES,
    }
}

/// Bytes of filtered scanline data (filter-type bytes included) that one
/// pass occupies in the decompressed stream.
fn pass_len(header: &PngHeader, pass_width: u32, pass_height: u32) -> Result<usize, DecodeError> {
    if pass_width == 0 || pass_height == 0 {
        return Ok(0);
    }

    (header.row_bytes(pass_width)? + 1)
        .checked_mul(pass_height as usize)
        .ok_or(DecodeError::IntegerOverflow)
}

/// Total decompressed length the header calls for.
pub(crate) fn expected_image_data_len(header: &PngHeader) -> Result<usize, DecodeError> {
    passes(header).iter().try_fold(0usize, |total, pass| {
        let (pass_width, pass_height) = pass.dimensions(header.width(), header.height());
        total
            .checked_add(pass_len(header, pass_width, pass_height)?)
            .ok_or(DecodeError::IntegerOverflow)
    })
}

/// Inflates the concatenated IDAT payloads and turns them into an RGBA8
/// bitmap, pass by pass.
pub(crate) fn decode_image_data(
    header: &PngHeader,
    compressed: &[u8],
    palette: Option<&Palette>,
    color_key: Option<ColorKey>,
) -> Result<Vec<u8>, DecodeError> {
    if compressed.is_empty() {
        return Err(DecodeError::MissingImageData);
    }

    let mut scanline_data = inflate_zlib(compressed)?;

    let expected = expected_image_data_len(header)?;
    if scanline_data.len() < expected {
        return Err(DecodeError::ImageDataTooShort { expected, found: scanline_data.len() });
    }

    if scanline_data.len() > expected {
        log::debug!("ignoring {} bytes after the last scanline", scanline_data.len() - expected);
    }

    // For now, output data is always RGBA, 1 byte per channel.
    let mut output_rgba = vec![0u8; header.rgba_len()?];
    let resolver = ColorResolver::new(header, palette, color_key);

    let mut remaining: &mut [u8] = &mut scanline_data[..expected];
    for (pass_index, pass) in passes(header).iter().enumerate() {
        let (pass_width, pass_height) = pass.dimensions(header.width(), header.height());

        // Skip empty passes.
        if pass_width == 0 || pass_height == 0 {
            log::trace!("pass {} is empty", pass_index + 1);
            continue;
        }

        let len = pass_len(header, pass_width, pass_height)?;
        let (pass_data, tail) = core::mem::take(&mut remaining).split_at_mut(len);
        remaining = tail;

        decode_pass(header, &resolver, pass, pass_width, pass_data, &mut output_rgba)?;
    }

    log::debug!(
        "decoded {}x{} image from {} bytes of scanline data",
        header.width(),
        header.height(),
        expected
    );

    Ok(output_rgba)
}

fn decode_pass(
    header: &PngHeader,
    resolver: &ColorResolver,
    pass: &PassGeometry,
    pass_width: u32,
    mut pass_data: &mut [u8],
    output_rgba: &mut [u8],
) -> Result<(), DecodeError> {
    let bytes_per_scanline = header.row_bytes(pass_width)?;
    let bytes_per_pixel = header.bytes_per_pixel();
    let image_width = header.width() as usize;

    let zero_scanline = vec![0u8; bytes_per_scanline];
    let mut last_scanline: &[u8] = &zero_scanline;

    let mut samples = vec![0u16; pass_width as usize * header.channels()];
    let mut row_rgba = vec![0u8; pass_width as usize * 4];

    let mut y = 0;
    while !pass_data.is_empty() {
        let (scanline, scanline_data_tail) =
            core::mem::take(&mut pass_data).split_at_mut(1 + bytes_per_scanline);
        pass_data = scanline_data_tail;

        let (filter_byte, current_scanline) = scanline.split_at_mut(1);
        let filter_type = FilterType::from_byte(filter_byte[0])?;

        reconstruct_scanline(filter_type, bytes_per_pixel, current_scanline, last_scanline);
        unpack_samples(header.bit_depth(), current_scanline, &mut samples);
        resolver.resolve_row(&samples, &mut row_rgba)?;
        pass.scatter_row(y, &row_rgba, image_width, output_rgba);

        last_scanline = current_scanline;
        y += 1;
    }

    Ok(())
}
