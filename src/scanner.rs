use crate::{
    chunk::{Chunk, ChunkType, Chunks},
    error::DecodeError,
    header::{ColorType, PngHeader},
    metadata::{self, Metadata},
    palette::{Palette, PaletteBuilder},
    text, DecodeOptions,
};
use alloc::vec::Vec;

pub(crate) const PNG_MAGIC_BYTES: &[u8] = &[137, 80, 78, 71, 13, 10, 26, 10];

/// Everything collected from the chunk stream, ready for image data decoding.
#[derive(Debug)]
pub(crate) struct ScannedStream<'a> {
    pub header: PngHeader,
    pub palette: Option<Palette>,
    pub metadata: Metadata,
    /// IDAT payloads in stream order.
    pub image_data: Vec<&'a [u8]>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum ImageDataState {
    NotSeen,
    InProgress,
    Finished,
}

/// Per-stream scanning state. Created fresh for every decode.
struct StreamState<'a> {
    skip_ancillary: bool,
    header: PngHeader,
    palette: Option<PaletteBuilder>,
    transparency_seen: bool,
    metadata: Metadata,
    image_data: Vec<&'a [u8]>,
    image_data_state: ImageDataState,
}

pub(crate) fn scan<'a>(
    bytes: &'a [u8],
    options: &DecodeOptions,
) -> Result<ScannedStream<'a>, DecodeError> {
    if bytes.len() < PNG_MAGIC_BYTES.len() {
        return Err(DecodeError::InvalidMagicBytes);
    }

    if &bytes[0..PNG_MAGIC_BYTES.len()] != PNG_MAGIC_BYTES {
        return Err(DecodeError::InvalidMagicBytes);
    }

    let mut chunks = Chunks::new(&bytes[PNG_MAGIC_BYTES.len()..]);

    let header_chunk = chunks.next().ok_or(DecodeError::HeaderChunkNotFirst)??;
    let header = PngHeader::from_chunk(&header_chunk)?;
    log::debug!("{:?}", header);

    let mut state = StreamState {
        skip_ancillary: options.skip_ancillary_chunks,
        header,
        palette: None,
        transparency_seen: false,
        metadata: Metadata::default(),
        image_data: Vec::new(),
        image_data_state: ImageDataState::NotSeen,
    };

    let mut seen_end = false;
    for chunk in chunks.by_ref() {
        let chunk = chunk?;
        log::trace!("chunk {} with length {}", chunk.chunk_type, chunk.data.len());

        if chunk.chunk_type == ChunkType::ImageEnd {
            if !chunk.data.is_empty() {
                return Err(DecodeError::InvalidChunkLength {
                    chunk_type: ChunkType::ImageEnd,
                    length: chunk.data.len(),
                });
            }

            seen_end = true;
            break;
        }

        state.handle_chunk(&chunk)?;
    }

    if !seen_end {
        return Err(DecodeError::MissingEndChunk);
    }

    if !chunks.remaining().is_empty() {
        log::warn!("ignoring {} bytes after IEND", chunks.remaining().len());
    }

    state.finish()
}

impl<'a> StreamState<'a> {
    fn handle_chunk(&mut self, chunk: &Chunk<'a>) -> Result<(), DecodeError> {
        let chunk_type = chunk.chunk_type;

        if chunk_type != ChunkType::ImageData
            && self.image_data_state == ImageDataState::InProgress
        {
            self.image_data_state = ImageDataState::Finished;
        }

        match chunk_type {
            ChunkType::ImageHeader => Err(DecodeError::DuplicateChunk(chunk_type)),
            ChunkType::Palette => self.handle_palette(chunk.data),
            ChunkType::ImageData => self.handle_image_data(chunk.data),
            ChunkType::Transparency
                if self.header.color_type() == ColorType::Palette || !self.skip_ancillary =>
            {
                self.handle_transparency(chunk.data)
            },
            ChunkType::Unknown(_) => {
                if chunk_type.is_critical() {
                    log::warn!("skipping unknown critical chunk {}", chunk_type);
                } else {
                    log::trace!("skipping unknown ancillary chunk {}", chunk_type);
                }

                Ok(())
            },
            _ if self.skip_ancillary => Ok(()),
            _ => self.handle_ancillary(chunk_type, chunk.data),
        }
    }

    fn handle_palette(&mut self, data: &[u8]) -> Result<(), DecodeError> {
        let chunk_type = ChunkType::Palette;

        if self.palette.is_some() {
            return Err(DecodeError::DuplicateChunk(chunk_type));
        }

        if self.image_data_state != ImageDataState::NotSeen
            || self.transparency_seen
            || self.metadata.background.is_some()
            || self.metadata.histogram.is_some()
        {
            return Err(DecodeError::ChunkOutOfOrder(chunk_type));
        }

        self.palette = Some(PaletteBuilder::from_chunk(data, &self.header)?);
        Ok(())
    }

    fn handle_image_data(&mut self, data: &'a [u8]) -> Result<(), DecodeError> {
        match self.image_data_state {
            ImageDataState::Finished => {
                return Err(DecodeError::ChunkOutOfOrder(ChunkType::ImageData));
            },
            ImageDataState::NotSeen => {
                if self.header.color_type() == ColorType::Palette && self.palette.is_none() {
                    return Err(DecodeError::MissingPalette(ChunkType::ImageData));
                }

                self.image_data_state = ImageDataState::InProgress;
            },
            ImageDataState::InProgress => {},
        }

        self.image_data.push(data);
        Ok(())
    }

    fn handle_transparency(&mut self, data: &[u8]) -> Result<(), DecodeError> {
        let chunk_type = ChunkType::Transparency;

        if self.transparency_seen {
            return Err(DecodeError::DuplicateChunk(chunk_type));
        }

        if self.image_data_state != ImageDataState::NotSeen {
            return Err(DecodeError::ChunkOutOfOrder(chunk_type));
        }

        self.transparency_seen = true;

        match self.header.color_type() {
            ColorType::Palette => {
                let palette =
                    self.palette.as_mut().ok_or(DecodeError::MissingPalette(chunk_type))?;
                palette.set_alphas(data)
            },
            _ => {
                self.metadata.transparency = Some(metadata::parse_color_key(data, &self.header)?);
                Ok(())
            },
        }
    }

    fn check_before_image_data(&self, chunk_type: ChunkType) -> Result<(), DecodeError> {
        if self.image_data_state != ImageDataState::NotSeen {
            return Err(DecodeError::ChunkOutOfOrder(chunk_type));
        }

        Ok(())
    }

    fn check_before_palette(&self, chunk_type: ChunkType) -> Result<(), DecodeError> {
        self.check_before_image_data(chunk_type)?;

        if self.palette.is_some() {
            return Err(DecodeError::ChunkOutOfOrder(chunk_type));
        }

        Ok(())
    }

    fn handle_ancillary(&mut self, chunk_type: ChunkType, data: &[u8]) -> Result<(), DecodeError> {
        match chunk_type {
            ChunkType::Chromaticities => {
                self.check_before_palette(chunk_type)?;
                set_once(&mut self.metadata.chromaticities, chunk_type, || {
                    metadata::parse_chromaticities(data)
                })
            },
            ChunkType::Gamma => {
                self.check_before_palette(chunk_type)?;
                set_once(&mut self.metadata.gamma, chunk_type, || metadata::parse_gamma(data))
            },
            ChunkType::IccProfile => {
                self.check_before_palette(chunk_type)?;
                if self.metadata.srgb.is_some() {
                    return Err(DecodeError::ConflictingColorProfiles);
                }
                set_once(&mut self.metadata.icc_profile, chunk_type, || {
                    metadata::parse_icc_profile(data)
                })
            },
            ChunkType::Srgb => {
                self.check_before_palette(chunk_type)?;
                if self.metadata.icc_profile.is_some() {
                    return Err(DecodeError::ConflictingColorProfiles);
                }
                set_once(&mut self.metadata.srgb, chunk_type, || metadata::parse_srgb(data))
            },
            ChunkType::SignificantBits => {
                self.check_before_palette(chunk_type)?;
                let header = &self.header;
                set_once(&mut self.metadata.significant_bits, chunk_type, || {
                    metadata::parse_significant_bits(data, header)
                })
            },
            ChunkType::Background => {
                self.check_before_image_data(chunk_type)?;
                let (header, palette) = (&self.header, self.palette.as_ref());
                set_once(&mut self.metadata.background, chunk_type, || {
                    metadata::parse_background(data, header, palette)
                })
            },
            ChunkType::Histogram => {
                self.check_before_image_data(chunk_type)?;
                let palette = self.palette.as_ref();
                set_once(&mut self.metadata.histogram, chunk_type, || {
                    metadata::parse_histogram(data, palette)
                })
            },
            ChunkType::PhysicalDimensions => {
                self.check_before_image_data(chunk_type)?;
                set_once(&mut self.metadata.physical_dimensions, chunk_type, || {
                    metadata::parse_physical_dimensions(data)
                })
            },
            ChunkType::SuggestedPalette => {
                self.check_before_image_data(chunk_type)?;
                let suggested_palette = metadata::parse_suggested_palette(data)?;
                self.metadata.suggested_palettes.push(suggested_palette);
                Ok(())
            },
            ChunkType::Time => {
                set_once(&mut self.metadata.last_modified, chunk_type, || metadata::parse_time(data))
            },
            ChunkType::Exif => {
                set_once(&mut self.metadata.exif, chunk_type, || Ok(data.to_vec()))
            },
            ChunkType::Text => {
                self.metadata.text.push(text::parse_text(data)?);
                Ok(())
            },
            ChunkType::CompressedText => {
                self.metadata.text.push(text::parse_compressed_text(data)?);
                Ok(())
            },
            ChunkType::InternationalText => {
                self.metadata.text.push(text::parse_international_text(data)?);
                Ok(())
            },
            // Critical chunks and tRNS never reach this point.
            ChunkType::ImageHeader
            | ChunkType::Palette
            | ChunkType::ImageData
            | ChunkType::ImageEnd
            | ChunkType::Transparency
            | ChunkType::Unknown(_) => Ok(()),
        }
    }

    fn finish(self) -> Result<ScannedStream<'a>, DecodeError> {
        if self.image_data.is_empty() {
            return Err(DecodeError::MissingImageData);
        }

        Ok(ScannedStream {
            header: self.header,
            palette: self.palette.map(PaletteBuilder::build),
            metadata: self.metadata,
            image_data: self.image_data,
        })
    }
}

/// Stores a parsed value in a field that may only be filled once.
fn set_once<T, F>(field: &mut Option<T>, chunk_type: ChunkType, parse: F) -> Result<(), DecodeError>
where
    F: FnOnce() -> Result<T, DecodeError>,
{
    if field.is_some() {
        return Err(DecodeError::DuplicateChunk(chunk_type));
    }

    *field = Some(parse()?);
    Ok(())
}
