use crate::{chunk::ChunkType, error::DecodeError, inflate::inflate_zlib};
use alloc::{borrow::ToOwned, string::String, vec::Vec};

const MAX_KEYWORD_LEN: usize = 79;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextKind {
    /// tEXt: uncompressed Latin-1.
    Plain,
    /// zTXt: zlib-compressed Latin-1.
    Compressed,
    /// iTXt: UTF-8, optionally compressed.
    International { compressed: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntry {
    pub kind: TextKind,
    pub keyword: String,
    pub text: String,
    /// Only set for iTXt chunks, and only when non-empty.
    pub language_tag: Option<String>,
    /// Only set for iTXt chunks, and only when non-empty.
    pub translated_keyword: Option<String>,
}

pub(crate) fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| byte as char).collect()
}

/// Splits off a null-terminated Latin-1 keyword of 1 to 79 bytes.
pub(crate) fn split_keyword(
    chunk_type: ChunkType,
    data: &[u8],
) -> Result<(String, &[u8]), DecodeError> {
    let separator = data
        .iter()
        .position(|&byte| byte == 0)
        .ok_or(DecodeError::InvalidKeyword(chunk_type))?;

    let keyword = &data[..separator];
    if keyword.is_empty() || keyword.len() > MAX_KEYWORD_LEN {
        return Err(DecodeError::InvalidKeyword(chunk_type));
    }

    Ok((latin1_to_string(keyword), &data[separator + 1..]))
}

/// Splits `data` at the first null byte. A missing terminator is an error.
fn split_at_null(chunk_type: ChunkType, data: &[u8]) -> Result<(&[u8], &[u8]), DecodeError> {
    let separator = data
        .iter()
        .position(|&byte| byte == 0)
        .ok_or(DecodeError::InvalidChunkLength { chunk_type, length: data.len() })?;

    Ok((&data[..separator], &data[separator + 1..]))
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

pub(crate) fn parse_text(data: &[u8]) -> Result<TextEntry, DecodeError> {
    let (keyword, text) = split_keyword(ChunkType::Text, data)?;

    Ok(TextEntry {
        kind: TextKind::Plain,
        keyword,
        text: latin1_to_string(text),
        language_tag: None,
        translated_keyword: None,
    })
}

pub(crate) fn parse_compressed_text(data: &[u8]) -> Result<TextEntry, DecodeError> {
    let chunk_type = ChunkType::CompressedText;
    let (keyword, rest) = split_keyword(chunk_type, data)?;

    let (&compression_method, compressed) = rest
        .split_first()
        .ok_or(DecodeError::InvalidChunkLength { chunk_type, length: data.len() })?;
    if compression_method != 0 {
        return Err(DecodeError::InvalidChunkValue(chunk_type));
    }

    Ok(TextEntry {
        kind: TextKind::Compressed,
        keyword,
        text: latin1_to_string(&inflate_zlib(compressed)?),
        language_tag: None,
        translated_keyword: None,
    })
}

pub(crate) fn parse_international_text(data: &[u8]) -> Result<TextEntry, DecodeError> {
    let chunk_type = ChunkType::InternationalText;
    let (keyword, rest) = split_keyword(chunk_type, data)?;

    if rest.len() < 2 {
        return Err(DecodeError::InvalidChunkLength { chunk_type, length: data.len() });
    }

    let compressed = match rest[0] {
        0 => false,
        1 => true,
        _ => return Err(DecodeError::InvalidChunkValue(chunk_type)),
    };
    if rest[1] != 0 {
        return Err(DecodeError::InvalidChunkValue(chunk_type));
    }

    let (language_tag, rest) = split_at_null(chunk_type, &rest[2..])?;
    let (translated_keyword, text) = split_at_null(chunk_type, rest)?;

    let text: Vec<u8> = if compressed { inflate_zlib(text)? } else { text.to_owned() };

    Ok(TextEntry {
        kind: TextKind::International { compressed },
        keyword,
        text: String::from_utf8_lossy(&text).into_owned(),
        language_tag: non_empty(latin1_to_string(language_tag)),
        translated_keyword: non_empty(String::from_utf8_lossy(translated_keyword).into_owned()),
    })
}
