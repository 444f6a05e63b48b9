use crate::prelude::*;

use super::{HEADER_SIZE, StreamDescriptor, find_chunk, read_container_header};

// Format tags
const FORMAT_PCM: u16 = 1;

// Chunk Identifiers
const RIFF_CHUNK_ID: &[u8; 4] = b"RIFF";
const WAVE_FORMAT_ID: &[u8; 4] = b"WAVE";
const FMT_CHUNK_ID: &[u8; 4] = b"fmt ";
const DATA_CHUNK_ID: &[u8; 4] = b"data";

const BIT_DEPTH_16: u16 = 16;

/// Validate a RIFF/WAVE header and describe its PCM data region.
///
/// Only plain 16-bit PCM with one or two channels passes; everything else
/// is rejected before any descriptor is built.
pub fn read_header<R: Read + Seek>(input: &mut R) -> Result<StreamDescriptor> {
    let header = read_container_header(input)?;
    if &header[0..4] != RIFF_CHUNK_ID || &header[8..12] != WAVE_FORMAT_ID {
        return Err(Error::NotAContainer);
    }

    let fmt_offset = find_chunk::<LittleEndian, _>(input, FMT_CHUNK_ID, HEADER_SIZE)?
        .ok_or(Error::MissingChunk("fmt "))?;
    input.seek(SeekFrom::Start(fmt_offset + 8))?;
    let format_tag = input.read_u16::<LittleEndian>()?;
    let channels = input.read_u16::<LittleEndian>()?;
    let sample_rate = input.read_u32::<LittleEndian>()?;
    input.read_u32::<LittleEndian>()?; // byte rate
    input.read_u16::<LittleEndian>()?; // block align
    let bits_per_sample = input.read_u16::<LittleEndian>()?;

    if format_tag != FORMAT_PCM || bits_per_sample != BIT_DEPTH_16 {
        return Err(Error::UnsupportedFormat(format!(
            "WAVE format tag {format_tag} at {bits_per_sample} bits, expected 16-bit PCM"
        )));
    }
    if channels != 1 && channels != 2 {
        return Err(Error::UnsupportedFormat(format!(
            "{channels} channels, expected 1 or 2"
        )));
    }

    let data_offset = find_chunk::<LittleEndian, _>(input, DATA_CHUNK_ID, HEADER_SIZE)?
        .ok_or(Error::MissingChunk("data"))?;
    input.seek(SeekFrom::Start(data_offset + 4))?;
    let data_length = input.read_u32::<LittleEndian>()?;

    Ok(StreamDescriptor {
        data_offset: data_offset + 8,
        data_length: u64::from(data_length),
        channels,
        sample_rate,
        big_endian_samples: false,
    })
}
