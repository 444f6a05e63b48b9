use crate::prelude::*;

use super::{HEADER_SIZE, StreamDescriptor, find_chunk, read_container_header};

// Chunk Identifiers
const FORM_CHUNK_ID: &[u8; 4] = b"FORM";
const AIFF_FORMAT_ID: &[u8; 4] = b"AIFF";
const AIFC_FORMAT_ID: &[u8; 4] = b"AIFC";
const COMM_CHUNK_ID: &[u8; 4] = b"COMM";
const SSND_CHUNK_ID: &[u8; 4] = b"SSND";

const BIT_DEPTH_16: u16 = 16;

/// Validate a FORM/AIFF header and describe its PCM data region.
///
/// Both the plain `AIFF` and the `AIFC` format identifiers are accepted at
/// the header level, but the sample layout is always taken to be big-endian
/// 16-bit PCM: little-endian AIFC variants (`sowt`) are not recognized,
/// which is a known limitation of this reader.
pub fn read_header<R: Read + Seek>(input: &mut R) -> Result<StreamDescriptor> {
    let header = read_container_header(input)?;
    if &header[0..4] != FORM_CHUNK_ID
        || (&header[8..12] != AIFF_FORMAT_ID && &header[8..12] != AIFC_FORMAT_ID)
    {
        return Err(Error::NotAContainer);
    }

    let comm_offset = find_chunk::<BigEndian, _>(input, COMM_CHUNK_ID, HEADER_SIZE)?
        .ok_or(Error::MissingChunk("COMM"))?;
    input.seek(SeekFrom::Start(comm_offset + 8))?;
    let channels = input.read_u16::<BigEndian>()?;
    let sample_frames = input.read_u32::<BigEndian>()?;
    let sample_size = input.read_u16::<BigEndian>()?;
    let sample_rate = read_extended_sample_rate(input)?;

    if sample_size != BIT_DEPTH_16 {
        return Err(Error::UnsupportedFormat(format!(
            "{sample_size}-bit samples, expected 16-bit PCM"
        )));
    }
    if channels != 1 && channels != 2 {
        return Err(Error::UnsupportedFormat(format!(
            "{channels} channels, expected 1 or 2"
        )));
    }

    // The SSND chunk's declared size covers its leading fields as well, so
    // the data length comes from the COMM frame count instead.
    let data_length = u64::from(sample_frames) * u64::from(channels) * 2;

    let ssnd_offset = find_chunk::<BigEndian, _>(input, SSND_CHUNK_ID, HEADER_SIZE)?
        .ok_or(Error::MissingChunk("SSND"))?;
    input.seek(SeekFrom::Start(ssnd_offset + 8))?;
    let block_align_offset = input.read_u32::<BigEndian>()?;

    Ok(StreamDescriptor {
        data_offset: ssnd_offset + 8 + 4 + u64::from(block_align_offset),
        data_length,
        channels,
        sample_rate,
        big_endian_samples: true,
    })
}

/// Decode an 80-bit IEEE extended-precision value to a sample rate.
///
/// Sign and 15-bit exponent sit in the first two bytes, the 64-bit mantissa
/// in the rest. Returns the nearest non-negative integer; negative
/// encodings clamp to zero.
fn read_extended_sample_rate<R: Read>(input: &mut R) -> Result<u32> {
    let mut extended = [0u8; 10];
    input.read_exact(&mut extended)?;

    let sign = (extended[0] & 0x80) != 0;
    let exponent = ((u16::from(extended[0]) & 0x7F) << 8) | u16::from(extended[1]);
    let mut mantissa = 0u64;
    for byte in &extended[2..] {
        mantissa = (mantissa << 8) | u64::from(*byte);
    }

    if sign {
        return Ok(0);
    }
    if exponent == 0 && mantissa == 0 {
        return Ok(0);
    }

    let adjusted_exponent = i32::from(exponent) - 16383;
    let value = (mantissa as f64 / (1u64 << 63) as f64) * 2.0_f64.powi(adjusted_exponent);
    Ok(value.round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;
    use std::io::Cursor;

    const RATE_44100: [u8; 10] = [0x40, 0x0E, 0xAC, 0x44, 0, 0, 0, 0, 0, 0];
    const RATE_48000: [u8; 10] = [0x40, 0x0E, 0xBB, 0x80, 0, 0, 0, 0, 0, 0];
    const RATE_8000: [u8; 10] = [0x40, 0x0B, 0xFA, 0, 0, 0, 0, 0, 0, 0];

    fn aiff_bytes(
        channels: u16,
        frames: u32,
        bits: u16,
        rate: &[u8; 10],
        block_offset: u32,
        data: &[u8],
    ) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"FORM");
        out.write_u32::<BigEndian>(4 + 26 + 8 + 4 + data.len() as u32)
            .unwrap();
        out.extend_from_slice(b"AIFF");
        out.extend_from_slice(b"COMM");
        out.write_u32::<BigEndian>(18).unwrap();
        out.write_u16::<BigEndian>(channels).unwrap();
        out.write_u32::<BigEndian>(frames).unwrap();
        out.write_u16::<BigEndian>(bits).unwrap();
        out.extend_from_slice(rate);
        out.extend_from_slice(b"SSND");
        out.write_u32::<BigEndian>(4 + data.len() as u32).unwrap();
        out.write_u32::<BigEndian>(block_offset).unwrap();
        out.extend_from_slice(data);
        out
    }

    #[test]
    fn decodes_known_sample_rates() {
        let decode = |bytes: &[u8; 10]| {
            read_extended_sample_rate(&mut Cursor::new(&bytes[..])).unwrap()
        };
        assert_eq!(decode(&RATE_44100), 44100);
        assert_eq!(decode(&RATE_48000), 48000);
        assert_eq!(decode(&RATE_8000), 8000);
    }

    #[test]
    fn zero_encoding_decodes_to_zero() {
        let rate = read_extended_sample_rate(&mut Cursor::new(&[0u8; 10][..])).unwrap();
        assert_eq!(rate, 0);
    }

    #[test]
    fn negative_encoding_clamps_to_zero() {
        let mut bytes = RATE_44100;
        bytes[0] |= 0x80;
        let rate = read_extended_sample_rate(&mut Cursor::new(&bytes[..])).unwrap();
        assert_eq!(rate, 0);
    }

    #[test]
    fn reads_stereo_header() {
        let bytes = aiff_bytes(2, 100, 16, &RATE_44100, 0, &[0; 400]);
        let desc = read_header(&mut Cursor::new(&bytes[..])).unwrap();
        assert_eq!(desc.channels, 2);
        assert_eq!(desc.sample_rate, 44100);
        assert_eq!(desc.data_length, 400);
        // FORM header + COMM chunk + SSND header + block-align offset field
        assert_eq!(desc.data_offset, 12 + 26 + 8 + 4);
        assert!(desc.big_endian_samples);
    }

    #[test]
    fn block_align_offset_shifts_data_start() {
        let bytes = aiff_bytes(1, 4, 16, &RATE_8000, 6, &[0; 14]);
        let desc = read_header(&mut Cursor::new(&bytes[..])).unwrap();
        assert_eq!(desc.data_offset, 12 + 26 + 8 + 4 + 6);
        assert_eq!(desc.data_length, 8);
    }

    #[test]
    fn data_length_derives_from_frame_count() {
        // The SSND size field is deliberately wrong; only COMM counts.
        let mut bytes = aiff_bytes(1, 4, 16, &RATE_8000, 0, &[0; 8]);
        let ssnd_size_at = 12 + 26 + 4;
        bytes[ssnd_size_at..ssnd_size_at + 4].copy_from_slice(&999u32.to_be_bytes());
        let desc = read_header(&mut Cursor::new(&bytes[..])).unwrap();
        assert_eq!(desc.data_length, 8);
    }

    #[test]
    fn accepts_aifc_format_identifier() {
        let mut bytes = aiff_bytes(1, 4, 16, &RATE_8000, 0, &[0; 8]);
        bytes[8..12].copy_from_slice(b"AIFC");
        assert!(read_header(&mut Cursor::new(&bytes[..])).is_ok());
    }

    #[test]
    fn rejects_other_bit_depths() {
        let bytes = aiff_bytes(1, 4, 24, &RATE_8000, 0, &[0; 12]);
        let err = read_header(&mut Cursor::new(&bytes[..])).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn missing_sound_chunk_is_reported() {
        let mut bytes = aiff_bytes(1, 4, 16, &RATE_8000, 0, &[0; 8]);
        let ssnd_at = 12 + 26;
        bytes[ssnd_at..ssnd_at + 4].copy_from_slice(b"junk");
        let err = read_header(&mut Cursor::new(&bytes[..])).unwrap_err();
        assert!(matches!(err, Error::MissingChunk("SSND")));
    }
}
