use crate::prelude::*;

mod aiff;
mod wav;

// Leading tag + overall size + format tag. Both containers open with this
// 12-byte header, so no chunk can ever start before offset 12.
const HEADER_SIZE: u64 = 12;

/// Canonical description of the PCM stream found inside a container.
///
/// Built once by whichever reader recognizes the input, then handed to a
/// single transcode run. All fields describe the source file as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    /// Byte offset where raw sample data begins.
    pub data_offset: u64,
    /// Total byte count of sample data.
    pub data_length: u64,
    /// 1 (mono) or 2 (interleaved stereo); nothing else validates.
    pub channels: u16,
    /// Samples per second per channel.
    pub sample_rate: u32,
    /// Whether 16-bit samples must be byte-swapped before use.
    pub big_endian_samples: bool,
}

impl StreamDescriptor {
    /// Size of one sample frame in bytes (`channels * 2`).
    pub fn frame_size(&self) -> usize {
        usize::from(self.channels) * 2
    }
}

/// Try each container reader in order and return the first descriptor.
///
/// The WAVE reader runs first, then AIFF; a rejection by one reader is
/// ordinary control flow, not an error worth surfacing. When every reader
/// fails, the reported error is the most specific one: a reader that got
/// past the header tags knows more than one that never matched them.
pub fn detect<R: Read + Seek>(input: &mut R) -> Result<StreamDescriptor> {
    let readers: [(&str, fn(&mut R) -> Result<StreamDescriptor>); 2] = [
        ("wave", wav::read_header::<R>),
        ("aiff", aiff::read_header::<R>),
    ];

    let mut failure: Option<Error> = None;
    for (name, read_header) in readers {
        input.seek(SeekFrom::Start(0))?;
        match read_header(input) {
            Ok(desc) => {
                log::debug!("detected {name} container: {desc:?}");
                return Ok(desc);
            }
            Err(err) => {
                log::debug!("{name} reader rejected input: {err}");
                let more_specific = matches!(failure, None | Some(Error::NotAContainer))
                    && !matches!(err, Error::NotAContainer);
                if failure.is_none() || more_specific {
                    failure = Some(err);
                }
            }
        }
    }
    Err(failure.unwrap_or(Error::NotAContainer))
}

/// Scan forward from `start` for the chunk tagged `target`.
///
/// Chunk size fields are read in byte order `E`. Returns the offset of the
/// chunk's own header, or `None` when the container ends first. A size
/// field of zero is treated as the end of the container, and an oversized
/// size field simply runs the next header read off the end of the file;
/// neither derails the scan.
fn find_chunk<E, R>(input: &mut R, target: &[u8; 4], start: u64) -> Result<Option<u64>>
where
    E: ByteOrder,
    R: Read + Seek,
{
    let mut offset = start;
    input.seek(SeekFrom::Start(offset))?;
    loop {
        let mut header = [0u8; 8];
        if let Err(err) = input.read_exact(&mut header) {
            return match err.kind() {
                std::io::ErrorKind::UnexpectedEof => Ok(None),
                _ => Err(err.into()),
            };
        }
        if &header[0..4] == target {
            return Ok(Some(offset));
        }
        let size = E::read_u32(&header[4..8]);
        if size == 0 {
            return Ok(None);
        }
        // Chunk bodies are padded to even length.
        offset += 8 + u64::from(size) + u64::from(size & 1);
        input.seek(SeekFrom::Start(offset))?;
    }
}

/// Read the 12-byte container header, mapping a short file to a plain
/// "not this container" rejection.
fn read_container_header<R: Read>(input: &mut R) -> Result<[u8; 12]> {
    let mut header = [0u8; 12];
    input.read_exact(&mut header).map_err(|err| match err.kind() {
        std::io::ErrorKind::UnexpectedEof => Error::NotAContainer,
        _ => Error::Io(err),
    })?;
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;
    use std::io::Cursor;

    fn chunk<E: ByteOrder>(tag: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(tag);
        out.write_u32::<E>(body.len() as u32).unwrap();
        out.extend_from_slice(body);
        if body.len() % 2 == 1 {
            out.push(0);
        }
        out
    }

    fn container<E: ByteOrder>(chunks: &[(&[u8; 4], &[u8])]) -> Vec<u8> {
        let mut data = b"XXXX\0\0\0\0YYYY".to_vec();
        for (tag, body) in chunks {
            data.extend_from_slice(&chunk::<E>(tag, body));
        }
        data
    }

    #[test]
    fn finds_chunk_past_skipped_ones() {
        let data = container::<LittleEndian>(&[
            (b"aaaa", &[1, 2, 3, 4]),
            (b"bbbb", &[5, 6]),
            (b"cccc", &[7, 8, 9, 10]),
        ]);
        let mut cursor = Cursor::new(&data[..]);
        let found = find_chunk::<LittleEndian, _>(&mut cursor, b"cccc", HEADER_SIZE).unwrap();
        // 12 + (8 + 4) + (8 + 2)
        assert_eq!(found, Some(34));
    }

    #[test]
    fn missing_chunk_reports_not_found() {
        let data = container::<LittleEndian>(&[(b"aaaa", &[0; 6])]);
        let mut cursor = Cursor::new(&data[..]);
        let found = find_chunk::<LittleEndian, _>(&mut cursor, b"zzzz", HEADER_SIZE).unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn zero_size_chunk_terminates_scan() {
        // A zero-size chunk before the target must end the scan, not spin.
        let data = container::<LittleEndian>(&[(b"aaaa", &[]), (b"data", &[1, 2])]);
        let mut cursor = Cursor::new(&data[..]);
        let found = find_chunk::<LittleEndian, _>(&mut cursor, b"data", HEADER_SIZE).unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn oversized_size_field_does_not_crash() {
        let mut data = container::<LittleEndian>(&[(b"aaaa", &[0; 4])]);
        // Claim far more bytes than the file holds.
        data[16] = 0xFF;
        data[17] = 0xFF;
        let mut cursor = Cursor::new(&data[..]);
        let found = find_chunk::<LittleEndian, _>(&mut cursor, b"data", HEADER_SIZE).unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn odd_sized_chunks_are_padded() {
        let data = container::<BigEndian>(&[(b"aaaa", &[1, 2, 3]), (b"SSND", &[0; 8])]);
        let mut cursor = Cursor::new(&data[..]);
        let found = find_chunk::<BigEndian, _>(&mut cursor, b"SSND", HEADER_SIZE).unwrap();
        // 12 + (8 + 3 + 1 pad)
        assert_eq!(found, Some(24));
    }

    #[test]
    fn unrecognized_input_is_not_a_container() {
        let mut cursor = Cursor::new(&b"MThd\0\0\0\x06not audio at all"[..]);
        assert!(matches!(detect(&mut cursor), Err(Error::NotAContainer)));
    }

    #[test]
    fn empty_input_is_not_a_container() {
        let mut cursor = Cursor::new(&b""[..]);
        assert!(matches!(detect(&mut cursor), Err(Error::NotAContainer)));
    }
}
