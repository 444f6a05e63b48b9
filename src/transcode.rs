use crate::engine::Engine;
use crate::formats::StreamDescriptor;
use crate::prelude::*;

// Staging defaults: the read side is sized for I/O efficiency, the write
// side to exceed the engine's worst-case output for one read's worth of
// input.
const READ_BUFFER_SIZE: usize = 4096;
const WRITE_BUFFER_SIZE: usize = 10240;

/// Staging buffers for one or more transcode runs.
///
/// Owned by the caller and sized once, before the loop starts: a raw read
/// buffer, an i16 scratch for the decoded samples, and an output buffer the
/// engine writes compressed bytes into.
pub struct StageBuffers {
    read: Vec<u8>,
    pcm: Vec<i16>,
    write: Vec<u8>,
}

impl StageBuffers {
    pub fn new() -> Self {
        Self::with_capacity(READ_BUFFER_SIZE, WRITE_BUFFER_SIZE)
    }

    /// Explicit capacities. `read_capacity` need not be frame-aligned; each
    /// encoder hand-off is truncated to whole frames regardless.
    pub fn with_capacity(read_capacity: usize, write_capacity: usize) -> Self {
        assert!(read_capacity >= 4, "read buffer must hold a sample frame");
        Self {
            read: vec![0; read_capacity],
            pcm: vec![0; read_capacity / 2],
            write: vec![0; write_capacity],
        }
    }
}

impl Default for StageBuffers {
    fn default() -> Self {
        Self::new()
    }
}

/// Swap each adjacent byte pair in place.
///
/// The buffer must hold whole 16-bit units; the transcode loop guarantees
/// that by construction. Applying this twice restores the input.
pub fn swap_sample_bytes(buffer: &mut [u8]) {
    debug_assert_eq!(buffer.len() % 2, 0);
    for pair in buffer.chunks_exact_mut(2) {
        pair.swap(0, 1);
    }
}

/// Run the full encode pipeline: pump the data region through the engine,
/// then flush and patch the summary record over the file's first bytes.
///
/// The finalizer runs even when the pump aborts on an engine error, so a
/// partial stream still gets its trailing frames and header. Returns the
/// total compressed bytes written (body plus flush).
pub fn transcode<R, W, E>(
    input: &mut R,
    output: &mut W,
    desc: &StreamDescriptor,
    engine: &mut E,
    buffers: &mut StageBuffers,
) -> Result<u64>
where
    R: Read + Seek,
    W: Write + Seek,
    E: Engine,
{
    let pumped = pump(input, output, desc, engine, buffers);
    let finished = finish(output, engine, &mut buffers.write);
    match (pumped, finished) {
        (Ok(body), Ok(tail)) => Ok(body + tail),
        (Err(err), _) | (_, Err(err)) => Err(err),
    }
}

fn pump<R, W, E>(
    input: &mut R,
    output: &mut W,
    desc: &StreamDescriptor,
    engine: &mut E,
    buffers: &mut StageBuffers,
) -> Result<u64>
where
    R: Read + Seek,
    W: Write + Seek,
    E: Engine,
{
    let frame_size = desc.frame_size();
    input.seek(SeekFrom::Start(desc.data_offset))?;

    let mut remaining = desc.data_length;
    let mut written = 0u64;
    while remaining > 0 {
        // Round each read down to a whole frame count so no read ever
        // splits a frame. A ragged tail shorter than one frame (a malformed
        // data length) is still consumed, but never encoded.
        let want = remaining.min(buffers.read.len() as u64) as usize;
        let aligned = (want / frame_size) * frame_size;
        let take = if aligned == 0 { want } else { aligned };
        let chunk = &mut buffers.read[..take];
        input.read_exact(chunk)?;

        let sample_bytes = aligned;
        let frames = &mut chunk[..sample_bytes];
        if desc.big_endian_samples {
            swap_sample_bytes(frames);
        }
        let pcm = &mut buffers.pcm[..sample_bytes / 2];
        for (sample, bytes) in pcm.iter_mut().zip(frames.chunks_exact(2)) {
            *sample = i16::from_le_bytes([bytes[0], bytes[1]]);
        }

        let produced = if pcm.is_empty() {
            0
        } else if desc.channels == 1 {
            engine.encode_mono(pcm, &mut buffers.write)?
        } else {
            engine.encode_interleaved(pcm, &mut buffers.write)?
        };
        if produced > 0 {
            output.write_all(&buffers.write[..produced])?;
            written += produced as u64;
        }

        remaining -= take as u64;
    }

    log::debug!("pumped {} data bytes into {written} compressed bytes", desc.data_length);
    Ok(written)
}

/// Flush trailing frames onto the end of the file, then overwrite the first
/// bytes with the engine's summary record. Both steps are attempted even if
/// the first fails; the first failure is the one reported. Neither step is
/// ever retried.
fn finish<W, E>(output: &mut W, engine: &mut E, scratch: &mut [u8]) -> Result<u64>
where
    W: Write + Seek,
    E: Engine,
{
    let mut failure: Option<Error> = None;

    let mut written = 0u64;
    match engine.flush(scratch) {
        Ok(0) => {}
        Ok(count) => {
            output.seek(SeekFrom::End(0))?;
            output.write_all(&scratch[..count])?;
            written = count as u64;
        }
        Err(err) => failure = Some(err),
    }

    match engine.summary_record(scratch) {
        Ok(0) => {}
        Ok(count) => {
            let file_length = output.seek(SeekFrom::End(0))?;
            if count as u64 > file_length {
                // The record must fit inside bytes already written; growing
                // the file here would corrupt the stream behind it.
                if failure.is_none() {
                    failure = Some(Error::EngineRuntime {
                        stage: "summary",
                        code: count as i32,
                    });
                }
            } else {
                output.seek(SeekFrom::Start(0))?;
                output.write_all(&scratch[..count])?;
                log::debug!("patched {count}-byte summary record over stream start");
            }
        }
        Err(err) => {
            if failure.is_none() {
                failure = Some(err);
            }
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(written),
    }
}
