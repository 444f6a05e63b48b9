use crate::error::Result;

/// How the engine allocates bits across the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitrateMode {
    Constant,
    Variable,
}

/// Parameters handed to the engine before the first sample.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// Algorithm quality, 0 (best) through 9 (fastest).
    pub quality: u8,
    pub bitrate_mode: BitrateMode,
    pub bitrate_kbps: u32,
}

impl EngineConfig {
    /// Constant-bitrate defaults: quality 7, 128 kbit/s per channel.
    pub fn cbr(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            quality: 7,
            bitrate_mode: BitrateMode::Constant,
            bitrate_kbps: 128 * u32::from(channels),
        }
    }
}

/// A streaming compression engine, used as a strictly sequential, stateful
/// transform: samples go in in order, compressed bytes come out in order.
///
/// Every producing call returns the number of bytes written into the output
/// buffer. Zero is a valid return — the engine may buffer internally and
/// emit nothing for a given input — and must not be treated as a failure.
pub trait Engine {
    /// Apply configuration. Must be called once, before any samples.
    fn configure(&mut self, config: &EngineConfig) -> Result<()>;

    /// Encode a run of mono samples.
    fn encode_mono(&mut self, samples: &[i16], output: &mut [u8]) -> Result<usize>;

    /// Encode a run of interleaved stereo frames (L/R sample pairs).
    fn encode_interleaved(&mut self, samples: &[i16], output: &mut [u8]) -> Result<usize>;

    /// Emit any internally buffered trailing frames.
    fn flush(&mut self, output: &mut [u8]) -> Result<usize>;

    /// Produce the fixed-size record describing the whole encoded stream,
    /// meant to overwrite the first bytes of the output file.
    fn summary_record(&mut self, output: &mut [u8]) -> Result<usize>;

    /// Release the engine. Further calls are an error.
    fn close(&mut self) -> Result<()>;
}
