pub mod engine;
pub mod error;
pub mod formats;
mod prelude;
pub mod transcode;

#[cfg(feature = "lame")]
pub mod lame;
#[cfg(feature = "lame")]
pub mod lame_bindings;

use std::fs::File;
use std::path::Path;

pub use engine::{BitrateMode, Engine, EngineConfig};
pub use error::{Error, Result};
pub use formats::{StreamDescriptor, detect};
pub use transcode::{StageBuffers, swap_sample_bytes, transcode};

/// One-shot transcode of a container file with the tool's default settings.
///
/// The output file is only created once the input is recognized, so a
/// rejected input never leaves an empty file behind. The engine is
/// configured from the detected stream and closed when the run ends.
pub fn transcode_file<E: Engine>(input: &Path, output: &Path, engine: &mut E) -> Result<()> {
    let mut source = File::open(input)?;
    let desc = detect(&mut source)?;
    log::info!(
        "{}: {} Hz, {} channel(s), {} data bytes",
        input.display(),
        desc.sample_rate,
        desc.channels,
        desc.data_length
    );

    let mut sink = File::create(output)?;
    engine.configure(&EngineConfig::cbr(desc.sample_rate, desc.channels))?;
    let mut buffers = StageBuffers::new();
    let written = transcode(&mut source, &mut sink, &desc, engine, &mut buffers)?;
    log::info!("{}: {written} compressed bytes", output.display());
    engine.close()
}
