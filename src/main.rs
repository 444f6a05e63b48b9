use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use pcm2mp3::lame::LameEncoder;
use pcm2mp3::{BitrateMode, Engine, EngineConfig, StageBuffers, detect, transcode};

/// Compress a 16-bit PCM WAV or AIFF file to MP3.
#[derive(Parser)]
#[command(name = "pcm2mp3", version)]
struct Cli {
    /// Input file; the output is written next to it with `.mp3` appended
    input: PathBuf,

    /// Encoder algorithm quality, 0 (best) through 9 (fastest)
    #[arg(short, long, default_value_t = 7)]
    quality: u8,

    /// Encode with a variable bitrate instead of a constant one
    #[arg(long)]
    vbr: bool,

    /// Bitrate in kbit/s; defaults to 128 per channel
    #[arg(short, long)]
    bitrate: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut source = File::open(&cli.input)
        .with_context(|| format!("opening {}", cli.input.display()))?;
    let desc = detect(&mut source)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    log::info!(
        "{}: {} Hz, {} channel(s), {} data bytes",
        cli.input.display(),
        desc.sample_rate,
        desc.channels,
        desc.data_length
    );

    let config = EngineConfig {
        sample_rate: desc.sample_rate,
        channels: desc.channels,
        quality: cli.quality,
        bitrate_mode: if cli.vbr {
            BitrateMode::Variable
        } else {
            BitrateMode::Constant
        },
        bitrate_kbps: cli
            .bitrate
            .unwrap_or(128 * u32::from(desc.channels)),
    };

    let mut output_path = cli.input.clone().into_os_string();
    output_path.push(".mp3");
    let output_path = PathBuf::from(output_path);

    let mut engine = LameEncoder::new()?;
    engine.configure(&config)?;
    let mut sink = File::create(&output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;
    let mut buffers = StageBuffers::new();
    let written = transcode(&mut source, &mut sink, &desc, &mut engine, &mut buffers)
        .with_context(|| format!("encoding {}", output_path.display()))?;
    engine.close()?;

    log::info!("{}: {written} compressed bytes", output_path.display());
    Ok(())
}
