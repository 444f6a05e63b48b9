use std::io;

use thiserror::Error;

/// Failures while locating, validating, or re-encoding a PCM stream.
#[derive(Debug, Error)]
pub enum Error {
    /// No container reader recognized the leading header tags.
    #[error("input is not a WAV or AIFF container")]
    NotAContainer,

    /// A chunk the format requires is absent.
    #[error("container is missing its `{0}` chunk")]
    MissingChunk(&'static str),

    /// The stream is a recognized container but not 16-bit mono/stereo PCM.
    #[error("unsupported stream: {0}")]
    UnsupportedFormat(String),

    /// The file ended in the middle of a field or of the declared data.
    #[error("input ended before the declared stream data")]
    TruncatedInput,

    /// The encoding engine rejected a configuration parameter.
    #[error("encoder rejected configuration: {0}")]
    EngineConfig(String),

    /// The encoding engine reported a failure mid-stream.
    #[error("encoder failed during {stage} (code {code})")]
    EngineRuntime { stage: &'static str, code: i32 },

    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        // read_exact reports a short read as UnexpectedEof; everything that
        // runs past a declared length is a truncation, not a plain I/O fault.
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::TruncatedInput
        } else {
            Error::Io(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
