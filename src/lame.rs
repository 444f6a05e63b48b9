//! Safe wrapper over the libmp3lame streaming encoder.

use std::os::raw::c_int;

use crate::engine::{BitrateMode, Engine, EngineConfig};
use crate::error::{Error, Result};
use crate::lame_bindings as ffi;

/// A libmp3lame-backed [`Engine`].
///
/// Holds the encoder's global flags from `lame_init` to `lame_close`; the
/// close also runs on drop so early-error paths release the C state.
pub struct LameEncoder {
    gfp: ffi::lame_t,
}

impl LameEncoder {
    pub fn new() -> Result<Self> {
        let gfp = unsafe { ffi::lame_init() };
        if gfp.is_null() {
            return Err(Error::EngineConfig("LAME init failed".into()));
        }
        Ok(Self { gfp })
    }

    fn apply(&self, what: &'static str, code: c_int) -> Result<()> {
        if code != 0 {
            return Err(Error::EngineConfig(format!("{what} (code {code})")));
        }
        Ok(())
    }

    fn produced(stage: &'static str, code: c_int) -> Result<usize> {
        if code < 0 {
            return Err(Error::EngineRuntime { stage, code });
        }
        Ok(code as usize)
    }
}

impl Engine for LameEncoder {
    fn configure(&mut self, config: &EngineConfig) -> Result<()> {
        unsafe {
            self.apply(
                "lame_set_in_samplerate",
                ffi::lame_set_in_samplerate(self.gfp, config.sample_rate as c_int),
            )?;
            self.apply(
                "lame_set_num_channels",
                ffi::lame_set_num_channels(self.gfp, c_int::from(config.channels)),
            )?;
            // The tag frame patched over the stream start needs the VBR/INFO
            // tag enabled regardless of bitrate mode.
            self.apply(
                "lame_set_bWriteVbrTag",
                ffi::lame_set_bWriteVbrTag(self.gfp, 1),
            )?;
            self.apply(
                "lame_set_quality",
                ffi::lame_set_quality(self.gfp, c_int::from(config.quality)),
            )?;
            let vbr_mode = match config.bitrate_mode {
                BitrateMode::Constant => ffi::VBR_OFF,
                BitrateMode::Variable => ffi::VBR_DEFAULT,
            };
            self.apply("lame_set_VBR", ffi::lame_set_VBR(self.gfp, vbr_mode))?;
            self.apply(
                "lame_set_brate",
                ffi::lame_set_brate(self.gfp, config.bitrate_kbps as c_int),
            )?;
            self.apply("lame_init_params", ffi::lame_init_params(self.gfp))?;
        }
        Ok(())
    }

    fn encode_mono(&mut self, samples: &[i16], output: &mut [u8]) -> Result<usize> {
        // Mono wants the same slice as both channels; an empty right
        // channel makes LAME misbehave.
        let code = unsafe {
            ffi::lame_encode_buffer(
                self.gfp,
                samples.as_ptr(),
                samples.as_ptr(),
                samples.len() as c_int,
                output.as_mut_ptr(),
                output.len() as c_int,
            )
        };
        Self::produced("encode", code)
    }

    fn encode_interleaved(&mut self, samples: &[i16], output: &mut [u8]) -> Result<usize> {
        let code = unsafe {
            ffi::lame_encode_buffer_interleaved(
                self.gfp,
                samples.as_ptr() as *mut _,
                (samples.len() / 2) as c_int,
                output.as_mut_ptr(),
                output.len() as c_int,
            )
        };
        Self::produced("encode", code)
    }

    fn flush(&mut self, output: &mut [u8]) -> Result<usize> {
        let code = unsafe {
            ffi::lame_encode_flush(self.gfp, output.as_mut_ptr(), output.len() as c_int)
        };
        Self::produced("flush", code)
    }

    fn summary_record(&mut self, output: &mut [u8]) -> Result<usize> {
        let count =
            unsafe { ffi::lame_get_lametag_frame(self.gfp, output.as_mut_ptr(), output.len()) };
        // A count past the buffer is LAME reporting the size it needed.
        if count > output.len() {
            return Err(Error::EngineRuntime {
                stage: "summary",
                code: count as i32,
            });
        }
        Ok(count)
    }

    fn close(&mut self) -> Result<()> {
        if self.gfp.is_null() {
            return Ok(());
        }
        let code = unsafe { ffi::lame_close(self.gfp) };
        self.gfp = std::ptr::null_mut();
        if code != 0 {
            return Err(Error::EngineRuntime { stage: "close", code });
        }
        Ok(())
    }
}

impl Drop for LameEncoder {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
