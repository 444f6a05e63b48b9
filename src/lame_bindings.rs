//! LAME FFI bindings for pcm2mp3
//!
//! Hand-written declarations for the slice of the libmp3lame C API this
//! crate drives: global-flags lifecycle, pre-encode configuration, the
//! streaming encode entry points, and the post-encode tag frame.

#![allow(non_camel_case_types)]

use std::os::raw::{c_int, c_short, c_uchar};

/// Opaque encoder state; only ever handled through a pointer.
#[repr(C)]
pub struct lame_global_flags {
    _private: [u8; 0],
}

pub type lame_t = *mut lame_global_flags;

// vbr_mode enum values from lame.h
pub const VBR_OFF: c_int = 0;
pub const VBR_ABR: c_int = 3;
pub const VBR_MTRH: c_int = 4;
pub const VBR_DEFAULT: c_int = VBR_MTRH;

#[link(name = "mp3lame")]
unsafe extern "C" {
    pub fn lame_init() -> lame_t;
    pub fn lame_close(gfp: lame_t) -> c_int;

    pub fn lame_set_in_samplerate(gfp: lame_t, rate: c_int) -> c_int;
    pub fn lame_set_num_channels(gfp: lame_t, channels: c_int) -> c_int;
    pub fn lame_set_quality(gfp: lame_t, quality: c_int) -> c_int;
    pub fn lame_set_brate(gfp: lame_t, brate: c_int) -> c_int;
    pub fn lame_set_VBR(gfp: lame_t, mode: c_int) -> c_int;
    pub fn lame_set_bWriteVbrTag(gfp: lame_t, write_tag: c_int) -> c_int;
    pub fn lame_init_params(gfp: lame_t) -> c_int;

    pub fn lame_encode_buffer(
        gfp: lame_t,
        buffer_l: *const c_short,
        buffer_r: *const c_short,
        nsamples: c_int,
        mp3buf: *mut c_uchar,
        mp3buf_size: c_int,
    ) -> c_int;

    pub fn lame_encode_buffer_interleaved(
        gfp: lame_t,
        pcm: *mut c_short,
        nsamples: c_int,
        mp3buf: *mut c_uchar,
        mp3buf_size: c_int,
    ) -> c_int;

    pub fn lame_encode_flush(gfp: lame_t, mp3buf: *mut c_uchar, size: c_int) -> c_int;

    pub fn lame_get_lametag_frame(gfp: lame_t, buffer: *mut c_uchar, size: usize) -> usize;
}
