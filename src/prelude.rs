pub use crate::error::{Error, Result};
pub use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};

pub use std::io::{Read, Seek, SeekFrom, Write};
