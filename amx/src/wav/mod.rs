//! RIFF/WAVE container codec.
//!
//! [`WavReader`] walks the chunk list, then streams planar `f32` blocks out of
//! the data chunk. [`WavWriter`] emits a header with placeholder sizes,
//! streams encoded blocks and backpatches the sizes on [`WavWriter::finish`].

pub mod chunk;
pub mod info;
pub mod reader;
pub mod writer;

pub use info::{FormatChunk, StreamInfo, WAVE_FORMAT_PCM};
pub use reader::{HeaderParser, ParsedHeader, WavReader, read_header};
pub use writer::{WavStats, WavWriter};

pub const RIFF_SIGNATURE: &[u8; 4] = b"RIFF";
pub const WAVE_SIGNATURE: &[u8; 4] = b"WAVE";
pub const FMT_SIGNATURE: &[u8; 4] = b"fmt ";
pub const DATA_SIGNATURE: &[u8; 4] = b"data";
