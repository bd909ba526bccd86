use std::io::{Read, Seek, SeekFrom};

use amx_macros::{ToBytes, riff_chunk_id};
use anyhow::{Result, bail};

use crate::utils::errors::FormatError;

/// `wFormatTag` for integer PCM.
pub const WAVE_FORMAT_PCM: u16 = 0x0001;

/// Size of the canonical PCM `fmt ` payload.
pub const FORMAT_CHUNK_LEN: u32 = 16;

/// Layout of an interleaved PCM stream.
///
/// `block_align` and `byte_rate` are derived from the other fields whenever a
/// `StreamInfo` is built for writing; for a parsed stream they hold the values
/// read from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamInfo {
    pub sample_encoding: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bit_depth: u16,
    pub total_frames: u64,
}

impl StreamInfo {
    /// Integer PCM layout with derived `block_align`/`byte_rate`.
    pub fn pcm(channels: u16, sample_rate: u32, bit_depth: u16) -> Self {
        Self {
            sample_encoding: WAVE_FORMAT_PCM,
            channels,
            sample_rate,
            bit_depth,
            ..Default::default()
        }
        .with_derived_layout()
    }

    /// Recomputes `block_align` and `byte_rate` from channels, bit depth and rate.
    pub fn with_derived_layout(mut self) -> Self {
        self.block_align = self.channels.wrapping_mul(self.bit_depth / 8);
        self.byte_rate = self.sample_rate.wrapping_mul(self.block_align as u32);
        self
    }

    pub fn bytes_per_sample(&self) -> usize {
        (self.bit_depth / 8) as usize
    }

    pub fn is_pcm(&self) -> bool {
        self.sample_encoding == WAVE_FORMAT_PCM
    }

    /// Checks that the stream holds 16- or 24-bit integer PCM with a
    /// consistent frame size.
    pub fn ensure_decodable(&self) -> Result<()> {
        if !self.is_pcm() {
            bail!(FormatError::UnsupportedEncoding(self.sample_encoding));
        }

        if self.bit_depth != 16 && self.bit_depth != 24 {
            bail!(FormatError::UnsupportedBitDepth(self.bit_depth));
        }

        if self.block_align as usize != self.channels as usize * self.bytes_per_sample() {
            bail!(FormatError::BlockAlignMismatch {
                block_align: self.block_align,
                channels: self.channels,
                bit_depth: self.bit_depth,
            });
        }

        Ok(())
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.total_frames as f64 / self.sample_rate as f64
    }

    pub fn format_chunk(&self) -> FormatChunk {
        FormatChunk {
            encoding: self.sample_encoding,
            channels: self.channels,
            sample_rate: self.sample_rate,
            byte_rate: self.byte_rate,
            block_align: self.block_align,
            bit_depth: self.bit_depth,
        }
    }
}

/// The canonical 16-byte `fmt ` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToBytes)]
#[riff_chunk_id(b"fmt ")]
pub struct FormatChunk {
    pub encoding: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bit_depth: u16,
}

impl FormatChunk {
    /// Reads a `fmt ` payload of `chunk_size` bytes, skipping anything past
    /// the canonical fields. The pad byte of an odd chunk is left to the caller.
    pub fn read<R: Read + Seek>(reader: &mut R, chunk_size: u32) -> Result<Self> {
        if chunk_size < FORMAT_CHUNK_LEN {
            bail!(FormatError::FormatChunkTooShort(chunk_size));
        }

        let mut payload = [0u8; FORMAT_CHUNK_LEN as usize];
        reader.read_exact(&mut payload)?;

        let u16_at = |i: usize| u16::from_le_bytes([payload[i], payload[i + 1]]);
        let u32_at = |i: usize| {
            u32::from_le_bytes([payload[i], payload[i + 1], payload[i + 2], payload[i + 3]])
        };

        let fc = Self {
            encoding: u16_at(0),
            channels: u16_at(2),
            sample_rate: u32_at(4),
            byte_rate: u32_at(8),
            block_align: u16_at(12),
            bit_depth: u16_at(14),
        };

        if chunk_size > FORMAT_CHUNK_LEN {
            let extra = (chunk_size - FORMAT_CHUNK_LEN) as i64;
            log::debug!("Skipping {extra} extension bytes in fmt chunk");
            reader.seek(SeekFrom::Current(extra))?;
        }

        Ok(fc)
    }

    /// Builds a `StreamInfo` for a data chunk of `data_size` bytes.
    pub fn stream_info(&self, data_size: u32) -> Result<StreamInfo> {
        if self.block_align == 0 {
            bail!(FormatError::ZeroBlockAlign);
        }

        Ok(StreamInfo {
            sample_encoding: self.encoding,
            channels: self.channels,
            sample_rate: self.sample_rate,
            byte_rate: self.byte_rate,
            block_align: self.block_align,
            bit_depth: self.bit_depth,
            total_frames: (data_size / self.block_align as u32) as u64,
        })
    }
}
