use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};

use super::chunk::RiffChunk;
use super::info::StreamInfo;
use super::{DATA_SIGNATURE, RIFF_SIGNATURE, WAVE_SIGNATURE};
use crate::utils::byteorder::i24_to_le_bytes;
use crate::utils::errors::{FormatError, StreamError};

/// RIFF/WAVE writer for 16- and 24-bit integer PCM.
///
/// The RIFF and data chunk sizes are written as zero placeholders and
/// backpatched by [`WavWriter::finish`]. A writer dropped without finishing
/// leaves the placeholders in place.
pub struct WavWriter<W: Write + Seek> {
    writer: BufWriter<W>,
    info: StreamInfo,
    riff_size_position: u64,
    data_size_position: u64,
    frames_written: u64,
    clipped_samples: u64,
    finished: bool,
    scratch: Vec<u8>,
}

impl WavWriter<File> {
    /// Creates `path` and writes the header for `info`.
    ///
    /// The format is validated before the file is created.
    pub fn create<P: AsRef<Path>>(path: P, info: &StreamInfo) -> Result<Self> {
        validate(info)?;
        let path = path.as_ref();
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        Self::new(file, info)
    }
}

impl<W: Write + Seek> WavWriter<W> {
    /// Writes the header for `info` to `writer`.
    ///
    /// `block_align` and `byte_rate` are recomputed from the channel count,
    /// bit depth and sample rate; the caller's values are ignored.
    pub fn new(writer: W, info: &StreamInfo) -> Result<Self> {
        validate(info)?;

        let info = StreamInfo {
            total_frames: 0,
            ..info.with_derived_layout()
        };

        let mut this = Self {
            writer: BufWriter::new(writer),
            info,
            riff_size_position: 0,
            data_size_position: 0,
            frames_written: 0,
            clipped_samples: 0,
            finished: false,
            scratch: Vec::new(),
        };
        this.write_header()?;
        Ok(this)
    }

    fn write_header(&mut self) -> Result<()> {
        self.writer.write_all(RIFF_SIGNATURE)?;
        self.riff_size_position = self.writer.stream_position()?;
        self.writer.write_all(&0u32.to_le_bytes())?; // file size - 8, patched in finish()
        self.writer.write_all(WAVE_SIGNATURE)?;

        self.info.format_chunk().write_all(&mut self.writer)?;

        self.writer.write_all(DATA_SIGNATURE)?;
        self.data_size_position = self.writer.stream_position()?;
        self.writer.write_all(&0u32.to_le_bytes())?; // data size, patched in finish()

        Ok(())
    }

    /// Encodes `frame_count` frames from planar `channels`.
    ///
    /// Samples are clamped to `[-1, 1]` and truncated toward zero after
    /// scaling by `32767` (16-bit) or `2^23 - 1` (24-bit).
    pub fn write_block(&mut self, channels: &[Vec<f32>], frame_count: usize) -> Result<usize> {
        if self.finished {
            bail!(StreamError::WriterFinished);
        }

        let channel_count = self.info.channels as usize;
        if channels.len() != channel_count {
            bail!(StreamError::ChannelCountMismatch {
                expected: channel_count,
                actual: channels.len(),
            });
        }

        if let Some((channel, buffer)) = channels
            .iter()
            .enumerate()
            .find(|(_, buffer)| buffer.len() < frame_count)
        {
            bail!(StreamError::BufferTooSmall {
                channel,
                len: buffer.len(),
                required: frame_count,
            });
        }

        self.scratch.clear();
        for n in 0..frame_count {
            for buffer in channels {
                let sample = buffer[n];
                let x = sample.clamp(-1.0, 1.0);
                if x != sample {
                    self.clipped_samples += 1;
                }

                if self.info.bit_depth == 16 {
                    let s = (x * 32767.0) as i16;
                    self.scratch.extend_from_slice(&s.to_le_bytes());
                } else {
                    let s = (x * 8_388_607.0) as i32;
                    self.scratch.extend_from_slice(&i24_to_le_bytes(s));
                }
            }
        }

        self.writer.write_all(&self.scratch)?;
        self.frames_written += frame_count as u64;
        Ok(frame_count)
    }

    /// Backpatches the RIFF and data sizes and flushes the stream.
    ///
    /// A pad byte is appended after an odd-sized data chunk. Calling this
    /// more than once is a no-op.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }

        self.writer.flush()?;

        let data_end = self.writer.seek(SeekFrom::End(0))?;
        let data_bytes = data_end - (self.data_size_position + 4);

        let file_end = if data_bytes & 1 == 1 {
            self.writer.write_all(&[0])?;
            data_end + 1
        } else {
            data_end
        };
        let riff_size = file_end - 8;

        let data_bytes =
            u32::try_from(data_bytes).map_err(|_| StreamError::SizeOverflow(data_bytes))?;
        let riff_size = u32::try_from(riff_size).map_err(|_| StreamError::SizeOverflow(riff_size))?;

        self.writer.seek(SeekFrom::Start(self.data_size_position))?;
        self.writer.write_all(&data_bytes.to_le_bytes())?;

        self.writer.seek(SeekFrom::Start(self.riff_size_position))?;
        self.writer.write_all(&riff_size.to_le_bytes())?;

        self.writer.seek(SeekFrom::Start(file_end))?;
        self.writer.flush()?;

        log::debug!(
            "Finalized WAVE output: {} frames, {data_bytes} data bytes",
            self.frames_written
        );

        self.finished = true;
        Ok(())
    }

    /// Finishes the file and returns the underlying stream.
    pub fn close(mut self) -> Result<W> {
        self.finish()?;
        self.into_inner()
    }

    /// Returns the underlying stream without backpatching.
    pub fn into_inner(self) -> Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error().into())
    }

    pub fn info(&self) -> &StreamInfo {
        &self.info
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn stats(&self) -> WavStats {
        WavStats {
            frames_written: self.frames_written,
            data_written: self.frames_written * self.info.block_align as u64,
            clipped_samples: self.clipped_samples,
            finished: self.finished,
        }
    }
}

/// Statistics about written data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavStats {
    pub frames_written: u64,
    pub data_written: u64,
    pub clipped_samples: u64,
    pub finished: bool,
}

fn validate(info: &StreamInfo) -> Result<()> {
    if !info.is_pcm() {
        bail!(FormatError::UnsupportedEncoding(info.sample_encoding));
    }

    if info.channels == 0 {
        bail!(FormatError::ZeroChannels);
    }

    if info.bit_depth != 16 && info.bit_depth != 24 {
        bail!(FormatError::UnsupportedBitDepth(info.bit_depth));
    }

    Ok(())
}
