use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::Level;

use super::chunk::ChunkHeader;
use super::info::{FormatChunk, StreamInfo};
use super::{DATA_SIGNATURE, FMT_SIGNATURE, RIFF_SIGNATURE, WAVE_SIGNATURE};
use crate::log_or_err;
use crate::utils::byteorder::i24_from_le_bytes;
use crate::utils::errors::{FormatError, HeaderWarning, StreamError};

/// Result of walking a RIFF/WAVE header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedHeader {
    pub info: StreamInfo,
    /// Byte offset of the first sample in the data chunk.
    pub data_offset: u64,
    pub data_size: u32,
}

/// Walks the chunk list of a WAVE stream.
pub struct HeaderParser {
    pub fail_level: Level,
}

impl Default for HeaderParser {
    fn default() -> Self {
        Self {
            fail_level: Level::Error,
        }
    }
}

impl HeaderParser {
    /// Sets the failure level for header anomalies.
    ///
    /// - `log::Level::Error`: anomalies are logged as warnings (default)
    /// - `log::Level::Warn`: anomalies fail the parse (strict mode)
    pub fn set_fail_level(&mut self, level: Level) {
        self.fail_level = level;
    }

    /// Parses the header and leaves `reader` positioned at the first sample.
    pub fn parse<R: Read + Seek>(&self, reader: &mut R) -> Result<ParsedHeader> {
        let start = reader.stream_position()?;

        let mut riff_header = [0u8; 12];
        reader
            .read_exact(&mut riff_header)
            .context("Stream too short for a RIFF header")?;

        let riff_id: [u8; 4] = [riff_header[0], riff_header[1], riff_header[2], riff_header[3]];
        let riff_size = u32::from_le_bytes([
            riff_header[4],
            riff_header[5],
            riff_header[6],
            riff_header[7],
        ]);
        let wave_id: [u8; 4] = [
            riff_header[8],
            riff_header[9],
            riff_header[10],
            riff_header[11],
        ];

        if &riff_id != RIFF_SIGNATURE {
            bail!(FormatError::InvalidRiffSignature(riff_id));
        }
        if &wave_id != WAVE_SIGNATURE {
            bail!(FormatError::InvalidWaveSignature(wave_id));
        }

        let mut format = None;
        let mut data = None;

        while format.is_none() || data.is_none() {
            let Some(header) = ChunkHeader::read(reader)? else {
                break;
            };

            match &header.id {
                FMT_SIGNATURE => {
                    format = Some(FormatChunk::read(reader, header.size)?);
                    let pad = header.padded_size() - header.size as u64;
                    reader.seek(SeekFrom::Current(pad as i64))?;
                }
                DATA_SIGNATURE => {
                    let offset = reader.stream_position()?;
                    data = Some((offset, header.size));
                    reader.seek(SeekFrom::Current(header.padded_size() as i64))?;
                }
                _ => {
                    log::debug!(
                        "Skipping '{}' chunk ({} bytes)",
                        header.id_str().escape_debug(),
                        header.size
                    );
                    reader.seek(SeekFrom::Current(header.padded_size() as i64))?;
                }
            }
        }

        let Some(format) = format else {
            bail!(FormatError::MissingFormatChunk);
        };
        let Some((data_offset, data_size)) = data else {
            bail!(FormatError::MissingDataChunk);
        };

        let info = format.stream_info(data_size)?;

        let stream_end = reader.seek(SeekFrom::End(0))?;
        self.check_consistency(
            &info,
            riff_size,
            data_size,
            stream_end - start,
            stream_end.saturating_sub(data_offset),
        )?;

        reader.seek(SeekFrom::Start(data_offset))?;

        log::debug!(
            "Parsed WAVE header: {} ch, {} Hz, {}-bit, {} frames at offset {data_offset}",
            info.channels,
            info.sample_rate,
            info.bit_depth,
            info.total_frames
        );

        Ok(ParsedHeader {
            info,
            data_offset,
            data_size,
        })
    }

    fn check_consistency(
        &self,
        info: &StreamInfo,
        riff_size: u32,
        data_size: u32,
        stream_len: u64,
        available: u64,
    ) -> Result<()> {
        let expected_byte_rate = info.sample_rate as u64 * info.block_align as u64;
        if info.byte_rate as u64 != expected_byte_rate {
            log_or_err!(
                self,
                Level::Warn,
                HeaderWarning::ByteRateMismatch {
                    read: info.byte_rate,
                    expected: expected_byte_rate,
                }
            );
        }

        let expected_riff_size = stream_len.saturating_sub(8);
        if riff_size as u64 != expected_riff_size {
            log_or_err!(
                self,
                Level::Warn,
                HeaderWarning::RiffSizeMismatch {
                    read: riff_size,
                    expected: expected_riff_size,
                }
            );
        }

        if data_size % info.block_align as u32 != 0 {
            log_or_err!(
                self,
                Level::Warn,
                HeaderWarning::PartialFrame {
                    size: data_size,
                    block_align: info.block_align,
                }
            );
        }

        if data_size as u64 > available {
            log_or_err!(
                self,
                Level::Warn,
                HeaderWarning::DataTruncated {
                    claimed: data_size,
                    available,
                }
            );
        }

        Ok(())
    }
}

/// Streaming decoder for 16- and 24-bit integer PCM WAVE data.
///
/// Samples are delivered planar, one `f32` buffer per channel, normalized to
/// `[-1, 1)`.
pub struct WavReader<R: Read + Seek> {
    reader: R,
    info: StreamInfo,
    data_offset: u64,
    data_size: u32,
    frames_read: u64,
    scratch: Vec<u8>,
}

impl WavReader<BufReader<File>> {
    /// Opens and parses a WAVE file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_parser(path, &HeaderParser::default())
    }

    pub fn open_with_parser<P: AsRef<Path>>(path: P, parser: &HeaderParser) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        Self::with_parser(BufReader::new(file), parser)
    }
}

impl<R: Read + Seek> WavReader<R> {
    /// Parses the header of `reader` with default strictness.
    pub fn new(reader: R) -> Result<Self> {
        Self::with_parser(reader, &HeaderParser::default())
    }

    pub fn with_parser(mut reader: R, parser: &HeaderParser) -> Result<Self> {
        let header = parser.parse(&mut reader)?;

        Ok(Self {
            reader,
            info: header.info,
            data_offset: header.data_offset,
            data_size: header.data_size,
            frames_read: 0,
            scratch: Vec::new(),
        })
    }

    pub fn info(&self) -> &StreamInfo {
        &self.info
    }

    pub fn data_offset(&self) -> u64 {
        self.data_offset
    }

    pub fn data_size(&self) -> u32 {
        self.data_size
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    pub fn remaining_frames(&self) -> u64 {
        self.info.total_frames - self.frames_read
    }

    /// Decodes up to `max_frames` frames into `channels`, one buffer per
    /// channel.
    ///
    /// Returns `Ok(0)` once every frame of the data chunk has been delivered.
    /// A data chunk that ends early is a [`StreamError::ShortRead`]; no frames
    /// of a short block are surfaced.
    pub fn read_block(&mut self, channels: &mut [Vec<f32>], max_frames: usize) -> Result<usize> {
        self.info.ensure_decodable()?;

        let channel_count = self.info.channels as usize;
        if channels.len() != channel_count {
            bail!(StreamError::ChannelCountMismatch {
                expected: channel_count,
                actual: channels.len(),
            });
        }

        let frames_to_read = (max_frames as u64).min(self.remaining_frames()) as usize;
        if frames_to_read == 0 {
            return Ok(0);
        }

        if let Some((channel, buffer)) = channels
            .iter()
            .enumerate()
            .find(|(_, buffer)| buffer.len() < frames_to_read)
        {
            bail!(StreamError::BufferTooSmall {
                channel,
                len: buffer.len(),
                required: frames_to_read,
            });
        }

        let block_align = self.info.block_align as usize;
        let total_bytes = frames_to_read * block_align;
        if self.scratch.len() < total_bytes {
            self.scratch.resize(total_bytes, 0);
        }

        let read = read_full(&mut self.reader, &mut self.scratch[..total_bytes])?;
        if read != total_bytes {
            bail!(StreamError::ShortRead {
                expected: total_bytes,
                read,
            });
        }

        let bytes = &self.scratch[..total_bytes];
        match self.info.bit_depth {
            16 => {
                for (n, frame) in bytes.chunks_exact(block_align).enumerate() {
                    for (buffer, sample) in channels.iter_mut().zip(frame.chunks_exact(2)) {
                        let s = i16::from_le_bytes([sample[0], sample[1]]);
                        buffer[n] = s as f32 / 32768.0;
                    }
                }
            }
            _ => {
                for (n, frame) in bytes.chunks_exact(block_align).enumerate() {
                    for (buffer, sample) in channels.iter_mut().zip(frame.chunks_exact(3)) {
                        let s = i24_from_le_bytes([sample[0], sample[1], sample[2]]);
                        buffer[n] = s as f32 / 8_388_608.0;
                    }
                }
            }
        }

        self.frames_read += frames_to_read as u64;
        Ok(frames_to_read)
    }

    /// Releases the underlying stream.
    pub fn into_inner(self) -> R {
        self.reader
    }

    pub fn close(self) {}
}

/// Parses the header of a file without keeping it open.
pub fn read_header<P: AsRef<Path>>(path: P, parser: &HeaderParser) -> Result<StreamInfo> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let header = parser.parse(&mut BufReader::new(file))?;
    Ok(header.info)
}

fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join_bytes_le;
    use crate::wav::chunk::RiffChunk;
    use std::io::Cursor;

    fn build_wave(info: &StreamInfo, extra_chunks: &[(&[u8; 4], &[u8])], data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(WAVE_SIGNATURE);
        info.format_chunk().write_all(&mut body).unwrap();
        for (id, payload) in extra_chunks {
            body.extend_from_slice(*id);
            body.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            body.extend_from_slice(payload);
            if payload.len() % 2 == 1 {
                body.push(0);
            }
        }
        body.extend_from_slice(DATA_SIGNATURE);
        body.extend_from_slice(&(data.len() as u32).to_le_bytes());
        body.extend_from_slice(data);

        let mut file = Vec::new();
        file.extend_from_slice(RIFF_SIGNATURE);
        file.extend_from_slice(&(body.len() as u32).to_le_bytes());
        file.extend_from_slice(&body);
        file
    }

    fn stereo_16(frames: &[(i16, i16)]) -> Vec<u8> {
        frames
            .iter()
            .flat_map(|&(l, r)| join_bytes_le!(l, r))
            .collect()
    }

    #[test]
    fn parses_canonical_header() -> Result<()> {
        let info = StreamInfo::pcm(2, 44100, 16);
        let bytes = build_wave(&info, &[], &[0u8; 400]);

        let reader = WavReader::new(Cursor::new(bytes))?;
        assert_eq!(reader.info().channels, 2);
        assert_eq!(reader.info().sample_rate, 44100);
        assert_eq!(reader.info().total_frames, 100);
        assert_eq!(reader.data_offset(), 44);
        assert_eq!(reader.data_size(), 400);
        Ok(())
    }

    #[test]
    fn skips_odd_sized_unknown_chunk() -> Result<()> {
        let info = StreamInfo::pcm(2, 48000, 16);
        let data = stereo_16(&[(1000, -1000), (2000, -2000)]);
        let bytes = build_wave(&info, &[(b"LIST", b"odd")], &data);

        let mut reader = WavReader::new(Cursor::new(bytes))?;
        // 12 RIFF + 24 fmt + 8 + 3 + 1 pad LIST + 8 data header
        assert_eq!(reader.data_offset(), 56);
        assert_eq!(reader.info().total_frames, 2);

        let mut channels = vec![vec![0.0f32; 4]; 2];
        assert_eq!(reader.read_block(&mut channels, 4)?, 2);
        assert_eq!(channels[0][0], 1000.0 / 32768.0);
        assert_eq!(channels[1][1], -2000.0 / 32768.0);
        Ok(())
    }

    #[test]
    fn data_before_fmt_is_accepted() -> Result<()> {
        let info = StreamInfo::pcm(2, 48000, 16);
        let data = stereo_16(&[(1, 2)]);

        let mut body = Vec::new();
        body.extend_from_slice(WAVE_SIGNATURE);
        body.extend_from_slice(DATA_SIGNATURE);
        body.extend_from_slice(&(data.len() as u32).to_le_bytes());
        body.extend_from_slice(&data);
        info.format_chunk().write_all(&mut body)?;

        let mut bytes = Vec::new();
        bytes.extend_from_slice(RIFF_SIGNATURE);
        bytes.extend_from_slice(&(body.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&body);

        let mut reader = WavReader::new(Cursor::new(bytes))?;
        assert_eq!(reader.data_offset(), 20);

        let mut channels = vec![vec![0.0f32; 1]; 2];
        assert_eq!(reader.read_block(&mut channels, 1)?, 1);
        assert_eq!(channels[1][0], 2.0 / 32768.0);
        Ok(())
    }

    #[test]
    fn rejects_bad_signatures() {
        let info = StreamInfo::pcm(2, 48000, 16);
        let mut bytes = build_wave(&info, &[], &[0u8; 4]);
        bytes[0..4].copy_from_slice(b"RIFX");
        let err = WavReader::new(Cursor::new(bytes)).err().expect("must fail");
        assert_eq!(
            err.downcast_ref::<FormatError>(),
            Some(&FormatError::InvalidRiffSignature(*b"RIFX"))
        );

        let mut bytes = build_wave(&info, &[], &[0u8; 4]);
        bytes[8..12].copy_from_slice(b"AVI ");
        let err = WavReader::new(Cursor::new(bytes)).err().expect("must fail");
        assert_eq!(
            err.downcast_ref::<FormatError>(),
            Some(&FormatError::InvalidWaveSignature(*b"AVI "))
        );
    }

    #[test]
    fn rejects_missing_chunks() {
        let info = StreamInfo::pcm(2, 48000, 16);

        let mut no_data = Vec::new();
        no_data.extend_from_slice(RIFF_SIGNATURE);
        no_data.extend_from_slice(&28u32.to_le_bytes());
        no_data.extend_from_slice(WAVE_SIGNATURE);
        info.format_chunk().write_all(&mut no_data).unwrap();
        let err = WavReader::new(Cursor::new(no_data)).err().expect("must fail");
        assert_eq!(
            err.downcast_ref::<FormatError>(),
            Some(&FormatError::MissingDataChunk)
        );

        let mut no_fmt = Vec::new();
        no_fmt.extend_from_slice(RIFF_SIGNATURE);
        no_fmt.extend_from_slice(&12u32.to_le_bytes());
        no_fmt.extend_from_slice(WAVE_SIGNATURE);
        no_fmt.extend_from_slice(DATA_SIGNATURE);
        no_fmt.extend_from_slice(&0u32.to_le_bytes());
        let err = WavReader::new(Cursor::new(no_fmt)).err().expect("must fail");
        assert_eq!(
            err.downcast_ref::<FormatError>(),
            Some(&FormatError::MissingFormatChunk)
        );
    }

    #[test]
    fn rejects_zero_block_align() {
        let info = StreamInfo {
            block_align: 0,
            ..StreamInfo::pcm(2, 48000, 16)
        };
        let bytes = build_wave(&info, &[], &[0u8; 8]);
        let err = WavReader::new(Cursor::new(bytes)).err().expect("must fail");
        assert_eq!(
            err.downcast_ref::<FormatError>(),
            Some(&FormatError::ZeroBlockAlign)
        );
    }

    #[test]
    fn end_of_data_returns_zero_frames() -> Result<()> {
        let info = StreamInfo::pcm(2, 48000, 16);
        let data = stereo_16(&[(1, 1), (2, 2), (3, 3)]);
        let mut reader = WavReader::new(Cursor::new(build_wave(&info, &[], &data)))?;

        let mut channels = vec![vec![0.0f32; 2]; 2];
        assert_eq!(reader.read_block(&mut channels, 2)?, 2);
        assert_eq!(reader.read_block(&mut channels, 2)?, 1);
        assert_eq!(channels[0][0], 3.0 / 32768.0);
        assert_eq!(reader.read_block(&mut channels, 2)?, 0);
        assert_eq!(reader.read_block(&mut channels, 2)?, 0);
        assert_eq!(reader.frames_read(), 3);
        Ok(())
    }

    #[test]
    fn truncated_data_is_a_short_read() -> Result<()> {
        let info = StreamInfo::pcm(2, 48000, 16);
        let mut bytes = build_wave(&info, &[], &stereo_16(&[(1, 1); 8]));
        bytes.truncate(bytes.len() - 6);

        let mut reader = WavReader::new(Cursor::new(bytes))?;
        let mut channels = vec![vec![0.0f32; 8]; 2];
        let err = reader.read_block(&mut channels, 8).unwrap_err();
        assert_eq!(
            err.downcast_ref::<StreamError>(),
            Some(&StreamError::ShortRead {
                expected: 32,
                read: 26
            })
        );
        assert_eq!(reader.frames_read(), 0);
        Ok(())
    }

    #[test]
    fn strict_parser_rejects_truncated_data() {
        let info = StreamInfo::pcm(2, 48000, 16);
        let mut bytes = build_wave(&info, &[], &stereo_16(&[(1, 1); 8]));
        bytes.truncate(bytes.len() - 6);

        let mut parser = HeaderParser::default();
        parser.set_fail_level(Level::Warn);
        let err = WavReader::with_parser(Cursor::new(bytes), &parser)
            .err()
            .expect("must fail");
        assert!(err.downcast_ref::<HeaderWarning>().is_some());
    }

    #[test]
    fn skips_pad_after_odd_sized_fmt_chunk() -> Result<()> {
        let info = StreamInfo::pcm(2, 44100, 16);
        let mut fmt_payload = info.format_chunk().chunk_data();
        fmt_payload.push(0xAA);

        let mut body = Vec::new();
        body.extend_from_slice(WAVE_SIGNATURE);
        body.extend_from_slice(FMT_SIGNATURE);
        body.extend_from_slice(&17u32.to_le_bytes());
        body.extend_from_slice(&fmt_payload);
        body.push(0);
        body.extend_from_slice(DATA_SIGNATURE);
        body.extend_from_slice(&4u32.to_le_bytes());
        body.extend_from_slice(&stereo_16(&[(1200, -1200)]));

        let mut bytes = Vec::new();
        bytes.extend_from_slice(RIFF_SIGNATURE);
        bytes.extend_from_slice(&(body.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&body);

        let mut parser = HeaderParser::default();
        parser.set_fail_level(Level::Warn);
        let mut reader = WavReader::with_parser(Cursor::new(bytes), &parser)?;
        // 12 RIFF + 8 + 17 + 1 pad fmt + 8 data header
        assert_eq!(reader.data_offset(), 46);
        assert_eq!(reader.info().total_frames, 1);

        let mut channels = vec![vec![0.0f32; 1]; 2];
        assert_eq!(reader.read_block(&mut channels, 1)?, 1);
        assert_eq!(channels[0][0], 1200.0 / 32768.0);
        assert_eq!(channels[1][0], -1200.0 / 32768.0);
        Ok(())
    }

    #[test]
    fn header_checks_are_relative_to_parse_start() -> Result<()> {
        let info = StreamInfo::pcm(2, 48000, 16);
        let wave = build_wave(&info, &[], &stereo_16(&[(7, -7); 4]));

        let mut bytes = vec![0u8; 100];
        bytes.extend_from_slice(&wave);
        let mut cursor = Cursor::new(bytes);
        cursor.set_position(100);

        let mut parser = HeaderParser::default();
        parser.set_fail_level(Level::Warn);
        let header = parser.parse(&mut cursor)?;

        assert_eq!(header.data_offset, 144);
        assert_eq!(header.data_size, 16);
        assert_eq!(header.info.total_frames, 4);
        Ok(())
    }

    #[test]
    fn unsupported_sample_format_is_an_error() -> Result<()> {
        let info = StreamInfo::pcm(2, 48000, 32);
        let mut reader = WavReader::new(Cursor::new(build_wave(&info, &[], &[0u8; 16])))?;

        let mut channels = vec![vec![0.0f32; 2]; 2];
        let err = reader.read_block(&mut channels, 2).unwrap_err();
        assert_eq!(
            err.downcast_ref::<FormatError>(),
            Some(&FormatError::UnsupportedBitDepth(32))
        );
        Ok(())
    }

    #[test]
    fn decodes_24_bit_samples() -> Result<()> {
        let info = StreamInfo::pcm(2, 48000, 24);
        let data = [0xFF, 0xFF, 0x7F, 0x00, 0x00, 0x80];
        let mut reader = WavReader::new(Cursor::new(build_wave(&info, &[], &data)))?;

        let mut channels = vec![vec![0.0f32; 1]; 2];
        assert_eq!(reader.read_block(&mut channels, 1)?, 1);
        assert_eq!(channels[0][0], 8_388_607.0 / 8_388_608.0);
        assert_eq!(channels[1][0], -1.0);
        Ok(())
    }

    #[test]
    fn buffer_shape_is_checked() -> Result<()> {
        let info = StreamInfo::pcm(2, 48000, 16);
        let mut reader =
            WavReader::new(Cursor::new(build_wave(&info, &[], &stereo_16(&[(0, 0); 4]))))?;

        let mut three = vec![vec![0.0f32; 4]; 3];
        assert!(reader.read_block(&mut three, 4).is_err());

        let mut short = vec![vec![0.0f32; 2]; 2];
        let err = reader.read_block(&mut short, 4).unwrap_err();
        assert_eq!(
            err.downcast_ref::<StreamError>(),
            Some(&StreamError::BufferTooSmall {
                channel: 0,
                len: 2,
                required: 4
            })
        );
        assert_eq!(reader.frames_read(), 0);
        Ok(())
    }
}
