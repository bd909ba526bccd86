use std::io::{Read, Seek, Write};
use std::path::Path;

use anyhow::{Result, bail};
use log::{info, warn};

use super::config::UpmixConfig;
use crate::dsp::centre::CentreExtractor;
use crate::dsp::lfe::LfeExtractor;
use crate::utils::errors::{FormatError, StreamError};
use crate::wav::{HeaderParser, StreamInfo, WavReader, WavWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Streaming,
    Done,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpmixReport {
    pub frames: u64,
    pub input: StreamInfo,
    pub output: StreamInfo,
    pub clipped_samples: u64,
}

/// Streams a stereo input through channel derivation into a wider output.
///
/// Buffers and filter state are allocated once and live for one stream. Each
/// block runs in input order: LFE from the L/R as read, then centre extraction,
/// then the write.
pub struct Upmixer {
    config: UpmixConfig,
    input: StreamInfo,
    output: StreamInfo,
    centre: Option<CentreExtractor>,
    lfe: Option<LfeExtractor>,
    buffers: Vec<Vec<f32>>,
    frames: u64,
    state: PipelineState,
}

impl Upmixer {
    /// Builds the pipeline for `input`, which must be decodable stereo PCM.
    pub fn new(config: UpmixConfig, input: &StreamInfo) -> Result<Self> {
        if input.channels != 2 {
            bail!(FormatError::NotStereo(input.channels));
        }
        input.ensure_decodable()?;
        config.validate(input)?;

        let layout = config.layout;
        let output = StreamInfo::pcm(layout.output_channels(), input.sample_rate, config.bit_depth);

        let centre = layout
            .centre_index()
            .map(|_| CentreExtractor::new(config.centre));
        let lfe = layout
            .lfe_index()
            .map(|_| LfeExtractor::new(config.lfe, input.sample_rate));

        let buffers = vec![vec![0.0; config.block_size]; output.channels as usize];

        info!(
            "Upmixing {} Hz {}-bit stereo to {} ({} channels, {}-bit)",
            input.sample_rate, input.bit_depth, layout, output.channels, output.bit_depth
        );

        Ok(Self {
            config,
            input: *input,
            output,
            centre,
            lfe,
            buffers,
            frames: 0,
            state: PipelineState::Streaming,
        })
    }

    pub fn config(&self) -> &UpmixConfig {
        &self.config
    }

    /// Layout of the output stream.
    pub fn output_info(&self) -> &StreamInfo {
        &self.output
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Runs until the reader is exhausted.
    ///
    /// `progress` is called once per written block with the number of frames
    /// processed so far. Any failure aborts the run; the writer is left
    /// unfinished.
    pub fn run<R, W, F>(
        &mut self,
        reader: &mut WavReader<R>,
        writer: &mut WavWriter<W>,
        mut progress: F,
    ) -> Result<UpmixReport>
    where
        R: Read + Seek,
        W: Write + Seek,
        F: FnMut(u64),
    {
        if writer.info().channels != self.output.channels {
            bail!(StreamError::ChannelCountMismatch {
                expected: self.output.channels as usize,
                actual: writer.info().channels as usize,
            });
        }

        while self.state == PipelineState::Streaming {
            self.state = self.step(reader, writer)?;
            if self.state == PipelineState::Streaming {
                progress(self.frames);
            }
        }

        let clipped_samples = writer.stats().clipped_samples;
        if clipped_samples > 0 {
            warn!("{clipped_samples} samples clipped");
        }
        info!("Processed {} frames", self.frames);

        Ok(UpmixReport {
            frames: self.frames,
            input: self.input,
            output: StreamInfo {
                total_frames: self.frames,
                ..self.output
            },
            clipped_samples,
        })
    }

    fn step<R, W>(
        &mut self,
        reader: &mut WavReader<R>,
        writer: &mut WavWriter<W>,
    ) -> Result<PipelineState>
    where
        R: Read + Seek,
        W: Write + Seek,
    {
        let frames = reader.read_block(&mut self.buffers[..2], self.config.block_size)?;
        if frames == 0 {
            return Ok(PipelineState::Done);
        }

        self.derive(frames);
        writer.write_block(&self.buffers, frames)?;

        self.frames += frames as u64;
        log::trace!("Block of {frames} frames written, {} total", self.frames);

        Ok(PipelineState::Streaming)
    }

    fn derive(&mut self, frames: usize) {
        let layout = self.config.layout;
        let (front, derived) = self.buffers.split_at_mut(2);
        let (left, right) = front.split_at_mut(1);
        let (left, right) = (&mut left[0], &mut right[0]);

        if let (Some(lfe), Some(index)) = (&mut self.lfe, layout.lfe_index()) {
            lfe.process(left, right, &mut derived[index - 2], frames);
        }

        if let (Some(centre), Some(index)) = (&self.centre, layout.centre_index()) {
            centre.process(left, right, &mut derived[index - 2], frames);
        }
    }
}

/// Upmixes the file at `input` into a new file at `output`.
///
/// The output is created only after the input header and `config` have been
/// accepted, and is finalized only when the whole stream went through.
pub fn upmix_file<P, Q, F>(
    input: P,
    output: Q,
    config: &UpmixConfig,
    parser: &HeaderParser,
    progress: F,
) -> Result<UpmixReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    F: FnMut(u64),
{
    let mut reader = WavReader::open_with_parser(input, parser)?;
    let mut upmixer = Upmixer::new(*config, reader.info())?;
    let mut writer = WavWriter::create(output, upmixer.output_info())?;

    let report = upmixer.run(&mut reader, &mut writer, progress)?;
    writer.close()?;

    Ok(report)
}
