//! Stereo to multi-channel upmixing for RIFF/WAVE PCM streams.
//!
//! ## Technical Overview
//!
//! A stereo input is streamed in fixed-size blocks. For every block the
//! derived channels are computed from the L/R pair and the widened block is
//! written straight to the output, so memory use does not grow with the
//! stream length.
//!
//! ### Derived Channels
//!
//! - **Centre**: `gain · (L + R) / 2`, optionally removed from L/R
//!   (passive, fixed or steered)
//! - **LFE**: one-pole low-pass of `(L + R) / 2`, scaled by a gain
//!
//! ### Output Layouts
//!
//! - 2.1 (L R LFE)
//! - 3.0 (L R C)
//! - 3.1 (L R C LFE)
//!
//! ### Container
//!
//! 16- and 24-bit little-endian integer PCM. Unknown chunks are skipped on
//! input. On output the RIFF and data sizes are backpatched once the stream
//! is finished.
//!
//! ## Quick Start
//!
//! 1. Open the input with [`wav::WavReader`]
//! 2. Build an [`process::upmix::Upmixer`] from an [`process::config::UpmixConfig`]
//! 3. Create a [`wav::WavWriter`] for the upmixer's output layout and run
//!
//! ```rust,no_run
//! use amx::process::{config::UpmixConfig, upmix::Upmixer};
//! use amx::wav::{WavReader, WavWriter};
//!
//! let mut reader = WavReader::open("input.wav")?;
//! let mut upmixer = Upmixer::new(UpmixConfig::default(), reader.info())?;
//! let mut writer = WavWriter::create("output_2_1.wav", upmixer.output_info())?;
//!
//! let report = upmixer.run(&mut reader, &mut writer, |_frames| {})?;
//! writer.close()?;
//!
//! println!("{} frames, {} clipped samples", report.frames, report.clipped_samples);
//! # Ok::<(), anyhow::Error>(())
//! ```

/// Signal processing used to derive channels.
///
/// - **Filters** ([`dsp::filter`]): One-pole low/high-pass with block state
/// - **Centre** ([`dsp::centre`]): Centre extraction strategies
/// - **LFE** ([`dsp::lfe`]): Low-frequency channel extraction
pub mod dsp;

/// Processing pipeline.
///
/// 1. **Configuration** ([`process::config`]): Layouts and run parameters.
///
/// 2. **Upmixing** ([`process::upmix`]): Reads, derives and writes block by block.
pub mod process;

/// Utility functions and supporting infrastructure.
///
/// - **Byte Order** ([`utils::byteorder`]): Little-endian serialization
/// - **Error Handling** ([`utils::errors`]): Error types
pub mod utils;

/// RIFF/WAVE reading and writing.
pub mod wav;
