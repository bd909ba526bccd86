use std::fmt;

use anyhow::{Result, bail};
use serde::Deserialize;

use crate::dsp::centre::CentreParams;
use crate::dsp::lfe::LfeParams;
use crate::utils::errors::{ConfigError, FormatError};
use crate::wav::StreamInfo;

/// Largest accepted `block_size`, in frames.
pub const MAX_BLOCK_SIZE: usize = 1 << 20;

/// Channels appended after the input L/R pair, in WAVE speaker order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ChannelLayout {
    /// L R LFE
    #[default]
    #[serde(rename = "2.1")]
    TwoPointOne,
    /// L R C
    #[serde(rename = "3.0")]
    ThreePointZero,
    /// L R C LFE
    #[serde(rename = "3.1")]
    ThreePointOne,
}

impl ChannelLayout {
    pub fn derived_channels(&self) -> u16 {
        match self {
            Self::TwoPointOne | Self::ThreePointZero => 1,
            Self::ThreePointOne => 2,
        }
    }

    pub fn output_channels(&self) -> u16 {
        2 + self.derived_channels()
    }

    /// Output channel index of the centre, if the layout carries one.
    pub fn centre_index(&self) -> Option<usize> {
        match self {
            Self::TwoPointOne => None,
            Self::ThreePointZero | Self::ThreePointOne => Some(2),
        }
    }

    /// Output channel index of the LFE, if the layout carries one.
    pub fn lfe_index(&self) -> Option<usize> {
        match self {
            Self::TwoPointOne => Some(2),
            Self::ThreePointZero => None,
            Self::ThreePointOne => Some(3),
        }
    }
}

impl fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TwoPointOne => "2.1",
            Self::ThreePointZero => "3.0",
            Self::ThreePointOne => "3.1",
        };
        f.write_str(name)
    }
}

/// Parameters of one upmix run.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpmixConfig {
    pub layout: ChannelLayout,
    /// Output bit depth, 16 or 24.
    pub bit_depth: u16,
    /// Frames per processing block.
    pub block_size: usize,
    pub centre: CentreParams,
    pub lfe: LfeParams,
}

impl Default for UpmixConfig {
    fn default() -> Self {
        Self {
            layout: ChannelLayout::default(),
            bit_depth: 16,
            block_size: 1024,
            centre: CentreParams::default(),
            lfe: LfeParams::default(),
        }
    }
}

impl UpmixConfig {
    /// Checks the configuration against the input stream it will run on.
    pub fn validate(&self, input: &StreamInfo) -> Result<()> {
        if input.sample_rate == 0 {
            bail!(ConfigError::ZeroSampleRate);
        }

        if self.block_size == 0 {
            bail!(ConfigError::ZeroBlockSize);
        }

        if self.block_size > MAX_BLOCK_SIZE {
            bail!(ConfigError::BlockSizeTooLarge {
                block_size: self.block_size,
                max: MAX_BLOCK_SIZE,
            });
        }

        if self.bit_depth != 16 && self.bit_depth != 24 {
            bail!(FormatError::UnsupportedBitDepth(self.bit_depth));
        }

        if self.layout.centre_index().is_some() {
            check_parameter("centre gain", self.centre.gain)?;
            check_parameter("subtract amount", self.centre.subtract_amount)?;
            check_parameter("steer factor", self.centre.steer_factor)?;
        }

        if self.layout.lfe_index().is_some() {
            check_parameter("LFE gain", self.lfe.gain)?;

            let cutoff = self.lfe.cutoff_hz;
            let nyquist = input.sample_rate as f32 / 2.0;
            if !cutoff.is_finite() || cutoff <= 0.0 || cutoff >= nyquist {
                bail!(ConfigError::InvalidCutoff {
                    cutoff,
                    sample_rate: input.sample_rate,
                });
            }
        }

        Ok(())
    }
}

fn check_parameter(name: &'static str, value: f32) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        bail!(ConfigError::InvalidParameter { name, value });
    }
    Ok(())
}
