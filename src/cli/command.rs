use std::path::PathBuf;

use amx::dsp::centre::CentreMode;
use amx::process::config::ChannelLayout;
use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};

#[derive(Debug, ClapParser)]
#[command(
    name         = env!("CARGO_PKG_NAME"),
    version      = env!("CARGO_PKG_VERSION"),
    long_version = concat!(
        env!("CARGO_PKG_VERSION"),
        "\namx library ", env!("AMX_VERSION"),
        "\nbuilt ", env!("BUILD_TIMESTAMP"),
    ),
    author       = env!("CARGO_PKG_AUTHORS"),
    about        = "Derive centre and LFE channels from stereo WAV audio",
    long_about   = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Treat header warnings as fatal errors.
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show progress bars during operations.
    #[arg(long, global = true)]
    pub progress: bool,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upmix a stereo WAV file.
    Upmix(UpmixArgs),

    /// Print stream information
    Info(InfoArgs),
}

/// Options left unset keep the value from `--config`, or the built-in default.
#[derive(Debug, Args)]
pub struct UpmixArgs {
    /// Input stereo WAV file.
    #[arg(value_name = "INPUT", default_value = "input.wav")]
    pub input: PathBuf,

    /// Output WAV file.
    #[arg(value_name = "OUTPUT", default_value = "output_2_1.wav")]
    pub output: PathBuf,

    /// YAML preset holding upmix parameters.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output channel layout [default: 2.1]
    #[arg(long, value_enum)]
    pub layout: Option<LayoutArg>,

    /// Output bit depth [default: 16]
    #[arg(long, value_enum)]
    pub bit_depth: Option<BitDepthArg>,

    /// Frames per processing block [default: 1024]
    #[arg(long, value_name = "FRAMES")]
    pub block_size: Option<usize>,

    /// Centre extraction mode [default: steered]
    #[arg(long, value_enum)]
    pub centre_mode: Option<CentreModeArg>,

    /// Gain applied to the centre channel [default: 1.0]
    #[arg(long, value_name = "GAIN")]
    pub centre_gain: Option<f32>,

    /// Share of the centre removed from L/R [default: 0.5]
    #[arg(long, value_name = "AMOUNT")]
    pub subtract_amount: Option<f32>,

    /// Steering sensitivity in steered mode [default: 1.5]
    #[arg(long, value_name = "FACTOR")]
    pub steer_factor: Option<f32>,

    /// LFE low-pass cutoff in Hz [default: 120]
    #[arg(long, value_name = "HZ")]
    pub lfe_cutoff: Option<f32>,

    /// Gain applied to the LFE channel [default: 1.0]
    #[arg(long, value_name = "GAIN")]
    pub lfe_gain: Option<f32>,

    /// High-pass L/R at the LFE cutoff [default: off]
    #[arg(long, overrides_with = "no_highpass_mains")]
    pub highpass_mains: bool,

    /// Leave L/R unfiltered, overriding a preset.
    #[arg(long, overrides_with = "highpass_mains")]
    pub no_highpass_mains: bool,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Input WAV file.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Only check the header; the result is reported through the exit code.
    #[arg(long)]
    pub verify: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Disable logging output.
    Off,
    /// No output except errors.
    Error,
    /// Show warnings and errors.
    Warn,
    /// Show info, warnings and errors (default).
    Info,
    /// Show debug, info, warnings and errors.
    Debug,
    /// Show all log messages including trace.
    Trace,
}

impl LogLevel {
    /// Convert LogLevel to log::LevelFilter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Colorized human-readable text.
    Plain,
    /// Structured JSON per log record.
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum LayoutArg {
    /// L R LFE
    #[value(name = "2.1")]
    TwoPointOne,
    /// L R C
    #[value(name = "3.0")]
    ThreePointZero,
    /// L R C LFE
    #[value(name = "3.1")]
    ThreePointOne,
}

impl From<LayoutArg> for ChannelLayout {
    fn from(layout: LayoutArg) -> Self {
        match layout {
            LayoutArg::TwoPointOne => ChannelLayout::TwoPointOne,
            LayoutArg::ThreePointZero => ChannelLayout::ThreePointZero,
            LayoutArg::ThreePointOne => ChannelLayout::ThreePointOne,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum BitDepthArg {
    /// 16-bit little-endian PCM.
    #[value(name = "16")]
    Pcm16,
    /// 24-bit little-endian PCM.
    #[value(name = "24")]
    Pcm24,
}

impl BitDepthArg {
    pub fn bits(self) -> u16 {
        match self {
            BitDepthArg::Pcm16 => 16,
            BitDepthArg::Pcm24 => 24,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum CentreModeArg {
    /// Emit the centre, leave L/R untouched.
    Passive,
    /// Always remove the centre from L/R.
    Fixed,
    /// Remove the centre scaled by the steering ratio.
    Steered,
}

impl From<CentreModeArg> for CentreMode {
    fn from(mode: CentreModeArg) -> Self {
        match mode {
            CentreModeArg::Passive => CentreMode::Passive,
            CentreModeArg::Fixed => CentreMode::Fixed,
            CentreModeArg::Steered => CentreMode::Steered,
        }
    }
}
