#[macro_export]
macro_rules! log_or_err {
    ($state:expr, $level:expr, $err:expr $(,)?) => {{
        if $level <= $state.fail_level {
            return Err($err.into());
        } else {
            match $level {
                ::log::Level::Error => ::log::error!("{}", $err),
                ::log::Level::Warn => ::log::warn!("{}", $err),
                ::log::Level::Info => ::log::info!("{}", $err),
                ::log::Level::Debug => ::log::debug!("{}", $err),
                ::log::Level::Trace => ::log::trace!("{}", $err),
            }
        }
    }};
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("Missing RIFF signature. Read {0:?}")]
    InvalidRiffSignature([u8; 4]),

    #[error("Missing WAVE form type. Read {0:?}")]
    InvalidWaveSignature([u8; 4]),

    #[error("Stream ended before the fmt chunk")]
    MissingFormatChunk,

    #[error("Stream ended before the data chunk")]
    MissingDataChunk,

    #[error("fmt chunk must hold at least 16 bytes. Read {0}")]
    FormatChunkTooShort(u32),

    #[error("block_align must not be zero")]
    ZeroBlockAlign,

    #[error("Channel count must not be zero")]
    ZeroChannels,

    #[error("Unsupported sample encoding {0:#06X}, only integer PCM (0x0001) is supported")]
    UnsupportedEncoding(u16),

    #[error("Unsupported bit depth {0}, expected 16 or 24")]
    UnsupportedBitDepth(u16),

    #[error("block_align {block_align} does not match {channels} channels of {bit_depth}-bit samples")]
    BlockAlignMismatch {
        block_align: u16,
        channels: u16,
        bit_depth: u16,
    },

    #[error("Expected stereo input, got {0} channels")]
    NotStereo(u16),
}

/// Non-fatal header anomalies. Promoted to errors in strict mode.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum HeaderWarning {
    #[error("byte_rate {read} does not match sample_rate * block_align = {expected}")]
    ByteRateMismatch { read: u32, expected: u64 },

    #[error("RIFF size {read} does not match stream length - 8 = {expected}")]
    RiffSizeMismatch { read: u32, expected: u64 },

    #[error("data chunk size {size} is not a multiple of block_align {block_align}")]
    PartialFrame { size: u32, block_align: u16 },

    #[error("data chunk claims {claimed} bytes but only {available} remain in the stream")]
    DataTruncated { claimed: u32, available: u64 },
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum StreamError {
    #[error("Short read in data chunk: expected {expected} bytes, got {read}")]
    ShortRead { expected: usize, read: usize },

    #[error("Expected {expected} channel buffers, got {actual}")]
    ChannelCountMismatch { expected: usize, actual: usize },

    #[error("Channel buffer {channel} holds {len} samples, {required} required")]
    BufferTooSmall {
        channel: usize,
        len: usize,
        required: usize,
    },

    #[error("Writer already finished")]
    WriterFinished,

    #[error("RIFF size overflow: {0} bytes do not fit a 32-bit size field")]
    SizeOverflow(u64),
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Cutoff {cutoff} Hz must lie between 0 and the Nyquist frequency of {sample_rate} Hz")]
    InvalidCutoff { cutoff: f32, sample_rate: u32 },

    #[error("Sample rate must not be zero")]
    ZeroSampleRate,

    #[error("Block size must not be zero")]
    ZeroBlockSize,

    #[error("Block size {block_size} exceeds the maximum of {max} frames")]
    BlockSizeTooLarge { block_size: usize, max: usize },

    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidParameter { name: &'static str, value: f32 },
}
