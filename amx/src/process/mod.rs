/// Run parameters and output layouts.
///
/// Provides [`UpmixConfig`](config::UpmixConfig) and
/// [`ChannelLayout`](config::ChannelLayout).
pub mod config;

/// Block pipeline from a stereo reader to a multi-channel writer.
///
/// Provides the [`Upmixer`](upmix::Upmixer) and the [`upmix_file`](upmix::upmix_file)
/// convenience wrapper.
pub mod upmix;
