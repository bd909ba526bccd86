/// One-pole low/high-pass recursion with state carried across blocks.
///
/// Provides [`OnePole`](filter::OnePole) and the block functions it wraps.
pub mod filter;

/// Centre channel extraction.
///
/// Provides the [`CentreExtractor`](centre::CentreExtractor), configured by
/// [`CentreMode`](centre::CentreMode).
pub mod centre;

/// LFE channel extraction.
///
/// Provides the [`LfeExtractor`](lfe::LfeExtractor), which owns the
/// persistent low-pass state for one stream.
pub mod lfe;
