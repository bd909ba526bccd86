//! Low-frequency effects channel derived from a stereo pair.

use serde::Deserialize;

use super::filter::OnePole;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LfeParams {
    pub cutoff_hz: f32,
    pub gain: f32,
    /// High-pass L/R at the same cutoff once the LFE has been taken.
    pub highpass_mains: bool,
}

impl Default for LfeParams {
    fn default() -> Self {
        Self {
            cutoff_hz: 120.0,
            gain: 1.0,
            highpass_mains: false,
        }
    }
}

/// Low-passed mono sum scaled by a fixed gain.
///
/// Filter state lives for the whole stream; a new extractor is needed per
/// stream.
#[derive(Debug, Clone)]
pub struct LfeExtractor {
    lowpass: OnePole,
    mains: Option<[OnePole; 2]>,
    gain: f32,
}

impl LfeExtractor {
    pub fn new(params: LfeParams, sample_rate: u32) -> Self {
        let lowpass = OnePole::new(params.cutoff_hz, sample_rate);
        let mains = params.highpass_mains.then(|| [lowpass, lowpass]);

        log::debug!(
            "LFE low-pass at {} Hz (alpha = {:.6}), gain {}",
            params.cutoff_hz,
            lowpass.alpha(),
            params.gain
        );

        Self {
            lowpass,
            mains,
            gain: params.gain,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.lowpass.alpha()
    }

    /// Writes `frames` LFE samples derived from `left`/`right`.
    ///
    /// With `highpass_mains` set, L/R are high-passed in place afterwards.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32], lfe: &mut [f32], frames: usize) {
        let lfe = &mut lfe[..frames];
        for ((out, l), r) in lfe.iter_mut().zip(&left[..frames]).zip(&right[..frames]) {
            *out = 0.5 * (l + r);
        }

        self.lowpass.lowpass(lfe);

        for sample in lfe.iter_mut() {
            *sample *= self.gain;
        }

        if let Some([left_hp, right_hp]) = &mut self.mains {
            left_hp.highpass(&mut left[..frames]);
            right_hp.highpass(&mut right[..frames]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::filter::{FilterState, alpha, lowpass_block};

    #[test]
    fn lfe_is_filtered_mono_times_gain() {
        let params = LfeParams {
            cutoff_hz: 80.0,
            gain: 0.5,
            highpass_mains: false,
        };
        let mut left: Vec<f32> = (0..64).map(|i| (i as f32 * 0.1).sin()).collect();
        let mut right: Vec<f32> = (0..64).map(|i| (i as f32 * 0.05).cos()).collect();
        let (l0, r0) = (left.clone(), right.clone());

        let mut lfe = vec![0.0; 64];
        LfeExtractor::new(params, 48000).process(&mut left, &mut right, &mut lfe, 64);

        let mut expected: Vec<f32> = l0.iter().zip(&r0).map(|(l, r)| 0.5 * (l + r)).collect();
        lowpass_block(&mut expected, &mut FilterState::default(), alpha(80.0, 48000.0));

        for (got, want) in lfe.iter().zip(&expected) {
            assert!((got - want * 0.5).abs() < 1e-6);
        }
        assert_eq!(left, l0);
        assert_eq!(right, r0);
    }

    #[test]
    fn filter_state_persists_between_blocks() {
        let params = LfeParams::default();
        let mut left = vec![1.0f32; 32];
        let mut right = vec![1.0f32; 32];

        let mut one_shot = vec![0.0; 32];
        LfeExtractor::new(params, 44100).process(&mut left, &mut right, &mut one_shot, 32);

        let mut extractor = LfeExtractor::new(params, 44100);
        let mut blocked = vec![0.0; 32];
        let (first, second) = blocked.split_at_mut(16);
        extractor.process(&mut left[..16], &mut right[..16], first, 16);
        extractor.process(&mut left[16..], &mut right[16..], second, 16);

        assert_eq!(one_shot, blocked);
        assert!(blocked[31] > blocked[15]);
    }

    #[test]
    fn highpass_mains_removes_bass_from_front_pair() {
        let params = LfeParams {
            highpass_mains: true,
            ..Default::default()
        };
        let mut left = vec![0.5f32; 8192];
        let mut right = vec![0.5f32; 8192];
        let mut lfe = vec![0.0; 8192];
        LfeExtractor::new(params, 8000).process(&mut left, &mut right, &mut lfe, 8192);

        assert!((lfe[8191] - 0.5).abs() < 1e-4);
        assert!(left[8191].abs() < 1e-4);
        assert!(right[8191].abs() < 1e-4);
        assert!((left[0] + lfe[0] - 0.5).abs() < 1e-6);
    }
}
