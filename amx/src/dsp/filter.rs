//! One-pole recursive filters.
//!
//! The low-pass recursion is `y[n] = y[n-1] + α·(x[n] − y[n-1])` with
//! `α = 1 − e^(−2π·fc/fs)`. The high-pass output is the residual `x[n] − y[n]`
//! of the same recursion. The previous output carries over between blocks, so
//! blocks must be fed in stream order.

use std::f32::consts::PI;

/// Recursion memory of a one-pole filter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterState {
    pub previous_output: f32,
}

/// Smoothing coefficient for a cutoff of `cutoff_hz` at `sample_rate` Hz.
pub fn alpha(cutoff_hz: f32, sample_rate: f32) -> f32 {
    1.0 - (-2.0 * PI * cutoff_hz / sample_rate).exp()
}

/// Low-passes `block` in place.
pub fn lowpass_block(block: &mut [f32], state: &mut FilterState, alpha: f32) {
    let mut y_prev = state.previous_output;

    for sample in block.iter_mut() {
        let y = y_prev + alpha * (*sample - y_prev);
        *sample = y;
        y_prev = y;
    }

    state.previous_output = y_prev;
}

/// High-passes `block` in place.
pub fn highpass_block(block: &mut [f32], state: &mut FilterState, alpha: f32) {
    let mut y_prev = state.previous_output;

    for sample in block.iter_mut() {
        let x = *sample;
        let y = y_prev + alpha * (x - y_prev);
        *sample = x - y;
        y_prev = y;
    }

    state.previous_output = y_prev;
}

/// A one-pole filter with its coefficient fixed for the life of a stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OnePole {
    alpha: f32,
    state: FilterState,
}

impl OnePole {
    pub fn new(cutoff_hz: f32, sample_rate: u32) -> Self {
        Self::from_alpha(alpha(cutoff_hz, sample_rate as f32))
    }

    pub fn from_alpha(alpha: f32) -> Self {
        Self {
            alpha,
            state: FilterState::default(),
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn state(&self) -> FilterState {
        self.state
    }

    pub fn lowpass(&mut self, block: &mut [f32]) {
        lowpass_block(block, &mut self.state, self.alpha);
    }

    pub fn highpass(&mut self, block: &mut [f32]) {
        highpass_block(block, &mut self.state, self.alpha);
    }

    pub fn reset(&mut self) {
        self.state = FilterState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_matches_closed_form() {
        let a = alpha(120.0, 48000.0);
        let expected = 1.0 - (-2.0 * std::f64::consts::PI * 120.0 / 48000.0).exp();
        assert!((a as f64 - expected).abs() < 1e-6);
        assert!(a > 0.0 && a < 1.0);
    }

    #[test]
    fn lowpass_step_response() {
        let a = 0.1f32;
        let x = 0.8f32;
        let mut block = vec![x; 64];
        let mut state = FilterState::default();
        lowpass_block(&mut block, &mut state, a);

        let mut previous = 0.0f32;
        for (i, &y) in block.iter().enumerate() {
            let n = (i + 1) as i32;
            let expected = x * (1.0 - (1.0 - a).powi(n));
            assert!((y - expected).abs() < 1e-5, "n={n}: {y} vs {expected}");
            assert!(y > previous && y <= x);
            previous = y;
        }
        assert_eq!(state.previous_output, block[63]);
    }

    #[test]
    fn state_carries_across_blocks() {
        let a = alpha(200.0, 44100.0);
        let input: Vec<f32> = (0..256).map(|i| ((i * 7) % 13) as f32 / 13.0 - 0.5).collect();

        let mut whole = input.clone();
        OnePole::from_alpha(a).lowpass(&mut whole);

        let mut split = input.clone();
        let mut filter = OnePole::from_alpha(a);
        let (first, second) = split.split_at_mut(100);
        filter.lowpass(first);
        filter.lowpass(second);

        assert_eq!(whole, split);
    }

    #[test]
    fn highpass_is_residual_of_lowpass() {
        let a = alpha(500.0, 48000.0);
        let input: Vec<f32> = (0..128).map(|i| (i as f32 * 0.3).sin()).collect();

        let mut low = input.clone();
        let mut high = input.clone();
        let mut lp_state = FilterState::default();
        let mut hp_state = FilterState::default();
        lowpass_block(&mut low, &mut lp_state, a);
        highpass_block(&mut high, &mut hp_state, a);

        for ((x, l), h) in input.iter().zip(&low).zip(&high) {
            assert!((x - l - h).abs() < 1e-6);
        }
        assert_eq!(lp_state, hp_state);
    }

    #[test]
    fn highpass_rejects_dc() {
        let mut filter = OnePole::new(120.0, 8000);
        let mut block = vec![1.0f32; 4096];
        filter.highpass(&mut block);
        assert!(block[4095].abs() < 1e-4);

        filter.reset();
        assert_eq!(filter.state(), FilterState::default());
    }
}
