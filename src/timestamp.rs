/// Formats a duration in seconds as `HH:MM:SS.mmm`.
///
/// Hours widen past two digits instead of wrapping.
pub fn time_str(sec: f64) -> String {
    let total_ms = (sec.max(0.0) * 1000.0) as u64;
    let hours = total_ms / 3_600_000;
    let minutes = total_ms / 60_000 % 60;
    let seconds = total_ms / 1000 % 60;
    let milliseconds = total_ms % 1000;

    format!("{hours:02}:{minutes:02}:{seconds:02}.{milliseconds:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_frame_durations() {
        assert_eq!(time_str(0.0), "00:00:00.000");
        assert_eq!(time_str(1000.0 / 44100.0), "00:00:00.022");
        assert_eq!(time_str(3725.5), "01:02:05.500");
        assert_eq!(time_str(360_000.0), "100:00:00.000");
    }
}
