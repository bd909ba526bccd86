use std::time::Instant;

use amx::process::upmix::UpmixReport;
use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::timestamp::time_str;

pub fn create_progress_bar(multi: &MultiProgress, total_frames: u64) -> Result<ProgressBar> {
    let pb = multi.add(ProgressBar::new(total_frames));
    pb.set_style(ProgressStyle::with_template(
        "{bar:40.cyan/blue} {pos}/{len} frames ({percent}%)\n{msg} | elapsed: {elapsed_precise} | ETA: {eta_precise}",
    )?);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message("upmixing");
    Ok(pb)
}

pub fn finalize_progress_bar(pb: &Option<ProgressBar>, report: &UpmixReport, start_time: Instant) {
    if let Some(pb) = pb {
        let elapsed = start_time.elapsed();
        let audio_duration_secs = report.output.duration_secs();
        let realtime_multiplier = audio_duration_secs / elapsed.as_secs_f64();

        pb.set_style(
            ProgressStyle::with_template(
                "{bar:40.cyan/blue} {pos}/{len} frames ({percent}%)\n{msg} | elapsed: {elapsed_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        pb.finish_with_message(format!(
            "speed: {realtime_multiplier:.1}x | timestamp: {}",
            time_str(audio_duration_secs)
        ));
    }
}
