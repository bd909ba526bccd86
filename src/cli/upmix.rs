use std::time::Instant;

use amx::process::upmix::upmix_file;
use amx::wav::{HeaderParser, read_header};
use anyhow::Result;
use indicatif::MultiProgress;
use log::Level;

use super::command::{Cli, UpmixArgs};
use super::config::resolve_config;
use super::progress::{create_progress_bar, finalize_progress_bar};
use crate::timestamp::time_str;

pub fn cmd_upmix(args: &UpmixArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    log::info!(
        "Upmixing {} -> {} (strict mode: {})",
        args.input.display(),
        args.output.display(),
        cli.strict
    );

    let config = resolve_config(args)?;

    let mut parser = HeaderParser::default();
    parser.set_fail_level(if cli.strict { Level::Warn } else { Level::Error });

    let pb = match multi {
        Some(multi) => {
            let input = read_header(&args.input, &parser)?;
            Some(create_progress_bar(multi, input.total_frames)?)
        }
        None => None,
    };

    let start_time = Instant::now();
    let result = upmix_file(&args.input, &args.output, &config, &parser, |frames| {
        if let Some(pb) = &pb {
            pb.set_position(frames);
        }
    });

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            if let Some(pb) = &pb {
                pb.abandon_with_message("upmix failed");
            }
            return Err(e);
        }
    };

    finalize_progress_bar(&pb, &report, start_time);

    log::info!(
        "Wrote {} frames ({}) of {}-channel {}-bit audio to {}",
        report.frames,
        time_str(report.output.duration_secs()),
        report.output.channels,
        report.output.bit_depth,
        args.output.display()
    );

    Ok(())
}
