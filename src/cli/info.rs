use amx::wav::{HeaderParser, StreamInfo, read_header};
use anyhow::Result;
use log::Level;

use super::command::{Cli, InfoArgs};
use crate::timestamp::time_str;

pub fn cmd_info(args: &InfoArgs, cli: &Cli) -> Result<()> {
    let mut parser = HeaderParser::default();
    parser.set_fail_level(if cli.strict { Level::Warn } else { Level::Error });

    let info = read_header(&args.input, &parser)?;

    if args.verify {
        log::info!("{}: valid WAVE header", args.input.display());
        return Ok(());
    }

    log::info!("Analyzing WAVE file: {}", args.input.display());
    display_info(&info);

    Ok(())
}

fn display_info(info: &StreamInfo) {
    let encoding = if info.is_pcm() { "PCM" } else { "unknown" };

    println!();
    println!("WAVE Stream Information");
    println!("=======================");
    println!();
    println!("Encoding                    {encoding} ({:#06X})", info.sample_encoding);
    println!("Channels                    {}", info.channels);
    println!("Sample rate                 {} Hz", info.sample_rate);
    println!("Bit depth                   {}", info.bit_depth);
    println!("Block align                 {} bytes", info.block_align);
    println!("Byte rate                   {} bytes/s", info.byte_rate);
    println!("Frames                      {}", info.total_frames);
    println!("Duration                    {}", time_str(info.duration_secs()));
    println!();

    if let Err(e) = info.ensure_decodable() {
        log::warn!("Stream cannot be upmixed: {e}");
    } else if info.channels != 2 {
        log::warn!("Stream cannot be upmixed: expected stereo input");
    }
}
