use anyhow::Result;
use clap::Parser as ClapParser;
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;

use cli::command::{Cli, Commands, LogFormat};
use cli::info::cmd_info;
use cli::upmix::cmd_upmix;

mod cli;
pub(crate) mod timestamp;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let base_level = cli.loglevel.to_level_filter();

    let multi = MultiProgress::new();

    let mut env_builder = env_logger::Builder::from_default_env();
    env_builder.filter_level(base_level);
    match cli.log_format {
        LogFormat::Plain => {
            env_builder.format_timestamp_secs();
        }
        LogFormat::Json => {
            env_builder.format(|buf, record| {
                use std::io::Write;
                let line = json_record(
                    &buf.timestamp().to_string(),
                    record.level(),
                    &record.args().to_string(),
                );
                writeln!(buf, "{line}")
            });
        }
    }

    let pb = if cli.progress {
        let logger = env_builder.build();
        LogWrapper::new(multi.clone(), logger).try_init()?;
        Some(&multi)
    } else {
        env_builder.try_init()?;
        None
    };

    let result = match cli.command {
        Commands::Upmix(ref args) => cmd_upmix(args, &cli, pb),
        Commands::Info(ref args) => cmd_info(args, &cli),
    };

    if let Err(e) = result {
        log::error!("{e:#}");
        std::process::exit(1);
    }

    Ok(())
}

/// One log record as a JSON object with `ts`, `lvl` and `msg` keys.
fn json_record(timestamp: &str, level: log::Level, message: &str) -> String {
    serde_json::json!({
        "ts": timestamp,
        "lvl": level.as_str(),
        "msg": message,
    })
    .to_string()
}
