use std::fs;
use std::path::Path;

use amx::process::config::UpmixConfig;
use anyhow::{Context, Result};

use super::command::UpmixArgs;

/// Loads an upmix preset from a YAML file.
pub fn load_preset(path: &Path) -> Result<UpmixConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read preset {}", path.display()))?;
    serde_yaml_ng::from_str(&text)
        .with_context(|| format!("Failed to parse preset {}", path.display()))
}

/// Preset (or defaults) with the flags given on the command line applied on top.
pub fn resolve_config(args: &UpmixArgs) -> Result<UpmixConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading preset: {}", path.display());
            load_preset(path)?
        }
        None => UpmixConfig::default(),
    };

    apply_overrides(&mut config, args);
    log::debug!("Upmix configuration: {config:?}");

    Ok(config)
}

fn apply_overrides(config: &mut UpmixConfig, args: &UpmixArgs) {
    if let Some(layout) = args.layout {
        config.layout = layout.into();
    }
    if let Some(bit_depth) = args.bit_depth {
        config.bit_depth = bit_depth.bits();
    }
    if let Some(block_size) = args.block_size {
        config.block_size = block_size;
    }
    if let Some(mode) = args.centre_mode {
        config.centre.mode = mode.into();
    }
    if let Some(gain) = args.centre_gain {
        config.centre.gain = gain;
    }
    if let Some(amount) = args.subtract_amount {
        config.centre.subtract_amount = amount;
    }
    if let Some(factor) = args.steer_factor {
        config.centre.steer_factor = factor;
    }
    if let Some(cutoff) = args.lfe_cutoff {
        config.lfe.cutoff_hz = cutoff;
    }
    if let Some(gain) = args.lfe_gain {
        config.lfe.gain = gain;
    }
    if args.highpass_mains {
        config.lfe.highpass_mains = true;
    }
    if args.no_highpass_mains {
        config.lfe.highpass_mains = false;
    }
}
