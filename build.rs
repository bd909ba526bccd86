use anyhow::{Context, Result, bail};
use chrono::TimeZone;
use std::env;
use std::fs;
use std::process::Command;
use vergen_gitcl::{Emitter, GitclBuilder};

fn main() -> Result<()> {
    let gitcl = GitclBuilder::default()
        .describe(true, true, Some("[0-9]*"))
        .build()?;

    let gitcl_res = Emitter::default()
        .idempotent()
        .fail_on_error()
        .add_instructions(&gitcl)
        .and_then(|emitter| emitter.emit());

    if let Err(e) = gitcl_res {
        eprintln!("error occurred while generating instructions: {e:?}");
        Emitter::default().idempotent().fail_on_error().emit()?;
    }

    let now = build_time()?;
    println!(
        "cargo:rustc-env=BUILD_TIMESTAMP={}",
        now.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let amx_version = amx_version_from_metadata()
        .or_else(|_| amx_version_from_manifest())
        .unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=AMX_VERSION={amx_version}");

    println!("cargo:rerun-if-changed=amx/Cargo.toml");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    Ok(())
}

/// Honors `SOURCE_DATE_EPOCH` for reproducible builds.
fn build_time() -> Result<chrono::DateTime<chrono::Utc>> {
    match env::var("SOURCE_DATE_EPOCH") {
        Ok(val) => {
            let secs = val
                .parse::<i64>()
                .context("SOURCE_DATE_EPOCH is not an integer")?;
            chrono::Utc
                .timestamp_opt(secs, 0)
                .single()
                .context("SOURCE_DATE_EPOCH is out of range")
        }
        Err(_) => Ok(chrono::Utc::now()),
    }
}

/// Version of the `amx` package as resolved by cargo.
fn amx_version_from_metadata() -> Result<String> {
    let output = Command::new("cargo")
        .args(["metadata", "--format-version", "1", "--no-deps"])
        .output()?;

    if !output.status.success() {
        bail!("cargo metadata failed");
    }

    let metadata: serde_json::Value = serde_json::from_slice(&output.stdout)?;

    metadata["packages"]
        .as_array()
        .into_iter()
        .flatten()
        .find(|package| package["name"].as_str() == Some("amx"))
        .and_then(|package| package["version"].as_str())
        .map(str::to_string)
        .context("amx package not found in metadata")
}

fn amx_version_from_manifest() -> Result<String> {
    let manifest = fs::read_to_string("amx/Cargo.toml")?;

    manifest
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("version") && line.contains('='))
        .and_then(|line| line.split_once('='))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .context("Could not find version in amx/Cargo.toml")
}
