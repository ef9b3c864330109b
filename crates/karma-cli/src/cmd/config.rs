use crate::cmd::load_config;
use crate::output::{print_json, print_table, Align};
use clap::Subcommand;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the resolved role ladder, default role and storage path
    Show,

    /// Load the manifest and report whether it is valid
    Validate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(manifest: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(manifest, json),
        ConfigSubcommand::Validate => validate(manifest, json),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(manifest: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(manifest)?;

    if json {
        let value = serde_json::json!({
            "manifest": manifest,
            "thresholds": config.thresholds(),
            "default_role": config.default_role(),
            "storage_path": config.storage_path(),
        });
        print_json(&value)?;
        return Ok(());
    }

    println!("Manifest:     {}", manifest.display());
    println!("Storage:      {}", config.storage_path().display());
    println!("Default role: {}", config.default_role());
    println!();
    let rows: Vec<Vec<String>> = config
        .thresholds()
        .iter()
        .map(|t| vec![t.role.clone(), t.threshold.to_string()])
        .collect();
    print_table(&[("ROLE", Align::Left), ("THRESHOLD", Align::Right)], &rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(manifest: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(manifest)?;

    if json {
        let value = serde_json::json!({
            "valid": true,
            "roles": config.thresholds().len(),
        });
        print_json(&value)?;
        return Ok(());
    }

    println!(
        "Config OK: {} role(s), default '{}'",
        config.thresholds().len(),
        config.default_role()
    );
    Ok(())
}
