use crate::cmd::{describe, open_manager};
use crate::output::print_json;
use anyhow::Context;
use std::path::Path;

pub fn run(manifest: &Path, username: &str, points: i64, json: bool) -> anyhow::Result<()> {
    if username.trim().is_empty() {
        anyhow::bail!("username must not be empty");
    }

    let mut manager = open_manager(manifest)?;
    let before = manager.get_profile(username);
    let profile = manager
        .award(username, points)
        .with_context(|| format!("failed to award karma to '{username}'"))?;

    if json {
        let value = serde_json::json!({
            "profile": profile,
            "points": points,
            "previous_role": before.role,
        });
        print_json(&value)?;
        return Ok(());
    }

    println!("{}", describe(&profile));
    if before.role != profile.role {
        println!("  role changed: {} -> {}", before.role, profile.role);
    }
    Ok(())
}
