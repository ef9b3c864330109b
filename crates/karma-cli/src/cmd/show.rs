use crate::cmd::{describe, open_manager};
use crate::output::print_json;
use std::path::Path;

pub fn run(manifest: &Path, username: &str, json: bool) -> anyhow::Result<()> {
    let manager = open_manager(manifest)?;
    let profile = manager.get_profile(username);
    let next = manager
        .config()
        .thresholds()
        .iter()
        .find(|t| t.threshold > profile.karma);

    if json {
        let value = serde_json::json!({
            "profile": profile,
            "known": manager.contains(username),
            "next_role": next.map(|t| &t.role),
            "next_threshold": next.map(|t| t.threshold),
        });
        print_json(&value)?;
        return Ok(());
    }

    println!("{}", describe(&profile));
    if !manager.contains(username) {
        println!("  no karma recorded yet");
    }
    if let Some(tier) = next {
        println!(
            "  {} more to reach {}",
            tier.threshold.saturating_sub(profile.karma),
            tier.role
        );
    }
    Ok(())
}
