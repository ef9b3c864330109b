pub mod award;
pub mod config;
pub mod leaderboard;
pub mod show;

use anyhow::Context;
use karma_core::{KarmaConfig, KarmaManager, KarmaProfile};
use std::path::Path;

pub(crate) fn load_config(manifest: &Path) -> anyhow::Result<KarmaConfig> {
    KarmaConfig::load(manifest)
        .with_context(|| format!("failed to load karma config from {}", manifest.display()))
}

pub(crate) fn open_manager(manifest: &Path) -> anyhow::Result<KarmaManager> {
    let config = load_config(manifest)?;
    let store = config.storage_path().to_path_buf();
    KarmaManager::open(config)
        .with_context(|| format!("failed to open karma store {}", store.display()))
}

/// `alice: 10 karma (specialist)`
pub(crate) fn describe(profile: &KarmaProfile) -> String {
    format!(
        "{}: {} karma ({})",
        profile.username, profile.karma, profile.role
    )
}
