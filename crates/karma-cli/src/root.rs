use karma_core::paths;
use std::path::{Path, PathBuf};

/// Resolve the karma manifest path.
///
/// Priority:
/// 1. `--config` flag / `KARMA_CONFIG` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `config/karma.yaml`
/// 3. Fall back to `cwd/config/karma.yaml`, which the loader reports as missing
pub fn resolve_manifest(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_manifest_from(&cwd).unwrap_or_else(|| paths::manifest_path(&cwd))
}

fn find_manifest_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(paths::manifest_path)
        .find(|candidate| candidate.is_file())
}
