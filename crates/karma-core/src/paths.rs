use std::path::{Component, Path, PathBuf};

// ---------------------------------------------------------------------------
// File constants
// ---------------------------------------------------------------------------

/// Manifest location relative to a project root.
pub const MANIFEST_FILE: &str = "config/karma.yaml";

/// Store file name used when the manifest has no `storage.path`.
pub const STORE_FILE: &str = "karma_state.json";

pub const TEMP_SUFFIX: &str = ".tmp";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(MANIFEST_FILE)
}

pub fn default_store_path(manifest_dir: &Path) -> PathBuf {
    manifest_dir.join(STORE_FILE)
}

/// Prefix for temp siblings of `target`: `.karma_state.json.`
pub fn temp_prefix(target: &Path) -> String {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(".{name}.")
}

/// Remove `.` and `..` components without touching the filesystem.
///
/// `..` past the root is dropped, so `/a/../../b` becomes `/b`.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
