use crate::error::Result;
use crate::paths;
use std::io::Write;
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

/// Atomically write `data` to `path` using a hidden tempfile in the same directory.
///
/// The temp sibling is named `.<file>.<random>.tmp` and is only renamed onto
/// `path` after every byte has been written and flushed. If anything fails
/// first, `path` keeps its previous contents and the temp file is removed.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let staged = stage(path, data)?;
    commit(staged, path)
}

/// Write `data` into a synced temp sibling of `path` without touching `path`.
///
/// Dropping the returned file deletes it.
pub fn stage(path: &Path, data: &[u8]) -> Result<NamedTempFile> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let prefix = paths::temp_prefix(path);
    let mut tmp = Builder::new()
        .prefix(&prefix)
        .suffix(paths::TEMP_SUFFIX)
        .tempfile_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

/// Rename a staged temp file onto `path`.
pub fn commit(staged: NamedTempFile, path: &Path) -> Result<()> {
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}
