//! Atomic file writes for crash-safe persistence.
//!
//! Every persistence path (accounts, config, key file, legacy auth file)
//! goes through [`write`]:
//!
//! 1. Write to a temporary file in the same directory
//! 2. `sync_all()` the temporary file and restrict it to 0600
//! 3. Rename it over the target
//! 4. Fsync the parent directory (Unix only)
//!
//! A reader observes either the previous content or the new content, and a
//! failure at any step leaves the target untouched and removes the temp file.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use tracing::trace;

/// Atomically replace `path` with `data`, readable by the owner only.
///
/// # Errors
///
/// Returns the underlying I/O error. The previous content of `path`, if any,
/// is preserved on failure.
pub fn write(path: &Path, data: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("file");

    // Dropping the temp file on any early return deletes it.
    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{}.", file_name))
        .suffix(".tmp")
        .tempfile_in(parent)?;

    temp.write_all(data)?;
    temp.flush()?;
    temp.as_file().sync_all()?;
    set_owner_only(temp.path())?;

    temp.persist(path).map_err(|e| e.error)?;
    fsync_dir(parent)?;

    trace!(path = %path.display(), bytes = data.len(), "atomic write complete");
    Ok(())
}

/// Restrict a file to owner read/write (0600). No-op off Unix.
#[cfg(unix)]
pub fn set_owner_only(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
pub fn set_owner_only(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn fsync_dir(path: &Path) -> io::Result<()> {
    File::open(path)?.sync_all()
}

#[cfg(not(unix))]
fn fsync_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}
