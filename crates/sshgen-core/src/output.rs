//! Managed file writing

use std::fs::{self, File, OpenOptions, TryLockError};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::OutputError;

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> OutputError + '_ {
    move |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// File the new contents replace
///
/// A symlinked destination is followed so the link itself survives.
fn resolve_target(path: &Path) -> io::Result<PathBuf> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => fs::canonicalize(path),
        _ => Ok(path.to_path_buf()),
    }
}

/// Replace `path` with `contents`
///
/// The contents go to a temporary file next to the destination which is
/// then renamed over it, so readers see either the old or the new file.
/// Symlinks are followed and an existing file keeps its permissions; a new
/// file is created owner-only.
///
/// # Errors
/// Returns an error if the directory is not writable, a symlinked
/// destination cannot be resolved, or the rename fails.
pub fn write_managed(path: &Path, contents: &str) -> Result<(), OutputError> {
    let target = resolve_target(path).map_err(io_error(path))?;

    let mut tmp = NamedTempFile::new_in(parent_dir(&target)).map_err(io_error(path))?;
    if let Ok(meta) = fs::metadata(&target) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(io_error(path))?;
    }
    tmp.write_all(contents.as_bytes()).map_err(io_error(path))?;
    tmp.as_file().sync_all().map_err(io_error(path))?;
    tmp.persist(&target).map_err(|e| io_error(path)(e.error))?;

    debug!(path = %target.display(), bytes = contents.len(), "wrote managed file");
    Ok(())
}

/// Path of the lock file guarding `target`
///
/// Hidden, so `Include config.d/*` style globs never pick it up.
#[must_use]
pub fn lock_path(target: &Path) -> PathBuf {
    let mut name = std::ffi::OsString::from(".");
    name.push(target.file_name().unwrap_or_default());
    name.push(".lock");
    target.with_file_name(name)
}

/// Exclusive advisory lock preventing overlapping runs on one destination
///
/// The lock file stays empty and is left in place; the lock itself is
/// released when this value is dropped or the process exits, however it
/// exits.
#[derive(Debug)]
pub struct LockFile {
    path: PathBuf,
    _file: File,
}

impl LockFile {
    /// Lock the file next to `target`, creating it if needed
    ///
    /// # Errors
    /// Returns [`OutputError::Locked`] if another process holds the lock, or
    /// an I/O error if the lock file cannot be opened.
    pub fn acquire(target: &Path) -> Result<Self, OutputError> {
        let path = lock_path(target);
        let file = match OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
        {
            Ok(file) => file,
            Err(source) => return Err(OutputError::Io { path, source }),
        };

        match file.try_lock() {
            Ok(()) => {
                debug!(path = %path.display(), "lock acquired");
                Ok(Self { path, _file: file })
            }
            Err(TryLockError::WouldBlock) => Err(OutputError::Locked(path)),
            Err(TryLockError::Error(source)) => Err(OutputError::Io { path, source }),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netbox");
        fs::write(&path, "manual edits\nthat are much longer than the new content\n").unwrap();

        write_managed(&path, "# new\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "# new\n");
        // no temporary files left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("netbox");

        let err = write_managed(&path, "x").unwrap_err();

        assert!(matches!(err, OutputError::Io { .. }));
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_follows_symlink_and_keeps_mode() {
        use std::os::unix::fs::{PermissionsExt, symlink};

        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        fs::write(&real, "old\n").unwrap();
        fs::set_permissions(&real, fs::Permissions::from_mode(0o644)).unwrap();
        let link = dir.path().join("netbox");
        symlink(&real, &link).unwrap();

        write_managed(&link, "# new\n").unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real).unwrap(), "# new\n");
        let mode = fs::metadata(&real).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netbox");

        write_managed(&path, "x").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_lock_path_is_hidden() {
        assert_eq!(
            lock_path(Path::new("/home/u/.ssh/config.d/netbox")),
            PathBuf::from("/home/u/.ssh/config.d/.netbox.lock")
        );
        assert_eq!(lock_path(Path::new("netbox")), PathBuf::from(".netbox.lock"));

        let name = lock_path(Path::new("config.d/netbox"));
        assert!(name.file_name().unwrap().to_str().unwrap().starts_with('.'));
    }

    #[test]
    fn test_lock_file_stays_empty() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("netbox");

        let lock = LockFile::acquire(&target).unwrap();

        assert_eq!(fs::read(lock.path()).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_lock_is_exclusive_and_released() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("netbox");

        let lock = LockFile::acquire(&target).unwrap();
        assert!(matches!(
            LockFile::acquire(&target),
            Err(OutputError::Locked(_))
        ));

        drop(lock);
        assert!(LockFile::acquire(&target).is_ok());
    }

    #[test]
    fn test_leftover_lock_file_does_not_block() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("netbox");
        // file left behind by a run that was killed
        fs::write(lock_path(&target), "8515\n").unwrap();

        assert!(LockFile::acquire(&target).is_ok());
    }
}
