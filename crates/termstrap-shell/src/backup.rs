use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// When [`crate::BlockEditor`] snapshots an existing file before writing it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupPolicy {
    /// Only when an existing managed block is about to be replaced or
    /// removed. Pure appends to an untouched file are not snapshotted.
    #[default]
    OnReplace,
    /// Before every write to a pre-existing, non-empty file.
    Always,
}

/// `<path>.bak.<YYYYMMDDHHMMSS>`
#[must_use]
pub fn backup_path(path: &Path, now: NaiveDateTime) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak.");
    name.push(now.format(BACKUP_TIMESTAMP_FORMAT).to_string());
    PathBuf::from(name)
}

fn numbered(base: &Path, n: u32) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(format!(".{n}"));
    PathBuf::from(name)
}

pub fn snapshot(path: &Path) -> io::Result<Option<PathBuf>> {
    snapshot_at(path, Local::now().naive_local())
}

/// Copy `path` byte-for-byte to its timestamped backup name, keeping its
/// permissions. Returns `None` when `path` does not exist.
///
/// An existing backup is never overwritten. If the same-second name is
/// already taken by identical bytes that snapshot is returned as is;
/// otherwise `.1`, `.2`, ... is appended until a free name is found.
pub fn snapshot_at(path: &Path, now: NaiveDateTime) -> io::Result<Option<PathBuf>> {
    snapshot_as(path, path, now)
}

/// Snapshot `source` under the backup name derived from `named_after`. Used
/// for symlinked startup files: the bytes come from the link target, the
/// backup sits next to the link.
pub(crate) fn snapshot_as(
    source: &Path,
    named_after: &Path,
    now: NaiveDateTime,
) -> io::Result<Option<PathBuf>> {
    let contents = match fs::read(source) {
        Ok(contents) => contents,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(error),
    };
    let permissions = fs::metadata(source)?.permissions();

    let base = backup_path(named_after, now);
    let mut attempt = 0;
    loop {
        let candidate = if attempt == 0 {
            base.clone()
        } else {
            numbered(&base, attempt)
        };

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(mut file) => {
                file.write_all(&contents)?;
                file.sync_all()?;
                drop(file);
                fs::set_permissions(&candidate, permissions)?;
                log::info!("Backed up {} to {}", named_after.display(), candidate.display());
                return Ok(Some(candidate));
            }
            Err(error) if error.kind() == io::ErrorKind::AlreadyExists => {
                if fs::read(&candidate).is_ok_and(|existing| existing == contents) {
                    log::debug!("Reusing identical backup {}", candidate.display());
                    return Ok(Some(candidate));
                }
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

/// Replace `path` with `contents` via a sibling temporary file and a rename,
/// so readers see either the old or the new file. The temporary file takes
/// the permissions of the file it replaces.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = tempfile::Builder::new()
        .prefix(".termstrap-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;

    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(temp.path(), metadata.permissions())?;
    }

    temp.persist(path).map_err(|error| error.error)?;
    Ok(())
}
