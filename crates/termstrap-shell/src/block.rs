use chrono::{Local, NaiveDateTime};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::backup::{BackupPolicy, snapshot_as, write_atomic};

/// Marker text never carries the version, so blocks written by older
/// releases stay detectable.
pub const BEGIN_MARKER: &str = "# >>> termstrap >>>";
pub const END_MARKER: &str = "# <<< termstrap <<<";

const ADDED_ON_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanDefect {
    #[error("begin marker on line {line} has no matching end marker")]
    UnterminatedBlock { line: usize },

    #[error("line {line} opens a second managed block")]
    DuplicateBlock { line: usize },

    #[error("end marker on line {line} has no begin marker before it")]
    OrphanEnd { line: usize },
}

#[derive(Error, Debug)]
pub enum BlockError {
    #[error("{} does not exist", path.display())]
    NotFound { path: PathBuf },

    #[error("Permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed managed block in {}: {defect}", path.display())]
    MalformedMarkerSpan { path: PathBuf, defect: SpanDefect },
}

impl BlockError {
    fn io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path }
            | Self::PermissionDenied { path }
            | Self::Io { path, .. }
            | Self::MalformedMarkerSpan { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    pub begin: String,
    pub end: String,
}

impl Markers {
    pub fn new(begin: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            begin: begin.into(),
            end: end.into(),
        }
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self::new(BEGIN_MARKER, END_MARKER)
    }
}

/// Byte range of a managed block, from the start of the begin-marker line
/// through the terminator of the end-marker line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub first_line: usize,
    pub last_line: usize,
}

/// Locate the single managed block in `content`.
///
/// Marker lines must match exactly once their `\n` or `\r\n` terminator is
/// stripped. Anything other than zero or one well-formed block is reported
/// as a [`SpanDefect`] instead of being repaired. The content does not have
/// to be UTF-8; bytes outside the block are never interpreted.
pub fn find_block(
    content: impl AsRef<[u8]>,
    markers: &Markers,
) -> Result<Option<Span>, SpanDefect> {
    let mut open: Option<(usize, usize)> = None;
    let mut found: Option<Span> = None;
    let mut offset = 0;

    for (index, raw) in content
        .as_ref()
        .split_inclusive(|&byte| byte == b'\n')
        .enumerate()
    {
        let line = index + 1;
        let text = raw.strip_suffix(b"\n").unwrap_or(raw);
        let text = text.strip_suffix(b"\r").unwrap_or(text);

        if text == markers.begin.as_bytes() {
            if open.is_some() || found.is_some() {
                return Err(SpanDefect::DuplicateBlock { line });
            }
            open = Some((offset, line));
        } else if text == markers.end.as_bytes() {
            let Some((start, first_line)) = open.take() else {
                return Err(SpanDefect::OrphanEnd { line });
            };
            found = Some(Span {
                start,
                end: offset + raw.len(),
                first_line,
                last_line: line,
            });
        }

        offset += raw.len();
    }

    if let Some((_, line)) = open {
        return Err(SpanDefect::UnterminatedBlock { line });
    }

    Ok(found)
}

/// Everything outside `span`, byte for byte.
fn without_span(content: &[u8], span: Option<Span>) -> Vec<u8> {
    match span {
        Some(span) => [&content[..span.start], &content[span.end..]].concat(),
        None => content.to_vec(),
    }
}

/// A computed, not yet written, change to one file.
#[derive(Debug, Clone)]
pub struct BlockEdit {
    pub original: Vec<u8>,
    pub modified: Vec<u8>,
    pub changes: Vec<String>,
    pub replaced: Option<Span>,
}

impl BlockEdit {
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    #[must_use]
    pub fn diff_preview(&self) -> String {
        if !self.has_changes() {
            return "No changes needed.".to_string();
        }

        let mut preview = String::new();
        for change in &self.changes {
            let _ = writeln!(preview, "+ {change}");
        }
        preview
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub path: PathBuf,
    pub created: bool,
    pub replaced: bool,
    pub backup: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub path: PathBuf,
    pub removed: bool,
    pub backup: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct BlockEditor {
    markers: Markers,
    tool_name: String,
    version: String,
    backup_policy: BackupPolicy,
}

impl BlockEditor {
    pub fn new(tool_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            markers: Markers::default(),
            tool_name: tool_name.into(),
            version: version.into(),
            backup_policy: BackupPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    #[must_use]
    pub fn with_backup_policy(mut self, policy: BackupPolicy) -> Self {
        self.backup_policy = policy;
        self
    }

    #[must_use]
    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    #[must_use]
    pub fn render_block<S: AsRef<str>>(&self, lines: &[S], added_on: NaiveDateTime) -> String {
        let mut block = String::new();
        let _ = writeln!(block, "{}", self.markers.begin);
        let _ = writeln!(block, "# {} {}", self.tool_name, self.version);
        let _ = writeln!(block, "# Added on: {}", added_on.format(ADDED_ON_FORMAT));
        for line in lines {
            let _ = writeln!(block, "{}", line.as_ref());
        }
        let _ = writeln!(block, "{}", self.markers.end);
        block
    }

    /// Compute the result of installing `lines` into `original`: any
    /// existing block is cut out, the remainder gets exactly one trailing
    /// newline (unless empty) and a fresh block is appended.
    pub fn plan_apply<S: AsRef<str>>(
        &self,
        original: impl AsRef<[u8]>,
        lines: &[S],
        now: NaiveDateTime,
    ) -> Result<BlockEdit, SpanDefect> {
        let original = original.as_ref();
        let span = find_block(original, &self.markers)?;

        let mut modified = without_span(original, span);
        if !modified.is_empty() && !modified.ends_with(b"\n") {
            modified.push(b'\n');
        }
        modified.extend_from_slice(self.render_block(lines, now).as_bytes());

        let mut changes = Vec::with_capacity(lines.len() + 1);
        changes.push(match span {
            Some(span) => format!(
                "Replace {} block (lines {}-{})",
                self.tool_name, span.first_line, span.last_line
            ),
            None => format!("Append {} block", self.tool_name),
        });
        changes.extend(lines.iter().map(|line| line.as_ref().to_string()));

        Ok(BlockEdit {
            original: original.to_vec(),
            modified,
            changes,
            replaced: span,
        })
    }

    pub fn plan_remove(&self, original: impl AsRef<[u8]>) -> Result<BlockEdit, SpanDefect> {
        let original = original.as_ref();
        let span = find_block(original, &self.markers)?;

        let modified = without_span(original, span);
        let changes = span
            .map(|span| {
                format!(
                    "Remove {} block (lines {}-{})",
                    self.tool_name, span.first_line, span.last_line
                )
            })
            .into_iter()
            .collect();

        Ok(BlockEdit {
            original: original.to_vec(),
            modified,
            changes,
            replaced: span,
        })
    }

    /// Install `lines` as the managed block of the file at `path`.
    pub fn apply<S: AsRef<str>>(
        &self,
        path: &Path,
        lines: &[S],
        create_if_missing: bool,
    ) -> Result<ApplyOutcome, BlockError> {
        self.apply_at(path, lines, create_if_missing, Local::now().naive_local())
    }

    pub fn apply_at<S: AsRef<str>>(
        &self,
        path: &Path,
        lines: &[S],
        create_if_missing: bool,
        now: NaiveDateTime,
    ) -> Result<ApplyOutcome, BlockError> {
        let target = resolve_target(path);

        // A missing file is only ever brought into existence by the atomic
        // write below, so a failed run never leaves an empty stub behind.
        let (original, created) = match fs::read(&target) {
            Ok(original) => (original, false),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                if !create_if_missing {
                    return Err(BlockError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
                create_parent_dirs(&target).map_err(|error| BlockError::io(path, error))?;
                (Vec::new(), true)
            }
            Err(error) => return Err(BlockError::io(path, error)),
        };

        let edit = self
            .plan_apply(&original, lines, now)
            .map_err(|defect| BlockError::MalformedMarkerSpan {
                path: path.to_path_buf(),
                defect,
            })?;

        let needs_backup = edit.replaced.is_some()
            || (self.backup_policy == BackupPolicy::Always && !original.is_empty());
        let backup = if needs_backup {
            snapshot_backup(path, &target, now)?
        } else {
            None
        };

        write_atomic(&target, &edit.modified).map_err(|error| BlockError::io(path, error))?;
        if created {
            log::debug!("Created {}", target.display());
        }
        log::info!(
            "{} {} block in {}",
            if edit.replaced.is_some() { "Replaced" } else { "Added" },
            self.tool_name,
            path.display()
        );

        Ok(ApplyOutcome {
            path: path.to_path_buf(),
            created,
            replaced: edit.replaced.is_some(),
            backup,
        })
    }

    /// Remove the managed block from `path`. A missing file or a file
    /// without a block is left alone.
    pub fn remove(&self, path: &Path) -> Result<RemoveOutcome, BlockError> {
        self.remove_at(path, Local::now().naive_local())
    }

    pub fn remove_at(&self, path: &Path, now: NaiveDateTime) -> Result<RemoveOutcome, BlockError> {
        let target = resolve_target(path);
        let untouched = RemoveOutcome {
            path: path.to_path_buf(),
            removed: false,
            backup: None,
        };

        let original = match fs::read(&target) {
            Ok(original) => original,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(untouched),
            Err(error) => return Err(BlockError::io(path, error)),
        };

        let edit =
            self.plan_remove(&original)
                .map_err(|defect| BlockError::MalformedMarkerSpan {
                    path: path.to_path_buf(),
                    defect,
                })?;
        if !edit.has_changes() {
            log::debug!("No {} block in {}", self.tool_name, path.display());
            return Ok(untouched);
        }

        let backup = snapshot_backup(path, &target, now)?;
        write_atomic(&target, &edit.modified).map_err(|error| BlockError::io(path, error))?;
        log::info!("Removed {} block from {}", self.tool_name, path.display());

        Ok(RemoveOutcome {
            path: path.to_path_buf(),
            removed: true,
            backup,
        })
    }
}

/// Links followed before giving up on a chain (or a cycle).
const MAX_LINK_HOPS: usize = 40;

/// Follow a symlinked startup file (common with dotfile managers) so the
/// rename replaces the real file and the link survives. The link target
/// does not have to exist yet.
fn resolve_target(path: &Path) -> PathBuf {
    let mut target = path.to_path_buf();
    for _ in 0..MAX_LINK_HOPS {
        let is_link = fs::symlink_metadata(&target)
            .is_ok_and(|metadata| metadata.file_type().is_symlink());
        if !is_link {
            break;
        }
        let Ok(next) = fs::read_link(&target) else {
            break;
        };
        let resolved = match target.parent() {
            Some(parent) => parent.join(next),
            None => next,
        };
        target = resolved;
    }
    target
}

fn create_parent_dirs(path: &Path) -> io::Result<()> {
    match path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        Some(parent) => fs::create_dir_all(parent),
        None => Ok(()),
    }
}

fn snapshot_backup(
    path: &Path,
    target: &Path,
    now: NaiveDateTime,
) -> Result<Option<PathBuf>, BlockError> {
    snapshot_as(target, path, now).map_err(|error| BlockError::io(path, error))
}
