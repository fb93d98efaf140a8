//! Shell startup-file integration for termstrap.
//!
//! The centre of this crate is [`BlockEditor`], which owns a single
//! marker-delimited block inside an arbitrary text file: it inserts,
//! replaces and removes that block without touching the rest of the file,
//! snapshots the file before destructive edits and writes atomically.
//! Around it sit shell detection, the generator for the block payload and
//! a read-only status check.

#![allow(clippy::missing_errors_doc)]

mod backup;
mod block;
mod content;
mod detect;
mod verify;

pub use backup::{BackupPolicy, backup_path, snapshot, snapshot_at, write_atomic};
pub use block::{
    ApplyOutcome, BEGIN_MARKER, BlockEdit, BlockEditor, BlockError, END_MARKER, Markers,
    RemoveOutcome, Span, SpanDefect, find_block,
};
pub use content::{InitOptions, RENDERER_BINARY, block_content, init_statement};
pub use detect::{ShellInfo, ShellType, UnknownShell, detect_native_shells, detect_shell};
pub use verify::{
    VerificationResult, existing_config_path, get_or_create_config_path, verify_shell_config,
};
