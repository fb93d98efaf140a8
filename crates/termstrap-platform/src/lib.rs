mod commands;
mod environment;
mod paths;

pub use commands::{HideWindow, describe_command};
pub use environment::{HostEnvError, HostEnvironment, OsKind, parse_os_release_id};
pub use paths::{AppPaths, AppPathsError};
