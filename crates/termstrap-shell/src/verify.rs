use std::path::PathBuf;
use termstrap_platform::HostEnvironment;

use crate::block::{Markers, SpanDefect, find_block};
use crate::detect::ShellType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    Configured { config_path: PathBuf },
    NotConfigured { config_path: PathBuf },
    ConfigFileNotFound,
    Malformed { config_path: PathBuf, defect: SpanDefect },
    Error(String),
}

/// Read-only check of whether `shell`'s startup file carries a managed
/// block.
#[must_use]
pub fn verify_shell_config(
    shell_type: ShellType,
    env: &HostEnvironment,
    markers: &Markers,
) -> VerificationResult {
    let Some(config_path) = existing_config_path(shell_type, env) else {
        return VerificationResult::ConfigFileNotFound;
    };

    let content = match std::fs::read(&config_path) {
        Ok(content) => content,
        Err(error) => {
            log::warn!("Failed to read {}: {error}", config_path.display());
            return VerificationResult::Error(format!("{}: {error}", config_path.display()));
        }
    };

    match find_block(&content, markers) {
        Ok(Some(_)) => VerificationResult::Configured { config_path },
        Ok(None) => VerificationResult::NotConfigured { config_path },
        Err(defect) => VerificationResult::Malformed {
            config_path,
            defect,
        },
    }
}

#[must_use]
pub fn existing_config_path(shell_type: ShellType, env: &HostEnvironment) -> Option<PathBuf> {
    shell_type
        .config_files(env)
        .into_iter()
        .find(|path| path.exists())
}

#[must_use]
pub fn get_or_create_config_path(shell_type: ShellType, env: &HostEnvironment) -> Option<PathBuf> {
    if let Some(existing) = existing_config_path(shell_type, env) {
        return Some(existing);
    }

    shell_type.config_files(env).into_iter().next()
}
