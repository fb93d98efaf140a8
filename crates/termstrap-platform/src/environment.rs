use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HostEnvError {
    #[error("Could not determine home directory")]
    HomeDirUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OsKind {
    MacOs,
    Linux { distro: Option<String> },
    Windows,
    Other(String),
}

impl OsKind {
    #[must_use]
    pub fn current() -> Self {
        match std::env::consts::OS {
            "macos" => Self::MacOs,
            "linux" => Self::Linux {
                distro: std::fs::read_to_string("/etc/os-release")
                    .ok()
                    .and_then(|content| parse_os_release_id(&content)),
            },
            "windows" => Self::Windows,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::MacOs => "macOS".to_string(),
            Self::Linux { distro: Some(distro) } => format!("Linux ({distro})"),
            Self::Linux { distro: None } => "Linux".to_string(),
            Self::Windows => "Windows".to_string(),
            Self::Other(name) => name.clone(),
        }
    }

    #[must_use]
    pub fn is_unix(&self) -> bool {
        !matches!(self, Self::Windows)
    }
}

/// Extracts the `ID` field from an `/etc/os-release` document.
#[must_use]
pub fn parse_os_release_id(content: &str) -> Option<String> {
    content
        .lines()
        .filter_map(|line| line.trim().strip_prefix("ID="))
        .map(|value| value.trim_matches(|c| c == '"' || c == '\''))
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Facts about the host, read once at startup and passed explicitly to every
/// component that needs them.
#[derive(Debug, Clone)]
pub struct HostEnvironment {
    pub os: OsKind,
    pub user: String,
    pub is_root: bool,
    pub home: PathBuf,
    /// `$XDG_CONFIG_HOME`, or `~/.config`.
    pub config_home: PathBuf,
    /// `$ZDOTDIR` when set.
    pub zdotdir: Option<PathBuf>,
    /// Raw shell identifier: `$SHELL` basename on Unix, `powershell` or
    /// `cmd` on Windows.
    pub shell: Option<String>,
    pub path_dirs: Vec<PathBuf>,
}

impl HostEnvironment {
    /// Snapshot the current process environment.
    ///
    /// # Errors
    /// Returns an error when the home directory cannot be determined.
    pub fn detect() -> Result<Self, HostEnvError> {
        let home = dirs::home_dir().ok_or(HostEnvError::HomeDirUnavailable)?;
        let os = OsKind::current();

        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_default();
        let is_root = os.is_unix() && user == "root";

        let config_home = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .filter(|path| path.is_absolute())
            .unwrap_or_else(|| home.join(".config"));

        let zdotdir = std::env::var_os("ZDOTDIR")
            .map(PathBuf::from)
            .filter(|path| !path.as_os_str().is_empty());

        let shell = if os.is_unix() {
            std::env::var("SHELL")
                .ok()
                .and_then(|shell| shell_basename(&shell))
        } else if std::env::var_os("PSModulePath").is_some() {
            Some("powershell".to_string())
        } else {
            Some("cmd".to_string())
        };

        let path_dirs = std::env::var_os("PATH")
            .map(|path| std::env::split_paths(&path).collect())
            .unwrap_or_default();

        let env = Self {
            os,
            user,
            is_root,
            home,
            config_home,
            zdotdir,
            shell,
            path_dirs,
        };
        log::debug!("Detected host environment: {env:?}");
        Ok(env)
    }

    #[must_use]
    pub fn is_on_path(&self, dir: &Path) -> bool {
        self.path_dirs.iter().any(|entry| entry == dir)
    }

    /// Resolve `program` against the recorded `path_dirs`, never the live
    /// process `PATH`.
    #[must_use]
    pub fn find_program(&self, program: &str) -> Option<PathBuf> {
        let search_path = std::env::join_paths(&self.path_dirs).ok()?;
        which::which_in(program, Some(search_path), &self.home).ok()
    }
}

fn shell_basename(shell: &str) -> Option<String> {
    Path::new(shell.trim())
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
}
