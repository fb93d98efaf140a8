use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use termstrap_platform::OsKind;

use crate::error::BackendError;

/// A dependency to install, with per-manager naming where it differs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub winget_id: Option<String>,
}

impl Package {
    #[must_use]
    pub fn renderer() -> Self {
        Self {
            name: "starship".to_string(),
            winget_id: Some("Starship.Starship".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagerKind {
    Homebrew,
    Apt,
    Dnf,
    Pacman,
    Zypper,
    Apk,
    Winget,
    Scoop,
    Chocolatey,
    Script,
}

impl ManagerKind {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ManagerKind::Homebrew => "brew",
            ManagerKind::Apt => "apt",
            ManagerKind::Dnf => "dnf",
            ManagerKind::Pacman => "pacman",
            ManagerKind::Zypper => "zypper",
            ManagerKind::Apk => "apk",
            ManagerKind::Winget => "winget",
            ManagerKind::Scoop => "scoop",
            ManagerKind::Chocolatey => "choco",
            ManagerKind::Script => "install script",
        }
    }

    /// Executable probed on `PATH`. The script installer runs through `sh`.
    #[must_use]
    pub fn program(&self) -> &'static str {
        match self {
            ManagerKind::Homebrew => "brew",
            ManagerKind::Apt => "apt-get",
            ManagerKind::Dnf => "dnf",
            ManagerKind::Pacman => "pacman",
            ManagerKind::Zypper => "zypper",
            ManagerKind::Apk => "apk",
            ManagerKind::Winget => "winget",
            ManagerKind::Scoop => "scoop",
            ManagerKind::Chocolatey => "choco",
            ManagerKind::Script => "sh",
        }
    }

    #[must_use]
    pub fn needs_root(&self) -> bool {
        matches!(
            self,
            ManagerKind::Apt
                | ManagerKind::Dnf
                | ManagerKind::Pacman
                | ManagerKind::Zypper
                | ManagerKind::Apk
        )
    }

    /// Non-interactive install arguments for `package`.
    #[must_use]
    pub fn install_args<'a>(&self, package: &'a Package) -> Vec<&'a str> {
        let name = package.name.as_str();
        match self {
            ManagerKind::Homebrew | ManagerKind::Scoop => vec!["install", name],
            ManagerKind::Apt | ManagerKind::Dnf => vec!["install", "-y", name],
            ManagerKind::Pacman => vec!["-S", "--noconfirm", "--needed", name],
            ManagerKind::Zypper => vec!["--non-interactive", "install", name],
            ManagerKind::Apk => vec!["add", name],
            ManagerKind::Winget => vec![
                "install",
                "--id",
                package.winget_id.as_deref().unwrap_or(name),
                "--exact",
                "--accept-source-agreements",
                "--accept-package-agreements",
            ],
            ManagerKind::Chocolatey => vec!["install", name, "-y"],
            ManagerKind::Script => vec![],
        }
    }

    /// Probe order for `os`, most preferred first.
    #[must_use]
    pub fn priority(os: &OsKind) -> &'static [ManagerKind] {
        match os {
            OsKind::MacOs => &[ManagerKind::Homebrew, ManagerKind::Script],
            OsKind::Linux { .. } => &[
                ManagerKind::Homebrew,
                ManagerKind::Apt,
                ManagerKind::Dnf,
                ManagerKind::Pacman,
                ManagerKind::Zypper,
                ManagerKind::Apk,
                ManagerKind::Script,
            ],
            OsKind::Windows => &[
                ManagerKind::Winget,
                ManagerKind::Scoop,
                ManagerKind::Chocolatey,
            ],
            OsKind::Other(_) => &[ManagerKind::Script],
        }
    }
}

/// One way of installing a dependency on this host.
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    fn kind(&self) -> ManagerKind;

    async fn install(&self, package: &Package) -> Result<(), BackendError>;
}
