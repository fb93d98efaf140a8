use std::path::{Path, PathBuf};

use async_trait::async_trait;
use termstrap_core::fetch_install_script;
use termstrap_platform::{HideWindow, describe_command};
use tokio::process::Command;

use crate::error::BackendError;
use crate::traits::{ManagerKind, Package, PackageInstaller};

/// Installs packages through a system package manager found on `PATH`.
#[derive(Debug, Clone)]
pub struct SystemInstaller {
    kind: ManagerKind,
    use_sudo: bool,
}

impl SystemInstaller {
    #[must_use]
    pub fn new(kind: ManagerKind, is_root: bool) -> Self {
        Self {
            kind,
            use_sudo: kind.needs_root() && !is_root,
        }
    }

    /// Program and arguments this installer runs for `package`.
    #[must_use]
    pub fn command_line<'a>(&self, package: &'a Package) -> (&'static str, Vec<&'a str>) {
        let args = self.kind.install_args(package);
        if self.use_sudo {
            let mut sudo_args = Vec::with_capacity(args.len() + 1);
            sudo_args.push(self.kind.program());
            sudo_args.extend(args);
            ("sudo", sudo_args)
        } else {
            (self.kind.program(), args)
        }
    }
}

#[async_trait]
impl PackageInstaller for SystemInstaller {
    fn kind(&self) -> ManagerKind {
        self.kind
    }

    async fn install(&self, package: &Package) -> Result<(), BackendError> {
        let (program, args) = self.command_line(package);
        log::info!("Running {}", describe_command(program, &args));

        let status = Command::new(program)
            .args(&args)
            .hide_window()
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(BackendError::install_failed(
                self.kind.name(),
                status.to_string(),
            ))
        }
    }
}

/// Installs the renderer with its official install script.
#[derive(Debug, Clone)]
pub struct ScriptInstaller {
    url: String,
    sha256: Option<String>,
    bin_dir: PathBuf,
}

impl ScriptInstaller {
    #[must_use]
    pub fn new(url: impl Into<String>, sha256: Option<String>, bin_dir: PathBuf) -> Self {
        Self {
            url: url.into(),
            sha256,
            bin_dir,
        }
    }

    #[must_use]
    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    fn failed(details: impl Into<String>) -> BackendError {
        BackendError::install_failed(ManagerKind::Script.name(), details)
    }
}

#[async_trait]
impl PackageInstaller for ScriptInstaller {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Script
    }

    async fn install(&self, package: &Package) -> Result<(), BackendError> {
        let script = fetch_install_script(&self.url, self.sha256.as_deref())
            .await
            .map_err(|error| Self::failed(error.to_string()))?;
        log::debug!(
            "Fetched {} install script ({} bytes, sha256 {})",
            package.name,
            script.body().len(),
            script.sha256()
        );

        // Deleted when `script_file` drops, whatever the outcome.
        let script_file = script.to_temp_file()?;
        tokio::fs::create_dir_all(&self.bin_dir).await?;

        let script_path = script_file.path().to_string_lossy();
        let bin_dir = self.bin_dir.to_string_lossy();
        let args = [script_path.as_ref(), "--yes", "--bin-dir", bin_dir.as_ref()];
        log::info!("Running {}", describe_command("sh", &args));

        let status = Command::new("sh")
            .args(args)
            .hide_window()
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(Self::failed(status.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{ScriptInstaller, SystemInstaller};
    use crate::traits::{ManagerKind, Package, PackageInstaller};

    #[test]
    fn non_root_system_manager_runs_through_sudo() {
        let installer = SystemInstaller::new(ManagerKind::Apt, false);
        let package = Package::renderer();
        let (program, args) = installer.command_line(&package);

        assert_eq!(program, "sudo");
        assert_eq!(args, vec!["apt-get", "install", "-y", "starship"]);
    }

    #[test]
    fn root_runs_system_manager_directly() {
        let installer = SystemInstaller::new(ManagerKind::Dnf, true);
        let package = Package::renderer();
        let (program, args) = installer.command_line(&package);

        assert_eq!(program, "dnf");
        assert_eq!(args, vec!["install", "-y", "starship"]);
    }

    #[test]
    fn user_level_managers_never_use_sudo() {
        let installer = SystemInstaller::new(ManagerKind::Homebrew, false);
        let package = Package::renderer();
        let (program, args) = installer.command_line(&package);

        assert_eq!(program, "brew");
        assert_eq!(args, vec!["install", "starship"]);
        assert_eq!(installer.kind(), ManagerKind::Homebrew);
    }

    #[tokio::test]
    async fn script_install_failure_maps_to_install_failed() {
        let bin_dir = PathBuf::from("/nonexistent/termstrap-test-bin");
        let installer = ScriptInstaller::new("http://127.0.0.1:9/install.sh", None, bin_dir);

        let error = installer
            .install(&Package::renderer())
            .await
            .expect_err("download from a closed port must fail");

        assert!(matches!(
            error,
            crate::BackendError::InstallFailed {
                manager: "install script",
                ..
            }
        ));
    }
}
