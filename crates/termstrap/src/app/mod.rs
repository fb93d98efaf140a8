mod install;
mod report;
mod status;
mod targets;
mod uninstall;

#[cfg(test)]
mod tests;

use termstrap_backend::InstallerOptions;
use termstrap_platform::HostEnvironment;
use termstrap_shell::BlockEditor;

use crate::settings::Settings;

pub use report::{
    InstallReport, PromptConfigChange, ShellChange, StatusReport, UninstallReport,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// One run of termstrap over a fixed snapshot of the host.
pub struct App {
    env: HostEnvironment,
    settings: Settings,
    editor: BlockEditor,
}

impl App {
    pub fn new(env: HostEnvironment, settings: Settings) -> Self {
        let editor =
            BlockEditor::new("termstrap", VERSION).with_backup_policy(settings.backup_policy);
        Self {
            env,
            settings,
            editor,
        }
    }

    fn installer_options(&self) -> InstallerOptions {
        InstallerOptions {
            preferred: self.settings.preferred_installer,
            script_url: self.settings.install_script_url.clone(),
            script_sha256: self.settings.install_script_sha256.clone(),
            bin_dir: self.settings.install_bin_dir(&self.env),
        }
    }
}
