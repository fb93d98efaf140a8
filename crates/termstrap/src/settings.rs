use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use termstrap_backend::ManagerKind;
use termstrap_core::PromptStyle;
use termstrap_platform::{AppPaths, HostEnvironment};
use termstrap_shell::BackupPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub prompt: PromptStyle,

    /// Where the renderer's TOML config is written. Defaults to
    /// `<config_home>/starship.toml`.
    #[serde(default)]
    pub prompt_config_path: Option<PathBuf>,

    #[serde(default)]
    pub backup_policy: BackupPolicy,

    #[serde(default)]
    pub preferred_installer: Option<ManagerKind>,

    #[serde(default = "default_install_script_url")]
    pub install_script_url: String,

    #[serde(default)]
    pub install_script_sha256: Option<String>,

    /// Target of the install-script fallback. Defaults to `~/.local/bin`.
    #[serde(default)]
    pub install_bin_dir: Option<PathBuf>,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,
}

fn default_install_script_url() -> String {
    "https://starship.rs/install.sh".to_string()
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prompt: PromptStyle::default(),
            prompt_config_path: None,
            backup_policy: BackupPolicy::default(),
            preferred_installer: None,
            install_script_url: default_install_script_url(),
            install_script_sha256: None,
            install_bin_dir: None,
            max_log_size_bytes: default_max_log_size_bytes(),
        }
    }
}

impl Settings {
    /// Settings file location: `override_path` when given, else the platform
    /// config directory.
    pub fn path(override_path: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = override_path {
            return Some(path.to_path_buf());
        }
        AppPaths::new().ok().map(|paths| paths.settings_file())
    }

    /// Missing, unreadable or invalid files fall back to defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|error| {
                log::warn!("Ignoring invalid settings in {}: {error}", path.display());
                Self::default()
            }),
            Err(error) => {
                log::warn!("Could not read {}: {error}", path.display());
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn prompt_config_path(&self, env: &HostEnvironment) -> PathBuf {
        self.prompt_config_path
            .clone()
            .unwrap_or_else(|| default_prompt_config_path(env))
    }

    /// Whether the renderer must be pointed at a non-default config file.
    pub fn has_custom_prompt_config_path(&self, env: &HostEnvironment) -> bool {
        self.prompt_config_path
            .as_ref()
            .is_some_and(|path| *path != default_prompt_config_path(env))
    }

    pub fn install_bin_dir(&self, env: &HostEnvironment) -> PathBuf {
        self.install_bin_dir
            .clone()
            .unwrap_or_else(|| env.home.join(".local").join("bin"))
    }
}

fn default_prompt_config_path(env: &HostEnvironment) -> PathBuf {
    env.config_home.join("starship.toml")
}
