use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use termstrap_platform::{HostEnvironment, OsKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown shell '{0}' (expected bash, zsh, fish, powershell or cmd)")]
pub struct UnknownShell(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Cmd,
}

impl ShellType {
    pub const ALL: [ShellType; 5] = [
        ShellType::Bash,
        ShellType::Zsh,
        ShellType::Fish,
        ShellType::PowerShell,
        ShellType::Cmd,
    ];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ShellType::Bash => "Bash",
            ShellType::Zsh => "Zsh",
            ShellType::Fish => "Fish",
            ShellType::PowerShell => "PowerShell",
            ShellType::Cmd => "Command Prompt",
        }
    }

    /// Identifier understood by `starship init <id>`.
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            ShellType::Bash => "bash",
            ShellType::Zsh => "zsh",
            ShellType::Fish => "fish",
            ShellType::PowerShell => "powershell",
            ShellType::Cmd => "cmd",
        }
    }

    #[must_use]
    pub fn binary_names(&self) -> &'static [&'static str] {
        match self {
            ShellType::Bash => &["bash"],
            ShellType::Zsh => &["zsh"],
            ShellType::Fish => &["fish"],
            ShellType::PowerShell => &["pwsh", "powershell"],
            ShellType::Cmd => &["cmd"],
        }
    }

    #[must_use]
    pub fn supports_config(&self) -> bool {
        !matches!(self, ShellType::Cmd)
    }

    /// Startup files in preference order. The first existing one is edited;
    /// when none exist the first is created.
    #[must_use]
    pub fn config_files(&self, env: &HostEnvironment) -> Vec<PathBuf> {
        let home = &env.home;
        match self {
            ShellType::Bash => {
                let mut files = vec![home.join(".bashrc")];
                if env.os == OsKind::MacOs {
                    files.push(home.join(".bash_profile"));
                }
                files
            }
            ShellType::Zsh => {
                let dir = env.zdotdir.as_ref().unwrap_or(home);
                vec![dir.join(".zshrc")]
            }
            ShellType::Fish => vec![env.config_home.join("fish").join("config.fish")],
            ShellType::PowerShell => {
                if env.os == OsKind::Windows {
                    let documents = home.join("Documents");
                    vec![
                        documents
                            .join("PowerShell")
                            .join("Microsoft.PowerShell_profile.ps1"),
                        documents
                            .join("WindowsPowerShell")
                            .join("Microsoft.PowerShell_profile.ps1"),
                    ]
                } else {
                    vec![
                        env.config_home
                            .join("powershell")
                            .join("Microsoft.PowerShell_profile.ps1"),
                    ]
                }
            }
            ShellType::Cmd => vec![],
        }
    }
}

impl fmt::Display for ShellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ShellType {
    type Err = UnknownShell;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let name = value.trim().to_ascii_lowercase();
        let name = name.strip_suffix(".exe").unwrap_or(&name);
        match name {
            "bash" => Ok(ShellType::Bash),
            "zsh" => Ok(ShellType::Zsh),
            "fish" => Ok(ShellType::Fish),
            "pwsh" | "powershell" => Ok(ShellType::PowerShell),
            "cmd" => Ok(ShellType::Cmd),
            _ => Err(UnknownShell(value.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShellInfo {
    pub shell_type: ShellType,
    pub binary: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
}

/// The user's login shell, from the identifier captured in `env`.
#[must_use]
pub fn detect_shell(env: &HostEnvironment) -> Option<ShellType> {
    env.shell.as_deref().and_then(|shell| shell.parse().ok())
}

/// Every configurable shell that is installed or already has a startup
/// file.
#[must_use]
pub fn detect_native_shells(env: &HostEnvironment) -> Vec<ShellInfo> {
    ShellType::ALL
        .into_iter()
        .filter(ShellType::supports_config)
        .filter_map(|shell_type| {
            let binary = shell_type
                .binary_names()
                .iter()
                .find_map(|name| env.find_program(name));
            let config_file = shell_type
                .config_files(env)
                .into_iter()
                .find(|path| path.exists());

            if binary.is_none() && config_file.is_none() {
                return None;
            }

            log::debug!(
                "Found {} (binary: {:?}, config: {:?})",
                shell_type.name(),
                binary,
                config_file
            );
            Some(ShellInfo {
                shell_type,
                binary,
                config_file,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use termstrap_platform::{HostEnvironment, OsKind};

    use super::{ShellType, detect_native_shells, detect_shell};

    fn env(os: OsKind, shell: Option<&str>) -> HostEnvironment {
        HostEnvironment {
            os,
            user: "dev".to_string(),
            is_root: false,
            home: PathBuf::from("/home/dev"),
            config_home: PathBuf::from("/home/dev/.config"),
            zdotdir: None,
            shell: shell.map(str::to_string),
            path_dirs: vec![],
        }
    }

    #[test]
    fn parses_shell_identifiers() {
        assert_eq!("bash".parse::<ShellType>(), Ok(ShellType::Bash));
        assert_eq!("ZSH".parse::<ShellType>(), Ok(ShellType::Zsh));
        assert_eq!("pwsh.exe".parse::<ShellType>(), Ok(ShellType::PowerShell));
        assert_eq!("powershell".parse::<ShellType>(), Ok(ShellType::PowerShell));
        assert!("tcsh".parse::<ShellType>().is_err());
    }

    #[test]
    fn detect_shell_reads_environment_fact() {
        assert_eq!(
            detect_shell(&env(OsKind::MacOs, Some("zsh"))),
            Some(ShellType::Zsh)
        );
        assert_eq!(detect_shell(&env(OsKind::MacOs, Some("nu"))), None);
        assert_eq!(detect_shell(&env(OsKind::MacOs, None)), None);
    }

    #[test]
    fn bash_on_macos_also_considers_bash_profile() {
        let files = ShellType::Bash.config_files(&env(OsKind::MacOs, None));
        assert_eq!(
            files,
            vec![
                PathBuf::from("/home/dev/.bashrc"),
                PathBuf::from("/home/dev/.bash_profile")
            ]
        );

        let linux = env(OsKind::Linux { distro: None }, None);
        assert_eq!(ShellType::Bash.config_files(&linux).len(), 1);
    }

    #[test]
    fn zsh_honours_zdotdir() {
        let mut host = env(OsKind::MacOs, None);
        host.zdotdir = Some(PathBuf::from("/home/dev/.config/zsh"));

        assert_eq!(
            ShellType::Zsh.config_files(&host),
            vec![PathBuf::from("/home/dev/.config/zsh/.zshrc")]
        );
    }

    #[test]
    fn fish_uses_config_home() {
        let files = ShellType::Fish.config_files(&env(OsKind::Linux { distro: None }, None));
        assert_eq!(
            files,
            vec![PathBuf::from("/home/dev/.config/fish/config.fish")]
        );
    }

    #[test]
    fn cmd_has_no_config_files() {
        assert!(ShellType::Cmd.config_files(&env(OsKind::Windows, None)).is_empty());
        assert!(!ShellType::Cmd.supports_config());
    }

    #[test]
    fn detected_shells_never_include_cmd() {
        let host = env(OsKind::Linux { distro: None }, None);
        assert!(
            detect_native_shells(&host)
                .iter()
                .all(|info| info.shell_type != ShellType::Cmd)
        );
    }
}
