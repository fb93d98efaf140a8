use std::fmt;
use std::path::{Path, PathBuf};

use termstrap_backend::{ManagerKind, RendererDetection};
use termstrap_shell::{ApplyOutcome, RemoveOutcome, ShellType, VerificationResult};

#[derive(Debug, Clone)]
pub enum ShellChange {
    Applied {
        shell: ShellType,
        outcome: ApplyOutcome,
    },
    Removed {
        shell: ShellType,
        outcome: RemoveOutcome,
    },
    Preview {
        shell: ShellType,
        path: PathBuf,
        preview: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptConfigChange {
    Unchanged { path: PathBuf },
    Written { path: PathBuf, backup: Option<PathBuf> },
    Preview { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct InstallReport {
    pub renderer: RendererDetection,
    pub installed_with: Option<ManagerKind>,
    pub prompt_config: PromptConfigChange,
    pub shells: Vec<ShellChange>,
}

#[derive(Debug, Clone)]
pub struct UninstallReport {
    pub shells: Vec<ShellChange>,
}

#[derive(Debug, Clone)]
pub struct StatusReport {
    pub os: String,
    pub renderer: RendererDetection,
    pub prompt_config: PathBuf,
    pub prompt_config_exists: bool,
    pub shells: Vec<(ShellType, VerificationResult)>,
}

fn backup_suffix(backup: Option<&Path>) -> String {
    backup
        .map(|path| format!(" (backup: {})", path.display()))
        .unwrap_or_default()
}

fn write_renderer(f: &mut fmt::Formatter<'_>, renderer: &RendererDetection) -> fmt::Result {
    match (&renderer.path, &renderer.version) {
        (Some(path), Some(version)) => {
            writeln!(f, "starship {version} at {}", path.display())
        }
        (Some(path), None) => writeln!(f, "starship at {}", path.display()),
        _ => writeln!(f, "starship not found"),
    }
}

impl fmt::Display for ShellChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied { shell, outcome } => {
                let verb = match (outcome.replaced, outcome.created) {
                    (true, _) => "updated",
                    (false, true) => "created",
                    (false, false) => "added to",
                };
                writeln!(
                    f,
                    "{}: {verb} {}{}",
                    shell.name(),
                    outcome.path.display(),
                    backup_suffix(outcome.backup.as_deref())
                )
            }
            Self::Removed { shell, outcome } if outcome.removed => writeln!(
                f,
                "{}: removed block from {}{}",
                shell.name(),
                outcome.path.display(),
                backup_suffix(outcome.backup.as_deref())
            ),
            Self::Removed { shell, outcome } => writeln!(
                f,
                "{}: nothing to remove in {}",
                shell.name(),
                outcome.path.display()
            ),
            Self::Preview {
                shell,
                path,
                preview,
            } => {
                writeln!(f, "{}: {}", shell.name(), path.display())?;
                for line in preview.lines() {
                    writeln!(f, "  {line}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for PromptConfigChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged { path } => writeln!(f, "Prompt config up to date: {}", path.display()),
            Self::Written { path, backup } => writeln!(
                f,
                "Prompt config written: {}{}",
                path.display(),
                backup_suffix(backup.as_deref())
            ),
            Self::Preview { path } => writeln!(f, "Would write prompt config: {}", path.display()),
        }
    }
}

impl fmt::Display for InstallReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(kind) = self.installed_with {
            write!(f, "Installed with {}: ", kind.name())?;
        }
        write_renderer(f, &self.renderer)?;
        write!(f, "{}", self.prompt_config)?;
        for change in &self.shells {
            write!(f, "{change}")?;
        }
        Ok(())
    }
}

impl fmt::Display for UninstallReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.shells.is_empty() {
            return writeln!(f, "No shell startup files found.");
        }
        for change in &self.shells {
            write!(f, "{change}")?;
        }
        Ok(())
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "OS: {}", self.os)?;
        write_renderer(f, &self.renderer)?;
        writeln!(
            f,
            "Prompt config: {}{}",
            self.prompt_config.display(),
            if self.prompt_config_exists { "" } else { " (missing)" }
        )?;

        for (shell, result) in &self.shells {
            match result {
                VerificationResult::Configured { config_path } => {
                    writeln!(f, "{}: configured ({})", shell.name(), config_path.display())?;
                }
                VerificationResult::NotConfigured { config_path } => writeln!(
                    f,
                    "{}: not configured ({})",
                    shell.name(),
                    config_path.display()
                )?,
                VerificationResult::ConfigFileNotFound => {
                    writeln!(f, "{}: no startup file", shell.name())?;
                }
                VerificationResult::Malformed {
                    config_path,
                    defect,
                } => writeln!(
                    f,
                    "{}: malformed block in {}: {defect}",
                    shell.name(),
                    config_path.display()
                )?,
                VerificationResult::Error(message) => writeln!(f, "{}: {message}", shell.name())?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use termstrap_backend::RendererDetection;
    use termstrap_shell::{ApplyOutcome, RemoveOutcome, ShellType, SpanDefect, VerificationResult};

    use super::{PromptConfigChange, ShellChange, StatusReport};

    #[test]
    fn applied_change_mentions_backup() {
        let change = ShellChange::Applied {
            shell: ShellType::Zsh,
            outcome: ApplyOutcome {
                path: PathBuf::from("/home/dev/.zshrc"),
                created: false,
                replaced: true,
                backup: Some(PathBuf::from("/home/dev/.zshrc.bak.20261014081500")),
            },
        };
        assert_eq!(
            change.to_string(),
            "Zsh: updated /home/dev/.zshrc (backup: /home/dev/.zshrc.bak.20261014081500)\n"
        );
    }

    #[test]
    fn removal_without_block_says_nothing_to_remove() {
        let change = ShellChange::Removed {
            shell: ShellType::Bash,
            outcome: RemoveOutcome {
                path: PathBuf::from("/home/dev/.bashrc"),
                removed: false,
                backup: None,
            },
        };
        assert_eq!(
            change.to_string(),
            "Bash: nothing to remove in /home/dev/.bashrc\n"
        );
    }

    #[test]
    fn preview_is_indented_under_shell() {
        let change = ShellChange::Preview {
            shell: ShellType::Fish,
            path: PathBuf::from("/home/dev/.config/fish/config.fish"),
            preview: "+ Append termstrap block\n+ starship init fish | source\n".to_string(),
        };
        assert_eq!(
            change.to_string(),
            "Fish: /home/dev/.config/fish/config.fish\n  + Append termstrap block\n  + starship init fish | source\n"
        );
    }

    #[test]
    fn status_lists_each_shell_state() {
        let report = StatusReport {
            os: "Linux (arch)".to_string(),
            renderer: RendererDetection {
                found: true,
                path: Some(PathBuf::from("/usr/bin/starship")),
                version: Some("1.22.1".to_string()),
                in_path: true,
            },
            prompt_config: PathBuf::from("/home/dev/.config/starship.toml"),
            prompt_config_exists: false,
            shells: vec![
                (
                    ShellType::Bash,
                    VerificationResult::Configured {
                        config_path: PathBuf::from("/home/dev/.bashrc"),
                    },
                ),
                (
                    ShellType::Zsh,
                    VerificationResult::Malformed {
                        config_path: PathBuf::from("/home/dev/.zshrc"),
                        defect: SpanDefect::DuplicateBlock { line: 9 },
                    },
                ),
                (ShellType::Fish, VerificationResult::ConfigFileNotFound),
            ],
        };

        let text = report.to_string();
        assert!(text.contains("OS: Linux (arch)\n"));
        assert!(text.contains("starship 1.22.1 at /usr/bin/starship\n"));
        assert!(text.contains("Prompt config: /home/dev/.config/starship.toml (missing)\n"));
        assert!(text.contains("Bash: configured (/home/dev/.bashrc)\n"));
        assert!(text.contains(
            "Zsh: malformed block in /home/dev/.zshrc: line 9 opens a second managed block\n"
        ));
        assert!(text.contains("Fish: no startup file\n"));
    }

    #[test]
    fn prompt_config_change_messages() {
        let unchanged = PromptConfigChange::Unchanged {
            path: PathBuf::from("/c/starship.toml"),
        };
        assert_eq!(
            unchanged.to_string(),
            "Prompt config up to date: /c/starship.toml\n"
        );
    }
}
