use termstrap_shell::BlockError;

use super::targets::uninstall_targets;
use super::{App, ShellChange, UninstallReport};
use crate::cli::UninstallArgs;
use crate::error::AppError;

impl App {
    /// Strip the managed block from every existing startup file of the
    /// target shells. The renderer and its config stay in place.
    pub fn uninstall(&self, args: &UninstallArgs) -> Result<UninstallReport, AppError> {
        let targets = uninstall_targets(args)?;
        let mut shells = Vec::new();

        for shell in targets {
            for path in shell
                .config_files(&self.env)
                .into_iter()
                .filter(|path| path.exists())
            {
                let change = if args.dry_run {
                    let original = std::fs::read(&path).map_err(|error| {
                        AppError::shell_config_failed(shell.name(), "read", error)
                    })?;
                    let edit = self.editor.plan_remove(&original).map_err(|defect| {
                        AppError::shell_config_failed(
                            shell.name(),
                            "cleanup",
                            BlockError::MalformedMarkerSpan {
                                path: path.clone(),
                                defect,
                            },
                        )
                    })?;
                    ShellChange::Preview {
                        shell,
                        path,
                        preview: edit.diff_preview(),
                    }
                } else {
                    let outcome = self.editor.remove(&path).map_err(|error| {
                        AppError::shell_config_failed(shell.name(), "cleanup", error)
                    })?;
                    ShellChange::Removed { shell, outcome }
                };
                shells.push(change);
            }
        }

        Ok(UninstallReport { shells })
    }
}
