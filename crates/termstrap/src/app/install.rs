use std::io;
use std::path::Path;

use chrono::Local;
use termstrap_backend::{
    BackendError, ManagerKind, Package, RendererDetection, detect_renderer, install_with_fallback,
    usable_installers,
};
use termstrap_core::render_prompt_config;
use termstrap_shell::{
    BlockError, InitOptions, ShellType, block_content, get_or_create_config_path, snapshot,
    write_atomic,
};

use super::targets::install_targets;
use super::{App, InstallReport, PromptConfigChange, ShellChange, VERSION};
use crate::cli::InstallArgs;
use crate::error::AppError;

impl App {
    pub async fn install(&self, args: &InstallArgs) -> Result<InstallReport, AppError> {
        let targets = install_targets(&self.env, args)?;
        log::debug!("Target shells: {targets:?}");

        let (renderer, installed_with) = self
            .ensure_renderer(args.skip_install, args.dry_run)
            .await?;
        let prompt_config = self.write_prompt_config(args.dry_run)?;
        let shells = self.configure_shells(&targets, &renderer, args.dry_run)?;

        Ok(InstallReport {
            renderer,
            installed_with,
            prompt_config,
            shells,
        })
    }

    async fn ensure_renderer(
        &self,
        skip_install: bool,
        dry_run: bool,
    ) -> Result<(RendererDetection, Option<ManagerKind>), AppError> {
        let bin_dir = self.settings.install_bin_dir(&self.env);
        let detection = detect_renderer(&self.env, &bin_dir).await;
        if detection.found {
            log::info!(
                "Found starship {}",
                detection.version.as_deref().unwrap_or("(unknown version)")
            );
            return Ok((detection, None));
        }

        if skip_install {
            log::warn!("starship is not installed; shells will fail to initialize it until it is");
            return Ok((detection, None));
        }

        let package = Package::renderer();
        let installers = usable_installers(&self.env, &self.installer_options())
            .map_err(|error| AppError::dependency_missing("starship", error))?;

        if dry_run {
            let candidates: Vec<_> = installers
                .iter()
                .map(|installer| installer.kind().name())
                .collect();
            log::info!("Would install starship with {}", candidates.join(" or "));
            return Ok((detection, None));
        }

        let used = install_with_fallback(&installers, &package)
            .await
            .map_err(|error| AppError::dependency_missing("starship", error))?;

        let detection = detect_renderer(&self.env, &bin_dir).await;
        if !detection.found {
            return Err(AppError::dependency_missing(
                "starship",
                BackendError::MissingAfterInstall {
                    package: package.name,
                    manager: used.name(),
                },
            ));
        }

        Ok((detection, Some(used)))
    }

    pub(super) fn write_prompt_config(&self, dry_run: bool) -> Result<PromptConfigChange, AppError> {
        let path = self.settings.prompt_config_path(&self.env);
        let rendered = render_prompt_config(
            &self.settings.prompt,
            &format!("Generated by termstrap {VERSION}"),
        )
        .map_err(|error| AppError::prompt_config_failed("render", error))?;

        match std::fs::read_to_string(&path) {
            Ok(existing) if existing == rendered => {
                log::debug!("{} already up to date", path.display());
                return Ok(PromptConfigChange::Unchanged { path });
            }
            Ok(_) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => return Err(AppError::prompt_config_failed("read", error)),
        }

        if dry_run {
            return Ok(PromptConfigChange::Preview { path });
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|error| AppError::prompt_config_failed("write", error))?;
        }
        let backup =
            snapshot(&path).map_err(|error| AppError::prompt_config_failed("backup", error))?;
        write_atomic(&path, rendered.as_bytes())
            .map_err(|error| AppError::prompt_config_failed("write", error))?;
        log::info!("Wrote prompt config to {}", path.display());

        Ok(PromptConfigChange::Written { path, backup })
    }

    pub(super) fn configure_shells(
        &self,
        targets: &[ShellType],
        renderer: &RendererDetection,
        dry_run: bool,
    ) -> Result<Vec<ShellChange>, AppError> {
        let options = InitOptions {
            path_prefix: renderer.path_prefix(),
            renderer_config: self
                .settings
                .has_custom_prompt_config_path(&self.env)
                .then(|| self.settings.prompt_config_path(&self.env)),
        };

        let mut changes = Vec::with_capacity(targets.len());
        for shell in targets {
            let path = get_or_create_config_path(*shell, &self.env)
                .ok_or_else(|| AppError::shell_config_path_not_found(shell.name()))?;
            let lines = block_content(*shell, &options)
                .ok_or_else(|| AppError::shell_not_supported(shell.name()))?;

            let change = if dry_run {
                ShellChange::Preview {
                    shell: *shell,
                    preview: self.preview_apply(*shell, &path, &lines)?,
                    path,
                }
            } else {
                let outcome = self
                    .editor
                    .apply(&path, &lines, true)
                    .map_err(|error| AppError::shell_config_failed(shell.name(), "update", error))?;
                ShellChange::Applied {
                    shell: *shell,
                    outcome,
                }
            };
            changes.push(change);
        }

        Ok(changes)
    }

    fn preview_apply(
        &self,
        shell: ShellType,
        path: &Path,
        lines: &[String],
    ) -> Result<String, AppError> {
        let original = match std::fs::read(path) {
            Ok(original) => original,
            Err(error) if error.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(error) => return Err(AppError::shell_config_failed(shell.name(), "read", error)),
        };

        let edit = self
            .editor
            .plan_apply(&original, lines, Local::now().naive_local())
            .map_err(|defect| {
                AppError::shell_config_failed(
                    shell.name(),
                    "update",
                    BlockError::MalformedMarkerSpan {
                        path: path.to_path_buf(),
                        defect,
                    },
                )
            })?;

        Ok(edit.diff_preview())
    }
}
