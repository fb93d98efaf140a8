use termstrap_platform::HostEnvironment;
use termstrap_shell::{ShellType, detect_native_shells, detect_shell};

use crate::cli::{InstallArgs, UninstallArgs};
use crate::error::AppError;

fn checked(shells: &[ShellType]) -> Result<Vec<ShellType>, AppError> {
    let mut targets = Vec::with_capacity(shells.len());
    for shell in shells {
        if !shell.supports_config() {
            return Err(AppError::shell_not_supported(shell.name()));
        }
        if !targets.contains(shell) {
            targets.push(*shell);
        }
    }
    Ok(targets)
}

fn native_shells(env: &HostEnvironment) -> Result<Vec<ShellType>, AppError> {
    let shells: Vec<ShellType> = detect_native_shells(env)
        .into_iter()
        .map(|info| info.shell_type)
        .collect();
    if shells.is_empty() {
        return Err(AppError::NoTargetShells);
    }
    Ok(shells)
}

/// Explicit `--shell` values, every native shell with `--all-shells`, or the
/// login shell. A login shell without a startup file widens to the native
/// shells.
pub(super) fn install_targets(
    env: &HostEnvironment,
    args: &InstallArgs,
) -> Result<Vec<ShellType>, AppError> {
    if !args.shells.is_empty() {
        return checked(&args.shells);
    }
    if args.all_shells {
        return native_shells(env);
    }

    match detect_shell(env) {
        Some(shell) if shell.supports_config() => Ok(vec![shell]),
        other => {
            log::info!(
                "Login shell {} has no startup file; configuring detected shells",
                other.map_or("unknown", |shell| shell.name())
            );
            native_shells(env)
        }
    }
}

/// Explicit `--shell` values or every shell that has a startup file.
pub(super) fn uninstall_targets(args: &UninstallArgs) -> Result<Vec<ShellType>, AppError> {
    if args.shells.is_empty() {
        return Ok(ShellType::ALL
            .into_iter()
            .filter(ShellType::supports_config)
            .collect());
    }
    checked(&args.shells)
}
