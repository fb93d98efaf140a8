use std::path::PathBuf;

use termstrap_platform::{HostEnvironment, OsKind};

use crate::error::BackendError;
use crate::installers::{ScriptInstaller, SystemInstaller};
use crate::traits::{ManagerKind, Package, PackageInstaller};

/// Settings that shape installer selection.
#[derive(Debug, Clone)]
pub struct InstallerOptions {
    pub preferred: Option<ManagerKind>,
    pub script_url: String,
    pub script_sha256: Option<String>,
    pub bin_dir: PathBuf,
}

/// Candidate managers for `os` in probe order, with `preferred` moved to the
/// front.
#[must_use]
pub fn probe_order(os: &OsKind, preferred: Option<ManagerKind>) -> Vec<ManagerKind> {
    let mut order = ManagerKind::priority(os).to_vec();
    if let Some(preferred) = preferred {
        order.retain(|kind| *kind != preferred);
        order.insert(0, preferred);
    }
    order
}

/// Every installer usable on this host, in probe order.
///
/// # Errors
/// Returns [`BackendError::NoInstaller`] when no candidate is available.
pub fn usable_installers(
    env: &HostEnvironment,
    options: &InstallerOptions,
) -> Result<Vec<Box<dyn PackageInstaller>>, BackendError> {
    usable_installers_with(env, options, |program| env.find_program(program).is_some())
}

fn usable_installers_with(
    env: &HostEnvironment,
    options: &InstallerOptions,
    is_available: impl Fn(&str) -> bool,
) -> Result<Vec<Box<dyn PackageInstaller>>, BackendError> {
    let order = probe_order(&env.os, options.preferred);
    let has_sudo = env.is_root || is_available("sudo");
    let mut installers: Vec<Box<dyn PackageInstaller>> = Vec::new();

    for kind in &order {
        if !is_available(kind.program()) {
            log::debug!("{} not available", kind.name());
            continue;
        }

        if *kind == ManagerKind::Script {
            installers.push(Box::new(ScriptInstaller::new(
                options.script_url.clone(),
                options.script_sha256.clone(),
                options.bin_dir.clone(),
            )));
        } else if kind.needs_root() && !has_sudo {
            log::debug!("{} requires root and sudo is not available", kind.name());
        } else {
            installers.push(Box::new(SystemInstaller::new(*kind, env.is_root)));
        }
    }

    if installers.is_empty() {
        return Err(BackendError::NoInstaller {
            tried: order
                .iter()
                .map(ManagerKind::name)
                .collect::<Vec<_>>()
                .join(", "),
        });
    }
    Ok(installers)
}

/// Install `package` with the first installer that succeeds, moving on to
/// the next candidate after each failure.
///
/// # Errors
/// Returns the last failure when every installer fails, or
/// [`BackendError::NoInstaller`] for an empty list.
pub async fn install_with_fallback(
    installers: &[Box<dyn PackageInstaller>],
    package: &Package,
) -> Result<ManagerKind, BackendError> {
    let mut last_error = None;

    for installer in installers {
        let kind = installer.kind();
        log::info!("Installing {} with {}", package.name, kind.name());
        match installer.install(package).await {
            Ok(()) => return Ok(kind),
            Err(error) => {
                log::warn!("{} could not install {}: {error}", kind.name(), package.name);
                last_error = Some(error);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| BackendError::NoInstaller {
        tried: String::new(),
    }))
}
