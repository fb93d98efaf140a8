use std::path::{Path, PathBuf};

use termstrap_platform::{HideWindow, HostEnvironment};
use tokio::process::Command;

use crate::traits::Package;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RendererDetection {
    pub found: bool,
    pub path: Option<PathBuf>,
    pub version: Option<String>,
    pub in_path: bool,
}

impl RendererDetection {
    /// Directory that shell startup files must prepend to `PATH`, when the
    /// binary was found outside it.
    #[must_use]
    pub fn path_prefix(&self) -> Option<PathBuf> {
        if !self.found || self.in_path {
            return None;
        }
        self.path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
    }
}

/// Look for the renderer on `PATH`, then in common install locations
/// (including `bin_dir`).
pub async fn detect_renderer(env: &HostEnvironment, bin_dir: &Path) -> RendererDetection {
    let binary = binary_name(&Package::renderer().name);

    if let Some(path) = env.find_program(&binary) {
        let version = renderer_version(&path).await;
        return RendererDetection {
            found: true,
            path: Some(path),
            version,
            in_path: true,
        };
    }

    match find_existing(common_paths(env, bin_dir, &binary)) {
        Some(path) => {
            let in_path = path.parent().is_some_and(|dir| env.is_on_path(dir));
            let version = renderer_version(&path).await;
            RendererDetection {
                found: true,
                path: Some(path),
                version,
                in_path,
            }
        }
        None => RendererDetection::default(),
    }
}

fn binary_name(name: &str) -> String {
    format!("{name}{}", std::env::consts::EXE_SUFFIX)
}

fn find_existing(candidates: Vec<PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().find(|path| path.is_file())
}

fn common_paths(env: &HostEnvironment, bin_dir: &Path, binary: &str) -> Vec<PathBuf> {
    let mut paths = vec![
        bin_dir.join(binary),
        env.home.join(".local").join("bin").join(binary),
        env.home.join(".cargo").join("bin").join(binary),
    ];

    if env.os.is_unix() {
        paths.push(PathBuf::from("/opt/homebrew/bin").join(binary));
        paths.push(PathBuf::from("/usr/local/bin").join(binary));
        paths.push(PathBuf::from("/usr/bin").join(binary));
    } else {
        paths.push(env.home.join("scoop").join("shims").join(binary));
    }

    paths
}

async fn renderer_version(path: &Path) -> Option<String> {
    let output = Command::new(path)
        .arg("--version")
        .hide_window()
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_version(&stdout)
}

fn parse_version(output: &str) -> Option<String> {
    let first = output.lines().next()?.trim();
    let version = first.strip_prefix("starship ").unwrap_or(first).trim();
    (!version.is_empty()).then(|| version.to_string())
}
