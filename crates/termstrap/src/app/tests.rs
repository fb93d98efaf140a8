use std::path::{Path, PathBuf};

use tempfile::TempDir;
use termstrap_backend::RendererDetection;
use termstrap_platform::{HostEnvironment, OsKind};
use termstrap_shell::{BEGIN_MARKER, END_MARKER, ShellType, VerificationResult};

use super::{App, PromptConfigChange, ShellChange};
use crate::cli::{InstallArgs, UninstallArgs};
use crate::error::AppError;
use crate::settings::Settings;

fn host(home: &Path) -> HostEnvironment {
    HostEnvironment {
        os: OsKind::Linux {
            distro: Some("debian".to_string()),
        },
        user: "dev".to_string(),
        is_root: false,
        home: home.to_path_buf(),
        config_home: home.join(".config"),
        zdotdir: None,
        shell: Some("zsh".to_string()),
        path_dirs: vec![PathBuf::from("/usr/bin")],
    }
}

fn app(home: &TempDir, settings: Settings) -> App {
    App::new(host(home.path()), settings)
}

fn install_args(shells: &[ShellType]) -> InstallArgs {
    InstallArgs {
        shells: shells.to_vec(),
        skip_install: true,
        ..InstallArgs::default()
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("read file")
}

#[tokio::test]
async fn install_configures_login_shell_and_prompt_config() {
    let home = tempfile::tempdir().expect("create temp dir");
    let zshrc = home.path().join(".zshrc");
    std::fs::write(&zshrc, "setopt autocd\n").expect("write zshrc");

    let report = app(&home, Settings::default())
        .install(&install_args(&[]))
        .await
        .expect("install");

    let content = read(&zshrc);
    assert!(content.starts_with(&format!("setopt autocd\n{BEGIN_MARKER}\n")));
    assert!(content.contains("eval \"$(starship init zsh)\"\n"));
    assert!(content.ends_with(&format!("{END_MARKER}\n")));

    let prompt_config = home.path().join(".config").join("starship.toml");
    assert!(read(&prompt_config).starts_with("# Generated by termstrap "));
    assert_eq!(
        report.prompt_config,
        PromptConfigChange::Written {
            path: prompt_config,
            backup: None
        }
    );
    assert_eq!(report.shells.len(), 1);
    assert!(matches!(
        &report.shells[0],
        ShellChange::Applied { shell: ShellType::Zsh, outcome } if !outcome.created && !outcome.replaced
    ));
}

#[tokio::test]
async fn install_creates_missing_startup_files() {
    let home = tempfile::tempdir().expect("create temp dir");

    app(&home, Settings::default())
        .install(&install_args(&[ShellType::Fish, ShellType::Bash]))
        .await
        .expect("install");

    let fish = home.path().join(".config").join("fish").join("config.fish");
    assert!(read(&fish).contains("starship init fish | source\n"));
    assert!(read(&home.path().join(".bashrc")).contains("eval \"$(starship init bash)\"\n"));
}

#[tokio::test]
async fn second_install_replaces_block_and_keeps_prompt_config() {
    let home = tempfile::tempdir().expect("create temp dir");
    let bashrc = home.path().join(".bashrc");
    std::fs::write(&bashrc, "export EDITOR=vim\n").expect("write bashrc");
    let app = app(&home, Settings::default());

    app.install(&install_args(&[ShellType::Bash]))
        .await
        .expect("first install");
    let report = app
        .install(&install_args(&[ShellType::Bash]))
        .await
        .expect("second install");

    let content = read(&bashrc);
    assert_eq!(content.matches(BEGIN_MARKER).count(), 1);
    assert_eq!(content.matches(END_MARKER).count(), 1);
    assert!(matches!(
        report.prompt_config,
        PromptConfigChange::Unchanged { .. }
    ));
    let ShellChange::Applied { outcome, .. } = &report.shells[0] else {
        panic!("expected applied change");
    };
    assert!(outcome.replaced);
    let backup = outcome.backup.as_ref().expect("backup taken on replace");
    assert!(read(backup).contains(BEGIN_MARKER));
}

#[tokio::test]
async fn dry_run_changes_nothing() {
    let home = tempfile::tempdir().expect("create temp dir");
    let args = InstallArgs {
        dry_run: true,
        ..install_args(&[ShellType::Zsh])
    };

    let report = app(&home, Settings::default())
        .install(&args)
        .await
        .expect("dry run");

    assert!(!home.path().join(".zshrc").exists());
    assert!(!home.path().join(".config").exists());
    assert!(matches!(
        report.prompt_config,
        PromptConfigChange::Preview { .. }
    ));
    let ShellChange::Preview { preview, .. } = &report.shells[0] else {
        panic!("expected preview");
    };
    assert!(preview.starts_with("+ Append termstrap block\n"));
    assert!(preview.contains("+ eval \"$(starship init zsh)\"\n"));
}

#[tokio::test]
async fn cmd_target_is_rejected() {
    let home = tempfile::tempdir().expect("create temp dir");

    let error = app(&home, Settings::default())
        .install(&install_args(&[ShellType::Cmd]))
        .await
        .expect_err("cmd has no startup file");

    assert_eq!(error, AppError::shell_not_supported("Command Prompt"));
    assert_eq!(error.exit_code(), 1);
}

#[tokio::test]
async fn malformed_block_aborts_and_leaves_file() {
    let home = tempfile::tempdir().expect("create temp dir");
    let zshrc = home.path().join(".zshrc");
    let original = format!("alias g=git\n{END_MARKER}\n");
    std::fs::write(&zshrc, &original).expect("write zshrc");

    let error = app(&home, Settings::default())
        .install(&install_args(&[ShellType::Zsh]))
        .await
        .expect_err("malformed block is refused");

    assert!(matches!(
        error,
        AppError::ShellConfigFailed {
            shell: "Zsh",
            action: "update",
            ..
        }
    ));
    assert_eq!(read(&zshrc), original);
}

#[test]
fn blocks_carry_path_prefix_and_custom_config() {
    let home = tempfile::tempdir().expect("create temp dir");
    let custom = home.path().join("dotfiles").join("prompt.toml");
    let settings = Settings {
        prompt_config_path: Some(custom.clone()),
        ..Settings::default()
    };
    let renderer = RendererDetection {
        found: true,
        path: Some(home.path().join(".local").join("bin").join("starship")),
        version: Some("1.22.1".to_string()),
        in_path: false,
    };

    app(&home, settings)
        .configure_shells(&[ShellType::Bash], &renderer, false)
        .expect("configure");

    let content = read(&home.path().join(".bashrc"));
    let bin_dir = home.path().join(".local").join("bin");
    assert!(content.contains(&format!("export PATH=\"{}:$PATH\"\n", bin_dir.display())));
    assert!(content.contains(&format!("export STARSHIP_CONFIG=\"{}\"\n", custom.display())));
}

#[test]
fn changed_prompt_config_is_backed_up() {
    let home = tempfile::tempdir().expect("create temp dir");
    let path = home.path().join(".config").join("starship.toml");
    std::fs::create_dir_all(path.parent().expect("has parent")).expect("create config dir");
    std::fs::write(&path, "add_newline = false\n").expect("write old config");

    let change = app(&home, Settings::default())
        .write_prompt_config(false)
        .expect("write prompt config");

    let PromptConfigChange::Written {
        backup: Some(backup),
        ..
    } = change
    else {
        panic!("expected written config with backup");
    };
    assert_eq!(read(&backup), "add_newline = false\n");
    assert!(read(&path).contains("[character]"));
}

#[tokio::test]
async fn uninstall_restores_original_content() {
    let home = tempfile::tempdir().expect("create temp dir");
    let bashrc = home.path().join(".bashrc");
    let zshrc = home.path().join(".zshrc");
    std::fs::write(&bashrc, "export EDITOR=vim\n").expect("write bashrc");
    std::fs::write(&zshrc, "setopt autocd\n").expect("write zshrc");
    let app = app(&home, Settings::default());

    app.install(&install_args(&[ShellType::Bash, ShellType::Zsh]))
        .await
        .expect("install");
    let report = app.uninstall(&UninstallArgs::default()).expect("uninstall");

    assert_eq!(read(&bashrc), "export EDITOR=vim\n");
    assert_eq!(read(&zshrc), "setopt autocd\n");
    assert_eq!(report.shells.len(), 2);
    assert!(report.shells.iter().all(|change| matches!(
        change,
        ShellChange::Removed { outcome, .. } if outcome.removed && outcome.backup.is_some()
    )));
    assert!(home.path().join(".config").join("starship.toml").exists());
}

#[tokio::test]
async fn uninstall_dry_run_previews_removal() {
    let home = tempfile::tempdir().expect("create temp dir");
    let zshrc = home.path().join(".zshrc");
    let app = app(&home, Settings::default());
    app.install(&install_args(&[ShellType::Zsh]))
        .await
        .expect("install");
    let installed = read(&zshrc);

    let report = app
        .uninstall(&UninstallArgs {
            shells: vec![ShellType::Zsh],
            dry_run: true,
        })
        .expect("dry run");

    assert_eq!(read(&zshrc), installed);
    let ShellChange::Preview { preview, .. } = &report.shells[0] else {
        panic!("expected preview");
    };
    assert!(preview.starts_with("+ Remove termstrap block (lines 1-"));
}

#[test]
fn uninstall_without_startup_files_reports_nothing() {
    let home = tempfile::tempdir().expect("create temp dir");

    let report = app(&home, Settings::default())
        .uninstall(&UninstallArgs::default())
        .expect("uninstall");

    assert!(report.shells.is_empty());
    assert_eq!(report.to_string(), "No shell startup files found.\n");
}

#[tokio::test]
async fn status_reflects_installed_blocks() {
    let home = tempfile::tempdir().expect("create temp dir");
    let app = app(&home, Settings::default());
    app.install(&install_args(&[ShellType::Bash]))
        .await
        .expect("install");

    let report = app.status().await;

    assert!(report.prompt_config_exists);
    let bash = report
        .shells
        .iter()
        .find(|(shell, _)| *shell == ShellType::Bash)
        .map(|(_, result)| result);
    assert_eq!(
        bash,
        Some(&VerificationResult::Configured {
            config_path: home.path().join(".bashrc")
        })
    );
    let zsh = report
        .shells
        .iter()
        .find(|(shell, _)| *shell == ShellType::Zsh)
        .map(|(_, result)| result);
    assert_eq!(zsh, Some(&VerificationResult::ConfigFileNotFound));
    assert!(report.shells.iter().all(|(shell, _)| *shell != ShellType::Cmd));
}
