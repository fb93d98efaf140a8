use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use termstrap_shell::ShellType;

#[derive(Parser, Debug)]
#[command(name = "termstrap")]
#[command(about = "Install the starship prompt and wire it into your shells")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Show debug output on the terminal
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Read settings from this file instead of the platform config directory
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,
}

impl Cli {
    /// `install` with default arguments when no subcommand is given.
    pub fn command_or_default(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Install(InstallArgs::default()))
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Install the renderer, write its config and add the init block to shells
    Install(InstallArgs),

    /// Remove the managed block from shell startup files
    Uninstall(UninstallArgs),

    /// Report the renderer and per-shell state without changing anything
    Status,
}

#[derive(Args, Debug, Clone, Default)]
pub struct InstallArgs {
    /// Shell to configure (repeatable). Defaults to the login shell
    #[arg(long = "shell", value_name = "SHELL", value_parser = parse_shell)]
    pub shells: Vec<ShellType>,

    /// Configure every shell found on this machine
    #[arg(long, conflicts_with = "shells")]
    pub all_shells: bool,

    /// Do not install the renderer when it is missing
    #[arg(long)]
    pub skip_install: bool,

    /// Show what would change without touching the file system
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct UninstallArgs {
    /// Shell to clean up (repeatable). Defaults to every known shell
    #[arg(long = "shell", value_name = "SHELL", value_parser = parse_shell)]
    pub shells: Vec<ShellType>,

    /// Show what would change without touching the file system
    #[arg(long)]
    pub dry_run: bool,
}

fn parse_shell(value: &str) -> Result<ShellType, String> {
    value.parse::<ShellType>().map_err(|error| error.to_string())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use termstrap_shell::ShellType;

    use super::{Cli, Commands};

    #[test]
    fn no_subcommand_means_install() {
        let cli = Cli::try_parse_from(["termstrap"]).expect("parse");
        let Commands::Install(args) = cli.command_or_default() else {
            panic!("expected install");
        };
        assert!(args.shells.is_empty());
        assert!(!args.dry_run);
    }

    #[test]
    fn repeated_shell_flags_are_collected() {
        let cli = Cli::try_parse_from([
            "termstrap", "install", "--shell", "zsh", "--shell", "fish", "--dry-run",
        ])
        .expect("parse");
        let Commands::Install(args) = cli.command_or_default() else {
            panic!("expected install");
        };
        assert_eq!(args.shells, vec![ShellType::Zsh, ShellType::Fish]);
        assert!(args.dry_run);
    }

    #[test]
    fn unknown_shell_is_rejected() {
        assert!(Cli::try_parse_from(["termstrap", "install", "--shell", "tcsh"]).is_err());
    }

    #[test]
    fn all_shells_conflicts_with_explicit_shells() {
        assert!(
            Cli::try_parse_from(["termstrap", "install", "--all-shells", "--shell", "bash"])
                .is_err()
        );
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from([
            "termstrap",
            "uninstall",
            "--verbose",
            "--settings",
            "/tmp/settings.json",
        ])
        .expect("parse");
        assert!(cli.verbose);
        assert_eq!(
            cli.settings.as_deref(),
            Some(std::path::Path::new("/tmp/settings.json"))
        );
        assert!(matches!(cli.command_or_default(), Commands::Uninstall(_)));
    }
}
