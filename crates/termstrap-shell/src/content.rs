use std::path::{Path, PathBuf};

use crate::detect::ShellType;

pub const RENDERER_BINARY: &str = "starship";

/// Extra statements placed before the renderer's init line.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Directory holding the renderer binary when it is not on `PATH`.
    pub path_prefix: Option<PathBuf>,
    /// Renderer config written somewhere other than its default location.
    pub renderer_config: Option<PathBuf>,
}

#[must_use]
pub fn init_statement(shell: ShellType) -> Option<String> {
    match shell {
        ShellType::Bash | ShellType::Zsh => Some(format!(
            "eval \"$({RENDERER_BINARY} init {})\"",
            shell.id()
        )),
        ShellType::Fish => Some(format!("{RENDERER_BINARY} init fish | source")),
        ShellType::PowerShell => Some(format!(
            "Invoke-Expression (&{RENDERER_BINARY} init powershell)"
        )),
        ShellType::Cmd => None,
    }
}

/// Payload lines for the managed block of `shell`. `None` for shells that
/// have no startup file.
#[must_use]
pub fn block_content(shell: ShellType, options: &InitOptions) -> Option<Vec<String>> {
    let init = init_statement(shell)?;
    let mut lines = Vec::new();

    if let Some(dir) = &options.path_prefix {
        lines.push(path_prefix_statement(shell, dir));
    }
    if let Some(config) = &options.renderer_config {
        lines.push(export_statement(shell, "STARSHIP_CONFIG", config));
    }
    lines.push(init);

    Some(lines)
}

fn path_prefix_statement(shell: ShellType, dir: &Path) -> String {
    let dir = dir.display().to_string();
    match shell {
        ShellType::Fish => format!("set -gx PATH {} $PATH", double_quoted(&dir)),
        ShellType::PowerShell => format!(
            "$env:PATH = {} + [IO.Path]::PathSeparator + $env:PATH",
            single_quoted(&dir)
        ),
        _ => format!("export PATH=\"{}:$PATH\"", escape_double(&dir)),
    }
}

fn export_statement(shell: ShellType, name: &str, value: &Path) -> String {
    let value = value.display().to_string();
    match shell {
        ShellType::Fish => format!("set -gx {name} {}", double_quoted(&value)),
        ShellType::PowerShell => format!("$env:{name} = {}", single_quoted(&value)),
        _ => format!("export {name}={}", double_quoted(&value)),
    }
}

/// Escapes `\`, `"`, `$` and backtick for a POSIX or fish double-quoted string.
fn escape_double(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn double_quoted(value: &str) -> String {
    format!("\"{}\"", escape_double(value))
}

fn single_quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
