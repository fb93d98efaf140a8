//! Core utilities for termstrap that are independent of the CLI and of any
//! particular package manager:
//! - Fetching and vetting the renderer's install script.
//! - Rendering the prompt renderer's TOML configuration from style settings.

mod install_script;
mod prompt_config;

pub use install_script::{InstallScript, MAX_SCRIPT_BYTES, ScriptFetchError, fetch_install_script};
/// Prompt style model and TOML renderer.
pub use prompt_config::{PromptConfigError, PromptStyle, render_prompt_config};
