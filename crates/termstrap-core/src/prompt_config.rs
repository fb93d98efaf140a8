use serde::{Deserialize, Serialize};
use thiserror::Error;

const SCHEMA_URL: &str = "https://starship.rs/config-schema.json";

const NAMED_COLORS: [&str; 16] = [
    "black",
    "red",
    "green",
    "yellow",
    "blue",
    "purple",
    "cyan",
    "white",
    "bright-black",
    "bright-red",
    "bright-green",
    "bright-yellow",
    "bright-blue",
    "bright-purple",
    "bright-cyan",
    "bright-white",
];

#[derive(Error, Debug)]
pub enum PromptConfigError {
    #[error("Invalid prompt style: {field} {reason}")]
    InvalidStyle {
        field: &'static str,
        reason: &'static str,
    },

    #[error("Failed to serialize prompt config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// The handful of style parameters termstrap fills into the renderer's
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptStyle {
    pub add_newline: bool,
    pub success_symbol: String,
    pub error_symbol: String,
    /// Named terminal color or `#rrggbb`.
    pub accent: String,
    pub directory_truncation: u8,
    pub show_git_status: bool,
    pub command_timeout_ms: u64,
}

impl Default for PromptStyle {
    fn default() -> Self {
        Self {
            add_newline: true,
            success_symbol: "❯".to_string(),
            error_symbol: "❯".to_string(),
            accent: "green".to_string(),
            directory_truncation: 3,
            show_git_status: true,
            command_timeout_ms: 500,
        }
    }
}

impl PromptStyle {
    /// # Errors
    /// Returns [`PromptConfigError::InvalidStyle`] naming the first bad field.
    pub fn validate(&self) -> Result<(), PromptConfigError> {
        for (field, symbol) in [
            ("success_symbol", &self.success_symbol),
            ("error_symbol", &self.error_symbol),
        ] {
            if symbol.trim().is_empty() {
                return Err(PromptConfigError::InvalidStyle {
                    field,
                    reason: "must not be empty",
                });
            }
            if symbol.contains(['\n', '\r', '[', ']']) {
                return Err(PromptConfigError::InvalidStyle {
                    field,
                    reason: "must be a single line without brackets",
                });
            }
        }

        if !is_color(&self.accent) {
            return Err(PromptConfigError::InvalidStyle {
                field: "accent",
                reason: "must be a named color or #rrggbb",
            });
        }

        if self.directory_truncation == 0 {
            return Err(PromptConfigError::InvalidStyle {
                field: "directory_truncation",
                reason: "must be at least 1",
            });
        }

        Ok(())
    }
}

fn is_color(value: &str) -> bool {
    if let Some(hex) = value.strip_prefix('#') {
        return hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    NAMED_COLORS.contains(&value)
}

#[derive(Serialize)]
struct RendererConfig {
    #[serde(rename = "$schema")]
    schema: &'static str,
    add_newline: bool,
    command_timeout: u64,
    character: CharacterModule,
    directory: DirectoryModule,
    git_status: GitStatusModule,
}

#[derive(Serialize)]
struct CharacterModule {
    success_symbol: String,
    error_symbol: String,
}

#[derive(Serialize)]
struct DirectoryModule {
    truncation_length: u8,
    style: String,
}

#[derive(Serialize)]
struct GitStatusModule {
    disabled: bool,
}

/// Render the renderer's TOML config for `style`, prefixed with `header` as
/// a comment line.
///
/// # Errors
/// Returns an error when the style is invalid or cannot be serialized.
pub fn render_prompt_config(style: &PromptStyle, header: &str) -> Result<String, PromptConfigError> {
    style.validate()?;

    let config = RendererConfig {
        schema: SCHEMA_URL,
        add_newline: style.add_newline,
        command_timeout: style.command_timeout_ms,
        character: CharacterModule {
            success_symbol: format!("[{}](bold {})", style.success_symbol, style.accent),
            error_symbol: format!("[{}](bold red)", style.error_symbol),
        },
        directory: DirectoryModule {
            truncation_length: style.directory_truncation,
            style: format!("bold {}", style.accent),
        },
        git_status: GitStatusModule {
            disabled: !style.show_git_status,
        },
    };

    let body = toml::to_string(&config)?;
    Ok(format!("# {header}\n\n{body}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(rendered: &str) -> toml::Table {
        toml::from_str(rendered).expect("rendered config parses")
    }

    #[test]
    fn default_style_renders_expected_tables() {
        let rendered =
            render_prompt_config(&PromptStyle::default(), "Generated by termstrap").expect("render");

        assert!(rendered.starts_with("# Generated by termstrap\n\n"));
        let value = parse(&rendered);
        assert_eq!(value["$schema"].as_str(), Some(SCHEMA_URL));
        assert_eq!(value["add_newline"].as_bool(), Some(true));
        assert_eq!(value["command_timeout"].as_integer(), Some(500));
        assert_eq!(
            value["character"]["success_symbol"].as_str(),
            Some("[❯](bold green)")
        );
        assert_eq!(
            value["character"]["error_symbol"].as_str(),
            Some("[❯](bold red)")
        );
        assert_eq!(value["directory"]["truncation_length"].as_integer(), Some(3));
        assert_eq!(value["git_status"]["disabled"].as_bool(), Some(false));
    }

    #[test]
    fn style_parameters_flow_into_config() {
        let style = PromptStyle {
            add_newline: false,
            success_symbol: "➜".to_string(),
            accent: "#ff8800".to_string(),
            directory_truncation: 1,
            show_git_status: false,
            ..PromptStyle::default()
        };
        let value = parse(&render_prompt_config(&style, "header").expect("render"));

        assert_eq!(value["add_newline"].as_bool(), Some(false));
        assert_eq!(
            value["character"]["success_symbol"].as_str(),
            Some("[➜](bold #ff8800)")
        );
        assert_eq!(value["directory"]["style"].as_str(), Some("bold #ff8800"));
        assert_eq!(value["git_status"]["disabled"].as_bool(), Some(true));
    }

    #[test]
    fn rejects_invalid_styles() {
        let empty_symbol = PromptStyle {
            success_symbol: " ".to_string(),
            ..PromptStyle::default()
        };
        assert!(matches!(
            empty_symbol.validate(),
            Err(PromptConfigError::InvalidStyle {
                field: "success_symbol",
                ..
            })
        ));

        let bad_color = PromptStyle {
            accent: "#12345".to_string(),
            ..PromptStyle::default()
        };
        assert!(matches!(
            render_prompt_config(&bad_color, "header"),
            Err(PromptConfigError::InvalidStyle { field: "accent", .. })
        ));

        let zero_truncation = PromptStyle {
            directory_truncation: 0,
            ..PromptStyle::default()
        };
        assert!(zero_truncation.validate().is_err());
    }

    #[test]
    fn style_deserializes_with_defaults_for_missing_fields() {
        let style: PromptStyle =
            serde_json::from_str(r#"{"accent": "blue"}"#).expect("deserialize style");
        assert_eq!(style.accent, "blue");
        assert_eq!(style.success_symbol, "❯");
        assert!(style.show_git_status);
    }
}
