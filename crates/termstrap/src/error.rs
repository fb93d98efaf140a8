use std::process::ExitCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppErrorDetail {
    Message(String),
    Io {
        kind: std::io::ErrorKind,
        message: String,
    },
    Backend(termstrap_backend::BackendError),
}

impl AppErrorDetail {
    fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

impl std::fmt::Display for AppErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message(message) => write!(f, "{message}"),
            Self::Io { kind, message } => write!(f, "{kind}: {message}"),
            Self::Backend(error) => write!(f, "{error}"),
        }
    }
}

impl From<String> for AppErrorDetail {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

impl From<&str> for AppErrorDetail {
    fn from(value: &str) -> Self {
        Self::Message(value.to_string())
    }
}

impl From<std::io::Error> for AppErrorDetail {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl From<termstrap_backend::BackendError> for AppErrorDetail {
    fn from(value: termstrap_backend::BackendError) -> Self {
        Self::Backend(value)
    }
}

impl From<termstrap_shell::BlockError> for AppErrorDetail {
    fn from(value: termstrap_shell::BlockError) -> Self {
        let message = value.to_string();
        match value {
            termstrap_shell::BlockError::NotFound { .. } => Self::Io {
                kind: std::io::ErrorKind::NotFound,
                message,
            },
            termstrap_shell::BlockError::PermissionDenied { .. } => Self::Io {
                kind: std::io::ErrorKind::PermissionDenied,
                message,
            },
            termstrap_shell::BlockError::Io { source, .. } => Self::Io {
                kind: source.kind(),
                message,
            },
            termstrap_shell::BlockError::MalformedMarkerSpan { .. } => Self::Message(message),
        }
    }
}

impl From<termstrap_core::PromptConfigError> for AppErrorDetail {
    fn from(value: termstrap_core::PromptConfigError) -> Self {
        Self::Message(value.to_string())
    }
}

impl From<termstrap_platform::HostEnvError> for AppErrorDetail {
    fn from(value: termstrap_platform::HostEnvError) -> Self {
        Self::Message(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    Message(String),
    EnvironmentUnavailable {
        reason: AppErrorDetail,
    },
    DependencyMissing {
        dependency: &'static str,
        details: AppErrorDetail,
    },
    ShellNotSupported {
        shell: &'static str,
    },
    NoTargetShells,
    ShellConfigPathNotFound {
        shell: &'static str,
    },
    ShellConfigFailed {
        shell: &'static str,
        action: &'static str,
        details: AppErrorDetail,
    },
    PromptConfigFailed {
        action: &'static str,
        details: AppErrorDetail,
    },
}

impl AppError {
    pub fn environment_unavailable(reason: impl Into<AppErrorDetail>) -> Self {
        Self::EnvironmentUnavailable {
            reason: reason.into(),
        }
    }

    pub fn dependency_missing(
        dependency: &'static str,
        details: impl Into<AppErrorDetail>,
    ) -> Self {
        Self::DependencyMissing {
            dependency,
            details: details.into(),
        }
    }

    pub fn shell_not_supported(shell: &'static str) -> Self {
        Self::ShellNotSupported { shell }
    }

    pub fn shell_config_path_not_found(shell: &'static str) -> Self {
        Self::ShellConfigPathNotFound { shell }
    }

    pub fn shell_config_failed(
        shell: &'static str,
        action: &'static str,
        details: impl Into<AppErrorDetail>,
    ) -> Self {
        Self::ShellConfigFailed {
            shell,
            action,
            details: details.into(),
        }
    }

    pub fn prompt_config_failed(action: &'static str, details: impl Into<AppErrorDetail>) -> Self {
        Self::PromptConfigFailed {
            action,
            details: details.into(),
        }
    }

    /// Process exit status: 3 for a missing external dependency, 4 for a
    /// file-system failure, 1 for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::DependencyMissing { .. } => 3,
            Self::ShellConfigFailed { details, .. } => {
                if details.is_io() {
                    4
                } else {
                    1
                }
            }
            Self::PromptConfigFailed { details, .. } if details.is_io() => 4,
            _ => 1,
        }
    }
}

impl From<AppError> for ExitCode {
    fn from(error: AppError) -> Self {
        ExitCode::from(error.exit_code())
    }
}

impl From<String> for AppError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

impl From<&str> for AppError {
    fn from(value: &str) -> Self {
        Self::Message(value.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message(message) => write!(f, "{message}"),
            Self::EnvironmentUnavailable { reason } => {
                write!(f, "Could not inspect the host environment: {reason}")
            }
            Self::DependencyMissing {
                dependency,
                details,
            } => write!(f, "Required dependency {dependency} is unavailable: {details}"),
            Self::ShellNotSupported { shell } => write!(f, "{shell} shell is not supported"),
            Self::NoTargetShells => write!(f, "No configurable shell found"),
            Self::ShellConfigPathNotFound { shell } => {
                write!(f, "No shell config file path found for {shell}")
            }
            Self::ShellConfigFailed {
                shell,
                action,
                details,
            } => write!(f, "{shell} shell {action} failed: {details}"),
            Self::PromptConfigFailed { action, details } => {
                write!(f, "Prompt config {action} failed: {details}")
            }
        }
    }
}

impl std::error::Error for AppError {}
