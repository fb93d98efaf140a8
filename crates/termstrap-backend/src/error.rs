use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("No supported package manager found (tried: {tried})")]
    NoInstaller { tried: String },

    #[error("Installation via {manager} failed: {details}")]
    InstallFailed {
        manager: &'static str,
        details: String,
    },

    #[error("{package} is still missing after installing it with {manager}")]
    MissingAfterInstall {
        package: String,
        manager: &'static str,
    },

    #[error("IO error ({kind}): {message}")]
    IoError {
        kind: std::io::ErrorKind,
        message: String,
    },
}

impl BackendError {
    pub fn install_failed(manager: &'static str, details: impl Into<String>) -> Self {
        Self::InstallFailed {
            manager,
            details: details.into(),
        }
    }
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::IoError {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
