use std::io::Write as _;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

/// Largest body accepted as an install script. The official starship
/// installer is a few tens of kilobytes.
pub const MAX_SCRIPT_BYTES: usize = 512 * 1024;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const BACKOFF: [Duration; 2] = [Duration::from_secs(2), Duration::from_secs(5)];

#[derive(Debug, thiserror::Error)]
pub enum ScriptFetchError {
    #[error("could not set up the HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("could not fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered HTTP {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("{url} sent {size} bytes, too large for an install script")]
    TooLarge { url: String, size: usize },

    #[error("{url} did not return a shell script")]
    NotAScript { url: String },

    #[error("install script checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
}

impl ScriptFetchError {
    /// Whether another attempt could succeed. Content problems and client
    /// errors repeat identically.
    fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::HttpStatus { status, .. } => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

/// An install script whose size, shebang and (when configured) digest have
/// been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallScript {
    body: Vec<u8>,
    sha256: String,
}

impl InstallScript {
    /// Accept `body` fetched from `url` as an install script.
    ///
    /// # Errors
    /// Rejects oversized bodies, bodies that do not start with a `#!` line
    /// (an HTML error or captive-portal page, say) and digests that do not
    /// match `expected_sha256`.
    pub fn from_body(
        url: &str,
        body: Vec<u8>,
        expected_sha256: Option<&str>,
    ) -> Result<Self, ScriptFetchError> {
        if body.len() > MAX_SCRIPT_BYTES {
            return Err(ScriptFetchError::TooLarge {
                url: url.to_string(),
                size: body.len(),
            });
        }
        if !body.starts_with(b"#!") {
            return Err(ScriptFetchError::NotAScript {
                url: url.to_string(),
            });
        }

        let sha256 = format!("{:x}", Sha256::digest(&body));
        match expected_sha256.map(str::trim) {
            Some(expected) if !expected.eq_ignore_ascii_case(&sha256) => {
                return Err(ScriptFetchError::ChecksumMismatch {
                    expected: expected.to_ascii_lowercase(),
                    actual: sha256,
                });
            }
            Some(_) => log::debug!("Install script digest verified"),
            None => log::warn!("No checksum configured for {url}; running it unverified"),
        }

        Ok(Self { body, sha256 })
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    /// Write the script to a fresh `.sh` file in the temp directory. The
    /// file is deleted when the returned handle drops.
    ///
    /// # Errors
    /// Returns an error when the temporary file cannot be created or written.
    pub fn to_temp_file(&self) -> std::io::Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("starship-install-")
            .suffix(".sh")
            .tempfile()?;
        file.write_all(&self.body)?;
        file.flush()?;
        Ok(file)
    }
}

/// Fetch the install script at `url`, retrying transient failures with a
/// short backoff.
///
/// # Errors
/// Returns the first non-transient failure, or the last transient one once
/// the retries are used up.
pub async fn fetch_install_script(
    url: &str,
    expected_sha256: Option<&str>,
) -> Result<InstallScript, ScriptFetchError> {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(concat!("termstrap/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ScriptFetchError::Client)?;

    let mut backoff = BACKOFF.iter();
    loop {
        match fetch_body(&client, url).await {
            Ok(body) => return InstallScript::from_body(url, body, expected_sha256),
            Err(error) if error.is_transient() => {
                let Some(delay) = backoff.next() else {
                    return Err(error);
                };
                log::warn!("{error}; retrying in {}s", delay.as_secs());
                tokio::time::sleep(*delay).await;
            }
            Err(error) => return Err(error),
        }
    }
}

async fn fetch_body(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, ScriptFetchError> {
    let transport = |source: reqwest::Error| ScriptFetchError::Transport {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        return Err(ScriptFetchError::HttpStatus {
            url: url.to_string(),
            status,
        });
    }

    let announced = response
        .content_length()
        .and_then(|length| usize::try_from(length).ok())
        .unwrap_or(0);
    if announced > MAX_SCRIPT_BYTES {
        return Err(ScriptFetchError::TooLarge {
            url: url.to_string(),
            size: announced,
        });
    }

    let body = response.bytes().await.map_err(transport)?;
    Ok(body.to_vec())
}
