use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AxeError {
    #[error("Axe script not found: {0}")]
    ScriptNotFound(PathBuf),

    #[error("Failed to read axe script {path}: {message}")]
    ScriptRead { path: PathBuf, message: String },

    #[error("Script injection failed: {0}")]
    InjectionFailed(String),

    #[error("Axe has not been injected into the page; call inject() before running an audit")]
    NotInjected,

    #[error("Audit execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Audit returned an unexpected result shape: {0}")]
    InvalidResults(String),

    #[error("Browser launch failed: {0}")]
    BrowserLaunchFailed(String),

    #[error("Page error: {0}")]
    PageError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Failed to write results to {path}: {message}")]
    WriteFailed { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl AxeError {
    /// True for failures the caller caused (bad path, missing injection)
    /// as opposed to failures coming back from the browser transport.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            AxeError::ScriptNotFound(_)
                | AxeError::NotInjected
                | AxeError::InvalidUrl(_)
                | AxeError::ConfigurationError(_)
        )
    }
}

impl From<std::io::Error> for AxeError {
    fn from(err: std::io::Error) -> Self {
        AxeError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for AxeError {
    fn from(err: serde_json::Error) -> Self {
        AxeError::SerializationError(err.to_string())
    }
}
