//! Configuration management with serde serialization/deserialization
//!
//! All settings for the audit tool: where the axe-core bundle lives, how the
//! headless browser is launched, and how long a single audit may take.

use crate::error::AxeError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for the audit tool
///
/// # Examples
///
/// ```rust
/// use axe_audit::Config;
///
/// // Use default configuration
/// let config = Config::default();
///
/// // Create custom configuration
/// let config = Config {
///     script_path: "vendor/axe.min.js".into(),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Filesystem path to the axe-core bundle injected into audited pages
    /// (default: `axe.min.js` in the current directory)
    pub script_path: PathBuf,

    /// Timeout for a single audit round trip, navigation included
    /// (default: 30 seconds)
    ///
    /// Pages that take longer than this fail with a timeout error; nothing
    /// is retried.
    pub audit_timeout: Duration,

    /// Browser viewport used while auditing
    ///
    /// Several axe rules (color contrast, target size) are sensitive to
    /// layout, so the viewport is part of the audit configuration.
    pub viewport: Viewport,

    /// Path to Chrome/Chromium executable (default: auto-detect)
    pub chrome_path: Option<String>,

    /// Custom User-Agent string for requests (default: Chrome default)
    pub user_agent: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            script_path: PathBuf::from("axe.min.js"),
            audit_timeout: Duration::from_secs(30),
            viewport: Viewport::default(),
            chrome_path: None,
            user_agent: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), AxeError> {
        if self.script_path.as_os_str().is_empty() {
            return Err(AxeError::ConfigurationError(
                "script path must not be empty".to_string(),
            ));
        }
        if self.audit_timeout.is_zero() {
            return Err(AxeError::ConfigurationError(
                "audit timeout must be greater than 0".to_string(),
            ));
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(AxeError::ConfigurationError(
                "viewport dimensions must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Browser viewport configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Viewport {
    /// Viewport width in pixels (default: 1920)
    pub width: u32,

    /// Viewport height in pixels (default: 1080)
    pub height: u32,

    /// Device pixel ratio for high-DPI displays (default: 1.0)
    pub device_scale_factor: f64,

    /// Whether to emulate a mobile device (default: false)
    pub mobile: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            device_scale_factor: 1.0,
            mobile: false,
        }
    }
}

/// Generate Chrome command-line arguments for headless auditing
///
/// # Examples
///
/// ```rust
/// use axe_audit::{Config, get_chrome_args};
///
/// let config = Config::default();
/// let args = get_chrome_args(&config);
/// assert!(args.contains(&"--headless".to_string()));
/// ```
pub fn get_chrome_args(config: &Config) -> Vec<String> {
    let mut args = vec![
        "--headless".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        "--disable-extensions".to_string(),
        "--disable-default-apps".to_string(),
        "--disable-sync".to_string(),
        "--no-first-run".to_string(),
        "--allow-running-insecure-content".to_string(),
        "--ignore-certificate-errors".to_string(),
        format!(
            "--window-size={},{}",
            config.viewport.width, config.viewport.height
        ),
    ];

    if let Some(user_agent) = &config.user_agent {
        args.push(format!("--user-agent={user_agent}"));
    }

    args
}

/// Build a chromiumoxide [`BrowserConfig`](chromiumoxide::browser::BrowserConfig)
/// from the tool configuration.
pub fn create_browser_config(
    config: &Config,
) -> Result<chromiumoxide::browser::BrowserConfig, AxeError> {
    use chromiumoxide::browser::BrowserConfig;

    let mut builder = BrowserConfig::builder()
        .window_size(config.viewport.width, config.viewport.height)
        .args(get_chrome_args(config));

    if let Some(chrome_path) = &config.chrome_path {
        builder = builder.chrome_executable(chrome_path);
    }

    builder.build().map_err(AxeError::ConfigurationError)
}
