//! # axe-audit
//!
//! Accessibility auditing for web pages, bridging headless Chrome
//! (via chromiumoxide) with the axe-core JavaScript rule engine. The crate
//! injects the bundled axe-core script into a page, invokes the engine's
//! entry point, and reshapes the JSON result into filtered violation sets,
//! a human-readable text report, or a persisted JSON file.
//!
//! The audit result itself is owned by the engine: this crate carries it
//! through unchanged apart from optional impact filtering and re-keying by
//! rule id.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use axe_audit::{Axe, BrowserSession, Config, ImpactFilter, Impact, format_violations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let session = BrowserSession::launch(&config).await?;
//!     let page = session.open("https://example.com").await?;
//!
//!     let mut axe = Axe::for_page(&page, &config.script_path)?;
//!     axe.inject().await?;
//!     let results = axe.run().await?;
//!
//!     let serious = ImpactFilter::at_least(Impact::Serious).apply(&results.violations);
//!     println!("{}", format_violations(&serious));
//!
//!     session.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ### Single audit
//! ```bash
//! axe-audit audit --url https://example.com --min-impact serious --output results.json
//! ```
//!
//! ### Batch auditing
//! ```bash
//! axe-audit batch --input urls.txt --output reports/
//! ```

/// Configuration and browser launch settings
pub mod config;

/// Error types
pub mod error;

/// Result structures, impact levels, and the impact filter
pub mod results;

/// Axe-core injection and audit invocation
pub mod axe;

/// Headless browser session management
pub mod session;

/// Text report formatting
pub mod report;

/// JSON result persistence
pub mod writer;

/// Command-line interface implementation
pub mod cli;

/// Utility functions and helpers
pub mod utils;


pub use axe::*;
pub use cli::*;
pub use config::*;
pub use error::*;
pub use report::*;
pub use results::*;
pub use session::*;
pub use utils::*;
pub use writer::*;
