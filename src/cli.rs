use crate::{
    format_violations, results_filename, write_results, Axe, AxeResults, BrowserSession, Config,
    Impact, ImpactFilter,
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use tokio::fs;
use tokio::time::timeout;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "axe-audit")]
#[command(about = "Accessibility auditing with axe-core and headless Chrome")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, help = "Configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Path to the axe-core script bundle")]
    pub script: Option<PathBuf>,

    #[arg(long, help = "Audit timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, help = "Chrome executable path")]
    pub chrome_path: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Audit a single URL and print a violation report
    Audit {
        #[arg(short, long, help = "URL to audit")]
        url: String,

        #[arg(long, help = "CSS selector scoping the audit to part of the page")]
        context: Option<String>,

        #[arg(long, help = "Engine options as a JSON object")]
        options: Option<String>,

        #[arg(long, help = "Only report violations at or above this impact level")]
        min_impact: Option<Impact>,

        #[arg(short, long, help = "Write the full JSON results to this file")]
        output: Option<PathBuf>,
    },

    /// Audit URLs from a file, one JSON result file per URL
    Batch {
        #[arg(short, long, help = "Input file containing URLs (one per line)")]
        input: PathBuf,

        #[arg(short, long, help = "Output directory for result files")]
        output: PathBuf,

        #[arg(long, help = "Only report violations at or above this impact level")]
        min_impact: Option<Impact>,
    },

    /// List the accessibility rules the engine knows about
    Rules {
        #[arg(long, default_value = "about:blank", help = "Page to load the engine in")]
        url: String,
    },

    /// Format a saved results file as a text report
    Report {
        #[arg(short, long, help = "Results JSON file written by a previous audit")]
        input: PathBuf,

        #[arg(long, help = "Only report violations at or above this impact level")]
        min_impact: Option<Impact>,
    },

    /// Validate a configuration file
    Validate {
        #[arg(short, long, help = "Configuration file to validate")]
        config: PathBuf,
    },
}

pub struct CliRunner {
    pub config: Config,
}

impl CliRunner {
    pub fn new(mut config: Config, args: &Cli) -> anyhow::Result<Self> {
        // Override config with CLI args
        if let Some(script) = &args.script {
            config.script_path = script.clone();
        }
        if let Some(secs) = args.timeout {
            config.audit_timeout = std::time::Duration::from_secs(secs);
        }
        if let Some(chrome_path) = &args.chrome_path {
            config.chrome_path = Some(chrome_path.clone());
        }

        config.validate()?;
        Ok(Self { config })
    }

    pub async fn run(&self, command: Commands) -> anyhow::Result<()> {
        match command {
            Commands::Audit {
                url,
                context,
                options,
                min_impact,
                output,
            } => self.run_audit(url, context, options, min_impact, output).await,
            Commands::Batch {
                input,
                output,
                min_impact,
            } => self.run_batch(input, output, min_impact).await,
            Commands::Rules { url } => self.run_rules(url).await,
            Commands::Report { input, min_impact } => self.run_report(input, min_impact).await,
            Commands::Validate { config } => self.validate_config(config).await,
        }
    }

    async fn run_audit(
        &self,
        url: String,
        context: Option<String>,
        options: Option<String>,
        min_impact: Option<Impact>,
        output: Option<PathBuf>,
    ) -> anyhow::Result<()> {
        info!("Auditing {}", url);

        let options: Option<Value> = options
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .context("--options is not valid JSON")?;

        let session = BrowserSession::launch(&self.config).await?;
        let result = self.audit_page(&session, &url, context, options).await;
        session.shutdown().await;
        let results = result?;

        let filter = ImpactFilter::from(min_impact);
        let violations = filter.apply(&results.violations);
        println!("{}", format_violations(&violations));

        if let Some(path) = output {
            let written = write_results(&results, Some(&path)).await?;
            info!("Full results written to {}", written.display());
        }

        Ok(())
    }

    async fn run_batch(
        &self,
        input: PathBuf,
        output: PathBuf,
        min_impact: Option<Impact>,
    ) -> anyhow::Result<()> {
        let urls = read_urls_from_file(&input).await?;
        info!("Loaded {} URLs from {}", urls.len(), input.display());

        fs::create_dir_all(&output)
            .await
            .with_context(|| format!("failed to create {}", output.display()))?;

        let filter = ImpactFilter::from(min_impact);
        let session = BrowserSession::launch(&self.config).await?;

        let mut audited = 0usize;
        let mut failed = 0usize;
        let mut total_violations = 0usize;

        for url in &urls {
            match self.audit_page(&session, url, None, None).await {
                Ok(results) => {
                    let violations = filter.apply(&results.violations);
                    total_violations += violations.len();
                    audited += 1;

                    let path = output.join(results_filename(url));
                    write_results(&results, Some(&path)).await?;
                    info!(
                        "{}: {} violations, results saved to {}",
                        url,
                        violations.len(),
                        path.display()
                    );
                }
                Err(e) => {
                    failed += 1;
                    warn!("Failed to audit {}: {}", url, e);
                }
            }
        }

        session.shutdown().await;

        info!(
            "Batch audit completed. Audited: {}, Failed: {}, Violations: {}",
            audited, failed, total_violations
        );
        Ok(())
    }

    async fn run_rules(&self, url: String) -> anyhow::Result<()> {
        let session = BrowserSession::launch(&self.config).await?;

        let result = async {
            let page = session.open(&url).await?;
            let mut axe = Axe::for_page(&page, &self.config.script_path)?;
            axe.inject().await?;
            axe.rules().await
        }
        .await;
        session.shutdown().await;

        let rules = result?;
        println!("{} accessibility rules:", rules.len());
        for rule in rules {
            println!("  {} - {}", rule.rule_id, rule.description);
        }

        Ok(())
    }

    async fn run_report(&self, input: PathBuf, min_impact: Option<Impact>) -> anyhow::Result<()> {
        let results = crate::read_results(&input).await?;
        let filter = ImpactFilter::from(min_impact);
        println!("{}", format_violations(&filter.apply(&results.violations)));
        Ok(())
    }

    async fn validate_config(&self, config_path: PathBuf) -> anyhow::Result<()> {
        println!("Validating configuration: {}", config_path.display());

        let content = fs::read_to_string(&config_path)
            .await
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;

        println!("Configuration is valid:");
        println!("  Script path: {}", config.script_path.display());
        println!("  Audit timeout: {:?}", config.audit_timeout);
        println!(
            "  Viewport: {}x{}",
            config.viewport.width, config.viewport.height
        );

        Ok(())
    }

    /// Open a page, inject the engine, and run one audit under the
    /// configured timeout.
    ///
    /// The page is closed on every exit. Dropping a chromiumoxide page does
    /// not close the browser tab, and batch runs share one session, so a
    /// failed or timed-out audit must not leave its tab behind.
    pub(crate) async fn audit_page(
        &self,
        session: &BrowserSession,
        url: &str,
        context: Option<String>,
        options: Option<Value>,
    ) -> Result<AxeResults, crate::AxeError> {
        let page = timeout(self.config.audit_timeout, session.open(url))
            .await
            .map_err(|_| crate::AxeError::Timeout(self.config.audit_timeout))??;

        let audit = async {
            let mut axe = Axe::for_page(&page, &self.config.script_path)?;
            axe.inject().await?;

            let context = context.map(Value::String);
            axe.run_with(context, options).await
        };

        let result = match timeout(self.config.audit_timeout, audit).await {
            Ok(result) => result,
            Err(_) => Err(crate::AxeError::Timeout(self.config.audit_timeout)),
        };

        let _ = page.close().await;
        result
    }
}

pub async fn read_urls_from_file(path: &PathBuf) -> anyhow::Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let urls: Vec<String> = content
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.to_string())
        .collect();

    Ok(urls)
}

pub fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_read_urls_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# audit targets").unwrap();
        writeln!(file, "https://example.com").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  https://example.org/about  ").unwrap();
        writeln!(file, "   ").unwrap();
        writeln!(file, "# temporarily disabled").unwrap();
        writeln!(file, "https://example.net").unwrap();

        let urls = read_urls_from_file(&file.path().to_path_buf())
            .await
            .unwrap();
        assert_eq!(
            urls,
            vec![
                "https://example.com".to_string(),
                "https://example.org/about".to_string(),
                "https://example.net".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_read_urls_from_missing_file() {
        let path = PathBuf::from("/no/such/urls.txt");
        assert!(read_urls_from_file(&path).await.is_err());
    }
}
