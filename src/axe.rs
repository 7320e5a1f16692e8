//! Axe-core injection and audit invocation
//!
//! The [`Axe`] wrapper owns nothing about the browser session: it borrows a
//! script-execution capability (any [`ScriptExecutor`], in practice a
//! chromiumoxide [`Page`]), reads the bundled axe-core script from disk,
//! injects it into the current document, and drives `axe.run(...)` through
//! the same capability.

use crate::error::AxeError;
use crate::results::{AxeResults, Rule};
use async_trait::async_trait;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::Page;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Script-execution capability the wrapper depends on.
///
/// `run_script` evaluates script text in the page context for its side
/// effects; `run_script_value` evaluates an expression, awaits any promise
/// it resolves to, and returns the result as JSON.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    async fn run_script(&self, script: &str) -> Result<(), AxeError>;

    async fn run_script_value(&self, expression: &str) -> Result<Value, AxeError>;
}

#[async_trait]
impl ScriptExecutor for Page {
    async fn run_script(&self, script: &str) -> Result<(), AxeError> {
        self.evaluate_expression(script)
            .await
            .map_err(|e| AxeError::PageError(e.to_string()))?;
        Ok(())
    }

    async fn run_script_value(&self, expression: &str) -> Result<Value, AxeError> {
        let params = EvaluateParams::builder()
            .expression(expression)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(AxeError::PageError)?;

        let result = self
            .evaluate(params)
            .await
            .map_err(|e| AxeError::PageError(e.to_string()))?;

        result
            .into_value()
            .map_err(|e| AxeError::InvalidResults(e.to_string()))
    }
}

/// Wrapper binding a page's script-execution capability to the axe-core
/// engine.
///
/// # Examples
///
/// ```rust,no_run
/// use axe_audit::{Axe, BrowserSession, Config};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Config::default();
///     let session = BrowserSession::launch(&config).await?;
///     let page = session.open("https://example.com").await?;
///
///     let mut axe = Axe::for_page(&page, &config.script_path)?;
///     axe.inject().await?;
///     let results = axe.run().await?;
///     println!("{} violations", results.violations.len());
///
///     session.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct Axe {
    executor: Arc<dyn ScriptExecutor>,
    script_path: PathBuf,
    injected: bool,
}

impl std::fmt::Debug for Axe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Axe")
            .field("script_path", &self.script_path)
            .field("injected", &self.injected)
            .finish_non_exhaustive()
    }
}

impl Axe {
    /// Create a wrapper around any script-execution capability.
    ///
    /// Fails with [`AxeError::ScriptNotFound`] before any page interaction
    /// when the script path does not point at a file.
    pub fn new(
        executor: Arc<dyn ScriptExecutor>,
        script_path: impl Into<PathBuf>,
    ) -> Result<Self, AxeError> {
        let script_path = script_path.into();
        if !script_path.is_file() {
            return Err(AxeError::ScriptNotFound(script_path));
        }

        Ok(Self {
            executor,
            script_path,
            injected: false,
        })
    }

    /// Convenience constructor for a chromiumoxide page.
    pub fn for_page(page: &Page, script_path: impl Into<PathBuf>) -> Result<Self, AxeError> {
        Self::new(Arc::new(page.clone()), script_path)
    }

    pub fn script_path(&self) -> &std::path::Path {
        &self.script_path
    }

    pub fn is_injected(&self) -> bool {
        self.injected
    }

    /// Read the full script text and evaluate it in the current document so
    /// the engine's entry point becomes callable.
    ///
    /// One-shot and idempotent from the page's perspective; calling it twice
    /// is harmless but wasteful. Not retried on failure.
    pub async fn inject(&mut self) -> Result<(), AxeError> {
        let source = tokio::fs::read_to_string(&self.script_path)
            .await
            .map_err(|e| AxeError::ScriptRead {
                path: self.script_path.clone(),
                message: e.to_string(),
            })?;

        debug!(
            "Injecting {} ({} bytes) into page",
            self.script_path.display(),
            source.len()
        );

        self.executor.run_script(&source).await.map_err(|e| match e {
            AxeError::PageError(msg) => AxeError::InjectionFailed(msg),
            other => other,
        })?;

        self.injected = true;
        Ok(())
    }

    /// Run the audit against the whole document with engine defaults.
    pub async fn run(&self) -> Result<AxeResults, AxeError> {
        self.run_with(None, None).await
    }

    /// Run the audit scoped to a CSS selector.
    pub async fn run_within(&self, selector: &str) -> Result<AxeResults, AxeError> {
        self.run_with(Some(Value::String(selector.to_string())), None)
            .await
    }

    /// Run the audit with an optional context (CSS selector string or axe
    /// include/exclude object) and an optional engine options object.
    ///
    /// Fails with [`AxeError::NotInjected`] when called before
    /// [`Axe::inject`] has succeeded.
    pub async fn run_with(
        &self,
        context: Option<Value>,
        options: Option<Value>,
    ) -> Result<AxeResults, AxeError> {
        if !self.injected {
            return Err(AxeError::NotInjected);
        }

        let expression = build_run_expression(context.as_ref(), options.as_ref())?;
        debug!("Running audit: {}", expression);

        let value = self
            .executor
            .run_script_value(&expression)
            .await
            .map_err(|e| match e {
                AxeError::PageError(msg) => AxeError::ExecutionFailed(msg),
                other => other,
            })?;

        serde_json::from_value(value).map_err(|e| AxeError::InvalidResults(e.to_string()))
    }

    /// List the accessibility rules the injected engine knows about.
    pub async fn rules(&self) -> Result<Vec<Rule>, AxeError> {
        if !self.injected {
            return Err(AxeError::NotInjected);
        }

        let value = self
            .executor
            .run_script_value("axe.getRules();")
            .await
            .map_err(|e| match e {
                AxeError::PageError(msg) => AxeError::ExecutionFailed(msg),
                other => other,
            })?;

        serde_json::from_value(value).map_err(|e| AxeError::InvalidResults(e.to_string()))
    }

    /// Start a chainable audit configuration.
    pub fn builder(&self) -> AxeBuilder<'_> {
        AxeBuilder {
            axe: self,
            include: Vec::new(),
            exclude: Vec::new(),
            options: None,
        }
    }
}

/// Build the `axe.run(...)` call expression.
///
/// When only options are supplied, the context argument is filled with the
/// engine's whole-document sentinel to keep argument order valid.
fn build_run_expression(
    context: Option<&Value>,
    options: Option<&Value>,
) -> Result<String, AxeError> {
    let mut command = String::from("axe.run(");

    match (context, options) {
        (None, None) => {}
        (Some(context), None) => {
            command.push_str(&serde_json::to_string(context)?);
        }
        (None, Some(options)) => {
            command.push_str("document, ");
            command.push_str(&serde_json::to_string(options)?);
        }
        (Some(context), Some(options)) => {
            command.push_str(&serde_json::to_string(context)?);
            command.push_str(", ");
            command.push_str(&serde_json::to_string(options)?);
        }
    }

    command.push_str(").then(function (results) { return results; });");
    Ok(command)
}

/// Chainable audit configuration: scope the audit with `include`/`exclude`
/// selectors and an engine options object before calling
/// [`analyze`](AxeBuilder::analyze).
pub struct AxeBuilder<'a> {
    axe: &'a Axe,
    include: Vec<String>,
    exclude: Vec<String>,
    options: Option<Value>,
}

impl<'a> AxeBuilder<'a> {
    /// Limit the audit to elements matching this selector.
    pub fn include(mut self, selector: impl Into<String>) -> Self {
        self.include.push(selector.into());
        self
    }

    /// Exclude elements matching this selector from the audit.
    pub fn exclude(mut self, selector: impl Into<String>) -> Self {
        self.exclude.push(selector.into());
        self
    }

    /// Set the engine options object passed to `axe.run`.
    pub fn options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }

    /// Run the audit with the accumulated configuration.
    pub async fn analyze(self) -> Result<AxeResults, AxeError> {
        self.axe.run_with(self.context(), self.options).await
    }

    // axe contexts wrap each selector in its own array (frame path form).
    fn context(&self) -> Option<Value> {
        if self.include.is_empty() && self.exclude.is_empty() {
            return None;
        }

        let mut context = serde_json::Map::new();
        if !self.include.is_empty() {
            let selectors: Vec<Vec<&str>> = self.include.iter().map(|s| vec![s.as_str()]).collect();
            context.insert("include".to_string(), serde_json::json!(selectors));
        }
        if !self.exclude.is_empty() {
            let selectors: Vec<Vec<&str>> = self.exclude.iter().map(|s| vec![s.as_str()]).collect();
            context.insert("exclude".to_string(), serde_json::json!(selectors));
        }

        Some(Value::Object(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn stub_script() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "window.axe = {{ run: function() {{}} }};").unwrap();
        file
    }

    fn audit_response() -> Value {
        json!({
            "violations": [],
            "incomplete": [],
            "passes": [{"id": "document-title", "nodes": []}],
            "inapplicable": []
        })
    }

    #[test]
    fn build_expression_without_arguments() {
        let expr = build_run_expression(None, None).unwrap();
        assert_eq!(expr, "axe.run().then(function (results) { return results; });");
    }

    #[test]
    fn build_expression_with_selector_context() {
        let context = Value::String("#main".to_string());
        let expr = build_run_expression(Some(&context), None).unwrap();
        assert_eq!(
            expr,
            "axe.run(\"#main\").then(function (results) { return results; });"
        );
    }

    #[test]
    fn build_expression_options_only_uses_document_sentinel() {
        let options = json!({"runOnly": {"type": "tag", "values": ["wcag2a"]}});
        let expr = build_run_expression(None, Some(&options)).unwrap();
        assert!(expr.starts_with("axe.run(document, {\"runOnly\""));
    }

    #[test]
    fn build_expression_with_context_and_options() {
        let context = Value::String("#nav".to_string());
        let options = json!({"resultTypes": ["violations"]});
        let expr = build_run_expression(Some(&context), Some(&options)).unwrap();
        assert!(expr.starts_with("axe.run(\"#nav\", {\"resultTypes\""));
    }

    #[test]
    fn new_fails_before_page_interaction_for_missing_script() {
        // No expectations: any call into the executor would panic the test.
        let executor = Arc::new(MockScriptExecutor::new());
        let err = Axe::new(executor, "/no/such/axe.min.js").unwrap_err();
        assert!(matches!(err, AxeError::ScriptNotFound(_)));
    }

    #[tokio::test]
    async fn run_without_injection_is_a_precondition_error() {
        let script = stub_script();
        let executor = Arc::new(MockScriptExecutor::new());
        let axe = Axe::new(executor, script.path()).unwrap();

        let err = axe.run().await.unwrap_err();
        assert!(matches!(err, AxeError::NotInjected));
        assert!(err.is_precondition());
    }

    #[tokio::test]
    async fn rules_without_injection_is_a_precondition_error() {
        let script = stub_script();
        let executor = Arc::new(MockScriptExecutor::new());
        let axe = Axe::new(executor, script.path()).unwrap();

        assert!(matches!(axe.rules().await, Err(AxeError::NotInjected)));
    }

    #[tokio::test]
    async fn inject_sends_script_contents_and_sets_flag() {
        let script = stub_script();

        let mut executor = MockScriptExecutor::new();
        executor
            .expect_run_script()
            .withf(|script| script.contains("window.axe"))
            .times(1)
            .returning(|_| Ok(()));

        let mut axe = Axe::new(Arc::new(executor), script.path()).unwrap();
        assert!(!axe.is_injected());
        axe.inject().await.unwrap();
        assert!(axe.is_injected());
    }

    #[tokio::test]
    async fn run_decodes_the_four_buckets() {
        let script = stub_script();

        let mut executor = MockScriptExecutor::new();
        executor.expect_run_script().returning(|_| Ok(()));
        executor
            .expect_run_script_value()
            .withf(|expr| expr.starts_with("axe.run()"))
            .times(1)
            .returning(|_| Ok(audit_response()));

        let mut axe = Axe::new(Arc::new(executor), script.path()).unwrap();
        axe.inject().await.unwrap();

        let results = axe.run().await.unwrap();
        assert!(results.violations.is_empty());
        assert_eq!(results.passes.len(), 1);
        assert!(results.incomplete.is_empty());
        assert!(results.inapplicable.is_empty());
    }

    #[tokio::test]
    async fn transport_failure_surfaces_as_execution_error() {
        let script = stub_script();

        let mut executor = MockScriptExecutor::new();
        executor.expect_run_script().returning(|_| Ok(()));
        executor
            .expect_run_script_value()
            .returning(|_| Err(AxeError::PageError("session closed".to_string())));

        let mut axe = Axe::new(Arc::new(executor), script.path()).unwrap();
        axe.inject().await.unwrap();

        let err = axe.run().await.unwrap_err();
        assert!(matches!(err, AxeError::ExecutionFailed(_)));
    }

    #[tokio::test]
    async fn injection_failure_is_wrapped() {
        let script = stub_script();

        let mut executor = MockScriptExecutor::new();
        executor
            .expect_run_script()
            .returning(|_| Err(AxeError::PageError("target crashed".to_string())));

        let mut axe = Axe::new(Arc::new(executor), script.path()).unwrap();
        let err = axe.inject().await.unwrap_err();
        assert!(matches!(err, AxeError::InjectionFailed(_)));
        assert!(!axe.is_injected());
    }

    #[tokio::test]
    async fn builder_scopes_the_run_expression() {
        let script = stub_script();

        let mut executor = MockScriptExecutor::new();
        executor.expect_run_script().returning(|_| Ok(()));
        executor
            .expect_run_script_value()
            .withf(|expr| {
                expr.contains("\"include\":[[\"#content\"]]")
                    && expr.contains("\"exclude\":[[\".ad-banner\"]]")
            })
            .times(1)
            .returning(|_| Ok(audit_response()));

        let mut axe = Axe::new(Arc::new(executor), script.path()).unwrap();
        axe.inject().await.unwrap();

        axe.builder()
            .include("#content")
            .exclude(".ad-banner")
            .analyze()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn builder_with_no_selectors_runs_unscoped() {
        let script = stub_script();

        let mut executor = MockScriptExecutor::new();
        executor.expect_run_script().returning(|_| Ok(()));
        executor
            .expect_run_script_value()
            .withf(|expr| expr.starts_with("axe.run(document, "))
            .times(1)
            .returning(|_| Ok(audit_response()));

        let mut axe = Axe::new(Arc::new(executor), script.path()).unwrap();
        axe.inject().await.unwrap();

        axe.builder()
            .options(json!({"rules": {"color-contrast": {"enabled": false}}}))
            .analyze()
            .await
            .unwrap();
    }
}
