use crate::error::AxeError;
use url::Url;

/// Accepts `http`/`https` plus `file` and `about`, so local fixture pages
/// and `about:blank` (used to host the engine for rule listing) can be
/// audited.
pub fn validate_url(url: &str) -> Result<Url, AxeError> {
    let parsed = Url::parse(url).map_err(|e| AxeError::InvalidUrl(format!("{url}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" | "file" | "about" => Ok(parsed),
        scheme => Err(AxeError::InvalidUrl(format!(
            "{url}: unsupported scheme '{scheme}'"
        ))),
    }
}

pub fn sanitize_filename(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Output filename for a batch-audited URL.
pub fn results_filename(url: &str) -> String {
    let stripped = url
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    format!("{}.json", sanitize_filename(stripped))
}
