//! Backend endpoint resolution.
//!
//! The base URL is computed once when a [`Session`](crate::session::Session)
//! is created and then passed by value to the request client. Nothing in this
//! module reads the environment; callers hand in the configured override.

/// Base URL used when no override is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Where the client is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostContext {
    /// An interactive host with user configuration available (the CLI and shell).
    Client,
    /// No configuration environment (prerendering, embedded use). Always uses the default.
    Headless,
}

/// Resolve the backend base URL.
///
/// In [`HostContext::Client`] a non-empty `configured` value wins; anything
/// else falls back to [`DEFAULT_BASE_URL`]. [`HostContext::Headless`] never
/// looks at `configured`.
pub fn resolve_base_url(host: HostContext, configured: Option<&str>) -> String {
    match host {
        HostContext::Client => match configured.map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => DEFAULT_BASE_URL.to_string(),
        },
        HostContext::Headless => DEFAULT_BASE_URL.to_string(),
    }
}

/// Join a base URL and an absolute API path.
///
/// Exactly one trailing `/` is stripped from `base`; `path` is expected to
/// start with `/`.
pub fn build_url(base: &str, path: &str) -> String {
    let base = base.strip_suffix('/').unwrap_or(base);
    format!("{}{}", base, path)
}
