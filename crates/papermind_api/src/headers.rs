use std::collections::BTreeMap;

use crate::config::ApiConfig;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_USER_AGENT: &str = "user-agent";

pub const ACCEPT_EVENT_STREAM: &str = "text/event-stream";
pub const ACCEPT_JSON: &str = "application/json";

/// Build a deterministic header map for PaperMind requests.
///
/// `content_type` is omitted for multipart bodies, where the client library
/// supplies the boundary.
pub fn build_headers(
    config: &ApiConfig,
    accept: &str,
    content_type: Option<&str>,
) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();

    if let Some(token) = config
        .access_token
        .as_deref()
        .and_then(sanitize_nonempty)
    {
        headers.insert(HEADER_AUTHORIZATION.to_owned(), format!("Bearer {token}"));
    }

    headers.insert(HEADER_ACCEPT.to_owned(), accept.to_owned());
    if let Some(content_type) = content_type {
        headers.insert(HEADER_CONTENT_TYPE.to_owned(), content_type.to_owned());
    }

    let ua = config
        .user_agent
        .as_deref()
        .and_then(sanitize_nonempty)
        .unwrap_or_else(default_user_agent);
    headers.insert(HEADER_USER_AGENT.to_owned(), ua);

    for (key, value) in &config.extra_headers {
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
    }

    headers
}

fn sanitize_nonempty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

fn default_user_agent() -> String {
    format!(
        "papermind/{} ({})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    )
}

#[cfg(test)]
mod tests {
    use super::{build_headers, ACCEPT_EVENT_STREAM, HEADER_AUTHORIZATION, HEADER_USER_AGENT};
    use crate::config::ApiConfig;

    #[test]
    fn bearer_header_is_omitted_without_token() {
        let headers = build_headers(&ApiConfig::default(), ACCEPT_EVENT_STREAM, None);
        assert!(!headers.contains_key(HEADER_AUTHORIZATION));
        assert!(headers[HEADER_USER_AGENT].starts_with("papermind/"));
    }

    #[test]
    fn extra_headers_are_lowercased_and_override_defaults() {
        let config = ApiConfig::default()
            .with_access_token("  tok  ")
            .insert_header("X-Trace", " abc ")
            .insert_header("User-Agent", "custom");
        let headers = build_headers(&config, ACCEPT_EVENT_STREAM, Some("application/json"));

        assert_eq!(headers[HEADER_AUTHORIZATION], "Bearer tok");
        assert_eq!(headers["x-trace"], "abc");
        assert_eq!(headers[HEADER_USER_AGENT], "custom");
        assert_eq!(headers["content-type"], "application/json");
    }
}
