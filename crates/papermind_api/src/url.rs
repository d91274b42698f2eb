use url::Url;

use crate::error::ApiError;

/// Default backend location (FastAPI development server).
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

pub const CHAT_PATH: &str = "/chat-bot/chat";
pub const BOTS_PATH: &str = "/chat-bot/";
pub const FILES_PATH: &str = "/files/";
pub const FILE_UPLOAD_PATH: &str = "/files/upload";
pub const LOGIN_PATH: &str = "/user/login";
pub const REGISTER_PATH: &str = "/user/register";

/// Validate a base URL and strip trailing slashes.
///
/// Blank input falls back to [`DEFAULT_BASE_URL`]; only `http` and `https`
/// schemes are accepted.
pub fn normalize_base_url(input: &str) -> Result<String, ApiError> {
    let base = if input.trim().is_empty() {
        DEFAULT_BASE_URL
    } else {
        input.trim()
    };

    let parsed = Url::parse(base).map_err(|error| ApiError::InvalidBaseUrl(format!("{base}: {error}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::InvalidBaseUrl(format!(
            "{base}: unsupported scheme '{}'",
            parsed.scheme()
        )));
    }

    Ok(base.trim_end_matches('/').to_string())
}

/// Join a normalized base URL and an absolute endpoint path.
pub fn endpoint_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
