use papermind_api::retry::*;

#[test]
fn retry_http_status_is_retryable() {
    assert!(is_retryable_http_error(429, ""));
    assert!(is_retryable_http_error(502, ""));
    assert!(is_retryable_http_error(503, ""));
    assert!(!is_retryable_http_error(400, "invalid request"));
    assert!(!is_retryable_http_error(401, ""));
}

#[test]
fn retry_http_error_pattern_is_retryable() {
    assert!(is_retryable_http_error(400, "upstream connect error"));
    assert!(is_retryable_http_error(400, "Service Unavailable"));
}

#[test]
fn retry_delay_is_exponential() {
    assert_eq!(retry_delay(0).as_millis(), 1000);
    assert_eq!(retry_delay(1).as_millis(), 2000);
    assert_eq!(retry_delay(3).as_millis(), 8000);
}

#[test]
fn retries_are_disabled_by_default() {
    assert_eq!(DEFAULT_MAX_RETRIES, 0);
    assert_eq!(papermind_api::ApiConfig::default().max_retries, 0);
}
