use reqwest::StatusCode;

use papermind_api::error::parse_error_message;

#[test]
fn parse_error_message_prefers_message_field() {
    let body = r#"{"message":"Bot name already exists","error":"conflict"}"#;
    let message = parse_error_message(StatusCode::CONFLICT, body);
    assert_eq!(message, "Bot name already exists");
}

#[test]
fn parse_error_message_falls_back_to_error_then_detail() {
    let message = parse_error_message(StatusCode::UNAUTHORIZED, r#"{"error":"Invalid token"}"#);
    assert_eq!(message, "Invalid token");

    let message = parse_error_message(StatusCode::NOT_FOUND, r#"{"detail":"Not Found"}"#);
    assert_eq!(message, "Not Found");
}

#[test]
fn parse_error_message_joins_validation_details() {
    let body = r#"{"detail":[{"loc":["body","question"],"msg":"field required"},{"msg":"value is not a valid string"}]}"#;
    let message = parse_error_message(StatusCode::UNPROCESSABLE_ENTITY, body);
    assert_eq!(message, "field required; value is not a valid string");
}

#[test]
fn parse_error_message_falls_back_to_raw_body_or_reason() {
    assert_eq!(
        parse_error_message(StatusCode::INTERNAL_SERVER_ERROR, "raw failure text"),
        "raw failure text"
    );
    assert_eq!(
        parse_error_message(StatusCode::BAD_GATEWAY, ""),
        "Bad Gateway"
    );
}
