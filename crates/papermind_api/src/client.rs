use std::future::Future;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::{parse_error_message, ApiError};
use crate::events::ChatStreamEvent;
use crate::headers::{build_headers, ACCEPT_EVENT_STREAM, ACCEPT_JSON};
use crate::payload::ChatRequest;
use crate::retry::{is_retryable_http_error, retry_delay};
use crate::sse::StreamDecoder;
use crate::url::{endpoint_url, normalize_base_url, CHAT_PATH};

/// Optional cancellation signal shared across request and stream loops.
pub type CancellationSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(&config.base_url)?;
        let http = Client::builder().build().map_err(ApiError::from)?;
        Ok(Self {
            http,
            config,
            base_url,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        endpoint_url(&self.base_url, path)
    }

    pub fn chat_endpoint(&self) -> String {
        self.endpoint(CHAT_PATH)
    }

    pub fn build_headers(
        &self,
        accept: &str,
        content_type: Option<&str>,
    ) -> Result<HeaderMap, ApiError> {
        let headers = build_headers(&self.config, accept, content_type);
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| ApiError::InvalidHeader(format!("invalid header key: {key}")))?,
                HeaderValue::from_str(&value)
                    .map_err(|_| ApiError::InvalidHeader(format!("invalid header value for {key}")))?,
            );
        }
        Ok(out)
    }

    pub fn build_chat_request(&self, request: &ChatRequest) -> Result<RequestBuilder, ApiError> {
        let headers = self.build_headers(ACCEPT_EVENT_STREAM, Some(ACCEPT_JSON))?;
        Ok(self.http.post(self.chat_endpoint()).headers(headers).json(request))
    }

    /// Starts a JSON request against `path`; REST helpers finish it.
    pub(crate) fn json_request(
        &self,
        method: reqwest::Method,
        path: &str,
        with_content_type: bool,
    ) -> Result<RequestBuilder, ApiError> {
        let content_type = with_content_type.then_some(ACCEPT_JSON);
        let headers = self.build_headers(ACCEPT_JSON, content_type)?;
        let mut builder = self.http.request(method, self.endpoint(path)).headers(headers);
        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder)
    }

    /// Sends a request built by `build`, retrying transient failures up to
    /// `config.max_retries` times.
    pub async fn send_with_retry<B>(
        &self,
        build: B,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<Response, ApiError>
    where
        B: FnMut() -> Result<RequestBuilder, ApiError>,
    {
        self.send_with_retry_within(build, cancellation, None).await
    }

    /// Like [`Self::send_with_retry`], but an attempt that sees no response
    /// headers within `header_timeout` fails with [`ApiError::IdleTimeout`].
    async fn send_with_retry_within<B>(
        &self,
        mut build: B,
        cancellation: Option<&CancellationSignal>,
        header_timeout: Option<Duration>,
    ) -> Result<Response, ApiError>
    where
        B: FnMut() -> Result<RequestBuilder, ApiError>,
    {
        let max_retries = self.config.max_retries;
        let mut last_status: Option<StatusCode> = None;
        let mut last_error = None;

        for attempt in 0..=max_retries {
            if is_cancelled(cancellation) {
                return Err(ApiError::Cancelled);
            }

            let send = build()?.send();
            let response = match header_timeout {
                Some(limit) => {
                    match await_or_cancel(tokio::time::timeout(limit, send), cancellation).await? {
                        Ok(response) => response.map_err(ApiError::from),
                        Err(_) => Err(ApiError::IdleTimeout(limit)),
                    }
                }
                None => await_or_cancel(send, cancellation)
                    .await?
                    .map_err(ApiError::from),
            };

            match response {
                Ok(response) => {
                    if response.status().is_success() {
                        return Ok(response);
                    }

                    let status = response.status();
                    last_status = Some(status);
                    let body = await_or_cancel(response.text(), cancellation)
                        .await?
                        .unwrap_or_else(|_| {
                            status
                                .canonical_reason()
                                .unwrap_or("request failed")
                                .to_string()
                        });
                    let message = parse_error_message(status, &body);
                    last_error = Some(message.clone());

                    if attempt < max_retries && is_retryable_http_error(status.as_u16(), &body) {
                        warn!(%status, attempt, "retrying request after error status");
                        await_or_cancel(tokio::time::sleep(retry_delay(attempt)), cancellation)
                            .await?;
                        continue;
                    }

                    return Err(ApiError::Status(status, message));
                }
                Err(error) => {
                    if max_retries == 0 {
                        return Err(error);
                    }
                    let message = error.to_string();
                    last_error = Some(message);
                    if attempt < max_retries {
                        warn!(attempt, error = %error, "retrying request after transport error");
                        await_or_cancel(tokio::time::sleep(retry_delay(attempt)), cancellation)
                            .await?;
                        continue;
                    }
                    return Err(ApiError::RetryExhausted {
                        status: last_status,
                        last_error,
                    });
                }
            }
        }

        Err(ApiError::RetryExhausted {
            status: last_status,
            last_error,
        })
    }

    /// Streams one chat exchange, invoking `on_event` for every decoded event
    /// in arrival order.
    ///
    /// Returns once the body ends or a `[DONE]` sentinel arrives. Waiting longer
    /// than `config.idle_timeout` for the response headers, or between body
    /// chunks, fails with [`ApiError::IdleTimeout`].
    pub async fn stream_chat_with_handler<F>(
        &self,
        request: &ChatRequest,
        cancellation: Option<&CancellationSignal>,
        mut on_event: F,
    ) -> Result<(), ApiError>
    where
        F: FnMut(ChatStreamEvent),
    {
        let response = self
            .send_with_retry_within(
                || self.build_chat_request(request),
                cancellation,
                self.config.idle_timeout,
            )
            .await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        debug!(content_type = content_type.as_deref().unwrap_or("n/a"), "chat stream opened");

        let mut decoder = StreamDecoder::for_content_type(content_type.as_deref());
        let mut bytes = response.bytes_stream();
        let idle_timeout = self.config.idle_timeout;

        loop {
            let next = match idle_timeout {
                Some(idle) => {
                    match await_or_cancel(tokio::time::timeout(idle, bytes.next()), cancellation)
                        .await?
                    {
                        Ok(next) => next,
                        Err(_) => return Err(ApiError::IdleTimeout(idle)),
                    }
                }
                None => await_or_cancel(bytes.next(), cancellation).await?,
            };
            let Some(chunk) = next else {
                break;
            };
            if is_cancelled(cancellation) {
                return Err(ApiError::Cancelled);
            }

            let chunk = chunk.map_err(ApiError::from)?;
            for event in decoder.feed(&chunk) {
                if event.is_done() {
                    debug!("chat stream reached done sentinel");
                    return Ok(());
                }
                on_event(event);
            }
        }

        if is_cancelled(cancellation) {
            return Err(ApiError::Cancelled);
        }

        for event in decoder.finish() {
            if event.is_done() {
                break;
            }
            on_event(event);
        }

        Ok(())
    }

    /// Collects every event of one chat exchange.
    pub async fn stream_chat(
        &self,
        request: &ChatRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<Vec<ChatStreamEvent>, ApiError> {
        let mut events = Vec::new();
        self.stream_chat_with_handler(request, cancellation, |event| events.push(event))
            .await?;
        Ok(events)
    }
}

fn is_cancelled(cancel: Option<&CancellationSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, ApiError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(ApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(ApiError::Cancelled);
            }
            return Ok(output);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::{await_or_cancel, ApiClient};
    use crate::config::ApiConfig;
    use crate::error::ApiError;
    use crate::payload::{ChatRequest, HistoryEntry};

    #[test]
    fn chat_request_targets_chat_endpoint_with_wire_payload() {
        let client = ApiClient::new(ApiConfig::new("http://localhost:8000/")).expect("client");
        let request = ChatRequest::new(
            "What is X?",
            Some("ns-1".to_string()),
            vec![HistoryEntry::new("", "Hi")],
        );

        let http_request = client
            .build_chat_request(&request)
            .expect("build request")
            .build()
            .expect("request");

        assert_eq!(http_request.url().as_str(), "http://localhost:8000/chat-bot/chat");
        assert_eq!(http_request.method(), "POST");
        assert_eq!(
            http_request.headers()["accept"].to_str().expect("ascii"),
            "text/event-stream"
        );

        let body = http_request
            .body()
            .and_then(|body| body.as_bytes())
            .expect("json body is buffered");
        let value: serde_json::Value = serde_json::from_slice(body).expect("body is JSON");
        assert_eq!(value["chatHistory"][0]["Ai_response"], "Hi");
        assert_eq!(value["namespace_id"], "ns-1");
    }

    #[test]
    fn client_rejects_non_http_base_url() {
        let error = ApiClient::new(ApiConfig::new("ftp://example.com")).expect_err("scheme");
        assert!(matches!(error, ApiError::InvalidBaseUrl(_)));
    }

    #[tokio::test]
    async fn await_or_cancel_short_circuits_raised_signal() {
        let cancel = Arc::new(AtomicBool::new(true));
        let result = await_or_cancel(std::future::pending::<()>(), Some(&cancel)).await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }

    #[tokio::test]
    async fn await_or_cancel_passes_output_through() {
        let cancel = Arc::new(AtomicBool::new(false));
        let result = await_or_cancel(async { 7 }, Some(&cancel)).await;
        assert_eq!(result.expect("not cancelled"), 7);
        cancel.store(true, Ordering::Release);
    }
}
