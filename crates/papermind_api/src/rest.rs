//! Request/response shapes and calls for the REST collaborators: accounts,
//! bots and uploaded files.
//!
//! The backend stores records in MongoDB and returns extended JSON
//! (`{"$oid": ..}`, `{"$date": ..}`); these are flattened to plain strings on
//! the way in.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::url::{BOTS_PATH, FILES_PATH, FILE_UPLOAD_PATH, LOGIN_PATH, REGISTER_PATH};

/// Response envelope shared by every REST endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope<T> {
    pub message: Option<String>,
    pub result: Option<T>,
}

impl<T> Envelope<T> {
    /// Returns the result or [`ApiError::MissingResult`] naming `endpoint`.
    pub fn into_result(self, endpoint: &'static str) -> Result<T, ApiError> {
        self.result.ok_or(ApiError::MissingResult(endpoint))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub company_name: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBot {
    pub bot_name: String,
    pub description: String,
}

/// Knowledge bot as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Bot {
    #[serde(rename = "_id", deserialize_with = "extended_string")]
    pub id: String,
    #[serde(default)]
    pub bot_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub namespace_id: Option<String>,
    #[serde(default, deserialize_with = "extended_string_opt")]
    pub created_at: Option<String>,
}

/// Uploaded document belonging to a bot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoredFile {
    #[serde(rename = "_id", deserialize_with = "extended_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub namespace_id: Option<String>,
    #[serde(rename = "createdAt", default, deserialize_with = "extended_string_opt")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteFileRequest {
    pub id: String,
    pub name: String,
    pub namespace_id: Option<String>,
}

impl From<&StoredFile> for DeleteFileRequest {
    fn from(file: &StoredFile) -> Self {
        Self {
            id: file.id.clone(),
            name: file.name.clone(),
            namespace_id: file.namespace_id.clone(),
        }
    }
}

/// Flattens MongoDB extended JSON scalars to their plain string form.
pub fn extended_value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(map) => ["$oid", "$date", "$numberLong"]
            .iter()
            .find_map(|key| map.get(*key))
            .map(extended_value_text)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}

fn extended_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(extended_value_text(&value))
}

fn extended_string_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .filter(|value| !value.is_null())
        .map(|value| extended_value_text(&value)))
}

impl ApiClient {
    pub async fn login(&self, request: &LoginRequest) -> Result<Envelope<Value>, ApiError> {
        self.send_json(Method::POST, LOGIN_PATH, Some(request)).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<Envelope<Value>, ApiError> {
        self.send_json(Method::POST, REGISTER_PATH, Some(request)).await
    }

    pub async fn list_bots(&self) -> Result<Vec<Bot>, ApiError> {
        self.send_json::<(), Vec<Bot>>(Method::GET, BOTS_PATH, None)
            .await?
            .into_result(BOTS_PATH)
    }

    pub async fn create_bot(&self, bot: &NewBot) -> Result<Envelope<Value>, ApiError> {
        self.send_json(Method::POST, BOTS_PATH, Some(bot)).await
    }

    pub async fn list_files(&self, chatbot_id: &str) -> Result<Vec<StoredFile>, ApiError> {
        let response = self
            .send_with_retry(
                || {
                    Ok(self
                        .json_request(Method::GET, FILES_PATH, false)?
                        .query(&[("chatbot_id", chatbot_id)]))
                },
                None,
            )
            .await?;
        let envelope: Envelope<Vec<StoredFile>> = decode_json(response).await?;
        envelope.into_result(FILES_PATH)
    }

    pub async fn delete_file(&self, request: &DeleteFileRequest) -> Result<Envelope<Value>, ApiError> {
        self.send_json(Method::DELETE, FILES_PATH, Some(request)).await
    }

    /// Uploads one document as multipart form data.
    pub async fn upload_file(
        &self,
        chatbot_id: &str,
        namespace_id: &str,
        path: &Path,
    ) -> Result<Envelope<Value>, ApiError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload.pdf")
            .to_string();
        debug!(file = %file_name, size = bytes.len(), "uploading document");

        // Multipart forms are single-use, so the upload is never retried.
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/pdf")?;
        let form = Form::new()
            .text("chatbot_id", chatbot_id.to_string())
            .text("namespace_id", namespace_id.to_string())
            .part("files", part);

        let response = self
            .json_request(Method::POST, FILE_UPLOAD_PATH, false)?
            .multipart(form)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        decode_json(response).await
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        path: &'static str,
        body: Option<&B>,
    ) -> Result<Envelope<T>, ApiError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .send_with_retry(
                || {
                    let builder = self.json_request(method.clone(), path, body.is_some())?;
                    Ok(match body {
                        Some(body) => builder.json(body),
                        None => builder,
                    })
                },
                None,
            )
            .await?;
        decode_json(response).await
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status(
        status,
        crate::error::parse_error_message(status, &body),
    ))
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{extended_value_text, Bot, DeleteFileRequest, Envelope, StoredFile};

    #[test]
    fn bot_listing_flattens_extended_json() {
        let envelope: Envelope<Vec<Bot>> = serde_json::from_value(json!({
            "message": "ok",
            "result": [{
                "_id": {"$oid": "65f0c0ffee"},
                "bot_name": "HR handbook bot",
                "description": "Answers HR questions",
                "namespace_id": "ns-hr",
                "created_at": {"$date": "2024-03-12T10:15:00Z"}
            }]
        }))
        .expect("envelope parses");

        let bots = envelope.into_result("/chat-bot/").expect("result present");
        assert_eq!(bots[0].id, "65f0c0ffee");
        assert_eq!(bots[0].namespace_id.as_deref(), Some("ns-hr"));
        assert_eq!(bots[0].created_at.as_deref(), Some("2024-03-12T10:15:00Z"));
    }

    #[test]
    fn file_listing_tolerates_missing_optional_fields() {
        let file: StoredFile = serde_json::from_value(json!({
            "_id": {"$oid": "abc"},
            "name": "policy.pdf",
            "size": 2_097_152,
            "createdAt": {"$date": {"$numberLong": "1710238500000"}}
        }))
        .expect("file parses");

        assert_eq!(file.created_at.as_deref(), Some("1710238500000"));
        assert_eq!(file.namespace_id, None);

        let delete = DeleteFileRequest::from(&file);
        assert_eq!(
            serde_json::to_value(&delete).expect("serializes"),
            json!({"id": "abc", "name": "policy.pdf", "namespace_id": null})
        );
    }

    #[test]
    fn envelope_without_result_is_an_error() {
        let envelope: Envelope<Vec<Bot>> =
            serde_json::from_value(json!({"message": "nothing"})).expect("parses");
        assert!(envelope.into_result("/chat-bot/").is_err());
    }

    #[test]
    fn extended_value_text_passes_plain_values_through() {
        assert_eq!(extended_value_text(&json!("plain")), "plain");
        assert_eq!(extended_value_text(&json!(12)), "12");
        assert_eq!(extended_value_text(&json!({"k": 1})), r#"{"k":1}"#);
    }
}
