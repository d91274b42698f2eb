//! Thin REST subcommands: validate locally, call the backend, print the result.

use std::path::Path;

use anyhow::{Context, Result};
use papermind::listing::{validate_login, validate_new_bot, validate_registration};
use papermind_api::{
    ApiClient, DeleteFileRequest, Envelope, LoginRequest, NewBot, RegisterRequest,
};
use serde_json::Value;
use tracing::info;

use crate::tables::{render_bots, render_files};

pub async fn list_bots(client: &ApiClient, page: usize) -> Result<String> {
    let bots = client.list_bots().await.context("failed to list bots")?;
    Ok(render_bots(&bots, page))
}

pub async fn create_bot(client: &ApiClient, name: &str, description: &str) -> Result<String> {
    validate_new_bot(name, description)?;
    let envelope = client
        .create_bot(&NewBot {
            bot_name: name.to_string(),
            description: description.to_string(),
        })
        .await
        .context("failed to create bot")?;
    info!(bot = name, "bot created");
    Ok(summarize(envelope, "Bot created."))
}

pub async fn list_files(client: &ApiClient, chatbot_id: &str, page: usize) -> Result<String> {
    let files = client
        .list_files(chatbot_id)
        .await
        .with_context(|| format!("failed to list files for bot {chatbot_id}"))?;
    Ok(render_files(&files, page))
}

pub async fn upload(
    client: &ApiClient,
    chatbot_id: &str,
    namespace_id: &str,
    path: &Path,
) -> Result<String> {
    let envelope = client
        .upload_file(chatbot_id, namespace_id, path)
        .await
        .with_context(|| format!("failed to upload {}", path.display()))?;
    Ok(summarize(envelope, "File uploaded."))
}

pub async fn delete_file(client: &ApiClient, request: &DeleteFileRequest) -> Result<String> {
    let envelope = client
        .delete_file(request)
        .await
        .with_context(|| format!("failed to delete file {}", request.id))?;
    Ok(summarize(envelope, "File deleted."))
}

pub async fn login(client: &ApiClient, email: &str, password: &str) -> Result<String> {
    validate_login(email, password)?;
    let envelope = client
        .login(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await
        .context("login failed")?;
    Ok(summarize(envelope, "Logged in."))
}

pub async fn register(client: &ApiClient, request: RegisterRequest) -> Result<String> {
    validate_registration(
        &request.name,
        &request.email,
        &request.phone_number,
        &request.company_name,
        &request.password,
    )?;
    let envelope = client
        .register(&request)
        .await
        .context("registration failed")?;
    Ok(summarize(envelope, "Account created."))
}

/// Server message (or `fallback`) followed by any non-null result.
pub fn summarize(envelope: Envelope<Value>, fallback: &str) -> String {
    let mut out = envelope
        .message
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());
    out.push('\n');
    match envelope.result {
        None | Some(Value::Null) => {}
        Some(Value::String(text)) => {
            out.push_str(&text);
            out.push('\n');
        }
        Some(other) => {
            out.push_str(&other.to_string());
            out.push('\n');
        }
    }
    out
}
