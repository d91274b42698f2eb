use std::path::Path;
use std::sync::Arc;

use chat_provider::ConversationProvider;
use chat_provider_http::{HttpConversationProvider, HTTP_PROVIDER_ID};
use chat_provider_mock::{MockProvider, MOCK_PROVIDER_ID};

use crate::config::ClientConfig;

pub const DEFAULT_PROVIDER_ID: &str = MOCK_PROVIDER_ID;
pub const PROVIDER_ENV_VAR: &str = "PAPERMIND_PROVIDER";

pub fn provider_from_env(
    config_path: Option<&Path>,
) -> Result<Arc<dyn ConversationProvider>, String> {
    let provider_id = papermind::config::env_string_opt(PROVIDER_ENV_VAR)
        .map(|value| value.trim().to_string());

    provider_for_id(
        provider_id.as_deref().unwrap_or(DEFAULT_PROVIDER_ID),
        config_path,
    )
}

/// `config_path` is only read for the http provider.
pub fn provider_for_id(
    provider_id: &str,
    config_path: Option<&Path>,
) -> Result<Arc<dyn ConversationProvider>, String> {
    match provider_id {
        MOCK_PROVIDER_ID => Ok(Arc::new(MockProvider::default())),
        HTTP_PROVIDER_ID => {
            let config = ClientConfig::resolve(config_path).map_err(|error| error.to_string())?;
            let provider = HttpConversationProvider::new(config.provider_config())
                .map_err(|error| error.to_string())?;
            Ok(Arc::new(provider))
        }
        unknown => Err(format!(
            "Unsupported provider '{unknown}'. Available providers: {MOCK_PROVIDER_ID}, {HTTP_PROVIDER_ID}"
        )),
    }
}
