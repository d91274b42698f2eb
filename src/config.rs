//! Environment configuration.

use std::env;

/// Greeting seeded as the first bot turn of every session.
pub const DEFAULT_GREETING: &str = "Hello, How can I help you today?";
/// Answer text of the bot turn appended when an exchange fails.
pub const DEFAULT_ERROR_MARKER: &str = "\u{26a0}\u{fe0f} Error receiving response.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub greeting: String,
    pub error_marker: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
            error_marker: DEFAULT_ERROR_MARKER.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            greeting: env_string_opt("PAPERMIND_GREETING").unwrap_or(defaults.greeting),
            error_marker: defaults.error_marker,
        }
    }

    #[must_use]
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }
}

/// Returns the value of `key`, treating blank values as unset.
pub fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{SessionConfig, DEFAULT_ERROR_MARKER, DEFAULT_GREETING};
    use std::env;
    use std::sync::{Mutex, OnceLock};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    #[test]
    fn defaults_apply_without_environment() {
        let _lock = env_lock();
        let _g1 = set_env_guard("PAPERMIND_GREETING", None);

        let config = SessionConfig::from_env();
        assert_eq!(config.greeting, DEFAULT_GREETING);
        assert_eq!(config.error_marker, DEFAULT_ERROR_MARKER);
    }

    #[test]
    fn greeting_override_is_read_from_environment() {
        let _lock = env_lock();
        let _g1 = set_env_guard("PAPERMIND_GREETING", Some("Ask me about your PDFs."));

        let config = SessionConfig::from_env();
        assert_eq!(config.greeting, "Ask me about your PDFs.");
    }

    #[test]
    fn blank_greeting_is_ignored() {
        let _lock = env_lock();
        let _g1 = set_env_guard("PAPERMIND_GREETING", Some("   "));

        let config = SessionConfig::from_env();
        assert_eq!(config.greeting, DEFAULT_GREETING);
    }
}
