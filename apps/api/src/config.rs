use crate::errors::StartupError;

const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";
const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MAX_SESSIONS: usize = 1000;
const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 3600;

/// Application configuration loaded from environment variables.
/// Startup aborts if the API credential is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub groq_model: String,
    pub groq_base_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Upper bound on live sessions; creation beyond it is refused.
    pub max_sessions: usize,
    /// Sessions unused for this long are dropped on the next sweep.
    pub session_idle_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, StartupError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. `from_env` passes the
    /// process environment; tests pass a fixed map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StartupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                StartupError::Configuration(format!("PORT must be a valid port number, got '{raw}'"))
            })?,
            None => 8080,
        };

        let max_sessions = parse_or(&lookup, "MAX_SESSIONS", DEFAULT_MAX_SESSIONS)?;
        if max_sessions == 0 {
            return Err(StartupError::Configuration(
                "MAX_SESSIONS must be at least 1".to_string(),
            ));
        }
        let session_idle_ttl_secs =
            parse_or(&lookup, "SESSION_IDLE_TTL_SECS", DEFAULT_SESSION_IDLE_TTL_SECS)?;

        Ok(Config {
            groq_api_key: require(&lookup, "GROQ_API_KEY")?,
            groq_model: lookup("GROQ_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            groq_base_url: lookup("GROQ_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            port,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            max_sessions,
            session_idle_ttl_secs,
        })
    }
}

fn require<F>(lookup: &F, key: &str) -> Result<String, StartupError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            StartupError::Configuration(format!(
                "Required environment variable '{key}' is not set"
            ))
        })
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, StartupError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|_| {
            StartupError::Configuration(format!("{key} must be a non-negative integer, got '{raw}'"))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let result = Config::from_lookup(lookup_from(&[("PORT", "9000")]));
        match result {
            Err(StartupError::Configuration(msg)) => assert!(msg.contains("GROQ_API_KEY")),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_api_key_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[("GROQ_API_KEY", "   ")]));
        assert!(matches!(result, Err(StartupError::Configuration(_))));
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&[("GROQ_API_KEY", "gsk_test")])).unwrap();
        assert_eq!(config.groq_api_key, "gsk_test");
        assert_eq!(config.groq_model, DEFAULT_MODEL);
        assert_eq!(config.groq_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.max_sessions, DEFAULT_MAX_SESSIONS);
        assert_eq!(config.session_idle_ttl_secs, DEFAULT_SESSION_IDLE_TTL_SECS);
    }

    #[test]
    fn test_session_limits_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("MAX_SESSIONS", "25"),
            ("SESSION_IDLE_TTL_SECS", "600"),
        ]))
        .unwrap();
        assert_eq!(config.max_sessions, 25);
        assert_eq!(config.session_idle_ttl_secs, 600);

        for (key, value) in [
            ("MAX_SESSIONS", "0"),
            ("MAX_SESSIONS", "lots"),
            ("SESSION_IDLE_TTL_SECS", "-1"),
        ] {
            let result =
                Config::from_lookup(lookup_from(&[("GROQ_API_KEY", "gsk_test"), (key, value)]));
            assert!(matches!(result, Err(StartupError::Configuration(_))), "{key}={value}");
        }
    }

    #[test]
    fn test_overrides_and_trailing_slash() {
        let config = Config::from_lookup(lookup_from(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("GROQ_MODEL", "llama-3.3-70b-versatile"),
            ("GROQ_BASE_URL", "http://localhost:9999/v1/"),
            ("PORT", "3000"),
        ]))
        .unwrap();
        assert_eq!(config.groq_model, "llama-3.3-70b-versatile");
        assert_eq!(config.groq_base_url, "http://localhost:9999/v1");
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_invalid_port() {
        let result = Config::from_lookup(lookup_from(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("PORT", "not-a-port"),
        ]));
        assert!(matches!(result, Err(StartupError::Configuration(_))));
    }
}
