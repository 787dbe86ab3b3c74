use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

pub fn init_logging() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
}

pub const SYSTEM_PROMPT: &str = "You are an expert at writing personalized emails. Your task is to write a \
personalized email in a mail format given details such as the recipient, the sender, the reason for the \
email and its other attributes. Revise the email based on the user's follow up requests.";

pub const API_KEY_VAR: &str = "GROQ_API_KEY";
const API_URL_VAR: &str = "GROQ_API_URL";
const SERVER_HOST_VAR: &str = "SERVER_HOST";
const SERVER_PORT_VAR: &str = "SERVER_PORT";
const REQUEST_TIMEOUT_VAR: &str = "REQUEST_TIMEOUT_SECS";
const HISTORY_MAX_TURNS_VAR: &str = "HISTORY_MAX_TURNS";
const STATIC_DIR_VAR: &str = "STATIC_DIR";
const SESSION_IDLE_VAR: &str = "SESSION_IDLE_SECS";

const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_STATIC_DIR: &str = "./static";
const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing credential: {0} is not set")]
    MissingCredential(&'static str),

    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub api_url: Url,
    pub server_host: String,
    pub server_port: u16,
    pub request_timeout: Duration,
    pub history_max_turns: Option<usize>,
    pub static_dir: String,
    pub session_idle_ttl: Duration,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_url", &self.api_url.as_str())
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("request_timeout", &self.request_timeout)
            .field("history_max_turns", &self.history_max_turns)
            .field("static_dir", &self.static_dir)
            .field("session_idle_ttl", &self.session_idle_ttl)
            .finish()
    }
}

impl AppConfig {
    /// Loads the configuration from the process environment.
    ///
    /// Fails when the provider credential is absent so the server never starts
    /// with an unauthenticated client.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = read(API_KEY_VAR).ok_or(ConfigError::MissingCredential(API_KEY_VAR))?;

        let api_url_raw = read(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(&api_url_raw).map_err(|e| ConfigError::InvalidValue {
            key: API_URL_VAR,
            value: api_url_raw.clone(),
            reason: e.to_string(),
        })?;

        let server_host = read(SERVER_HOST_VAR).unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string());

        let server_port = match read(SERVER_PORT_VAR) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: SERVER_PORT_VAR,
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_SERVER_PORT,
        };

        let timeout_secs = match read(REQUEST_TIMEOUT_VAR) {
            Some(raw) => parse_positive(REQUEST_TIMEOUT_VAR, &raw)? as u64,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let history_max_turns = read(HISTORY_MAX_TURNS_VAR)
            .map(|raw| parse_positive(HISTORY_MAX_TURNS_VAR, &raw))
            .transpose()?;

        let static_dir = read(STATIC_DIR_VAR).unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string());

        let session_idle_secs = match read(SESSION_IDLE_VAR) {
            Some(raw) => parse_positive(SESSION_IDLE_VAR, &raw)? as u64,
            None => DEFAULT_SESSION_IDLE_SECS,
        };

        Ok(AppConfig {
            api_key,
            api_url,
            server_host,
            server_port,
            request_timeout: Duration::from_secs(timeout_secs),
            history_max_turns,
            static_dir,
            session_idle_ttl: Duration::from_secs(session_idle_secs),
        })
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<usize, ConfigError> {
    match raw.parse::<usize>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        Ok(value) => Ok(value),
        Err(e) => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}
