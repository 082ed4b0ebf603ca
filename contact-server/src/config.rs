//! Configuration module for environment variable parsing.
//!
//! Reads all configuration from environment variables. A `.env` file in the
//! working directory is loaded first when present.

use std::env;
use std::fmt;
use std::str::FromStr;

use tracing::warn;

/// Origins allowed to call the API when `CORS_ALLOWED_ORIGINS` is unset.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = [
    "http://localhost:5173",
    "https://your-frontend-domain.vercel.app",
];

/// How the contact handler relates its response to email delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Acknowledge right after validation and send in a detached task.
    #[default]
    EagerAck,
    /// Send both emails first; the response reflects the outcome.
    Confirmed,
}

impl FromStr for DispatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eager" | "eager-ack" | "background" => Ok(DispatchMode::EagerAck),
            "confirmed" | "sync" => Ok(DispatchMode::Confirmed),
            other => Err(format!("unknown dispatch mode: {other}")),
        }
    }
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchMode::EagerAck => f.write_str("eager"),
            DispatchMode::Confirmed => f.write_str("confirmed"),
        }
    }
}

/// Cross-origin policy for browser callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    /// Any origin is allowed (`CORS_ALLOWED_ORIGINS=*`).
    Any,
    /// Only the listed origins receive CORS-permitting headers.
    List(Vec<String>),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Relay login, also used as the sender address of both emails
    pub email_user: Option<String>,

    /// Relay password
    pub email_pass: Option<String>,

    /// Where admin notifications are delivered
    pub receiver_email: Option<String>,

    /// Named managed relay used when no explicit host is configured
    pub email_service: String,

    /// Explicit relay host, overrides `email_service`
    pub smtp_host: Option<String>,

    /// Explicit relay port
    pub smtp_port: Option<u16>,

    /// Transport timeout in seconds
    pub smtp_timeout_secs: u64,

    /// Maximum concurrent pooled relay connections
    pub pool_max_connections: u32,

    /// Messages carried per connection before the pool is recycled
    pub pool_max_messages: usize,

    /// Response timing of the contact handler
    pub dispatch_mode: DispatchMode,

    /// Browser origins allowed to call the API
    pub cors: CorsPolicy,

    /// Display name used for the auto-reply sender and signature
    pub operator_name: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Config {
            port: parse_or("PORT", 8285),

            email_user: non_empty("EMAIL_USER"),

            email_pass: non_empty("EMAIL_PASS"),

            receiver_email: non_empty("RECEIVER_EMAIL"),

            email_service: non_empty("EMAIL_SERVICE").unwrap_or_else(|| "gmail".to_string()),

            smtp_host: non_empty("SMTP_HOST"),

            smtp_port: non_empty("SMTP_PORT").and_then(|v| match v.parse::<u16>() {
                Ok(port) => Some(port),
                Err(_) => {
                    warn!(env_var = "SMTP_PORT", value = %v, "Invalid port, ignoring");
                    None
                }
            }),

            smtp_timeout_secs: parse_or("SMTP_TIMEOUT_SECS", 10),

            pool_max_connections: parse_or::<u32>("SMTP_POOL_MAX_CONNECTIONS", 3).max(1),

            pool_max_messages: parse_or::<usize>("SMTP_POOL_MAX_MESSAGES", 100).max(1),

            dispatch_mode: parse_or("DISPATCH_MODE", DispatchMode::EagerAck),

            cors: parse_cors("CORS_ALLOWED_ORIGINS"),

            operator_name: non_empty("OPERATOR_NAME").unwrap_or_else(|| "Gaurav".to_string()),
        }
    }
}

/// Read a variable, treating blank values as unset.
fn non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a variable, falling back to `default` when unset or malformed.
fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    let raw = match non_empty(name) {
        Some(v) => v,
        None => return default,
    };

    match raw.parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}

/// Parse a comma-separated list of strings.
fn parse_csv(name: &str) -> Option<Vec<String>> {
    env::var(name).ok().map(|raw| {
        raw.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}

fn parse_cors(name: &str) -> CorsPolicy {
    match parse_csv(name) {
        Some(origins) if origins.iter().any(|o| o == "*") => CorsPolicy::Any,
        Some(origins) if !origins.is_empty() => CorsPolicy::List(origins),
        _ => CorsPolicy::List(DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect()),
    }
}
