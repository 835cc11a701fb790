use anyhow::{Context, Result, anyhow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    /// `None` selects the in-memory store.
    pub(crate) database_url: Option<String>,
    pub(crate) db_max_connections: u32,
    pub(crate) session_secret: String,
    pub(crate) session_ttl_seconds: i64,
    pub(crate) session_cookie_secure: bool,
    pub(crate) http_addr: String,
    pub(crate) log_level: String,
    pub(crate) log_format: LogFormat,
    pub(crate) http_request_body_limit_bytes: usize,
    pub(crate) http_concurrency_limit: usize,
}

impl Settings {
    pub(crate) fn from_env() -> Result<Self> {
        let database_url = get_optional("DATABASE_URL");
        let db_max_connections = u32::try_from(parse_usize_env("DB_MAX_CONNECTIONS", 10)?)
            .context("DB_MAX_CONNECTIONS is too large")?;

        let session_secret =
            get_required("SESSION_SECRET").context("SESSION_SECRET is required")?;
        if session_secret.chars().count() < 32 {
            return Err(anyhow!("SESSION_SECRET must be at least 32 characters"));
        }
        let session_ttl_seconds: i64 = std::env::var("SESSION_TTL_SECONDS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .context("Failed to parse SESSION_TTL_SECONDS, expecting integer")?;
        if session_ttl_seconds <= 0 {
            return Err(anyhow!("SESSION_TTL_SECONDS must be > 0"));
        }
        let session_cookie_secure = parse_bool_env("SESSION_COOKIE_SECURE", false)?;

        let http_addr = std::env::var("HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());
        let log_format = parse_log_format(get_optional("LOG_FORMAT").as_deref())?;
        let http_request_body_limit_bytes =
            parse_usize_env("HTTP_REQUEST_BODY_LIMIT_BYTES", 64 * 1024)?;
        let http_concurrency_limit = parse_usize_env("HTTP_CONCURRENCY_LIMIT", 256)?;

        Ok(Self {
            database_url,
            db_max_connections,
            session_secret,
            session_ttl_seconds,
            session_cookie_secure,
            http_addr,
            log_level,
            log_format,
            http_request_body_limit_bytes,
            http_concurrency_limit,
        })
    }
}

fn get_required(key: &str) -> Result<String> {
    get_optional(key).ok_or_else(|| anyhow!("{key} must be set and not empty"))
}

fn get_optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_log_format(raw: Option<&str>) -> Result<LogFormat> {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        None | Some("compact") => Ok(LogFormat::Compact),
        Some("json") => Ok(LogFormat::Json),
        Some(other) => Err(anyhow!(
            "LOG_FORMAT must be 'compact' or 'json', got '{other}'"
        )),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow!("{key} must be a boolean, got '{raw}'")),
    }
}

fn parse_bool_env(key: &str, default: bool) -> Result<bool> {
    match get_optional(key) {
        Some(raw) => parse_bool(key, &raw),
        None => Ok(default),
    }
}

fn parse_usize_env(key: &str, default: usize) -> Result<usize> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<usize>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}
