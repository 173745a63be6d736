use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    /// Web API key of the Firebase project. Enables identity verification.
    pub firebase_api_key: Option<String>,
    /// Enables evaluation history.
    pub database_url: Option<String>,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let max_upload_bytes = parse_max_upload_bytes(
            &std::env::var("MAX_UPLOAD_MB").unwrap_or_else(|_| "10".to_string()),
        )?;

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            firebase_api_key: optional_env("FIREBASE_API_KEY"),
            database_url: optional_env("DATABASE_URL"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            max_upload_bytes,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Converts `MAX_UPLOAD_MB` to bytes. Zero would reject every upload.
fn parse_max_upload_bytes(raw: &str) -> Result<usize> {
    let mb = raw
        .trim()
        .parse::<usize>()
        .context("MAX_UPLOAD_MB must be a whole number of megabytes")?;
    if mb == 0 {
        bail!("MAX_UPLOAD_MB must be greater than zero");
    }
    mb.checked_mul(1024 * 1024)
        .with_context(|| format!("MAX_UPLOAD_MB={mb} is too large"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_upload_is_converted_to_bytes() {
        assert_eq!(parse_max_upload_bytes("10").unwrap(), 10 * 1024 * 1024);
        assert_eq!(parse_max_upload_bytes(" 1 ").unwrap(), 1024 * 1024);
    }

    #[test]
    fn test_zero_max_upload_is_rejected() {
        assert!(parse_max_upload_bytes("0").is_err());
    }

    #[test]
    fn test_overflowing_max_upload_is_rejected() {
        assert!(parse_max_upload_bytes(&usize::MAX.to_string()).is_err());
    }

    #[test]
    fn test_non_numeric_max_upload_is_rejected() {
        assert!(parse_max_upload_bytes("ten").is_err());
        assert!(parse_max_upload_bytes("-5").is_err());
    }
}
