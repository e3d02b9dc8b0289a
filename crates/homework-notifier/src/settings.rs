//! Runtime settings and the credential gate
//!
//! Settings are bound to environment variables through clap. The three
//! secrets stay optional at parse time so that the gate can report every
//! missing one at once instead of clap failing on the first.
//!
//! A `.env` file may seed variables that are not already set in the process
//! environment:
//! ```text
//! # Comment
//! TOKEN_PRACTICUM=abc
//! CHAT_ID="12345"
//! ```

use crate::error::{NotifierError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Status API credential
pub const API_TOKEN_VAR: &str = "TOKEN_PRACTICUM";

/// Telegram bot credential
pub const SINK_TOKEN_VAR: &str = "TOKEN_TELEGRAM";

/// Telegram destination chat
pub const CHAT_ID_VAR: &str = "CHAT_ID";

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_RETRY_PERIOD_SECS: u64 = 600;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_FILE: &str = "homework.log";

/// Settings for the notifier
#[derive(Clone, clap::Args)]
pub struct Settings {
    /// Status API token
    #[arg(long, env = API_TOKEN_VAR, hide_env_values = true)]
    pub practicum_token: Option<String>,

    /// Telegram bot token
    #[arg(long, env = SINK_TOKEN_VAR, hide_env_values = true)]
    pub telegram_token: Option<String>,

    /// Telegram chat to notify
    #[arg(long, env = CHAT_ID_VAR)]
    pub chat_id: Option<String>,

    /// Homework status endpoint
    #[arg(long, env = "HOMEWORK_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Telegram Bot API base URL
    #[arg(long, env = "TELEGRAM_API_URL", default_value = DEFAULT_TELEGRAM_API_URL)]
    pub telegram_api_url: String,

    /// Seconds to wait between polls
    #[arg(
        long,
        env = "RETRY_PERIOD_SECS",
        default_value_t = DEFAULT_RETRY_PERIOD_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub retry_period_secs: u64,

    /// Per-request HTTP timeout in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    pub http_timeout_secs: u64,

    /// Log file, written alongside stdout
    #[arg(long, env = "HOMEWORK_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            practicum_token: None,
            telegram_token: None,
            chat_id: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            telegram_api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
            retry_period_secs: DEFAULT_RETRY_PERIOD_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("practicum_token", &self.practicum_token.as_ref().map(|_| "<redacted>"))
            .field("telegram_token", &self.telegram_token.as_ref().map(|_| "<redacted>"))
            .field("chat_id", &self.chat_id)
            .field("endpoint", &self.endpoint)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("retry_period_secs", &self.retry_period_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("log_file", &self.log_file)
            .finish()
    }
}

impl Settings {
    /// Presence of each required value, in gate order
    pub fn required(&self) -> [(&'static str, bool); 3] {
        [
            (API_TOKEN_VAR, self.practicum_token.is_some()),
            (SINK_TOKEN_VAR, self.telegram_token.is_some()),
            (CHAT_ID_VAR, self.chat_id.is_some()),
        ]
    }

    /// Credential gate.
    ///
    /// Collects every unset value into one `MissingCredentials` error and
    /// logs it as critical. Set-but-empty values pass.
    pub fn credentials(&self) -> Result<Credentials> {
        match (&self.practicum_token, &self.telegram_token, &self.chat_id) {
            (Some(practicum_token), Some(telegram_token), Some(chat_id)) => Ok(Credentials {
                practicum_token: practicum_token.clone(),
                telegram_token: telegram_token.clone(),
                chat_id: chat_id.clone(),
            }),
            _ => {
                let names = self
                    .required()
                    .iter()
                    .filter(|(_, present)| !present)
                    .map(|(name, _)| name.to_string())
                    .collect();
                let err = NotifierError::MissingCredentials { names };
                tracing::error!(severity = "critical", error = %err, "Required configuration is missing");
                Err(err)
            }
        }
    }

    pub fn retry_period(&self) -> Duration {
        Duration::from_secs(self.retry_period_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Secrets that passed the credential gate
#[derive(Clone)]
pub struct Credentials {
    pub practicum_token: String,
    pub telegram_token: String,
    pub chat_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Parse `.env` content into key/value pairs
pub fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line);

        if let Some(eq_pos) = line.find('=') {
            let key = line[..eq_pos].trim().to_string();
            let mut value = line[eq_pos + 1..].trim().to_string();

            if key.is_empty() {
                continue;
            }

            // Remove surrounding quotes
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = value[1..value.len() - 1].to_string();
            }

            pairs.push((key, value));
        }
    }

    pairs
}

/// Seed unset environment variables from a `.env` file.
///
/// A missing file is not an error. Returns how many variables were set.
/// Call it before any other thread is started, since it mutates the
/// process environment.
pub fn load_dotenv(path: impl AsRef<Path>) -> std::io::Result<usize> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(0);
    }

    let content = std::fs::read_to_string(path)?;
    let mut applied = 0;
    for (key, value) in parse_dotenv(&content) {
        if std::env::var_os(&key).is_none() {
            std::env::set_var(&key, value);
            applied += 1;
        }
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_settings() -> Settings {
        Settings {
            practicum_token: Some("practicum".to_string()),
            telegram_token: Some("telegram".to_string()),
            chat_id: Some("42".to_string()),
            ..Default::default()
        }
    }

    #[derive(clap::Parser)]
    struct TestCli {
        #[command(flatten)]
        settings: Settings,
    }

    #[test]
    fn test_retry_period_must_be_positive() {
        use clap::Parser;

        assert!(TestCli::try_parse_from(["test", "--retry-period-secs", "0"]).is_err());

        let cli = TestCli::try_parse_from(["test", "--retry-period-secs", "5"]).unwrap();
        assert_eq!(cli.settings.retry_period(), Duration::from_secs(5));
    }

    #[test]
    fn test_gate_passes_with_all_credentials() {
        let creds = complete_settings().credentials().unwrap();
        assert_eq!(creds.practicum_token, "practicum");
        assert_eq!(creds.telegram_token, "telegram");
        assert_eq!(creds.chat_id, "42");
    }

    #[test]
    fn test_gate_collects_every_missing_name() {
        let err = Settings::default().credentials().unwrap_err();
        assert_eq!(
            err,
            NotifierError::MissingCredentials {
                names: vec![
                    API_TOKEN_VAR.to_string(),
                    SINK_TOKEN_VAR.to_string(),
                    CHAT_ID_VAR.to_string(),
                ]
            }
        );
        assert!(err.is_fatal());
    }

    #[test]
    fn test_gate_reports_only_missing_names() {
        let settings = Settings {
            telegram_token: None,
            ..complete_settings()
        };
        let err = settings.credentials().unwrap_err();
        assert_eq!(
            err,
            NotifierError::MissingCredentials {
                names: vec![SINK_TOKEN_VAR.to_string()]
            }
        );
    }

    #[test]
    fn test_gate_checks_presence_not_content() {
        let settings = Settings {
            chat_id: Some(String::new()),
            ..complete_settings()
        };
        assert!(settings.credentials().is_ok());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", complete_settings());
        assert!(!rendered.contains("practicum\""));
        assert!(rendered.contains("<redacted>"));

        let creds = complete_settings().credentials().unwrap();
        assert!(!format!("{:?}", creds).contains("telegram\""));
    }

    #[test]
    fn test_dotenv_parsing() {
        let pairs = parse_dotenv(
            "# Comment\n\nTOKEN_PRACTICUM=abc\nexport CHAT_ID=\"12345\"\nQUOTED='x y'\nbroken line\n=novalue\n",
        );
        assert_eq!(
            pairs,
            vec![
                ("TOKEN_PRACTICUM".to_string(), "abc".to_string()),
                ("CHAT_ID".to_string(), "12345".to_string()),
                ("QUOTED".to_string(), "x y".to_string()),
            ]
        );
    }

    #[test]
    fn test_load_dotenv_keeps_existing_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "HN_TEST_DOTENV_FRESH=from-file\nHN_TEST_DOTENV_SET=from-file\n",
        )
        .unwrap();

        std::env::set_var("HN_TEST_DOTENV_SET", "from-env");
        let applied = load_dotenv(&path).unwrap();

        assert_eq!(applied, 1);
        assert_eq!(std::env::var("HN_TEST_DOTENV_FRESH").unwrap(), "from-file");
        assert_eq!(std::env::var("HN_TEST_DOTENV_SET").unwrap(), "from-env");

        std::env::remove_var("HN_TEST_DOTENV_FRESH");
        std::env::remove_var("HN_TEST_DOTENV_SET");
    }

    #[test]
    fn test_load_dotenv_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_dotenv(dir.path().join("absent.env")).unwrap(), 0);
    }
}
