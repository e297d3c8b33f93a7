use crate::error::{Result, SummaristError};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        let gemini_api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                SummaristError::Config(
                    "GEMINI_API_KEY is not set.\n\n\
                    To fix this, create a .env file (or ~/.config/summarist/.env) with:\n  \
                    GEMINI_API_KEY=your_key_here\n\n\
                    Get a Gemini API key from: https://aistudio.google.com/app/apikey"
                        .to_string(),
                )
            })?;

        let gemini_model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let gemini_base_url =
            env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            gemini_api_key,
            gemini_model,
            gemini_base_url,
            output_dir: PathBuf::from("."),
        })
    }

    fn try_load_dotenv() {
        // Try locations in order of preference:

        // 1. Current directory
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/summarist/.env (standard config location)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("summarist").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env (home directory)
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }

        // If none found, that's okay - environment variables might be set system-wide
    }
}

/// SMTP settings, resolved each time a mail is sent so that credentials
/// exported after startup are picked up.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub user: String,
    pub password: String,
    pub smtp_host: String,
}

impl MailSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        match (non_empty("EMAIL_USER"), non_empty("EMAIL_PASS")) {
            (Some(user), Some(password)) => Ok(Self {
                user,
                password,
                smtp_host: non_empty("EMAIL_SMTP_HOST")
                    .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            }),
            _ => Err(SummaristError::Auth(
                "EMAIL_USER and EMAIL_PASS must be set to send email".to_string(),
            )),
        }
    }
}
