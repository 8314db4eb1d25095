// src/config.rs
//! Process-wide configuration, read once at startup.
//!
//! Every credential is optional; missing keys degrade individual features
//! rather than preventing startup. Clients receive their credentials at
//! construction instead of reading the environment ad hoc, so tests can run
//! against fake configs.

pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/api/auth/callback";

#[derive(Debug, Clone)]
pub struct Config {
    /// Google API key for the Veo video generation API.
    pub google_api_key: Option<String>,
    /// OpenAI API key for metadata generation. Optional; defaults are used
    /// when absent.
    pub openai_api_key: Option<String>,
    pub youtube_client_id: Option<String>,
    pub youtube_client_secret: Option<String>,
    pub youtube_refresh_token: Option<String>,
    pub youtube_redirect_uri: String,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            google_api_key: non_empty_var("GOOGLE_API_KEY"),
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            youtube_client_id: non_empty_var("YOUTUBE_CLIENT_ID"),
            youtube_client_secret: non_empty_var("YOUTUBE_CLIENT_SECRET"),
            youtube_refresh_token: non_empty_var("YOUTUBE_REFRESH_TOKEN"),
            youtube_redirect_uri: non_empty_var("YOUTUBE_REDIRECT_URI")
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
            bind_addr: non_empty_var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
        }
    }

    /// All three credentials required for an actual YouTube upload.
    pub fn youtube_upload_credentials(&self) -> Option<(&str, &str, &str)> {
        match (
            self.youtube_client_id.as_deref(),
            self.youtube_client_secret.as_deref(),
            self.youtube_refresh_token.as_deref(),
        ) {
            (Some(id), Some(secret), Some(token)) => Some((id, secret, token)),
            _ => None,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
impl Config {
    /// Config with nothing configured, for handler and workflow tests.
    pub fn empty() -> Self {
        Self {
            google_api_key: None,
            openai_api_key: None,
            youtube_client_id: None,
            youtube_client_secret: None,
            youtube_refresh_token: None,
            youtube_redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_credentials_require_all_three() {
        let mut config = Config::empty();
        assert!(config.youtube_upload_credentials().is_none());

        config.youtube_client_id = Some("id".to_string());
        config.youtube_client_secret = Some("secret".to_string());
        assert!(config.youtube_upload_credentials().is_none());

        config.youtube_refresh_token = Some("token".to_string());
        let (id, secret, token) = config.youtube_upload_credentials().unwrap();
        assert_eq!((id, secret, token), ("id", "secret", "token"));
    }
}
