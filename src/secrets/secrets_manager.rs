use crate::settings::ToolSettings;
use anyhow::Result;

pub const HEROKU_API_TOKEN_VAR: &str = "HEROKU_API_TOKEN";

/// Holds credentials. The environment takes precedence over the settings
/// file so tokens need not be written to disk.
pub struct SecretsManager {
    heroku_api_token: Option<String>,
}

impl SecretsManager {
    pub fn new(settings: &ToolSettings) -> Self {
        Self::from_sources(
            std::env::var(HEROKU_API_TOKEN_VAR).ok(),
            settings.heroku_api_token.clone(),
        )
    }

    pub fn from_sources(env_token: Option<String>, file_token: Option<String>) -> Self {
        let heroku_api_token = [env_token, file_token]
            .into_iter()
            .flatten()
            .map(|token| token.trim().to_string())
            .find(|token| !token.is_empty());
        Self { heroku_api_token }
    }

    pub fn has_heroku_api_token(&self) -> bool {
        self.heroku_api_token.is_some()
    }

    pub fn heroku_api_token(&self) -> Result<&str> {
        self.heroku_api_token.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "No Heroku API token configured: set {} or heroku_api_token in the settings file",
                HEROKU_API_TOKEN_VAR
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_token_wins() {
        let secrets =
            SecretsManager::from_sources(Some("from-env".to_string()), Some("from-file".to_string()));
        assert_eq!(secrets.heroku_api_token().unwrap(), "from-env");
    }

    #[test]
    fn blank_tokens_count_as_unset() {
        let secrets = SecretsManager::from_sources(Some("  ".to_string()), Some("file".to_string()));
        assert_eq!(secrets.heroku_api_token().unwrap(), "file");

        let secrets = SecretsManager::from_sources(Some(String::new()), None);
        assert!(!secrets.has_heroku_api_token());
        let err = secrets.heroku_api_token().unwrap_err();
        assert!(err.to_string().contains(HEROKU_API_TOKEN_VAR));
    }
}
