use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_SETTINGS_FILE_NAME: &str = "heroku-tools.yml";
pub const DEFAULT_HEROKU_API_URL: &str = "https://api.heroku.com";

/// Tool-wide settings, read from `heroku-tools.yml` when present.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
#[serde(default, deny_unknown_fields)]
pub struct ToolSettings {
    /// Directory holding the `<name>.conf` application profiles.
    pub app_conf_dir: PathBuf,
    /// Work tree of the git repository that gets deployed.
    pub git_work_dir: PathBuf,
    pub heroku_api_url: String,
    pub heroku_api_token: Option<String>,
    pub editor: Option<String>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            app_conf_dir: PathBuf::from("."),
            git_work_dir: PathBuf::from("."),
            heroku_api_url: DEFAULT_HEROKU_API_URL.to_string(),
            heroku_api_token: None,
            editor: None,
        }
    }
}

impl ToolSettings {
    /// Fills the editor from `$VISUAL`, then `$EDITOR`, when the settings
    /// file does not name one.
    pub fn apply_environment<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.editor.as_deref().is_none_or(|e| e.trim().is_empty()) {
            self.editor = ["VISUAL", "EDITOR"]
                .into_iter()
                .filter_map(&lookup)
                .find(|value| !value.trim().is_empty());
        }
    }
}

pub struct SettingsManager {
    settings_file_name: PathBuf,
    required: bool,
    source: Option<PathBuf>,
}

impl SettingsManager {
    /// An explicitly named settings file must exist; the default one is
    /// optional.
    pub fn new(settings_file_name: Option<&Path>) -> Self {
        match settings_file_name {
            Some(path) => Self {
                settings_file_name: path.to_path_buf(),
                required: true,
                source: None,
            },
            None => Self {
                settings_file_name: PathBuf::from(DEFAULT_SETTINGS_FILE_NAME),
                required: false,
                source: None,
            },
        }
    }

    /// The file the settings were read from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub async fn load_settings(&mut self) -> Result<ToolSettings> {
        let path = self.settings_file_name.clone();
        let exists = tokio::fs::try_exists(&path).await.unwrap_or(false);
        if !exists {
            if self.required {
                return Err(anyhow::anyhow!(
                    "Settings file not found: {}",
                    path.display()
                ));
            }
            debug!("No settings file at {}, using defaults", path.display());
            return Ok(ToolSettings::default());
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let settings = if content.trim().is_empty() {
            ToolSettings::default()
        } else {
            serde_yaml::from_str(&content).with_context(|| {
                format!("Failed to deserialize settings file: {}", path.display())
            })?
        };

        debug!("Loaded settings from {}", path.display());
        self.source = Some(path);
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_default_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let mut manager = SettingsManager::new(None);
        manager.settings_file_name = dir.path().join(DEFAULT_SETTINGS_FILE_NAME);

        let settings = manager.load_settings().await.unwrap();
        assert_eq!(settings, ToolSettings::default());
        assert!(manager.source().is_none());
    }

    #[tokio::test]
    async fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.yml");
        let mut manager = SettingsManager::new(Some(&path));

        let err = manager.load_settings().await.unwrap_err();
        assert!(err.to_string().contains("Settings file not found"));
    }

    #[tokio::test]
    async fn reads_settings_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.yml");
        std::fs::write(
            &path,
            "app_conf_dir: apps\ngit_work_dir: ../website\nheroku_api_token: abc123\neditor: nano\n",
        )
        .unwrap();

        let mut manager = SettingsManager::new(Some(&path));
        let settings = manager.load_settings().await.unwrap();

        assert_eq!(settings.app_conf_dir, PathBuf::from("apps"));
        assert_eq!(settings.git_work_dir, PathBuf::from("../website"));
        assert_eq!(settings.heroku_api_url, DEFAULT_HEROKU_API_URL);
        assert_eq!(settings.heroku_api_token.as_deref(), Some("abc123"));
        assert_eq!(settings.editor.as_deref(), Some("nano"));
        assert_eq!(manager.source(), Some(path.as_path()));
    }

    #[tokio::test]
    async fn unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.yml");
        std::fs::write(&path, "app_dir: apps\n").unwrap();

        let mut manager = SettingsManager::new(Some(&path));
        let err = manager.load_settings().await.unwrap_err();
        assert!(format!("{err:#}").contains("app_dir"));
    }

    #[test]
    fn editor_falls_back_to_visual_then_editor() {
        let mut settings = ToolSettings::default();
        settings.apply_environment(|key| match key {
            "VISUAL" => Some(String::new()),
            "EDITOR" => Some("vi".to_string()),
            _ => None,
        });
        assert_eq!(settings.editor.as_deref(), Some("vi"));

        let mut settings = ToolSettings {
            editor: Some("emacs".to_string()),
            ..ToolSettings::default()
        };
        settings.apply_environment(|_| Some("vi".to_string()));
        assert_eq!(settings.editor.as_deref(), Some("emacs"));
    }
}
