use crate::profile::application::is_valid_name;
use crate::profile::profile::Profile;
use crate::profile::profile_error::ProfileError;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

pub const PROFILE_EXTENSION: &str = "conf";

/// Outcome of reading every profile file in a directory.
#[derive(Debug, Default)]
pub struct ProfileLoadReport {
    pub profiles: Vec<Profile>,
    pub failures: Vec<(PathBuf, anyhow::Error)>,
}

/// Loads and saves `<name>.conf` profile files in one directory.
pub struct ProfileManager<'a> {
    conf_dir: &'a Path,
}

impl<'a> ProfileManager<'a> {
    pub fn new(conf_dir: &'a Path) -> Self {
        Self { conf_dir }
    }

    /// Path of the profile file for `name`. Names that are not valid
    /// application names never reach the filesystem.
    pub fn profile_path(&self, name: &str) -> Result<PathBuf, ProfileError> {
        if !is_valid_name(name) {
            return Err(ProfileError::InvalidName {
                name: name.to_string(),
            });
        }
        Ok(self.conf_dir.join(format!("{name}.{PROFILE_EXTENSION}")))
    }

    pub async fn load_profile(&self, name: &str) -> Result<Profile> {
        let path = self.profile_path(name)?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(anyhow::anyhow!(
                "No profile named '{}' in {}",
                name,
                self.conf_dir.display()
            ));
        }
        Self::load_profile_from_file(&path).await
    }

    /// Loads every profile, failing on the first file that does not load.
    pub async fn load_profiles(&self) -> Result<Vec<Profile>> {
        let report = self.load_profiles_report().await?;
        if let Some((_, error)) = report.failures.into_iter().next() {
            return Err(error);
        }
        Ok(report.profiles)
    }

    /// Loads every profile, collecting failures instead of stopping at them.
    /// Only a missing or unreadable directory is an error.
    pub async fn load_profiles_report(&self) -> Result<ProfileLoadReport> {
        let mut report = ProfileLoadReport::default();
        for path in self.profile_files().await? {
            match Self::load_profile_from_file(&path).await {
                Ok(profile) => report.profiles.push(profile),
                Err(error) => report.failures.push((path, error)),
            }
        }
        Ok(report)
    }

    async fn profile_files(&self) -> Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(self.conf_dir).await.with_context(|| {
            format!(
                "Failed to read profile directory: {}",
                self.conf_dir.display()
            )
        })?;

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.with_context(|| {
            format!(
                "Failed to list profile directory: {}",
                self.conf_dir.display()
            )
        })? {
            let path = entry.path();
            let is_profile = path.extension().is_some_and(|ext| ext == PROFILE_EXTENSION);
            if is_profile && entry.file_type().await.is_ok_and(|t| t.is_file()) {
                paths.push(path);
            } else {
                debug!("Skipping {}", path.display());
            }
        }
        paths.sort();
        Ok(paths)
    }

    async fn load_profile_from_file(path: &Path) -> Result<Profile> {
        debug!("Loading profile file: {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read profile file: {}", path.display()))?;

        let profile = Profile::from_conf_str(&content)
            .with_context(|| format!("Failed to load profile file: {}", path.display()))?;

        let expected = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        if profile.name() != expected {
            return Err(ProfileError::NameMismatch {
                file: path.to_path_buf(),
                name: profile.name().to_string(),
                expected,
            }
            .into());
        }

        Ok(profile)
    }

    pub async fn save_profile_to_file(&self, profile: &Profile, overwrite: bool) -> Result<PathBuf> {
        profile.validate()?;
        let path = self.profile_path(profile.name())?;

        if !overwrite && tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(anyhow::anyhow!(
                "Profile file already exists: {} (use --force to overwrite)",
                path.display()
            ));
        }

        tokio::fs::create_dir_all(self.conf_dir).await.with_context(|| {
            format!(
                "Failed to create profile directory: {}",
                self.conf_dir.display()
            )
        })?;

        let serialized = profile.to_conf_string().with_context(|| {
            format!("Failed to serialize profile: {}", profile.name())
        })?;

        let mut output = tokio::fs::File::create(&path).await.with_context(|| {
            format!("Failed to create profile file: {}", path.display())
        })?;

        output
            .write_all(serialized.as_bytes())
            .await
            .with_context(|| format!("Failed to write profile file: {}", path.display()))?;

        output
            .flush()
            .await
            .with_context(|| format!("Failed to flush profile file: {}", path.display()))?;

        Ok(path)
    }
}
