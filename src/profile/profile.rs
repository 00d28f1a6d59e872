use crate::profile::application::{Application, is_valid_name};
use crate::profile::profile_error::ProfileError;
use crate::profile::profile_settings::{self, ProfileSettings};
use serde::Deserialize;
use std::fmt::Write;

const INDENT: &str = "    ";

/// One deployable environment: the application it targets and the
/// environment variables it carries.
#[derive(Deserialize, PartialEq, Eq, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    pub application: Application,
    #[serde(deserialize_with = "profile_settings::deserialize_section")]
    pub settings: ProfileSettings,
}

impl Profile {
    pub fn new(application: Application, settings: ProfileSettings) -> Self {
        Self {
            application,
            settings,
        }
    }

    /// Parses and validates a profile document.
    pub fn from_conf_str(text: &str) -> Result<Self, ProfileError> {
        let profile: Profile = serde_yaml::from_str(text)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn name(&self) -> &str {
        &self.application.name
    }

    pub fn branch(&self) -> &str {
        &self.application.branch
    }

    pub fn upstream(&self) -> Option<&str> {
        self.application.upstream()
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        let application = &self.application;
        if application.name.trim().is_empty() {
            return Err(ProfileError::EmptyField("application.name"));
        }
        if application.branch.trim().is_empty() {
            return Err(ProfileError::EmptyField("application.branch"));
        }
        if !is_valid_name(&application.name) {
            return Err(ProfileError::InvalidName {
                name: application.name.clone(),
            });
        }
        match application.upstream() {
            Some(upstream) if upstream.trim().is_empty() => {
                Err(ProfileError::EmptyField("application.upstream"))
            }
            Some(upstream) if !is_valid_name(upstream) => Err(ProfileError::InvalidName {
                name: upstream.to_string(),
            }),
            Some(upstream) if upstream == application.name => Err(ProfileError::SelfUpstream {
                name: application.name.clone(),
            }),
            None if application.pipeline => Err(ProfileError::MissingUpstream {
                name: application.name.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Renders the profile in the on-disk format. The output parses back
    /// into an equal profile.
    pub fn to_conf_string(&self) -> Result<String, ProfileError> {
        let application = &self.application;
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "# Heroku application profile for {}.", application.name);
        let _ = writeln!(out, "# The file name must match application.name.");
        let _ = writeln!(out, "application:");
        let _ = writeln!(out, "{INDENT}name: {}", yaml_scalar(&application.name)?);
        let _ = writeln!(out, "{INDENT}branch: {}", yaml_scalar(&application.branch)?);
        let _ = writeln!(out, "{INDENT}pipeline: {}", capitalized(application.pipeline));
        if let Some(upstream) = application.upstream() {
            let _ = writeln!(out, "{INDENT}upstream: {}", yaml_scalar(upstream)?);
        }
        if self.settings.is_empty() {
            let _ = writeln!(out, "settings: {{}}");
        } else {
            let _ = writeln!(out, "settings:");
            for (key, value) in self.settings.iter() {
                let _ = writeln!(out, "{INDENT}{}: {}", yaml_scalar(key)?, yaml_scalar(value)?);
            }
        }
        Ok(out)
    }
}

/// Spelling used for booleans in profile files.
pub fn capitalized(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

// Quotes only when the plain form would read back as something else.
fn yaml_scalar(value: &str) -> Result<String, ProfileError> {
    if value.contains('\n') {
        return Ok(serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}")));
    }
    Ok(serde_yaml::to_string(value)?.trim_end().to_string())
}
