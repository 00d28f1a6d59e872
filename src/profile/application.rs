use serde::{Deserialize, Serialize};

/// The `application` section of a profile.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct Application {
    /// Heroku application name, also the profile file stem.
    pub name: String,
    /// Branch deployed to this application by default.
    pub branch: String,
    /// Deployments arrive by pipeline promotion rather than a direct push.
    pub pipeline: bool,
    /// Application this one is promoted or migrated from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream: Option<String>,
}

impl Application {
    pub fn new(name: &str, branch: &str, upstream: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            branch: branch.to_string(),
            pipeline: upstream.is_some(),
            upstream: upstream.map(str::to_string),
        }
    }

    pub fn upstream(&self) -> Option<&str> {
        self.upstream.as_deref()
    }
}

/// Heroku application names: a lowercase letter followed by lowercase
/// letters, digits or dashes, 2 to 30 characters in all. Such a name is
/// always a single path component, so it can double as the file stem.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_lowercase());
    starts_with_letter
        && (2..=30).contains(&name.len())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
