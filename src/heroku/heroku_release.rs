use crate::heroku::heroku_error::HerokuError;
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::fmt;
use tracing::info;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReleaseApp {
    pub name: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReleaseUser {
    pub email: String,
}

/// A release as described by the Heroku Platform API.
/// https://devcenter.heroku.com/articles/platform-api-reference#release
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub app: ReleaseApp,
    #[serde(default)]
    pub description: String,
    pub version: u64,
    pub updated_at: String,
    pub user: ReleaseUser,
}

/// How a release came to exist, from the first word of its description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseKind {
    /// "Promote my-app v123 75c70c5"
    Promote,
    /// "Deploy 75c70c5"
    Deploy,
    /// Config changes, add-on updates, rollbacks.
    Other,
}

impl Release {
    pub fn application(&self) -> &str {
        &self.app.name
    }

    pub fn deployed_by(&self) -> &str {
        &self.user.email
    }

    pub fn kind(&self) -> ReleaseKind {
        match self.description.split_whitespace().next() {
            Some("Promote") => ReleaseKind::Promote,
            Some("Deploy") => ReleaseKind::Deploy,
            _ => ReleaseKind::Other,
        }
    }

    pub fn is_deployment(&self) -> bool {
        self.kind() != ReleaseKind::Other
    }

    /// Hash of the commit the release deployed, when the description
    /// carries one.
    pub fn commit(&self) -> Option<&str> {
        let mut words = self.description.split_whitespace();
        match self.kind() {
            ReleaseKind::Promote => words.nth(3),
            ReleaseKind::Deploy => words.nth(1),
            ReleaseKind::Other => None,
        }
    }

    pub fn deployed_at(&self) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(&self.updated_at)
    }

    /// The most recent deployment in `releases`, which must be ordered
    /// newest first.
    pub fn latest_deployment(releases: Vec<Release>) -> Result<Release, HerokuError> {
        for release in releases {
            if release.is_deployment() {
                return Ok(release);
            }
            info!("Ignoring release: {}", release.description);
        }
        Err(HerokuError::NoDeployments)
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Release {} [{}] of {}, deployed by {} at {}",
            self.version,
            self.commit().unwrap_or("invalid"),
            self.application(),
            self.deployed_by(),
            self.updated_at
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn release(version: u64, description: &str) -> Release {
        serde_json::from_value(json!({
            "app": {"name": "my-app-prod", "id": "01234567-89ab-cdef-0123-456789abcdef"},
            "description": description,
            "version": version,
            "updated_at": "2015-02-12T17:02:40Z",
            "user": {"email": "ops@example.com", "id": "01234567-89ab-cdef-0123-456789abcdef"},
            "status": "succeeded",
        }))
        .unwrap()
    }

    #[test]
    fn commit_from_promotion() {
        let release = release(123, "Promote my-app-staging v45 75c70c5");
        assert_eq!(release.kind(), ReleaseKind::Promote);
        assert_eq!(release.commit(), Some("75c70c5"));
    }

    #[test]
    fn commit_from_deploy() {
        let release = release(12, "Deploy 62d49e9");
        assert_eq!(release.kind(), ReleaseKind::Deploy);
        assert_eq!(release.commit(), Some("62d49e9"));
    }

    #[test]
    fn other_releases_have_no_commit() {
        let release = release(13, "Set DEBUG config vars");
        assert_eq!(release.kind(), ReleaseKind::Other);
        assert_eq!(release.commit(), None);
        assert!(release.to_string().contains("[invalid]"));
    }

    #[test]
    fn latest_deployment_skips_other_releases() {
        let releases = vec![
            release(15, "Set DEBUG config vars"),
            release(14, "Add papertrail:choklad add-on"),
            release(13, "Deploy 62d49e9"),
            release(12, "Deploy 81a5ea8"),
        ];
        let latest = Release::latest_deployment(releases).unwrap();
        assert_eq!(latest.version, 13);
        assert_eq!(
            latest.to_string(),
            "Release 13 [62d49e9] of my-app-prod, deployed by ops@example.com at 2015-02-12T17:02:40Z"
        );
    }

    #[test]
    fn no_deployment_is_an_error() {
        let releases = vec![release(2, "Enable Logplex"), release(1, "Initial release")];
        assert!(matches!(
            Release::latest_deployment(releases),
            Err(HerokuError::NoDeployments)
        ));
    }

    #[test]
    fn deployed_at_parses_timestamp() {
        let deployed_at = release(1, "Deploy 62d49e9").deployed_at().unwrap();
        assert_eq!(deployed_at.timestamp(), 1_423_760_560);
    }
}
