use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("invalid profile document: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("`{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("`{name}` is not a valid application name (lowercase letters, digits and dashes, starting with a letter)")]
    InvalidName { name: String },

    #[error("profile `{name}` uses a pipeline but has no upstream")]
    MissingUpstream { name: String },

    #[error("profile `{name}` lists itself as its upstream")]
    SelfUpstream { name: String },

    #[error("profile file `{}` declares application `{name}`, expected `{expected}`", .file.display())]
    NameMismatch {
        file: PathBuf,
        name: String,
        expected: String,
    },

    #[error("profile `{name}` is defined more than once")]
    DuplicateProfile { name: String },

    #[error("profile `{name}` has upstream `{upstream}`, which does not exist")]
    UnknownUpstream { name: String, upstream: String },

    #[error("promotion cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
}

impl ProfileError {
    /// Whether the issue concerns the named profile.
    pub fn involves(&self, profile_name: &str) -> bool {
        match self {
            ProfileError::Parse(_) | ProfileError::EmptyField(_) => false,
            ProfileError::InvalidName { name }
            | ProfileError::MissingUpstream { name }
            | ProfileError::SelfUpstream { name }
            | ProfileError::DuplicateProfile { name }
            | ProfileError::UnknownUpstream { name, .. } => name == profile_name,
            ProfileError::NameMismatch { name, expected, .. } => {
                name == profile_name || expected == profile_name
            }
            ProfileError::Cycle(names) => names.iter().any(|n| n == profile_name),
        }
    }
}
