use std::fmt;

const SHORT_HASH_LEN: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub hash: String,
    pub message: String,
}

impl fmt::Display for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.hash, self.message)
    }
}

pub fn short_hash(hash: &str) -> String {
    hash.trim().chars().take(SHORT_HASH_LEN).collect()
}

/// Parses `git log --oneline` output, most recent commit first.
pub fn parse_oneline_log(raw: &str) -> Vec<Commit> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let (hash, message) = line.split_once(' ').unwrap_or((line, ""));
            Commit {
                hash: short_hash(hash),
                message: message.trim().to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_oneline_log() {
        let raw = "\n81a5ea8 Fix for failing tests.\n62d49e9 Refactoring of conversations.\n\n";
        let commits = parse_oneline_log(raw);
        assert_eq!(
            commits,
            vec![
                Commit {
                    hash: "81a5ea8".to_string(),
                    message: "Fix for failing tests.".to_string()
                },
                Commit {
                    hash: "62d49e9".to_string(),
                    message: "Refactoring of conversations.".to_string()
                },
            ]
        );
        assert_eq!(commits[0].to_string(), "81a5ea8 Fix for failing tests.");
    }

    #[test]
    fn long_abbreviations_are_shortened() {
        let commits = parse_oneline_log("81a5ea8c2 Bigger repositories print longer hashes\n");
        assert_eq!(commits[0].hash, "81a5ea8");
    }

    #[test]
    fn empty_log_has_no_commits() {
        assert!(parse_oneline_log("").is_empty());
        assert!(parse_oneline_log("\n  \n").is_empty());
    }
}
