pub mod commit;
pub mod git_repo;

pub use commit::Commit;
pub use git_repo::{GitError, GitRepo, remote_url};
