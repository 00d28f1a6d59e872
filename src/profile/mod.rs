//! Application profiles
//!
//! A profile is one `<name>.conf` file describing a single Heroku
//! application: which branch it deploys, whether it is fed by pipeline
//! promotion from an upstream application, and the environment variables
//! it runs with.

pub mod application;
pub mod profile;
pub mod profile_error;
pub mod profile_manager;
pub mod profile_settings;

pub use application::Application;
pub use profile::Profile;
pub use profile_error::ProfileError;
pub use profile_manager::ProfileManager;
pub use profile_settings::ProfileSettings;
