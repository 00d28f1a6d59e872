//! Heroku access: the Platform API for reading releases and config vars,
//! and the Toolbelt CLI for operations the API client does not cover.

pub mod heroku_api;
pub mod heroku_error;
pub mod heroku_release;
pub mod toolbelt;

pub use heroku_api::HerokuApi;
pub use heroku_error::HerokuError;
pub use heroku_release::Release;
pub use toolbelt::Toolbelt;
