pub const PRODUCT_NAME: &str = "heroku-tools";
pub const VERSION_MAJOR: &str = env!("CARGO_PKG_VERSION_MAJOR");
pub const VERSION_MINOR: &str = env!("CARGO_PKG_VERSION_MINOR");
pub const VERSION_PATCH: &str = env!("CARGO_PKG_VERSION_PATCH");
pub const PRODUCT_DESCRIPTION: &str = "Heroku deployment helper tool";
pub const LICENSE: &str = "MIT";
