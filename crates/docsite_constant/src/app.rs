//! Application metadata constants

pub const NAME: &str = "docsite";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = "Navigation rendering and page feedback for the observability docs site";

/// Directory name for docsite settings within the home directory
pub const DATA_DIR: &str = ".docsite";
/// Env file inside DATA_DIR
pub const ENV_FILE: &str = "env";

/// Element id the navigation tree is mounted into
pub const NAV_CONTAINER_ID: &str = "nav-tree";
/// Element id of the injected feedback widget
pub const FEEDBACK_WIDGET_ID: &str = "page-feedback";
