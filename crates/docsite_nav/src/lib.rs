//! docsite-nav: renders the documentation table of contents.
//!
//! The navigation is an immutable [`NavigationConfig`] built once at startup and passed
//! to the renderer explicitly. Groups and links are emitted in configuration order.
//!
//! ```rust
//! use docsite_nav::{NavigationConfig, Mounted, render_into};
//!
//! let config = NavigationConfig::from_toml_str(r#"
//!     [[groups]]
//!     title = "Getting started"
//!     links = [{ title = "Quick start", href = "/pages/quick-start.html" }]
//! "#)?;
//!
//! let page = r#"<body><nav id="nav-tree"></nav></body>"#;
//! let (html, mounted) = render_into(page, "nav-tree", &config);
//! assert_eq!(mounted, Mounted::Inserted);
//! assert!(html.contains("Quick start"));
//! # Ok::<(), docsite_nav::NavError>(())
//! ```

pub mod config;
pub mod error;
pub mod html;
pub mod render;

pub use config::{NavLink, NavigationConfig, NavigationEntry};
pub use error::{NavError, Result};
pub use html::Mounted;
pub use render::{render_into, render_tree};
