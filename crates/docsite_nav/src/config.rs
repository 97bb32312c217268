//! Navigation configuration.
//!
//! Loaded once from TOML:
//!
//! ```toml
//! [[groups]]
//! title = "Instrumentation"
//!
//! [[groups.links]]
//! title = "Go"
//! href = "/pages/go.html"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NavError, Result};

/// One labelled link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub title: String,
    pub href: String,
}

impl NavLink {
    pub fn new(title: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            href: href.into(),
        }
    }
}

/// A titled group of links. Link order is display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEntry {
    pub title: String,
    pub links: Vec<NavLink>,
}

impl NavigationEntry {
    pub fn new(title: impl Into<String>, links: Vec<NavLink>) -> Self {
        Self {
            title: title.into(),
            links,
        }
    }
}

/// The whole table of contents. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationConfig {
    #[serde(default)]
    groups: Vec<NavigationEntry>,
}

impl NavigationConfig {
    /// Build and validate a config from groups.
    pub fn new(groups: Vec<NavigationEntry>) -> Result<Self> {
        let config = Self { groups };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| NavError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn groups(&self) -> &[NavigationEntry] {
        &self.groups
    }

    pub fn link_count(&self) -> usize {
        self.groups.iter().map(|g| g.links.len()).sum()
    }

    /// Every group needs a title and at least one link; every link needs a title and href.
    pub fn validate(&self) -> Result<()> {
        for (gi, group) in self.groups.iter().enumerate() {
            if group.title.trim().is_empty() {
                return Err(NavError::InvalidConfig(format!("group {} has an empty title", gi)));
            }
            if group.links.is_empty() {
                return Err(NavError::InvalidConfig(format!(
                    "group '{}' has no links",
                    group.title
                )));
            }
            for (li, link) in group.links.iter().enumerate() {
                if link.title.trim().is_empty() || link.href.trim().is_empty() {
                    return Err(NavError::InvalidConfig(format!(
                        "link {} in group '{}' needs both a title and an href",
                        li, group.title
                    )));
                }
            }
        }
        Ok(())
    }
}
