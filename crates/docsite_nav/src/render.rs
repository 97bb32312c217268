//! Navigation tree rendering.

use std::fmt::Write;

use crate::config::NavigationConfig;
use crate::html::{self, Mounted};

/// Render the whole tree: one heading per group, one link per entry, input order kept.
pub fn render_tree(config: &NavigationConfig) -> String {
    let mut out = String::from("<ul class=\"nav-groups\">");
    for group in config.groups() {
        write!(
            out,
            "<li class=\"nav-group\"><h3>{}</h3><ul>",
            html::escape_text(&group.title)
        )
        .ok();
        for link in &group.links {
            write!(
                out,
                "<li><a href=\"{}\">{}</a></li>",
                html::escape_attr(&link.href),
                html::escape_text(&link.title)
            )
            .ok();
        }
        out.push_str("</ul></li>");
    }
    out.push_str("</ul>");
    out
}

/// Render `config` into the element of `page` whose id is `container_id`.
///
/// A page without that container comes back unchanged with [`Mounted::Skipped`];
/// the navigation is optional and never fails a page.
pub fn render_into(page: &str, container_id: &str, config: &NavigationConfig) -> (String, Mounted) {
    let (html, mounted) = html::insert_into_element(page, container_id, &render_tree(config));
    match mounted {
        Mounted::Inserted => tracing::debug!(
            container = container_id,
            groups = config.groups().len(),
            links = config.link_count(),
            "navigation rendered"
        ),
        Mounted::Skipped => {
            tracing::debug!(container = container_id, "navigation container absent, skipping")
        }
    }
    (html, mounted)
}
