//! `docsite nav` subcommands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use docsite_nav::{Mounted, NavigationConfig, render_into};
use serde_json::json;

use crate::cli::NavAction;
use crate::output;

pub fn handle(action: NavAction) -> Result<()> {
    match action {
        NavAction::Render {
            config,
            page,
            container,
            out,
        } => render(&config, &page, &container, out.as_deref()),
        NavAction::List { config } => list(&config),
    }
}

fn render(config: &Path, page: &Path, container: &str, out: Option<&Path>) -> Result<()> {
    let nav = NavigationConfig::load(config)?;
    let html = fs::read_to_string(page).with_context(|| format!("reading {}", page.display()))?;

    let (rendered, mounted) = render_into(&html, container, &nav);
    if mounted == Mounted::Skipped {
        output::warning(&format!(
            "No element with id \"{}\" in {}; page left unchanged",
            container,
            page.display()
        ));
    }

    match out {
        Some(path) => {
            fs::write(path, &rendered).with_context(|| format!("writing {}", path.display()))?;
            output::success(&format!(
                "Rendered {} links into {}",
                nav.link_count(),
                path.display()
            ));
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn list(config: &Path) -> Result<()> {
    let nav = NavigationConfig::load(config)?;
    if nav.groups().is_empty() {
        output::dim("No navigation groups configured");
        return Ok(());
    }

    output::header(&format!(
        "Navigation ({} groups, {} links)",
        nav.groups().len(),
        nav.link_count()
    ));

    let mut table = output::table();
    output::table_header(&mut table, &["Group", "Link", "Href"]);
    for group in nav.groups() {
        if group.links.is_empty() {
            output::table_row(&mut table, &[group.title.as_str(), "", ""]);
        }
        for (i, link) in group.links.iter().enumerate() {
            let title = if i == 0 { group.title.as_str() } else { "" };
            output::table_row(&mut table, &[title, link.title.as_str(), link.href.as_str()]);
        }
    }
    output::table_print(&table, &json!(nav.groups()));
    Ok(())
}
