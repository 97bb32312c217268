//! `docsite site` subcommands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use docsite_feedback::inject_widget;
use docsite_nav::{Mounted, NavigationConfig, render_into};
use serde::Serialize;
use tracing::debug;

use crate::cli::SiteAction;
use crate::output;

pub fn handle(action: SiteAction) -> Result<()> {
    match action {
        SiteAction::Build {
            config,
            src,
            out,
            container,
            endpoint,
        } => {
            let nav = NavigationConfig::load(&config)?;
            let spinner = output::spinner(&format!("Building pages from {}...", src.display()));
            match build_site(&nav, &src, &out, &container, &endpoint) {
                Ok(report) => {
                    output::spinner_success(
                        &spinner,
                        &format!(
                            "{} pages written to {} ({} with navigation, {} with feedback)",
                            report.pages,
                            out.display(),
                            report.nav_mounted,
                            report.widget_mounted
                        ),
                    );
                    for page in &report.without_nav {
                        output::warning(&format!("no #{} container in {}", container, page));
                    }
                    if output::is_json() {
                        output::data("report", &report);
                    }
                    Ok(())
                }
                Err(e) => {
                    output::spinner_error(&spinner, "Site build failed");
                    Err(e)
                }
            }
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct BuildReport {
    pub pages: usize,
    pub nav_mounted: usize,
    pub widget_mounted: usize,
    pub copied: usize,
    /// Pages (relative paths) that have no navigation container
    pub without_nav: Vec<String>,
}

/// Mount the navigation and the feedback widget into every `.html` file under `src`,
/// writing the tree to `out`. Other files are copied unchanged.
pub fn build_site(
    nav: &NavigationConfig,
    src: &Path,
    out: &Path,
    container: &str,
    endpoint: &str,
) -> Result<BuildReport> {
    let src = src
        .canonicalize()
        .with_context(|| format!("source directory {}", src.display()))?;
    let out = resolve_output(out)?;
    if out.starts_with(&src) {
        bail!("output directory {} is inside the source directory", out.display());
    }
    fs::create_dir_all(&out).with_context(|| format!("creating {}", out.display()))?;

    let mut files = Vec::new();
    collect_files(&src, &mut files)?;
    files.sort();

    let mut report = BuildReport::default();
    for path in files {
        let relative = path.strip_prefix(&src)?;
        let target = out.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let is_html = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"));
        if !is_html {
            fs::copy(&path, &target).with_context(|| format!("copying {}", path.display()))?;
            report.copied += 1;
            continue;
        }

        let page = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let (page, nav_mounted) = render_into(&page, container, nav);
        let (page, widget_mounted) = inject_widget(&page, endpoint);
        fs::write(&target, page).with_context(|| format!("writing {}", target.display()))?;

        debug!(page = %relative.display(), ?nav_mounted, ?widget_mounted, "page built");
        report.pages += 1;
        match nav_mounted {
            Mounted::Inserted => report.nav_mounted += 1,
            Mounted::Skipped => report.without_nav.push(relative.display().to_string()),
        }
        if widget_mounted == Mounted::Inserted {
            report.widget_mounted += 1;
        }
    }
    Ok(report)
}

/// Absolute form of `out` without creating it: the nearest existing ancestor is
/// canonicalized and the missing components are appended.
fn resolve_output(out: &Path) -> Result<PathBuf> {
    let absolute = if out.is_absolute() {
        out.to_path_buf()
    } else {
        std::env::current_dir()?.join(out)
    };
    let mut base = absolute.as_path();
    let mut missing = Vec::new();
    while !base.exists() {
        let (Some(name), Some(parent)) = (base.file_name(), base.parent()) else {
            bail!("cannot resolve output directory {}", out.display());
        };
        missing.push(name);
        base = parent;
    }
    let mut resolved = base
        .canonicalize()
        .with_context(|| format!("output directory {}", out.display()))?;
    resolved.extend(missing.iter().rev());
    Ok(resolved)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_files(&entry.path(), files)?;
        } else if file_type.is_file() {
            files.push(entry.path());
        }
    }
    Ok(())
}
