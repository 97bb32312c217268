//! Minimal HTML helpers: escaping and locating mount points in prebuilt pages.
//!
//! Pages are static, hand-authored files, so a tag scanner is enough; no DOM is built.

/// Result of mounting a fragment into a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mounted {
    Inserted,
    /// Mount point absent; page left untouched.
    Skipped,
}

/// Escape text content.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value.
pub fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;").replace('\'', "&#39;")
}

/// An opening tag found in a page: byte span and lowercase name.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OpenTag {
    start: usize,
    end: usize,
    name: String,
}

/// Index just past the `>` closing the tag that starts at `start`, quote-aware.
fn tag_end(html: &str, start: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in html[start..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '>') => return Some(start + i + 1),
            _ => {}
        }
    }
    None
}

/// Elements whose content is raw text, never markup.
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// Byte index of the first case-insensitive occurrence of `needle` at or after `from`.
fn find_ci(html: &str, from: usize, needle: &str) -> Option<usize> {
    html[from..]
        .to_ascii_lowercase()
        .find(needle)
        .map(|rel| from + rel)
}

/// Opening tags in document order. Comments and the content of raw text elements are
/// skipped, so markup quoted there is never matched.
fn open_tags(html: &str) -> impl Iterator<Item = OpenTag> + '_ {
    let mut pos = 0;
    std::iter::from_fn(move || {
        loop {
            let rel = html[pos..].find('<')?;
            let start = pos + rel;
            if html[start..].starts_with("<!--") {
                // unterminated comment runs to the end of the page
                pos = html[start + 4..].find("-->").map(|r| start + 4 + r + 3)?;
                continue;
            }
            let name: String = html[start + 1..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect();
            if name.is_empty() {
                // closing tag, doctype or a stray '<'
                pos = start + 1;
                continue;
            }
            let end = tag_end(html, start)?;
            let name = name.to_ascii_lowercase();
            pos = if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                find_ci(html, end, &format!("</{}", name)).unwrap_or(html.len())
            } else {
                end
            };
            return Some(OpenTag { start, end, name });
        }
    })
}

/// Attribute value of `attr` inside a single opening tag.
fn attribute<'a>(tag: &'a str, attr: &str) -> Option<&'a str> {
    let inner = tag.trim_start_matches('<').trim_end_matches('>').trim_end_matches('/');
    let mut rest = inner.trim_start_matches(|c: char| !c.is_whitespace());
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return None;
        }
        let name_len = rest
            .find(|c: char| c.is_whitespace() || c == '=')
            .unwrap_or(rest.len());
        let name = &rest[..name_len];
        rest = rest[name_len..].trim_start();
        let value = if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            match after_eq.chars().next() {
                Some(q @ ('"' | '\'')) => {
                    let body = &after_eq[1..];
                    let close = body.find(q).unwrap_or(body.len());
                    rest = body.get(close + 1..).unwrap_or("");
                    &body[..close]
                }
                _ => {
                    let len = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
                    rest = &after_eq[len..];
                    &after_eq[..len]
                }
            }
        } else {
            ""
        };
        if name.eq_ignore_ascii_case(attr) {
            return Some(value);
        }
    }
}

/// Insert `fragment` right after the opening tag of the element whose id is `id`.
pub fn insert_into_element(html: &str, id: &str, fragment: &str) -> (String, Mounted) {
    let found = open_tags(html).find(|t| attribute(&html[t.start..t.end], "id") == Some(id));
    match found {
        Some(tag) => {
            let mut out = String::with_capacity(html.len() + fragment.len());
            out.push_str(&html[..tag.end]);
            out.push_str(fragment);
            out.push_str(&html[tag.end..]);
            (out, Mounted::Inserted)
        }
        None => (html.to_string(), Mounted::Skipped),
    }
}

/// Append `fragment` at the end of the first `<tag_name>` element, before its closing tag.
pub fn append_to_element(html: &str, tag_name: &str, fragment: &str) -> (String, Mounted) {
    let tag_name = tag_name.to_ascii_lowercase();
    let Some(open) = open_tags(html).find(|t| t.name == tag_name) else {
        return (html.to_string(), Mounted::Skipped);
    };
    let close_at = find_ci(html, open.end, &format!("</{}", tag_name));
    match close_at {
        Some(at) => {
            let mut out = String::with_capacity(html.len() + fragment.len());
            out.push_str(&html[..at]);
            out.push_str(fragment);
            out.push_str(&html[at..]);
            (out, Mounted::Inserted)
        }
        None => (html.to_string(), Mounted::Skipped),
    }
}
