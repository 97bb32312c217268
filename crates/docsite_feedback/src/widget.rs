//! Feedback form markup injected into each page's main content region.

use docsite_constant::app::FEEDBACK_WIDGET_ID;
use docsite_constant::feedback::MAX_FEEDBACK_CHARS;
use docsite_nav::html::{self, Mounted};

/// Markup of the feedback form posting to `endpoint`.
pub fn render_widget(endpoint: &str) -> String {
    let endpoint = html::escape_attr(endpoint);
    format!(
        "<section id=\"{id}\" class=\"feedback-widget\">\
         <h2>Was this page helpful?</h2>\
         <form method=\"post\" action=\"{endpoint}\">\
         <textarea name=\"text\" maxlength=\"{max}\" rows=\"3\" \
         placeholder=\"Tell us what worked or what was missing\"></textarea>\
         <button type=\"submit\">Send feedback</button>\
         <p class=\"feedback-status\" role=\"status\" aria-live=\"polite\"></p>\
         </form></section>",
        id = FEEDBACK_WIDGET_ID,
        endpoint = endpoint,
        max = MAX_FEEDBACK_CHARS,
    )
}

/// Append the widget to the end of `<main>`. Pages without `<main>` are left as they are.
pub fn inject_widget(page: &str, endpoint: &str) -> (String, Mounted) {
    if page.contains(&format!("id=\"{}\"", FEEDBACK_WIDGET_ID)) {
        return (page.to_string(), Mounted::Skipped);
    }
    html::append_to_element(page, "main", &render_widget(endpoint))
}
