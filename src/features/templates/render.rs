//! Keyword substitution for template bodies.
//!
//! Tokens are `{{key}}` with no inner whitespace. Data keywords are replaced
//! from a context map; action keywords are replaced with a link or button
//! whose URL comes from an [`ActionUrlResolver`]. Anything that does not
//! resolve is left exactly as written.

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use super::keywords::{ActionKeyword, TEMPLATE_KEYWORDS};
use super::types::Channel;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{([A-Za-z0-9_.\-]+)\}\}").unwrap_or_else(|e| panic!("Invalid token regex: {e}"))
});

/// Sample values for every data keyword, used by previews.
pub static DEMO_DATA: Lazy<HashMap<String, String>> = Lazy::new(|| {
    TEMPLATE_KEYWORDS
        .iter()
        .filter(|k| !k.is_action())
        .map(|k| (k.key.to_string(), k.example.to_string()))
        .collect()
});

/// Replace data tokens with values from the context.
///
/// Tokens with no context entry stay verbatim. Substituted values are not
/// scanned again.
#[must_use]
pub fn render(body: &str, context: &HashMap<String, String>) -> String {
    TOKEN_RE
        .replace_all(body, |caps: &Captures<'_>| {
            let key = &caps[1];
            context.get(key).map_or_else(
                || {
                    debug!(key, "unresolved template token");
                    caps[0].to_string()
                },
                Clone::clone,
            )
        })
        .into_owned()
}

/// Distinct keys referenced by well-formed tokens.
#[must_use]
pub fn extract_keywords(body: &str) -> BTreeSet<String> {
    TOKEN_RE
        .captures_iter(body)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Turns an action keyword into a URL.
#[cfg_attr(test, mockall::automock)]
pub trait ActionUrlResolver {
    /// URL for the action, or `None` to leave the token in place.
    fn resolve(&self, action: ActionKeyword) -> Option<String>;
}

/// Resolves every action to one placeholder href.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewLinks {
    pub href: String,
}

impl PreviewLinks {
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

impl Default for PreviewLinks {
    fn default() -> Self {
        Self::new("#")
    }
}

impl ActionUrlResolver for PreviewLinks {
    fn resolve(&self, _action: ActionKeyword) -> Option<String> {
        Some(self.href.clone())
    }
}

/// Resolves actions from a fixed table; missing actions stay unresolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticLinks {
    links: HashMap<ActionKeyword, String>,
}

impl StaticLinks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_link(mut self, action: ActionKeyword, url: impl Into<String>) -> Self {
        self.links.insert(action, url.into());
        self
    }

    pub fn insert(&mut self, action: ActionKeyword, url: impl Into<String>) {
        self.links.insert(action, url.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl ActionUrlResolver for StaticLinks {
    fn resolve(&self, action: ActionKeyword) -> Option<String> {
        self.links.get(&action).cloned()
    }
}

/// Button colors for HTML channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionStyle {
    pub background: String,
    pub text_color: String,
}

impl Default for ActionStyle {
    fn default() -> Self {
        Self {
            background: "#27ae60".to_string(),
            text_color: "#ffffff".to_string(),
        }
    }
}

/// How action tokens are rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub channel: Channel,
    pub style: ActionStyle,
}

impl RenderOptions {
    #[must_use]
    pub fn for_channel(channel: Channel) -> Self {
        Self {
            channel,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: ActionStyle) -> Self {
        self.style = style;
        self
    }
}

/// Replace action tokens with links.
///
/// A token sitting directly inside an attribute value (`href="{{pay-invoice}}"`)
/// becomes the bare URL. Elsewhere, HTML channels get a styled anchor and SMS
/// gets the plain URL. Data tokens and unresolved actions are untouched.
#[must_use]
pub fn render_actions(body: &str, resolver: &dyn ActionUrlResolver, options: &RenderOptions) -> String {
    TOKEN_RE
        .replace_all(body, |caps: &Captures<'_>| {
            let whole = &caps[0];
            let Some(action) = ActionKeyword::from_key(&caps[1]) else {
                return whole.to_string();
            };
            let Some(url) = resolver.resolve(action) else {
                debug!(action = action.key(), "no url for action");
                return whole.to_string();
            };

            let start = caps.get(0).map_or(0, |m| m.start());
            let prefix = &body[..start];
            if prefix.ends_with("=\"") || prefix.ends_with("='") {
                if options.channel.is_html() {
                    escape_attr(&url)
                } else {
                    url
                }
            } else if options.channel.is_html() {
                button_html(action, &url, &options.style)
            } else {
                url
            }
        })
        .into_owned()
}

/// Data substitution followed by action substitution.
#[must_use]
pub fn render_full(
    body: &str,
    context: &HashMap<String, String>,
    resolver: &dyn ActionUrlResolver,
    options: &RenderOptions,
) -> String {
    render_actions(&render(body, context), resolver, options)
}

/// Render with demo values and placeholder links.
#[must_use]
pub fn render_preview(body: &str, channel: Channel) -> String {
    render_full(
        body,
        &DEMO_DATA,
        &PreviewLinks::default(),
        &RenderOptions::for_channel(channel),
    )
}

/// Wrap an HTML fragment in a standalone preview page.
#[must_use]
pub fn preview_document(content: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n  <head>\n    \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    \
         <style>\n      body {{\n        \
         font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif;\n        \
         margin: 0;\n        padding: 16px;\n        background-color: #f9fafb;\n      }}\n    \
         </style>\n  </head>\n  <body>\n{content}\n  </body>\n</html>\n"
    )
}

fn button_html(action: ActionKeyword, url: &str, style: &ActionStyle) -> String {
    format!(
        "<a href=\"{}\" style=\"display: inline-block; background-color: {}; color: {}; \
         padding: 12px 30px; text-decoration: none; border-radius: 5px; font-weight: bold;\">{}</a>",
        escape_attr(url),
        escape_attr(&style.background),
        escape_attr(&style.text_color),
        action.button_label()
    )
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn ctx(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_render_substitutes_known_tokens() {
        let context = ctx(&[("contact.firstName", "John")]);
        assert_eq!(render("Hello {{contact.firstName}}", &context), "Hello John");
    }

    #[test]
    fn test_render_leaves_unresolved_tokens() {
        let context = ctx(&[("contact.firstName", "John")]);
        let out = render("{{contact.firstName}} owes {{invoice.total}}", &context);
        assert_eq!(out, "John owes {{invoice.total}}");
        assert!(extract_keywords(&out).contains("invoice.total"));
    }

    #[test]
    fn test_render_ignores_malformed_tokens() {
        let context = ctx(&[("a", "x")]);
        for body in ["{{a", "a}}", "{{ a }}", "{{}}", "{a}"] {
            assert_eq!(render(body, &context), body);
        }
        assert_eq!(render("{{{a}}}", &context), "{x}");
    }

    #[test]
    fn test_resolved_body_has_no_keywords_left() {
        let context = ctx(&[("job.title", "Deck"), ("job.total", "$10")]);
        let out = render("{{job.title}}: {{job.total}}", &context);
        assert!(extract_keywords(&out).is_empty());
    }

    #[test]
    fn test_render_is_idempotent() {
        let context = ctx(&[("contact.firstName", "John")]);
        let once = render("Hi {{contact.firstName}} {{job.crew}}", &context);
        assert_eq!(render(&once, &context), once);
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let context = ctx(&[("a", "{{b}}"), ("b", "nope")]);
        assert_eq!(render("{{a}}", &context), "{{b}}");
    }

    #[test]
    fn test_extract_keywords_distinct() {
        let keys = extract_keywords("{{a.b}} {{a.b}} {{pay-invoice}} {{ bad }}");
        assert_eq!(
            keys.into_iter().collect::<Vec<_>>(),
            vec!["a.b".to_string(), "pay-invoice".to_string()]
        );
    }

    #[test]
    fn test_render_actions_button_in_preview() {
        let out = render_full(
            "Pay now {{pay-invoice}} {{invoice.total}}",
            &HashMap::new(),
            &PreviewLinks::default(),
            &RenderOptions::default(),
        );

        assert!(out.starts_with("Pay now <a href=\"#\""));
        assert!(out.contains("background-color: #27ae60"));
        assert!(out.contains(">Pay Now</a>"));
        assert!(out.ends_with("{{invoice.total}}"));
    }

    #[test]
    fn test_render_actions_inside_attribute() {
        let links = StaticLinks::new().with_link(ActionKeyword::ViewInvoice, "https://x.test/i?a=1&b=2");
        let out = render_actions(
            "<a href=\"{{view-invoice}}\">Open</a>",
            &links,
            &RenderOptions::default(),
        );
        assert_eq!(out, "<a href=\"https://x.test/i?a=1&amp;b=2\">Open</a>");
    }

    #[test]
    fn test_render_actions_sms_uses_plain_url() {
        let links = StaticLinks::new().with_link(ActionKeyword::PayInvoice, "https://pay.test/1");
        let out = render_actions(
            "Pay: {{pay-invoice}}",
            &links,
            &RenderOptions::for_channel(Channel::Sms),
        );
        assert_eq!(out, "Pay: https://pay.test/1");
    }

    #[test]
    fn test_unresolved_action_is_kept() {
        let out = render_actions(
            "{{pay-invoice}} {{view-invoice}}",
            &StaticLinks::new().with_link(ActionKeyword::ViewInvoice, "u"),
            &RenderOptions::for_channel(Channel::Sms),
        );
        assert_eq!(out, "{{pay-invoice}} u");
    }

    #[test]
    fn test_resolver_is_consulted_per_action() {
        let mut resolver = MockActionUrlResolver::new();
        resolver
            .expect_resolve()
            .with(eq(ActionKeyword::BookingFormLink))
            .times(2)
            .returning(|_| Some("https://book.test".to_string()));

        let out = render_actions(
            "{{booking-form-link}} / {{booking-form-link}} / {{contact.firstName}}",
            &resolver,
            &RenderOptions::for_channel(Channel::Sms),
        );
        assert_eq!(out, "https://book.test / https://book.test / {{contact.firstName}}");
    }

    #[test]
    fn test_custom_style() {
        let options = RenderOptions::default().with_style(ActionStyle {
            background: "#000000".to_string(),
            text_color: "#eeeeee".to_string(),
        });
        let out = render_actions("{{view-proposal}}", &PreviewLinks::new("/p"), &options);
        assert!(out.contains("background-color: #000000; color: #eeeeee;"));
        assert!(out.contains("href=\"/p\""));
        assert!(out.contains(">View Proposal</a>"));
    }

    #[test]
    fn test_demo_data_and_preview() {
        assert_eq!(DEMO_DATA.get("contact.firstName").map(String::as_str), Some("John"));
        assert!(!DEMO_DATA.contains_key("pay-invoice"));

        let out = render_preview("Hi {{contact.firstName}} {{payment-link}}", Channel::Sms);
        assert_eq!(out, "Hi John #");
    }

    #[test]
    fn test_preview_document_wraps_body() {
        let doc = preview_document("<p>Hi</p>");
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<p>Hi</p>"));
        assert!(doc.contains("background-color: #f9fafb"));
    }
}
