//! Description Markdown
//!
//! Renders ticket descriptions with pulldown-cmark, plus:
//! - Syntax highlighting of fenced code (syntect)
//! - `#12` references to known tickets become links showing the padded key
//! - Raw HTML is shown as text, never injected

use pulldown_cmark::{html::push_html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::sync::OnceLock;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::models::TicketKey;
use crate::tickets::TicketStore;

/// Syntax highlighter resources (lazy loaded)
static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

fn get_syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn get_theme() -> Option<&'static Theme> {
    THEME_SET.get_or_init(ThemeSet::load_defaults).themes.get("InspiredGitHub")
}

/// Render a description to HTML, linking `#n` to tickets in `store`
pub fn render_description(text: &str, store: &TicketStore) -> String {
    render_with(text, |key| store.contains(key).then(|| store.display_key(key)))
}

/// Render with a custom ticket resolver (`None` = leave the text alone)
pub fn render_with(text: &str, resolve: impl Fn(TicketKey) -> Option<String>) -> String {
    let parser = Parser::new_ext(text, get_options());
    let events = transform_events(parser, &resolve);
    let mut html_output = String::new();
    push_html(&mut html_output, events.into_iter());
    html_output
}

fn get_options() -> Options {
    Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES | Options::ENABLE_TASKLISTS
}

// State for the event transformer
enum State {
    Normal { link_depth: usize },
    InCodeBlock { lang: Option<String>, content: String, link_depth: usize },
}

fn transform_events<'a>(parser: Parser<'a>, resolve: &dyn Fn(TicketKey) -> Option<String>) -> Vec<Event<'a>> {
    let mut events = Vec::new();
    let mut state = State::Normal { link_depth: 0 };

    for event in parser {
        match state {
            State::Normal { ref mut link_depth } => match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(l) if !l.is_empty() => Some(l.to_string()),
                        _ => None,
                    };
                    state = State::InCodeBlock { lang, content: String::new(), link_depth: *link_depth };
                }
                Event::Start(Tag::Link { link_type, dest_url, title, id }) => {
                    *link_depth += 1;
                    let dest_url = safe_url(dest_url);
                    events.push(Event::Start(Tag::Link { link_type, dest_url, title, id }));
                }
                Event::Start(Tag::Image { link_type, dest_url, title, id }) => {
                    let dest_url = safe_url(dest_url);
                    events.push(Event::Start(Tag::Image { link_type, dest_url, title, id }));
                }
                Event::End(TagEnd::Link) => {
                    *link_depth = link_depth.saturating_sub(1);
                    events.push(Event::End(TagEnd::Link));
                }
                // No markup from descriptions reaches the page
                Event::Html(raw) | Event::InlineHtml(raw) => events.push(Event::Text(raw)),
                Event::Text(text) if *link_depth == 0 && text.contains('#') => {
                    events.extend(link_ticket_refs(&text, resolve));
                }
                other => events.push(other),
            },

            State::InCodeBlock { ref lang, ref mut content, link_depth } => match event {
                Event::Text(t) => content.push_str(&t),
                Event::End(TagEnd::CodeBlock) => {
                    let html = highlight_code(content, lang.as_deref());
                    events.push(Event::Html(CowStr::from(html)));
                    state = State::Normal { link_depth };
                }
                _ => {}
            },
        }
    }

    events
}

/// Keep http(s), mailto and relative URLs; anything else becomes `#`
fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let trimmed = url.trim_start();
    let scheme_end = trimmed.find(|c: char| matches!(c, ':' | '/' | '?' | '#'));
    let allowed = match scheme_end {
        Some(i) if trimmed.as_bytes()[i] == b':' => {
            let scheme = trimmed[..i].to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto")
        }
        // No scheme: relative path, query or fragment
        _ => true,
    };
    if allowed { url } else { CowStr::Borrowed("#") }
}

fn highlight_code(code: &str, lang: Option<&str>) -> String {
    let ss = get_syntax_set();
    let syntax = lang
        .and_then(|l| ss.find_syntax_by_token(l))
        .unwrap_or_else(|| ss.find_syntax_plain_text());

    get_theme()
        .and_then(|theme| highlighted_html_for_string(code, ss, syntax, theme).ok())
        .unwrap_or_else(|| format!("<pre><code>{}</code></pre>", escape_html(code)))
}

/// Split text around `#<digits>` references that resolve to a ticket
fn link_ticket_refs(text: &str, resolve: &dyn Fn(TicketKey) -> Option<String>) -> Vec<Event<'static>> {
    let mut events = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;
    let bytes = text.as_bytes();

    while i < bytes.len() {
        let boundary = i == 0 || !(bytes[i - 1].is_ascii_alphanumeric() || bytes[i - 1] == b'&');
        if bytes[i] != b'#' || !boundary {
            i += 1;
            continue;
        }
        let digits_end = bytes[i + 1..]
            .iter()
            .position(|b| !b.is_ascii_digit())
            .map_or(bytes.len(), |p| i + 1 + p);
        let followed_by_word = bytes.get(digits_end).map_or(false, |b| b.is_ascii_alphabetic());
        let label = text[i + 1..digits_end]
            .parse::<TicketKey>()
            .ok()
            .filter(|_| !followed_by_word)
            .and_then(|key| resolve(key).map(|label| (key, label)));

        match label {
            Some((key, label)) => {
                if plain_start < i {
                    events.push(Event::Text(CowStr::from(text[plain_start..i].to_string())));
                }
                events.push(Event::Html(CowStr::from(format!(
                    r##"<a class="ticket-ref" href="#ticket-{}" data-key="{}">{}</a>"##,
                    key,
                    key,
                    escape_html(&label)
                ))));
                plain_start = digits_end;
                i = digits_end;
            }
            None => i += 1,
        }
    }
    if plain_start < text.len() {
        events.push(Event::Text(CowStr::from(text[plain_start..].to_string())));
    }
    events
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(key: TicketKey) -> Option<String> {
        [3, 12].contains(&key).then(|| format!("#{:03}", key))
    }

    #[test]
    fn test_plain_markdown() {
        let html = render_with("Some **bold** text", known);
        assert_eq!(html.trim(), "<p>Some <strong>bold</strong> text</p>");
    }

    #[test]
    fn test_ticket_refs_become_links() {
        let html = render_with("Blocked by #3, see #12.", known);
        assert!(html.contains(r##"<a class="ticket-ref" href="#ticket-3" data-key="3">#003</a>"##));
        assert!(html.contains(r##"data-key="12">#012</a>."##));
        assert!(html.starts_with("<p>Blocked by "));
    }

    #[test]
    fn test_unknown_and_partial_refs_stay_text() {
        let html = render_with("#99 and a#3 and #3rd", known);
        assert!(!html.contains("ticket-ref"));
        assert!(html.contains("#99 and a#3 and #3rd"));
    }

    #[test]
    fn test_refs_inside_links_and_code_are_untouched() {
        let html = render_with("[see #3](http://x) and `#12`", known);
        assert!(!html.contains("ticket-ref"));
        assert!(html.contains("<code>#12</code>"));
    }

    #[test]
    fn test_headings_are_not_refs() {
        let html = render_with("# 3 things", known);
        assert!(html.contains("<h1>3 things</h1>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = render_with("hello <script>alert(1)</script>", known);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_script_urls_are_neutralized() {
        let html = render_with("[click](javascript:alert(document.cookie))", known);
        assert_eq!(html.trim(), r##"<p><a href="#">click</a></p>"##);

        let html = render_with("![x](JavaScript:alert(1)) [d](data:text/html,hi)", known);
        assert!(!html.to_lowercase().contains("javascript:"));
        assert!(!html.contains("data:"));
    }

    #[test]
    fn test_safe_urls_are_kept() {
        let html = render_with("[a](https://x.org/p?q=1) [b](mailto:me@x.org) [c](/t/3) [d](#top)", known);
        assert!(html.contains(r#"href="https://x.org/p?q=1""#));
        assert!(html.contains(r#"href="mailto:me@x.org""#));
        assert!(html.contains(r#"href="/t/3""#));
        assert!(html.contains(r##"href="#top""##));
    }

    #[test]
    fn test_fenced_code_is_highlighted() {
        let html = render_with("```rust\nfn main() {}\n```", known);
        assert!(html.contains("<pre"));
        assert!(html.contains("main"));
        assert!(!html.contains("<code class=\"language-rust\">"));
    }

    #[test]
    fn test_render_description_uses_store() {
        let store = crate::tickets::tests::store_of(vec![crate::tickets::tests::ticket(12, None, 3, 0.0)]);
        let html = render_description("dup of #12", &store);
        assert!(html.contains(">#12</a>"));
    }
}
