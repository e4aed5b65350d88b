// Chatbot history domain model and reply formatting
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const TITLE_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatEntry {
    pub id: u64,
    #[serde(skip)]
    pub user_id: i64,
    pub title: Option<String>,
    pub user_input: String,
    pub bot_response: String,
    pub timestamp: DateTime<Utc>,
}

/// A chat exchange that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewChat {
    pub user_id: i64,
    pub title: String,
    pub user_input: String,
    pub bot_response: String,
}

/// Render a generated reply as light HTML: emphasis markers removed, a
/// `Label:` starting any line made bold, and a paragraph break after every
/// sentence.
pub fn format_response(text: &str) -> String {
    break_sentences(&bold_labels(&strip_emphasis(text)))
}

/// Strip emphasis markers and surrounding whitespace, then cap the length.
pub fn sanitize_title(title: &str) -> String {
    let cleaned = strip_emphasis(title).trim().to_string();
    if cleaned.chars().count() > TITLE_MAX_CHARS {
        let head: String = cleaned.chars().take(TITLE_MAX_CHARS).collect();
        format!("{head}...")
    } else {
        cleaned
    }
}

fn strip_emphasis(text: &str) -> String {
    text.chars().filter(|c| *c != '*' && *c != '_').collect()
}

/// A label is a run of letters and whitespace starting at a line start and
/// ending in a colon. Whitespace includes newlines, so a label may span lines.
fn bold_labels(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut at_line_start = true;

    while let Some(c) = rest.chars().next() {
        if at_line_start {
            let run = rest
                .find(|ch: char| !(ch.is_ascii_alphabetic() || ch.is_whitespace()))
                .unwrap_or(rest.len());
            if run > 0 && rest[run..].starts_with(':') {
                out.push_str("<b>");
                out.push_str(&rest[..=run]);
                out.push_str("</b><br><br>");
                rest = &rest[run + 1..];
                at_line_start = false;
                continue;
            }
        }
        out.push(c);
        at_line_start = c == '\n';
        rest = &rest[c.len_utf8()..];
    }

    out
}

fn break_sentences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        out.push(c);
        if c == '.' && chars.peek().is_some_and(|n| n.is_whitespace()) {
            while chars.peek().is_some_and(|n| n.is_whitespace()) {
                chars.next();
            }
            out.push_str("<br><br>");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_response_sentences() {
        assert_eq!(
            format_response("Wear a *mask*. Stay inside.  Done"),
            "Wear a mask.<br><br>Stay inside.<br><br>Done"
        );
    }

    #[test]
    fn test_format_response_bold_label() {
        assert_eq!(
            format_response("Tips: drink water"),
            "<b>Tips:</b><br><br> drink water"
        );
        assert_eq!(
            format_response("Hi 5\nHealth Advice: rest"),
            "Hi 5\n<b>Health Advice:</b><br><br> rest"
        );
    }

    #[test]
    fn test_format_response_label_spans_lines() {
        assert_eq!(
            format_response("Intro\nHealth Advice: rest"),
            "<b>Intro\nHealth Advice:</b><br><br> rest"
        );
    }

    #[test]
    fn test_format_response_ignores_non_label_colon() {
        assert_eq!(format_response("At 5:30 go out"), "At 5:30 go out");
    }

    #[test]
    fn test_format_response_trailing_period_untouched() {
        assert_eq!(format_response("The end."), "The end.");
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("  **Air** _quality_ chat "), "Air quality chat");

        let long = "a".repeat(150);
        let title = sanitize_title(&long);
        assert_eq!(title.len(), TITLE_MAX_CHARS + 3);
        assert!(title.ends_with("..."));
    }
}
