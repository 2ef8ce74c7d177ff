//! Text shown to the user: status messages and rendered responses.

use crate::models::AnswerResponse;

pub const INGESTING: &str = "Ingesting...";
pub const THINKING: &str = "Thinking...";
pub const LOADING: &str = "Loading...";
pub const NO_SITES: &str = "No sites ingested.";
pub const TOKENS_PLACEHOLDER: &str = "Tokens used: - | Total: -";

pub const LABEL_VIEW_SITES: &str = "View sites";
pub const LABEL_BACK: &str = "Back";

/// Splits typed text into candidate URLs.
///
/// Pieces are separated by runs of newlines, trimmed, and dropped when empty.
/// Order and duplicates are kept as typed.
pub fn parse_urls(raw: &str) -> Vec<String> {
    raw.split('\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn format_tokens(tokens: Option<u64>, total: Option<u64>) -> String {
    let show = |n: Option<u64>| n.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string());
    format!("Tokens used: {} | Total: {}", show(tokens), show(total))
}

/// The answer text followed by a numbered `Sources:` section when any sources came back.
pub fn compose_answer(resp: &AnswerResponse) -> String {
    let mut out = resp.answer.clone();
    if let Some(sources) = resp.sources.as_deref().filter(|s| !s.is_empty()) {
        out.push_str("\n\nSources:\n");
        for (i, source) in sources.iter().enumerate() {
            out.push_str(&format!("[{}] {}\n", i + 1, source));
        }
    }
    out
}

pub fn format_sites_count(n: usize) -> String {
    format!("Sites: {}", n)
}

pub fn sites_status(n: usize) -> &'static str {
    if n == 0 {
        NO_SITES
    } else {
        ""
    }
}

/// Label for the toggle control: the action it would perform next.
pub fn toggle_label(sites_view: bool) -> &'static str {
    if sites_view {
        LABEL_BACK
    } else {
        LABEL_VIEW_SITES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_urls_collapses_blank_lines_and_trims() {
        assert_eq!(parse_urls("a.com\n\n b.com \n"), vec!["a.com", "b.com"]);
    }

    #[test]
    fn test_parse_urls_keeps_order_and_duplicates() {
        assert_eq!(
            parse_urls("b.com\na.com\nb.com"),
            vec!["b.com", "a.com", "b.com"]
        );
    }

    #[test]
    fn test_parse_urls_empty_and_whitespace_only() {
        assert!(parse_urls("").is_empty());
        assert!(parse_urls("\n\n   \n\t\n").is_empty());
    }

    #[test]
    fn test_parse_urls_does_not_split_on_spaces() {
        assert_eq!(parse_urls("  a.com b.com  "), vec!["a.com b.com"]);
    }

    #[test]
    fn test_parse_urls_crlf() {
        assert_eq!(parse_urls("a.com\r\nb.com\r\n"), vec!["a.com", "b.com"]);
    }

    #[test]
    fn test_compose_answer_with_sources() {
        let resp = AnswerResponse {
            answer: "X".into(),
            tokens: Some(5),
            tokens_used_total: Some(50),
            session_id: None,
            sources: Some(vec!["http://a".into(), "http://b".into()]),
        };
        assert_eq!(
            compose_answer(&resp),
            "X\n\nSources:\n[1] http://a\n[2] http://b\n"
        );
        assert_eq!(
            format_tokens(resp.tokens, resp.tokens_used_total),
            "Tokens used: 5 | Total: 50"
        );
    }

    #[test]
    fn test_compose_answer_without_sources() {
        let mut resp = AnswerResponse {
            answer: "only text".into(),
            ..Default::default()
        };
        assert_eq!(compose_answer(&resp), "only text");
        resp.sources = Some(Vec::new());
        assert_eq!(compose_answer(&resp), "only text");
    }

    #[test]
    fn test_format_tokens_missing_values() {
        assert_eq!(format_tokens(None, None), TOKENS_PLACEHOLDER);
        assert_eq!(format_tokens(Some(3), None), "Tokens used: 3 | Total: -");
    }

    #[test]
    fn test_sites_count_and_status() {
        assert_eq!(format_sites_count(0), "Sites: 0");
        assert_eq!(sites_status(0), "No sites ingested.");
        assert_eq!(format_sites_count(2), "Sites: 2");
        assert_eq!(sites_status(2), "");
    }

    #[test]
    fn test_toggle_label() {
        assert_eq!(toggle_label(false), "View sites");
        assert_eq!(toggle_label(true), "Back");
    }
}
