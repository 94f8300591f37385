use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Shown in place of a release note when no rule matched.
pub const NOT_FOUND_MESSAGE: &str = "No release note found in expected format";

/// Outcome of looking for a release note in a PR description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    /// Trimmed, non-empty release note text
    Found(String),
    NotFound,
}

impl ExtractionResult {
    pub fn is_found(&self) -> bool {
        matches!(self, ExtractionResult::Found(_))
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ExtractionResult::Found(text) => Some(text),
            ExtractionResult::NotFound => None,
        }
    }
}

impl fmt::Display for ExtractionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionResult::Found(text) => write!(f, "{text}"),
            ExtractionResult::NotFound => write!(f, "{NOT_FOUND_MESSAGE}"),
        }
    }
}

/// One way PR authors write release notes. Group 1 of `pattern` is the note.
struct Rule {
    name: &'static str,
    pattern: Regex,
}

impl Rule {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("Failed to compile release note pattern"),
        }
    }

    /// `None` when the rule does not match; `Some(None)` when it matches but
    /// the captured text is blank.
    fn apply(&self, body: &str) -> Option<Option<String>> {
        let captures = self.pattern.captures(body)?;
        let text = captures.get(1).map_or("", |m| m.as_str()).trim();
        Some((!text.is_empty()).then(|| text.to_string()))
    }
}

// Most structured convention first, free-text heuristics last.
// A blank line is `\r?\n[ \t]*\r?\n`; `\z` is the end of the body.
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new("fenced", r"(?s)```release-note\n(.*?)\n```"),
        Rule::new("fenced-loose", r"(?s)```[ \t]*release-note\s*\n(.*?)\n\s*```"),
        Rule::new(
            "heading",
            r"(?s)###[ \t]*Release Note[ \t]*\r?\n(.*?)(?:\n###(?:[^#]|\z)|\z)",
        ),
        Rule::new(
            "inline",
            r"(?s)release-note:\s*(.*?)(?:\r?\n[ \t]*\r?\n|\z)",
        ),
        Rule::new(
            "mention",
            r"(?is)(?:release notes?|release changes?)[:\s]+(.*?)(?:\r?\n[ \t]*\r?\n|\z)",
        ),
    ]
});

/// Find the release note in a PR body.
///
/// Rules are tried in priority order and the first one that matches decides
/// the result. A match whose text is blank, an empty body, or a body no rule
/// matches is `NotFound`.
pub fn extract(body: &str) -> ExtractionResult {
    match extract_with_rule(body) {
        Some((rule, Some(text))) => {
            debug!(rule, chars = text.len(), "release note matched");
            ExtractionResult::Found(text)
        }
        Some((rule, None)) => {
            debug!(rule, "release note matched but is blank");
            ExtractionResult::NotFound
        }
        None => ExtractionResult::NotFound,
    }
}

/// The first matching rule and its trimmed text, if any.
fn extract_with_rule(body: &str) -> Option<(&'static str, Option<String>)> {
    if body.trim().is_empty() {
        return None;
    }
    RULES
        .iter()
        .find_map(|rule| rule.apply(body).map(|text| (rule.name, text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_for(body: &str) -> Option<&'static str> {
        extract_with_rule(body).map(|(rule, _)| rule)
    }

    #[test]
    fn test_fenced_block() {
        let body = "```release-note\nFixed login crash\n```\n\nSome other text";
        assert_eq!(extract(body), ExtractionResult::Found("Fixed login crash".to_string()));
        assert_eq!(rule_for(body), Some("fenced"));
    }

    #[test]
    fn test_fenced_block_keeps_internal_newlines() {
        let body = "Intro\n\n```release-note\n  Line one\nLine two  \n```";
        assert_eq!(extract(body).text(), Some("Line one\nLine two"));
    }

    #[test]
    fn test_fenced_block_with_loose_whitespace() {
        let body = "``` release-note \nSupport HTTP proxies\n   ```";
        assert_eq!(extract(body).text(), Some("Support HTTP proxies"));
        assert_eq!(rule_for(body), Some("fenced-loose"));
    }

    #[test]
    fn test_fenced_block_with_crlf_line_endings() {
        let body = "```release-note\r\nFixed CRLF handling\r\n```\r\n";
        assert_eq!(extract(body).text(), Some("Fixed CRLF handling"));
    }

    #[test]
    fn test_heading_section_until_next_heading() {
        let body = "### Summary\nRefactor\n### Release Note\nAdded dark mode\n### Testing\nManual";
        assert_eq!(extract(body).text(), Some("Added dark mode"));
        assert_eq!(rule_for(body), Some("heading"));
    }

    #[test]
    fn test_heading_section_until_end_of_body() {
        let body = "#### Summary\nx\n\n###  Release Note  \n  Faster search\nacross channels\n";
        assert_eq!(extract(body).text(), Some("Faster search\nacross channels"));
    }

    #[test]
    fn test_heading_is_case_sensitive() {
        let body = "### RELEASE NOTE\nShouting";
        assert_eq!(rule_for(body), Some("mention"));
        assert_eq!(extract(body).text(), Some("Shouting"));
    }

    #[test]
    fn test_inline_prefix() {
        let body = "release-note: Improved startup time\n\nNext paragraph.";
        assert_eq!(extract(body), ExtractionResult::Found("Improved startup time".to_string()));
        assert_eq!(rule_for(body), Some("inline"));
    }

    #[test]
    fn test_inline_prefix_at_end_without_newline() {
        let body = "Summary\n\nrelease-note:   Removed legacy API";
        assert_eq!(extract(body).text(), Some("Removed legacy API"));
    }

    #[test]
    fn test_mention_is_case_insensitive() {
        let body = "This PR adds export.\n\nRelease Notes: Added export to CSV\nfor admins\n\nOther";
        assert_eq!(extract(body).text(), Some("Added export to CSV\nfor admins"));
        assert_eq!(rule_for(body), Some("mention"));
    }

    #[test]
    fn test_mention_release_changes() {
        let body = "release changes - none visible\n\nthanks";
        assert_eq!(extract(body).text(), Some("- none visible"));
    }

    #[test]
    fn test_earlier_rule_wins() {
        let body = "Release notes: see below\n\n```release-note\nFixed login crash\n```";
        assert_eq!(extract(body).text(), Some("Fixed login crash"));
        assert_eq!(rule_for(body), Some("fenced"));
    }

    #[test]
    fn test_blank_fenced_block_stops_the_cascade() {
        let body = "```release-note\n\n```\n\nRelease notes were reviewed by QA.\n\n";
        assert_eq!(rule_for(body), Some("fenced"));
        assert_eq!(extract(body), ExtractionResult::NotFound);

        let body = "```release-note\n\n```\nrelease-note: Fallback text";
        assert_eq!(extract(body), ExtractionResult::NotFound);
    }

    #[test]
    fn test_heading_section_runs_past_deeper_headings() {
        let body = "### Release Note\nA\n#### Detail\nB\n### Testing\nManual";
        assert_eq!(extract(body).text(), Some("A\n#### Detail\nB"));
    }

    #[test]
    fn test_heading_section_with_crlf_line_endings() {
        let body = "### Release Note\r\nAdded dark mode\r\n### Testing\r\nManual";
        assert_eq!(rule_for(body), Some("heading"));
        assert_eq!(extract(body).text(), Some("Added dark mode"));
    }

    #[test]
    fn test_inline_prefix_ends_at_crlf_blank_line() {
        let body = "release-note: Faster sync\r\nacross devices\r\n\r\nDetails follow.";
        assert_eq!(rule_for(body), Some("inline"));
        assert_eq!(extract(body).text(), Some("Faster sync\r\nacross devices"));
    }

    #[test]
    fn test_mention_ends_at_whitespace_only_line() {
        let body = "Release note: Added SSO\n  \nUnrelated paragraph";
        assert_eq!(rule_for(body), Some("mention"));
        assert_eq!(extract(body).text(), Some("Added SSO"));
    }

    #[test]
    fn test_not_found() {
        assert_eq!(extract(""), ExtractionResult::NotFound);
        assert_eq!(extract("   \n  "), ExtractionResult::NotFound);
        assert_eq!(
            extract("Just a refactor.\n\nNo user-facing changes."),
            ExtractionResult::NotFound
        );
    }

    #[test]
    fn test_found_text_is_trim_stable() {
        let bodies = [
            "```release-note\n\t padded \n```",
            "### Release Note\n  heading note \n",
            "release-note:  inline  \n\n",
        ];
        for body in bodies {
            let text = extract(body).text().map(str::to_string).unwrap();
            assert!(!text.is_empty());
            assert_eq!(text.trim(), text);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(ExtractionResult::Found("Note".to_string()).to_string(), "Note");
        assert_eq!(ExtractionResult::NotFound.to_string(), NOT_FOUND_MESSAGE);
        assert!(!ExtractionResult::NotFound.is_found());
    }
}
