//! Lexical extraction of cross-references from content unit bodies.

use std::ops::Range;

use regex::Regex;

use crate::error::Error;
use crate::types::{ContentUnit, Reference, ResolutionState, SyntaxKind};

/// Inline code counts as a reference when it looks like `Namespace.Type` or
/// `Namespace.Type.Member(Args)`.
pub const DEFAULT_INFORMAL_PATTERN: &str =
    r"[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_`]*)+(?:\([^()]*\))?";

/// Characters stripped from the end of bare tokens such as `xref:guides.`
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// A candidate match before overlap removal.
struct Candidate {
    /// Byte range of the whole match in the body.
    span: Range<usize>,
    /// Syntax that produced the match.
    syntax: SyntaxKind,
    /// Token without delimiters.
    token: String,
}

/// Compiled reference patterns. Build once per run and reuse for every unit.
pub struct Scanner {
    /// `<xref:Token>`
    angle_xref: Regex,
    /// `@Token` preceded by start, whitespace, `(` or `[`.
    at_bare: Regex,
    /// `@"Token"` or `@'Token'`.
    at_quoted: Regex,
    /// Fence opener or closer line.
    fence: Regex,
    /// Anchored informal pattern; `None` disables inline-code references.
    informal: Option<Regex>,
    /// `` `content` ``
    inline_code: Regex,
    /// `[text](xref:Token)`; the token may end in one parameter list.
    markdown_link: Regex,
    /// `xref:Token`
    plain_xref: Regex,
}

impl Scanner {
    /// Scan a unit's body and return its references in offset order, all
    /// `Unresolved`. Purely lexical: nothing is checked against the registry.
    pub fn extract_references(&self, unit: &ContentUnit) -> Vec<Reference> {
        let body = unit.raw_body.as_str();
        let fenced = self.fenced_ranges(body);
        let code_spans: Vec<Range<usize>> =
            self.inline_code.find_iter(body).map(|m| return m.range()).collect();
        let mut candidates = Vec::new();

        self.collect_markdown_links(body, &mut candidates);
        self.collect_angle_xrefs(body, &mut candidates);
        self.collect_plain_xrefs(body, &mut candidates);
        self.collect_at_mentions(body, &mut candidates);
        self.collect_inline_code(body, &mut candidates);

        candidates.retain(|c| return !fenced.iter().any(|f| return f.contains(&c.span.start)));
        // Code spans are opaque unless the whole span is itself a reference.
        candidates.retain(|c| {
            return c.syntax == SyntaxKind::InlineCode
                || !code_spans.iter().any(|s| return s.contains(&c.span.start));
        });
        return keep_non_overlapping(candidates);
    }

    /// Compile the built-in patterns plus the informal inline-code pattern.
    /// An empty `informal_pattern` turns inline-code references off.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` if `informal_pattern` is not a valid regex.
    pub fn new(informal_pattern: &str) -> Result<Self, Error> {
        let informal = if informal_pattern.trim().is_empty() {
            None
        } else {
            Some(Regex::new(&format!("^(?:{informal_pattern})$"))?)
        };

        return Ok(Self {
            angle_xref: Regex::new(r"<xref:([^>\s]+)>")?,
            at_bare: Regex::new(r#"(?:^|[\s(\[])(@)([A-Za-z_][^\s<>"'`]*)"#)?,
            at_quoted: Regex::new(r#"@(?:"([^"\n]+)"|'([^'\n]+)')"#)?,
            fence: Regex::new(r"(?m)^[ ]{0,3}(```|~~~)")?,
            inline_code: Regex::new(r"`([^`\n]+)`")?,
            informal,
            markdown_link: Regex::new(r"\[[^\]\n]*\]\(xref:([^()\s]+(?:\([^()\n]*\))?)\)")?,
            plain_xref: Regex::new(r#"xref:([^\s<>"'`]+)"#)?,
        });
    }

    /// `<xref:Token>` matches.
    fn collect_angle_xrefs(&self, body: &str, out: &mut Vec<Candidate>) {
        for cap in self.angle_xref.captures_iter(body) {
            let (Some(whole), Some(token)) = (cap.get(0), cap.get(1)) else {
                continue;
            };
            out.push(Candidate {
                span: whole.range(),
                syntax: SyntaxKind::AngleXref,
                token: token.as_str().to_string(),
            });
        }
    }

    /// `@"Token"`, `@'Token'` and bare `@Token` matches.
    fn collect_at_mentions(&self, body: &str, out: &mut Vec<Candidate>) {
        for cap in self.at_quoted.captures_iter(body) {
            let Some(whole) = cap.get(0) else {
                continue;
            };
            let Some(token) = cap.get(1).or_else(|| return cap.get(2)) else {
                continue;
            };
            out.push(Candidate {
                span: whole.range(),
                syntax: SyntaxKind::AtMention,
                token: token.as_str().trim().to_string(),
            });
        }

        for cap in self.at_bare.captures_iter(body) {
            let (Some(at), Some(token)) = (cap.get(1), cap.get(2)) else {
                continue;
            };
            let trimmed = trim_token_end(token.as_str());
            if trimmed.is_empty() {
                continue;
            }
            out.push(Candidate {
                span: at.start()..token.start().saturating_add(trimmed.len()),
                syntax: SyntaxKind::AtMention,
                token: trimmed.to_string(),
            });
        }
    }

    /// Inline code spans whose whole content matches the informal pattern.
    fn collect_inline_code(&self, body: &str, out: &mut Vec<Candidate>) {
        let Some(informal) = &self.informal else {
            return;
        };
        for cap in self.inline_code.captures_iter(body) {
            let (Some(whole), Some(content)) = (cap.get(0), cap.get(1)) else {
                continue;
            };
            let token = content.as_str().trim();
            if !informal.is_match(token) {
                continue;
            }
            out.push(Candidate {
                span: whole.range(),
                syntax: SyntaxKind::InlineCode,
                token: token.to_string(),
            });
        }
    }

    /// `[text](xref:Token)` matches. The whole link is the span so rewriting
    /// replaces only its target.
    fn collect_markdown_links(&self, body: &str, out: &mut Vec<Candidate>) {
        for cap in self.markdown_link.captures_iter(body) {
            let (Some(whole), Some(token)) = (cap.get(0), cap.get(1)) else {
                continue;
            };
            out.push(Candidate {
                span: whole.range(),
                syntax: SyntaxKind::MarkdownLink,
                token: token.as_str().to_string(),
            });
        }
    }

    /// `xref:Token` matches with trailing sentence punctuation removed.
    fn collect_plain_xrefs(&self, body: &str, out: &mut Vec<Candidate>) {
        for cap in self.plain_xref.captures_iter(body) {
            let (Some(whole), Some(token)) = (cap.get(0), cap.get(1)) else {
                continue;
            };
            let trimmed = trim_token_end(token.as_str());
            if trimmed.is_empty() {
                continue;
            }
            out.push(Candidate {
                span: whole.start()..token.start().saturating_add(trimmed.len()),
                syntax: SyntaxKind::Xref,
                token: trimmed.to_string(),
            });
        }
    }

    /// Byte ranges covered by fenced code blocks. An unclosed fence runs to
    /// the end of the body.
    fn fenced_ranges(&self, body: &str) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut open: Option<(usize, &str)> = None;

        for cap in self.fence.captures_iter(body) {
            let (Some(whole), Some(marker)) = (cap.get(0), cap.get(1)) else {
                continue;
            };
            match open {
                None => open = Some((whole.start(), marker.as_str())),
                Some((start, opener)) if opener == marker.as_str() => {
                    let line_end = body
                        .get(whole.end()..)
                        .and_then(|rest| return rest.find('\n'))
                        .map_or(body.len(), |n| return whole.end().saturating_add(n));
                    ranges.push(start..line_end);
                    open = None;
                },
                Some(_) => {},
            }
        }

        if let Some((start, _)) = open {
            ranges.push(start..body.len());
        }
        return ranges;
    }
}

/// Sort by offset and drop matches that start inside an earlier one.
/// At equal offsets the longer match wins.
fn keep_non_overlapping(mut candidates: Vec<Candidate>) -> Vec<Reference> {
    candidates.sort_by(|a, b| {
        return a
            .span
            .start
            .cmp(&b.span.start)
            .then_with(|| return b.span.end.cmp(&a.span.end));
    });

    let mut references: Vec<Reference> = Vec::with_capacity(candidates.len());
    let mut covered_until = 0usize;
    for candidate in candidates {
        if !references.is_empty() && candidate.span.start < covered_until {
            continue;
        }
        covered_until = candidate.span.end;
        references.push(Reference {
            location_offset: candidate.span.start,
            resolution_state: ResolutionState::Unresolved,
            span_len: candidate.span.len(),
            syntax: candidate.syntax,
            target_token: candidate.token,
        });
    }
    return references;
}

/// Drop trailing sentence punctuation and closing parentheses that have no
/// opener inside the token.
fn trim_token_end(token: &str) -> &str {
    let mut trimmed = token;
    loop {
        let before = trimmed.len();
        trimmed = trimmed.trim_end_matches(TRAILING_PUNCTUATION);
        if trimmed.ends_with(')') && trimmed.matches(')').count() > trimmed.matches('(').count() {
            trimmed = trimmed.get(..trimmed.len().saturating_sub(1)).unwrap_or("");
        }
        if trimmed.len() == before {
            return trimmed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(body: &str) -> Vec<Reference> {
        let scanner = Scanner::new(DEFAULT_INFORMAL_PATTERN).unwrap();
        scanner.extract_references(&ContentUnit::manual_page("page", "Page", "page.md", body))
    }

    fn tokens(body: &str) -> Vec<(String, SyntaxKind)> {
        scan(body).into_iter().map(|r| (r.target_token, r.syntax)).collect()
    }

    #[test]
    fn plain_xref_with_sentence_punctuation() {
        let refs = scan("see xref:guides.");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].target_token, "guides");
        assert_eq!(refs[0].location_offset, 4);
        assert_eq!(refs[0].span_len, "xref:guides".len());
        assert_eq!(refs[0].resolution_state, ResolutionState::Unresolved);
    }

    #[test]
    fn angle_xref_is_one_reference() {
        let refs = scan("Use <xref:ReqRest.RestClient> here");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].syntax, SyntaxKind::AngleXref);
        assert_eq!(refs[0].target_token, "ReqRest.RestClient");
        assert_eq!(refs[0].span_len, "<xref:ReqRest.RestClient>".len());
    }

    #[test]
    fn at_mentions_quoted_and_bare() {
        assert_eq!(
            tokens(r#"@"ReqRest.RestClient" and (@getting_started)"#),
            vec![
                ("ReqRest.RestClient".to_string(), SyntaxKind::AtMention),
                ("getting_started".to_string(), SyntaxKind::AtMention),
            ]
        );
    }

    #[test]
    fn email_is_not_a_mention() {
        assert!(scan("mail admin@example.com").is_empty());
    }

    #[test]
    fn inline_code_needs_informal_pattern() {
        assert_eq!(
            tokens("call `ReqRest.RestClient.Get(System.String)` not `ls -la` or `foo`"),
            vec![("ReqRest.RestClient.Get(System.String)".to_string(), SyntaxKind::InlineCode)]
        );
    }

    #[test]
    fn empty_informal_pattern_disables_inline_code() {
        let scanner = Scanner::new("").unwrap();
        let unit = ContentUnit::manual_page("p", "P", "p.md", "`ReqRest.RestClient` xref:a");
        let refs = scanner.extract_references(&unit);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].syntax, SyntaxKind::Xref);
    }

    #[test]
    fn invalid_informal_pattern_is_an_error() {
        assert!(matches!(Scanner::new("(unclosed"), Err(Error::InvalidPattern(_))));
    }

    #[test]
    fn fenced_blocks_are_skipped() {
        let body = "xref:before\n```md\nxref:inside\n```\nxref:after\n";
        let names: Vec<String> = tokens(body).into_iter().map(|(t, _)| t).collect();
        assert_eq!(names, vec!["before", "after"]);
    }

    #[test]
    fn markdown_link_to_xref_is_one_reference() {
        let refs = scan("read [the guides](xref:guides) first");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].syntax, SyntaxKind::MarkdownLink);
        assert_eq!(refs[0].target_token, "guides");
        assert_eq!(refs[0].location_offset, 5);
        assert_eq!(refs[0].span_len, "[the guides](xref:guides)".len());
    }

    #[test]
    fn markdown_link_to_member_signature_keeps_the_parameter_list() {
        let body = "call [get](xref:A.B.Get(System.String, System.Int32)) now";
        let refs = scan(body);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].syntax, SyntaxKind::MarkdownLink);
        assert_eq!(refs[0].target_token, "A.B.Get(System.String, System.Int32)");
        assert_eq!(refs[0].end_offset(), body.len() - " now".len());
    }

    #[test]
    fn single_quoted_mention() {
        assert_eq!(
            tokens("see @'ReqRest.RestClient.Get(System.String)'."),
            vec![("ReqRest.RestClient.Get(System.String)".to_string(), SyntaxKind::AtMention)]
        );
    }

    #[test]
    fn enclosing_syntax_wins_over_inner_plain_xref() {
        assert_eq!(tokens("<xref:a>"), vec![("a".to_string(), SyntaxKind::AngleXref)]);
        assert_eq!(tokens("[t](xref:a)"), vec![("a".to_string(), SyntaxKind::MarkdownLink)]);
    }

    #[test]
    fn longer_match_wins_at_the_same_offset() {
        let candidates = vec![
            Candidate { span: 0..6, syntax: SyntaxKind::Xref, token: "a".to_string() },
            Candidate { span: 0..10, syntax: SyntaxKind::AngleXref, token: "abcd".to_string() },
            Candidate { span: 4..8, syntax: SyntaxKind::Xref, token: "inner".to_string() },
            Candidate { span: 12..14, syntax: SyntaxKind::Xref, token: "b".to_string() },
        ];
        let refs = keep_non_overlapping(candidates);
        let kept: Vec<&str> = refs.iter().map(|r| r.target_token.as_str()).collect();
        assert_eq!(kept, vec!["abcd", "b"]);
    }

    #[test]
    fn tilde_fences_are_skipped() {
        let body = "~~~\nxref:inside\n```\nxref:still_inside\n~~~\nxref:after\n";
        let names: Vec<String> = tokens(body).into_iter().map(|(t, _)| t).collect();
        assert_eq!(names, vec!["after"]);
    }

    #[test]
    fn unclosed_fence_runs_to_the_end() {
        let names: Vec<String> = tokens("xref:a\n```\nxref:b\n").into_iter().map(|(t, _)| t).collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn xref_inside_code_span_is_literal() {
        assert!(scan("write `xref:guides` to link").is_empty());
    }

    #[test]
    fn references_come_back_in_offset_order() {
        let refs = scan("`A.B` then xref:c then <xref:d>");
        let offsets: Vec<usize> = refs.iter().map(|r| r.location_offset).collect();
        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        assert_eq!(offsets, sorted);
        assert_eq!(refs.len(), 3);
    }

    #[test]
    fn unbalanced_paren_is_trimmed() {
        assert_eq!(trim_token_end("guides)"), "guides");
        assert_eq!(trim_token_end("Get(System.String)"), "Get(System.String)");
        assert_eq!(trim_token_end("Get(System.String))."), "Get(System.String)");
    }
}
