//! Body rewriting: resolved references become links, the rest plain text.

use crate::config::LinkStyle;
use crate::registry::Registry;
use crate::types::{ContentUnit, Reference, ResolutionState, SyntaxKind, UnitKind};

/// Final link target of a unit, relative to the site root.
///
/// Manual pages keep their path with the page extension swapped in; API
/// members live under the API prefix, one page per uid.
pub fn href_for(unit: &ContentUnit, links: &LinkStyle) -> String {
    return match unit.kind {
        UnitKind::ManualPage => {
            let stem = unit
                .source_path
                .strip_suffix(".md")
                .or_else(|| return unit.source_path.strip_suffix(".markdown"))
                .unwrap_or(&unit.source_path);
            format!("{stem}.{}", links.page_extension)
        },
        UnitKind::GeneratedApiMember => {
            format!("{}{}.{}", links.api_prefix, file_safe_uid(&unit.uid), links.page_extension)
        },
    };
}

/// Replace every reference in `unit`'s body with its rendered form.
///
/// `references` must be the unit's own references in offset order, as
/// produced by the resolver. Text between references is copied unchanged.
pub fn rewrite_body(
    unit: &ContentUnit,
    references: &[Reference],
    registry: &Registry,
    links: &LinkStyle,
) -> String {
    let body = unit.raw_body.as_str();
    let mut out = String::with_capacity(body.len());
    let mut cursor = 0usize;

    for reference in references {
        let start = reference.location_offset;
        let end = reference.end_offset();
        let (Some(before), Some(original)) = (body.get(cursor..start), body.get(start..end)) else {
            continue;
        };
        out.push_str(before);
        out.push_str(&render_reference(reference, original, registry, links));
        cursor = end;
    }

    out.push_str(body.get(cursor..).unwrap_or(""));
    return out;
}

/// Minimal HTML escaping for text placed inside a tag.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    return out;
}

/// Link text of a `[text](xref:Token)` match.
fn markdown_link_text(original: &str) -> &str {
    let inner = original.strip_prefix('[').unwrap_or(original);
    return inner.split_once("](").map_or("", |(text, _)| return text);
}

/// Replace characters that are awkward in file names with `_`.
fn file_safe_uid(uid: &str) -> String {
    return uid
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                return c;
            }
            return '_';
        })
        .collect();
}

/// Render one reference. `original` is the matched text, used when the
/// reference was never resolved.
fn render_reference(
    reference: &Reference,
    original: &str,
    registry: &Registry,
    links: &LinkStyle,
) -> String {
    let class = format!("xref-{}", reference.resolution_state.label());
    let authored_text = (reference.syntax == SyntaxKind::MarkdownLink)
        .then(|| return markdown_link_text(original))
        .filter(|text| return !text.trim().is_empty());
    let token = escape_html(authored_text.unwrap_or(reference.target_token.as_str()));

    return match &reference.resolution_state {
        ResolutionState::Resolved(uid) => {
            let Some(target) = registry.get(uid) else {
                return format!("<span class=\"xref-missing\">{token}</span>");
            };
            let href = href_for(target, links);
            if reference.syntax == SyntaxKind::InlineCode {
                return format!("[`{}`]({href})", reference.target_token);
            }
            let text = match authored_text {
                Some(text) => text,
                None if target.title.trim().is_empty() => target.uid.as_str(),
                None => target.title.as_str(),
            };
            format!("[{text}]({href})")
        },
        ResolutionState::Ambiguous(_) | ResolutionState::Missing => {
            if reference.syntax == SyntaxKind::InlineCode {
                return format!("<code class=\"{class}\">{token}</code>");
            }
            format!("<span class=\"{class}\">{token}</span>")
        },
        ResolutionState::Unresolved => original.to_string(),
    };
}
