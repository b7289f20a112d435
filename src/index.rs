//! Lookup table from uids and short-name aliases to the units they name.

use std::collections::{BTreeMap, BTreeSet};

/// Maximum number of "did you mean" suggestions offered for a missing token.
const MAX_SUGGESTIONS: usize = 3;

/// Derived from a registry snapshot once per build, read-only afterwards.
///
/// Every uid is an exact key and is also reachable by its whitespace-free
/// spelling. Generated API members are also reachable through
/// their dotted suffixes; an alias shared by several members keeps all of them
/// so the resolver can report the candidates, but it never resolves uniquely.
#[derive(Debug, Default)]
pub struct ResolutionIndex {
    /// Normalized alias to every uid that produced it.
    aliases: BTreeMap<String, BTreeSet<String>>,
    /// Whitespace-free spelling of every uid to the uids that have it.
    normalized_uids: BTreeMap<String, BTreeSet<String>>,
    /// Every registered uid.
    uids: BTreeSet<String>,
}

impl ResolutionIndex {
    /// Record `uid` under every alias in `aliases`.
    pub(crate) fn insert_aliases(&mut self, uid: &str, aliases: Vec<String>) {
        for alias in aliases {
            self.aliases.entry(alias).or_default().insert(uid.to_string());
        }
    }

    /// Record an exact uid key.
    pub(crate) fn insert_uid(&mut self, uid: &str) {
        self.normalized_uids.entry(normalize_token(uid)).or_default().insert(uid.to_string());
        self.uids.insert(uid.to_string());
    }

    /// All uids an alias could mean, or `None` if the alias is unknown.
    pub fn alias_candidates(&self, alias: &str) -> Option<&BTreeSet<String>> {
        return self.aliases.get(alias);
    }

    /// Aliases that map to more than one uid, with their candidates.
    pub fn colliding_aliases(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        return self
            .aliases
            .iter()
            .filter(|(_, uids)| return uids.len() > 1)
            .map(|(alias, uids)| return (alias.as_str(), uids));
    }

    /// Whether `uid` is registered.
    pub fn contains_uid(&self, uid: &str) -> bool {
        return self.uids.contains(uid);
    }

    /// Uids whose whitespace-free spelling equals `normalized`.
    pub fn normalized_uid_candidates(&self, normalized: &str) -> Option<&BTreeSet<String>> {
        return self.normalized_uids.get(normalized);
    }

    /// Up to three uids whose uid or alias equals `token` ignoring case.
    pub fn suggest(&self, token: &str) -> Vec<String> {
        let wanted = normalize_token(token).to_lowercase();
        let mut found: BTreeSet<String> = self
            .uids
            .iter()
            .filter(|uid| return uid.to_lowercase() == wanted)
            .cloned()
            .collect();

        for (alias, uids) in &self.aliases {
            if alias.to_lowercase() == wanted {
                found.extend(uids.iter().cloned());
            }
        }

        return found.into_iter().take(MAX_SUGGESTIONS).collect();
    }

    /// The single uid an alias stands for, if it is not shared.
    pub fn unique_alias(&self, alias: &str) -> Option<&str> {
        let uids = self.aliases.get(alias)?;
        if uids.len() != 1 {
            return None;
        }
        return uids.first().map(String::as_str);
    }

    /// Number of exact uid keys.
    pub fn uid_count(&self) -> usize {
        return self.uids.len();
    }
}

/// Every short-name alias of a fully-qualified member uid.
///
/// `A.B.Get(System.String)` yields `B.Get(System.String)`, `Get(System.String)`,
/// plus the parameter-less `A.B.Get`, `B.Get` and `Get`. Dots inside the
/// parameter list never split.
pub fn member_aliases(uid: &str) -> Vec<String> {
    let normalized = normalize_token(uid);
    let segments = split_top_level_segments(&normalized);
    let mut aliases = dotted_suffixes(&segments);

    let Some(last) = segments.last() else {
        return aliases;
    };
    if let Some(paren) = last.find('(') {
        let bare_last = last.get(..paren).unwrap_or(last);
        let mut bare: Vec<&str> = segments.clone();
        bare.pop();
        bare.push(bare_last);
        if !bare_last.is_empty() {
            aliases.push(bare.join("."));
            aliases.extend(dotted_suffixes(&bare));
        }
    }

    aliases.retain(|a| return !a.is_empty() && *a != normalized);
    aliases.sort();
    aliases.dedup();
    return aliases;
}

/// Strip surrounding whitespace and any whitespace inside the token, so
/// `Get(System.String, System.Int32)` and `Get(System.String,System.Int32)` meet.
pub fn normalize_token(token: &str) -> String {
    return token.chars().filter(|c| return !c.is_whitespace()).collect();
}

/// Proper suffixes of a segment list, joined with dots, shortest last.
fn dotted_suffixes(segments: &[&str]) -> Vec<String> {
    return (1..segments.len())
        .filter_map(|start| return segments.get(start..))
        .map(|tail| return tail.join("."))
        .collect();
}

/// Split on dots that sit outside parentheses, brackets and angle brackets.
fn split_top_level_segments(uid: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0u32;
    let mut start = 0usize;

    for (i, c) in uid.char_indices() {
        match c {
            '(' | '[' | '<' | '{' => depth = depth.saturating_add(1),
            ')' | ']' | '>' | '}' => depth = depth.saturating_sub(1),
            '.' if depth == 0 => {
                if let Some(segment) = uid.get(start..i) {
                    segments.push(segment);
                }
                start = i.saturating_add(1);
            },
            _ => {},
        }
    }
    if let Some(segment) = uid.get(start..) {
        segments.push(segment);
    }
    return segments;
}
