//! Reference resolution: classifies every extracted token against the index.

use crate::index::{self, ResolutionIndex};
use crate::registry::Registry;
use crate::scanner::Scanner;
use crate::types::{Reference, ResolutionState};

/// References of one unit, resolved, in `location_offset` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReferences {
    /// References found in the unit's body.
    pub references: Vec<Reference>,
    /// uid of the owning unit.
    pub uid: String,
}

/// Classify one reference against the index.
///
/// Lookup order: the token as an exact uid, the whitespace-normalized token
/// against the whitespace-normalized uids, then the normalized token as an alias. A shared alias yields
/// `Ambiguous` with every candidate; it never silently picks one.
pub fn resolve(mut reference: Reference, index: &ResolutionIndex) -> Reference {
    reference.resolution_state = classify_token(&reference.target_token, index);
    return reference;
}

/// Extract and resolve every reference of every unit.
///
/// Output follows registration order, then offset order within a unit, so
/// diagnostics come out the same on every run over the same input.
pub fn resolve_all(
    registry: &Registry,
    index: &ResolutionIndex,
    scanner: &Scanner,
) -> Vec<UnitReferences> {
    return registry
        .all_units()
        .map(|unit| {
            let references = scanner
                .extract_references(unit)
                .into_iter()
                .map(|reference| return resolve(reference, index))
                .collect();
            return UnitReferences { references, uid: unit.uid.clone() };
        })
        .collect();
}

/// Map a raw token to its resolution state.
pub fn classify_token(token: &str, index: &ResolutionIndex) -> ResolutionState {
    if index.contains_uid(token) {
        return ResolutionState::Resolved(token.to_string());
    }

    let normalized = index::normalize_token(token);
    match index.normalized_uid_candidates(&normalized) {
        Some(uids) if uids.len() == 1 => {
            if let Some(uid) = uids.first() {
                return ResolutionState::Resolved(uid.clone());
            }
        },
        Some(uids) if !uids.is_empty() => {
            return ResolutionState::Ambiguous(uids.iter().cloned().collect());
        },
        _ => {},
    }

    return match index.alias_candidates(&normalized) {
        None => ResolutionState::Missing,
        Some(uids) if uids.len() == 1 => index
            .unique_alias(&normalized)
            .map_or(ResolutionState::Missing, |uid| return ResolutionState::Resolved(uid.to_string())),
        Some(uids) => ResolutionState::Ambiguous(uids.iter().cloned().collect()),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::DEFAULT_INFORMAL_PATTERN;
    use crate::types::{ContentUnit, SyntaxKind};

    fn reference(token: &str) -> Reference {
        Reference {
            location_offset: 0,
            resolution_state: ResolutionState::Unresolved,
            span_len: token.len(),
            syntax: SyntaxKind::Xref,
            target_token: token.to_string(),
        }
    }

    fn registry_of(units: Vec<ContentUnit>) -> Registry {
        let mut registry = Registry::new();
        for unit in units {
            registry.register(unit).unwrap();
        }
        registry
    }

    #[test]
    fn exact_uid_always_resolves() {
        let registry = registry_of(vec![
            ContentUnit::manual_page("getting_started", "Getting Started", "getting_started.md", ""),
            ContentUnit::api_member("ReqRest.RestClient", "RestClient", ""),
            ContentUnit::api_member("Other.RestClient", "RestClient", ""),
        ]);
        let index = registry.build_index();

        for unit in registry.all_units() {
            let resolved = resolve(reference(&unit.uid), &index);
            assert_eq!(resolved.resolution_state, ResolutionState::Resolved(unit.uid.clone()));
        }
    }

    #[test]
    fn unique_alias_resolves() {
        let registry = registry_of(vec![ContentUnit::api_member("ReqRest.RestClient.Send", "Send", "")]);
        let index = registry.build_index();
        assert_eq!(
            resolve(reference("RestClient.Send"), &index).resolution_state,
            ResolutionState::Resolved("ReqRest.RestClient.Send".to_string())
        );
    }

    #[test]
    fn shared_alias_is_ambiguous() {
        let registry = registry_of(vec![
            ContentUnit::api_member("A.X.Foo", "Foo", ""),
            ContentUnit::api_member("B.Y.Foo", "Foo", ""),
        ]);
        let index = registry.build_index();
        assert_eq!(
            resolve(reference("Foo"), &index).resolution_state,
            ResolutionState::Ambiguous(vec!["A.X.Foo".to_string(), "B.Y.Foo".to_string()])
        );
    }

    #[test]
    fn overloads_are_ambiguous_without_signature() {
        let registry = registry_of(vec![
            ContentUnit::api_member("ReqRest.RestClient.Get(System.String)", "Get(String)", ""),
            ContentUnit::api_member("ReqRest.RestClient.Get(System.Uri)", "Get(Uri)", ""),
        ]);
        let index = registry.build_index();

        assert!(matches!(
            resolve(reference("RestClient.Get"), &index).resolution_state,
            ResolutionState::Ambiguous(ref c) if c.len() == 2
        ));
        assert_eq!(
            resolve(reference("Get(System.Uri)"), &index).resolution_state,
            ResolutionState::Resolved("ReqRest.RestClient.Get(System.Uri)".to_string())
        );
    }

    #[test]
    fn exact_uid_beats_alias() {
        let registry = registry_of(vec![
            ContentUnit::manual_page("Foo", "Foo page", "foo.md", ""),
            ContentUnit::api_member("A.X.Foo", "Foo", ""),
            ContentUnit::api_member("B.Y.Foo", "Foo", ""),
        ]);
        let index = registry.build_index();
        assert_eq!(
            resolve(reference("Foo"), &index).resolution_state,
            ResolutionState::Resolved("Foo".to_string())
        );
    }

    #[test]
    fn whitespace_is_ignored_in_both_directions() {
        let registry = registry_of(vec![
            ContentUnit::api_member("A.B.Get(System.String, System.Int32)", "Get", ""),
            ContentUnit::api_member("A.B.Put(System.String,System.Int32)", "Put", ""),
        ]);
        let index = registry.build_index();

        assert_eq!(
            resolve(reference("A.B.Get(System.String,System.Int32)"), &index).resolution_state,
            ResolutionState::Resolved("A.B.Get(System.String, System.Int32)".to_string())
        );
        assert_eq!(
            resolve(reference("A.B.Put(System.String, System.Int32)"), &index).resolution_state,
            ResolutionState::Resolved("A.B.Put(System.String,System.Int32)".to_string())
        );
    }

    #[test]
    fn unknown_token_is_missing() {
        let registry = registry_of(vec![ContentUnit::manual_page("a", "A", "a.md", "")]);
        let index = registry.build_index();
        assert_eq!(resolve(reference("missing_target"), &index).resolution_state, ResolutionState::Missing);
    }

    #[test]
    fn resolve_all_follows_registration_then_offset() {
        let registry = registry_of(vec![
            ContentUnit::manual_page("z", "Z", "z.md", "xref:a then xref:nowhere"),
            ContentUnit::manual_page("a", "A", "a.md", "xref:z"),
        ]);
        let index = registry.build_index();
        let scanner = Scanner::new(DEFAULT_INFORMAL_PATTERN).unwrap();

        let first = resolve_all(&registry, &index, &scanner);
        let second = resolve_all(&registry, &index, &scanner);
        assert_eq!(first, second);

        let order: Vec<(&str, &str)> = first
            .iter()
            .flat_map(|u| u.references.iter().map(move |r| (u.uid.as_str(), r.target_token.as_str())))
            .collect();
        assert_eq!(order, vec![("z", "a"), ("z", "nowhere"), ("a", "z")]);
        assert_eq!(first[0].references[1].resolution_state, ResolutionState::Missing);
    }
}
