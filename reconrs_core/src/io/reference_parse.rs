//! Parse `;` separated annotation strings into external identifiers of one category

use crate::utils::union_preserving_order;

const REFERENCE_SEPARATOR: char = ';';

/// Extract the identifiers of one category from an annotation string
///
/// Every entry containing `key` is kept, with all occurrences of `key` removed. This is a
/// contains-match, so `key` does not need to be at the start of an entry.
///
/// # Examples
/// ```rust
/// use reconrs_core::io::reference_parse::parse_references;
/// let ids = parse_references("chebi:15377;kegg:C00001;chebi:1234", "chebi:");
/// assert_eq!(ids, vec!["15377", "1234"]);
/// ```
pub fn parse_references(source: &str, key: &str) -> Vec<String> {
    if source.trim().is_empty() {
        return Vec::new();
    }
    source
        .split(REFERENCE_SEPARATOR)
        .filter(|entry| entry.contains(key))
        .map(|entry| entry.replace(key, ""))
        .collect()
}

/// Union of [`parse_references`] over several annotation fields
///
/// Identifiers keep the order of first appearance, fields are visited in the order given.
pub fn collect_references(sources: &[&str], key: &str) -> Vec<String> {
    let parsed: Vec<Vec<String>> = sources
        .iter()
        .map(|source| parse_references(source, key))
        .collect();
    union_preserving_order(parsed.iter().map(Vec::as_slice))
}
