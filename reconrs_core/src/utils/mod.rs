//! Small helpers shared across modules

/// Concatenate lists, dropping identifiers already seen while keeping first-seen order
pub(crate) fn union_preserving_order<'a, I>(lists: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut union: Vec<String> = Vec::new();
    for list in lists {
        for item in list {
            if !union.contains(item) {
                union.push(item.clone());
            }
        }
    }
    union
}

/// Split a list valued field on `separator`, dropping empty entries
pub(crate) fn split_list(value: &str, separator: &str) -> Vec<String> {
    value
        .split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
