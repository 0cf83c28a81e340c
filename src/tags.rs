use std::collections::HashSet;

/// Trims every tag, drops empties and collapses exact duplicates.
///
/// The first occurrence keeps its position so tags display in the order they
/// were entered. Matching is case-sensitive.
pub fn normalize_tags<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|tag| {
            let tag = tag.as_ref().trim();
            (!tag.is_empty() && seen.insert(tag.to_owned())).then(|| tag.to_owned())
        })
        .collect()
}

/// Splits a comma-joined cell such as `"A, B"` into normalized tags.
pub fn split_tag_cell(cell: &str) -> Vec<String> {
    normalize_tags(cell.split(','))
}
