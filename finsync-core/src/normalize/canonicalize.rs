/// Canonical form of a column name: the only mechanism used to match source
/// names against destination columns.
///
/// Trims, replaces spaces with `_`, strips commas, replaces `&` with `and`,
/// then lowercases.
pub fn canonical_name(name: &str) -> String {
    name.trim()
        .replace(' ', "_")
        .replace(',', "")
        .replace('&', "and")
        .to_lowercase()
}
