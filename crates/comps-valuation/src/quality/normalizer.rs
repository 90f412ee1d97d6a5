pub(crate) fn street_tokens(value: &str) -> Vec<String> {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned
        .split_whitespace()
        .map(|token| token.trim_matches(',').to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

const STREET_TOKEN_COUNT: usize = 2;

/// The last two tokens of an address, e.g. `["oak", "st"]` for "4753 Oak St".
pub(crate) fn trailing_street(address: &[String]) -> Option<&[String]> {
    address
        .len()
        .checked_sub(STREET_TOKEN_COUNT)
        .map(|start| &address[start..])
}

/// True when the address's trailing two tokens equal the street name. Names that are
/// not exactly two tokens long never match.
pub(crate) fn ends_with_street(address: &[String], street: &[String]) -> bool {
    trailing_street(address).is_some_and(|trailing| trailing == street)
}
