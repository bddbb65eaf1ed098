//! Canonical state names shared by every source table.

/// Known spelling variants and their canonical form.
const VARIANTS: &[(&str, &str)] = &[
    ("W.P. Kuala Lumpur", "Kuala Lumpur"),
    ("W.P. Labuan", "Labuan"),
    ("W.P. Putrajaya", "Putrajaya"),
    ("Trengganu", "Terengganu"),
];

/// Map a raw state name to the spelling used as the join key.
/// Unknown names pass through unchanged.
pub fn normalize_state_name(raw: &str) -> String {
    let trimmed = raw.trim();
    VARIANTS
        .iter()
        .find(|(variant, _)| *variant == trimmed)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or_else(|| trimmed.to_string())
}
