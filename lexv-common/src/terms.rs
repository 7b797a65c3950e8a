//! Term normalization shared by the validator and the convergence loop

/// Single-letter tag for "other"; every longer tag is matched by shape
const OTHER_TAG: &str = "X";

/// Header field naming the frequency column
pub const FREQUENCY_HEADER: &str = "term_frequency";

/// Canonical header line for generated input files
pub const CANONICAL_HEADER: &str = "term,term_frequency";

/// Strip a trailing `_<POS>` suffix (`plus_ADV`, `up_PRT`)
///
/// A suffix is a part-of-speech tag when it is 2 to 6 upper-case ASCII
/// letters, or `X`. Internal underscores are kept: `ice_cream` stays as is,
/// `ice_cream_NOUN` becomes `ice_cream`.
pub fn normalize_term(term: &str) -> &str {
    let term = term.trim();
    match term.rsplit_once('_') {
        Some((base, suffix)) if !base.is_empty() && is_pos_tag(suffix) => base,
        _ => term,
    }
}

fn is_pos_tag(suffix: &str) -> bool {
    suffix == OTHER_TAG
        || ((2..=6).contains(&suffix.len()) && suffix.bytes().all(|b| b.is_ascii_uppercase()))
}

/// First character upper-cased, remainder lower-cased
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Split a CSV-like line into its `term` and `term_frequency` fields
///
/// Anything after the second comma is ignored. Returns `None` when the line
/// has fewer than two fields.
pub fn leading_fields(line: &str) -> Option<(&str, &str)> {
    let mut parts = line.splitn(3, ',');
    let term = parts.next()?.trim();
    let frequency = parts.next()?.trim();
    Some((term, frequency))
}

/// True for the column header line, wherever it appears
pub fn is_header(line: &str) -> bool {
    leading_fields(line)
        .map(|(_, frequency)| frequency == FREQUENCY_HEADER)
        .unwrap_or(false)
}
