/// Upper bound accepted by the query generator.
pub const MAX_GENERATE_COUNT: u32 = 200;

/// Splits raw editor text into trimmed, non-empty queries, preserving order
/// and duplicates.
pub fn parse_queries(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Inverse of [`parse_queries`] for lists that are already normalized.
pub fn render_queries(queries: &[String]) -> String {
    queries.join("\n")
}

pub(crate) fn clamp_generate_count(count: u32) -> u32 {
    count.clamp(1, MAX_GENERATE_COUNT)
}

/// Re-normalizes a list that came from outside (server or generator) so it
/// satisfies the same invariant as edited text.
pub(crate) fn normalize(queries: &[String]) -> Vec<String> {
    parse_queries(&render_queries(queries))
}
