use crate::protocol::StationRecord;

/// Rows shown under the search bar.
pub const SEARCH_RESULT_LIMIT: usize = 8;
const MIN_QUERY_CHARS: usize = 2;

/// Filter stations by name, country, state or tag.
///
/// Name, country and state are compared case-insensitively.  Tags are matched
/// as a raw substring of the comma-joined tag string against the lowercased
/// query, so an upper-case tag only matches through the other fields.
pub fn search_stations<'a>(
    stations: &'a [StationRecord],
    query: &str,
    limit: usize,
) -> Vec<&'a StationRecord> {
    let needle = query.to_lowercase();
    if needle.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }

    stations
        .iter()
        .filter(|s| matches(s, &needle))
        .take(limit)
        .collect()
}

fn matches(station: &StationRecord, needle: &str) -> bool {
    station.name.to_lowercase().contains(needle)
        || station.country.to_lowercase().contains(needle)
        || (!station.state.is_empty() && station.state.to_lowercase().contains(needle))
        || (!station.tags.is_empty() && station.tags.contains(needle))
}
