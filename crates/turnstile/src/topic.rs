//! Topic naming for station event streams.

/// Derive the topic name for a station from its display name.
///
/// Lowercases the name, turns `/` into `_and_`, spaces and `-` into `_`, and drops
/// apostrophes. Applying it to its own output returns the output unchanged.
pub fn station_topic_name(station_name: &str) -> String {
    let mut topic = String::with_capacity(station_name.len() + 8);
    for c in station_name.chars() {
        match c {
            '/' => topic.push_str("_and_"),
            ' ' | '-' => topic.push('_'),
            '\'' => {}
            c => topic.extend(c.to_lowercase()),
        }
    }
    topic
}
