use std::sync::LazyLock;

use regex::Regex;

use crate::core::Entry;

/// Lines without a following timestamp are shown for this long.
pub const DEFAULT_LYRIC_DURATION_MS: i64 = 3000;

static TIME_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d{1,2}):(\d{2})(?:\.(\d{1,3}))?\]").unwrap());

// [ar:Artist], [ti:Title], [offset:+100] ...
static METADATA_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[[a-z]+:").unwrap());

pub fn parse_lrc(content: &str) -> Vec<Entry> {
    let mut entries = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || METADATA_TAG.is_match(line) {
            continue;
        }

        let mut timestamps = Vec::new();
        let mut text_start = 0;
        for captures in TIME_TAG.captures_iter(line) {
            let minutes: i64 = captures[1].parse().unwrap_or(0);
            let seconds: i64 = captures[2].parse().unwrap_or(0);
            let fraction = captures.get(3).map(|m| m.as_str()).unwrap_or("0");
            let millis: i64 = format!("{:0<3}", fraction).parse().unwrap_or(0);

            timestamps.push((minutes * 60 + seconds) * 1000 + millis);
            if let Some(whole) = captures.get(0) {
                text_start = whole.end();
            }
        }

        let text = line[text_start..].trim();
        for from in timestamps {
            entries.push(Entry {
                id: entries.len().to_string(),
                from,
                to: from + DEFAULT_LYRIC_DURATION_MS,
                text: text.to_string(),
            });
        }
    }

    entries.sort_by_key(|entry| entry.from);

    // Each lyric lasts until the next one starts
    for i in 1..entries.len() {
        entries[i - 1].to = entries[i].from;
    }

    entries.retain(|entry| !entry.text.is_empty());
    entries
}
