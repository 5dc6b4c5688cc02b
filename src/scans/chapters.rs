//! Chapter maps and page addressing.
//!
//! The scan host describes a title as a JSON object mapping chapter numbers
//! to page counts, e.g. `{"1": 19, "2": 21}`; pages live at
//! `<title>/<chapter>/<page>.jpg` under the relay mount.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

/// Chapter number (as a string key) → page count.
pub type ChapterMap = serde_json::Map<String, Value>;

/// Characters left alone by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Titles whose displayed chapter numbers are shifted from the host's.
/// `(lowercase title, first shifted chapter, shift)`.
const DISPLAY_OFFSETS: &[(&str, u32, u32)] = &[("one piece", 1046, 1)];

/// Leading integer of `key`: optional sign then digits, rest ignored.
pub fn leading_int(key: &str) -> Option<i64> {
    let key = key.trim_start();
    let (negative, digits) = match key.as_bytes().first() {
        Some(b'-') => (true, &key[1..]),
        Some(b'+') => (false, &key[1..]),
        _ => (false, key),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let run = &digits[..end];
    if run.is_empty() {
        return None;
    }
    // Saturates instead of rejecting runs too long for i64.
    let value = run.bytes().fold(0i64, |acc, digit| {
        acc.saturating_mul(10).saturating_add(i64::from(digit - b'0'))
    });
    Some(if negative { -value } else { value })
}

/// Number of real chapters (keys numbered 1 or more).
pub fn count_chapters(map: &ChapterMap) -> usize {
    map.keys()
        .filter(|key| leading_int(key).is_some_and(|n| n >= 1))
        .count()
}

/// Page count of `chapter`, 0 when unknown.
pub fn pages_in_chapter(map: &ChapterMap, chapter: u32) -> u32 {
    match map.get(&chapter.to_string()) {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Relay path of one page image.
pub fn page_path(mount_prefix: &str, title: &str, chapter: u32, page: u32) -> String {
    format!(
        "{}/{}/{}/{}.jpg",
        mount_prefix.trim_end_matches('/'),
        utf8_percent_encode(title, URI_COMPONENT),
        chapter,
        page
    )
}

/// Relay paths of pages `1..=page_count`.
pub fn chapter_page_paths(mount_prefix: &str, title: &str, chapter: u32, page_count: u32) -> Vec<String> {
    (1..=page_count)
        .map(|page| page_path(mount_prefix, title, chapter, page))
        .collect()
}

/// Chapter number shown to readers; only the label changes, never the
/// chapter that is loaded.
pub fn display_chapter_number(title: &str, chapter: u32) -> u32 {
    let title = title.to_lowercase();
    DISPLAY_OFFSETS
        .iter()
        .find(|(name, from, _)| *name == title && chapter >= *from)
        .map_or(chapter, |(_, _, shift)| chapter - shift)
}
