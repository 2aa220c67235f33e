//! Filename contract with the upstream export job.
//!
//! Export objects are named `{OP}{anything}_{YYYY-MM-DD}[_...][.ext]`:
//! the operator code is the first two characters of the file name and the
//! export date is the second underscore-delimited segment, with any
//! extension stripped. Both are positional; nothing is read from content.

use chrono::NaiveDate;

/// Last path segment of an object key.
pub fn file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Date token embedded in a file name.
///
/// Returns `None` when there is no non-empty segment after the first
/// underscore.
pub fn date_token(file_name: &str) -> Option<&str> {
    let segment = file_name.split('_').nth(1)?;
    if segment.is_empty() {
        return None;
    }
    segment.split('.').next()
}

/// Two-character operator code of an object key.
///
/// Returns `None` when the file name is shorter than two characters.
pub fn operator_code(key: &str) -> Option<&str> {
    let name = file_name(key);
    let mut indices = name.char_indices().map(|(i, _)| i).skip(2);
    match indices.next() {
        Some(end) => Some(&name[..end]),
        None if name.chars().count() == 2 => Some(name),
        None => None,
    }
}

/// Keep only the keys whose embedded date equals `date`.
pub fn filter_by_date<S: AsRef<str>>(keys: &[S], date: NaiveDate) -> Vec<String> {
    let wanted = date.format("%Y-%m-%d").to_string();
    keys.iter()
        .map(|key| key.as_ref())
        .filter(|key| date_token(file_name(key)) == Some(wanted.as_str()))
        .map(str::to_string)
        .collect()
}
