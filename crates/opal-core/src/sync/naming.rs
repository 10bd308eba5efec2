use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DISALLOWED: Regex =
        Regex::new("[^a-zA-Z0-9- |]+").expect("fragment pattern is valid");
}

pub const MAX_FRAGMENT_LEN: usize = 128;

/// Largest 4-digit disambiguator appended to a date stamp.
pub const MAX_DISAMBIGUATOR: u32 = 9999;

/// Lower-case everything, then upper-case the first letter of each word. A
/// word starts after any character that is not alphanumeric or `_`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if at_word_start {
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
        at_word_start = !(ch.is_alphanumeric() || ch == '_');
    }
    out
}

/// File-name-safe, length-capped, title-cased fragment of a description.
pub fn title_fragment(raw: &str) -> String {
    let cleaned = DISALLOWED.replace_all(raw, " ");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    // Only ASCII survives the substitution, so byte length is char length.
    let capped = if collapsed.len() > MAX_FRAGMENT_LEN {
        collapsed[..MAX_FRAGMENT_LEN].trim_end()
    } else {
        collapsed.as_str()
    };

    if capped.is_empty() {
        "Untitled".to_string()
    } else {
        title_case(capped)
    }
}

pub fn date_stamp(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// `<YYYYMMDD><nnnn>`, the 12-digit date code of a generated note.
pub fn date_code(stamp: &str, disambiguator: u32) -> String {
    format!("{}{:04}", stamp, disambiguator)
}

pub fn file_name(date_code: &str, fragment: &str) -> String {
    format!("{} - {}.md", date_code, fragment)
}
