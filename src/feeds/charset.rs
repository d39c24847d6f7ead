//! Character set normalization for feeds that are not served as UTF-8.
//!
//! Only an explicit allow-list of legacy single-byte encodings is accepted.
//! Unknown labels are rejected instead of guessed: mojibake in the output
//! stream is worse than a logged failure and a retry.

use super::FeedError;
use encoding_rs::{
    Encoding, ISO_8859_2, ISO_8859_5, ISO_8859_15, KOI8_R, KOI8_U, WINDOWS_1251, WINDOWS_1252,
};
use std::borrow::Cow;

/// Look up a supported legacy encoding by its (lower-cased) label.
///
/// `iso-8859-1` maps onto windows-1252, which is a superset of it for every
/// printable character.
fn legacy_encoding(label: &str) -> Option<&'static Encoding> {
    let encoding = match label {
        "windows-1251" | "cp1251" => WINDOWS_1251,
        "windows-1252" | "cp1252" => WINDOWS_1252,
        "iso-8859-1" | "latin1" => WINDOWS_1252,
        "iso-8859-2" | "latin2" => ISO_8859_2,
        "iso-8859-5" => ISO_8859_5,
        "iso-8859-15" => ISO_8859_15,
        "koi8-r" => KOI8_R,
        "koi8-u" => KOI8_U,
        _ => return None,
    };
    Some(encoding)
}

/// Decode `input` from the charset named by `label` into text.
///
/// The label is matched case-insensitively. `utf-8` and the empty label mean
/// the bytes are already normalized and are borrowed as is.
///
/// # Errors
///
/// - [`FeedError::UnsupportedCharset`] for any label outside the allow-list
/// - [`FeedError::MalformedDocument`] when bytes labelled UTF-8 are not valid UTF-8
pub fn normalize<'a>(label: &str, input: &'a [u8]) -> Result<Cow<'a, str>, FeedError> {
    let label = label.trim().to_ascii_lowercase();
    if label.is_empty() || label == "utf-8" || label == "utf8" {
        return std::str::from_utf8(input)
            .map(Cow::Borrowed)
            .map_err(|e| FeedError::MalformedDocument(format!("invalid UTF-8: {e}")));
    }

    let encoding =
        legacy_encoding(&label).ok_or_else(|| FeedError::UnsupportedCharset(label.clone()))?;
    let (text, had_errors) = encoding.decode_without_bom_handling(input);
    if had_errors {
        tracing::debug!(charset = %label, "Replaced undecodable bytes while normalizing feed");
    }
    Ok(Cow::Owned(text.into_owned()))
}
