//! PDF-like tab detection

use url::Url;

/// Whether a tab URL points at a PDF document.
///
/// Parsed URLs are judged by the last path segment, so query strings and
/// fragments do not hide the extension. Unparseable strings are judged as a
/// whole. The extension needs at least one character in front of it.
pub fn is_pdf_like(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(has_pdf_extension)
            .unwrap_or(false),
        Err(_) => has_pdf_extension(url),
    }
}

fn has_pdf_extension(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() > 4 && bytes[bytes.len() - 4..].eq_ignore_ascii_case(b".pdf")
}
