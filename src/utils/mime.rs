//! MIME type detection and data-URL helpers

use base64::Engine;

/// Guess MIME by inspecting bytes (magic numbers)
pub fn guess_mime_from_bytes(bytes: &[u8]) -> Option<String> {
    infer::get(bytes).map(|k| k.mime_type().to_string())
}

/// Guess MIME by file path or URL (extension-based). Query and fragment are
/// ignored.
pub fn guess_mime_from_path_or_url(path_or_url: &str) -> Option<String> {
    let path = path_or_url
        .split(['?', '#'])
        .next()
        .unwrap_or(path_or_url);
    mime_guess::from_path(path)
        .first_raw()
        .map(|s| s.to_string())
}

/// Combined guess: prefer bytes, fall back to extension, otherwise octet-stream
pub fn guess_mime(bytes: Option<&[u8]>, path_or_url: Option<&str>) -> String {
    if let Some(b) = bytes
        && let Some(m) = guess_mime_from_bytes(b)
    {
        return m;
    }
    if let Some(p) = path_or_url
        && let Some(m) = guess_mime_from_path_or_url(p)
    {
        return m;
    }
    "application/octet-stream".to_string()
}

/// MIME type declared by a `data:` URL, if the input is one.
pub fn mime_from_data_url(url: &str) -> Option<String> {
    let rest = url.strip_prefix("data:")?;
    let header = rest.split(',').next()?;
    let mime = header.split(';').next()?.trim();
    (!mime.is_empty()).then(|| mime.to_string())
}

/// Encode bytes as `data:<mime>;base64,<payload>`.
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_magic_bytes_are_detected() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert_eq!(guess_mime(Some(&png), None), "image/png");
    }

    #[test]
    fn unknown_input_falls_back_to_octet_stream() {
        assert_eq!(guess_mime(Some(b"xyz"), None), "application/octet-stream");
    }

    #[test]
    fn data_url_round_trip() {
        let url = to_data_url("image/png", b"abc");
        assert_eq!(url, "data:image/png;base64,YWJj");
        assert_eq!(mime_from_data_url(&url).as_deref(), Some("image/png"));
        assert_eq!(mime_from_data_url("https://x/y.png"), None);
    }

    #[test]
    fn url_query_and_fragment_are_ignored() {
        assert_eq!(
            guess_mime_from_path_or_url("https://oss.example.com/cat.png?Expires=1&Signature=x")
                .as_deref(),
            Some("image/png")
        );
        assert_eq!(
            guess_mime_from_path_or_url("https://cdn.example.com/a/dog.jpeg#frag").as_deref(),
            Some("image/jpeg")
        );
        assert_eq!(guess_mime_from_path_or_url("https://cdn.example.com/img/12345"), None);
    }
}
