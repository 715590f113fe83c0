//! Extension to MIME type lookup.

/// Static mapping for the extensions the server knows how to label.
const CONTENT_TYPES: &[(&str, &str)] = &[
    (".html", "text/html"),
    (".txt", "text/plain"),
    (".gif", "image/gif"),
    (".jpeg", "image/jpeg"),
    (".jpg", "image/jpeg"),
    (".css", "text/css"),
];

/// Type served for allow-listed extensions missing from the table.
pub const FALLBACK_CONTENT_TYPE: &str = "text/plain";

/// Content type for `extension` (with leading dot).
pub fn content_type_for(extension: &str) -> &'static str {
    CONTENT_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}

/// Extension of the last path segment, including the dot.
pub fn extension_of(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next()?;
    segment.rfind('.').map(|dot| &segment[dot..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_types() {
        assert_eq!(content_type_for(".html"), "text/html");
        assert_eq!(content_type_for(".jpg"), "image/jpeg");
        assert_eq!(content_type_for(".jpeg"), "image/jpeg");
        assert_eq!(content_type_for(".css"), "text/css");
    }

    #[test]
    fn unmapped_falls_back() {
        assert_eq!(content_type_for(".md"), FALLBACK_CONTENT_TYPE);
    }

    #[test]
    fn extension_uses_last_segment() {
        assert_eq!(extension_of("/docs/index.html"), Some(".html"));
        assert_eq!(extension_of("/archive.tar.gz"), Some(".gz"));
        assert_eq!(extension_of("/v1.2/readme"), None);
        assert_eq!(extension_of("/"), None);
    }
}
