//! Request path classification.
//!
//! # Responsibilities
//! - Guess a content type from the request path's extension
//! - Treat paths the registry does not know as page requests
//!
//! # Design Decisions
//! - A registry miss yields `text/html`, so extension-less paths such as
//!   `/settings/profile` classify as pages

use mime_guess::mime;
use mime_guess::Mime;

/// Classify a request path into a content type.
///
/// Only the extension is consulted; the file does not need to exist.
pub fn classify(path: &str) -> Mime {
    mime_guess::from_path(path)
        .first()
        .unwrap_or(mime::TEXT_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(classify("/missing.html").essence_str(), "text/html");
        assert_eq!(classify("/images/missing.jpg").essence_str(), "image/jpeg");
        assert_eq!(classify("/data/missing.json").essence_str(), "application/json");
        assert_eq!(classify("/style.css").essence_str(), "text/css");
    }

    #[test]
    fn test_unknown_defaults_to_html() {
        assert_eq!(classify("/missing"), mime::TEXT_HTML);
        assert_eq!(classify("/app/users/42"), mime::TEXT_HTML);
        assert_eq!(classify("/archive.notarealext"), mime::TEXT_HTML);
        assert_eq!(classify("/"), mime::TEXT_HTML);
    }

    #[test]
    fn test_query_free_path_only() {
        // Classification works on the path component alone.
        assert_eq!(classify("/dir.with.dots/page").essence_str(), "text/html");
    }
}
