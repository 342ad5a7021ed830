//! Catalog projections behind the pass-through endpoints
//!
//! Pure shaping of database rows into response records: chart listing,
//! artist detail/listing and song detail, plus validation of admin patches.

use axum::http::Uri;

pub mod artists;
pub mod chart;
pub mod songs;

/// Trim a URL field from an admin patch
///
/// Empty clears the field (`Ok(None)`); anything else must be an absolute
/// `http`/`https` URL with a host.
pub fn normalize_url(value: &str) -> Result<Option<String>, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let uri: Uri = trimmed
        .parse()
        .map_err(|e| format!("'{}' is not a valid URL: {}", trimmed, e))?;

    let scheme_ok = matches!(uri.scheme_str(), Some("http") | Some("https"));
    let has_host = uri.host().map_or(false, |h| !h.is_empty());
    if !scheme_ok || !has_host {
        return Err(format!("'{}' is not an absolute http(s) URL", trimmed));
    }

    Ok(Some(trimmed.to_string()))
}

/// Trim a free-text field; empty text is kept
pub fn normalize_text(value: &str) -> String {
    value.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url_accepts_http_and_https() {
        assert_eq!(
            normalize_url("  https://en.wikipedia.org/wiki/Queen_(band) ").unwrap(),
            Some("https://en.wikipedia.org/wiki/Queen_(band)".to_string())
        );
        assert!(normalize_url("http://example.com/photo.jpg").is_ok());
    }

    #[test]
    fn test_normalize_url_empty_clears() {
        assert_eq!(normalize_url("").unwrap(), None);
        assert_eq!(normalize_url("   ").unwrap(), None);
    }

    #[test]
    fn test_normalize_url_rejects_other_forms() {
        assert!(normalize_url("ftp://example.com/file").is_err());
        assert!(normalize_url("/relative/path").is_err());
        assert!(normalize_url("not a url").is_err());
        assert!(normalize_url("www.example.com").is_err());
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Is this the real life?\n"), "Is this the real life?");
        assert_eq!(normalize_text("   "), "");
    }
}
