//! Streaming address derivation.
//!
//! A streaming resource lives under the same API base as the REST
//! endpoints. The address is built by appending the resource path to the
//! API base, resolving that against the page's base URI when the API base
//! is relative, and switching the scheme to its WebSocket counterpart.

use url::Url;

use crate::error::AddressError;

/// Resolve `api_url + resource` to an absolute HTTP(S) URL.
///
/// `document_base` plays the role of the browser's `document.baseURI`. It is
/// required only when `api_url` is relative (the production `".."` base).
pub fn resolve_api_url(
    api_url: &str,
    resource: &str,
    document_base: Option<&Url>,
) -> Result<Url, AddressError> {
    let joined = format!("{}{}", api_url, resource);
    match document_base {
        Some(base) => Ok(base.join(&joined)?),
        None => Url::parse(&joined).map_err(|e| match e {
            url::ParseError::RelativeUrlWithoutBase => AddressError::MissingDocumentBase {
                api_url: api_url.to_string(),
            },
            other => AddressError::Parse(other),
        }),
    }
}

/// Derive the WebSocket address of `resource`.
///
/// `https` maps to `wss` and `http` maps to `ws`; addresses that are
/// already WebSocket URLs keep their scheme.
pub fn ws_url(
    api_url: &str,
    resource: &str,
    document_base: Option<&Url>,
) -> Result<Url, AddressError> {
    let mut url = resolve_api_url(api_url, resource, document_base)?;
    to_ws_scheme(&mut url)?;
    Ok(url)
}

fn to_ws_scheme(url: &mut Url) -> Result<(), AddressError> {
    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => return Err(AddressError::UnsupportedScheme(other.to_string())),
    };
    url.set_scheme(scheme)
        .map_err(|()| AddressError::UnsupportedScheme(url.scheme().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOURNALS: &str = "/internal/journals/updates";

    #[test]
    fn test_secure_base_maps_to_wss() {
        let url = ws_url("https://api.example.com", JOURNALS, None).unwrap();
        assert_eq!(url.as_str(), "wss://api.example.com/internal/journals/updates");
    }

    #[test]
    fn test_insecure_base_maps_to_ws() {
        let url = ws_url("http://localhost:8000", JOURNALS, None).unwrap();
        assert_eq!(url.as_str(), "ws://localhost:8000/internal/journals/updates");
    }

    #[test]
    fn test_relative_base_resolves_against_document() {
        let document = Url::parse("https://binp.example.com/static/index.html").unwrap();
        let url = ws_url("..", JOURNALS, Some(&document)).unwrap();
        assert_eq!(url.as_str(), "wss://binp.example.com/internal/journals/updates");
    }

    #[test]
    fn test_absolute_base_ignores_document() {
        let document = Url::parse("https://binp.example.com/static/index.html").unwrap();
        let url = ws_url("http://localhost:8000", JOURNALS, Some(&document)).unwrap();
        assert_eq!(url.as_str(), "ws://localhost:8000/internal/journals/updates");
    }

    #[test]
    fn test_relative_base_without_document_fails() {
        let err = ws_url("..", JOURNALS, None).unwrap_err();
        assert!(matches!(err, AddressError::MissingDocumentBase { .. }));
    }

    #[test]
    fn test_ws_base_is_kept() {
        let url = ws_url("wss://stream.example.com", "/x", None).unwrap();
        assert_eq!(url.scheme(), "wss");
    }

    #[test]
    fn test_unsupported_scheme() {
        let err = ws_url("ftp://files.example.com", JOURNALS, None).unwrap_err();
        assert!(matches!(err, AddressError::UnsupportedScheme(s) if s == "ftp"));
    }

    #[test]
    fn test_resolve_keeps_http_scheme() {
        let url = resolve_api_url("http://localhost:8000", "/internal/actions/", None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/internal/actions/");
    }
}
