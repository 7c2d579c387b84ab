//! URL parsing that reports failures through the last-error slot.

use url::Url;

use crate::core::invoke::call;

/// Parse an absolute URL, or `None` if `input` is not one.
pub fn parse(input: &str) -> Option<Url> {
    call(|| Url::parse(input))
}

/// Resolve `input` against `base` (relative references allowed).
pub fn join(base: &Url, input: &str) -> Option<Url> {
    call(|| base.join(input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::invoke::{has_error, last_error};

    #[test]
    fn invalid_urls_return_none() {
        for input in ["", "random", "43", "http://[::1", "://missing-scheme"] {
            assert!(parse(input).is_none(), "input {input:?}");
            let err = last_error().expect("error recorded");
            assert!(err.downcast_ref::<url::ParseError>().is_some());
        }
    }

    #[test]
    fn valid_url_parses() {
        let parsed = parse("http://www.forwardbias.in").expect("parsed");
        assert_eq!(parsed.scheme(), "http");
        assert_eq!(parsed.host_str(), Some("www.forwardbias.in"));
        assert_eq!(parsed, Url::parse("http://www.forwardbias.in").expect("url"));
        assert!(!has_error());
    }

    #[test]
    fn join_resolves_relative_reference() {
        let base = parse("https://example.com/a/b").expect("base");
        let joined = join(&base, "../c?q=1").expect("joined");
        assert_eq!(joined.as_str(), "https://example.com/c?q=1");
    }
}
