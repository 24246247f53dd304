//! Image URL validation
//!
//! Candidates that do not parse as absolute http(s) URLs are dropped.
//! A bad URL is a data-quality issue, never an error.

/// Whether `candidate` is an absolute `http`/`https` URL
pub fn is_valid_image_url(candidate: &str) -> bool {
    url::Url::parse(candidate)
        .is_ok_and(|parsed| matches!(parsed.scheme(), "http" | "https") && parsed.has_host())
}

/// Keep only valid URLs, in order.
///
/// Returns `None` when nothing survives, so callers fall back to a
/// text-only request instead of passing an empty list.
pub fn validate_image_urls(candidates: &[String]) -> Option<Vec<String>> {
    let valid: Vec<String> = candidates
        .iter()
        .filter(|candidate| {
            let keep = is_valid_image_url(candidate);
            if !keep {
                tracing::debug!(url = %candidate, "Dropping invalid image URL");
            }
            keep
        })
        .cloned()
        .collect();

    if valid.is_empty() { None } else { Some(valid) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn drops_non_http_and_garbage() {
        assert_eq!(
            validate_image_urls(&urls(&["https://a.com/1.png", "ftp://bad", "not a url"])),
            Some(urls(&["https://a.com/1.png"]))
        );
    }

    #[test]
    fn all_invalid_is_none() {
        assert_eq!(
            validate_image_urls(&urls(&["ftp://bad", "not-a-url-at-all-but-http://ok.com/d"])),
            None
        );
        assert_eq!(validate_image_urls(&[]), None);
    }

    #[test]
    fn keeps_order_and_plain_http() {
        assert_eq!(
            validate_image_urls(&urls(&["http://b.com/2.gif", "https://a.com/1.png"])),
            Some(urls(&["http://b.com/2.gif", "https://a.com/1.png"]))
        );
    }
}
