//! GitHub API error classification
//!
//! Turns octocrab errors into `api`-layer errors with a readable message,
//! recognising rate limits, missing resources and organization OAuth
//! restrictions.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::LayeredError;

/// Regex pattern to extract organization name from OAuth access restriction errors
static ORG_RESTRICTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"the `([^`]+)` organization has enabled OAuth App access restrictions"#)
        .expect("Invalid regex pattern for org restriction detection")
});

/// Classify an octocrab error raised while running `operation`
pub fn classify_github_error(err: octocrab::Error, operation: &str) -> LayeredError {
    // Display only returns "GitHub", the details live in Debug
    let error_message = format!("{:?}", err);
    classify_message(&error_message, operation).with_cause(err)
}

fn classify_message(error_message: &str, operation: &str) -> LayeredError {
    if let Some(org_name) = extract_org_from_access_error(error_message) {
        return LayeredError::api(
            operation,
            format!(
                "the '{}' organization restricts OAuth app access; use a token with access to it",
                org_name
            ),
        )
        .with_context("organization", org_name);
    }

    if is_rate_limit_error(error_message) {
        return LayeredError::api(
            operation,
            "API rate limit exceeded. Please wait a few minutes and try again.",
        );
    }

    if is_not_found_error(error_message) {
        return LayeredError::api(
            operation,
            "resource not found. It may be private or you may not have access.",
        );
    }

    LayeredError::api(operation, error_message)
}

/// Extract organization name from OAuth access restriction error message
fn extract_org_from_access_error(error_message: &str) -> Option<String> {
    if !error_message.contains("OAuth App access restrictions") {
        return None;
    }

    ORG_RESTRICTION_PATTERN
        .captures(error_message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn is_rate_limit_error(error_message: &str) -> bool {
    error_message.contains("rate limit")
        || (error_message.contains("403") && error_message.contains("limit exceeded"))
}

fn is_not_found_error(error_message: &str) -> bool {
    error_message.contains("404") || error_message.contains("Not Found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Layer;

    #[test]
    fn test_org_restriction_needs_both_phrases() {
        let restricted = "Although you appear to have the correct authorization credentials, \
            the `demo-org` organization has enabled OAuth App access restrictions";
        assert_eq!(
            extract_org_from_access_error(restricted),
            Some("demo-org".to_string())
        );
        assert_eq!(extract_org_from_access_error("the `x` organization said no"), None);
    }

    #[test]
    fn test_message_predicates() {
        assert!(is_rate_limit_error("secondary rate limit hit"));
        assert!(is_rate_limit_error("HTTP 403: abuse limit exceeded"));
        assert!(!is_rate_limit_error("HTTP 403: forbidden"));

        assert!(is_not_found_error("GitHub { status_code: 404 }"));
        assert!(!is_not_found_error("HTTP 422"));
    }

    #[test]
    fn test_classified_errors_are_api_layer() {
        let org = classify_message(
            "the `my-org-123` organization has enabled OAuth App access restrictions",
            "create issue",
        );
        assert_eq!(org.layer, Layer::Api);
        assert_eq!(org.operation, "create issue");
        assert_eq!(
            org.context_map().get("organization").map(String::as_str),
            Some("my-org-123")
        );

        let limited = classify_message("API rate limit exceeded", "list labels");
        assert!(limited.message.contains("rate limit"));

        let generic = classify_message("connection reset", "list labels");
        assert_eq!(generic.message, "connection reset");
    }
}
