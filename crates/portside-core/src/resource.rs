//! Procurement resource-name helpers.
//!
//! The procurement service addresses entities with slash-separated resource
//! names such as `providers/{provider}/accounts/{account_id}`. Local records
//! key on the trailing identifier only.

/// Extracts the trailing identifier from a resource name.
///
/// Returns `None` for empty input or a name that ends with a separator,
/// since an empty identifier is never valid.
///
/// # Example
///
/// ```
/// use portside_core::last_segment;
///
/// assert_eq!(last_segment("providers/p/accounts/acc-1"), Some("acc-1"));
/// assert_eq!(last_segment("acc-1"), Some("acc-1"));
/// assert_eq!(last_segment("providers/p/accounts/"), None);
/// ```
#[must_use]
pub fn last_segment(resource_name: &str) -> Option<&str> {
    resource_name
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_resource_name() {
        assert_eq!(
            last_segment("providers/landgriffon/accounts/acc-99"),
            Some("acc-99")
        );
    }

    #[test]
    fn bare_identifier_passes_through() {
        assert_eq!(last_segment("acc-99"), Some("acc-99"));
    }

    #[test]
    fn trailing_slash_and_empty_are_rejected() {
        assert_eq!(last_segment("providers/p/accounts/"), None);
        assert_eq!(last_segment(""), None);
    }
}
