//! Raw, untrusted listing request parameters.

use std::collections::HashMap;

/// Reserved parameter carrying the 1-based page number.
pub const PAGE_PARAM: &str = "page";

/// Reserved parameter carrying the page size.
pub const LIMIT_PARAM: &str = "limit";

/// Raw request input for one listing call.
///
/// Nothing here is validated: page, limit and filter values are kept as the
/// strings the caller received and only interpreted by
/// [`build`](crate::build()).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRequest {
    page: Option<String>,
    limit: Option<String>,
    values: HashMap<String, Vec<String>>,
}

impl FilterRequest {
    /// Creates an empty request (first page, default limit, no filters).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a request from decoded query-string pairs.
    ///
    /// `page` and `limit` are reserved (the last occurrence wins); every other
    /// key accumulates its values in order of appearance.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .fold(Self::new(), |request, (key, value)| request.pair(key.as_ref(), value))
    }

    /// Sets the raw page value.
    #[must_use]
    pub fn page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    /// Sets the raw limit value.
    #[must_use]
    pub fn limit(mut self, limit: impl Into<String>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    /// Appends a raw value for a filter parameter.
    #[must_use]
    pub fn value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.entry(key.into()).or_default().push(value.into());
        self
    }

    fn pair(self, key: &str, value: impl Into<String>) -> Self {
        match key {
            PAGE_PARAM => self.page(value),
            LIMIT_PARAM => self.limit(value),
            _ => self.value(key, value),
        }
    }

    /// Returns the raw page value.
    #[must_use]
    pub fn raw_page(&self) -> Option<&str> {
        self.page.as_deref()
    }

    /// Returns the raw limit value.
    #[must_use]
    pub fn raw_limit(&self) -> Option<&str> {
        self.limit.as_deref()
    }

    /// Returns the raw values supplied for `key`.
    #[must_use]
    pub fn values(&self, key: &str) -> &[String] {
        self.values.get(key).map_or(&[], Vec::as_slice)
    }

    /// Returns every supplied filter key, allow-listed or not.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for FilterRequest
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_splits_reserved_keys() {
        let request = FilterRequest::from_pairs([
            ("page", "2"),
            ("limit", "25"),
            ("status", "open"),
            ("status", "closed"),
            ("page", "3"),
        ]);

        assert_eq!(request.raw_page(), Some("3"));
        assert_eq!(request.raw_limit(), Some("25"));
        assert_eq!(request.values("status"), ["open", "closed"]);
        assert!(request.values("missing").is_empty());
    }

    #[test]
    fn test_collect() {
        let request: FilterRequest = vec![("system".to_string(), "ghn")].into_iter().collect();
        assert_eq!(request.values("system"), ["ghn"]);
        assert_eq!(request.raw_page(), None);
    }
}
